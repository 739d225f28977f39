use indexmap::IndexMap;
use std::io::Write;

use r65asm::codegen::{print_dump, CodeGenerator, Image, PunchCard, RomListing};
use r65asm::error::{Diag, Error};
use r65asm::{assemble, parser};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum Format {
    /// Ten-column punch card listing
    Punchcard,
    /// `rom.program(addr, byte);` listing
    Rom,
    /// Flat 64 KiB binary image
    Image,
}

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Input files
    #[clap(required = true)]
    input: Vec<String>,

    /// Output file, stdout when omitted
    #[clap(short, long)]
    output: Option<String>,

    /// Output format
    #[clap(short, long, value_enum, default_value = "punchcard")]
    format: Format,

    /// Dump the laid out program
    #[clap(short, long)]
    dump: bool,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    let mut sources: IndexMap<String, Vec<String>> = IndexMap::new();

    if let Err(diag) = run(&args, &mut sources) {
        diag.print(&sources);
        std::process::exit(1);
    }
}

fn run(args: &Args, sources: &mut IndexMap<String, Vec<String>>) -> Result<(), Diag> {
    println!("r65asm: 65C02 assembler");

    println!("1. Read Files and Parse Lines");
    let mut files = vec![];
    for path in &args.input {
        println!("  < {}", path);
        let text =
            std::fs::read_to_string(path).map_err(|e| Error::FileOpen(path.clone(), e))?;
        sources.insert(path.clone(), text.lines().map(str::to_string).collect());
        files.push(parser::parse_file(path, &text)?);
    }

    println!("2. Layout");
    let asm = assemble(files)?;
    println!("  start: ${:04X}", asm.start);
    for (name, range) in asm.labels.iter() {
        println!("  @{:<16} {}", name, range);
    }

    if args.dump {
        print_dump(&asm.files);
    }

    println!("3. Generate Output");
    let out: Box<dyn Write> = match (&args.output, args.format) {
        (Some(path), _) => {
            println!("  > {}", path);
            let file =
                std::fs::File::create(path).map_err(|e| Error::FileCreate(path.clone(), e))?;
            Box::new(std::io::BufWriter::new(file))
        }
        (None, Format::Image) => {
            return Err(Error::FileCreate(
                "<stdout>".to_string(),
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "the image format needs an output file (-o)",
                ),
            )
            .into());
        }
        (None, _) => Box::new(std::io::stdout().lock()),
    };

    let target = args.output.clone().unwrap_or_else(|| "<stdout>".to_string());
    let result = match args.format {
        Format::Punchcard => generate(PunchCard::new(out), &asm),
        Format::Rom => generate(RomListing::new(out), &asm),
        Format::Image => generate(Image::new(out), &asm),
    };
    result.map_err(|e| Error::FileWrite(target, e))?;
    Ok(())
}

fn generate<G: CodeGenerator>(mut gen: G, asm: &r65asm::Assembly) -> std::io::Result<()> {
    gen.generate(&asm.files, asm.start)
}
