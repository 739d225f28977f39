use color_print::cprintln;

use r65emu::config::{load_image, MachineConfig};
use r65emu::device::Device;
use r65emu::schedule::Schedule;
use r65emu::{Error, Machine};

const HELP_TEMPLATE: &str = "\
{before-help}{bin} {version}
  {author}
  {about}

{usage-heading}
{tab}{usage}

{all-args}{after-help}";

#[derive(Debug, clap::Parser)]
#[clap(author, version, about, help_template = HELP_TEMPLATE)]
struct Args {
    /// Machine description (YAML)
    #[clap(short, long)]
    config: Option<String>,

    /// Stop after this many ticks
    #[clap(short = 't', long)]
    tmax: Option<u64>,

    /// Halt on BRK
    #[clap(short = 'b', long)]
    brk: bool,

    /// Interrupt schedule (YAML)
    #[clap(short, long)]
    intr: Option<String>,

    /// Binary image
    #[clap(default_value = "main.bin")]
    image: String,
}

fn main() {
    use clap::Parser;

    let args: Args = Args::parse();
    if let Err(e) = run(&args) {
        cprintln!("<r,s>error</>: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Error> {
    println!("r65emu: 65C02 emulator");

    println!("+-----------------------------------------------+");
    println!("| {:<45} |", args.image);
    println!("+-----------------------------------------------+");

    println!("[INIT]");
    let mut config = match &args.config {
        Some(path) => {
            println!(" * Config {:?}", path);
            MachineConfig::load(path)?
        }
        None => MachineConfig::default(),
    };
    config.debugger.flags.break_instruction |= args.brk;

    let image = load_image(&args.image)?;
    let bus = config.build(Some(&image))?;
    for device in bus.devices() {
        println!(" * {}", device.name());
    }

    let schedule = match &args.intr {
        Some(path) => {
            let schedule = Schedule::load(path)?;
            println!(" * Intr[{}] {:?}", schedule.len(), path);
            schedule
        }
        None => Schedule::default(),
    };

    let mut machine = Machine::new(bus, config.debugger.console());
    println!("[RUN]");
    let ticks = if machine.powerup() {
        0
    } else {
        machine.run(args.tmax, &schedule)
    };

    println!();
    println!("[HALT] {} ticks", ticks);
    machine.debugger.print_registers();
    println!("=================================================");
    Ok(())
}
