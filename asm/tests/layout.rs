use r65asm::error::{Diag, Error};
use r65asm::layout::LayoutEngine;
use r65asm::parser::parse_file;
use r65asm::{assemble, assemble_str, Assembly};

fn case(code: &str) -> Assembly {
    println!("{code}");
    match assemble_str("case.s", code) {
        Ok(asm) => {
            for (addr, byte) in asm.bytes() {
                println!("  {:04X}: {:02X}", addr, byte);
            }
            asm
        }
        Err(diag) => panic!("{}", diag),
    }
}

fn case_err(code: &str) -> Diag {
    println!("{code}");
    match assemble_str("case.s", code) {
        Ok(_) => panic!("assembly should fail"),
        Err(diag) => {
            println!("  -> {} at {:?}", diag, diag.at);
            diag
        }
    }
}

#[test]
fn branch_offset_out_of_range() {
    let diag = case_err(
        "\
BASE $1000
START $1000
BEQ @far
BASE $1084
@far: NOP
",
    );
    assert!(matches!(diag.error, Error::BranchOffsetOutOfRange(130)));
    assert_eq!(diag.at.map(|at| at.line_no), Some(3));
}

#[test]
fn branch_offset_at_limit() {
    let asm = case(
        "\
BASE $1000
START $1000
BEQ @far
BASE $1081
@far: NOP
",
    );
    assert_eq!(asm.bytes_at(0x1000, 2), Some(vec![0xF0, 0x7F]));
    assert_eq!(asm.byte_at(0x1081), Some(0xEA));
}

#[test]
fn ambiguous_page_zero() {
    // Six [2, 3] byte instructions from $F0 leave @var in [$FC, $102]
    let diag = case_err(
        "\
BASE $00F0
START $00F0
LDA @var
LDA @var
LDA @var
LDA @var
LDA @var
LDA @var
@var: DATA $00
",
    );
    assert!(
        matches!(diag.error, Error::AmbiguousPageZero(0xFC, 0x102)),
        "{:?}",
        diag.error
    );
    assert_eq!(diag.at.map(|at| at.line_no), Some(3));
}

#[test]
fn zero_page_and_absolute_operands() {
    let asm = case(
        "\
%port = #$E000
BASE $0010
@ptr: DATA $0300
BASE $0200
START @main
@main: LDA [@ptr] + Y
STA %port
LDA @ptr + X
JMP @main
",
    );
    assert_eq!(asm.start, 0x0200);
    assert_eq!(asm.bytes_at(0x0010, 2), Some(vec![0x00, 0x03]));
    assert_eq!(
        asm.bytes_at(0x0200, 10),
        Some(vec![
            0xB1, 0x10, // LDA (ptr),Y
            0x8D, 0x00, 0xE0, // STA $E000
            0xB5, 0x10, // LDA ptr,X
            0x4C, 0x00, 0x02, // JMP main
        ])
    );
}

#[test]
fn lo_hi_of_label() {
    let asm = case(
        "\
BASE $C000
START @main
@main: LDA lo @msg
LDX hi @msg
BRK
BASE $C123
@msg: DATA $41
",
    );
    assert_eq!(
        asm.bytes_at(0xC000, 5),
        Some(vec![0xA9, 0x23, 0xA2, 0xC1, 0x00])
    );
}

#[test]
fn jsr_rts() {
    let asm = case(
        "\
BASE $8000
START @main
@main: JSR @sub
BRK
@sub: INC X
RTS
",
    );
    assert_eq!(
        asm.bytes_at(0x8000, 6),
        Some(vec![0x20, 0x04, 0x80, 0x00, 0xE8, 0x60])
    );
}

#[test]
fn labels_across_files() {
    let a = parse_file("a.s", "BASE $0400\nSTART @main\n@main: JSR @puts\nBRK\n")
        .unwrap_or_else(|d| panic!("{}", d));
    let b = parse_file("b.s", "@puts: LDA $41\nSTA #$E000\nRTS\n")
        .unwrap_or_else(|d| panic!("{}", d));
    let asm = assemble(vec![a, b]).unwrap_or_else(|d| panic!("{}", d));

    assert_eq!(asm.labels.get("puts").and_then(|r| r.value()), Some(0x0404));
    assert_eq!(
        asm.bytes_at(0x0400, 10),
        Some(vec![0x20, 0x04, 0x04, 0x00, 0xA9, 0x41, 0x8D, 0x00, 0xE0, 0x60])
    );
}

#[test]
fn constants_do_not_cross_files() {
    let a = parse_file("a.s", "%c = $01\nSTART $0000\nLDA %c\n");
    assert!(a.is_ok());
    let b = parse_file("b.s", "LDA %c\n");
    let Err(diag) = b else {
        panic!("constant leaked into another file");
    };
    assert!(matches!(diag.error, Error::UndefinedConstant(_)));
    assert_eq!(diag.at.map(|at| (at.file, at.line_no)), Some(("b.s".to_string(), 1)));
}

#[test]
fn missing_start() {
    let diag = case_err("BASE $0200\nNOP\n");
    assert!(matches!(diag.error, Error::MissingStartDirective));
    assert!(diag.at.is_none());
}

#[test]
fn dangling_label() {
    let diag = case_err("START $0000\nNOP\n@end:\n");
    assert!(matches!(diag.error, Error::DanglingLabel(ref name) if name == "end"));
    assert_eq!(diag.at.map(|at| at.line_no), Some(3));
}

#[test]
fn label_on_its_own_line() {
    let asm = case("BASE $0300\nSTART @main\n@main:\n; entry\nNOP\nJMP @main\n");
    assert_eq!(asm.start, 0x0300);
    assert_eq!(asm.bytes_at(0x0301, 3), Some(vec![0x4C, 0x00, 0x03]));
}

#[test]
fn relayout_is_idempotent() {
    let code = "\
BASE $0200
START @main
@main: LDX @count
@loop: LDA @buf + X
STA #$E000
DEC X
BNE @loop
BRA @main
@count: DATA $05
@buf: DATA $48
";
    let mut files = vec![parse_file("idem.s", code).unwrap_or_else(|d| panic!("{}", d))];
    let mut engine = LayoutEngine::new();
    let start = engine.run(&mut files).unwrap_or_else(|d| panic!("{}", d));
    let bytes: Vec<_> = files
        .iter()
        .flat_map(|f| f.instructions())
        .map(|inst| (inst.address, inst.bytes.clone()))
        .collect();

    assert_eq!(engine.settle(&mut files).unwrap_or_else(|d| panic!("{}", d)), start);
    assert_eq!(engine.passes(), (1, 1));
    let again: Vec<_> = files
        .iter()
        .flat_map(|f| f.instructions())
        .map(|inst| (inst.address, inst.bytes.clone()))
        .collect();
    assert_eq!(bytes, again);
}

#[test]
fn fixpoint_only_narrows() {
    let code = "\
BASE $0200
START @main
@main: LDA @buf
LDX @count
@loop: STA @buf + X
DEC X
BNE @loop
JMP @main
@count: DATA $10
@buf: DATA lo @main
@end: DATA $00
";
    let mut files = vec![parse_file("mono.s", code).unwrap_or_else(|d| panic!("{}", d))];
    let mut engine = LayoutEngine::tracing();
    engine.run(&mut files).unwrap_or_else(|d| panic!("{}", d));

    let trace = engine.trace();
    let (address, size) = engine.passes();
    assert_eq!(trace.len(), address + size);
    let count = files.iter().map(|f| f.instructions().count()).sum::<usize>();
    assert!(address <= 4 * count + 16 && size <= 4 * count + 16);

    for (pass, pair) in trace.windows(2).enumerate() {
        for ((name, before), (_, after)) in pair[0].iter().zip(pair[1].iter()) {
            println!("{:>2} @{:<6} {} -> {}", pass, name, before, after);
            assert!(
                before.lo <= after.lo && after.hi <= before.hi,
                "@{name} widened in pass {pass}: {before} -> {after}"
            );
        }
    }
    let last = trace.last().unwrap_or_else(|| panic!("empty trace"));
    assert!(last.iter().all(|(_, range)| range.is_point()));
}

#[test]
fn oversized_product_is_an_error() {
    let diag = case_err("START $00\nDATA $FFFF * $FFFF * $FFFF * $FFFF * $FFFF\n");
    assert!(matches!(diag.error, Error::DataOutOfRange(_, i64::MAX)));
    assert_eq!(diag.at.map(|at| at.line_no), Some(2));

    let diag = case_err("START $00\nLDA (#$FFFF * $FFFF * $FFFF * $FFFF) + X\n");
    assert!(matches!(diag.error, Error::ValueOutOfRange(..)));
}
