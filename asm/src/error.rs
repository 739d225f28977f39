use color_print::cprintln;
use indexmap::IndexMap;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Lexer
    #[error("Unexpected character `{0}` at column {1}")]
    UnexpectedChar(char, usize),

    #[error("Invalid size of hex literal `${0}`: expected 2 or 4 digits")]
    BadHexLiteral(String),

    // Parser
    #[error("Syntax error: {0}")]
    SyntaxError(String),

    #[error("The constant `%{0}` was not defined")]
    UndefinedConstant(String),

    #[error("The constant `%{0}` was defined more than once")]
    RedefinedConstant(String),

    #[error("Unsupported function: `{0}`")]
    UnsupportedFunction(String),

    #[error("Unknown instruction: `{0}`")]
    UnknownInstruction(String),

    #[error("The instruction `{0}` requires a parameter")]
    MissingOperand(String),

    #[error("The instruction `{0}` does not expect a parameter")]
    UnexpectedOperand(String),

    #[error("The label `@{0}` is not followed by an instruction")]
    DanglingLabel(String),

    // Evaluation
    #[error("Unknown label: `@{0}`")]
    UnknownLabel(String),

    #[error("The expression has no static value")]
    NonStaticValue,

    // Layout
    #[error("The label `@{0}` was defined more than once")]
    DuplicateLabel(String),

    #[error("Undefined label: `@{0}`")]
    UnresolvedLabel(String),

    #[error("Unable to determine whether an address in [${0:04X}, ${1:04X}] is in page zero")]
    AmbiguousPageZero(i64, i64),

    #[error("Unsupported additive addressing mode")]
    UnsupportedAddressingMode,

    #[error("Unsupported indirect addressing")]
    UnsupportedIndirection,

    #[error("Unsupported expression")]
    UnsupportedExpression,

    #[error("The instruction `{0}` does not support addressing mode `{1}`")]
    UnsupportedAddressingModeForInstruction(String, String),

    #[error("Branch target is out of range: offset {0}")]
    BranchOffsetOutOfRange(i64),

    #[error("The expression value is out of range: [{0}, {1}]")]
    ValueOutOfRange(i64, i64),

    #[error("Parameter of DATA instruction is out of range: [{0}, {1}]")]
    DataOutOfRange(i64, i64),

    #[error("The BASE instruction requires an address parameter")]
    MissingBaseOperand,

    #[error("Unable to determine an address")]
    UnresolvedAddress,

    #[error("Could not determine a value for the expression")]
    UnresolvedValue,

    #[error("Instruction expects a single byte as parameter, got ${0:04X}")]
    SingleByteExpected(i64),

    #[error("No `START` instruction found")]
    MissingStartDirective,

    #[error("Could not find a value for the start address")]
    UnresolvedStart,

    #[error("Layout did not settle after {0} passes")]
    LayoutDiverged(usize),

    // Files
    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to read line")]
    FileRead(#[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),
}

/// Source position of a line, `line_no` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: String,
    pub line_no: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line_no: usize) -> Self {
        Location {
            file: file.into(),
            line_no,
        }
    }
}

/// An error together with the line that caused it.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct Diag {
    #[source]
    pub error: Error,
    pub at: Option<Location>,
}

impl Diag {
    /// Print error with diagnostic information showing file location and line content
    pub fn print(&self, files: &IndexMap<String, Vec<String>>) {
        cprintln!("<red,bold>error</>: {}", self.error);

        let Some(at) = &self.at else {
            return;
        };
        cprintln!("     <blue>--></> <underline>{}:{}</>", at.file, at.line_no);
        cprintln!("      <blue>|</>");

        let line_content = files
            .get(&at.file)
            .and_then(|lines| lines.get(at.line_no.wrapping_sub(1)))
            .map(|s| s.as_str())
            .unwrap_or("");

        cprintln!(" <blue>{:>4} |</> {}", at.line_no, line_content);
        cprintln!("      <blue>|</>");
    }
}

impl From<Error> for Diag {
    fn from(error: Error) -> Self {
        Diag { error, at: None }
    }
}

pub trait At<T> {
    /// Attach a source position to an error result.
    fn at(self, loc: &Location) -> Result<T, Diag>;
}

impl<T> At<T> for Result<T, Error> {
    fn at(self, loc: &Location) -> Result<T, Diag> {
        self.map_err(|error| Diag {
            error,
            at: Some(loc.clone()),
        })
    }
}
