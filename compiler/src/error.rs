use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("Invalid compile options: {0}")]
    Options(String),

    #[error("Schema integrity error in {unit} at {element}: {msg}")]
    SchemaIntegrity {
        unit:    String,
        element: String,
        msg:     String,
    },

    #[error("Resource id {value} for constant {constant} in {unit} does not fit in {width} bits")]
    EncodingOverflow {
        unit:     String,
        constant: String,
        value:    String,
        width:    u32,
    },

    #[error("Invalid resource id literal {value} for constant {constant} in {unit}: {msg}")]
    InvalidLiteral {
        unit:     String,
        constant: String,
        value:    String,
        msg:      String,
    },

    #[error("Ambiguous symbol {symbol} in {unit}: both {first} and {second} produce it")]
    AmbiguousName {
        unit:   String,
        symbol: String,
        first:  String,
        second: String,
    },

    #[error("{} constant(s) in {unit} failed to encode: {}", .errors.len(), join_errors(.errors))]
    ConstantsFailed {
        unit:   String,
        errors: Vec<CompileError>,
    },
}

impl CompileError {
    pub(crate) fn integrity(
        unit: impl Into<String>,
        element: impl Into<String>,
        msg: impl Into<String>,
    ) -> CompileError {
        CompileError::SchemaIntegrity {
            unit:    unit.into(),
            element: element.into(),
            msg:     msg.into(),
        }
    }
}

fn join_errors(errors: &[CompileError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
