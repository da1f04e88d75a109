// ⛔ Parse errors for the homoglyph source formats
// Any of these aborts the build: a half-parsed source would corrupt the dictionary.

/// Errors raised while decoding a source dataset.
///
/// Line numbers are 1-based and refer to the physical line in the source text.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("line {line}: invalid hexadecimal token {token:?}")]
    InvalidHex { line: usize, token: String },

    #[error("line {line}: U+{value:04X} is not a Unicode scalar value")]
    InvalidCodepoint { line: usize, value: u32 },

    #[error("line {line}: empty codepoint sequence")]
    EmptySequence { line: usize },

    #[error("line {line}: expected at least {expected} fields, found {found}")]
    MissingField {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("source is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidEncoding { valid_up_to: usize },

    #[error("line {line}: malformed record: {reason}")]
    Malformed { line: usize, reason: String },
}

impl ParseError {
    /// Line the error points at, if it has one
    pub fn line(&self) -> Option<usize> {
        match self {
            ParseError::InvalidHex { line, .. }
            | ParseError::InvalidCodepoint { line, .. }
            | ParseError::EmptySequence { line }
            | ParseError::MissingField { line, .. }
            | ParseError::Malformed { line, .. } => Some(*line),
            ParseError::InvalidEncoding { .. } => None,
        }
    }
}
