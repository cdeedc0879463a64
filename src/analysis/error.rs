use crate::lexer::LexerError;
use crate::parser::ParseError;

/// Source text that cannot be lexed or parsed.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SyntaxError {
    pub message: String,
    pub line: usize,
    pub column: usize,
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Syntax error on line {}, column {}: {}", self.line, self.column, self.message)
    }
}

impl std::error::Error for SyntaxError {}

impl From<LexerError> for SyntaxError {
    fn from(err: LexerError) -> Self {
        SyntaxError {
            message: err.message,
            line: err.line,
            column: err.column,
        }
    }
}

impl From<ParseError> for SyntaxError {
    fn from(err: ParseError) -> Self {
        SyntaxError {
            message: err.message,
            line: err.line,
            column: err.column,
        }
    }
}
