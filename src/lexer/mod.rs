mod error;
mod lexer;
mod token;

#[cfg(test)]
mod tests;

pub use error::LexerError;
pub use lexer::Lexer;
pub use token::{FStringPiece, Token, TokenType};

pub fn tokenize(source: &str) -> Result<Vec<Token>, LexerError> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize()
}
