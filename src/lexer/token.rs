use std::fmt;

/// One piece of an f-string: either literal text or an embedded expression
/// kept as source so the parser can parse it on its own.
#[derive(Debug, Clone, PartialEq)]
pub enum FStringPiece {
    Literal(String),
    Expr {
        source: String,
        conversion: Option<char>,
        format_spec: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenType {
    // Keywords
    Def,
    Class,
    Return,
    If,
    Elif,
    Else,
    While,
    For,
    In,
    Import,
    From,
    As,
    Pass,
    Break,
    Continue,
    Raise,
    Try,
    Except,
    Finally,
    True,
    False,
    None,
    And,
    Or,
    Not,
    Is,

    // Identifiers and literals
    Identifier(String),
    String(String),
    FString(Vec<FStringPiece>),
    Integer(i64),
    Float(f64),

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    At,
    Pipe,
    Ampersand,
    Caret,
    Tilde,
    EqualEqual,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Arrow,

    // Assignment
    Assign,
    PlusAssign,
    MinusAssign,
    StarAssign,
    SlashAssign,

    // Delimiters
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Colon,
    Semicolon,
    Comma,
    Dot,
    Ellipsis,

    // Layout
    Newline,
    Indent,
    Dedent,
    Eof,
}

impl TokenType {
    pub fn keyword(text: &str) -> Option<TokenType> {
        let token_type = match text {
            "def" => TokenType::Def,
            "class" => TokenType::Class,
            "return" => TokenType::Return,
            "if" => TokenType::If,
            "elif" => TokenType::Elif,
            "else" => TokenType::Else,
            "while" => TokenType::While,
            "for" => TokenType::For,
            "in" => TokenType::In,
            "import" => TokenType::Import,
            "from" => TokenType::From,
            "as" => TokenType::As,
            "pass" => TokenType::Pass,
            "break" => TokenType::Break,
            "continue" => TokenType::Continue,
            "raise" => TokenType::Raise,
            "try" => TokenType::Try,
            "except" => TokenType::Except,
            "finally" => TokenType::Finally,
            "True" => TokenType::True,
            "False" => TokenType::False,
            "None" => TokenType::None,
            "and" => TokenType::And,
            "or" => TokenType::Or,
            "not" => TokenType::Not,
            "is" => TokenType::Is,
            _ => return None,
        };
        Some(token_type)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} '{}'", self.token_type, self.lexeme)
    }
}
