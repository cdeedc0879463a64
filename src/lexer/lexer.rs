use super::error::LexerError;
use super::token::{FStringPiece, Token, TokenType};

const STRING_PREFIXES: [&str; 8] = ["r", "u", "f", "b", "rf", "fr", "br", "rb"];

pub struct Lexer {
    source: String,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
    line: usize,
    line_start: usize,
    start_line: usize,
    start_column: usize,
    indent_stack: Vec<usize>,
    bracket_depth: usize,
    at_line_start: bool,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Self {
            source: source.to_string(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
            line: 1,
            line_start: 0,
            start_line: 1,
            start_column: 1,
            indent_stack: vec![0],
            bracket_depth: 0,
            at_line_start: true,
        }
    }

    pub fn tokenize(&mut self) -> Result<Vec<Token>, LexerError> {
        self.skip_byte_order_mark();
        while !self.is_at_end() {
            if self.at_line_start && self.bracket_depth == 0 {
                self.handle_indentation()?;
                if self.at_line_start {
                    // blank or comment-only line
                    continue;
                }
            }

            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }

            if self.peek() == '\n' {
                self.advance();
                self.push_newline();
                self.at_line_start = true;
                continue;
            }

            self.start = self.current;
            self.start_line = self.line;
            self.start_column = self.column_of(self.start);
            self.scan_token()?;
        }

        self.push_newline();
        while self.indent_stack.len() > 1 {
            self.indent_stack.pop();
            self.push_layout(TokenType::Dedent);
        }
        self.push_layout(TokenType::Eof);

        Ok(std::mem::take(&mut self.tokens))
    }

    /// A leading U+FEFF is an encoding marker, not source text. Offsets stay
    /// relative to the original string.
    fn skip_byte_order_mark(&mut self) {
        if self.current == 0 && self.source.starts_with('\u{feff}') {
            let width = '\u{feff}'.len_utf8();
            self.start = width;
            self.current = width;
            self.line_start = width;
        }
    }

    fn handle_indentation(&mut self) -> Result<(), LexerError> {
        let mut width = 0usize;
        while !self.is_at_end() {
            match self.peek() {
                ' ' => width += 1,
                '\t' => width = (width / 8 + 1) * 8,
                '\x0c' => width = 0,
                _ => break,
            }
            self.advance();
        }

        if self.peek() == '#' {
            while !self.is_at_end() && self.peek() != '\n' {
                self.advance();
            }
        }
        if self.peek() == '\r' {
            self.advance();
        }
        if self.is_at_end() {
            return Ok(());
        }
        if self.peek() == '\n' {
            self.advance();
            return Ok(());
        }

        self.at_line_start = false;
        let current = self.current_indent();
        if width > current {
            self.indent_stack.push(width);
            self.push_layout(TokenType::Indent);
        } else if width < current {
            while width < self.current_indent() {
                self.indent_stack.pop();
                self.push_layout(TokenType::Dedent);
            }
            if width != self.current_indent() {
                return Err(self.error("unindent does not match any outer indentation level"));
            }
        }
        Ok(())
    }

    fn current_indent(&self) -> usize {
        self.indent_stack.last().copied().unwrap_or(0)
    }

    fn skip_whitespace(&mut self) {
        while !self.is_at_end() {
            match self.peek() {
                ' ' | '\t' | '\r' | '\x0c' => {
                    self.advance();
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                '\\' if self.peek_next() == '\n' || (self.peek_next() == '\r' && self.peek_at(2) == '\n') => {
                    while self.advance() != '\n' {}
                }
                '\n' if self.bracket_depth > 0 => {
                    self.advance();
                }
                _ => break,
            }
        }
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c = self.advance();
        match c {
            '(' | '[' | '{' => {
                self.bracket_depth += 1;
                let token_type = match c {
                    '(' => TokenType::LeftParen,
                    '[' => TokenType::LeftBracket,
                    _ => TokenType::LeftBrace,
                };
                self.add_token(token_type);
            }
            ')' | ']' | '}' => {
                self.bracket_depth = self.bracket_depth.saturating_sub(1);
                let token_type = match c {
                    ')' => TokenType::RightParen,
                    ']' => TokenType::RightBracket,
                    _ => TokenType::RightBrace,
                };
                self.add_token(token_type);
            }
            ':' => self.add_token(TokenType::Colon),
            ';' => self.add_token(TokenType::Semicolon),
            ',' => self.add_token(TokenType::Comma),
            '.' => {
                if self.peek() == '.' && self.peek_next() == '.' {
                    self.advance();
                    self.advance();
                    self.add_token(TokenType::Ellipsis);
                } else if self.peek().is_ascii_digit() {
                    self.number()?;
                } else {
                    self.add_token(TokenType::Dot);
                }
            }
            '+' => {
                let token_type = if self.match_char('=') {
                    TokenType::PlusAssign
                } else {
                    TokenType::Plus
                };
                self.add_token(token_type);
            }
            '-' => {
                let token_type = if self.match_char('>') {
                    TokenType::Arrow
                } else if self.match_char('=') {
                    TokenType::MinusAssign
                } else {
                    TokenType::Minus
                };
                self.add_token(token_type);
            }
            '*' => {
                let token_type = if self.match_char('*') {
                    TokenType::DoubleStar
                } else if self.match_char('=') {
                    TokenType::StarAssign
                } else {
                    TokenType::Star
                };
                self.add_token(token_type);
            }
            '/' => {
                let token_type = if self.match_char('/') {
                    TokenType::DoubleSlash
                } else if self.match_char('=') {
                    TokenType::SlashAssign
                } else {
                    TokenType::Slash
                };
                self.add_token(token_type);
            }
            '%' => self.add_token(TokenType::Percent),
            '@' => self.add_token(TokenType::At),
            '|' => self.add_token(TokenType::Pipe),
            '&' => self.add_token(TokenType::Ampersand),
            '^' => self.add_token(TokenType::Caret),
            '~' => self.add_token(TokenType::Tilde),
            '=' => {
                let token_type = if self.match_char('=') {
                    TokenType::EqualEqual
                } else {
                    TokenType::Assign
                };
                self.add_token(token_type);
            }
            '!' => {
                if self.match_char('=') {
                    self.add_token(TokenType::NotEqual);
                } else {
                    return Err(self.error("invalid syntax: '!'"));
                }
            }
            '<' => {
                let token_type = if self.match_char('=') {
                    TokenType::LessEqual
                } else {
                    TokenType::Less
                };
                self.add_token(token_type);
            }
            '>' => {
                let token_type = if self.match_char('=') {
                    TokenType::GreaterEqual
                } else {
                    TokenType::Greater
                };
                self.add_token(token_type);
            }
            '"' | '\'' => self.string(c, "")?,
            '0'..='9' => self.number()?,
            c if c.is_alphabetic() || c == '_' => self.identifier()?,
            _ => {
                return Err(self.error_at_start(&format!("Unexpected character: {}", c)));
            }
        }

        Ok(())
    }

    fn identifier(&mut self) -> Result<(), LexerError> {
        while self.peek().is_alphanumeric() || self.peek() == '_' {
            self.advance();
        }

        let text = self.source[self.start..self.current].to_string();
        let lowered = text.to_lowercase();
        if (self.peek() == '"' || self.peek() == '\'') && STRING_PREFIXES.contains(&lowered.as_str()) {
            let quote = self.advance();
            return self.string(quote, &lowered);
        }

        let token_type = TokenType::keyword(&text).unwrap_or(TokenType::Identifier(text));
        self.add_token(token_type);
        Ok(())
    }

    fn number(&mut self) -> Result<(), LexerError> {
        let first = self.source[self.start..].chars().next().unwrap_or('0');

        if first == '0' && matches!(self.peek(), 'x' | 'X' | 'o' | 'O' | 'b' | 'B') {
            let radix = match self.advance() {
                'x' | 'X' => 16,
                'o' | 'O' => 8,
                _ => 2,
            };
            let digits_start = self.current;
            while self.peek().is_ascii_alphanumeric() || self.peek() == '_' {
                self.advance();
            }
            let digits = self.source[digits_start..self.current].replace('_', "");
            let value = i64::from_str_radix(&digits, radix).map_err(|e| {
                self.error(&format!("Failed to parse integer '{}': {}", &self.source[self.start..self.current], e))
            })?;
            self.add_token(TokenType::Integer(value));
            return Ok(());
        }

        let mut is_float = first == '.';
        self.consume_digits();

        if !is_float && self.peek() == '.' && self.peek_next() != '.' {
            is_float = true;
            self.advance();
            self.consume_digits();
        }

        if matches!(self.peek(), 'e' | 'E') {
            let signed = matches!(self.peek_next(), '+' | '-') && self.peek_at(2).is_ascii_digit();
            if self.peek_next().is_ascii_digit() || signed {
                is_float = true;
                self.advance();
                if signed {
                    self.advance();
                }
                self.consume_digits();
            }
        }

        if self.peek().is_alphabetic() || self.peek() == '_' {
            return Err(self.error("invalid decimal literal"));
        }

        let text = self.source[self.start..self.current].replace('_', "");
        if is_float {
            let value = text
                .parse::<f64>()
                .map_err(|e| self.error(&format!("Failed to parse float '{}': {}", text, e)))?;
            self.add_token(TokenType::Float(value));
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|e| self.error(&format!("Failed to parse integer '{}': {}", text, e)))?;
            self.add_token(TokenType::Integer(value));
        }
        Ok(())
    }

    fn consume_digits(&mut self) {
        while self.peek().is_ascii_digit() || (self.peek() == '_' && self.peek_next().is_ascii_digit()) {
            self.advance();
        }
    }

    fn string(&mut self, quote: char, prefix: &str) -> Result<(), LexerError> {
        let triple = self.peek() == quote && self.peek_next() == quote;
        if triple {
            self.advance();
            self.advance();
        }

        let mut raw = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.error_at_start("unterminated string literal"));
            }
            let c = self.peek();
            if c == '\\' {
                raw.push(self.advance());
                if !self.is_at_end() {
                    raw.push(self.advance());
                }
                continue;
            }
            if c == quote {
                if !triple {
                    self.advance();
                    break;
                }
                if self.peek_next() == quote && self.peek_at(2) == quote {
                    self.advance();
                    self.advance();
                    self.advance();
                    break;
                }
            } else if c == '\n' && !triple {
                return Err(self.error_at_start("unterminated string literal"));
            }
            raw.push(self.advance());
        }

        let is_raw = prefix.contains('r');
        let token_type = if prefix.contains('f') {
            TokenType::FString(self.split_fstring(&raw, is_raw)?)
        } else if is_raw {
            TokenType::String(raw)
        } else {
            TokenType::String(decode_escapes(&raw))
        };
        self.add_token(token_type);
        Ok(())
    }

    fn split_fstring(&self, raw: &str, is_raw: bool) -> Result<Vec<FStringPiece>, LexerError> {
        let chars: Vec<char> = raw.chars().collect();
        let mut pieces = Vec::new();
        let mut literal = String::new();
        let mut i = 0;

        let flush = |literal: &mut String, pieces: &mut Vec<FStringPiece>| {
            if !literal.is_empty() {
                let text = if is_raw { literal.clone() } else { decode_escapes(literal) };
                pieces.push(FStringPiece::Literal(text));
                literal.clear();
            }
        };

        while i < chars.len() {
            let c = chars[i];
            if c == '{' {
                if chars.get(i + 1) == Some(&'{') {
                    literal.push('{');
                    i += 2;
                    continue;
                }
                flush(&mut literal, &mut pieces);

                let mut expr = String::new();
                let mut conversion = None;
                let mut format_spec = None;
                let mut depth = 0usize;
                let mut quote: Option<char> = None;
                let mut j = i + 1;
                loop {
                    let Some(&ch) = chars.get(j) else {
                        return Err(self.error_at_start("f-string: expecting '}'"));
                    };
                    if let Some(q) = quote {
                        expr.push(ch);
                        if ch == q {
                            quote = None;
                        }
                        j += 1;
                        continue;
                    }
                    match ch {
                        '\'' | '"' => {
                            quote = Some(ch);
                            expr.push(ch);
                        }
                        '(' | '[' | '{' => {
                            depth += 1;
                            expr.push(ch);
                        }
                        ')' | ']' => {
                            depth = depth.saturating_sub(1);
                            expr.push(ch);
                        }
                        '}' if depth > 0 => {
                            depth -= 1;
                            expr.push(ch);
                        }
                        '}' => {
                            j += 1;
                            break;
                        }
                        '!' if depth == 0 && chars.get(j + 1) != Some(&'=') => {
                            conversion = chars.get(j + 1).copied();
                            j += 2;
                            continue;
                        }
                        ':' if depth == 0 => {
                            let mut spec = String::new();
                            j += 1;
                            while let Some(&sc) = chars.get(j) {
                                if sc == '}' {
                                    break;
                                }
                                spec.push(sc);
                                j += 1;
                            }
                            if chars.get(j) != Some(&'}') {
                                return Err(self.error_at_start("f-string: expecting '}'"));
                            }
                            format_spec = Some(spec);
                            j += 1;
                            break;
                        }
                        _ => expr.push(ch),
                    }
                    j += 1;
                }

                if expr.trim().is_empty() {
                    return Err(self.error_at_start("f-string: empty expression not allowed"));
                }
                pieces.push(FStringPiece::Expr {
                    source: expr.trim().to_string(),
                    conversion,
                    format_spec,
                });
                i = j;
                continue;
            }
            if c == '}' {
                if chars.get(i + 1) == Some(&'}') {
                    literal.push('}');
                    i += 2;
                    continue;
                }
                return Err(self.error_at_start("f-string: single '}' is not allowed"));
            }
            literal.push(c);
            i += 1;
        }
        flush(&mut literal, &mut pieces);

        Ok(pieces)
    }

    fn push_newline(&mut self) {
        let needs_newline = matches!(
            self.tokens.last().map(|t| &t.token_type),
            Some(t) if !matches!(t, TokenType::Newline | TokenType::Dedent | TokenType::Indent)
        );
        if needs_newline {
            self.push_layout(TokenType::Newline);
        }
    }

    fn push_layout(&mut self, token_type: TokenType) {
        let column = self.column_of(self.current);
        self.tokens.push(Token {
            token_type,
            lexeme: String::new(),
            line: self.line,
            column,
        });
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.is_at_end() || self.peek() != expected {
            return false;
        }

        self.advance();
        true
    }

    fn peek(&self) -> char {
        self.peek_at(0)
    }

    fn peek_next(&self) -> char {
        self.peek_at(1)
    }

    fn peek_at(&self, offset: usize) -> char {
        self.source[self.current..].chars().nth(offset).unwrap_or('\0')
    }

    fn advance(&mut self) -> char {
        if self.is_at_end() {
            return '\0';
        }

        let ch = self.source[self.current..].chars().next().unwrap_or('\0');
        self.current += ch.len_utf8();
        if ch == '\n' {
            self.line += 1;
            self.line_start = self.current;
        }
        ch
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn column_of(&self, position: usize) -> usize {
        let from = self.line_start.min(position);
        self.source[from..position].chars().count() + 1
    }

    fn add_token(&mut self, token_type: TokenType) {
        let lexeme = self.source[self.start..self.current].to_string();
        self.tokens.push(Token {
            token_type,
            lexeme,
            line: self.start_line,
            column: self.start_column,
        });
    }

    fn error(&self, message: &str) -> LexerError {
        LexerError {
            message: message.to_string(),
            line: self.line,
            column: self.column_of(self.current),
        }
    }

    fn error_at_start(&self, message: &str) -> LexerError {
        LexerError {
            message: message.to_string(),
            line: self.start_line,
            column: self.start_column,
        }
    }
}

fn decode_escapes(raw: &str) -> String {
    let mut value = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            value.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => value.push('\n'),
            Some('r') => value.push('\r'),
            Some('t') => value.push('\t'),
            Some('0') => value.push('\0'),
            Some('\\') => value.push('\\'),
            Some('\'') => value.push('\''),
            Some('"') => value.push('"'),
            Some('\n') => {}
            Some(other) => {
                value.push('\\');
                value.push(other);
            }
            None => value.push('\\'),
        }
    }
    value
}
