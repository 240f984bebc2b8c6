use std::str::Chars;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn merge(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Keywords
    Max,
    Min,
    Subject,
    To,
    St,

    // Literals
    Ident,
    Number,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Colon,
    Comma,
    Semicolon,

    // Relations
    Le,
    Ge,
    Eq,

    // Delimiters
    LParen,
    RParen,

    // Special
    Newline,
    Comment,
    Eof,
    Error,
}

impl TokenKind {
    pub fn is_relation(self) -> bool {
        matches!(self, TokenKind::Le | TokenKind::Ge | TokenKind::Eq)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span, text: impl Into<String>) -> Self {
        Self {
            kind,
            span,
            text: text.into(),
        }
    }
}

pub struct Lexer<'a> {
    source: &'a str,
    chars: Chars<'a>,
    pos: usize,
    current: Option<char>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        let mut chars = source.chars();
        let current = chars.next();
        Self {
            source,
            chars,
            pos: 0,
            current,
        }
    }

    pub fn tokenize(source: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(source);
        let mut tokens = Vec::new();
        loop {
            let token = lexer.next_token();
            let is_eof = token.kind == TokenKind::Eof;
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.current;
        self.current = self.chars.next();
        if let Some(c) = c {
            self.pos += c.len_utf8();
        }
        c
    }

    fn peek(&self) -> Option<char> {
        self.current
    }

    fn peek_next(&self) -> Option<char> {
        self.chars.clone().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn token_from(&self, kind: TokenKind, start: usize) -> Token {
        Token::new(kind, Span::new(start, self.pos), &self.source[start..self.pos])
    }

    fn skip_line_comment(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // first /
        self.advance(); // second /
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
        self.token_from(TokenKind::Comment, start)
    }

    fn skip_block_comment(&mut self) -> Token {
        let start = self.pos;
        self.advance(); // /
        self.advance(); // *
        loop {
            match self.peek() {
                Some('*') => {
                    self.advance();
                    if self.peek() == Some('/') {
                        self.advance();
                        break;
                    }
                }
                Some(_) => {
                    self.advance();
                }
                None => break, // Unterminated comment
            }
        }
        self.token_from(TokenKind::Comment, start)
    }

    fn eat_digits(&mut self) -> usize {
        let mut count = 0;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.advance();
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;

        self.eat_digits();

        // Decimal part
        if self.peek() == Some('.') {
            self.advance();
            self.eat_digits();
        }

        // Exponent, only when digits follow; otherwise `e` starts an identifier
        if matches!(self.peek(), Some('e' | 'E')) {
            let mut chars = self.chars.clone();
            let next = chars.next();
            let has_exponent = match next {
                Some(d) if d.is_ascii_digit() => true,
                Some('+' | '-') => chars.next().is_some_and(|d| d.is_ascii_digit()),
                _ => false,
            };
            if has_exponent {
                self.advance(); // e
                if matches!(self.peek(), Some('+' | '-')) {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        self.token_from(TokenKind::Number, start)
    }

    fn read_ident(&mut self) -> Token {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                self.advance();
            } else {
                break;
            }
        }
        let text = &self.source[start..self.pos];
        let kind = match text {
            "max" | "maximize" | "maximise" => TokenKind::Max,
            "min" | "minimize" | "minimise" => TokenKind::Min,
            "subject" => TokenKind::Subject,
            "to" => TokenKind::To,
            "st" => TokenKind::St,
            _ => TokenKind::Ident,
        };
        Token::new(kind, Span::new(start, self.pos), text)
    }

    /// `<=`, `>=`, `=` and `==`; a lone `<` or `>` is an error token
    fn read_relation(&mut self, first: char) -> Token {
        let start = self.pos;
        self.advance();
        let kind = match (first, self.peek()) {
            ('<', Some('=')) => {
                self.advance();
                TokenKind::Le
            }
            ('>', Some('=')) => {
                self.advance();
                TokenKind::Ge
            }
            ('=', Some('=')) => {
                self.advance();
                TokenKind::Eq
            }
            ('=', _) => TokenKind::Eq,
            _ => TokenKind::Error,
        };
        self.token_from(kind, start)
    }

    fn single(&mut self, kind: TokenKind) -> Token {
        let start = self.pos;
        self.advance();
        self.token_from(kind, start)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let start = self.pos;

        let Some(c) = self.peek() else {
            return Token::new(TokenKind::Eof, Span::new(start, start), "");
        };

        match c {
            '\n' => self.single(TokenKind::Newline),
            '/' => match self.peek_next() {
                Some('/') => self.skip_line_comment(),
                Some('*') => self.skip_block_comment(),
                _ => self.single(TokenKind::Slash),
            },
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Star),
            ':' => self.single(TokenKind::Colon),
            ',' => self.single(TokenKind::Comma),
            ';' => self.single(TokenKind::Semicolon),
            '(' => self.single(TokenKind::LParen),
            ')' => self.single(TokenKind::RParen),
            '≤' => self.single(TokenKind::Le),
            '≥' => self.single(TokenKind::Ge),
            '<' | '>' | '=' => self.read_relation(c),
            '.' if self.peek_next().is_some_and(|d| d.is_ascii_digit()) => self.read_number(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_ident(),
            _ => self.single(TokenKind::Error),
        }
    }
}
