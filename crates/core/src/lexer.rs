use crate::error::Diagnostic;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// Identifier that is not a reserved word
    Name(String),
    /// Integer literal, digits kept verbatim
    Int(String),
    /// Float literal (`digits.digits`), kept verbatim
    Float(String),
    /// Quoted string literal, contents without quotes
    Str(String),
    // Reserved words
    If,
    Elseif,
    Else,
    While,
    For,
    True,
    False,
    In,
    Print,
    Function,
    Struct,
    End,
    Until,
    // Arithmetic operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    // Comparison operators
    EqEq,
    NotEq,
    Gt,
    Lt,
    Gte,
    Lte,
    // Punctuation
    Assign,
    LParen,
    RParen,
    Colon,
    Comma,
    // End of input
    Eof,
}

/// Every identifier-shaped lexeme that is classified as a keyword.
pub const RESERVED_WORDS: [&str; 13] = [
    "if", "elseif", "else", "while", "for", "true", "false", "in", "print", "function", "struct",
    "end", "until",
];

/// Keyword lookup; takes priority over generic identifier classification.
pub fn reserved(word: &str) -> Option<Token> {
    let token = match word {
        "if" => Token::If,
        "elseif" => Token::Elseif,
        "else" => Token::Else,
        "while" => Token::While,
        "for" => Token::For,
        "true" => Token::True,
        "false" => Token::False,
        "in" => Token::In,
        "print" => Token::Print,
        "function" => Token::Function,
        "struct" => Token::Struct,
        "end" => Token::End,
        "until" => Token::Until,
        _ => return None,
    };
    Some(token)
}

impl Token {
    /// Upper-case kind name, as shown by `jlcheck tokens`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Token::Name(_) => "NAME",
            Token::Int(_) => "INT",
            Token::Float(_) => "FLOAT",
            Token::Str(_) => "STRING",
            Token::If => "IF",
            Token::Elseif => "ELSEIF",
            Token::Else => "ELSE",
            Token::While => "WHILE",
            Token::For => "FOR",
            Token::True => "TRUE",
            Token::False => "FALSE",
            Token::In => "IN",
            Token::Print => "PRINT",
            Token::Function => "FUNCTION",
            Token::Struct => "STRUCT",
            Token::End => "END",
            Token::Until => "UNTIL",
            Token::Plus => "PLUS",
            Token::Minus => "MINUS",
            Token::Star => "TIMES",
            Token::Slash => "DIVIDE",
            Token::Percent => "MODULO",
            Token::EqEq => "EQUAL",
            Token::NotEq => "NOTEQ",
            Token::Gt => "LARGE",
            Token::Lt => "SMALL",
            Token::Gte => "LRGEQ",
            Token::Lte => "SMLEQ",
            Token::Assign => "EQUALS",
            Token::LParen => "LPAREN",
            Token::RParen => "RPAREN",
            Token::Colon => "COLON",
            Token::Comma => "COMMA",
            Token::Eof => "EOF",
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.kind_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    /// Exact source text of the token; strings keep their quotes.
    /// Numeric lexemes are quoted verbatim in diagnostics, not normalized
    /// (`007` stays `007`).
    pub lexeme: String,
    pub line: u32,
}

/// Pull-based tokenizer over one fragment.
///
/// Lexical defects never stop tokenizing: the offending character is
/// recorded, skipped, and scanning resumes with the next character.
pub struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    defects: Vec<Diagnostic>,
    done: bool,
}

impl Lexer {
    pub fn new(src: &str) -> Self {
        Lexer {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            defects: Vec::new(),
            done: false,
        }
    }

    /// Current 1-based line.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Defects recorded so far and not yet taken.
    pub fn defects(&self) -> &[Diagnostic] {
        &self.defects
    }

    pub fn take_defects(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.defects)
    }

    fn at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn slice(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn emit(&self, token: Token, lexeme: String, line: u32) -> Spanned {
        Spanned {
            token,
            lexeme,
            line,
        }
    }

    /// Produce the next token. Once input is exhausted this keeps returning
    /// `Eof`.
    pub fn next_token(&mut self) -> Spanned {
        while let Some(c) = self.at(0) {
            match c {
                ' ' | '\t' => {
                    self.pos += 1;
                }
                '\n' => {
                    while self.at(0) == Some('\n') {
                        self.pos += 1;
                        self.line += 1;
                    }
                }
                c if c.is_ascii_digit() => return self.number(),
                '\'' | '"' => match self.string(c) {
                    Some(tok) => return tok,
                    None => self.skip_illegal(c),
                },
                c if c.is_ascii_alphabetic() || c == '_' => return self.word(),
                _ => match self.operator(c) {
                    Some(tok) => return tok,
                    None => self.skip_illegal(c),
                },
            }
        }
        self.emit(Token::Eof, String::new(), self.line)
    }

    fn skip_illegal(&mut self, c: char) {
        debug!(ch = %c, line = self.line, "illegal character");
        self.defects.push(Diagnostic::illegal_character(c, self.line));
        self.pos += 1;
    }

    fn number(&mut self) -> Spanned {
        let start = self.pos;
        while self.at(0).is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let is_float = self.at(0) == Some('.') && self.at(1).is_some_and(|c| c.is_ascii_digit());
        if is_float {
            self.pos += 1; // consume '.'
            while self.at(0).is_some_and(|c| c.is_ascii_digit()) {
                self.pos += 1;
            }
            let text = self.slice(start);
            return self.emit(Token::Float(text.clone()), text, self.line);
        }
        let text = self.slice(start);
        self.emit(Token::Int(text.clone()), text, self.line)
    }

    /// Quoted string with no escapes. `None` when the closing quote is missing.
    fn string(&mut self, quote: char) -> Option<Spanned> {
        let close = self.chars[self.pos + 1..]
            .iter()
            .position(|&c| c == quote)?;
        let start = self.pos;
        let line = self.line;
        let body: String = self.chars[start + 1..start + 1 + close].iter().collect();
        self.pos = start + close + 2;
        self.line += body.matches('\n').count() as u32;
        let lexeme = self.slice(start);
        Some(self.emit(Token::Str(body), lexeme, line))
    }

    fn word(&mut self) -> Spanned {
        let start = self.pos;
        while self
            .at(0)
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        let word = self.slice(start);
        let token = reserved(&word).unwrap_or_else(|| Token::Name(word.clone()));
        self.emit(token, word, self.line)
    }

    fn operator(&mut self, c: char) -> Option<Spanned> {
        // Two-character operators before their one-character prefixes.
        let two = match (c, self.at(1)) {
            ('=', Some('=')) => Some(Token::EqEq),
            ('!', Some('=')) => Some(Token::NotEq),
            ('>', Some('=')) => Some(Token::Gte),
            ('<', Some('=')) => Some(Token::Lte),
            _ => None,
        };
        if let Some(token) = two {
            let start = self.pos;
            self.pos += 2;
            let lexeme = self.slice(start);
            return Some(self.emit(token, lexeme, self.line));
        }
        let token = match c {
            '+' => Token::Plus,
            '-' => Token::Minus,
            '*' => Token::Star,
            '/' => Token::Slash,
            '%' => Token::Percent,
            '=' => Token::Assign,
            '>' => Token::Gt,
            '<' => Token::Lt,
            '(' => Token::LParen,
            ')' => Token::RParen,
            ':' => Token::Colon,
            ',' => Token::Comma,
            _ => return None,
        };
        self.pos += 1;
        Some(self.emit(token, c.to_string(), self.line))
    }
}

impl Iterator for Lexer {
    type Item = Spanned;

    /// Yields every token including a single trailing `Eof`, then stops.
    fn next(&mut self) -> Option<Spanned> {
        if self.done {
            return None;
        }
        let tok = self.next_token();
        if tok.token == Token::Eof {
            self.done = true;
        }
        Some(tok)
    }
}

/// A fully materialized token stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Tokenized {
    /// All tokens, always terminated by `Eof`.
    pub tokens: Vec<Spanned>,
    pub defects: Vec<Diagnostic>,
}

pub fn tokenize(src: &str) -> Tokenized {
    let mut lexer = Lexer::new(src);
    let tokens: Vec<Spanned> = lexer.by_ref().collect();
    Tokenized {
        tokens,
        defects: lexer.take_defects(),
    }
}
