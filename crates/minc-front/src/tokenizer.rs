//! The tokenizer: characters in, typed tokens out.
//!
//! Contract: after construction, [`Tokenizer::kind`] and
//! [`Tokenizer::text`] carry the first token; [`Tokenizer::read_next`]
//! advances; [`Tokenizer::put_back`] stashes exactly one token to be
//! returned by the next `read_next`. Whitespace and both comment styles
//! are skipped. Symbols match by maximal munch over the symbol table.
//! Integer literals are scanned here but converted (and range-checked) by
//! the parser.

use crate::error::CompileError;
use crate::token::{TokenKind, KEYWORDS, SYMBOLS};

pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    col: u32,
    /// Kind of the current token.
    pub kind: TokenKind,
    /// Text of the current token (identifier spelling, literal digits).
    pub text: String,
    token_line: u32,
    token_col: u32,
    pending: Option<(TokenKind, String)>,
    echo: bool,
}

impl Tokenizer {
    /// Builds a tokenizer and reads the first token. With `echo` set,
    /// consumed source characters are mirrored to stdout (driver
    /// pass-through for `--dump-source`).
    pub fn new(source: &str, echo: bool) -> Result<Self, CompileError> {
        let mut tokenizer = Tokenizer {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            col: 1,
            kind: TokenKind::Eof,
            text: String::new(),
            token_line: 1,
            token_col: 1,
            pending: None,
            echo,
        };
        tokenizer.read_next()?;
        Ok(tokenizer)
    }

    /// Line of the current token, 1-based.
    pub fn line(&self) -> u32 {
        self.token_line
    }

    /// Column of the current token, 1-based.
    pub fn column(&self) -> u32 {
        self.token_col
    }

    /// Stashes one token: the given token becomes current and the
    /// previously current token is produced by the next `read_next`.
    pub fn put_back(&mut self, kind: TokenKind, text: String) {
        assert!(self.pending.is_none(), "only one token of put-back");
        self.pending = Some((self.kind, std::mem::replace(&mut self.text, text)));
        self.kind = kind;
    }

    /// Advances to the next token.
    pub fn read_next(&mut self) -> Result<(), CompileError> {
        if let Some((kind, text)) = self.pending.take() {
            self.kind = kind;
            self.text = text;
            return Ok(());
        }
        self.skip_trivia()?;
        self.token_line = self.line;
        self.token_col = self.col;
        self.text.clear();
        match self.peek() {
            None => {
                self.kind = TokenKind::Eof;
                Ok(())
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                self.read_word();
                Ok(())
            }
            Some(c) if c.is_ascii_digit() => {
                self.read_number();
                Ok(())
            }
            Some(_) => self.read_symbol(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_second(&self) -> Option<char> {
        self.chars.get(self.pos + 1).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if self.echo {
            print!("{ch}");
        }
        if ch == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(ch)
    }

    fn skip_trivia(&mut self) -> Result<(), CompileError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek_second() == Some('*') => {
                    let (line, col) = (self.line, self.col);
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            None => {
                                return Err(CompileError::Lexical {
                                    line,
                                    col,
                                    message: "missing closing */".into(),
                                })
                            }
                            Some('*') if self.peek_second() == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                        }
                    }
                }
                Some('/') if self.peek_second() == Some('/') => {
                    while let Some(c) = self.peek() {
                        if c == '\n' {
                            break;
                        }
                        self.bump();
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn read_word(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                self.bump();
                self.text.push(c);
            } else {
                break;
            }
        }
        self.kind = TokenKind::Identifier;
        // Reserved words are all-lowercase; any uppercase letter keeps the
        // identifier classification.
        if self.text.chars().any(|c| c.is_ascii_uppercase()) {
            return;
        }
        for &(word, kind) in KEYWORDS {
            if self.text == word {
                self.kind = kind;
                return;
            }
        }
    }

    fn read_number(&mut self) {
        // Scan the whole alphanumeric run; the parser converts and
        // range-checks, so `0x1F` and malformed runs alike arrive intact.
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() {
                self.bump();
                self.text.push(c);
            } else {
                break;
            }
        }
        self.kind = TokenKind::IntLiteral;
    }

    fn read_symbol(&mut self) -> Result<(), CompileError> {
        // Maximal munch: of all recognized symbols matching at this
        // position, take the longest.
        let rest = &self.chars[self.pos..];
        let mut best: Option<(usize, TokenKind)> = None;
        for &(symbol, kind) in SYMBOLS {
            let len = symbol.len();
            if len <= rest.len() && symbol.chars().zip(rest.iter()).all(|(a, &b)| a == b) {
                if best.map_or(true, |(blen, _)| len > blen) {
                    best = Some((len, kind));
                }
            }
        }
        match best {
            Some((len, kind)) => {
                for _ in 0..len {
                    if let Some(ch) = self.bump() {
                        self.text.push(ch);
                    }
                }
                self.kind = kind;
                Ok(())
            }
            None => Err(CompileError::Lexical {
                line: self.token_line,
                col: self.token_col,
                message: "invalid character".into(),
            }),
        }
    }
}
