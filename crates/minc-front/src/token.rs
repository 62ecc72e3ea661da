//! Token kinds and the reserved-word and symbol tables.

/// Every token the language knows about.
///
/// `FloatLiteral` is reserved: the tokenizer never produces it and no
/// grammar rule consumes it. `Break`, `Continue`, and `GoTo` are reserved
/// words rejected by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    // Reserved words
    Boolean,
    Void,
    Constant,
    Volatile,
    If,
    Else,
    While,
    Do,
    For,
    Break,
    Continue,
    UInt8,
    Int8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    UInt64,
    Int64,
    UInt,
    Int,
    Cast,
    GoTo,
    False,
    True,
    Null,
    // Symbols
    LBrace,
    RBrace,
    LParen,
    RParen,
    Star,
    Ampersand,
    Colon,
    Semicolon,
    Plus,
    Equal,
    EqualEqual,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Comma,
    // Special
    Identifier,
    IntLiteral,
    FloatLiteral,
    Eof,
}

/// Reserved words. An identifier matches only when it contains no
/// uppercase letter and equals the spelling here.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("boolean", TokenKind::Boolean),
    ("void", TokenKind::Void),
    ("constant", TokenKind::Constant),
    ("volatile", TokenKind::Volatile),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("do", TokenKind::Do),
    ("for", TokenKind::For),
    ("break", TokenKind::Break),
    ("continue", TokenKind::Continue),
    ("uint8", TokenKind::UInt8),
    ("int8", TokenKind::Int8),
    ("uint16", TokenKind::UInt16),
    ("int16", TokenKind::Int16),
    ("uint32", TokenKind::UInt32),
    ("int32", TokenKind::Int32),
    ("uint64", TokenKind::UInt64),
    ("int64", TokenKind::Int64),
    ("uint", TokenKind::UInt),
    ("int", TokenKind::Int),
    ("cast", TokenKind::Cast),
    ("goto", TokenKind::GoTo),
    ("false", TokenKind::False),
    ("true", TokenKind::True),
    ("null", TokenKind::Null),
];

/// Recognized symbols. Matching is maximal-munch over this table.
pub const SYMBOLS: &[(&str, TokenKind)] = &[
    ("{", TokenKind::LBrace),
    ("}", TokenKind::RBrace),
    ("(", TokenKind::LParen),
    (")", TokenKind::RParen),
    ("*", TokenKind::Star),
    ("&", TokenKind::Ampersand),
    (":", TokenKind::Colon),
    (";", TokenKind::Semicolon),
    ("+", TokenKind::Plus),
    ("=", TokenKind::Equal),
    ("==", TokenKind::EqualEqual),
    ("!=", TokenKind::NotEqual),
    ("<=", TokenKind::LessEqual),
    (">=", TokenKind::GreaterEqual),
    ("<", TokenKind::Less),
    (">", TokenKind::Greater),
    (",", TokenKind::Comma),
];

impl TokenKind {
    /// Whether this token may start an expression.
    pub fn starts_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::False
                | TokenKind::True
                | TokenKind::Null
                | TokenKind::IntLiteral
                | TokenKind::LParen
                | TokenKind::Star
                | TokenKind::Ampersand
                | TokenKind::Cast
        )
    }

    /// Whether this token may start a declaration's type.
    pub fn starts_type(self) -> bool {
        matches!(
            self,
            TokenKind::Constant
                | TokenKind::Volatile
                | TokenKind::Boolean
                | TokenKind::Void
                | TokenKind::Int8
                | TokenKind::UInt8
                | TokenKind::Int16
                | TokenKind::UInt16
                | TokenKind::Int32
                | TokenKind::UInt32
                | TokenKind::Int64
                | TokenKind::UInt64
                | TokenKind::Int
                | TokenKind::UInt
        )
    }

    /// A printable name for error messages.
    pub fn describe(self) -> &'static str {
        for &(word, kind) in KEYWORDS {
            if kind == self {
                return word;
            }
        }
        for &(symbol, kind) in SYMBOLS {
            if kind == self {
                return symbol;
            }
        }
        match self {
            TokenKind::Identifier => "<id>",
            TokenKind::IntLiteral => "<integer>",
            TokenKind::FloatLiteral => "<float>",
            TokenKind::Eof => "<eof>",
            _ => "<unknown>",
        }
    }
}
