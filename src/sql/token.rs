//! Token types produced by the lexer and consumed by the parser.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenType {
    Illegal,
    Eof,

    Ident,
    StringLiteral,
    NumberLiteral,
    BoolLiteral,

    // data type keywords
    Int,
    Char,
    Bool,
    Float,

    // operators
    Plus,
    Minus,
    Bang,
    Asterisk,
    Slash,
    Lt,
    Gt,
    Lte,
    Gte,
    Eq,
    NotEq,

    // delimiters
    Comma,
    Semicolon,
    LParen,
    RParen,
    Period,

    // keywords
    Select,
    Insert,
    Into,
    Values,
    Update,
    Delete,
    Create,
    Drop,
    Table,
    From,
    Where,
    Set,
    As,
    And,

    // constraints
    Primary,
    Key,
    Not,
    Null,
    Unique,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub ty: TokenType,
    pub literal: String,
}

impl Token {
    pub fn new(ty: TokenType, literal: impl Into<String>) -> Self {
        Self { ty, literal: literal.into() }
    }
}

/// Maps an upper-cased identifier to its keyword token type, or `Ident` if
/// it isn't a reserved word.
pub fn lookup_ident(ident: &str) -> TokenType {
    match ident {
        "SELECT" => TokenType::Select,
        "INSERT" => TokenType::Insert,
        "INTO" => TokenType::Into,
        "VALUES" => TokenType::Values,
        "UPDATE" => TokenType::Update,
        "DELETE" => TokenType::Delete,
        "FROM" => TokenType::From,
        "WHERE" => TokenType::Where,
        "SET" => TokenType::Set,
        "AS" => TokenType::As,
        "CREATE" => TokenType::Create,
        "TABLE" => TokenType::Table,
        "DROP" => TokenType::Drop,
        "AND" => TokenType::And,
        "PRIMARY" => TokenType::Primary,
        "KEY" => TokenType::Key,
        "NOT" => TokenType::Not,
        "NULL" => TokenType::Null,
        "UNIQUE" => TokenType::Unique,
        "INT" => TokenType::Int,
        "FLOAT" => TokenType::Float,
        "TRUE" | "FALSE" => TokenType::BoolLiteral,
        "CHAR" => TokenType::Char,
        "BOOL" => TokenType::Bool,
        _ => TokenType::Ident,
    }
}

pub fn is_data_type(ty: TokenType) -> bool {
    matches!(ty, TokenType::Int | TokenType::Float | TokenType::Bool | TokenType::Char)
}
