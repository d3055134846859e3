//! The parsed statement shape. Mirrors the host project's `Query` struct
//! field for field; only the representation of maps (insertion-ordered
//! `Vec` pairs instead of a hash map) differs, since statement order matters
//! for `UPDATE ... SET a=1, b=2`.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryType {
    #[default]
    Unknown,
    Select,
    Update,
    Insert,
    Delete,
    Create,
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operator {
    #[default]
    Unknown,
    Eq,
    Ne,
    Gt,
    Lt,
    Gte,
    Lte,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Condition {
    pub operand1: String,
    pub operand1_is_field: bool,
    pub operator: Operator,
    pub operand2: String,
    pub operand2_is_field: bool,
}

/// One `<name> <type>[(<size>)] {PRIMARY KEY|UNIQUE|NOT NULL|NULL}*` clause.
#[derive(Debug, Clone, Default)]
pub struct ColumnDef {
    pub name: String,
    pub type_name: String,
    pub size: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateClauses {
    pub columns: Vec<ColumnDef>,
    pub nullable: Vec<String>,
    pub not_nullable: Vec<String>,
    pub primary: Vec<String>,
    pub unique: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Query {
    pub query_type: QueryType,
    pub table_name: String,
    pub conditions: Vec<Condition>,
    /// `SET` assignments in source order: `(column, literal)`.
    pub updates: Vec<(String, String)>,
    /// One `Vec<String>` of literals per `VALUES (...)` row.
    pub inserts: Vec<Vec<String>>,
    /// SELECTed/INSERTed/CREATEd field names, in source order.
    pub fields: Vec<String>,
    pub aliases: std::collections::HashMap<String, String>,
    pub create: CreateClauses,
}
