//! Step-driven recursive-descent parser: a state machine walking
//! `(curToken, peekToken)`, one state per grammar position, the same shape
//! as the host project's own parser.

use crate::core::error::{Result, RootDbError};
use crate::sql::ast::{ColumnDef, Condition, Operator, Query, QueryType};
use crate::sql::lexer::Lexer;
use crate::sql::token::{is_data_type, Token, TokenType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Type,
    SelectField,
    SelectFrom,
    SelectComma,
    SelectFromTable,
    InsertTable,
    InsertFieldsOpeningParens,
    InsertFields,
    InsertFieldsCommaOrClosingParens,
    InsertValuesOpeningParens,
    InsertValuesWord,
    InsertValues,
    InsertValuesCommaOrClosingParens,
    InsertValuesCommaBeforeOpeningParens,
    UpdateTable,
    UpdateSet,
    UpdateField,
    UpdateEquals,
    UpdateValue,
    UpdateComma,
    DeleteFromTable,
    Where,
    WhereField,
    WhereOperator,
    WhereValue,
    WhereAnd,
    CreateTable,
    CreateFieldsOpeningParens,
    CreateFields,
    CreateColumnType,
    CreateColumnSize,
    CreateConstraints,
    DropTable,
    Done,
}

pub fn parse(sql: &str) -> Result<Query> {
    Parser::new(sql)?.run()
}

struct Parser {
    sql: String,
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    step: Step,
    query: Query,
    next_update_field: String,
}

fn err(lexer_pos: usize, message: impl Into<String>) -> RootDbError {
    RootDbError::ParseError { position: lexer_pos, message: message.into() }
}

impl Parser {
    fn new(sql: &str) -> Result<Self> {
        let trimmed = sql.trim().to_string();
        if trimmed.is_empty() {
            return Err(err(0, "query type cannot be empty"));
        }
        if !trimmed.ends_with(';') {
            return Err(err(trimmed.len(), "sql string must end in semicolon"));
        }

        let mut lexer = Lexer::new(&trimmed);
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();

        Ok(Self {
            sql: trimmed,
            lexer,
            cur_token,
            peek_token,
            step: Step::Type,
            query: Query::default(),
            next_update_field: String::new(),
        })
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    fn pos(&self) -> usize {
        self.lexer.position()
    }

    fn err_here(&self, message: impl Into<String>) -> RootDbError {
        err(self.pos(), message.into())
    }

    fn run(mut self) -> Result<Query> {
        self.do_parse()?;
        validate(&self.query, self.step)?;
        Ok(self.query)
    }

    fn do_parse(&mut self) -> Result<()> {
        while self.cur_token.ty != TokenType::Eof {
            if self.cur_token.ty == TokenType::Illegal {
                return Err(self.err_here("unknown token in sql string"));
            }
            match self.step {
                Step::Type => self.step_type()?,
                Step::SelectField => self.step_select_field()?,
                Step::SelectComma => self.step_select_comma()?,
                Step::SelectFrom => self.step_select_from()?,
                Step::SelectFromTable => self.step_select_from_table()?,
                Step::DeleteFromTable => self.step_delete_from_table()?,
                Step::UpdateTable => self.step_update_table()?,
                Step::UpdateSet => self.step_update_set()?,
                Step::UpdateField => self.step_update_field()?,
                Step::UpdateEquals => self.step_update_equals()?,
                Step::UpdateValue => {
                    if self.step_update_value()? {
                        self.next_token();
                        continue;
                    }
                }
                Step::UpdateComma => {
                    if self.step_update_comma()? {
                        return Ok(());
                    }
                }
                Step::Where => {
                    if self.step_where()? {
                        continue;
                    }
                }
                Step::WhereField => self.step_where_field()?,
                Step::WhereOperator => self.step_where_operator()?,
                Step::WhereValue => {
                    if self.step_where_value()? {
                        return Ok(());
                    }
                }
                Step::WhereAnd => self.step_where_and()?,
                Step::InsertTable => self.step_insert_table()?,
                Step::InsertFieldsOpeningParens => self.step_insert_fields_opening_parens()?,
                Step::InsertFields => self.step_insert_fields()?,
                Step::InsertFieldsCommaOrClosingParens => self.step_insert_fields_comma_or_closing()?,
                Step::InsertValuesWord => self.step_insert_values_word()?,
                Step::InsertValuesOpeningParens => self.step_insert_values_opening_parens()?,
                Step::InsertValues => self.step_insert_values()?,
                Step::InsertValuesCommaOrClosingParens => {
                    if self.step_insert_values_comma_or_closing()? {
                        continue;
                    }
                }
                Step::InsertValuesCommaBeforeOpeningParens => {
                    if self.step_insert_values_comma_before_opening()? {
                        return Ok(());
                    }
                }
                Step::CreateTable => self.step_create_table()?,
                Step::CreateFieldsOpeningParens => self.step_create_fields_opening_parens()?,
                Step::CreateFields => self.step_create_fields()?,
                Step::CreateColumnType => {
                    if self.step_create_column_type()? {
                        return Ok(());
                    }
                }
                Step::CreateColumnSize => {
                    if self.step_create_column_size()? {
                        return Ok(());
                    }
                }
                Step::CreateConstraints => {
                    if self.step_create_constraints()? {
                        return Ok(());
                    }
                }
                Step::DropTable => {
                    self.step_drop_table()?;
                    return Ok(());
                }
                Step::Done => return Ok(()),
            }
            self.next_token();
        }
        Ok(())
    }

    fn step_type(&mut self) -> Result<()> {
        match self.cur_token.ty {
            TokenType::Select => {
                self.query.query_type = QueryType::Select;
                self.step = Step::SelectField;
            }
            TokenType::Insert => {
                self.query.query_type = QueryType::Insert;
                self.next_token();
                if self.cur_token.ty != TokenType::Into {
                    return Err(self.err_here("insert statement invalid at INTO"));
                }
                self.step = Step::InsertTable;
            }
            TokenType::Update => {
                self.query.query_type = QueryType::Update;
                self.step = Step::UpdateTable;
            }
            TokenType::Delete => {
                self.query.query_type = QueryType::Delete;
                self.next_token();
                if self.cur_token.ty != TokenType::From {
                    return Err(self.err_here("delete statement invalid at DELETE"));
                }
                self.step = Step::DeleteFromTable;
            }
            TokenType::Create => {
                self.query.query_type = QueryType::Create;
                self.next_token();
                if self.cur_token.ty != TokenType::Table {
                    return Err(self.err_here("create statement invalid at CREATE"));
                }
                self.step = Step::CreateTable;
            }
            TokenType::Drop => {
                self.query.query_type = QueryType::Drop;
                self.next_token();
                if self.cur_token.ty != TokenType::Table {
                    return Err(self.err_here("drop statement invalid at DROP"));
                }
                self.step = Step::DropTable;
            }
            _ => return Err(self.err_here("invalid query type")),
        }
        Ok(())
    }

    fn step_select_field(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident && self.cur_token.ty != TokenType::Asterisk {
            return Err(self.err_here("at SELECT: expected field to SELECT"));
        }
        let identifier = self.cur_token.literal.clone();
        self.query.fields.push(identifier.clone());
        if self.peek_token.ty == TokenType::As {
            self.next_token();
            if self.peek_token.ty != TokenType::Ident {
                return Err(self.err_here(format!("at SELECT: expected field alias for \"{identifier} as\" to SELECT")));
            }
            self.query.aliases.insert(identifier, self.peek_token.literal.clone());
            self.next_token();
        }
        self.step = if self.peek_token.ty == TokenType::From { Step::SelectFrom } else { Step::SelectComma };
        Ok(())
    }

    fn step_select_comma(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Comma {
            return Err(self.err_here("at SELECT: expected comma or FROM"));
        }
        self.step = Step::SelectField;
        Ok(())
    }

    fn step_select_from(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::From {
            return Err(self.err_here("at SELECT: expected FROM"));
        }
        self.step = Step::SelectFromTable;
        Ok(())
    }

    fn step_select_from_table(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at SELECT: expected table name"));
        }
        self.query.table_name = self.cur_token.literal.clone();
        self.step = Step::Where;
        Ok(())
    }

    fn step_delete_from_table(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at DELETE FROM: expected table name"));
        }
        self.query.table_name = self.cur_token.literal.clone();
        self.step = Step::Where;
        Ok(())
    }

    fn step_update_table(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at UPDATE: expected table name"));
        }
        self.query.table_name = self.cur_token.literal.clone();
        self.step = Step::UpdateSet;
        Ok(())
    }

    fn step_update_set(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Set {
            return Err(self.err_here("at UPDATE: expected 'SET'"));
        }
        self.step = Step::UpdateField;
        Ok(())
    }

    fn step_update_field(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at UPDATE: expected at least one field to update"));
        }
        self.next_update_field = self.cur_token.literal.clone();
        self.step = Step::UpdateEquals;
        Ok(())
    }

    fn step_update_equals(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Eq {
            return Err(self.err_here("at UPDATE: expected '='"));
        }
        self.step = Step::UpdateValue;
        Ok(())
    }

    /// Returns `true` when the statement is finished (terminated early, as
    /// the Go original does by returning straight out of the switch).
    fn step_update_value(&mut self) -> Result<bool> {
        if self.cur_token.ty != TokenType::StringLiteral && self.cur_token.ty != TokenType::NumberLiteral {
            return Err(self.err_here("at UPDATE: expected value for update"));
        }
        let field = std::mem::take(&mut self.next_update_field);
        self.query.updates.push((field, self.cur_token.literal.clone()));
        self.step = if self.peek_token.ty == TokenType::Where { Step::Where } else { Step::UpdateComma };
        Ok(false)
    }

    fn step_update_comma(&mut self) -> Result<bool> {
        if self.cur_token.ty == TokenType::Semicolon {
            return Ok(true);
        }
        if self.cur_token.ty != TokenType::Comma {
            return Err(self.err_here("at UPDATE: expected ','"));
        }
        self.step = Step::UpdateField;
        Ok(false)
    }

    /// Returns `true` when the caller should `continue` without advancing
    /// the token (mirrors the Go `break` out of the switch on `;`).
    fn step_where(&mut self) -> Result<bool> {
        if self.cur_token.ty == TokenType::Semicolon {
            self.next_token();
            return Ok(true);
        }
        if self.cur_token.ty != TokenType::Where {
            return Err(self.err_here("expected WHERE"));
        }
        self.step = Step::WhereField;
        Ok(false)
    }

    fn step_where_field(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at WHERE: expected field"));
        }
        self.query.conditions.push(Condition {
            operand1: self.cur_token.literal.clone(),
            operand1_is_field: true,
            ..Default::default()
        });
        self.step = Step::WhereOperator;
        Ok(())
    }

    fn step_where_operator(&mut self) -> Result<()> {
        let operator = match self.cur_token.ty {
            TokenType::Eq => Operator::Eq,
            TokenType::Gt => Operator::Gt,
            TokenType::Gte => Operator::Gte,
            TokenType::Lt => Operator::Lt,
            TokenType::Lte => Operator::Lte,
            TokenType::NotEq => Operator::Ne,
            _ => return Err(self.err_here("at WHERE: unknown operator")),
        };
        self.query.conditions.last_mut().unwrap().operator = operator;
        self.step = Step::WhereValue;
        Ok(())
    }

    fn step_where_value(&mut self) -> Result<bool> {
        let condition = self.query.conditions.last_mut().unwrap();
        match self.cur_token.ty {
            TokenType::BoolLiteral => {
                condition.operand2 = self.cur_token.literal.to_ascii_uppercase();
                condition.operand2_is_field = false;
            }
            TokenType::Ident => {
                condition.operand2 = self.cur_token.literal.clone();
                condition.operand2_is_field = true;
            }
            TokenType::StringLiteral | TokenType::NumberLiteral => {
                condition.operand2 = self.cur_token.literal.clone();
                condition.operand2_is_field = false;
            }
            _ => return Err(self.err_here("at WHERE: expected value")),
        }
        if self.peek_token.ty == TokenType::Semicolon {
            return Ok(true);
        }
        self.step = Step::WhereAnd;
        Ok(false)
    }

    fn step_where_and(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::And {
            return Err(self.err_here("at WHERE: expected AND"));
        }
        self.step = Step::WhereField;
        Ok(())
    }

    fn step_insert_table(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at INSERT INTO: expected table name"));
        }
        self.query.table_name = self.cur_token.literal.clone();
        self.step = Step::InsertFieldsOpeningParens;
        Ok(())
    }

    fn step_insert_fields_opening_parens(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::LParen {
            return Err(self.err_here("at INSERT INTO: expected opening parens"));
        }
        self.step = Step::InsertFields;
        Ok(())
    }

    fn step_insert_fields(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at INSERT INTO: expected at least one field to insert"));
        }
        self.query.fields.push(self.cur_token.literal.clone());
        self.step = Step::InsertFieldsCommaOrClosingParens;
        Ok(())
    }

    fn step_insert_fields_comma_or_closing(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Comma && self.cur_token.ty != TokenType::RParen {
            return Err(self.err_here("at INSERT INTO: expected comma or closing parens"));
        }
        self.step = if self.cur_token.ty == TokenType::Comma { Step::InsertFields } else { Step::InsertValuesWord };
        Ok(())
    }

    fn step_insert_values_word(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Values {
            return Err(self.err_here("at INSERT INTO: expected 'VALUES'"));
        }
        self.step = Step::InsertValuesOpeningParens;
        Ok(())
    }

    fn step_insert_values_opening_parens(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::LParen {
            return Err(self.err_here("at INSERT INTO: expected opening parens"));
        }
        self.query.inserts.push(Vec::new());
        self.step = Step::InsertValues;
        Ok(())
    }

    fn step_insert_values(&mut self) -> Result<()> {
        if !matches!(self.cur_token.ty, TokenType::StringLiteral | TokenType::NumberLiteral | TokenType::BoolLiteral) {
            return Err(self.err_here(format!(
                "at INSERT INTO: expected value to insert, got '{}'",
                self.cur_token.literal
            )));
        }
        self.query.inserts.last_mut().unwrap().push(self.cur_token.literal.clone());
        self.step = Step::InsertValuesCommaOrClosingParens;
        Ok(())
    }

    fn step_insert_values_comma_or_closing(&mut self) -> Result<bool> {
        if self.cur_token.ty != TokenType::Comma && self.cur_token.ty != TokenType::RParen {
            return Err(self.err_here("at INSERT INTO: expected comma or closing parens"));
        }
        if self.cur_token.ty == TokenType::Comma {
            self.step = Step::InsertValues;
            self.next_token();
            return Ok(true);
        }
        let row_len = self.query.inserts.last().unwrap().len();
        if row_len < self.query.fields.len() {
            return Err(self.err_here("at INSERT INTO: value count doesn't match field count"));
        }
        self.step = Step::InsertValuesCommaBeforeOpeningParens;
        Ok(false)
    }

    fn step_insert_values_comma_before_opening(&mut self) -> Result<bool> {
        if self.cur_token.ty == TokenType::Semicolon {
            return Ok(true);
        }
        if self.cur_token.ty != TokenType::Comma {
            return Err(self.err_here("at INSERT INTO: expected comma"));
        }
        self.step = Step::InsertValuesOpeningParens;
        Ok(false)
    }

    fn step_create_table(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at CREATE TABLE: expected table name"));
        }
        self.query.table_name = self.cur_token.literal.clone();
        self.step = Step::CreateFieldsOpeningParens;
        Ok(())
    }

    fn step_create_fields_opening_parens(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::LParen {
            return Err(self.err_here("at CREATE TABLE: expected opening parens"));
        }
        self.step = Step::CreateFields;
        Ok(())
    }

    fn step_create_fields(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at CREATE TABLE: expected field to CREATE"));
        }
        self.query.fields.push(self.cur_token.literal.clone());
        self.query.create.columns.push(ColumnDef { name: self.cur_token.literal.clone(), type_name: String::new(), size: None });
        self.step = Step::CreateColumnType;
        Ok(())
    }

    fn step_create_column_type(&mut self) -> Result<bool> {
        if !is_data_type(self.cur_token.ty) {
            return Err(self.err_here("at CREATE TABLE: expected valid data type for column"));
        }
        self.query.create.columns.last_mut().unwrap().type_name = self.cur_token.literal.to_ascii_uppercase();

        if self.peek_token.ty == TokenType::LParen {
            self.step = Step::CreateColumnSize;
            self.next_token();
        } else if self.peek_token.ty == TokenType::Comma {
            self.step = Step::CreateFields;
            self.next_token();
        } else if self.peek_token.ty == TokenType::RParen {
            self.next_token();
            if self.peek_token.ty != TokenType::Semicolon {
                return Err(self.err_here("at CREATE TABLE: expected semicolon to end sql"));
            }
            return Ok(true);
        } else {
            self.step = Step::CreateConstraints;
        }
        Ok(false)
    }

    fn step_create_column_size(&mut self) -> Result<bool> {
        if self.cur_token.ty != TokenType::NumberLiteral {
            return Err(self.err_here("at CREATE TABLE: expected number for datatype size"));
        }
        self.query.create.columns.last_mut().unwrap().size = Some(self.cur_token.literal.clone());
        if self.peek_token.ty != TokenType::RParen {
            return Err(self.err_here("at CREATE TABLE: expected closing parens for size value"));
        }
        self.next_token();
        if self.peek_token.ty == TokenType::Comma {
            self.step = Step::CreateFields;
            self.next_token();
        } else if self.peek_token.ty == TokenType::RParen {
            self.next_token();
            if self.peek_token.ty != TokenType::Semicolon {
                return Err(self.err_here("at CREATE TABLE: expected semicolon to end sql"));
            }
            return Ok(true);
        } else {
            self.step = Step::CreateConstraints;
        }
        Ok(false)
    }

    fn step_create_constraints(&mut self) -> Result<bool> {
        let last_field = self.query.fields.last().cloned().unwrap_or_default();
        match self.cur_token.ty {
            TokenType::Primary => {
                self.next_token();
                if self.cur_token.ty != TokenType::Key {
                    return Err(self.err_here("at CREATE TABLE: expected KEY after PRIMARY keyword"));
                }
                self.query.create.primary.push(last_field);
            }
            TokenType::Unique => self.query.create.unique.push(last_field),
            TokenType::Not => {
                self.next_token();
                if self.cur_token.ty != TokenType::Null {
                    return Err(self.err_here("at CREATE TABLE: expected NULL after NOT keyword"));
                }
                self.query.create.not_nullable.push(last_field);
            }
            TokenType::Null => self.query.create.nullable.push(last_field),
            _ => return Err(self.err_here("at CREATE TABLE: expected constraint keyword")),
        }

        if self.peek_token.ty == TokenType::Comma {
            self.step = Step::CreateFields;
            self.next_token();
        } else if self.peek_token.ty == TokenType::RParen {
            self.next_token();
            if self.peek_token.ty != TokenType::Semicolon {
                return Err(self.err_here("at CREATE TABLE: expected semicolon to end sql string"));
            }
            return Ok(true);
        } else {
            self.step = Step::CreateConstraints;
        }
        Ok(false)
    }

    fn step_drop_table(&mut self) -> Result<()> {
        if self.cur_token.ty != TokenType::Ident {
            return Err(self.err_here("at DROP TABLE: expected table name"));
        }
        self.query.table_name = self.cur_token.literal.clone();
        if self.peek_token.ty != TokenType::Semicolon {
            return Err(self.err_here("at DROP TABLE: missing semicolon after table name"));
        }
        Ok(())
    }
}

fn validate(query: &Query, final_step: Step) -> Result<()> {
    if query.conditions.is_empty() && final_step == Step::WhereField {
        return Err(err(0, "at WHERE: empty WHERE clause"));
    }
    if query.query_type == QueryType::Unknown {
        return Err(err(0, "query type cannot be empty"));
    }
    if query.table_name.is_empty() {
        return Err(err(0, "table name cannot be empty"));
    }
    if query.conditions.is_empty() && matches!(query.query_type, QueryType::Update | QueryType::Delete) {
        return Err(err(0, "at WHERE: WHERE clause is mandatory for UPDATE & DELETE"));
    }
    for condition in &query.conditions {
        if condition.operator == Operator::Unknown {
            return Err(err(0, "at WHERE: condition without operator"));
        }
        if condition.operand1.is_empty() && condition.operand1_is_field {
            return Err(err(0, "at WHERE: condition with empty left side operand"));
        }
        if condition.operand2.is_empty() && condition.operand2_is_field {
            return Err(err(0, "at WHERE: condition with empty right side operand"));
        }
    }
    if query.query_type == QueryType::Insert {
        if query.inserts.is_empty() {
            return Err(err(0, "at INSERT INTO: need at least one row to insert"));
        }
        for row in &query.inserts {
            if row.len() != query.fields.len() {
                return Err(err(0, "at INSERT INTO: value count doesn't match field count"));
            }
        }
    }
    if query.query_type == QueryType::Create {
        if query.fields.is_empty() {
            return Err(err(0, "at CREATE TABLE: can't have empty table"));
        }
        let overlap: Vec<&String> =
            query.create.nullable.iter().filter(|c| query.create.not_nullable.contains(c)).collect();
        if !overlap.is_empty() {
            return Err(err(0, format!("at CREATE TABLE: cannot have column be both nullable and non-nullable for columns: {overlap:?}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_select_with_where() {
        let q = parse("SELECT * FROM users WHERE id = 3;").unwrap();
        assert_eq!(q.query_type, QueryType::Select);
        assert_eq!(q.table_name, "users");
        assert_eq!(q.fields, vec!["*"]);
        assert_eq!(q.conditions.len(), 1);
        assert_eq!(q.conditions[0].operator, Operator::Eq);
    }

    #[test]
    fn parses_select_with_alias_and_multiple_fields() {
        let q = parse("SELECT id AS uid, name FROM users;").unwrap();
        assert_eq!(q.fields, vec!["id", "name"]);
        assert_eq!(q.aliases.get("id"), Some(&"uid".to_string()));
    }

    #[test]
    fn parses_insert_with_multiple_rows() {
        let q = parse("INSERT INTO t (a, b) VALUES (1, 'x'), (2, 'y');").unwrap();
        assert_eq!(q.query_type, QueryType::Insert);
        assert_eq!(q.inserts.len(), 2);
        assert_eq!(q.inserts[0], vec!["1", "x"]);
    }

    #[test]
    fn parses_create_table_with_constraints() {
        let q = parse("CREATE TABLE t (id INT PRIMARY KEY, name CHAR(10) NOT NULL);").unwrap();
        assert_eq!(q.query_type, QueryType::Create);
        assert_eq!(q.create.columns.len(), 2);
        assert_eq!(q.create.columns[1].size, Some("10".to_string()));
        assert_eq!(q.create.primary, vec!["id"]);
        assert_eq!(q.create.not_nullable, vec!["name"]);
    }

    #[test]
    fn update_and_delete_require_where() {
        assert!(parse("UPDATE t SET a = 1;").is_err());
        assert!(parse("DELETE FROM t;").is_err());
        assert!(parse("UPDATE t SET a = 1 WHERE id = 1;").is_ok());
    }

    #[test]
    fn missing_semicolon_is_rejected() {
        assert!(parse("SELECT * FROM t").is_err());
    }

    #[test]
    fn insert_value_count_mismatch_is_rejected() {
        assert!(parse("INSERT INTO t (a, b) VALUES (1);").is_err());
    }

    #[test]
    fn parses_drop_table() {
        let q = parse("DROP TABLE t;").unwrap();
        assert_eq!(q.query_type, QueryType::Drop);
        assert_eq!(q.table_name, "t");
    }

    #[test]
    fn create_nullable_and_not_nullable_conflict_is_rejected() {
        assert!(parse("CREATE TABLE t (id INT NULL NOT NULL);").is_err());
    }
}
