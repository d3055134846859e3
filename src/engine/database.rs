//! Ties the storage layer and the SQL front end together: one `Database`
//! owns the catalog and a handle per open table, and turns a parsed `Query`
//! into buffer-pool and B+ tree operations.

use crate::core::error::{Result, RootDbError};
use crate::sql::ast::{Condition, Operator, Query, QueryType};
use crate::sql::parser;
use crate::storage::btree::BPlusTree;
use crate::storage::buffer::{BufferPool, Row, DEFAULT_POOL_SIZE};
use crate::storage::catalog::Catalog;
use crate::storage::cell::{decode_cell, encode_literal, Value};
use crate::storage::column::{Column, ColumnType};
use crate::storage::page::PAGE_SIZE;
use crate::storage::table::TableMeta;
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The result of a successfully executed statement.
#[derive(Debug, Clone)]
pub enum QueryResult {
    Rows { columns: Vec<String>, rows: Vec<Vec<Value>> },
    RowsAffected(usize),
}

struct TableState {
    meta: TableMeta,
    btree: BPlusTree,
}

struct TableHandle {
    state: RwLock<TableState>,
    pool: BufferPool,
}

pub struct Database {
    dir: PathBuf,
    catalog: Mutex<Catalog>,
    tables: RwLock<std::collections::HashMap<String, Arc<TableHandle>>>,
}

fn data_path(dir: &Path, table: &str) -> PathBuf {
    dir.join(format!("{table}.db"))
}

fn index_path(dir: &Path, table: &str, pk_column: &str) -> PathBuf {
    dir.join(format!("id{table}{pk_column}.db"))
}

impl Database {
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|e| RootDbError::io(dir, e))?;
        let catalog = Catalog::create(&dir.join("main.db"))?;
        Ok(Self { dir: dir.to_path_buf(), catalog: Mutex::new(catalog), tables: RwLock::new(Default::default()) })
    }

    pub fn open(dir: &Path) -> Result<Self> {
        let catalog = Catalog::open(&dir.join("main.db"))?;
        let mut tables = std::collections::HashMap::new();
        for meta in &catalog.tables {
            let handle = Self::open_table_handle(dir, meta.clone())?;
            tables.insert(meta.name.to_ascii_lowercase(), Arc::new(handle));
        }
        Ok(Self { dir: dir.to_path_buf(), catalog: Mutex::new(catalog), tables: RwLock::new(tables) })
    }

    pub fn table_names(&self) -> Vec<String> {
        self.catalog.lock().tables.iter().map(|t| t.name.clone()).collect()
    }

    pub fn row_count(&self, table: &str) -> Result<usize> {
        let tables = self.tables.read();
        let handle = tables
            .get(&table.to_ascii_lowercase())
            .ok_or_else(|| RootDbError::SchemaError(format!("unknown table {table}")))?
            .clone();
        drop(tables);
        let state = handle.state.read();
        Ok(Self::full_scan(&handle, &state.meta)?.len())
    }

    fn open_table_handle(dir: &Path, mut meta: TableMeta) -> Result<TableHandle> {
        let pool = BufferPool::open(&data_path(dir, &meta.name), DEFAULT_POOL_SIZE)?;
        let btree = BPlusTree::open(&index_path(dir, &meta.name, &meta.primary_key_column().name))?;

        let last_page = pool.last_page();
        let rows = pool.fetch_page(&meta, last_page)?;
        let mut max_pk = meta.last_row_id;
        for row in &rows {
            if let Value::Int(v) = row.primary_key(&meta) {
                if *v as u64 > max_pk {
                    max_pk = *v as u64;
                }
            }
        }
        meta.last_row_id = max_pk;

        Ok(TableHandle { state: RwLock::new(TableState { meta, btree }), pool })
    }

    pub fn execute(&self, sql: &str) -> Result<QueryResult> {
        let query = parser::parse(sql)?;
        match query.query_type {
            QueryType::Create => self.execute_create(query),
            QueryType::Insert => self.execute_insert(query),
            QueryType::Select => self.execute_select(query),
            QueryType::Update => Err(RootDbError::Unsupported("UPDATE is not supported".to_string())),
            QueryType::Delete => Err(RootDbError::Unsupported("DELETE is not supported".to_string())),
            QueryType::Drop => Err(RootDbError::Unsupported("DROP TABLE is not supported".to_string())),
            QueryType::Unknown => unreachable!("the parser rejects a query with no type before it reaches execute"),
        }
    }

    fn execute_create(&self, query: Query) -> Result<QueryResult> {
        let mut catalog = self.catalog.lock();
        if catalog.contains(&query.table_name) {
            return Err(RootDbError::SchemaError(format!("table {} already exists", query.table_name)));
        }

        let mut columns = Vec::with_capacity(query.create.columns.len());
        for col_def in &query.create.columns {
            let col_type = match col_def.type_name.as_str() {
                "INT" => ColumnType::Int,
                "FLOAT" => ColumnType::Float,
                "BOOL" => ColumnType::Bool,
                "CHAR" => ColumnType::Char,
                other => return Err(RootDbError::SchemaError(format!("unknown column type {other}"))),
            };
            let size = match col_type.fixed_size() {
                Some(s) => s,
                None => {
                    let n: u32 = col_def
                        .size
                        .as_deref()
                        .ok_or_else(|| RootDbError::SchemaError(format!("CHAR column {} requires a size", col_def.name)))?
                        .parse()
                        .map_err(|_| RootDbError::SchemaError(format!("invalid size for column {}", col_def.name)))?;
                    if !(1..=255).contains(&n) {
                        return Err(RootDbError::SchemaError(format!(
                            "CHAR size for column {} must be between 1 and 255",
                            col_def.name
                        )));
                    }
                    n as u8
                }
            };

            let is = |list: &[String]| list.iter().any(|c| c.eq_ignore_ascii_case(&col_def.name));
            let primary = is(&query.create.primary);
            let not_nullable = is(&query.create.not_nullable);
            let unique = is(&query.create.unique);
            let nullable = !primary && !not_nullable;

            columns.push(Column::new(col_def.name.clone(), col_type, size, unique, nullable, primary));
        }

        let primary_count = columns.iter().filter(|c| c.primary).count();
        if primary_count != 1 {
            return Err(RootDbError::SchemaError("table must have exactly one PRIMARY KEY column".to_string()));
        }
        let pk_index = columns.iter().position(|c| c.primary).unwrap();
        if columns[pk_index].col_type != ColumnType::Int {
            return Err(RootDbError::SchemaError("the primary key column must be INT".to_string()));
        }

        let meta = TableMeta::new(query.table_name.clone(), columns)?;

        let pool = BufferPool::create(&data_path(&self.dir, &meta.name), DEFAULT_POOL_SIZE)?;
        let btree = BPlusTree::create(&index_path(&self.dir, &meta.name, &meta.primary_key_column().name))?;

        catalog.add_table(meta.clone())?;
        self.tables
            .write()
            .insert(meta.name.to_ascii_lowercase(), Arc::new(TableHandle { state: RwLock::new(TableState { meta, btree }), pool }));

        Ok(QueryResult::RowsAffected(0))
    }

    fn table_handle(&self, name: &str) -> Result<Arc<TableHandle>> {
        self.tables
            .read()
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| RootDbError::SchemaError(format!("unknown table {name}")))
    }

    fn execute_insert(&self, query: Query) -> Result<QueryResult> {
        let handle = self.table_handle(&query.table_name)?;
        let mut state = handle.state.write();

        let mut field_columns = Vec::with_capacity(query.fields.len());
        for field in &query.fields {
            let idx = state
                .meta
                .column_position(field)
                .ok_or_else(|| RootDbError::SchemaError(format!("unknown column {field}")))?;
            field_columns.push(idx);
        }

        let pk_index = state.meta.primary_key_index;
        let mut next_row_id = state.meta.last_row_id;
        let mut batch = Vec::with_capacity(query.inserts.len());

        for row_literals in &query.inserts {
            let mut provided: Vec<Option<&str>> = vec![None; state.meta.columns.len()];
            for (&col_idx, literal) in field_columns.iter().zip(row_literals.iter()) {
                provided[col_idx] = Some(literal.as_str());
            }

            let mut cells = Vec::with_capacity(state.meta.columns.len());
            for (i, col) in state.meta.columns.iter().enumerate() {
                if i == pk_index {
                    let pk = match provided[i] {
                        Some(literal) => {
                            let v: i64 = literal
                                .parse()
                                .map_err(|_| RootDbError::TypeError(format!("'{literal}' is not a valid INT")))?;
                            if v <= 0 || (v as u64) <= next_row_id {
                                return Err(RootDbError::ConstraintViolation(format!(
                                    "primary key {v} must be greater than the current last row id {next_row_id}"
                                )));
                            }
                            if state.btree.find(v as u64).is_some() {
                                return Err(RootDbError::ConstraintViolation(format!("duplicate primary key {v}")));
                            }
                            next_row_id = v as u64;
                            v
                        }
                        None => {
                            next_row_id += 1;
                            next_row_id as i64
                        }
                    };
                    cells.push(Value::Int(pk));
                } else {
                    match provided[i] {
                        Some(literal) => cells.push(decode_cell(col, &encode_literal(col, literal)?)?),
                        None => {
                            if !col.nullable {
                                return Err(RootDbError::ConstraintViolation(format!("column {} is not nullable", col.name)));
                            }
                            cells.push(Value::Null);
                        }
                    }
                }
            }
            batch.push(cells);
        }

        let offsets = handle.pool.insert_rows(&state.meta, &batch)?;
        for (pk, offset) in &offsets {
            state.btree.insert(*pk as u64, *offset)?;
        }
        state.meta.last_row_id = next_row_id;

        self.catalog.lock().update_table(&state.meta.name, |t| t.last_row_id = next_row_id)?;

        Ok(QueryResult::RowsAffected(offsets.len()))
    }

    fn execute_select(&self, query: Query) -> Result<QueryResult> {
        let handle = self.table_handle(&query.table_name)?;
        let state = handle.state.read();
        let meta = &state.meta;

        let projected: Vec<usize> = if query.fields.len() == 1 && query.fields[0] == "*" {
            (0..meta.columns.len()).collect()
        } else {
            query
                .fields
                .iter()
                .map(|f| meta.column_position(f).ok_or_else(|| RootDbError::SchemaError(format!("unknown column {f}"))))
                .collect::<Result<Vec<_>>>()?
        };

        let pk_name = meta.primary_key_column().name.clone();
        let indexed = query
            .conditions
            .iter()
            .position(|c| c.operand1_is_field && c.operand1.eq_ignore_ascii_case(&pk_name) && !c.operand2_is_field);

        let candidates = match indexed {
            Some(idx) => {
                let cond = &query.conditions[idx];
                let key: i64 = cond
                    .operand2
                    .parse()
                    .map_err(|_| RootDbError::TypeError(format!("'{}' is not a valid INT", cond.operand2)))?;
                self.indexed_candidates(&handle, &state, cond.operator, key)?
            }
            None => Self::full_scan(&handle, meta)?,
        };

        let mut out = Vec::new();
        'rows: for row in candidates {
            for cond in &query.conditions {
                if !condition_holds(meta, &row, cond)? {
                    continue 'rows;
                }
            }
            out.push(projected.iter().map(|&i| row.cells[i].clone()).collect());
        }

        let columns = projected.iter().map(|&i| meta.columns[i].name.clone()).collect();
        Ok(QueryResult::Rows { columns, rows: out })
    }

    fn indexed_candidates(&self, handle: &TableHandle, state: &TableState, operator: Operator, key: i64) -> Result<Vec<Row>> {
        if key < 0 {
            return Ok(Vec::new());
        }
        let key = key as u64;
        match operator {
            Operator::Eq => match state.btree.find(key) {
                Some(offset) => Ok(vec![handle.pool.fetch_row_at(&state.meta, offset)?]),
                None => Ok(Vec::new()),
            },
            Operator::Gt => Self::fetch_by_entries(handle, &state.meta, state.btree.entries_from(key, false)),
            Operator::Gte => Self::fetch_by_entries(handle, &state.meta, state.btree.entries_from(key, true)),
            Operator::Lt => Self::fetch_by_entries(handle, &state.meta, state.btree.entries_until(key, false)),
            Operator::Lte => Self::fetch_by_entries(handle, &state.meta, state.btree.entries_until(key, true)),
            Operator::Ne | Operator::Unknown => Self::full_scan(handle, &state.meta),
        }
    }

    fn fetch_by_entries(handle: &TableHandle, meta: &TableMeta, entries: Vec<(u64, u64)>) -> Result<Vec<Row>> {
        let keys: HashSet<u64> = entries.iter().map(|(k, _)| *k).collect();
        let mut page_ids: Vec<u64> = entries.iter().map(|(_, offset)| offset / PAGE_SIZE as u64).collect();
        page_ids.sort_unstable();
        page_ids.dedup();

        let mut out = Vec::new();
        for page_id in page_ids {
            for row in handle.pool.fetch_page(meta, page_id)? {
                if let Value::Int(pk) = row.primary_key(meta) {
                    if keys.contains(&(*pk as u64)) {
                        out.push(row);
                    }
                }
            }
        }
        Ok(out)
    }

    fn full_scan(handle: &TableHandle, meta: &TableMeta) -> Result<Vec<Row>> {
        let last_page = handle.pool.last_page();
        let mut out = Vec::new();
        for page_id in 0..=last_page {
            out.extend(handle.pool.fetch_page(meta, page_id)?);
        }
        Ok(out)
    }
}

fn literal_to_value(col: &Column, literal: &str) -> Result<Value> {
    decode_cell(col, &encode_literal(col, literal)?)
}

fn condition_holds(meta: &TableMeta, row: &Row, cond: &Condition) -> Result<bool> {
    let left_index = meta
        .column_position(&cond.operand1)
        .ok_or_else(|| RootDbError::SchemaError(format!("unknown column {}", cond.operand1)))?;
    let left = &row.cells[left_index];
    let col = &meta.columns[left_index];

    let right = if cond.operand2_is_field {
        let right_index = meta
            .column_position(&cond.operand2)
            .ok_or_else(|| RootDbError::SchemaError(format!("unknown column {}", cond.operand2)))?;
        row.cells[right_index].clone()
    } else {
        literal_to_value(col, &cond.operand2)?
    };

    use std::cmp::Ordering;
    match cond.operator {
        Operator::Eq => Ok(left.compare(&right)? == Ordering::Equal),
        Operator::Ne => Ok(left.compare(&right)? != Ordering::Equal),
        Operator::Gt | Operator::Gte | Operator::Lt | Operator::Lte => {
            if matches!(left, Value::Bool(_)) || matches!(right, Value::Bool(_)) {
                return Err(RootDbError::TypeError("ordering operators are not allowed on BOOL".to_string()));
            }
            let ord = left.compare(&right)?;
            Ok(match cond.operator {
                Operator::Gt => ord == Ordering::Greater,
                Operator::Gte => ord != Ordering::Less,
                Operator::Lt => ord == Ordering::Less,
                Operator::Lte => ord != Ordering::Greater,
                _ => unreachable!(),
            })
        }
        Operator::Unknown => unreachable!("validated queries never carry an Unknown operator"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::create(dir.path()).unwrap();
        (dir, db)
    }

    fn create_sample_table(db: &Database) {
        db.execute("CREATE TABLE t (id INT PRIMARY KEY, name CHAR(10), flag BOOL, val FLOAT, k INT);").unwrap();
    }

    #[test]
    fn s1_create_insert_select_all() {
        let (_dir, db) = open_db();
        create_sample_table(&db);
        db.execute(
            "INSERT INTO t (id,name,flag,val,k) VALUES \
             (1,'somecharss',true,1.23,2), \
             (2,'10letters',false,4.69,2), \
             (3,'Kevin',true,.567,2), \
             (4,'tim',false,.678,2), \
             (5,'stringsss',true,5.36,3);",
        )
        .unwrap();

        let result = db.execute("SELECT * FROM t;").unwrap();
        match result {
            QueryResult::Rows { rows, .. } => {
                assert_eq!(rows.len(), 5);
                assert_eq!(rows[0][0], Value::Int(1));
                assert_eq!(rows[4][0], Value::Int(5));
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn s2_indexed_equality_returns_one_row() {
        let (_dir, db) = open_db();
        create_sample_table(&db);
        db.execute(
            "INSERT INTO t (id,name,flag,val,k) VALUES (1,'a',true,1.0,1),(2,'b',false,2.0,2),(3,'c',true,3.0,3);",
        )
        .unwrap();

        let result = db.execute("SELECT * FROM t WHERE id = 3;").unwrap();
        match result {
            QueryResult::Rows { rows, .. } => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0][0], Value::Int(3));
            }
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn s4_null_projection_comes_back_as_null() {
        let (_dir, db) = open_db();
        create_sample_table(&db);
        db.execute("INSERT INTO t (id) VALUES (1);").unwrap();
        let result = db.execute("SELECT name FROM t WHERE id = 1;").unwrap();
        match result {
            QueryResult::Rows { rows, .. } => assert_eq!(rows[0][0], Value::Null),
            other => panic!("expected rows, got {other:?}"),
        }
    }

    #[test]
    fn s5_duplicate_primary_key_is_rejected() {
        let (_dir, db) = open_db();
        create_sample_table(&db);
        db.execute("INSERT INTO t (id) VALUES (3);").unwrap();
        let err = db.execute("INSERT INTO t (id) VALUES (3);").unwrap_err();
        assert!(matches!(err, RootDbError::ConstraintViolation(_)));
    }

    #[test]
    fn update_delete_drop_are_unsupported() {
        let (_dir, db) = open_db();
        create_sample_table(&db);
        db.execute("INSERT INTO t (id) VALUES (1);").unwrap();
        assert!(matches!(db.execute("UPDATE t SET name = 'x' WHERE id = 1;"), Err(RootDbError::Unsupported(_))));
        assert!(matches!(db.execute("DELETE FROM t WHERE id = 1;"), Err(RootDbError::Unsupported(_))));
        assert!(matches!(db.execute("DROP TABLE t;"), Err(RootDbError::Unsupported(_))));
    }

    #[test]
    fn bool_ordering_is_rejected() {
        let (_dir, db) = open_db();
        create_sample_table(&db);
        db.execute("INSERT INTO t (id,flag) VALUES (1,true);").unwrap();
        let err = db.execute("SELECT * FROM t WHERE flag > false;").unwrap_err();
        assert!(matches!(err, RootDbError::TypeError(_)));
    }

    #[test]
    fn reopen_preserves_rows_and_last_row_id() {
        let dir = TempDir::new().unwrap();
        {
            let db = Database::create(dir.path()).unwrap();
            create_sample_table(&db);
            db.execute("INSERT INTO t (id,name) VALUES (1,'a'),(2,'b');").unwrap();
        }
        let db = Database::open(dir.path()).unwrap();
        let result = db.execute("SELECT * FROM t;").unwrap();
        match result {
            QueryResult::Rows { rows, .. } => assert_eq!(rows.len(), 2),
            other => panic!("expected rows, got {other:?}"),
        }
        let err = db.execute("INSERT INTO t (id) VALUES (1);").unwrap_err();
        assert!(matches!(err, RootDbError::ConstraintViolation(_)));
    }

    #[test]
    fn range_query_over_many_rows() {
        let (_dir, db) = open_db();
        db.execute("CREATE TABLE t (id INT PRIMARY KEY);").unwrap();
        for chunk_start in (1..=500).step_by(50) {
            let values: Vec<String> = (chunk_start..chunk_start + 50).map(|i| format!("({i})")).collect();
            db.execute(&format!("INSERT INTO t (id) VALUES {};", values.join(","))).unwrap();
        }

        let result = db.execute("SELECT id FROM t WHERE id >= 480 AND id <= 490;").unwrap();
        match result {
            QueryResult::Rows { rows, .. } => assert_eq!(rows.len(), 11),
            other => panic!("expected rows, got {other:?}"),
        }
    }
}
