//! The `main.db` catalog file: a 100-byte header followed by every table's
//! persisted metadata, concatenated. Rewritten atomically on every schema
//! change via a temp-file rename.

use crate::core::error::{Result, RootDbError};
use crate::storage::page::PAGE_SIZE;
use crate::storage::table::TableMeta;
use byteorder::{ByteOrder, LittleEndian};
use std::io::Cursor;
use std::path::{Path, PathBuf};

pub const MAGIC: &[u8; 16] = b"RootDB MAINFILE\0";
pub const HEADER_SIZE: usize = 100;

pub struct Catalog {
    path: PathBuf,
    pub page_size: u16,
    pub tables: Vec<TableMeta>,
}

impl Catalog {
    /// Creates a brand new, empty catalog file at `path`.
    pub fn create(path: &Path) -> Result<Self> {
        let catalog = Catalog { path: path.to_path_buf(), page_size: PAGE_SIZE as u16, tables: Vec::new() };
        catalog.write_atomic()?;
        Ok(catalog)
    }

    /// Opens an existing catalog file, decoding the header and every table.
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| RootDbError::io(path, e))?;
        if bytes.len() < HEADER_SIZE || &bytes[0..16] != MAGIC {
            return Err(RootDbError::SchemaError(format!("{} is not a RootDB catalog file", path.display())));
        }

        let page_size = LittleEndian::read_u16(&bytes[16..18]);
        let table_count = LittleEndian::read_u16(&bytes[18..20]) as usize;

        let mut cursor = Cursor::new(&bytes[..]);
        cursor.set_position(HEADER_SIZE as u64);
        let mut tables = Vec::with_capacity(table_count);
        for _ in 0..table_count {
            tables.push(TableMeta::from_reader(&mut cursor)?);
        }

        Ok(Self { path: path.to_path_buf(), page_size, tables })
    }

    pub fn get(&self, name: &str) -> Option<&TableMeta> {
        self.tables.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn add_table(&mut self, meta: TableMeta) -> Result<()> {
        if self.contains(&meta.name) {
            return Err(RootDbError::SchemaError(format!("table {} already exists", meta.name)));
        }
        self.tables.push(meta);
        self.write_atomic()
    }

    pub fn update_table(&mut self, name: &str, f: impl FnOnce(&mut TableMeta)) -> Result<()> {
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| RootDbError::SchemaError(format!("unknown table {name}")))?;
        f(table);
        self.write_atomic()
    }

    /// Serializes the header and every table to a temp file, then renames it
    /// over `main.db` so a crash mid-write never leaves a half-written
    /// catalog in place.
    fn write_atomic(&self) -> Result<()> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[0..16].copy_from_slice(MAGIC);
        LittleEndian::write_u16(&mut out[16..18], self.page_size);
        LittleEndian::write_u16(&mut out[18..20], self.tables.len() as u16);

        for table in &self.tables {
            out.extend_from_slice(&table.to_bytes()?);
        }

        let temp_path = self.path.with_file_name(format!(
            "temp-{}",
            self.path.file_name().and_then(|n| n.to_str()).unwrap_or("main.db")
        ));
        std::fs::write(&temp_path, &out).map_err(|e| RootDbError::io(&temp_path, e))?;
        std::fs::rename(&temp_path, &self.path).map_err(|e| RootDbError::io(&self.path, e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::column::{Column, ColumnType};
    use tempfile::TempDir;

    fn sample_table(name: &str) -> TableMeta {
        let columns = vec![
            Column::new("id".to_string(), ColumnType::Int, 8, false, false, true),
            Column::new("name".to_string(), ColumnType::Char, 10, false, true, false),
        ];
        TableMeta::new(name.to_string(), columns).unwrap()
    }

    #[test]
    fn create_then_reopen_round_trips_header_and_tables() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.db");

        let mut catalog = Catalog::create(&path).unwrap();
        catalog.add_table(sample_table("t1")).unwrap();
        catalog.add_table(sample_table("t2")).unwrap();

        let reopened = Catalog::open(&path).unwrap();
        assert_eq!(reopened.page_size, PAGE_SIZE as u16);
        assert_eq!(reopened.tables.len(), 2);
        assert!(reopened.contains("t1"));
        assert!(reopened.contains("t2"));
    }

    #[test]
    fn duplicate_table_name_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("main.db");
        let mut catalog = Catalog::create(&path).unwrap();
        catalog.add_table(sample_table("t1")).unwrap();
        assert!(catalog.add_table(sample_table("t1")).is_err());
    }
}
