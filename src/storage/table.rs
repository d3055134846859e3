//! Table metadata: the persisted form stored in the catalog, plus the
//! derived layout facts (row size, column offsets, primary key index) every
//! other storage component needs.

use crate::core::error::{Result, RootDbError};
use crate::storage::bitmap::bitmap_bytes;
use crate::storage::column::Column;
use crate::storage::page::PAGE_BODY_SIZE;
use byteorder::{ByteOrder, LittleEndian};
use std::io::Cursor;

pub const MAX_ROW_PAYLOAD: usize = 4070;

/// Persisted table metadata: `u8 nameLen, name, u64 lastRowId, u16 colCount,
/// col[*]`. Runtime-only facts (row size, offsets, primary key position) are
/// derived once via [`TableMeta::finalize_layout`].
#[derive(Debug, Clone)]
pub struct TableMeta {
    pub name: String,
    pub last_row_id: u64,
    pub columns: Vec<Column>,
    pub bitmap_bytes: usize,
    pub row_size: usize,
    pub primary_key_index: usize,
}

impl TableMeta {
    pub fn new(name: String, mut columns: Vec<Column>) -> Result<Self> {
        let primary_key_index = columns
            .iter()
            .position(|c| c.primary)
            .ok_or_else(|| RootDbError::SchemaError("table must have exactly one PRIMARY KEY column".to_string()))?;

        let mut offset = 0usize;
        for (i, col) in columns.iter_mut().enumerate() {
            col.index = i;
            col.offset = offset;
            offset += col.size as usize;
        }
        if offset > MAX_ROW_PAYLOAD {
            return Err(RootDbError::SchemaError(format!(
                "row payload {offset} exceeds the {MAX_ROW_PAYLOAD}-byte maximum"
            )));
        }

        let bitmap_bytes = bitmap_bytes(columns.len());
        let row_size = bitmap_bytes + offset;
        if row_size > PAGE_BODY_SIZE {
            return Err(RootDbError::SchemaError(format!(
                "row size {row_size} does not fit in a single page body ({PAGE_BODY_SIZE} bytes)"
            )));
        }

        Ok(Self { name, last_row_id: 0, columns, bitmap_bytes, row_size, primary_key_index })
    }

    pub fn primary_key_column(&self) -> &Column {
        &self.columns[self.primary_key_index]
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let name_bytes = self.name.as_bytes();
        if name_bytes.len() > u8::MAX as usize {
            return Err(RootDbError::SchemaError(format!("table name {} too long", self.name)));
        }
        if self.columns.len() > u16::MAX as usize {
            return Err(RootDbError::SchemaError("too many columns".to_string()));
        }

        let mut out = Vec::new();
        out.push(name_bytes.len() as u8);
        out.extend_from_slice(name_bytes);

        let mut last_row_id_buf = [0u8; 8];
        LittleEndian::write_u64(&mut last_row_id_buf, self.last_row_id);
        out.extend_from_slice(&last_row_id_buf);

        let mut col_count_buf = [0u8; 2];
        LittleEndian::write_u16(&mut col_count_buf, self.columns.len() as u16);
        out.extend_from_slice(&col_count_buf);

        for col in &self.columns {
            out.extend_from_slice(&col.to_bytes()?);
        }
        Ok(out)
    }

    /// Decodes one table entry starting at the cursor's current position,
    /// leaving the cursor positioned just past it so the catalog can read
    /// the next table in sequence.
    pub fn from_reader(cursor: &mut Cursor<&[u8]>) -> Result<Self> {
        let pos = cursor.position() as usize;
        let bytes = *cursor.get_ref();

        let name_len = bytes[pos] as usize;
        let name_start = pos + 1;
        let name = String::from_utf8(bytes[name_start..name_start + name_len].to_vec())
            .map_err(|e| RootDbError::SchemaError(format!("table name not utf8: {e}")))?;

        let mut offset = name_start + name_len;
        let last_row_id = LittleEndian::read_u64(&bytes[offset..offset + 8]);
        offset += 8;
        let col_count = LittleEndian::read_u16(&bytes[offset..offset + 2]) as usize;
        offset += 2;

        cursor.set_position(offset as u64);
        let mut columns = Vec::with_capacity(col_count);
        for _ in 0..col_count {
            columns.push(Column::from_reader(cursor)?);
        }

        let mut meta = TableMeta::new(name, columns)?;
        meta.last_row_id = last_row_id;
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::column::ColumnType;

    fn sample() -> TableMeta {
        let columns = vec![
            Column::new("id".to_string(), ColumnType::Int, 8, false, false, true),
            Column::new("name".to_string(), ColumnType::Char, 10, false, true, false),
            Column::new("flag".to_string(), ColumnType::Bool, 1, false, true, false),
        ];
        TableMeta::new("t".to_string(), columns).unwrap()
    }

    #[test]
    fn table_round_trips() {
        let mut meta = sample();
        meta.last_row_id = 42;
        let bytes = meta.to_bytes().unwrap();
        let mut cursor = Cursor::new(bytes.as_slice());
        let back = TableMeta::from_reader(&mut cursor).unwrap();
        assert_eq!(back.name, "t");
        assert_eq!(back.last_row_id, 42);
        assert_eq!(back.columns.len(), 3);
        assert_eq!(back.row_size, meta.row_size);
        assert_eq!(back.primary_key_index, 0);
    }

    #[test]
    fn oversized_row_is_rejected() {
        let columns = vec![
            Column::new("id".to_string(), ColumnType::Int, 8, false, false, true),
            Column::new("blob".to_string(), ColumnType::Char, 255, false, true, false),
        ];
        // 8 + 255*16 comfortably exceeds MAX_ROW_PAYLOAD
        let mut many = Vec::new();
        many.push(columns[0].clone());
        for i in 0..20 {
            let mut c = columns[1].clone();
            c.name = format!("blob{i}");
            many.push(c);
        }
        assert!(TableMeta::new("big".to_string(), many).is_err());
    }
}
