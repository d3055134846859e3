//! Per-table buffer pool: a fixed-size approximate-LRU cache of decoded
//! pages sitting in front of the table's data file.

use crate::core::error::{Result, RootDbError};
use crate::storage::bitmap::{bitmap_bytes, get_bit};
use crate::storage::cell::{decode_cell, Value};
use crate::storage::lru::Lru;
use crate::storage::page::{Page, PAGE_BODY_SIZE, PAGE_HEADER_SIZE, PAGE_SIZE};
use crate::storage::table::TableMeta;
use parking_lot::{Mutex, RwLock};
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_POOL_SIZE: usize = 500;

/// One decoded row: `Value::Null` cells mean the column was null.
#[derive(Debug, Clone)]
pub struct Row {
    pub cells: Vec<Value>,
}

impl Row {
    pub fn primary_key(&self, meta: &TableMeta) -> &Value {
        &self.cells[meta.primary_key_index]
    }
}

struct CachedPage {
    page_id: u64,
    /// Indexed exactly like the page's row slots; `None` marks a tombstone
    /// or a slot past `rowCount`, so `offset -> index` arithmetic still
    /// lines up for point fetches.
    rows: Vec<Option<Row>>,
}

struct PoolInner {
    slots: Vec<Option<CachedPage>>,
}

struct WriteState {
    file: File,
    last_page: u64,
}

/// Per-table cache: read lock for lookups, write lock for allocation and
/// eviction (with a mandatory re-check once the write lock is held, since
/// another thread may have loaded the page while we were waiting for it).
pub struct BufferPool {
    lru: Lru,
    inner: RwLock<PoolInner>,
    read_file: Mutex<File>,
    write_state: Mutex<WriteState>,
    path: PathBuf,
}

impl BufferPool {
    /// Creates the table's data file with a single empty page.
    pub fn create(path: &Path, capacity: usize) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .map_err(|e| RootDbError::io(path, e))?;
        let page = Page::empty(0);
        file.write_all(&page.data).map_err(|e| RootDbError::io(path, e))?;

        Self::open_with_file(path, capacity, file, 0)
    }

    /// Opens an existing data file.
    pub fn open(path: &Path, capacity: usize) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path).map_err(|e| RootDbError::io(path, e))?;
        let len = file.metadata().map_err(|e| RootDbError::io(path, e))?.len() as usize;
        if len == 0 || len % PAGE_SIZE != 0 {
            return Err(RootDbError::CorruptedPage(0));
        }
        let last_page = (len / PAGE_SIZE - 1) as u64;
        Self::open_with_file(path, capacity, file, last_page)
    }

    fn open_with_file(path: &Path, capacity: usize, file: File, last_page: u64) -> Result<Self> {
        let read_file = file.try_clone().map_err(|e| RootDbError::io(path, e))?;
        let write_file = file.try_clone().map_err(|e| RootDbError::io(path, e))?;
        drop(file);

        let slots = (0..capacity).map(|_| None).collect();
        Ok(Self {
            lru: Lru::new(capacity),
            inner: RwLock::new(PoolInner { slots }),
            read_file: Mutex::new(read_file),
            write_state: Mutex::new(WriteState { file: write_file, last_page }),
            path: path.to_path_buf(),
        })
    }

    pub fn last_page(&self) -> u64 {
        self.write_state.lock().last_page
    }

    /// Fetches every live (non-tombstone) row on `page_id`, decoded against
    /// `meta`. Returns deep clones; the pool's own slots are never exposed.
    pub fn fetch_page(&self, meta: &TableMeta, page_id: u64) -> Result<Vec<Row>> {
        let slots = self.fetch_slot(meta, page_id)?;
        Ok(slots.into_iter().flatten().collect())
    }

    /// Fetches the single row stored at absolute byte `offset` (as recorded
    /// in the primary-key index).
    pub fn fetch_row_at(&self, meta: &TableMeta, offset: u64) -> Result<Row> {
        let page_id = offset / PAGE_SIZE as u64;
        let local = (offset % PAGE_SIZE as u64) as usize;
        if local < PAGE_HEADER_SIZE {
            return Err(RootDbError::CorruptedPage(page_id));
        }
        let row_index = (local - PAGE_HEADER_SIZE) / meta.row_size;
        let slots = self.fetch_slot(meta, page_id)?;
        slots.get(row_index).cloned().flatten().ok_or(RootDbError::CorruptedPage(page_id))
    }

    fn fetch_slot(&self, meta: &TableMeta, page_id: u64) -> Result<Vec<Option<Row>>> {
        {
            let inner = self.inner.read();
            if let Some(slot_index) = self.lru.find(page_id) {
                if let Some(cached) = &inner.slots[slot_index] {
                    if cached.page_id == page_id {
                        return Ok(cached.rows.clone());
                    }
                }
            }
        }

        let mut inner = self.inner.write();
        // Re-check: another thread may have loaded this page while we
        // waited for the write lock.
        if let Some(slot_index) = self.lru.find(page_id) {
            if let Some(cached) = &inner.slots[slot_index] {
                if cached.page_id == page_id {
                    return Ok(cached.rows.clone());
                }
            }
        }

        let page = self.read_page_from_disk(page_id)?;
        let rows = decode_page_rows(meta, &page)?;

        let slot_index = match self.lru.add(page_id) {
            Some(i) => i,
            None => self.lru.free(page_id),
        };
        inner.slots[slot_index] = Some(CachedPage { page_id, rows: rows.clone() });
        Ok(rows)
    }

    fn read_page_from_disk(&self, page_id: u64) -> Result<Page> {
        let mut file = self.read_file.lock();
        file.seek(SeekFrom::Start(page_id * PAGE_SIZE as u64)).map_err(|e| RootDbError::io(&self.path, e))?;
        let mut data = [0u8; PAGE_SIZE];
        file.read_exact(&mut data).map_err(|e| RootDbError::io(&self.path, e))?;
        let page = Page::from_bytes(data);
        page.verify(page_id)?;
        Ok(page)
    }

    /// Appends `rows` (already resolved cell values, in column order) to the
    /// table, paging as needed. Returns `(primaryKey, absoluteByteOffset)`
    /// for every row written, in input order, for the caller to index.
    pub fn insert_rows(&self, meta: &TableMeta, rows: &[Vec<Value>]) -> Result<Vec<(i64, u64)>> {
        let mut state = self.write_state.lock();
        let mut touched_pages = Vec::new();
        let mut results = Vec::with_capacity(rows.len());

        let mut page = self.read_page_from_disk(state.last_page)?;
        let mut page_num = state.last_page;
        touched_pages.push(page_num);

        for cells in rows {
            let row_bytes = encode_row(meta, cells)?;
            let local_offset = page.row_count() as usize * meta.row_size;
            if local_offset + meta.row_size > PAGE_BODY_SIZE {
                page.finalize(page.row_count());
                self.write_page_to_disk_locked(&mut state, &page)?;
                page_num += 1;
                page = Page::empty(page_num);
                touched_pages.push(page_num);
            }

            let local_offset = page.row_count() as usize * meta.row_size;
            page.body_mut()[local_offset..local_offset + meta.row_size].copy_from_slice(&row_bytes);
            let new_count = page.row_count() + 1;
            page.finalize(new_count);

            let pk = match &cells[meta.primary_key_index] {
                Value::Int(v) => *v,
                _ => return Err(RootDbError::SchemaError("primary key column must be INT".to_string())),
            };
            let absolute_offset = page_num * PAGE_SIZE as u64 + PAGE_HEADER_SIZE as u64 + local_offset as u64;
            results.push((pk, absolute_offset));
        }

        self.write_page_to_disk_locked(&mut state, &page)?;
        state.last_page = page_num;
        drop(state);

        let mut inner = self.inner.write();
        for page_id in touched_pages {
            self.lru.delete(page_id);
            for slot in inner.slots.iter_mut() {
                if matches!(slot, Some(c) if c.page_id == page_id) {
                    *slot = None;
                }
            }
        }

        Ok(results)
    }

    fn write_page_to_disk_locked(&self, state: &mut WriteState, page: &Page) -> Result<()> {
        let pos = page.page_num() * PAGE_SIZE as u64;
        state.file.seek(SeekFrom::Start(pos)).map_err(|e| RootDbError::io(&self.path, e))?;
        state.file.write_all(&page.data).map_err(|e| RootDbError::io(&self.path, e))?;
        state.file.sync_data().map_err(|e| RootDbError::io(&self.path, e))?;
        Ok(())
    }
}

fn encode_row(meta: &TableMeta, cells: &[Value]) -> Result<Vec<u8>> {
    let bitmap_len = bitmap_bytes(meta.columns.len());
    let mut out = vec![0u8; meta.row_size];
    crate::storage::bitmap::set_bit(&mut out[..bitmap_len], meta.columns.len());

    for (col, value) in meta.columns.iter().zip(cells.iter()) {
        let start = bitmap_len + col.offset;
        let end = start + col.size as usize;
        match value {
            Value::Null => continue,
            other => {
                let bytes = crate::storage::cell::encode_literal(col, &value_to_literal(other))?;
                out[start..end].copy_from_slice(&bytes);
                crate::storage::bitmap::set_bit(&mut out[..bitmap_len], col.index);
            }
        }
    }
    Ok(out)
}

fn value_to_literal(v: &Value) -> String {
    match v {
        Value::Int(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
        Value::Char(s) => s.clone(),
        Value::Null => String::new(),
    }
}

fn decode_page_rows(meta: &TableMeta, page: &Page) -> Result<Vec<Option<Row>>> {
    let bitmap_len = bitmap_bytes(meta.columns.len());
    let slots = page.row_slots(meta.row_size);
    let mut out = Vec::with_capacity(slots.len());

    for slot in slots {
        let bitmap = &slot[..bitmap_len];
        if !get_bit(bitmap, meta.columns.len()) {
            out.push(None);
            continue;
        }
        let mut cells = Vec::with_capacity(meta.columns.len());
        for col in &meta.columns {
            if !get_bit(bitmap, col.index) {
                cells.push(Value::Null);
                continue;
            }
            let start = bitmap_len + col.offset;
            let end = start + col.size as usize;
            cells.push(decode_cell(col, &slot[start..end])?);
        }
        out.push(Some(Row { cells }));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::column::{Column, ColumnType};
    use tempfile::TempDir;

    fn sample_meta() -> TableMeta {
        let columns = vec![
            Column::new("id".to_string(), ColumnType::Int, 8, false, false, true),
            Column::new("name".to_string(), ColumnType::Char, 10, false, true, false),
        ];
        TableMeta::new("t".to_string(), columns).unwrap()
    }

    #[test]
    fn insert_then_fetch_round_trips() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.db");
        let meta = sample_meta();
        let pool = BufferPool::create(&path, 8).unwrap();

        let rows = vec![
            vec![Value::Int(1), Value::Char("alice".to_string())],
            vec![Value::Int(2), Value::Null],
        ];
        let written = pool.insert_rows(&meta, &rows).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].0, 1);

        let fetched = pool.fetch_row_at(&meta, written[0].1).unwrap();
        assert_eq!(fetched.cells[0], Value::Int(1));
        assert_eq!(fetched.cells[1], Value::Char("alice".to_string()));

        let fetched2 = pool.fetch_row_at(&meta, written[1].1).unwrap();
        assert_eq!(fetched2.cells[1], Value::Null);
    }

    #[test]
    fn inserting_past_one_page_allocates_a_new_page() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.db");
        let meta = sample_meta();
        let pool = BufferPool::create(&path, 8).unwrap();

        let capacity = Page::capacity_for(meta.row_size);
        let rows: Vec<Vec<Value>> =
            (0..(capacity as i64 + 5)).map(|i| vec![Value::Int(i + 1), Value::Null]).collect();
        let written = pool.insert_rows(&meta, &rows).unwrap();
        assert!(pool.last_page() >= 1);
        assert_eq!(written.len(), rows.len());

        let last = written.last().unwrap();
        let fetched = pool.fetch_row_at(&meta, last.1).unwrap();
        assert_eq!(fetched.cells[0], Value::Int(rows.len() as i64));
    }

    #[test]
    fn fetch_page_filters_out_tombstones_and_returns_clones() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.db");
        let meta = sample_meta();
        let pool = BufferPool::create(&path, 8).unwrap();
        pool.insert_rows(&meta, &[vec![Value::Int(1), Value::Null]]).unwrap();

        let page_rows = pool.fetch_page(&meta, 0).unwrap();
        assert_eq!(page_rows.len(), 1);

        let cached_twice_a = pool.fetch_page(&meta, 0).unwrap();
        let cached_twice_b = pool.fetch_page(&meta, 0).unwrap();
        assert_eq!(cached_twice_a[0].cells, cached_twice_b[0].cells);
    }

    #[test]
    fn reopen_preserves_last_page_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("t.db");
        let meta = sample_meta();
        {
            let pool = BufferPool::create(&path, 8).unwrap();
            pool.insert_rows(&meta, &[vec![Value::Int(1), Value::Null]]).unwrap();
        }
        let reopened = BufferPool::open(&path, 8).unwrap();
        assert_eq!(reopened.last_page(), 0);
        let rows = reopened.fetch_page(&meta, 0).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
