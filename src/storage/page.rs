//! Fixed 4 KiB page codec: header (page number, row count, MD5 checksum)
//! followed by contiguous fixed-size row slots.

use crate::core::error::{Result, RootDbError};
use byteorder::{ByteOrder, LittleEndian};

pub const PAGE_SIZE: usize = 4096;
pub const PAGE_HEADER_SIZE: usize = 26;
pub const PAGE_BODY_SIZE: usize = PAGE_SIZE - PAGE_HEADER_SIZE;

#[derive(Clone)]
pub struct Page {
    pub data: [u8; PAGE_SIZE],
}

impl Page {
    pub fn empty(page_num: u64) -> Self {
        let mut page = Self { data: [0u8; PAGE_SIZE] };
        page.set_page_num(page_num);
        page.finalize(0);
        page
    }

    pub fn from_bytes(data: [u8; PAGE_SIZE]) -> Self {
        Self { data }
    }

    pub fn page_num(&self) -> u64 {
        LittleEndian::read_u64(&self.data[0..8])
    }

    pub fn set_page_num(&mut self, n: u64) {
        LittleEndian::write_u64(&mut self.data[0..8], n);
    }

    pub fn row_count(&self) -> u16 {
        LittleEndian::read_u16(&self.data[8..10])
    }

    fn set_row_count(&mut self, n: u16) {
        LittleEndian::write_u16(&mut self.data[8..10], n);
    }

    fn stored_checksum(&self) -> [u8; 16] {
        self.data[10..26].try_into().unwrap()
    }

    fn computed_checksum(&self) -> [u8; 16] {
        md5::compute(&self.data[PAGE_HEADER_SIZE..PAGE_SIZE]).0
    }

    pub fn body(&self) -> &[u8] {
        &self.data[PAGE_HEADER_SIZE..]
    }

    pub fn body_mut(&mut self) -> &mut [u8] {
        &mut self.data[PAGE_HEADER_SIZE..]
    }

    /// Recomputes `rowCount` and the checksum after the caller has written
    /// row slots directly into `body_mut()`.
    pub fn finalize(&mut self, row_count: u16) {
        self.set_row_count(row_count);
        let checksum = self.computed_checksum();
        self.data[10..26].copy_from_slice(&checksum);
    }

    /// Verifies the stored checksum against the recomputed one. A mismatch
    /// is a `CorruptedPage` error, not a panic: the executor must be able to
    /// surface it to the caller.
    pub fn verify(&self, page_id: u64) -> Result<()> {
        if self.stored_checksum() != self.computed_checksum() {
            return Err(RootDbError::CorruptedPage(page_id));
        }
        Ok(())
    }

    /// Returns the raw byte slices of the first `row_count()` row slots
    /// (including the null bitmap prefix). Stops early if a slot would run
    /// past the page boundary. Tombstone filtering is the caller's job: it
    /// requires knowing the bitmap layout, which only the table's column
    /// list can supply.
    pub fn row_slots(&self, row_size: usize) -> Vec<&[u8]> {
        let body = self.body();
        let mut out = Vec::with_capacity(self.row_count() as usize);
        let mut offset = 0usize;
        for _ in 0..self.row_count() {
            if offset + row_size > body.len() {
                break;
            }
            out.push(&body[offset..offset + row_size]);
            offset += row_size;
        }
        out
    }

    /// How many rows of `row_size` bytes fit after the header.
    pub fn capacity_for(row_size: usize) -> usize {
        PAGE_BODY_SIZE / row_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_page_has_valid_checksum_and_zero_rows() {
        let page = Page::empty(3);
        assert_eq!(page.page_num(), 3);
        assert_eq!(page.row_count(), 0);
        page.verify(3).unwrap();
    }

    #[test]
    fn corrupted_body_fails_verification() {
        let mut page = Page::empty(0);
        page.data[PAGE_HEADER_SIZE] ^= 0xFF;
        assert!(matches!(page.verify(0), Err(RootDbError::CorruptedPage(0))));
    }

    #[test]
    fn row_slots_respects_row_count_and_bounds() {
        let row_size = 9;
        let mut page = Page::empty(0);
        {
            let body = page.body_mut();
            body[0..row_size].fill(1);
            body[row_size..row_size * 2].fill(2);
        }
        page.finalize(2);
        let slots = page.row_slots(row_size);
        assert_eq!(slots.len(), 2);
        assert_eq!(slots[0][0], 1);
        assert_eq!(slots[1][0], 2);
    }
}
