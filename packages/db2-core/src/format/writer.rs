//! Table file encoding.
//!
//! Used to synthesise tables for tests and tooling; the layout mirrors what
//! [`Db2File::parse`](super::Db2File::parse) accepts.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{DataError, Result};
use crate::io_utils::classify_io_error;
use crate::locale::Locale;
use crate::storage::Db2Record;

use super::{layout_hash, record_size, table_hash, FieldType, DB2_MAGIC, HEADER_SIZE};

/// Deduplicating string block, offset 0 is always the empty string.
#[derive(Debug)]
struct StringBlock {
    bytes: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringBlock {
    fn new() -> Self {
        Self {
            bytes: vec![0],
            offsets: HashMap::new(),
        }
    }

    fn intern(&mut self, value: &str) -> u32 {
        if value.is_empty() {
            return 0;
        }
        if let Some(&offset) = self.offsets.get(value) {
            return offset;
        }
        let offset = self.bytes.len() as u32;
        self.bytes.extend_from_slice(value.as_bytes());
        self.bytes.push(0);
        self.offsets.insert(value.to_string(), offset);
        offset
    }
}

/// Builds a table file row by row.
#[derive(Debug)]
pub struct Db2FileWriter {
    table: String,
    layout: Vec<FieldType>,
    record_size: usize,
    rows: Vec<u8>,
    record_count: usize,
    strings: StringBlock,
}

impl Db2FileWriter {
    /// Creates a writer for `table` with the given column layout.
    pub fn new(table: &str, layout: &[FieldType]) -> Self {
        Self {
            table: table.to_string(),
            layout: layout.to_vec(),
            record_size: record_size(layout),
            rows: Vec::new(),
            record_count: 0,
            strings: StringBlock::new(),
        }
    }

    /// Creates a writer using the compiled layout of `T`.
    pub fn for_table<T: Db2Record>() -> Self {
        Self::new(T::TABLE_NAME, T::LAYOUT)
    }

    /// Appends `record`, localized columns take their `locale` value.
    pub fn push_record<T: Db2Record>(&mut self, record: &T, locale: Locale) -> Result<()> {
        self.push_row(|row| record.write(row, locale))
    }

    /// Appends one row written by `fill`.
    ///
    /// # Returns
    /// `Err(DataError::SchemaMismatch)` if `fill` did not write exactly one
    /// record's worth of bytes; the row is discarded in that case.
    pub fn push_row<F>(&mut self, fill: F) -> Result<()>
    where
        F: FnOnce(&mut RowWriter<'_>),
    {
        let start = self.rows.len();
        let mut row = RowWriter {
            data: &mut self.rows,
            strings: &mut self.strings,
        };
        fill(&mut row);
        let written = self.rows.len() - start;
        if written != self.record_size {
            self.rows.truncate(start);
            return Err(DataError::SchemaMismatch {
                table: self.table.clone(),
                message: format!(
                    "row wrote {} bytes, record size is {}",
                    written, self.record_size
                ),
            });
        }
        self.record_count += 1;
        Ok(())
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Encodes header, rows and string block.
    pub fn finish(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(HEADER_SIZE + self.rows.len() + self.strings.bytes.len());
        out.extend_from_slice(&DB2_MAGIC);
        for value in [
            self.record_count as u32,
            self.layout.len() as u32,
            self.record_size as u32,
            self.strings.bytes.len() as u32,
            table_hash(&self.table),
            layout_hash(&self.layout),
        ] {
            out.extend_from_slice(&value.to_le_bytes());
        }
        out.extend_from_slice(&self.rows);
        out.extend_from_slice(&self.strings.bytes);
        out
    }

    /// Encodes the table and writes it to `path`, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let context = path.display().to_string();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| classify_io_error(e, &context))?;
        }
        std::fs::write(path, self.finish()).map_err(|e| classify_io_error(e, &context))
    }
}

/// Column encoder handed to [`Db2FileWriter::push_row`].
#[derive(Debug)]
pub struct RowWriter<'a> {
    data: &'a mut Vec<u8>,
    strings: &'a mut StringBlock,
}

impl RowWriter<'_> {
    pub fn u8(&mut self, value: u8) -> &mut Self {
        self.data.push(value);
        self
    }

    pub fn i8(&mut self, value: i8) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u16(&mut self, value: u16) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i16(&mut self, value: i16) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(&mut self, value: u32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(&mut self, value: i32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn f32(&mut self, value: f32) -> &mut Self {
        self.data.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Interns `value` in the string block and writes its offset.
    pub fn string(&mut self, value: &str) -> &mut Self {
        let offset = self.strings.intern(value);
        self.u32(offset)
    }

    /// Writes `count` zeroed bytes, for columns a test does not care about.
    pub fn zeros(&mut self, count: usize) -> &mut Self {
        self.data.resize(self.data.len() + count, 0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_encoding() {
        let layout = [FieldType::U32, FieldType::String];
        let mut writer = Db2FileWriter::new("Widget", &layout);
        writer
            .push_row(|row| {
                row.u32(1).string("alpha");
            })
            .unwrap();
        writer
            .push_row(|row| {
                row.u32(2).string("alpha");
            })
            .unwrap();
        let bytes = writer.finish();

        assert_eq!(&bytes[0..4], b"WDB2");
        let word = |at: usize| u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap());
        assert_eq!(word(4), 2);
        assert_eq!(word(8), 2);
        assert_eq!(word(12), 8);
        // empty string at 0, "alpha\0" deduplicated
        assert_eq!(word(16), 7);
        assert_eq!(word(20), table_hash("Widget"));
        assert_eq!(word(24), layout_hash(&layout));
        assert_eq!(bytes.len(), HEADER_SIZE + 16 + 7);
    }

    #[test]
    fn test_short_row_rejected() {
        let layout = [FieldType::U32, FieldType::U32];
        let mut writer = Db2FileWriter::new("Widget", &layout);
        let err = writer
            .push_row(|row| {
                row.u32(1);
            })
            .unwrap_err();
        assert!(matches!(err, DataError::SchemaMismatch { .. }));
        assert_eq!(writer.record_count(), 0);
        writer
            .push_row(|row| {
                row.u32(1).zeros(4);
            })
            .unwrap();
        assert_eq!(writer.record_count(), 1);
    }
}
