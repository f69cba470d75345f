//! Table file parsing and row decoding.

use crate::error::{DataError, Result};
use crate::locale::{Locale, LocalizedString};

use super::{layout_hash, record_size, table_hash, FieldType, DB2_MAGIC, HEADER_SIZE};

/// Parsed table file borrowing the underlying bytes.
#[derive(Debug, Clone, Copy)]
pub struct Db2File<'a> {
    table: &'a str,
    record_count: usize,
    record_size: usize,
    rows: &'a [u8],
    strings: &'a [u8],
}

fn header_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

impl<'a> Db2File<'a> {
    /// Parses and validates the header against the compiled layout.
    ///
    /// # Arguments
    /// * `table` - Table name, used for the table hash check and error context
    /// * `layout` - Column layout the rows must match
    /// * `bytes` - Whole file contents
    pub fn parse(table: &'a str, layout: &[FieldType], bytes: &'a [u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(DataError::Truncated {
                table: table.to_string(),
                context: format!("header needs {} bytes, file has {}", HEADER_SIZE, bytes.len()),
            });
        }

        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[0..4]);
        if magic != DB2_MAGIC {
            return Err(DataError::InvalidMagic {
                table: table.to_string(),
                found: magic,
            });
        }

        let record_count = header_u32(bytes, 4) as usize;
        let field_count = header_u32(bytes, 8) as usize;
        let file_record_size = header_u32(bytes, 12) as usize;
        let string_block_size = header_u32(bytes, 16) as usize;
        let file_table_hash = header_u32(bytes, 20);
        let file_layout_hash = header_u32(bytes, 24);

        let mismatch = |message: String| DataError::SchemaMismatch {
            table: table.to_string(),
            message,
        };

        if field_count != layout.len() {
            return Err(mismatch(format!(
                "field count {} in file, {} expected",
                field_count,
                layout.len()
            )));
        }
        let expected_size = record_size(layout);
        if file_record_size != expected_size {
            return Err(mismatch(format!(
                "record size {} in file, {} expected",
                file_record_size, expected_size
            )));
        }
        if file_table_hash != table_hash(table) {
            return Err(mismatch(format!(
                "table hash 0x{:08X} in file, 0x{:08X} expected",
                file_table_hash,
                table_hash(table)
            )));
        }
        if file_layout_hash != layout_hash(layout) {
            return Err(mismatch(format!(
                "layout hash 0x{:08X} in file, 0x{:08X} expected",
                file_layout_hash,
                layout_hash(layout)
            )));
        }

        let rows_len = record_count
            .checked_mul(file_record_size)
            .ok_or_else(|| DataError::Truncated {
                table: table.to_string(),
                context: format!("record count {} overflows", record_count),
            })?;
        let strings_start = HEADER_SIZE + rows_len;
        let strings_end = strings_start + string_block_size;
        if bytes.len() < strings_start {
            return Err(DataError::Truncated {
                table: table.to_string(),
                context: format!(
                    "{} records need {} bytes, file has {}",
                    record_count,
                    rows_len,
                    bytes.len() - HEADER_SIZE
                ),
            });
        }
        if bytes.len() < strings_end {
            return Err(DataError::Truncated {
                table: table.to_string(),
                context: format!(
                    "string block needs {} bytes, file has {}",
                    string_block_size,
                    bytes.len() - strings_start
                ),
            });
        }

        Ok(Self {
            table,
            record_count,
            record_size: file_record_size,
            rows: &bytes[HEADER_SIZE..strings_start],
            strings: &bytes[strings_start..strings_end],
        })
    }

    pub fn table(&self) -> &'a str {
        self.table
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn record_size(&self) -> usize {
        self.record_size
    }

    /// Reader over the row at `index`; `locale` tags localized columns.
    pub fn row(&self, index: usize, locale: Locale) -> Option<RowReader<'a>> {
        if index >= self.record_count {
            return None;
        }
        let start = index * self.record_size;
        Some(RowReader {
            table: self.table,
            data: &self.rows[start..start + self.record_size],
            pos: 0,
            strings: self.strings,
            locale,
        })
    }

    /// Readers over every row in file order.
    pub fn rows(&self, locale: Locale) -> impl Iterator<Item = RowReader<'a>> + '_ {
        (0..self.record_count).filter_map(move |index| self.row(index, locale))
    }
}

/// Sequential decoder for one fixed-width row.
#[derive(Debug)]
pub struct RowReader<'a> {
    table: &'a str,
    data: &'a [u8],
    pos: usize,
    strings: &'a [u8],
    locale: Locale,
}

impl<'a> RowReader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N]> {
        let end = self.pos + N;
        if end > self.data.len() {
            return Err(DataError::SchemaMismatch {
                table: self.table.to_string(),
                message: format!(
                    "row read past end ({} of {} bytes)",
                    end,
                    self.data.len()
                ),
            });
        }
        let mut buf = [0u8; N];
        buf.copy_from_slice(&self.data[self.pos..end]);
        self.pos = end;
        Ok(buf)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.take::<1>()?[0])
    }

    pub fn i8(&mut self) -> Result<i8> {
        Ok(i8::from_le_bytes(self.take()?))
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_le_bytes(self.take()?))
    }

    pub fn i16(&mut self) -> Result<i16> {
        Ok(i16::from_le_bytes(self.take()?))
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_le_bytes(self.take()?))
    }

    pub fn i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.take()?))
    }

    pub fn f32(&mut self) -> Result<f32> {
        Ok(f32::from_le_bytes(self.take()?))
    }

    /// Reads a string block offset and resolves the NUL-terminated text.
    pub fn string(&mut self) -> Result<String> {
        let offset = self.u32()?;
        let start = offset as usize;
        if start >= self.strings.len() {
            if start == 0 {
                return Ok(String::new());
            }
            return Err(DataError::StringOutOfBounds {
                table: self.table.to_string(),
                offset,
                size: self.strings.len(),
            });
        }
        let tail = &self.strings[start..];
        let end = tail.iter().position(|&b| b == 0).unwrap_or(tail.len());
        Ok(String::from_utf8_lossy(&tail[..end]).into_owned())
    }

    /// Reads a string column and stores it under the row's locale.
    pub fn loc_string(&mut self) -> Result<LocalizedString> {
        let value = self.string()?;
        Ok(LocalizedString::new(self.locale, value))
    }

    /// Reads `N` consecutive columns with the same decoder.
    pub fn array<T, const N: usize>(
        &mut self,
        mut read: impl FnMut(&mut Self) -> Result<T>,
    ) -> Result<[T; N]>
    where
        T: Default + Copy,
    {
        let mut values = [T::default(); N];
        for value in values.iter_mut() {
            *value = read(self)?;
        }
        Ok(values)
    }

    /// Locale of the file this row was read from.
    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}
