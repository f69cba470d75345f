//! Binary table file format.
//!
//! A table file is a fixed 28 byte header followed by `record_count` rows of
//! `record_size` bytes and a string block:
//! - magic `WDB2`
//! - record count, field count, record size, string block size (u32 LE)
//! - table hash and layout hash (u32 LE)
//!
//! String columns hold u32 offsets into the string block, which stores
//! NUL-terminated UTF-8 text.

mod reader;
mod writer;

pub use reader::{Db2File, RowReader};
pub use writer::{Db2FileWriter, RowWriter};

/// File magic.
pub const DB2_MAGIC: [u8; 4] = *b"WDB2";

/// Header size in bytes.
pub const HEADER_SIZE: usize = 28;

/// Column type of a fixed-width row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
    /// Offset into the string block
    String,
    /// Offset into the string block of the locale file the row was read from
    LocString,
}

impl FieldType {
    /// Size of the column in bytes.
    pub const fn size(self) -> usize {
        match self {
            FieldType::I8 | FieldType::U8 => 1,
            FieldType::I16 | FieldType::U16 => 2,
            FieldType::I32
            | FieldType::U32
            | FieldType::F32
            | FieldType::String
            | FieldType::LocString => 4,
        }
    }

    const fn signature(self) -> u8 {
        match self {
            FieldType::I8 => b'b',
            FieldType::U8 => b'B',
            FieldType::I16 => b'h',
            FieldType::U16 => b'H',
            FieldType::I32 => b'i',
            FieldType::U32 => b'I',
            FieldType::F32 => b'f',
            FieldType::String => b's',
            FieldType::LocString => b'l',
        }
    }
}

/// Row size in bytes for a layout.
pub fn record_size(layout: &[FieldType]) -> usize {
    layout.iter().map(|field| field.size()).sum()
}

/// Table hash: CRC32 of the upper-case table name.
pub fn table_hash(name: &str) -> u32 {
    crc32fast::hash(name.to_ascii_uppercase().as_bytes())
}

/// Layout hash: CRC32 of the column type signature.
pub fn layout_hash(layout: &[FieldType]) -> u32 {
    let signature: Vec<u8> = layout.iter().map(|field| field.signature()).collect();
    crc32fast::hash(&signature)
}

/// Whether any column of the layout is localized.
pub fn has_localized_strings(layout: &[FieldType]) -> bool {
    layout.contains(&FieldType::LocString)
}
