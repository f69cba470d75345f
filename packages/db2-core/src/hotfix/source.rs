//! Secondary stores the hotfix overlay is read from.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DataError, Result};
use crate::io_utils::read_file;

/// One `hotfix_data` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotfixDataRow {
    /// Push ID
    #[serde(rename = "Id")]
    pub id: i32,
    #[serde(rename = "UniqueId")]
    pub unique_id: u32,
    #[serde(rename = "TableHash")]
    pub table_hash: u32,
    #[serde(rename = "RecordId")]
    pub record_id: i32,
    #[serde(rename = "Status")]
    pub status: u8,
}

/// One `hotfix_blob` row, the full replacement row bytes for a locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotfixBlobRow {
    #[serde(rename = "TableHash")]
    pub table_hash: u32,
    #[serde(rename = "RecordId")]
    pub record_id: i32,
    pub locale: String,
    #[serde(rename = "Blob", with = "hex::serde")]
    pub blob: Vec<u8>,
}

/// One `hotfix_optional_data` row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotfixOptionalDataRow {
    #[serde(rename = "TableHash")]
    pub table_hash: u32,
    #[serde(rename = "RecordId")]
    pub record_id: i32,
    pub locale: String,
    /// Table hash identifying the kind of optional data
    #[serde(rename = "Key")]
    pub key: u32,
    #[serde(rename = "Data", with = "hex::serde")]
    pub data: Vec<u8>,
}

/// Read access to the three hotfix tables.
pub trait HotfixSource {
    fn hotfix_data(&self) -> Result<Vec<HotfixDataRow>>;

    fn hotfix_blobs(&self) -> Result<Vec<HotfixBlobRow>>;

    fn hotfix_optional_data(&self) -> Result<Vec<HotfixOptionalDataRow>>;
}

/// In-memory hotfix tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryHotfixSource {
    #[serde(default)]
    pub hotfix_data: Vec<HotfixDataRow>,
    #[serde(default)]
    pub hotfix_blob: Vec<HotfixBlobRow>,
    #[serde(default)]
    pub hotfix_optional_data: Vec<HotfixOptionalDataRow>,
}

impl MemoryHotfixSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_data(&mut self, id: i32, table_hash: u32, record_id: i32, status: u8) -> &mut Self {
        self.hotfix_data.push(HotfixDataRow {
            id,
            unique_id: id as u32,
            table_hash,
            record_id,
            status,
        });
        self
    }

    pub fn push_blob(
        &mut self,
        table_hash: u32,
        record_id: i32,
        locale: impl Into<String>,
        blob: Vec<u8>,
    ) -> &mut Self {
        self.hotfix_blob.push(HotfixBlobRow {
            table_hash,
            record_id,
            locale: locale.into(),
            blob,
        });
        self
    }

    pub fn push_optional_data(
        &mut self,
        table_hash: u32,
        record_id: i32,
        locale: impl Into<String>,
        key: u32,
        data: Vec<u8>,
    ) -> &mut Self {
        self.hotfix_optional_data.push(HotfixOptionalDataRow {
            table_hash,
            record_id,
            locale: locale.into(),
            key,
            data,
        });
        self
    }
}

impl HotfixSource for MemoryHotfixSource {
    fn hotfix_data(&self) -> Result<Vec<HotfixDataRow>> {
        Ok(self.hotfix_data.clone())
    }

    fn hotfix_blobs(&self) -> Result<Vec<HotfixBlobRow>> {
        Ok(self.hotfix_blob.clone())
    }

    fn hotfix_optional_data(&self) -> Result<Vec<HotfixOptionalDataRow>> {
        Ok(self.hotfix_optional_data.clone())
    }
}

/// Hotfix tables stored as one JSON document.
///
/// ```json
/// {
///   "hotfix_data": [{"Id": 1, "UniqueId": 1, "TableHash": 1, "RecordId": 5, "Status": 2}],
///   "hotfix_blob": [{"TableHash": 1, "RecordId": 5, "locale": "enUS", "Blob": "0a0b"}],
///   "hotfix_optional_data": []
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonHotfixSource {
    tables: MemoryHotfixSource,
}

impl JsonHotfixSource {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = read_file(path)?;
        let tables = serde_json::from_slice(&bytes)
            .map_err(|e| DataError::Hotfix(format!("{}: {}", path.display(), e)))?;
        Ok(Self { tables })
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let tables = serde_json::from_slice(bytes)
            .map_err(|e| DataError::Hotfix(format!("Failed to parse hotfix JSON: {}", e)))?;
        Ok(Self { tables })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }
}

impl HotfixSource for JsonHotfixSource {
    fn hotfix_data(&self) -> Result<Vec<HotfixDataRow>> {
        self.tables.hotfix_data()
    }

    fn hotfix_blobs(&self) -> Result<Vec<HotfixBlobRow>> {
        self.tables.hotfix_blobs()
    }

    fn hotfix_optional_data(&self) -> Result<Vec<HotfixOptionalDataRow>> {
        self.tables.hotfix_optional_data()
    }
}
