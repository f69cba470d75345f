//! Hotfix overlay: server-side patches that replace or remove table rows.
//!
//! Hotfixes are read once at startup from a [`HotfixSource`] and grouped into
//! pushes by push ID. Records whose final status is
//! [`HotfixStatus::RecordRemoved`] are erased from the registry by
//! [`HotfixStore::reconcile`].

mod source;

pub use source::{
    HotfixBlobRow, HotfixDataRow, HotfixOptionalDataRow, HotfixSource, JsonHotfixSource,
    MemoryHotfixSource,
};

use std::collections::{BTreeMap, HashMap};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::format;
use crate::locale::{Locale, LocaleSet, TOTAL_LOCALES};
use crate::registry::TableRegistry;
use crate::storage::Db2Record;
use crate::tables::{BroadcastTextEntry, TactKeyEntry};

/// `(table hash, record ID)`
pub type HotfixKey = (u32, i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum HotfixStatus {
    NotSet = 0,
    Valid = 1,
    RecordRemoved = 2,
    Invalid = 3,
    NotPublic = 4,
}

impl HotfixStatus {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(HotfixStatus::NotSet),
            1 => Some(HotfixStatus::Valid),
            2 => Some(HotfixStatus::RecordRemoved),
            3 => Some(HotfixStatus::Invalid),
            4 => Some(HotfixStatus::NotPublic),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotfixRecord {
    pub table_hash: u32,
    pub record_id: i32,
    pub unique_id: u32,
    /// Push ID the record belongs to
    pub hotfix_id: i32,
    pub status: HotfixStatus,
}

/// Records sharing one push ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HotfixPush {
    pub records: Vec<HotfixRecord>,
    /// Locales every record of the push can be served in
    pub available_locales: LocaleSet,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotfixOptionalData {
    pub key: u32,
    pub data: Vec<u8>,
}

/// Optional data accepted for one table.
#[derive(Clone, Copy)]
struct AllowedOptionalData {
    key: u32,
    validator: fn(&[u8]) -> bool,
}

/// Encryption key payload: 8-byte key ID followed by the 16-byte key.
fn is_tact_key_payload(data: &[u8]) -> bool {
    data.len() == 8 + 16
}

fn allowed_optional_data() -> HashMap<u32, Vec<AllowedOptionalData>> {
    let mut allowed: HashMap<u32, Vec<AllowedOptionalData>> = HashMap::new();
    allowed
        .entry(format::table_hash(BroadcastTextEntry::TABLE_NAME))
        .or_default()
        .push(AllowedOptionalData {
            key: format::table_hash(TactKeyEntry::TABLE_NAME),
            validator: is_tact_key_payload,
        });
    allowed
}

fn parse_locale(name: &str) -> Option<Locale> {
    name.parse().ok()
}

/// Hotfixes loaded from a secondary store.
#[derive(Debug, Clone)]
pub struct HotfixStore {
    pushes: BTreeMap<i32, HotfixPush>,
    max_hotfix_id: i32,
    final_status: HashMap<HotfixKey, HotfixStatus>,
    blobs: Vec<HashMap<HotfixKey, Vec<u8>>>,
    optional_data: Vec<HashMap<HotfixKey, Vec<HotfixOptionalData>>>,
}

impl Default for HotfixStore {
    fn default() -> Self {
        Self {
            pushes: BTreeMap::new(),
            max_hotfix_id: 0,
            final_status: HashMap::new(),
            blobs: vec![HashMap::new(); TOTAL_LOCALES],
            optional_data: vec![HashMap::new(); TOTAL_LOCALES],
        }
    }
}

impl HotfixStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads blobs, optional data and hotfix rows from `source`.
    ///
    /// Rejected rows are logged and skipped; only a failing source is an error.
    pub fn load(source: &dyn HotfixSource, tables: &TableRegistry) -> Result<Self> {
        let start = Instant::now();
        let mut store = Self::new();

        store.load_blobs(source, tables)?;
        store.load_optional_data(source, tables)?;
        store.load_data(source, tables)?;

        tracing::info!(
            "Loaded {} hotfix records in {} pushes in {} ms",
            store.final_status.len(),
            store.pushes.len(),
            start.elapsed().as_millis()
        );
        Ok(store)
    }

    fn load_blobs(&mut self, source: &dyn HotfixSource, tables: &TableRegistry) -> Result<()> {
        let available = tables.available_locales();
        let mut count = 0usize;
        for row in source.hotfix_blobs()? {
            if tables.contains_table(row.table_hash) {
                tracing::error!(
                    "Table hash 0x{:08X} points to a loaded table, hotfix blob for record {} skipped",
                    row.table_hash,
                    row.record_id
                );
                continue;
            }
            let Some(locale) = parse_locale(&row.locale) else {
                tracing::error!(
                    "Hotfix blob for table hash 0x{:08X} record {} has invalid locale '{}'",
                    row.table_hash,
                    row.record_id,
                    row.locale
                );
                continue;
            };
            if !available.contains(locale) {
                continue;
            }
            self.blobs[locale.index()].insert((row.table_hash, row.record_id), row.blob);
            count += 1;
        }
        tracing::debug!("Loaded {} hotfix blobs", count);
        Ok(())
    }

    fn load_optional_data(&mut self, source: &dyn HotfixSource, tables: &TableRegistry) -> Result<()> {
        let allowed = allowed_optional_data();
        let available = tables.available_locales();
        let mut count = 0usize;
        for row in source.hotfix_optional_data()? {
            let Some(allowed_for_table) = allowed.get(&row.table_hash) else {
                tracing::error!(
                    "Table hash 0x{:08X} does not accept optional data, record {} skipped",
                    row.table_hash,
                    row.record_id
                );
                continue;
            };
            if !tables.contains_table(row.table_hash) {
                tracing::error!(
                    "Table hash 0x{:08X} is not a loaded table, optional data for record {} skipped",
                    row.table_hash,
                    row.record_id
                );
                continue;
            }
            let Some(locale) = parse_locale(&row.locale) else {
                tracing::error!(
                    "Optional data for table hash 0x{:08X} record {} has invalid locale '{}'",
                    row.table_hash,
                    row.record_id,
                    row.locale
                );
                continue;
            };
            if !available.contains(locale) {
                continue;
            }
            let Some(rule) = allowed_for_table.iter().find(|rule| rule.key == row.key) else {
                tracing::error!(
                    "Table hash 0x{:08X} does not accept optional data key 0x{:08X}, record {} skipped",
                    row.table_hash,
                    row.key,
                    row.record_id
                );
                continue;
            };
            if !(rule.validator)(&row.data) {
                tracing::error!(
                    "Optional data key 0x{:08X} for table hash 0x{:08X} record {} failed validation",
                    row.key,
                    row.table_hash,
                    row.record_id
                );
                continue;
            }
            self.optional_data[locale.index()]
                .entry((row.table_hash, row.record_id))
                .or_default()
                .push(HotfixOptionalData {
                    key: row.key,
                    data: row.data,
                });
            count += 1;
        }
        tracing::debug!("Loaded {} hotfix optional data entries", count);
        Ok(())
    }

    fn load_data(&mut self, source: &dyn HotfixSource, tables: &TableRegistry) -> Result<()> {
        let mut rows = source.hotfix_data()?;
        rows.sort_by_key(|row| row.id);

        for row in rows {
            let Some(status) = HotfixStatus::from_u8(row.status) else {
                tracing::error!(
                    "Hotfix {} for table hash 0x{:08X} record {} has invalid status {}",
                    row.id,
                    row.table_hash,
                    row.record_id,
                    row.status
                );
                continue;
            };

            let key = (row.table_hash, row.record_id);
            let mut locales = tables.available_locales();
            if status == HotfixStatus::Valid && !tables.contains_table(row.table_hash) {
                locales = locales
                    .iter()
                    .filter(|locale| self.blobs[locale.index()].contains_key(&key))
                    .collect();
                if locales.is_empty() {
                    tracing::error!(
                        "Hotfix {} references unknown table hash 0x{:08X} record {} without a blob",
                        row.id,
                        row.table_hash,
                        row.record_id
                    );
                    continue;
                }
            }

            let push = self.pushes.entry(row.id).or_default();
            push.records.push(HotfixRecord {
                table_hash: row.table_hash,
                record_id: row.record_id,
                unique_id: row.unique_id,
                hotfix_id: row.id,
                status,
            });
            push.available_locales = push.available_locales.union(locales);
            self.max_hotfix_id = self.max_hotfix_id.max(row.id);
            self.final_status.insert(key, status);
        }
        Ok(())
    }

    /// Erases every record whose last hotfix removed it.
    ///
    /// # Returns
    /// The number of records actually erased.
    pub fn reconcile(&self, tables: &mut TableRegistry) -> usize {
        let mut erased = 0;
        for (&(table_hash, record_id), status) in &self.final_status {
            if *status != HotfixStatus::RecordRemoved {
                continue;
            }
            let Ok(record_id) = u32::try_from(record_id) else {
                continue;
            };
            if let Some(store) = tables.storage_mut(table_hash) {
                if store.erase_record(record_id) {
                    erased += 1;
                }
            }
        }
        tracing::info!("Hotfixes removed {} records", erased);
        erased
    }

    /// Pushes keyed by push ID, ascending.
    pub fn pushes(&self) -> &BTreeMap<i32, HotfixPush> {
        &self.pushes
    }

    pub fn max_hotfix_id(&self) -> i32 {
        self.max_hotfix_id
    }

    /// Status of the last hotfix touching a record.
    pub fn record_status(&self, table_hash: u32, record_id: i32) -> Option<HotfixStatus> {
        self.final_status.get(&(table_hash, record_id)).copied()
    }

    pub fn hotfix_blob(&self, table_hash: u32, record_id: i32, locale: Locale) -> Option<&[u8]> {
        self.blobs[locale.index()]
            .get(&(table_hash, record_id))
            .map(Vec::as_slice)
    }

    pub fn hotfix_optional_data(
        &self,
        table_hash: u32,
        record_id: i32,
        locale: Locale,
    ) -> &[HotfixOptionalData] {
        self.optional_data[locale.index()]
            .get(&(table_hash, record_id))
            .map_or(&[][..], Vec::as_slice)
    }
}
