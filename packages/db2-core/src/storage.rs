//! Record table store.
//!
//! Each store holds:
//! - Records of one fixed-schema table keyed by record ID
//! - Ascending ID order for deterministic iteration
//! - Localized string columns merged from every available locale

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::error::{DataError, Result};
use crate::format::{self, Db2File, FieldType, RowReader, RowWriter};
use crate::io_utils;
use crate::locale::Locale;

/// Number of tables loaded from disk by this process.
static LOADED_TABLES: AtomicUsize = AtomicUsize::new(0);

/// Returns the number of table files successfully loaded so far.
pub fn loaded_table_count() -> usize {
    LOADED_TABLES.load(Ordering::Acquire)
}

/// Row type of one table.
pub trait Db2Record: Sized + Send + Sync + 'static {
    /// File name without extension, e.g. "CurvePoint"
    const TABLE_NAME: &'static str;
    /// Column layout, arrays flattened
    const LAYOUT: &'static [FieldType];

    /// Primary key.
    fn id(&self) -> u32;

    /// Decodes one row. Must consume exactly `LAYOUT`.
    fn read(row: &mut RowReader<'_>) -> Result<Self>;

    /// Encodes one row, localized columns take their `locale` value.
    fn write(&self, row: &mut RowWriter<'_>, locale: Locale);

    /// Copies localized string columns of `localized` for `locale`.
    fn merge_locale(&mut self, _localized: &Self, _locale: Locale) {}
}

/// Type-erased view of a store, for consumers that only know a table hash.
pub trait TableStore: Any + Send + Sync {
    fn table_name(&self) -> &'static str;

    fn table_hash(&self) -> u32 {
        format::table_hash(self.table_name())
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, id: u32) -> bool;

    /// Removes a record; returns whether it existed.
    fn erase_record(&mut self, id: u32) -> bool;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Records of one table keyed by ID.
pub struct Db2Storage<T> {
    records: HashMap<u32, T>,
    order: Vec<u32>,
}

impl<T> fmt::Debug for Db2Storage<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Db2Storage")
            .field("records", &self.records.len())
            .finish()
    }
}

impl<T: Db2Record> Default for Db2Storage<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Db2Record> Db2Storage<T> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Loads a table file.
    ///
    /// # Arguments
    /// * `path` - Path to `<TableName>.db2`
    /// * `locale` - Locale the file belongs to, tags localized columns
    ///
    /// # Returns
    /// `Result<Db2Storage<T>, DataError>`; corrupt, truncated or mismatched
    /// files are errors.
    pub fn load(path: &Path, locale: Locale) -> Result<Self> {
        let bytes = io_utils::read_file(path)?;
        let storage = Self::load_from_bytes(&bytes, locale)?;
        LOADED_TABLES.fetch_add(1, Ordering::AcqRel);
        tracing::debug!(
            "Loaded {} records from {}",
            storage.len(),
            path.display()
        );
        Ok(storage)
    }

    /// Parses a table from in-memory file contents.
    pub fn load_from_bytes(bytes: &[u8], locale: Locale) -> Result<Self> {
        let file = Db2File::parse(T::TABLE_NAME, T::LAYOUT, bytes)?;
        let mut storage = Self::new();
        storage.records.reserve(file.record_count());
        storage.order.reserve(file.record_count());
        for mut row in file.rows(locale) {
            let record = read_record::<T>(&mut row)?;
            if let Some(previous) = storage.push_unsorted(record) {
                tracing::warn!(
                    "Table {} contains duplicate record {}, keeping the last row",
                    T::TABLE_NAME,
                    previous.id()
                );
            }
        }
        storage.order.sort_unstable();
        Ok(storage)
    }

    /// Bulk insert; `order` must be sorted once all rows are pushed.
    fn push_unsorted(&mut self, record: T) -> Option<T> {
        let id = record.id();
        let previous = self.records.insert(id, record);
        if previous.is_none() {
            self.order.push(id);
        }
        previous
    }

    /// Merges localized string columns from a locale file.
    ///
    /// # Returns
    /// `Ok(false)` when the locale file does not exist, `Ok(true)` once merged.
    pub fn load_locale_overlay(&mut self, path: &Path, locale: Locale) -> Result<bool> {
        if !format::has_localized_strings(T::LAYOUT) || !path.is_file() {
            return Ok(false);
        }
        let bytes = io_utils::read_file(path)?;
        let merged = self.merge_locale_bytes(&bytes, locale)?;
        tracing::debug!(
            "Merged {} {} strings into {}",
            merged,
            locale,
            T::TABLE_NAME
        );
        Ok(true)
    }

    /// Merges localized columns from in-memory locale file contents.
    ///
    /// # Returns
    /// Number of records updated; rows absent from the base table are ignored.
    pub fn merge_locale_bytes(&mut self, bytes: &[u8], locale: Locale) -> Result<usize> {
        let file = Db2File::parse(T::TABLE_NAME, T::LAYOUT, bytes)?;
        let mut merged = 0;
        for mut row in file.rows(locale) {
            let localized = read_record::<T>(&mut row)?;
            if let Some(record) = self.records.get_mut(&localized.id()) {
                record.merge_locale(&localized, locale);
                merged += 1;
            }
        }
        Ok(merged)
    }

    /// Inserts or replaces a single record, keyed by its own ID.
    pub fn insert(&mut self, record: T) -> Option<T> {
        let id = record.id();
        let previous = self.records.insert(id, record);
        if previous.is_none() {
            match self.order.binary_search(&id) {
                Ok(_) => {}
                Err(pos) => self.order.insert(pos, id),
            }
        }
        previous
    }

    /// Looks up a record by ID.
    pub fn lookup(&self, id: u32) -> Option<&T> {
        self.records.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.records.contains_key(&id)
    }

    /// Removes a record by ID.
    pub fn erase_record(&mut self, id: u32) -> bool {
        if self.records.remove(&id).is_none() {
            return false;
        }
        if let Ok(pos) = self.order.binary_search(&id) {
            self.order.remove(pos);
        }
        true
    }

    /// Records in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.order.iter().filter_map(move |id| self.records.get(id))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Highest record ID, if any.
    pub fn max_id(&self) -> Option<u32> {
        self.order.last().copied()
    }
}

fn read_record<T: Db2Record>(row: &mut RowReader<'_>) -> Result<T> {
    let record = T::read(row)?;
    if row.remaining() != 0 {
        return Err(DataError::SchemaMismatch {
            table: T::TABLE_NAME.to_string(),
            message: format!("{} bytes left unread in row", row.remaining()),
        });
    }
    Ok(record)
}

impl<T: Db2Record> FromIterator<T> for Db2Storage<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut storage = Self::new();
        for record in iter {
            storage.push_unsorted(record);
        }
        storage.order.sort_unstable();
        storage
    }
}

impl<T: Db2Record> TableStore for Db2Storage<T> {
    fn table_name(&self) -> &'static str {
        T::TABLE_NAME
    }

    fn len(&self) -> usize {
        self.records.len()
    }

    fn contains(&self, id: u32) -> bool {
        self.records.contains_key(&id)
    }

    fn erase_record(&mut self, id: u32) -> bool {
        Db2Storage::erase_record(self, id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Db2FileWriter;
    use crate::locale::LocalizedString;
    use tempfile::tempdir;

    #[derive(Debug, Clone, PartialEq)]
    struct Widget {
        id: u32,
        weight: f32,
        flags: u8,
        name: LocalizedString,
    }

    impl Db2Record for Widget {
        const TABLE_NAME: &'static str = "Widget";
        const LAYOUT: &'static [FieldType] = &[
            FieldType::U32,
            FieldType::F32,
            FieldType::U8,
            FieldType::LocString,
        ];

        fn id(&self) -> u32 {
            self.id
        }

        fn read(row: &mut RowReader<'_>) -> Result<Self> {
            Ok(Self {
                id: row.u32()?,
                weight: row.f32()?,
                flags: row.u8()?,
                name: row.loc_string()?,
            })
        }

        fn write(&self, row: &mut RowWriter<'_>, locale: Locale) {
            row.u32(self.id)
                .f32(self.weight)
                .u8(self.flags)
                .string(self.name.get(locale));
        }

        fn merge_locale(&mut self, localized: &Self, locale: Locale) {
            self.name.merge(&localized.name, locale);
        }
    }

    fn widget_file(rows: &[(u32, f32, u8, &str)]) -> Vec<u8> {
        let mut writer = Db2FileWriter::new(Widget::TABLE_NAME, Widget::LAYOUT);
        for &(id, weight, flags, name) in rows {
            writer
                .push_row(|row| {
                    row.u32(id).f32(weight).u8(flags).string(name);
                })
                .unwrap();
        }
        writer.finish()
    }

    #[test]
    fn test_load_four_rows() {
        let bytes = widget_file(&[
            (10, 1.25, 1, "Anvil"),
            (3, -0.5, 2, "Bellows"),
            (42, 100.0, 255, "Crucible"),
            (7, 0.0, 0, ""),
        ]);
        let storage = Db2Storage::<Widget>::load_from_bytes(&bytes, Locale::EnUs).unwrap();
        assert_eq!(storage.len(), 4);

        let ids: Vec<u32> = storage.iter().map(|w| w.id).collect();
        assert_eq!(ids, vec![3, 7, 10, 42]);

        let anvil = storage.lookup(10).unwrap();
        assert_eq!(anvil.weight, 1.25);
        assert_eq!(anvil.flags, 1);
        assert_eq!(anvil.name.get(Locale::EnUs), "Anvil");
        let crucible = storage.lookup(42).unwrap();
        assert_eq!(crucible.weight, 100.0);
        assert_eq!(crucible.flags, 255);
        assert_eq!(storage.lookup(7).unwrap().name.get(Locale::EnUs), "");

        for record in storage.iter() {
            assert_eq!(storage.lookup(record.id()).unwrap().id(), record.id());
        }
        assert_eq!(storage.max_id(), Some(42));
    }

    #[test]
    fn test_duplicate_rows_keep_last() {
        let bytes = widget_file(&[(1, 1.0, 0, "first"), (1, 2.0, 0, "second")]);
        let storage = Db2Storage::<Widget>::load_from_bytes(&bytes, Locale::EnUs).unwrap();
        assert_eq!(storage.len(), 1);
        assert_eq!(storage.lookup(1).unwrap().name.get(Locale::EnUs), "second");
        assert_eq!(storage.iter().count(), 1);
    }

    #[test]
    fn test_descending_file_iterates_ascending() {
        let rows: Vec<(u32, f32, u8, &str)> = (1..=2000u32).rev().map(|id| (id, 0.0, 0, "")).collect();
        let mut storage = Db2Storage::<Widget>::load_from_bytes(&widget_file(&rows), Locale::EnUs).unwrap();
        assert_eq!(storage.len(), 2000);
        assert!(storage.iter().map(|w| w.id).eq(1..=2000));
        assert_eq!(storage.max_id(), Some(2000));

        // single inserts keep the order sorted
        storage.insert(Widget {
            id: 5000,
            weight: 0.0,
            flags: 0,
            name: LocalizedString::default(),
        });
        storage.erase_record(1);
        assert_eq!(storage.iter().next().map(|w| w.id), Some(2));
        assert_eq!(storage.max_id(), Some(5000));

        let collected: Db2Storage<Widget> = [9, 3, 3, 6]
            .into_iter()
            .map(|id| Widget {
                id,
                weight: 0.0,
                flags: 0,
                name: LocalizedString::default(),
            })
            .collect();
        assert_eq!(collected.iter().map(|w| w.id).collect::<Vec<_>>(), vec![3, 6, 9]);
    }

    #[test]
    fn test_erase_record() {
        let bytes = widget_file(&[(1, 1.0, 0, "a"), (2, 2.0, 0, "b")]);
        let mut storage = Db2Storage::<Widget>::load_from_bytes(&bytes, Locale::EnUs).unwrap();
        assert!(storage.erase_record(1));
        assert!(!storage.erase_record(1));
        assert!(storage.lookup(1).is_none());
        assert_eq!(storage.iter().map(|w| w.id).collect::<Vec<_>>(), vec![2]);

        let erased: &mut dyn TableStore = &mut storage;
        assert!(erased.erase_record(2));
        assert!(erased.is_empty());
    }

    #[test]
    fn test_locale_overlay_merges_strings() {
        let dir = tempdir().unwrap();
        let base = dir.path().join("enUS").join("Widget.db2");
        let german = dir.path().join("deDE").join("Widget.db2");

        let mut writer = Db2FileWriter::new(Widget::TABLE_NAME, Widget::LAYOUT);
        writer
            .push_row(|row| {
                row.u32(1).f32(1.0).u8(0).string("Hammer");
            })
            .unwrap();
        writer.write_to(&base).unwrap();

        let mut writer = Db2FileWriter::new(Widget::TABLE_NAME, Widget::LAYOUT);
        writer
            .push_row(|row| {
                row.u32(1).f32(9.0).u8(9).string("Hammer (de)");
            })
            .unwrap();
        writer
            .push_row(|row| {
                row.u32(99).f32(9.0).u8(9).string("Unbekannt");
            })
            .unwrap();
        writer.write_to(&german).unwrap();

        let before = loaded_table_count();
        let mut storage = Db2Storage::<Widget>::load(&base, Locale::EnUs).unwrap();
        assert!(loaded_table_count() > before);
        assert!(storage.load_locale_overlay(&german, Locale::DeDe).unwrap());

        let hammer = storage.lookup(1).unwrap();
        assert_eq!(hammer.name.get(Locale::EnUs), "Hammer");
        assert_eq!(hammer.name.get(Locale::DeDe), "Hammer (de)");
        // non-localized columns come from the base file only
        assert_eq!(hammer.weight, 1.0);
        assert!(storage.lookup(99).is_none());
    }

    #[test]
    fn test_missing_locale_overlay_is_skipped() {
        let dir = tempdir().unwrap();
        let mut storage: Db2Storage<Widget> = Db2Storage::new();
        let loaded = storage
            .load_locale_overlay(&dir.path().join("deDE").join("Widget.db2"), Locale::DeDe)
            .unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_unread_bytes_are_schema_mismatch() {
        #[derive(Debug)]
        struct Sloppy {
            id: u32,
        }
        impl Db2Record for Sloppy {
            const TABLE_NAME: &'static str = "Sloppy";
            const LAYOUT: &'static [FieldType] = &[FieldType::U32, FieldType::U32];
            fn id(&self) -> u32 {
                self.id
            }
            fn read(row: &mut RowReader<'_>) -> Result<Self> {
                Ok(Self { id: row.u32()? })
            }
            fn write(&self, row: &mut RowWriter<'_>, _locale: Locale) {
                row.u32(self.id).u32(0);
            }
        }

        let mut writer = Db2FileWriter::new(Sloppy::TABLE_NAME, Sloppy::LAYOUT);
        writer
            .push_row(|row| {
                row.u32(1).u32(2);
            })
            .unwrap();
        let err = Db2Storage::<Sloppy>::load_from_bytes(&writer.finish(), Locale::EnUs).unwrap_err();
        assert!(matches!(err, DataError::SchemaMismatch { .. }));
    }

    #[test]
    fn test_type_erased_hash() {
        let storage: Db2Storage<Widget> = Db2Storage::new();
        let erased: &dyn TableStore = &storage;
        assert_eq!(erased.table_hash(), format::table_hash("Widget"));
        assert_eq!(erased.table_name(), "Widget");
        assert!(erased
            .as_any()
            .downcast_ref::<Db2Storage<Widget>>()
            .is_some());
    }
}
