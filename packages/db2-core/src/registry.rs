//! Table registry and parallel bulk loading.

use std::any::TypeId;
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::config::{DataConfig, VersionCheck};
use crate::error::{DataError, Result};
use crate::format::{self, FieldType};
use crate::locale::{Locale, LocaleSet};
use crate::storage::{loaded_table_count, Db2Record, Db2Storage, TableStore};
use crate::tables;

/// Type-erased load entry point for one compiled table.
#[derive(Clone, Copy)]
pub struct TableLoader {
    name: &'static str,
    layout: &'static [FieldType],
    type_id: TypeId,
    load: fn(&Path, Locale, LocaleSet) -> Result<Box<dyn TableStore>>,
    empty: fn() -> Box<dyn TableStore>,
}

impl std::fmt::Debug for TableLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableLoader")
            .field("name", &self.name)
            .field("fields", &self.layout.len())
            .finish()
    }
}

impl TableLoader {
    pub fn of<T: Db2Record>() -> Self {
        Self {
            name: T::TABLE_NAME,
            layout: T::LAYOUT,
            type_id: TypeId::of::<T>(),
            load: load_table::<T>,
            empty: empty_table::<T>,
        }
    }

    pub fn table_name(&self) -> &'static str {
        self.name
    }

    pub fn table_hash(&self) -> u32 {
        format::table_hash(self.name)
    }

    pub fn layout(&self) -> &'static [FieldType] {
        self.layout
    }

    /// File name inside a locale directory.
    pub fn file_name(&self) -> String {
        format!("{}.db2", self.name)
    }
}

fn empty_table<T: Db2Record>() -> Box<dyn TableStore> {
    Box::new(Db2Storage::<T>::new())
}

/// Loads the default locale file of a table, then merges every other
/// available locale. Locale files that fail to merge are logged and skipped.
fn load_table<T: Db2Record>(
    dbc_dir: &Path,
    default_locale: Locale,
    locales: LocaleSet,
) -> Result<Box<dyn TableStore>> {
    let file_name = format!("{}.db2", T::TABLE_NAME);
    let mut storage =
        Db2Storage::<T>::load(&dbc_dir.join(default_locale.name()).join(&file_name), default_locale)?;

    if format::has_localized_strings(T::LAYOUT) {
        for locale in locales.iter().filter(|&locale| locale != default_locale) {
            let path = dbc_dir.join(locale.name()).join(&file_name);
            if let Err(e) = storage.load_locale_overlay(&path, locale) {
                tracing::warn!("Skipping {} strings of {}: {}", locale, T::TABLE_NAME, e);
            }
        }
    }

    Ok(Box::new(storage))
}

/// Outcome of [`TableRegistry::load_all`].
#[derive(Debug, Clone, Default)]
pub struct LoadSummary {
    /// Tables loaded without error
    pub loaded: usize,
    /// Names of tables that failed to load, sorted
    pub failed: Vec<String>,
    /// Locales found on disk
    pub available_locales: LocaleSet,
    pub elapsed: Duration,
}

impl LoadSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// One store per compiled table, keyed by table hash.
pub struct TableRegistry {
    stores: HashMap<u32, Box<dyn TableStore>>,
    by_type: HashMap<TypeId, u32>,
    default_locale: Locale,
    available_locales: LocaleSet,
}

impl std::fmt::Debug for TableRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRegistry")
            .field("tables", &self.stores.len())
            .field("default_locale", &self.default_locale)
            .field("available_locales", &self.available_locales)
            .finish()
    }
}

impl Default for TableRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

impl TableRegistry {
    /// Registry with an empty store for every compiled table and only enUS available.
    pub fn empty() -> Self {
        let mut locales = LocaleSet::empty();
        locales.insert(Locale::EnUs);
        Self::with_locales(Locale::EnUs, locales)
    }

    /// Registry with an empty store for every compiled table.
    pub fn with_locales(default_locale: Locale, available_locales: LocaleSet) -> Self {
        let mut registry = Self {
            stores: HashMap::new(),
            by_type: HashMap::new(),
            default_locale,
            available_locales,
        };
        for loader in tables::loaders() {
            registry.register(&loader, (loader.empty)());
        }
        registry
    }

    /// Descriptors of every compiled table.
    pub fn known_tables() -> Vec<TableLoader> {
        tables::loaders()
    }

    /// Loads every compiled table from `<data_dir>/dbc/<locale>/`.
    ///
    /// Blocks until every load task has finished. Tables that fail are
    /// logged, listed in [`LoadSummary::failed`] and registered empty.
    ///
    /// # Returns
    /// `Err(DataError::DefaultLocaleMissing)` when the default locale directory
    /// does not exist.
    pub fn load_all(config: &DataConfig) -> Result<(Self, LoadSummary)> {
        let start = Instant::now();
        let dbc_dir = config.dbc_dir();
        let default_locale = config.default_locale;

        let default_dir = dbc_dir.join(default_locale.name());
        if !default_dir.is_dir() {
            return Err(DataError::DefaultLocaleMissing { path: default_dir });
        }

        let available_locales: LocaleSet = Locale::ALL
            .iter()
            .copied()
            .filter(|locale| dbc_dir.join(locale.name()).is_dir())
            .collect();

        let loaders = tables::loaders();
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.effective_workers())
            .thread_name(|i| format!("db2-load-{}", i))
            .build()
            .map_err(|e| DataError::Config(format!("Failed to build load pool: {}", e)))?;

        let loaded_before = loaded_table_count();
        let stores: Mutex<Vec<(TableLoader, Box<dyn TableStore>)>> =
            Mutex::new(Vec::with_capacity(loaders.len()));
        let failed: Mutex<Vec<String>> = Mutex::new(Vec::new());

        pool.scope(|scope| {
            for loader in &loaders {
                let dbc_dir = &dbc_dir;
                let stores = &stores;
                let failed = &failed;
                scope.spawn(move |_| {
                    let store = match (loader.load)(dbc_dir, default_locale, available_locales) {
                        Ok(store) => store,
                        Err(e) => {
                            tracing::error!("Failed to load table {}: {}", loader.name, e);
                            failed.lock().push(loader.name.to_string());
                            (loader.empty)()
                        }
                    };
                    stores.lock().push((*loader, store));
                });
            }
        });

        let mut registry = Self {
            stores: HashMap::with_capacity(loaders.len()),
            by_type: HashMap::with_capacity(loaders.len()),
            default_locale,
            available_locales,
        };
        for (loader, store) in stores.into_inner() {
            registry.register(&loader, store);
        }

        let mut failed = failed.into_inner();
        failed.sort();
        let summary = LoadSummary {
            loaded: loaders.len() - failed.len(),
            failed,
            available_locales,
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Loaded {} DB2 tables ({} files) in {} ms, locales: {}",
            summary.loaded,
            loaded_table_count() - loaded_before,
            summary.elapsed.as_millis(),
            available_locales
                .iter()
                .map(|l| l.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok((registry, summary))
    }

    fn register(&mut self, loader: &TableLoader, store: Box<dyn TableStore>) {
        let hash = loader.table_hash();
        self.by_type.insert(loader.type_id, hash);
        self.stores.insert(hash, store);
    }

    /// Verifies that the last known record of each critical table exists.
    ///
    /// # Returns
    /// `Err(DataError::OutdatedClientData)` listing every missing record.
    pub fn check_version(&self, checks: &[VersionCheck]) -> Result<()> {
        let missing: Vec<String> = checks
            .iter()
            .filter(|check| {
                !self
                    .storage(format::table_hash(&check.table))
                    .is_some_and(|store| store.contains(check.record_id))
            })
            .map(|check| format!("{} #{}", check.table, check.record_id))
            .collect();

        if missing.is_empty() {
            return Ok(());
        }
        tracing::error!(
            "You have mismatched DB2 files, missing records: {}",
            missing.join(", ")
        );
        Err(DataError::OutdatedClientData { missing })
    }

    /// Type-erased store by table hash.
    pub fn storage(&self, table_hash: u32) -> Option<&dyn TableStore> {
        self.stores.get(&table_hash).map(|store| store.as_ref())
    }

    pub fn storage_mut(&mut self, table_hash: u32) -> Option<&mut (dyn TableStore + 'static)> {
        self.stores.get_mut(&table_hash).map(|store| store.as_mut())
    }

    /// Whether `table_hash` names a compiled table.
    pub fn contains_table(&self, table_hash: u32) -> bool {
        self.stores.contains_key(&table_hash)
    }

    /// Typed store, `None` when `T` is not registered.
    pub fn get<T: Db2Record>(&self) -> Option<&Db2Storage<T>> {
        let hash = self.by_type.get(&TypeId::of::<T>())?;
        self.stores.get(hash)?.as_any().downcast_ref()
    }

    pub fn get_mut<T: Db2Record>(&mut self) -> Option<&mut Db2Storage<T>> {
        let hash = self.by_type.get(&TypeId::of::<T>())?;
        self.stores.get_mut(hash)?.as_any_mut().downcast_mut()
    }

    /// Typed store of a compiled table, for index builders and manager queries.
    ///
    /// # Panics
    /// If `T` is not a compiled table. Every constructor registers each
    /// compiled table, empty when its file failed to load.
    pub(crate) fn table<T: Db2Record>(&self) -> &Db2Storage<T> {
        self.get::<T>()
            .unwrap_or_else(|| panic!("table {} is not registered", T::TABLE_NAME))
    }

    /// Registers or replaces the store of `T`.
    pub fn insert<T: Db2Record>(&mut self, storage: Db2Storage<T>) {
        self.register(&TableLoader::of::<T>(), Box::new(storage));
    }

    /// Stores in no particular order.
    pub fn stores(&self) -> impl Iterator<Item = &dyn TableStore> + '_ {
        self.stores.values().map(|store| store.as_ref())
    }

    pub fn table_count(&self) -> usize {
        self.stores.len()
    }

    pub fn total_records(&self) -> usize {
        self.stores.values().map(|store| store.len()).sum()
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub fn available_locales(&self) -> LocaleSet {
        self.available_locales
    }
}
