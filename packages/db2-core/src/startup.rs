//! Startup sequence: tables, version check, hotfixes, indices, game tables.

use std::time::Instant;

use crate::config::DataConfig;
use crate::error::{DataError, Result};
use crate::game_table::GameTables;
use crate::hotfix::{HotfixStore, JsonHotfixSource};
use crate::manager::Db2Manager;
use crate::registry::{LoadSummary, TableRegistry};

/// Everything loaded at startup, read-only afterwards.
#[derive(Debug)]
pub struct GameData {
    pub manager: Db2Manager,
    pub hotfixes: HotfixStore,
    /// `None` when game tables are disabled in the configuration
    pub game_tables: Option<GameTables>,
    pub summary: LoadSummary,
}

impl GameData {
    /// Runs the full startup sequence.
    ///
    /// Removed hotfix records are erased before the indices are built, so no
    /// index ever references them.
    ///
    /// # Returns
    /// - `Err(DataError::DefaultLocaleMissing)` if the default locale directory is absent
    /// - `Err(DataError::TablesFailed)` if any table or game table failed to load
    /// - `Err(DataError::OutdatedClientData)` if a last known record is missing
    pub fn load(config: &DataConfig) -> Result<Self> {
        let start = Instant::now();
        let (mut tables, summary) = TableRegistry::load_all(config)?;
        if !summary.is_complete() {
            return Err(DataError::TablesFailed {
                tables: summary.failed.clone(),
            });
        }
        tables.check_version(&config.version_checks)?;

        let hotfixes = match &config.hotfix_path {
            Some(path) => {
                let source = JsonHotfixSource::from_file(path)?;
                HotfixStore::load(&source, &tables)?
            }
            None => HotfixStore::new(),
        };
        hotfixes.reconcile(&mut tables);

        let manager = Db2Manager::new(tables);

        let game_tables = if config.load_game_tables {
            Some(GameTables::load(&config.gt_dir())?)
        } else {
            None
        };

        tracing::info!(
            "Initialized {} DB2 data stores ({} locales) in {} ms",
            manager.tables().table_count(),
            summary.available_locales.len(),
            start.elapsed().as_millis()
        );

        Ok(Self {
            manager,
            hotfixes,
            game_tables,
            summary,
        })
    }
}
