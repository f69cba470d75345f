//! Static client game-data engine.
//!
//! Loads fixed-schema DB2 tables and their localized overlays, applies the
//! hotfix overlay, builds cross-reference indices and answers read-only
//! queries over them.

pub mod config;
pub mod defines;
pub mod error;
pub mod format;
pub mod game_table;
pub mod hotfix;
pub mod io_utils;
pub mod locale;
pub mod manager;
pub mod registry;
pub mod startup;
pub mod storage;
pub mod tables;

pub use config::{DataConfig, VersionCheck};
pub use error::{DataError, Result};
pub use locale::{Locale, LocaleSet, LocalizedString};
pub use manager::Db2Manager;
pub use registry::{LoadSummary, TableRegistry};
pub use startup::GameData;
pub use storage::{Db2Record, Db2Storage, TableStore};
