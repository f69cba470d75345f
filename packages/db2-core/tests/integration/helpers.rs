//! Fixtures that write synthetic data directories.

use std::path::{Path, PathBuf};

use tempfile::TempDir;

use db2_core::format::Db2FileWriter;
use db2_core::{DataConfig, Db2Record, Locale, TableRegistry};

/// Temporary `<data_dir>` with a `dbc/<locale>/` directory per locale.
pub struct DataDir {
    dir: TempDir,
}

impl DataDir {
    /// Data directory holding an empty file for every compiled table in each locale.
    pub fn with_locales(locales: &[Locale]) -> Self {
        let data = Self {
            dir: tempfile::tempdir().unwrap(),
        };
        for &locale in locales {
            for loader in TableRegistry::known_tables() {
                Db2FileWriter::new(loader.table_name(), loader.layout())
                    .write_to(&data.table_path(locale, loader.table_name()))
                    .unwrap();
            }
        }
        data
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn table_path(&self, locale: Locale, table: &str) -> PathBuf {
        self.dir
            .path()
            .join("dbc")
            .join(locale.name())
            .join(format!("{}.db2", table))
    }

    /// Replaces the `locale` file of `T` with `records`.
    pub fn write<T: Db2Record>(&self, locale: Locale, records: &[T]) {
        let mut writer = Db2FileWriter::for_table::<T>();
        for record in records {
            writer.push_record(record, locale).unwrap();
        }
        writer.write_to(&self.table_path(locale, T::TABLE_NAME)).unwrap();
    }

    /// Writes a game table file with `columns` value columns.
    pub fn write_game_table(&self, name: &str, columns: usize, rows: &[Vec<f32>]) {
        let mut text = String::from("Level");
        for column in 0..columns {
            text.push_str(&format!("\tC{}", column));
        }
        text.push('\n');
        for (index, row) in rows.iter().enumerate() {
            text.push_str(&(index + 1).to_string());
            for value in row {
                text.push_str(&format!("\t{}", value));
            }
            text.push('\n');
        }
        let dir = self.dir.path().join("gt");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{}.txt", name)), text).unwrap();
    }

    /// Configuration pointing at this directory, without version checks or game tables.
    pub fn config(&self) -> DataConfig {
        DataConfig {
            version_checks: Vec::new(),
            load_game_tables: false,
            load_workers: 4,
            ..DataConfig::with_data_dir(self.path())
        }
    }
}
