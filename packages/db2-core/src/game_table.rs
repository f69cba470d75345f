//! Tab-separated numeric game tables from `<data_dir>/gt/`.
//!
//! The first line names the columns; every following line is a row index
//! followed by one float per column. Rows are addressed by their position,
//! starting at 1 (usually a character level). Row 0 is a placeholder.

use std::path::Path;
use std::time::Instant;

use crate::defines::Class;
use crate::error::{DataError, Result};
use crate::io_utils::{classify_io_error, read_file};

/// Row type of a game table.
pub trait GameTableRow: Default + Clone {
    /// File name without extension
    const FILE_NAME: &'static str;
    /// Value columns, excluding the leading row index
    const COLUMNS: usize;

    fn from_values(values: &[f32]) -> Self;
}

/// Rows exposing one value column per player class.
pub trait ClassValue {
    fn value_for_class(&self, class: Class) -> f32;
}

/// Per-class value columns in file order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassColumns {
    pub rogue: f32,
    pub druid: f32,
    pub hunter: f32,
    pub mage: f32,
    pub paladin: f32,
    pub priest: f32,
    pub shaman: f32,
    pub warlock: f32,
    pub warrior: f32,
    pub death_knight: f32,
    pub monk: f32,
    pub demon_hunter: f32,
    pub evoker: f32,
    pub adventurer: f32,
}

impl ClassColumns {
    const COUNT: usize = 14;

    fn from_values(values: &[f32]) -> Self {
        Self {
            rogue: values[0],
            druid: values[1],
            hunter: values[2],
            mage: values[3],
            paladin: values[4],
            priest: values[5],
            shaman: values[6],
            warlock: values[7],
            warrior: values[8],
            death_knight: values[9],
            monk: values[10],
            demon_hunter: values[11],
            evoker: values[12],
            adventurer: values[13],
        }
    }
}

impl ClassValue for ClassColumns {
    fn value_for_class(&self, class: Class) -> f32 {
        match class {
            Class::Warrior => self.warrior,
            Class::Paladin => self.paladin,
            Class::Hunter => self.hunter,
            Class::Rogue => self.rogue,
            Class::Priest => self.priest,
            Class::DeathKnight => self.death_knight,
            Class::Shaman => self.shaman,
            Class::Mage => self.mage,
            Class::Warlock => self.warlock,
            Class::Monk => self.monk,
            Class::Druid => self.druid,
            Class::DemonHunter => self.demon_hunter,
            Class::Evoker => self.evoker,
            Class::Adventurer => self.adventurer,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GtBaseMpEntry {
    pub classes: ClassColumns,
}

impl GameTableRow for GtBaseMpEntry {
    const FILE_NAME: &'static str = "BaseMp";
    const COLUMNS: usize = ClassColumns::COUNT;

    fn from_values(values: &[f32]) -> Self {
        Self {
            classes: ClassColumns::from_values(values),
        }
    }
}

impl ClassValue for GtBaseMpEntry {
    fn value_for_class(&self, class: Class) -> f32 {
        self.classes.value_for_class(class)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GtHpPerStaEntry {
    pub health: f32,
}

impl GameTableRow for GtHpPerStaEntry {
    const FILE_NAME: &'static str = "HpPerSta";
    const COLUMNS: usize = 1;

    fn from_values(values: &[f32]) -> Self {
        Self { health: values[0] }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GtSpellScalingEntry {
    pub classes: ClassColumns,
    pub item: f32,
    pub consumable: f32,
    pub gem1: f32,
    pub gem2: f32,
    pub gem3: f32,
    pub health: f32,
    pub damage_replace_stat: f32,
    pub damage_secondary: f32,
}

impl GameTableRow for GtSpellScalingEntry {
    const FILE_NAME: &'static str = "SpellScaling";
    const COLUMNS: usize = ClassColumns::COUNT + 8;

    fn from_values(values: &[f32]) -> Self {
        let extra = &values[ClassColumns::COUNT..];
        Self {
            classes: ClassColumns::from_values(values),
            item: extra[0],
            consumable: extra[1],
            gem1: extra[2],
            gem2: extra[3],
            gem3: extra[4],
            health: extra[5],
            damage_replace_stat: extra[6],
            damage_secondary: extra[7],
        }
    }
}

impl ClassValue for GtSpellScalingEntry {
    fn value_for_class(&self, class: Class) -> f32 {
        self.classes.value_for_class(class)
    }
}

impl GtSpellScalingEntry {
    /// Scaling column selected by a spell's scaling class.
    ///
    /// Positive values are player classes; negative values select the item,
    /// consumable, gem, health and damage columns (-1 to -8).
    pub fn value_for_scaling_class(&self, scaling_class: i32) -> f32 {
        match scaling_class {
            -1 => self.item,
            -2 => self.consumable,
            -3 => self.gem1,
            -4 => self.gem2,
            -5 => self.gem3,
            -6 => self.health,
            -7 => self.damage_replace_stat,
            -8 => self.damage_secondary,
            id => u8::try_from(id)
                .ok()
                .and_then(Class::from_id)
                .map_or(0.0, |class| self.value_for_class(class)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GtXpEntry {
    pub total: f32,
    pub per_kill: f32,
    pub junk: f32,
    pub stats: f32,
    pub divisor: f32,
}

impl GameTableRow for GtXpEntry {
    const FILE_NAME: &'static str = "xp";
    const COLUMNS: usize = 5;

    fn from_values(values: &[f32]) -> Self {
        Self {
            total: values[0],
            per_kill: values[1],
            junk: values[2],
            stats: values[3],
            divisor: values[4],
        }
    }
}

/// Combat rating column of `CombatRatings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CombatRating {
    Amplify = 0,
    DefenseSkill = 1,
    Dodge = 2,
    Parry = 3,
    Block = 4,
    HitMelee = 5,
    HitRanged = 6,
    HitSpell = 7,
    CritMelee = 8,
    CritRanged = 9,
    CritSpell = 10,
    Corruption = 11,
    CorruptionResistance = 12,
    Speed = 13,
    ResilienceCritTaken = 14,
    ResiliencePlayerDamage = 15,
    Lifesteal = 16,
    HasteMelee = 17,
    HasteRanged = 18,
    HasteSpell = 19,
    Avoidance = 20,
    Sturdiness = 21,
    Unused7 = 22,
    Expertise = 23,
    ArmorPenetration = 24,
    Mastery = 25,
    PvpPower = 26,
    Cleave = 27,
    VersatilityDamageDone = 28,
    VersatilityHealingDone = 29,
    VersatilityDamageTaken = 30,
    Unused12 = 31,
}

pub const MAX_COMBAT_RATING: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GtCombatRatingsEntry {
    pub ratings: [f32; MAX_COMBAT_RATING],
}

impl Default for GtCombatRatingsEntry {
    fn default() -> Self {
        Self {
            ratings: [0.0; MAX_COMBAT_RATING],
        }
    }
}

impl GtCombatRatingsEntry {
    pub fn rating(&self, rating: CombatRating) -> f32 {
        self.ratings[rating as usize]
    }
}

impl GameTableRow for GtCombatRatingsEntry {
    const FILE_NAME: &'static str = "CombatRatings";
    const COLUMNS: usize = MAX_COMBAT_RATING;

    fn from_values(values: &[f32]) -> Self {
        let mut ratings = [0.0; MAX_COMBAT_RATING];
        ratings.copy_from_slice(&values[..MAX_COMBAT_RATING]);
        Self { ratings }
    }
}

/// Parsed game table, indexed by row position.
#[derive(Debug, Clone)]
pub struct GameTable<T> {
    rows: Vec<T>,
}

impl<T: GameTableRow> Default for GameTable<T> {
    fn default() -> Self {
        Self { rows: Vec::new() }
    }
}

impl<T: GameTableRow> GameTable<T> {
    /// Loads `<gt_dir>/<FILE_NAME>.txt`; a missing file is an error.
    pub fn load(gt_dir: &Path) -> Result<Self> {
        let path = gt_dir.join(format!("{}.txt", T::FILE_NAME));
        let bytes = read_file(&path)?;
        let text = std::str::from_utf8(&bytes).map_err(|e| {
            classify_io_error(
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
                &path.display().to_string(),
            )
        })?;
        Self::parse(text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let error = |message: String| DataError::GameTable {
            table: T::FILE_NAME.to_string(),
            message,
        };

        let mut lines = text.lines();
        let header = lines.next().ok_or_else(|| error("missing header line".into()))?;
        let header_columns = header.trim_end_matches('\r').split('\t').count();
        if header_columns != T::COLUMNS + 1 {
            return Err(error(format!(
                "header has {} value columns, expected {}",
                header_columns.saturating_sub(1),
                T::COLUMNS
            )));
        }

        // row 0 is never referenced
        let mut rows = vec![T::default()];
        let mut values = Vec::with_capacity(T::COLUMNS);
        for (line_number, line) in lines.enumerate() {
            let mut tokens: Vec<&str> = line.trim_end_matches('\r').split('\t').collect();
            while tokens.last().is_some_and(|token| token.is_empty()) {
                tokens.pop();
            }
            if tokens.len() <= 1 {
                break;
            }
            if tokens.len() != header_columns {
                return Err(error(format!(
                    "line {} has {} columns, expected {}",
                    line_number + 2,
                    tokens.len(),
                    header_columns
                )));
            }

            values.clear();
            for token in &tokens[1..] {
                let value = token.trim().parse::<f32>().map_err(|e| {
                    error(format!("line {}: invalid value '{}': {}", line_number + 2, token, e))
                })?;
                values.push(value);
            }
            rows.push(T::from_values(&values));
        }

        Ok(Self { rows })
    }

    /// Row at `index`; row 0 and rows past the end are absent.
    pub fn row(&self, index: u32) -> Option<&T> {
        if index == 0 {
            return None;
        }
        self.rows.get(index as usize)
    }

    /// Number of addressable rows.
    pub fn len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// All game tables.
#[derive(Debug, Clone, Default)]
pub struct GameTables {
    pub base_mp: GameTable<GtBaseMpEntry>,
    pub hp_per_sta: GameTable<GtHpPerStaEntry>,
    pub spell_scaling: GameTable<GtSpellScalingEntry>,
    pub xp: GameTable<GtXpEntry>,
    pub combat_ratings: GameTable<GtCombatRatingsEntry>,
}

fn load_or_record<T: GameTableRow>(gt_dir: &Path, failed: &mut Vec<String>) -> GameTable<T> {
    match GameTable::<T>::load(gt_dir) {
        Ok(table) => {
            tracing::debug!("Loaded game table {} ({} rows)", T::FILE_NAME, table.len());
            table
        }
        Err(e) => {
            tracing::error!("Failed to load game table {}: {}", T::FILE_NAME, e);
            failed.push(T::FILE_NAME.to_string());
            GameTable::default()
        }
    }
}

impl GameTables {
    /// Loads every game table from `gt_dir`.
    ///
    /// # Returns
    /// `Err(DataError::TablesFailed)` naming every table that could not be loaded.
    pub fn load(gt_dir: &Path) -> Result<Self> {
        let start = Instant::now();
        let mut failed = Vec::new();
        let tables = Self {
            base_mp: load_or_record(gt_dir, &mut failed),
            hp_per_sta: load_or_record(gt_dir, &mut failed),
            spell_scaling: load_or_record(gt_dir, &mut failed),
            xp: load_or_record(gt_dir, &mut failed),
            combat_ratings: load_or_record(gt_dir, &mut failed),
        };
        if !failed.is_empty() {
            return Err(DataError::TablesFailed { tables: failed });
        }

        tracing::info!(
            "Loaded 5 game tables in {} ms",
            start.elapsed().as_millis()
        );
        Ok(tables)
    }

    pub fn base_mp(&self, level: u32, class: Class) -> f32 {
        self.base_mp
            .row(level)
            .map_or(0.0, |row| row.value_for_class(class))
    }

    pub fn hp_per_sta(&self, level: u32) -> f32 {
        self.hp_per_sta.row(level).map_or(0.0, |row| row.health)
    }

    /// Spell scaling value for a level and scaling class, see
    /// [`GtSpellScalingEntry::value_for_scaling_class`].
    pub fn spell_scaling(&self, level: u32, scaling_class: i32) -> f32 {
        self.spell_scaling
            .row(level)
            .map_or(0.0, |row| row.value_for_scaling_class(scaling_class))
    }

    /// Experience needed to finish `level`.
    pub fn xp_for_level(&self, level: u32) -> f32 {
        self.xp.row(level).map_or(0.0, |row| row.total)
    }

    pub fn combat_rating(&self, level: u32, rating: CombatRating) -> f32 {
        self.combat_ratings
            .row(level)
            .map_or(0.0, |row| row.rating(rating))
    }
}
