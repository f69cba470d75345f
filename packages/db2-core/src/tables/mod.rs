//! Compiled table schemas.
//!
//! Every table is declared with [`db2_table!`], which generates the record
//! struct, its column layout and its row decoder from one field list. Columns
//! are written to disk in declaration order; the `id` column always comes
//! first.

use crate::error::Result;
use crate::format::{FieldType, RowReader, RowWriter};
use crate::locale::{Locale, LocalizedString};
use crate::registry::TableLoader;

mod artifact;
mod chr;
mod curve;
mod item;
mod map;
mod misc;
mod mount;
mod ui_map;

pub use artifact::{ArtifactEntry, ArtifactPowerEntry, ArtifactPowerLinkEntry, ArtifactPowerRankEntry};
pub use chr::{
    ChrClassesEntry, ChrClassesXPowerTypesEntry, ChrModelEntry, ChrRaceXChrModelEntry,
    ChrSpecializationEntry, SpecializationSpellsEntry, TalentEntry,
};
pub use curve::{CurveEntry, CurvePointEntry};
pub use item::{
    HeirloomEntry, ItemBonusEntry, ItemBonusListLevelDeltaEntry, ItemBonusTreeNodeEntry,
    ItemChildEquipmentEntry, ItemLevelSelectorEntry, ItemLevelSelectorQualityEntry,
    ItemLevelSelectorQualitySetEntry, ItemLimitCategoryConditionEntry, ItemLimitCategoryEntry,
    ItemSetEntry, ItemSetSpellEntry, ItemSparseEntry, ItemSpecOverrideEntry, ItemXBonusTreeEntry,
    ToyEntry,
};
pub use map::{AreaTableEntry, DifficultyEntry, MapDifficultyEntry, MapEntry, WmoAreaTableEntry};
pub use misc::{
    BroadcastTextEntry, EmotesTextSoundEntry, FriendshipRepReactionEntry,
    FriendshipReputationEntry, PhaseEntry, PhaseXPhaseGroupEntry, QuestPackageItemEntry,
    SkillLineAbilityEntry, SkillLineEntry, SkillRaceClassInfoEntry, TactKeyEntry, TaxiNodesEntry,
    TaxiPathEntry, TaxiPathNodeEntry,
};
pub use mount::{MountCapabilityEntry, MountEntry, MountTypeXCapabilityEntry, MountXDisplayEntry};
pub use ui_map::{UiMapAssignmentEntry, UiMapEntry};

/// Rust type of a table column.
pub trait Column: Sized {
    /// On-disk type of each flattened column.
    const FIELD: FieldType;
    /// Number of flattened columns.
    const COUNT: usize = 1;

    fn read_column(row: &mut RowReader<'_>) -> Result<Self>;

    /// Encodes the column; localized columns write their `locale` value.
    fn write_column(&self, row: &mut RowWriter<'_>, locale: Locale);

    /// Copies the `locale` value of a localized column.
    fn merge_column(&mut self, _localized: &Self, _locale: Locale) {}
}

macro_rules! scalar_column {
    ($($ty:ty => $field:ident, $read:ident;)*) => {
        $(
            impl Column for $ty {
                const FIELD: FieldType = FieldType::$field;

                fn read_column(row: &mut RowReader<'_>) -> Result<Self> {
                    row.$read()
                }

                fn write_column(&self, row: &mut RowWriter<'_>, _locale: Locale) {
                    row.$read(*self);
                }
            }
        )*
    };
}

scalar_column! {
    u8 => U8, u8;
    i8 => I8, i8;
    u16 => U16, u16;
    i16 => I16, i16;
    u32 => U32, u32;
    i32 => I32, i32;
    f32 => F32, f32;
}

impl Column for String {
    const FIELD: FieldType = FieldType::String;

    fn read_column(row: &mut RowReader<'_>) -> Result<Self> {
        row.string()
    }

    fn write_column(&self, row: &mut RowWriter<'_>, _locale: Locale) {
        row.string(self);
    }
}

impl Column for LocalizedString {
    const FIELD: FieldType = FieldType::LocString;

    fn read_column(row: &mut RowReader<'_>) -> Result<Self> {
        row.loc_string()
    }

    fn write_column(&self, row: &mut RowWriter<'_>, locale: Locale) {
        row.string(self.get(locale));
    }

    fn merge_column(&mut self, localized: &Self, locale: Locale) {
        self.merge(localized, locale);
    }
}

impl<T, const N: usize> Column for [T; N]
where
    T: Column + Default + Copy,
{
    const FIELD: FieldType = T::FIELD;
    const COUNT: usize = N;

    fn read_column(row: &mut RowReader<'_>) -> Result<Self> {
        row.array(T::read_column)
    }

    fn write_column(&self, row: &mut RowWriter<'_>, locale: Locale) {
        for value in self {
            value.write_column(row, locale);
        }
    }
}

/// Declares a table record.
///
/// ```ignore
/// db2_table! {
///     /// Doc comment.
///     pub struct CurveEntry("Curve") {
///         id: u32,
///         kind: u8,
///         flags: u8,
///     }
/// }
/// ```
macro_rules! db2_table {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($table:literal) {
            $(
                $(#[$field_meta:meta])*
                $field:ident: $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name {
            $(
                $(#[$field_meta])*
                pub $field: $ty,
            )*
        }

        impl $crate::storage::Db2Record for $name {
            const TABLE_NAME: &'static str = $table;
            const LAYOUT: &'static [$crate::format::FieldType] = &{
                const COUNT: usize = 0 $(+ <$ty as $crate::tables::Column>::COUNT)*;
                let mut layout = [$crate::format::FieldType::U8; COUNT];
                let mut at = 0;
                $(
                    let mut i = 0;
                    while i < <$ty as $crate::tables::Column>::COUNT {
                        layout[at] = <$ty as $crate::tables::Column>::FIELD;
                        at += 1;
                        i += 1;
                    }
                )*
                let _ = at;
                layout
            };

            fn id(&self) -> u32 {
                self.id
            }

            fn read(row: &mut $crate::format::RowReader<'_>) -> $crate::error::Result<Self> {
                Ok(Self {
                    $($field: <$ty as $crate::tables::Column>::read_column(row)?,)*
                })
            }

            fn write(&self, row: &mut $crate::format::RowWriter<'_>, locale: $crate::locale::Locale) {
                $(
                    <$ty as $crate::tables::Column>::write_column(&self.$field, row, locale);
                )*
            }

            fn merge_locale(&mut self, localized: &Self, locale: $crate::locale::Locale) {
                $(
                    <$ty as $crate::tables::Column>::merge_column(
                        &mut self.$field,
                        &localized.$field,
                        locale,
                    );
                )*
            }
        }
    };
}

pub(crate) use db2_table;

/// Loaders for every compiled table, in load dispatch order.
pub(crate) fn loaders() -> Vec<TableLoader> {
    vec![
        TableLoader::of::<ArtifactEntry>(),
        TableLoader::of::<ArtifactPowerEntry>(),
        TableLoader::of::<ArtifactPowerLinkEntry>(),
        TableLoader::of::<ArtifactPowerRankEntry>(),
        TableLoader::of::<AreaTableEntry>(),
        TableLoader::of::<BroadcastTextEntry>(),
        TableLoader::of::<ChrClassesEntry>(),
        TableLoader::of::<ChrClassesXPowerTypesEntry>(),
        TableLoader::of::<ChrModelEntry>(),
        TableLoader::of::<ChrRaceXChrModelEntry>(),
        TableLoader::of::<ChrSpecializationEntry>(),
        TableLoader::of::<CurveEntry>(),
        TableLoader::of::<CurvePointEntry>(),
        TableLoader::of::<DifficultyEntry>(),
        TableLoader::of::<EmotesTextSoundEntry>(),
        TableLoader::of::<FriendshipRepReactionEntry>(),
        TableLoader::of::<FriendshipReputationEntry>(),
        TableLoader::of::<HeirloomEntry>(),
        TableLoader::of::<ItemBonusEntry>(),
        TableLoader::of::<ItemBonusListLevelDeltaEntry>(),
        TableLoader::of::<ItemBonusTreeNodeEntry>(),
        TableLoader::of::<ItemChildEquipmentEntry>(),
        TableLoader::of::<ItemLevelSelectorEntry>(),
        TableLoader::of::<ItemLevelSelectorQualityEntry>(),
        TableLoader::of::<ItemLevelSelectorQualitySetEntry>(),
        TableLoader::of::<ItemLimitCategoryEntry>(),
        TableLoader::of::<ItemLimitCategoryConditionEntry>(),
        TableLoader::of::<ItemSetEntry>(),
        TableLoader::of::<ItemSetSpellEntry>(),
        TableLoader::of::<ItemSparseEntry>(),
        TableLoader::of::<ItemSpecOverrideEntry>(),
        TableLoader::of::<ItemXBonusTreeEntry>(),
        TableLoader::of::<MapEntry>(),
        TableLoader::of::<MapDifficultyEntry>(),
        TableLoader::of::<MountEntry>(),
        TableLoader::of::<MountCapabilityEntry>(),
        TableLoader::of::<MountTypeXCapabilityEntry>(),
        TableLoader::of::<MountXDisplayEntry>(),
        TableLoader::of::<PhaseEntry>(),
        TableLoader::of::<PhaseXPhaseGroupEntry>(),
        TableLoader::of::<QuestPackageItemEntry>(),
        TableLoader::of::<SkillLineEntry>(),
        TableLoader::of::<SkillLineAbilityEntry>(),
        TableLoader::of::<SkillRaceClassInfoEntry>(),
        TableLoader::of::<SpecializationSpellsEntry>(),
        TableLoader::of::<TactKeyEntry>(),
        TableLoader::of::<TalentEntry>(),
        TableLoader::of::<TaxiNodesEntry>(),
        TableLoader::of::<TaxiPathEntry>(),
        TableLoader::of::<TaxiPathNodeEntry>(),
        TableLoader::of::<ToyEntry>(),
        TableLoader::of::<UiMapEntry>(),
        TableLoader::of::<UiMapAssignmentEntry>(),
        TableLoader::of::<WmoAreaTableEntry>(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{self, Db2FileWriter};
    use crate::storage::{Db2Record, Db2Storage};
    use std::collections::HashSet;

    #[test]
    fn test_layouts_flatten_arrays() {
        // id, pos[2], pos_pre_squish[2], curve_id, order_index
        assert_eq!(
            CurvePointEntry::LAYOUT,
            &[
                FieldType::U32,
                FieldType::F32,
                FieldType::F32,
                FieldType::F32,
                FieldType::F32,
                FieldType::U16,
                FieldType::U8,
            ]
        );
        assert_eq!(format::record_size(TactKeyEntry::LAYOUT), 4 + 16);
        assert!(format::has_localized_strings(MapEntry::LAYOUT));
        assert!(!format::has_localized_strings(CurveEntry::LAYOUT));
    }

    #[test]
    fn test_table_names_are_unique() {
        let loaders = loaders();
        let hashes: HashSet<u32> = loaders.iter().map(|l| l.table_hash()).collect();
        assert_eq!(hashes.len(), loaders.len());
    }

    #[test]
    fn test_generated_reader_and_merge() {
        let mut writer = Db2FileWriter::new(SkillLineEntry::TABLE_NAME, SkillLineEntry::LAYOUT);
        writer
            .push_row(|row| {
                row.u32(164).string("Blacksmithing").i8(11).u16(0).u16(0);
            })
            .unwrap();
        let bytes = writer.finish();
        let mut storage = Db2Storage::<SkillLineEntry>::load_from_bytes(&bytes, Locale::EnUs).unwrap();

        let mut writer = Db2FileWriter::new(SkillLineEntry::TABLE_NAME, SkillLineEntry::LAYOUT);
        writer
            .push_row(|row| {
                row.u32(164).string("Schmiedekunst").i8(11).u16(0).u16(0);
            })
            .unwrap();
        storage.merge_locale_bytes(&writer.finish(), Locale::DeDe).unwrap();

        let skill = storage.lookup(164).unwrap();
        assert_eq!(skill.category_id, 11);
        assert_eq!(skill.display_name.get(Locale::EnUs), "Blacksmithing");
        assert_eq!(skill.display_name.get(Locale::DeDe), "Schmiedekunst");
    }

    #[test]
    fn test_generated_writer_matches_reader() {
        let map = MapEntry {
            id: 571,
            directory: "Northrend".to_string(),
            map_name: LocalizedString::new(Locale::EnUs, "Northrend"),
            parent_map_id: -1,
            cosmetic_parent_map_id: -1,
            flags: [1, 0, 4],
            ..Default::default()
        };
        let mut writer = Db2FileWriter::for_table::<MapEntry>();
        writer.push_record(&map, Locale::EnUs).unwrap();
        let storage = Db2Storage::<MapEntry>::load_from_bytes(&writer.finish(), Locale::EnUs).unwrap();
        assert_eq!(storage.lookup(571), Some(&map));
    }
}
