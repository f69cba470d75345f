//! Cross-reference indices and query API over the loaded tables.

mod bonus_tree;
mod curve;
mod index;
mod item;
mod ui_map;

pub use bonus_tree::ItemBonusTreeIter;
pub use curve::{determine_interpolation_mode, evaluate, CurveInterpolationMode};
pub use ui_map::{UiMapBounds, UiMapPosition, UiMapQuery};

use crate::defines::{difficulty_flags, Class, MAX_CLASSES, MAX_POWERS, MAX_SPECIALIZATIONS, PET_SPEC_OVERRIDE_CLASS_INDEX};
use crate::hotfix::HotfixStore;
use crate::registry::TableRegistry;
use crate::storage::Db2Record;
use crate::tables::{
    ArtifactPowerEntry, ArtifactPowerRankEntry, ChrModelEntry, ChrSpecializationEntry,
    DifficultyEntry, EmotesTextSoundEntry, FriendshipRepReactionEntry, MapDifficultyEntry,
    MountEntry, MountTypeXCapabilityEntry, MountXDisplayEntry, SkillLineAbilityEntry,
    SkillRaceClassInfoEntry, SpecializationSpellsEntry, TalentEntry, TaxiPathEntry,
    TaxiPathNodeEntry, WmoAreaTableEntry,
};

use index::CrossReferenceIndex;

/// Owns the loaded tables and the indices derived from them.
///
/// Indices are rebuilt whenever the tables change through
/// [`Db2Manager::apply_hotfixes`], so lookups never return erased records.
#[derive(Debug)]
pub struct Db2Manager {
    tables: TableRegistry,
    index: CrossReferenceIndex,
}

impl Db2Manager {
    pub fn new(tables: TableRegistry) -> Self {
        let index = CrossReferenceIndex::build(&tables);
        Self { tables, index }
    }

    pub fn tables(&self) -> &TableRegistry {
        &self.tables
    }

    pub fn into_tables(self) -> TableRegistry {
        self.tables
    }

    /// Erases hotfix-removed records and rebuilds every index.
    ///
    /// # Returns
    /// The number of records erased.
    pub fn apply_hotfixes(&mut self, hotfixes: &HotfixStore) -> usize {
        let erased = hotfixes.reconcile(&mut self.tables);
        self.rebuild_indices();
        erased
    }

    pub fn rebuild_indices(&mut self) {
        self.index = CrossReferenceIndex::build(&self.tables);
    }

    /// Resolves indexed IDs to records, skipping IDs no longer stored.
    fn resolve<T: Db2Record>(&self, ids: Option<&Vec<u32>>) -> Vec<&T> {
        let store = self.tables.table::<T>();
        ids.into_iter()
            .flatten()
            .filter_map(|id| store.lookup(*id))
            .collect()
    }

    pub fn artifact_powers(&self, artifact_id: u8) -> Vec<&ArtifactPowerEntry> {
        self.resolve(self.index.artifact_powers.get(&(artifact_id as u32)))
    }

    /// Powers linked to `power_id`, ascending.
    pub fn artifact_power_links(&self, power_id: u32) -> Vec<u32> {
        self.index
            .artifact_power_links
            .get(&power_id)
            .map(|links| links.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn artifact_power_rank(&self, power_id: u32, rank: u8) -> Option<&ArtifactPowerRankEntry> {
        let id = self.index.artifact_power_ranks.get(&(power_id, rank))?;
        self.tables.table::<ArtifactPowerRankEntry>().lookup(*id)
    }

    /// Dense index of `power_type` among the powers of `class`, `MAX_POWERS` when unset.
    pub fn power_index_by_class(&self, class: Class, power_type: i8) -> u32 {
        let (class, power) = (class.id() as usize, power_type as usize);
        if power_type < 0 || class >= MAX_CLASSES || power >= MAX_POWERS {
            return MAX_POWERS as u32;
        }
        self.index.powers_by_class[class][power]
    }

    pub fn chr_model(&self, race: i32, sex: i8) -> Option<&ChrModelEntry> {
        let id = self.index.chr_models.get(&(race, sex))?;
        self.tables.table::<ChrModelEntry>().lookup(*id)
    }

    /// Specialization of `class` at `index`; `None` for `class` selects pet override specs.
    pub fn chr_specialization_by_index(
        &self,
        class: Option<Class>,
        index: usize,
    ) -> Option<&ChrSpecializationEntry> {
        if index >= MAX_SPECIALIZATIONS {
            return None;
        }
        let slot = class.map_or(PET_SPEC_OVERRIDE_CLASS_INDEX, |class| class.id() as usize);
        let id = self.index.chr_specializations.get(slot)?[index]?;
        self.tables.table::<ChrSpecializationEntry>().lookup(id)
    }

    pub fn default_chr_specialization(&self, class: Class) -> Option<&ChrSpecializationEntry> {
        let id = (*self.index.default_chr_specializations.get(class.id() as usize)?)?;
        self.tables.table::<ChrSpecializationEntry>().lookup(id)
    }

    pub fn emote_text_sound(
        &self,
        emote_text_id: u32,
        race: u8,
        sex: u8,
        class: u8,
    ) -> Option<&EmotesTextSoundEntry> {
        let id = self
            .index
            .emote_text_sounds
            .get(&(emote_text_id, race, sex, class))?;
        self.tables.table::<EmotesTextSoundEntry>().lookup(*id)
    }

    /// Reactions of a friendship reputation, ascending by threshold.
    pub fn friendship_rep_reactions(&self, friendship_rep_id: u32) -> Vec<&FriendshipRepReactionEntry> {
        self.resolve(self.index.friendship_rep_reactions.get(&friendship_rep_id))
    }

    pub fn map_difficulty(&self, map_id: u32, difficulty_id: u32) -> Option<&MapDifficultyEntry> {
        let id = self.index.map_difficulties.get(&map_id)?.get(&difficulty_id)?;
        self.tables.table::<MapDifficultyEntry>().lookup(*id)
    }

    /// Default difficulty of a map.
    ///
    /// Prefers the difficulty flagged as default, otherwise the lowest
    /// difficulty ID the map has.
    pub fn default_map_difficulty(&self, map_id: u32) -> Option<(u32, &MapDifficultyEntry)> {
        let difficulties = self.index.map_difficulties.get(&map_id)?;
        let store = self.tables.table::<MapDifficultyEntry>();
        let definitions = self.tables.table::<DifficultyEntry>();

        let flagged = difficulties.iter().find(|(difficulty_id, _)| {
            definitions
                .lookup(**difficulty_id)
                .is_some_and(|difficulty| difficulty.flags & difficulty_flags::DEFAULT != 0)
        });
        let (difficulty_id, id) = flagged.or_else(|| difficulties.iter().next())?;
        store.lookup(*id).map(|entry| (*difficulty_id, entry))
    }

    pub fn mount_by_spell(&self, spell_id: u32) -> Option<&MountEntry> {
        let id = self.index.mounts_by_spell.get(&spell_id)?;
        self.tables.table::<MountEntry>().lookup(*id)
    }

    pub fn mount_displays(&self, mount_id: u32) -> Vec<&MountXDisplayEntry> {
        self.resolve(self.index.mount_displays.get(&mount_id))
    }

    /// Capabilities of a mount type ordered by order index.
    pub fn mount_capabilities(&self, mount_type_id: u32) -> Vec<&MountTypeXCapabilityEntry> {
        self.resolve(self.index.mount_capabilities.get(&mount_type_id))
    }

    pub fn skill_line_abilities(&self, skill_line: u32) -> Vec<&SkillLineAbilityEntry> {
        self.resolve(self.index.skill_line_abilities.get(&skill_line))
    }

    pub fn skill_race_class_infos(&self, skill_id: u32) -> Vec<&SkillRaceClassInfoEntry> {
        self.resolve(self.index.skill_race_class_infos.get(&skill_id))
    }

    /// First race and class restriction row of a skill that applies to the character.
    pub fn skill_race_class_info(&self, skill_id: u32, race: u8, class: u8) -> Option<&SkillRaceClassInfoEntry> {
        self.skill_race_class_infos(skill_id)
            .into_iter()
            .find(|info| info.applies_to(race, class))
    }

    /// Spells of a specialization, ascending by display order.
    pub fn specialization_spells(&self, spec_id: u32) -> Vec<&SpecializationSpellsEntry> {
        self.resolve(self.index.specialization_spells.get(&spec_id))
    }

    /// Talents at a class talent slot.
    pub fn talents_by_position(&self, class: u8, tier: u8, column: u8) -> Vec<&TalentEntry> {
        self.resolve(self.index.talents_by_position.get(&(class, tier, column)))
    }

    /// Phase IDs of a phase group.
    pub fn phases_for_group(&self, phase_group_id: u32) -> &[u32] {
        self.index
            .phases_by_group
            .get(&phase_group_id)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Area of a WMO group.
    ///
    /// `root_id` and `adt_id` are truncated to the key widths the client uses.
    pub fn wmo_area_table(&self, root_id: i32, adt_id: i32, group_id: i32) -> Option<&WmoAreaTableEntry> {
        let id = self
            .index
            .wmo_area_tables
            .get(&(root_id as i16, adt_id as i8, group_id))?;
        self.tables.table::<WmoAreaTableEntry>().lookup(*id)
    }

    pub fn taxi_path(&self, from: u32, to: u32) -> Option<&TaxiPathEntry> {
        let id = self.index.taxi_paths.get(&(from, to))?;
        self.tables.table::<TaxiPathEntry>().lookup(*id)
    }

    /// Nodes of a taxi path in travel order.
    pub fn taxi_path_nodes(&self, path_id: u32) -> Vec<&TaxiPathNodeEntry> {
        self.resolve(self.index.taxi_path_nodes.get(&path_id))
    }
}
