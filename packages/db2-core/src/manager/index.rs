//! Derived indices over the loaded tables.
//!
//! Indices hold record IDs and resolve them through the owning store at query
//! time, so an erased record is never reachable through a rebuilt index.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::time::Instant;

use crate::defines::{
    chr_specialization_flags, quest_package_filter, Position2D, MAX_CLASSES, MAX_POWERS,
    MAX_SPECIALIZATIONS, MAX_TALENT_COLUMNS, MAX_TALENT_TIERS, PET_SPEC_OVERRIDE_CLASS_INDEX,
};
use crate::registry::TableRegistry;
use crate::tables::{
    AreaTableEntry, ArtifactPowerEntry, ArtifactPowerLinkEntry, ArtifactPowerRankEntry,
    ChrClassesXPowerTypesEntry, ChrModelEntry, ChrRaceXChrModelEntry, ChrSpecializationEntry,
    CurvePointEntry, EmotesTextSoundEntry, FriendshipRepReactionEntry, HeirloomEntry,
    ItemBonusEntry, ItemBonusListLevelDeltaEntry, ItemBonusTreeNodeEntry, ItemChildEquipmentEntry,
    ItemLevelSelectorQualityEntry, ItemLimitCategoryConditionEntry, ItemLimitCategoryEntry,
    ItemSetEntry, ItemSetSpellEntry, ItemSpecOverrideEntry, ItemXBonusTreeEntry,
    MapDifficultyEntry, MountEntry, MountTypeXCapabilityEntry, MountXDisplayEntry, PhaseEntry,
    PhaseXPhaseGroupEntry, QuestPackageItemEntry, SkillLineAbilityEntry, SkillLineEntry,
    SkillRaceClassInfoEntry, SpecializationSpellsEntry, TalentEntry, TaxiPathEntry,
    TaxiPathNodeEntry, ToyEntry, WmoAreaTableEntry,
};

use super::ui_map::UiMapIndex;

/// Per-class specialization slots, the last class slot holds pet override specs.
pub(crate) type ChrSpecializationSlots = [[Option<u32>; MAX_SPECIALIZATIONS]; MAX_CLASSES + 1];

/// Emote sound key: emote text, race, sex, class.
pub(crate) type EmoteTextSoundKey = (u32, u8, u8, u8);

/// Talent slot key: class, tier, column.
pub(crate) type TalentPosition = (u8, u8, u8);

/// WMO area key: root WMO, name set (ADT), WMO group.
pub(crate) type WmoAreaKey = (i16, i8, i32);

#[derive(Debug)]
pub(crate) struct CrossReferenceIndex {
    pub artifact_powers: HashMap<u32, Vec<u32>>,
    pub artifact_power_links: HashMap<u32, BTreeSet<u32>>,
    pub artifact_power_ranks: HashMap<(u32, u8), u32>,
    pub powers_by_class: [[u32; MAX_POWERS]; MAX_CLASSES],
    pub chr_models: HashMap<(i32, i8), u32>,
    pub chr_specializations: ChrSpecializationSlots,
    pub default_chr_specializations: [Option<u32>; MAX_CLASSES],
    /// Points per curve, sorted by order index
    pub curve_points: HashMap<u32, Vec<Position2D>>,
    pub emote_text_sounds: HashMap<EmoteTextSoundKey, u32>,
    pub friendship_rep_reactions: HashMap<u32, Vec<u32>>,
    /// Item ID to heirloom record
    pub heirlooms: HashMap<u32, u32>,
    /// Parent item ID to child equipment record
    pub item_child_equipment: HashMap<u32, u32>,
    pub item_limit_category_conditions: HashMap<u32, Vec<u32>>,
    pub item_set_spells: HashMap<u32, Vec<u32>>,
    pub item_spec_overrides: HashMap<u32, Vec<u32>>,
    pub item_bonus_lists: HashMap<u32, Vec<u32>>,
    pub item_level_delta_to_bonus_list: HashMap<i16, u32>,
    pub item_bonus_trees: HashMap<u32, Vec<u32>>,
    pub item_to_bonus_trees: HashMap<u32, Vec<u32>>,
    pub item_level_selector_qualities: HashMap<u32, Vec<u32>>,
    /// Map ID to difficulty ID to map difficulty record
    pub map_difficulties: HashMap<u32, BTreeMap<u32, u32>>,
    pub mounts_by_spell: HashMap<u32, u32>,
    pub mount_displays: HashMap<u32, Vec<u32>>,
    pub mount_capabilities: HashMap<u32, Vec<u32>>,
    /// Phase group ID to phase IDs
    pub phases_by_group: HashMap<u32, Vec<u32>>,
    pub quest_package_items: HashMap<u32, Vec<u32>>,
    /// Package items with the unmatched display type, handed out as fallback
    pub quest_package_fallback_items: HashMap<u32, Vec<u32>>,
    pub skill_line_abilities: HashMap<u32, Vec<u32>>,
    pub skill_race_class_infos: HashMap<u32, Vec<u32>>,
    /// Spec ID to spells, sorted by display order
    pub specialization_spells: HashMap<u32, Vec<u32>>,
    pub talents_by_position: HashMap<TalentPosition, Vec<u32>>,
    pub taxi_paths: HashMap<(u32, u32), u32>,
    pub taxi_path_nodes: HashMap<u32, Vec<u32>>,
    /// Item IDs usable as toys
    pub toys: HashSet<u32>,
    pub ui_maps: UiMapIndex,
    pub wmo_area_tables: HashMap<WmoAreaKey, u32>,
}

impl Default for CrossReferenceIndex {
    fn default() -> Self {
        Self {
            artifact_powers: HashMap::new(),
            artifact_power_links: HashMap::new(),
            artifact_power_ranks: HashMap::new(),
            powers_by_class: [[MAX_POWERS as u32; MAX_POWERS]; MAX_CLASSES],
            chr_models: HashMap::new(),
            chr_specializations: [[None; MAX_SPECIALIZATIONS]; MAX_CLASSES + 1],
            default_chr_specializations: [None; MAX_CLASSES],
            curve_points: HashMap::new(),
            emote_text_sounds: HashMap::new(),
            friendship_rep_reactions: HashMap::new(),
            heirlooms: HashMap::new(),
            item_child_equipment: HashMap::new(),
            item_limit_category_conditions: HashMap::new(),
            item_set_spells: HashMap::new(),
            item_spec_overrides: HashMap::new(),
            item_bonus_lists: HashMap::new(),
            item_level_delta_to_bonus_list: HashMap::new(),
            item_bonus_trees: HashMap::new(),
            item_to_bonus_trees: HashMap::new(),
            item_level_selector_qualities: HashMap::new(),
            map_difficulties: HashMap::new(),
            mounts_by_spell: HashMap::new(),
            mount_displays: HashMap::new(),
            mount_capabilities: HashMap::new(),
            phases_by_group: HashMap::new(),
            quest_package_items: HashMap::new(),
            quest_package_fallback_items: HashMap::new(),
            skill_line_abilities: HashMap::new(),
            skill_race_class_infos: HashMap::new(),
            specialization_spells: HashMap::new(),
            talents_by_position: HashMap::new(),
            taxi_paths: HashMap::new(),
            taxi_path_nodes: HashMap::new(),
            toys: HashSet::new(),
            ui_maps: UiMapIndex::default(),
            wmo_area_tables: HashMap::new(),
        }
    }
}

impl CrossReferenceIndex {
    /// Builds every index from the current table contents.
    pub fn build(tables: &TableRegistry) -> Self {
        let start = Instant::now();
        let mut index = Self::default();

        index.build_artifacts(tables);
        index.build_powers_by_class(tables);
        index.build_chr_models(tables);
        index.build_chr_specializations(tables);
        index.build_curve_points(tables);
        index.build_emote_text_sounds(tables);
        index.build_friendship_rep_reactions(tables);
        index.build_item_bonuses(tables);
        index.build_item_bonus_trees(tables);
        index.build_item_level_selector_qualities(tables);
        index.build_item_collections(tables);
        index.build_item_sets(tables);
        index.build_item_spec_overrides(tables);
        index.build_item_limit_categories(tables);
        index.build_map_difficulties(tables);
        index.build_mounts(tables);
        index.build_phases(tables);
        index.build_quest_packages(tables);
        index.build_skill_line_abilities(tables);
        index.build_skill_race_class_infos(tables);
        index.build_specialization_spells(tables);
        index.build_talents(tables);
        index.build_taxi_paths(tables);
        index.build_wmo_area_tables(tables);
        index.ui_maps = UiMapIndex::build(tables);

        tracing::info!(
            "Built DB2 cross-reference indices in {} ms",
            start.elapsed().as_millis()
        );
        index
    }

    fn build_artifacts(&mut self, tables: &TableRegistry) {
        for power in tables.table::<ArtifactPowerEntry>().iter() {
            self.artifact_powers
                .entry(power.artifact_id as u32)
                .or_default()
                .push(power.id);
        }

        for link in tables.table::<ArtifactPowerLinkEntry>().iter() {
            let (a, b) = (link.power_a as u32, link.power_b as u32);
            self.artifact_power_links.entry(a).or_default().insert(b);
            self.artifact_power_links.entry(b).or_default().insert(a);
        }

        let powers = tables.table::<ArtifactPowerEntry>();
        for rank in tables.table::<ArtifactPowerRankEntry>().iter() {
            if !powers.contains(rank.artifact_power_id) {
                tracing::warn!(
                    "ArtifactPowerRank {} references missing ArtifactPower {}",
                    rank.id,
                    rank.artifact_power_id
                );
                continue;
            }
            self.artifact_power_ranks
                .insert((rank.artifact_power_id, rank.rank_index), rank.id);
        }
    }

    fn build_powers_by_class(&mut self, tables: &TableRegistry) {
        let mut powers: Vec<&ChrClassesXPowerTypesEntry> = tables
            .table::<ChrClassesXPowerTypesEntry>()
            .iter()
            .filter(|power| {
                let valid = (power.class_id as usize) < MAX_CLASSES
                    && power.power_type >= 0
                    && (power.power_type as usize) < MAX_POWERS;
                if !valid {
                    tracing::warn!(
                        "ChrClassesXPowerTypes {} has out of range class {} or power type {}",
                        power.id,
                        power.class_id,
                        power.power_type
                    );
                }
                valid
            })
            .collect();
        powers.sort_by_key(|power| (power.class_id, power.power_type));

        let unset = MAX_POWERS as u32;
        for power in powers {
            let slots = &mut self.powers_by_class[power.class_id as usize];
            if slots[power.power_type as usize] != unset {
                continue;
            }
            let index = slots.iter().filter(|&&slot| slot != unset).count() as u32;
            slots[power.power_type as usize] = index;
        }
    }

    fn build_chr_models(&mut self, tables: &TableRegistry) {
        let models = tables.table::<ChrModelEntry>();
        for race_model in tables.table::<ChrRaceXChrModelEntry>().iter() {
            let Some(model) = u32::try_from(race_model.chr_model_id)
                .ok()
                .and_then(|id| models.lookup(id))
            else {
                continue;
            };
            self.chr_models
                .insert((race_model.chr_races_id, model.sex), model.id);
        }
    }

    fn build_chr_specializations(&mut self, tables: &TableRegistry) {
        for spec in tables.table::<ChrSpecializationEntry>().iter() {
            let class = spec.class_id as usize;
            if class >= MAX_CLASSES
                || spec.order_index < 0
                || spec.order_index as usize >= MAX_SPECIALIZATIONS
            {
                tracing::warn!(
                    "ChrSpecialization {} has out of range class {} or order index {}",
                    spec.id,
                    spec.class_id,
                    spec.order_index
                );
                continue;
            }

            let mut storage_index = class;
            if spec.flags & chr_specialization_flags::PET_OVERRIDE_SPEC != 0 {
                if class != 0 {
                    tracing::warn!(
                        "ChrSpecialization {} is a pet override spec but belongs to class {}",
                        spec.id,
                        spec.class_id
                    );
                    continue;
                }
                storage_index = PET_SPEC_OVERRIDE_CLASS_INDEX;
            }

            self.chr_specializations[storage_index][spec.order_index as usize] = Some(spec.id);
            if spec.flags & chr_specialization_flags::RECOMMENDED != 0 {
                self.default_chr_specializations[class] = Some(spec.id);
            }
        }
    }

    fn build_curve_points(&mut self, tables: &TableRegistry) {
        let mut grouped: HashMap<u32, Vec<&CurvePointEntry>> = HashMap::new();
        for point in tables.table::<CurvePointEntry>().iter() {
            grouped.entry(point.curve_id as u32).or_default().push(point);
        }

        for (curve_id, mut points) in grouped {
            // stable, ties keep ID order
            points.sort_by_key(|point| point.order_index);
            self.curve_points.insert(
                curve_id,
                points
                    .into_iter()
                    .map(|point| Position2D::new(point.pos[0], point.pos[1]))
                    .collect(),
            );
        }
    }

    fn build_emote_text_sounds(&mut self, tables: &TableRegistry) {
        for sound in tables.table::<EmotesTextSoundEntry>().iter() {
            self.emote_text_sounds.insert(
                (sound.emotes_text_id, sound.race_id, sound.sex_id, sound.class_id),
                sound.id,
            );
        }
    }

    fn build_friendship_rep_reactions(&mut self, tables: &TableRegistry) {
        let reactions = tables.table::<FriendshipRepReactionEntry>();
        for reaction in reactions.iter() {
            self.friendship_rep_reactions
                .entry(reaction.friendship_rep_id)
                .or_default()
                .push(reaction.id);
        }
        for list in self.friendship_rep_reactions.values_mut() {
            list.sort_by_key(|id| {
                reactions
                    .lookup(*id)
                    .map_or(i32::MAX, |reaction| reaction.reaction_threshold)
            });
        }
    }

    fn build_item_bonuses(&mut self, tables: &TableRegistry) {
        for bonus in tables.table::<ItemBonusEntry>().iter() {
            self.item_bonus_lists
                .entry(bonus.parent_item_bonus_list_id as u32)
                .or_default()
                .push(bonus.id);
        }

        for delta in tables.table::<ItemBonusListLevelDeltaEntry>().iter() {
            self.item_level_delta_to_bonus_list
                .insert(delta.item_level_delta, delta.id);
        }
    }

    fn build_item_bonus_trees(&mut self, tables: &TableRegistry) {
        for node in tables.table::<ItemBonusTreeNodeEntry>().iter() {
            self.item_bonus_trees
                .entry(node.parent_item_bonus_tree_id)
                .or_default()
                .push(node.id);
        }

        for item_tree in tables.table::<ItemXBonusTreeEntry>().iter() {
            let Ok(item_id) = u32::try_from(item_tree.item_id) else {
                tracing::warn!(
                    "ItemXBonusTree {} has negative item id {}",
                    item_tree.id,
                    item_tree.item_id
                );
                continue;
            };
            self.item_to_bonus_trees
                .entry(item_id)
                .or_default()
                .push(item_tree.item_bonus_tree_id as u32);
        }
    }

    fn build_item_level_selector_qualities(&mut self, tables: &TableRegistry) {
        let qualities = tables.table::<ItemLevelSelectorQualityEntry>();
        for quality in qualities.iter() {
            self.item_level_selector_qualities
                .entry(quality.parent_ils_quality_set_id)
                .or_default()
                .push(quality.id);
        }
        for list in self.item_level_selector_qualities.values_mut() {
            list.sort_by_key(|id| qualities.lookup(*id).map_or(i8::MAX, |q| q.quality));
        }
    }

    fn build_item_collections(&mut self, tables: &TableRegistry) {
        for toy in tables.table::<ToyEntry>().iter() {
            if let Ok(item_id) = u32::try_from(toy.item_id) {
                self.toys.insert(item_id);
            }
        }

        for heirloom in tables.table::<HeirloomEntry>().iter() {
            if let Ok(item_id) = u32::try_from(heirloom.item_id) {
                self.heirlooms.insert(item_id, heirloom.id);
            }
        }

        for child in tables.table::<ItemChildEquipmentEntry>().iter() {
            if let Some(existing) = self.item_child_equipment.get(&child.parent_item_id) {
                tracing::warn!(
                    "ItemChildEquipment {} is a second child of item {}, keeping {}",
                    child.id,
                    child.parent_item_id,
                    existing
                );
                continue;
            }
            self.item_child_equipment.insert(child.parent_item_id, child.id);
        }
    }

    fn build_item_sets(&mut self, tables: &TableRegistry) {
        let sets = tables.table::<ItemSetEntry>();
        for spell in tables.table::<ItemSetSpellEntry>().iter() {
            if !sets.contains(spell.item_set_id) {
                tracing::warn!(
                    "ItemSetSpell {} references missing ItemSet {}",
                    spell.id,
                    spell.item_set_id
                );
                continue;
            }
            self.item_set_spells
                .entry(spell.item_set_id)
                .or_default()
                .push(spell.id);
        }
    }

    fn build_item_spec_overrides(&mut self, tables: &TableRegistry) {
        let specs = tables.table::<ChrSpecializationEntry>();
        for spec_override in tables.table::<ItemSpecOverrideEntry>().iter() {
            if !specs.contains(spec_override.spec_id as u32) {
                tracing::warn!(
                    "ItemSpecOverride {} references missing ChrSpecialization {}",
                    spec_override.id,
                    spec_override.spec_id
                );
                continue;
            }
            let Ok(item_id) = u32::try_from(spec_override.item_id) else {
                continue;
            };
            self.item_spec_overrides
                .entry(item_id)
                .or_default()
                .push(spec_override.id);
        }
    }

    fn build_item_limit_categories(&mut self, tables: &TableRegistry) {
        let categories = tables.table::<ItemLimitCategoryEntry>();
        for condition in tables.table::<ItemLimitCategoryConditionEntry>().iter() {
            let Some(category) = u32::try_from(condition.parent_item_limit_category_id)
                .ok()
                .filter(|id| categories.contains(*id))
            else {
                tracing::warn!(
                    "ItemLimitCategoryCondition {} references missing ItemLimitCategory {}",
                    condition.id,
                    condition.parent_item_limit_category_id
                );
                continue;
            };
            self.item_limit_category_conditions
                .entry(category)
                .or_default()
                .push(condition.id);
        }
    }

    fn build_map_difficulties(&mut self, tables: &TableRegistry) {
        for entry in tables.table::<MapDifficultyEntry>().iter() {
            self.map_difficulties
                .entry(entry.map_id)
                .or_default()
                .insert(entry.difficulty_id as u32, entry.id);
        }
    }

    fn build_mounts(&mut self, tables: &TableRegistry) {
        for mount in tables.table::<MountEntry>().iter() {
            if let Ok(spell_id) = u32::try_from(mount.source_spell_id) {
                if spell_id != 0 {
                    self.mounts_by_spell.insert(spell_id, mount.id);
                }
            }
        }

        for display in tables.table::<MountXDisplayEntry>().iter() {
            self.mount_displays
                .entry(display.mount_id)
                .or_default()
                .push(display.id);
        }

        let capabilities = tables.table::<MountTypeXCapabilityEntry>();
        for capability in capabilities.iter() {
            self.mount_capabilities
                .entry(capability.mount_type_id as u32)
                .or_default()
                .push(capability.id);
        }
        for list in self.mount_capabilities.values_mut() {
            list.sort_by_key(|id| {
                capabilities.lookup(*id).map_or((u16::MAX, u8::MAX, *id), |c| {
                    (c.mount_type_id, c.order_index, c.id)
                })
            });
        }
    }

    fn build_phases(&mut self, tables: &TableRegistry) {
        let phases = tables.table::<PhaseEntry>();
        for group in tables.table::<PhaseXPhaseGroupEntry>().iter() {
            if !phases.contains(group.phase_id as u32) {
                continue;
            }
            self.phases_by_group
                .entry(group.phase_group_id)
                .or_default()
                .push(group.phase_id as u32);
        }
    }

    fn build_quest_packages(&mut self, tables: &TableRegistry) {
        for item in tables.table::<QuestPackageItemEntry>().iter() {
            let packages = if item.display_type == quest_package_filter::UNMATCHED {
                &mut self.quest_package_fallback_items
            } else {
                &mut self.quest_package_items
            };
            packages.entry(item.package_id as u32).or_default().push(item.id);
        }
    }

    fn build_skill_line_abilities(&mut self, tables: &TableRegistry) {
        for ability in tables.table::<SkillLineAbilityEntry>().iter() {
            let Ok(skill_line) = u32::try_from(ability.skill_line) else {
                continue;
            };
            self.skill_line_abilities
                .entry(skill_line)
                .or_default()
                .push(ability.id);
        }
    }

    fn build_skill_race_class_infos(&mut self, tables: &TableRegistry) {
        let skills = tables.table::<SkillLineEntry>();
        for info in tables.table::<SkillRaceClassInfoEntry>().iter() {
            let Some(skill_id) = u32::try_from(info.skill_id)
                .ok()
                .filter(|id| skills.contains(*id))
            else {
                tracing::warn!(
                    "SkillRaceClassInfo {} references missing SkillLine {}",
                    info.id,
                    info.skill_id
                );
                continue;
            };
            self.skill_race_class_infos
                .entry(skill_id)
                .or_default()
                .push(info.id);
        }
    }

    fn build_specialization_spells(&mut self, tables: &TableRegistry) {
        let specs = tables.table::<ChrSpecializationEntry>();
        let spells = tables.table::<SpecializationSpellsEntry>();
        for spell in spells.iter() {
            if !specs.contains(spell.spec_id as u32) {
                tracing::warn!(
                    "SpecializationSpells {} references missing ChrSpecialization {}",
                    spell.id,
                    spell.spec_id
                );
                continue;
            }
            self.specialization_spells
                .entry(spell.spec_id as u32)
                .or_default()
                .push(spell.id);
        }
        for list in self.specialization_spells.values_mut() {
            // stable, ties keep ID order
            list.sort_by_key(|id| spells.lookup(*id).map_or(u8::MAX, |spell| spell.display_order));
        }
    }

    fn build_talents(&mut self, tables: &TableRegistry) {
        for talent in tables.table::<TalentEntry>().iter() {
            let in_range = talent.class_id >= 0
                && (talent.class_id as usize) < MAX_CLASSES
                && (talent.tier_id as usize) < MAX_TALENT_TIERS
                && (talent.column_index as usize) < MAX_TALENT_COLUMNS;
            if !in_range {
                tracing::warn!(
                    "Talent {} has out of range class {}, tier {} or column {}",
                    talent.id,
                    talent.class_id,
                    talent.tier_id,
                    talent.column_index
                );
                continue;
            }
            self.talents_by_position
                .entry((talent.class_id as u8, talent.tier_id, talent.column_index))
                .or_default()
                .push(talent.id);
        }
    }

    fn build_taxi_paths(&mut self, tables: &TableRegistry) {
        for path in tables.table::<TaxiPathEntry>().iter() {
            self.taxi_paths.insert(
                (path.from_taxi_node as u32, path.to_taxi_node as u32),
                path.id,
            );
        }

        let nodes = tables.table::<TaxiPathNodeEntry>();
        for node in nodes.iter() {
            self.taxi_path_nodes
                .entry(node.path_id as u32)
                .or_default()
                .push(node.id);
        }
        for list in self.taxi_path_nodes.values_mut() {
            list.sort_by_key(|id| nodes.lookup(*id).map_or(i32::MAX, |node| node.node_index));
        }
    }
    fn build_wmo_area_tables(&mut self, tables: &TableRegistry) {
        let areas = tables.table::<AreaTableEntry>();
        for wmo_area in tables.table::<WmoAreaTableEntry>().iter() {
            if wmo_area.area_table_id != 0 && !areas.contains(wmo_area.area_table_id as u32) {
                tracing::warn!(
                    "WMOAreaTable {} references missing AreaTable {}",
                    wmo_area.id,
                    wmo_area.area_table_id
                );
            }
            self.wmo_area_tables.insert(
                (wmo_area.wmo_id as i16, wmo_area.name_set_id as i8, wmo_area.wmo_group_id),
                wmo_area.id,
            );
        }
    }
}
