use crate::locale::LocalizedString;

use super::db2_table;

db2_table! {
    pub struct BroadcastTextEntry("BroadcastText") {
        id: u32,
        text: LocalizedString,
        text1: LocalizedString,
        language_id: i32,
        condition_id: i32,
        emotes_id: u16,
        flags: u8,
        chat_bubble_duration_ms: u32,
        voice_over_priority_id: i32,
        sound_kit_id: [u32; 2],
        emote_id: [u16; 3],
        emote_delay: [u16; 3],
    }
}

db2_table! {
    /// Encryption key announced to clients through hotfix optional data.
    pub struct TactKeyEntry("TactKey") {
        id: u32,
        key: [u8; 16],
    }
}

db2_table! {
    pub struct EmotesTextSoundEntry("EmotesTextSound") {
        id: u32,
        race_id: u8,
        class_id: u8,
        sex_id: u8,
        sound_id: u32,
        emotes_text_id: u32,
    }
}

db2_table! {
    pub struct FriendshipReputationEntry("FriendshipReputation") {
        id: u32,
        description: LocalizedString,
        standing_modified: LocalizedString,
        standing_changed: LocalizedString,
        faction_id: i32,
        texture_file_id: i32,
        flags: i32,
    }
}

db2_table! {
    /// Named standing of a friendship reputation, reached at `reaction_threshold`.
    pub struct FriendshipRepReactionEntry("FriendshipRepReaction") {
        id: u32,
        reaction: LocalizedString,
        friendship_rep_id: u32,
        reaction_threshold: i32,
    }
}

db2_table! {
    pub struct SkillLineEntry("SkillLine") {
        id: u32,
        display_name: LocalizedString,
        category_id: i8,
        parent_skill_line_id: u16,
        flags: u16,
    }
}

db2_table! {
    pub struct SkillLineAbilityEntry("SkillLineAbility") {
        id: u32,
        skill_line: i16,
        spell: i32,
        min_skill_line_rank: i16,
        class_mask: i32,
        superceded_by_spell: i32,
        acquire_method: i8,
        trivial_skill_line_rank_high: i16,
        trivial_skill_line_rank_low: i16,
        flags: i32,
        num_skill_ups: i8,
        unique_bit: i16,
        trade_skill_category_id: i16,
        skillup_skill_line_id: i16,
    }
}

db2_table! {
    pub struct TaxiNodesEntry("TaxiNodes") {
        id: u32,
        name: LocalizedString,
        pos: [f32; 3],
        map_offset: [f32; 2],
        flight_map_offset: [f32; 2],
        continent_id: u16,
        condition_id: i32,
        character_bit_number: u16,
        flags: i32,
        ui_texture_kit_id: i32,
        facing: f32,
        special_icon_condition_id: u32,
        visibility_condition_id: u32,
        mount_creature_id: [i32; 2],
    }
}

db2_table! {
    pub struct TaxiPathEntry("TaxiPath") {
        id: u32,
        from_taxi_node: u16,
        to_taxi_node: u16,
        cost: u32,
    }
}

db2_table! {
    pub struct TaxiPathNodeEntry("TaxiPathNode") {
        id: u32,
        loc: [f32; 3],
        path_id: u16,
        node_index: i32,
        continent_id: u16,
        flags: u8,
        delay: u32,
        arrival_event_id: i32,
        departure_event_id: i32,
    }
}

db2_table! {
    /// Race and class restrictions of a skill line.
    ///
    /// `race_mask` holds the low and high words of a 64-bit mask; bit
    /// `race - 1` set means the race qualifies. A zero mask allows every race,
    /// a zero `class_mask` every class.
    pub struct SkillRaceClassInfoEntry("SkillRaceClassInfo") {
        id: u32,
        race_mask: [u32; 2],
        skill_id: i16,
        class_mask: i32,
        flags: u16,
        availability: i8,
        min_level: i8,
        skill_tier_id: i16,
    }
}

impl SkillRaceClassInfoEntry {
    pub fn race_mask(&self) -> u64 {
        u64::from(self.race_mask[0]) | (u64::from(self.race_mask[1]) << 32)
    }

    /// Whether this row applies to `race` and `class`.
    pub fn applies_to(&self, race: u8, class: u8) -> bool {
        let race_mask = self.race_mask();
        if race_mask != 0 {
            let allowed = (1..=64).contains(&race) && race_mask & (1u64 << (race - 1)) != 0;
            if !allowed {
                return false;
            }
        }
        if self.class_mask != 0 {
            let allowed = (1..=32).contains(&class) && (self.class_mask as u32) & (1u32 << (class - 1)) != 0;
            if !allowed {
                return false;
            }
        }
        true
    }
}

db2_table! {
    pub struct PhaseEntry("Phase") {
        id: u32,
        flags: u16,
    }
}

db2_table! {
    pub struct PhaseXPhaseGroupEntry("PhaseXPhaseGroup") {
        id: u32,
        phase_id: u16,
        phase_group_id: u32,
    }
}

db2_table! {
    /// Item handed out by a quest reward package.
    ///
    /// `display_type` is one of [`crate::defines::quest_package_filter`].
    pub struct QuestPackageItemEntry("QuestPackageItem") {
        id: u32,
        package_id: u16,
        item_id: i32,
        item_quantity: u32,
        display_type: u8,
    }
}
