use crate::locale::LocalizedString;

use super::db2_table;

db2_table! {
    pub struct ArtifactEntry("Artifact") {
        id: u32,
        name: LocalizedString,
        ui_bar_overlay_color: i32,
        ui_bar_background_color: i32,
        ui_name_color: i32,
        ui_texture_kit_id: u16,
        chr_specialization_id: u16,
        artifact_category_id: u8,
        flags: u8,
        ui_model_scene_id: u32,
        spell_visual_kit_id: u32,
    }
}

db2_table! {
    /// Node of an artifact talent tree.
    pub struct ArtifactPowerEntry("ArtifactPower") {
        id: u32,
        display_pos: [f32; 2],
        artifact_id: u8,
        max_purchasable_rank: u8,
        label: i32,
        flags: u8,
        tier: u8,
    }
}

db2_table! {
    /// Undirected edge between two artifact powers.
    pub struct ArtifactPowerLinkEntry("ArtifactPowerLink") {
        id: u32,
        power_a: u16,
        power_b: u16,
    }
}

db2_table! {
    pub struct ArtifactPowerRankEntry("ArtifactPowerRank") {
        id: u32,
        rank_index: u8,
        spell_id: i32,
        item_bonus_list_id: u16,
        aura_points_override: f32,
        artifact_power_id: u32,
    }
}
