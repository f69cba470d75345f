use crate::locale::LocalizedString;

use super::db2_table;

db2_table! {
    pub struct MountEntry("Mount") {
        id: u32,
        name: LocalizedString,
        source_text: LocalizedString,
        description: LocalizedString,
        mount_type_id: u16,
        flags: u16,
        source_type_enum: i8,
        source_spell_id: i32,
        player_condition_id: u32,
        mount_fly_ride_height: f32,
        ui_model_scene_id: i32,
        mount_spec_special_rider_anim_kit_id: i32,
        mount_special_spell_visual_kit_id: i32,
    }
}

db2_table! {
    pub struct MountCapabilityEntry("MountCapability") {
        id: u32,
        flags: u8,
        req_riding_skill: u16,
        req_area_id: u16,
        req_spell_aura_id: u32,
        req_spell_known_id: i32,
        mod_spell_aura_id: i32,
        req_map_id: i16,
        player_condition_id: i32,
        flight_capability_id: i32,
    }
}

db2_table! {
    pub struct MountTypeXCapabilityEntry("MountTypeXCapability") {
        id: u32,
        mount_type_id: u16,
        mount_capability_id: u16,
        order_index: u8,
    }
}

db2_table! {
    pub struct MountXDisplayEntry("MountXDisplay") {
        id: u32,
        creature_display_info_id: i32,
        player_condition_id: u32,
        mount_id: u32,
    }
}
