use crate::locale::LocalizedString;

use super::db2_table;

db2_table! {
    pub struct MapEntry("Map") {
        id: u32,
        directory: String,
        map_name: LocalizedString,
        map_description_0: LocalizedString,
        map_description_1: LocalizedString,
        corpse: [f32; 2],
        map_type: u8,
        instance_type: i8,
        expansion_id: u8,
        area_table_id: u16,
        loading_screen_id: i16,
        time_of_day_override: i16,
        parent_map_id: i16,
        cosmetic_parent_map_id: i16,
        time_offset: u8,
        minimap_icon_scale: f32,
        corpse_map_id: i16,
        max_players: u8,
        wind_settings_id: i16,
        zmp_file_data_id: i32,
        wdt_file_data_id: i32,
        flags: [i32; 3],
    }
}

db2_table! {
    pub struct MapDifficultyEntry("MapDifficulty") {
        id: u32,
        message: LocalizedString,
        difficulty_id: u8,
        lock_id: i32,
        reset_interval: i8,
        max_players: u8,
        item_context: u8,
        item_context_picker_id: i32,
        flags: i32,
        content_tuning_id: i32,
        map_id: u32,
    }
}

db2_table! {
    pub struct DifficultyEntry("Difficulty") {
        id: u32,
        name: LocalizedString,
        instance_type: u8,
        order_index: u8,
        old_enum_value: i8,
        fallback_difficulty_id: u8,
        min_players: u8,
        max_players: u8,
        flags: u16,
        item_context: u8,
        toggle_difficulty_id: u8,
        group_size_health_curve_id: u16,
        group_size_dmg_curve_id: u16,
        group_size_spellpoints_curve_id: u16,
    }
}

db2_table! {
    pub struct AreaTableEntry("AreaTable") {
        id: u32,
        zone_name: String,
        area_name: LocalizedString,
        continent_id: u16,
        parent_area_id: u16,
        area_bit: i16,
        sound_provider_pref: u8,
        sound_provider_pref_underwater: u8,
        ambience_id: u16,
        uw_ambience: u16,
        zone_music: u16,
        uw_zone_music: u16,
        intro_sound: u16,
        uw_intro_sound: u32,
        faction_group_mask: u8,
        ambient_multiplier: f32,
        mount_flags: i32,
        pvp_combat_world_state_id: i16,
        wild_battle_pet_level_min: u8,
        wild_battle_pet_level_max: u8,
        wind_settings_id: u8,
        content_tuning_id: i32,
        flags: [i32; 2],
        liquid_type_id: [u16; 4],
    }
}

db2_table! {
    /// Area of a WMO group, keyed by root WMO, name set and group.
    pub struct WmoAreaTableEntry("WMOAreaTable") {
        id: u32,
        area_name: LocalizedString,
        wmo_id: u16,
        name_set_id: u8,
        wmo_group_id: i32,
        sound_provider_pref: u8,
        sound_provider_pref_underwater: u8,
        ambience_id: u16,
        uw_ambience: u16,
        zone_music: u16,
        uw_zone_music: u32,
        intro_sound: u16,
        uw_intro_sound: u16,
        area_table_id: u16,
        flags: u16,
    }
}
