use crate::locale::LocalizedString;

use super::db2_table;

db2_table! {
    pub struct ChrClassesEntry("ChrClasses") {
        id: u32,
        name: LocalizedString,
        filename: String,
        display_power: u8,
        primary_stat_priority: u8,
        ranged_attack_power_per_agility: u8,
        attack_power_per_strength: u8,
        attack_power_per_agility: u8,
        flags: i32,
        spell_class_set: u8,
    }
}

db2_table! {
    /// Power type (mana, rage, ...) usable by a class.
    pub struct ChrClassesXPowerTypesEntry("ChrClassesXPowerTypes") {
        id: u32,
        power_type: i8,
        class_id: u32,
    }
}

db2_table! {
    pub struct ChrModelEntry("ChrModel") {
        id: u32,
        face_customization_offset: [f32; 3],
        customize_offset: [f32; 3],
        sex: i8,
        display_id: u32,
        char_component_texture_layout_id: i32,
        flags: i32,
        skeleton_file_data_id: i32,
        model_fallback_chr_model_id: i32,
        texture_fallback_chr_model_id: i32,
        helm_vis_fallback_chr_model_id: i32,
        customize_scale: f32,
        customize_facing: f32,
        camera_distance_offset: f32,
        barber_shop_camera_offset_scale: f32,
        barber_shop_camera_height_offset_scale: f32,
        barber_shop_camera_rotation_offset: f32,
    }
}

db2_table! {
    pub struct ChrRaceXChrModelEntry("ChrRaceXChrModel") {
        id: u32,
        chr_races_id: i32,
        chr_model_id: i32,
        sex: i32,
        allowed_transmog_slots: i32,
    }
}

db2_table! {
    /// Class specialization. Pet override specs carry class 0.
    pub struct ChrSpecializationEntry("ChrSpecialization") {
        id: u32,
        name: LocalizedString,
        female_name: LocalizedString,
        description: LocalizedString,
        class_id: u8,
        order_index: i8,
        pet_talent_type: i8,
        role: i8,
        flags: u32,
        spell_icon_file_id: i32,
        primary_stat_priority: i8,
        animation_replacement_set_id: i32,
        mastery_spell_id: [i32; 2],
    }
}

db2_table! {
    /// Spell granted or overridden by a specialization.
    pub struct SpecializationSpellsEntry("SpecializationSpells") {
        id: u32,
        description: LocalizedString,
        spec_id: u16,
        spell_id: i32,
        overrides_spell_id: i32,
        display_order: u8,
    }
}

db2_table! {
    /// Talent at a (tier, column) slot of a class talent row.
    pub struct TalentEntry("Talent") {
        id: u32,
        description: LocalizedString,
        tier_id: u8,
        flags: u8,
        column_index: u8,
        tab_id: u16,
        class_id: i8,
        spec_id: u16,
        spell_id: i32,
        overrides_spell_id: i32,
        required_spell_id: i32,
        category_mask: [i32; 2],
        spell_rank: [i32; 9],
        prereq_talent: [i32; 3],
        prereq_rank: [i32; 3],
    }
}
