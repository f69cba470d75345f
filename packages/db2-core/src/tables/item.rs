use crate::locale::LocalizedString;

use super::db2_table;

db2_table! {
    pub struct ItemSparseEntry("ItemSparse") {
        id: u32,
        display: LocalizedString,
        description: LocalizedString,
        item_level: u16,
        overall_quality_id: u8,
        inventory_type: i8,
        required_level: i8,
        allowable_class: i32,
        item_name_description_id: u16,
        bonding: u8,
        max_count: i32,
        stackable: i32,
        sell_price: u32,
        buy_price: u32,
        flags: [i32; 5],
        stat_modifier_bonus_stat: [i8; 10],
        stat_percent_editor: [i32; 10],
    }
}

db2_table! {
    /// One bonus of a bonus list; `value` is interpreted per `bonus_type`.
    pub struct ItemBonusEntry("ItemBonus") {
        id: u32,
        value: [i32; 4],
        parent_item_bonus_list_id: u16,
        bonus_type: u8,
        order_index: u8,
    }
}

db2_table! {
    pub struct ItemBonusListLevelDeltaEntry("ItemBonusListLevelDelta") {
        id: u32,
        item_level_delta: i16,
    }
}

db2_table! {
    /// Edge of an item bonus tree.
    ///
    /// A node either grants a bonus list, selects an item level, or links to a
    /// child tree.
    pub struct ItemBonusTreeNodeEntry("ItemBonusTreeNode") {
        id: u32,
        item_context: u8,
        child_item_bonus_tree_id: u16,
        child_item_bonus_list_id: u16,
        child_item_level_selector_id: u16,
        child_item_bonus_list_group_id: i32,
        ibl_group_points_mod_set_id: i32,
        parent_item_bonus_tree_id: u32,
    }
}

db2_table! {
    pub struct ItemXBonusTreeEntry("ItemXBonusTree") {
        id: u32,
        item_bonus_tree_id: u16,
        item_id: i32,
    }
}

db2_table! {
    pub struct ItemLevelSelectorEntry("ItemLevelSelector") {
        id: u32,
        min_item_level: u16,
        item_level_selector_quality_set_id: u16,
        azerite_unlock_mapping_set: u16,
    }
}

db2_table! {
    pub struct ItemLevelSelectorQualityEntry("ItemLevelSelectorQuality") {
        id: u32,
        quality_item_bonus_list_id: i32,
        quality: i8,
        parent_ils_quality_set_id: u32,
    }
}

db2_table! {
    pub struct ItemLevelSelectorQualitySetEntry("ItemLevelSelectorQualitySet") {
        id: u32,
        ilvl_rare: i16,
        ilvl_epic: i16,
    }
}

db2_table! {
    pub struct ToyEntry("Toy") {
        id: u32,
        source_text: LocalizedString,
        item_id: i32,
        flags: u8,
        source_type_enum: i8,
    }
}

db2_table! {
    pub struct HeirloomEntry("Heirloom") {
        id: u32,
        source_text: LocalizedString,
        item_id: i32,
        legacy_upgraded_item_id: i32,
        static_upgraded_item_id: i32,
        source_type_enum: i8,
        flags: u8,
        legacy_item_id: i32,
        upgrade_item_id: [i32; 6],
        upgrade_item_bonus_list_id: [u16; 6],
    }
}

db2_table! {
    pub struct ItemSetEntry("ItemSet") {
        id: u32,
        name: LocalizedString,
        set_flags: u32,
        required_skill: u32,
        required_skill_rank: u16,
        item_id: [u32; 17],
    }
}

db2_table! {
    /// Set bonus spell, active once `threshold` pieces are equipped.
    pub struct ItemSetSpellEntry("ItemSetSpell") {
        id: u32,
        chr_spec_id: u16,
        spell_id: u32,
        threshold: u8,
        item_set_id: u32,
    }
}

db2_table! {
    pub struct ItemSpecOverrideEntry("ItemSpecOverride") {
        id: u32,
        spec_id: u16,
        item_id: i32,
    }
}

db2_table! {
    /// Secondary item equipped together with its parent item.
    pub struct ItemChildEquipmentEntry("ItemChildEquipment") {
        id: u32,
        parent_item_id: u32,
        child_item_id: i32,
        child_item_equip_slot: u8,
    }
}

db2_table! {
    pub struct ItemLimitCategoryEntry("ItemLimitCategory") {
        id: u32,
        name: LocalizedString,
        quantity: u8,
        flags: u8,
    }
}

db2_table! {
    /// Extra carry quantity granted while a player condition holds.
    pub struct ItemLimitCategoryConditionEntry("ItemLimitCategoryCondition") {
        id: u32,
        add_quantity: i8,
        player_condition_id: u32,
        parent_item_limit_category_id: i32,
    }
}
