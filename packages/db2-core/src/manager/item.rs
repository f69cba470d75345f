//! Item collection, item set and quest package lookups.

use crate::tables::{
    HeirloomEntry, ItemChildEquipmentEntry, ItemLimitCategoryConditionEntry, ItemSetSpellEntry,
    ItemSpecOverrideEntry, QuestPackageItemEntry,
};

use super::Db2Manager;

impl Db2Manager {
    pub fn is_toy_item(&self, item_id: u32) -> bool {
        self.index.toys.contains(&item_id)
    }

    pub fn heirloom_by_item_id(&self, item_id: u32) -> Option<&HeirloomEntry> {
        let id = self.index.heirlooms.get(&item_id)?;
        self.tables.table::<HeirloomEntry>().lookup(*id)
    }

    /// Item equipped alongside `parent_item_id`, at most one per parent.
    pub fn item_child_equipment(&self, parent_item_id: u32) -> Option<&ItemChildEquipmentEntry> {
        let id = self.index.item_child_equipment.get(&parent_item_id)?;
        self.tables.table::<ItemChildEquipmentEntry>().lookup(*id)
    }

    pub fn item_limit_category_conditions(&self, category_id: u32) -> Vec<&ItemLimitCategoryConditionEntry> {
        self.resolve(self.index.item_limit_category_conditions.get(&category_id))
    }

    /// Set bonus spells of an item set in record order.
    pub fn item_set_spells(&self, item_set_id: u32) -> Vec<&ItemSetSpellEntry> {
        self.resolve(self.index.item_set_spells.get(&item_set_id))
    }

    /// Specializations an item is restricted to, empty when unrestricted.
    pub fn item_spec_overrides(&self, item_id: u32) -> Vec<&ItemSpecOverrideEntry> {
        self.resolve(self.index.item_spec_overrides.get(&item_id))
    }

    /// Items of a quest package, excluding unmatched fallbacks.
    pub fn quest_package_items(&self, package_id: u32) -> Vec<&QuestPackageItemEntry> {
        self.resolve(self.index.quest_package_items.get(&package_id))
    }

    /// Items handed out when nothing else of the package matches the player.
    pub fn quest_package_fallback_items(&self, package_id: u32) -> Vec<&QuestPackageItemEntry> {
        self.resolve(self.index.quest_package_fallback_items.get(&package_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::defines::quest_package_filter;
    use crate::manager::Db2Manager;
    use crate::registry::TableRegistry;
    use crate::storage::Db2Storage;
    use crate::tables::{
        ChrSpecializationEntry, HeirloomEntry, ItemChildEquipmentEntry, ItemLimitCategoryConditionEntry,
        ItemLimitCategoryEntry, ItemSetEntry, ItemSetSpellEntry, ItemSpecOverrideEntry,
        QuestPackageItemEntry, ToyEntry,
    };

    #[test]
    fn test_toys_and_heirlooms() {
        let mut tables = TableRegistry::empty();
        tables.insert(Db2Storage::from_iter([
            ToyEntry { id: 1, item_id: 44606, ..Default::default() },
            ToyEntry { id: 2, item_id: -1, ..Default::default() },
        ]));
        tables.insert(Db2Storage::from_iter([HeirloomEntry {
            id: 7,
            item_id: 42943,
            ..Default::default()
        }]));
        let manager = Db2Manager::new(tables);

        assert!(manager.is_toy_item(44606));
        assert!(!manager.is_toy_item(42943));
        assert_eq!(manager.heirloom_by_item_id(42943).map(|h| h.id), Some(7));
        assert!(manager.heirloom_by_item_id(44606).is_none());
    }

    #[test]
    fn test_item_set_spells_require_set() {
        let mut tables = TableRegistry::empty();
        tables.insert(Db2Storage::from_iter([ItemSetEntry { id: 750, ..Default::default() }]));
        tables.insert(Db2Storage::from_iter([
            ItemSetSpellEntry { id: 1, spell_id: 100, threshold: 2, item_set_id: 750, ..Default::default() },
            ItemSetSpellEntry { id: 2, spell_id: 101, threshold: 4, item_set_id: 750, ..Default::default() },
            ItemSetSpellEntry { id: 3, spell_id: 102, threshold: 2, item_set_id: 751, ..Default::default() },
        ]));
        let manager = Db2Manager::new(tables);

        let thresholds: Vec<u8> = manager.item_set_spells(750).iter().map(|s| s.threshold).collect();
        assert_eq!(thresholds, vec![2, 4]);
        assert!(manager.item_set_spells(751).is_empty());
    }

    #[test]
    fn test_item_spec_overrides_require_spec() {
        let mut tables = TableRegistry::empty();
        tables.insert(Db2Storage::from_iter([ChrSpecializationEntry {
            id: 62,
            class_id: 8,
            ..Default::default()
        }]));
        tables.insert(Db2Storage::from_iter([
            ItemSpecOverrideEntry { id: 1, spec_id: 62, item_id: 19019 },
            ItemSpecOverrideEntry { id: 2, spec_id: 999, item_id: 19019 },
        ]));
        let manager = Db2Manager::new(tables);

        let specs: Vec<u16> = manager.item_spec_overrides(19019).iter().map(|o| o.spec_id).collect();
        assert_eq!(specs, vec![62]);
    }

    #[test]
    fn test_child_equipment_keeps_first_child() {
        let mut tables = TableRegistry::empty();
        tables.insert(Db2Storage::from_iter([
            ItemChildEquipmentEntry { id: 1, parent_item_id: 500, child_item_id: 501, child_item_equip_slot: 16 },
            ItemChildEquipmentEntry { id: 2, parent_item_id: 500, child_item_id: 502, child_item_equip_slot: 16 },
        ]));
        let manager = Db2Manager::new(tables);

        assert_eq!(manager.item_child_equipment(500).map(|c| c.child_item_id), Some(501));
        assert!(manager.item_child_equipment(501).is_none());
    }

    #[test]
    fn test_item_limit_category_conditions() {
        let mut tables = TableRegistry::empty();
        tables.insert(Db2Storage::from_iter([ItemLimitCategoryEntry { id: 4, quantity: 1, ..Default::default() }]));
        tables.insert(Db2Storage::from_iter([
            ItemLimitCategoryConditionEntry { id: 1, add_quantity: 2, player_condition_id: 10, parent_item_limit_category_id: 4 },
            ItemLimitCategoryConditionEntry { id: 2, add_quantity: 1, player_condition_id: 11, parent_item_limit_category_id: 5 },
            ItemLimitCategoryConditionEntry { id: 3, add_quantity: 1, player_condition_id: 12, parent_item_limit_category_id: -1 },
        ]));
        let manager = Db2Manager::new(tables);

        assert_eq!(manager.item_limit_category_conditions(4).len(), 1);
        assert!(manager.item_limit_category_conditions(5).is_empty());
    }

    #[test]
    fn test_quest_package_fallback_split() {
        let mut tables = TableRegistry::empty();
        tables.insert(Db2Storage::from_iter([
            QuestPackageItemEntry { id: 1, package_id: 3, item_id: 100, item_quantity: 1, display_type: quest_package_filter::CLASS },
            QuestPackageItemEntry { id: 2, package_id: 3, item_id: 101, item_quantity: 1, display_type: quest_package_filter::UNMATCHED },
            QuestPackageItemEntry { id: 3, package_id: 3, item_id: 102, item_quantity: 5, display_type: quest_package_filter::EVERYONE },
        ]));
        let manager = Db2Manager::new(tables);

        let items: Vec<i32> = manager.quest_package_items(3).iter().map(|i| i.item_id).collect();
        assert_eq!(items, vec![100, 102]);
        let fallback: Vec<i32> = manager.quest_package_fallback_items(3).iter().map(|i| i.item_id).collect();
        assert_eq!(fallback, vec![101]);
        assert!(manager.quest_package_items(4).is_empty());
    }
}
