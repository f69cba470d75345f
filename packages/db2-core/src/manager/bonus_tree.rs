//! Item bonus tree traversal and default bonus resolution.

use std::collections::BTreeSet;

use crate::defines::{ItemContext, ITEM_QUALITY_EPIC, ITEM_QUALITY_RARE, ITEM_QUALITY_UNCOMMON};
use crate::storage::Db2Storage;
use crate::tables::{
    ItemBonusEntry, ItemBonusTreeNodeEntry, ItemLevelSelectorEntry, ItemLevelSelectorQualityEntry,
    ItemLevelSelectorQualitySetEntry, ItemSparseEntry,
};

use super::Db2Manager;

/// Depth-first walk over the nodes of an item bonus tree.
///
/// Each node is yielded before the nodes of its child tree. Without
/// `visit_children` only the direct nodes of the root tree are yielded. A tree
/// that is already on the walk is not entered again.
pub struct ItemBonusTreeIter<'a> {
    manager: &'a Db2Manager,
    nodes: &'a Db2Storage<ItemBonusTreeNodeEntry>,
    stack: Vec<(u32, std::slice::Iter<'a, u32>)>,
    visit_children: bool,
}

impl<'a> ItemBonusTreeIter<'a> {
    fn new(manager: &'a Db2Manager, tree_id: u32, visit_children: bool) -> Self {
        let mut iter = Self {
            manager,
            nodes: manager.tables.table::<ItemBonusTreeNodeEntry>(),
            stack: Vec::new(),
            visit_children,
        };
        iter.enter(tree_id);
        iter
    }

    fn enter(&mut self, tree_id: u32) {
        if self.stack.iter().any(|(id, _)| *id == tree_id) {
            tracing::warn!("Item bonus tree {} contains itself, not visiting again", tree_id);
            return;
        }
        let manager = self.manager;
        if let Some(nodes) = manager.index.item_bonus_trees.get(&tree_id) {
            self.stack.push((tree_id, nodes.iter()));
        }
    }
}

impl<'a> Iterator for ItemBonusTreeIter<'a> {
    type Item = &'a ItemBonusTreeNodeEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.nodes;
        loop {
            let (_, pending) = self.stack.last_mut()?;
            let Some(&node_id) = pending.next() else {
                self.stack.pop();
                continue;
            };
            let Some(node) = store.lookup(node_id) else {
                continue;
            };
            if self.visit_children && node.child_item_bonus_tree_id != 0 {
                self.enter(node.child_item_bonus_tree_id as u32);
            }
            return Some(node);
        }
    }
}

impl Db2Manager {
    /// Lazily walks a bonus tree; see [`ItemBonusTreeIter`].
    pub fn item_bonus_tree_iter(&self, tree_id: u32, visit_children: bool) -> ItemBonusTreeIter<'_> {
        ItemBonusTreeIter::new(self, tree_id, visit_children)
    }

    /// Nodes of a bonus tree in depth-first, parent before children order.
    pub fn item_bonus_tree(&self, tree_id: u32, visit_children: bool) -> Vec<&ItemBonusTreeNodeEntry> {
        self.item_bonus_tree_iter(tree_id, visit_children).collect()
    }

    /// Bonuses of a bonus list.
    pub fn item_bonuses(&self, bonus_list_id: u32) -> Vec<&ItemBonusEntry> {
        self.resolve::<ItemBonusEntry>(self.index.item_bonus_lists.get(&bonus_list_id))
    }

    /// Bonus list that shifts an item's level by `delta`.
    pub fn item_bonus_list_for_item_level_delta(&self, delta: i16) -> Option<u32> {
        self.index.item_level_delta_to_bonus_list.get(&delta).copied()
    }

    /// Bonus trees attached to an item.
    pub fn item_bonus_trees_for_item(&self, item_id: u32) -> &[u32] {
        self.index
            .item_to_bonus_trees
            .get(&item_id)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Every bonus list reachable from a bonus tree.
    pub fn all_item_bonus_tree_bonuses(&self, tree_id: u32) -> BTreeSet<u32> {
        self.item_bonus_tree_iter(tree_id, true)
            .filter(|node| node.child_item_bonus_list_id != 0)
            .map(|node| node.child_item_bonus_list_id as u32)
            .collect()
    }

    /// Bonus lists an item receives by default when generated in `context`.
    ///
    /// Only bonus trees with exactly one direct node applicable to `context`
    /// contribute. The last item level selector found also adds its level
    /// delta bonus and the bonus list of the matching quality.
    pub fn default_item_bonus_tree(&self, item_id: u32, context: ItemContext) -> Vec<u32> {
        let mut bonus_lists = Vec::new();
        let Some(item) = self.tables.table::<ItemSparseEntry>().lookup(item_id) else {
            return bonus_lists;
        };

        let mut item_level_selector_id = 0u32;
        for &tree_id in self.item_bonus_trees_for_item(item_id) {
            let matching_nodes = self
                .item_bonus_tree_iter(tree_id, false)
                .filter(|node| {
                    let node_context = ItemContext(node.item_context);
                    node_context == ItemContext::NONE || node_context == context
                })
                .count();
            if matching_nodes != 1 {
                continue;
            }

            for node in self.item_bonus_tree_iter(tree_id, true) {
                let node_context = ItemContext(node.item_context);
                let required_context = if node_context == ItemContext::FORCE_TO_NONE {
                    ItemContext::NONE
                } else {
                    node_context
                };
                if node_context != ItemContext::NONE && context != required_context {
                    continue;
                }

                if node.child_item_bonus_list_id != 0 {
                    bonus_lists.push(node.child_item_bonus_list_id as u32);
                } else if node.child_item_level_selector_id != 0 {
                    item_level_selector_id = node.child_item_level_selector_id as u32;
                }
            }
        }

        let Some(selector) = self
            .tables
            .table::<ItemLevelSelectorEntry>()
            .lookup(item_level_selector_id)
        else {
            return bonus_lists;
        };

        let delta = (selector.min_item_level as i32 - item.item_level as i32) as i16;
        if let Some(bonus) = self.item_bonus_list_for_item_level_delta(delta) {
            bonus_lists.push(bonus);
        }

        let quality_set_id = selector.item_level_selector_quality_set_id as u32;
        if let Some(quality_set) = self
            .tables
            .table::<ItemLevelSelectorQualitySetEntry>()
            .lookup(quality_set_id)
        {
            let min_item_level = selector.min_item_level as i32;
            let quality = if min_item_level >= quality_set.ilvl_epic as i32 {
                ITEM_QUALITY_EPIC
            } else if min_item_level >= quality_set.ilvl_rare as i32 {
                ITEM_QUALITY_RARE
            } else {
                ITEM_QUALITY_UNCOMMON
            };

            let qualities = self.item_level_selector_qualities(quality_set_id);
            let lower_bound = qualities.partition_point(|entry| (entry.quality as i32) < quality as i32);
            if let Some(entry) = qualities.get(lower_bound) {
                bonus_lists.push(entry.quality_item_bonus_list_id as u32);
            }
        }

        bonus_lists
    }

    /// Qualities of an item level selector quality set, sorted by quality.
    pub fn item_level_selector_qualities(&self, quality_set_id: u32) -> Vec<&ItemLevelSelectorQualityEntry> {
        self.resolve::<ItemLevelSelectorQualityEntry>(
            self.index.item_level_selector_qualities.get(&quality_set_id),
        )
    }
}
