//! Game constants shared by table schemas and index queries.

use std::fmt;

/// Size of per-class index arrays, class IDs are below this.
pub const MAX_CLASSES: usize = 15;

/// Size of the power-type dimension of the per-class power index.
pub const MAX_POWERS: usize = 25;

/// Specializations per class.
pub const MAX_SPECIALIZATIONS: usize = 5;

/// Extra class slot in the specialization index holding pet override specs.
pub const PET_SPEC_OVERRIDE_CLASS_INDEX: usize = MAX_CLASSES;

/// Talent rows per class.
pub const MAX_TALENT_TIERS: usize = 7;

/// Talents per talent row.
pub const MAX_TALENT_COLUMNS: usize = 3;

/// Number of UI map systems with their own assignment indices.
pub const MAX_UI_MAP_SYSTEM: usize = 3;

/// Upper bound for vertical distances when scoring UI map regions.
pub const UI_MAP_MAX_VERTICAL_DISTANCE: f32 = 10_000.0;

pub const ITEM_QUALITY_POOR: u8 = 0;
pub const ITEM_QUALITY_NORMAL: u8 = 1;
pub const ITEM_QUALITY_UNCOMMON: u8 = 2;
pub const ITEM_QUALITY_RARE: u8 = 3;
pub const ITEM_QUALITY_EPIC: u8 = 4;
pub const ITEM_QUALITY_LEGENDARY: u8 = 5;

/// `ChrSpecialization.flags` bits.
pub mod chr_specialization_flags {
    pub const CASTER: u32 = 0x01;
    pub const RANGED: u32 = 0x02;
    pub const MELEE: u32 = 0x04;
    pub const DUAL_WIELD_TWO_HANDED: u32 = 0x10;
    pub const PET_OVERRIDE_SPEC: u32 = 0x20;
    pub const RECOMMENDED: u32 = 0x40;
}

/// `QuestPackageItem.display_type` values.
pub mod quest_package_filter {
    pub const LOOT_SPECIALIZATION: u8 = 0;
    pub const CLASS: u8 = 1;
    /// Handed out only when no other item of the package matches the player
    pub const UNMATCHED: u8 = 2;
    pub const EVERYONE: u8 = 3;
}

/// `Difficulty.flags` bits.
pub mod difficulty_flags {
    pub const HEROIC_STYLE_LOCKOUTS: u16 = 0x01;
    pub const DEFAULT: u16 = 0x02;
    pub const CAN_SELECT: u16 = 0x04;
}

/// `UiMap.flags` bits.
pub mod ui_map_flags {
    pub const NO_HIGHLIGHT: i32 = 0x01;
    pub const SHOW_OVERLAYS: i32 = 0x02;
    pub const SHOW_TAXI_NODES: i32 = 0x04;
    pub const NO_WORLD_POSITIONS: i32 = 0x80;
}

/// Player class IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Class {
    Warrior = 1,
    Paladin = 2,
    Hunter = 3,
    Rogue = 4,
    Priest = 5,
    DeathKnight = 6,
    Shaman = 7,
    Mage = 8,
    Warlock = 9,
    Monk = 10,
    Druid = 11,
    DemonHunter = 12,
    Evoker = 13,
    Adventurer = 14,
}

impl Class {
    pub const ALL: [Class; 14] = [
        Class::Warrior,
        Class::Paladin,
        Class::Hunter,
        Class::Rogue,
        Class::Priest,
        Class::DeathKnight,
        Class::Shaman,
        Class::Mage,
        Class::Warlock,
        Class::Monk,
        Class::Druid,
        Class::DemonHunter,
        Class::Evoker,
        Class::Adventurer,
    ];

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|class| class.id() == id)
    }
}

impl fmt::Display for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Context an item is generated in (dungeon difficulty, quest reward, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemContext(pub u8);

impl ItemContext {
    /// No context; bonus tree nodes with this context apply everywhere.
    pub const NONE: ItemContext = ItemContext(0);
    pub const DUNGEON_NORMAL: ItemContext = ItemContext(1);
    pub const DUNGEON_HEROIC: ItemContext = ItemContext(2);
    pub const RAID_NORMAL: ItemContext = ItemContext(3);
    pub const RAID_RAID_FINDER: ItemContext = ItemContext(4);
    pub const RAID_HEROIC: ItemContext = ItemContext(5);
    pub const RAID_MYTHIC: ItemContext = ItemContext(6);
    pub const DUNGEON_MYTHIC: ItemContext = ItemContext(23);
    /// Node only applies when the requested context is [`ItemContext::NONE`].
    pub const FORCE_TO_NONE: ItemContext = ItemContext(91);
}

impl From<u8> for ItemContext {
    fn from(value: u8) -> Self {
        ItemContext(value)
    }
}

/// `UiMap.type` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum UiMapType {
    Cosmic = 0,
    World = 1,
    Continent = 2,
    Zone = 3,
    Dungeon = 4,
    Micro = 5,
    Orphan = 6,
}

/// UI map system an assignment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UiMapSystem {
    World = 0,
    Taxi = 1,
    Adventure = 2,
}

impl UiMapSystem {
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(UiMapSystem::World),
            1 => Some(UiMapSystem::Taxi),
            2 => Some(UiMapSystem::Adventure),
            _ => None,
        }
    }
}

/// Point in a 2D coordinate space (UI map space or a curve plane).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position2D {
    pub x: f32,
    pub y: f32,
}

impl Position2D {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// World position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position3D {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position3D {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}
