use crate::defines::{Position2D, Position3D};
use crate::locale::LocalizedString;

use super::db2_table;

db2_table! {
    pub struct UiMapEntry("UiMap") {
        id: u32,
        name: LocalizedString,
        parent_ui_map_id: i32,
        flags: i32,
        system: u8,
        map_type: u8,
        bounty_set_id: i32,
        bounty_display_location: u32,
        visibility_player_condition_id: i32,
        help_text_position: i8,
        bkg_atlas_id: i32,
        alternate_ui_map_group: i32,
        content_tuning_id: i32,
    }
}

db2_table! {
    /// World region mapped onto a rectangle of a UI map.
    ///
    /// `region` holds the minimum corner followed by the maximum corner, each
    /// as x, y, z. `ui_min`/`ui_max` are normalized UI coordinates.
    pub struct UiMapAssignmentEntry("UiMapAssignment") {
        id: u32,
        ui_min: [f32; 2],
        ui_max: [f32; 2],
        region: [f32; 6],
        ui_map_id: i32,
        order_index: i32,
        map_id: i32,
        area_id: i32,
        wmo_doodad_placement_id: i32,
        wmo_group_id: i32,
    }
}

impl UiMapAssignmentEntry {
    pub fn region_min(&self) -> Position3D {
        Position3D::new(self.region[0], self.region[1], self.region[2])
    }

    pub fn region_max(&self) -> Position3D {
        Position3D::new(self.region[3], self.region[4], self.region[5])
    }

    /// UI space size of the assigned rectangle.
    pub fn ui_size(&self) -> Position2D {
        Position2D::new(self.ui_max[0] - self.ui_min[0], self.ui_max[1] - self.ui_min[1])
    }
}
