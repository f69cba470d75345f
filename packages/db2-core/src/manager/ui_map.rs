//! World position to UI map coordinate resolution.
//!
//! A position is matched against every UI map assignment indexed under its
//! WMO group, WMO doodad placement, area chain and map chain. The best
//! assignment maps the position into its UI rectangle; unless a local
//! position is requested the result is re-projected through parent UI map
//! bounds up to continent level.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::defines::{
    ui_map_flags, Position2D, Position3D, UiMapSystem, UiMapType, MAX_UI_MAP_SYSTEM,
    UI_MAP_MAX_VERTICAL_DISTANCE,
};
use crate::registry::TableRegistry;
use crate::storage::Db2Storage;
use crate::tables::{AreaTableEntry, MapEntry, UiMapAssignmentEntry, UiMapEntry};

use super::Db2Manager;

/// Parent UI map levels followed when re-projecting a position.
const MAX_UI_MAP_DEPTH: usize = 32;

/// UI rectangles narrower than this have no usable scale.
const MIN_UI_SIZE: f32 = 0.0001;

/// Where a child UI map sits inside its parent's UI space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiMapBounds {
    /// Parent UI coordinates: y of the max x edge, x of the max y edge, y of
    /// the min x edge, x of the min y edge
    pub bounds: [f32; 4],
    pub is_ui_assignment: bool,
}

/// Input of a UI map position query.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UiMapQuery {
    pub position: Position3D,
    /// Map ID, negative when unknown
    pub map_id: i32,
    /// Area ID, 0 when unknown
    pub area_id: i32,
    pub wmo_doodad_placement_id: i32,
    pub wmo_group_id: i32,
}

impl UiMapQuery {
    pub fn new(position: Position3D, map_id: i32, area_id: i32) -> Self {
        Self {
            position,
            map_id,
            area_id,
            wmo_doodad_placement_id: 0,
            wmo_group_id: 0,
        }
    }

    pub fn with_wmo(mut self, wmo_doodad_placement_id: i32, wmo_group_id: i32) -> Self {
        self.wmo_doodad_placement_id = wmo_doodad_placement_id;
        self.wmo_group_id = wmo_group_id;
        self
    }
}

/// Resolved UI map position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UiMapPosition {
    pub ui_map_id: i32,
    pub position: Position2D,
}

#[derive(Debug, Default)]
pub(crate) struct UiMapSystemIndex {
    by_map: HashMap<i32, Vec<u32>>,
    by_area: HashMap<i32, Vec<u32>>,
    by_wmo_doodad_placement: HashMap<i32, Vec<u32>>,
    by_wmo_group: HashMap<i32, Vec<u32>>,
}

#[derive(Debug, Default)]
pub(crate) struct UiMapIndex {
    pub by_ui_map: HashMap<i32, Vec<u32>>,
    systems: [UiMapSystemIndex; MAX_UI_MAP_SYSTEM],
    pub bounds: HashMap<u32, UiMapBounds>,
}

fn has_positive_region(assignment: &UiMapAssignmentEntry) -> bool {
    let (min, max) = (assignment.region_min(), assignment.region_max());
    max.x - min.x > 0.0 && max.y - min.y > 0.0
}

impl UiMapIndex {
    pub fn build(tables: &TableRegistry) -> Self {
        let mut index = Self::default();
        let ui_maps = tables.table::<UiMapEntry>();
        let assignments = tables.table::<UiMapAssignmentEntry>();

        for assignment in assignments.iter() {
            index
                .by_ui_map
                .entry(assignment.ui_map_id)
                .or_default()
                .push(assignment.id);
        }

        for ui_map in ui_maps.iter() {
            if let Some(bounds) = index.compute_bounds(ui_maps, assignments, ui_map) {
                index.bounds.insert(ui_map.id, bounds);
            }
        }

        for assignment in assignments.iter() {
            let Some(ui_map) = u32::try_from(assignment.ui_map_id)
                .ok()
                .and_then(|id| ui_maps.lookup(id))
            else {
                tracing::warn!(
                    "UiMapAssignment {} references missing UiMap {}",
                    assignment.id,
                    assignment.ui_map_id
                );
                continue;
            };
            let Some(system) = index.systems.get_mut(ui_map.system as usize) else {
                tracing::warn!(
                    "UiMap {} has invalid system {}, assignment {} skipped",
                    ui_map.id,
                    ui_map.system,
                    assignment.id
                );
                continue;
            };

            if assignment.map_id >= 0 {
                system.by_map.entry(assignment.map_id).or_default().push(assignment.id);
            }
            if assignment.area_id != 0 {
                system.by_area.entry(assignment.area_id).or_default().push(assignment.id);
            }
            if assignment.wmo_doodad_placement_id != 0 {
                system
                    .by_wmo_doodad_placement
                    .entry(assignment.wmo_doodad_placement_id)
                    .or_default()
                    .push(assignment.id);
            }
            if assignment.wmo_group_id != 0 {
                system
                    .by_wmo_group
                    .entry(assignment.wmo_group_id)
                    .or_default()
                    .push(assignment.id);
            }
        }

        index
    }

    /// Places `ui_map` inside its parent using the first pair of assignments
    /// of both maps that share a world map and have a non-empty region.
    fn compute_bounds(
        &self,
        ui_maps: &Db2Storage<UiMapEntry>,
        assignments: &Db2Storage<UiMapAssignmentEntry>,
        ui_map: &UiMapEntry,
    ) -> Option<UiMapBounds> {
        let parent = u32::try_from(ui_map.parent_ui_map_id)
            .ok()
            .and_then(|id| ui_maps.lookup(id))?;
        if parent.flags & ui_map_flags::NO_WORLD_POSITIONS != 0 {
            return None;
        }

        let resolve = |ui_map_id: i32| -> Vec<&UiMapAssignmentEntry> {
            self.by_ui_map
                .get(&ui_map_id)
                .into_iter()
                .flatten()
                .filter_map(|id| assignments.lookup(*id))
                .collect()
        };
        let child_assignments = resolve(ui_map.id as i32);
        let parent_assignments = resolve(parent.id as i32);

        let (child, parent) = child_assignments
            .iter()
            .filter(|child| child.map_id >= 0 && has_positive_region(child))
            .find_map(|child| {
                parent_assignments
                    .iter()
                    .find(|parent| parent.map_id == child.map_id && has_positive_region(parent))
                    .map(|parent| (*child, *parent))
            })?;

        let (child_min, child_max) = (child.region_min(), child.region_max());
        let (parent_min, parent_max) = (parent.region_min(), parent.region_max());
        let parent_x_size = parent_max.x - parent_min.x;
        let parent_y_size = parent_max.y - parent_min.y;

        // world x maps to UI y and world y maps to UI x
        let lerp_ui_y = |scale: f32| (1.0 - scale) * parent.ui_max[1] + scale * parent.ui_min[1];
        let lerp_ui_x = |scale: f32| (1.0 - scale) * parent.ui_max[0] + scale * parent.ui_min[0];

        let bound0 = lerp_ui_y((child_max.x - parent_min.x) / parent_x_size);
        let bound2 = lerp_ui_y((child_min.x - parent_min.x) / parent_x_size);
        let bound1 = lerp_ui_x((child_max.y - parent_min.y) / parent_y_size);
        let bound3 = lerp_ui_x((child_min.y - parent_min.y) / parent_y_size);

        if bound3 - bound1 > 0.0 || bound2 - bound0 > 0.0 {
            Some(UiMapBounds {
                bounds: [bound0, bound1, bound2, bound3],
                is_ui_assignment: true,
            })
        } else {
            None
        }
    }
}

/// Match quality of one assignment for a query; lower sorts first.
#[derive(Debug, Clone, Copy)]
struct AssignmentStatus<'a> {
    assignment: &'a UiMapAssignmentEntry,
    inside_center_distance_sq: f32,
    inside_bottom_distance: f32,
    outside_edge_distance_sq: f32,
    outside_top_distance: f32,
    outside_bottom_distance: f32,
    /// 0 exact map, 1 parent map, 2 cosmetic parent map, 3 unconstrained
    map_priority: u8,
    /// Parent hops from the query area, `None` when unconstrained
    area_priority: Option<u8>,
    /// 0 group and doodad, 1 doodad, 2 group, 3 unconstrained
    wmo_priority: u8,
}

impl<'a> AssignmentStatus<'a> {
    fn new(assignment: &'a UiMapAssignmentEntry) -> Self {
        Self {
            assignment,
            inside_center_distance_sq: f32::MAX,
            inside_bottom_distance: f32::MAX,
            outside_edge_distance_sq: f32::MAX,
            outside_top_distance: f32::MAX,
            outside_bottom_distance: f32::MAX,
            map_priority: 3,
            area_priority: None,
            wmo_priority: 3,
        }
    }

    fn is_inside(&self) -> bool {
        self.outside_edge_distance_sq < f32::EPSILON
            && self.outside_top_distance.abs() < f32::EPSILON
            && self.outside_bottom_distance.abs() < f32::EPSILON
    }

    /// Horizontal world units per UI unit, `None` for degenerate UI rectangles.
    fn scale(&self) -> Option<f32> {
        let ui_size_x = self.assignment.ui_size().x;
        (ui_size_x > MIN_UI_SIZE).then(|| {
            (self.assignment.region_max().x - self.assignment.region_min().x) / ui_size_x
        })
    }

    fn area_rank(&self) -> u16 {
        self.area_priority.map_or(u16::MAX, u16::from)
    }

    fn compare(&self, other: &Self) -> Ordering {
        let (inside, other_inside) = (self.is_inside(), other.is_inside());
        if inside != other_inside {
            return if inside { Ordering::Less } else { Ordering::Greater };
        }

        if self.assignment.ui_map_id == other.assignment.ui_map_id
            && self.assignment.order_index != other.assignment.order_index
        {
            return self.assignment.order_index.cmp(&other.assignment.order_index);
        }

        let priority = self
            .wmo_priority
            .cmp(&other.wmo_priority)
            .then(self.area_rank().cmp(&other.area_rank()))
            .then(self.map_priority.cmp(&other.map_priority));
        if priority != Ordering::Equal {
            return priority;
        }

        let by = |a: f32, b: f32| a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        if inside {
            let distance = by(self.inside_bottom_distance, other.inside_bottom_distance);
            if distance != Ordering::Equal {
                return distance;
            }
            if let (Some(scale), Some(other_scale)) = (self.scale(), other.scale()) {
                if scale != other_scale {
                    return by(scale, other_scale);
                }
            }
            by(self.inside_center_distance_sq, other.inside_center_distance_sq)
        } else {
            by(self.outside_top_distance, other.outside_top_distance)
                .then(by(self.outside_bottom_distance, other.outside_bottom_distance))
                .then(by(self.outside_edge_distance_sq, other.outside_edge_distance_sq))
        }
    }
}

impl Db2Manager {
    /// Scores `assignment` for `query`; `None` when the assignment cannot apply.
    fn assignment_status<'a>(
        &self,
        query: &UiMapQuery,
        assignment: &'a UiMapAssignmentEntry,
    ) -> Option<AssignmentStatus<'a>> {
        let mut status = AssignmentStatus::new(assignment);
        let Position3D { x, y, z } = query.position;
        let (min, max) = (assignment.region_min(), assignment.region_max());

        if x < min.x || x > max.x || y < min.y || y > max.y {
            let x_diff = if x < min.x {
                min.x - x
            } else if x > max.x {
                x - max.x
            } else {
                0.0
            };
            let y_diff = if y < min.y {
                min.y - y
            } else if y > max.y {
                y - max.y
            } else {
                0.0
            };
            status.outside_edge_distance_sq = x_diff * x_diff + y_diff * y_diff;
        } else {
            let center_x = (min.x + max.x) * 0.5;
            let center_y = (min.y + max.y) * 0.5;
            status.inside_center_distance_sq =
                (x - center_x) * (x - center_x) + (y - center_y) * (y - center_y);
            status.outside_edge_distance_sq = 0.0;
        }

        if z < min.z {
            status.outside_bottom_distance = (min.z - z).min(UI_MAP_MAX_VERTICAL_DISTANCE);
        } else if z > max.z {
            status.outside_top_distance = (z - max.z).min(UI_MAP_MAX_VERTICAL_DISTANCE);
        } else {
            status.outside_top_distance = 0.0;
            status.outside_bottom_distance = 0.0;
            status.inside_bottom_distance = (min.z - z).min(UI_MAP_MAX_VERTICAL_DISTANCE);
        }

        if query.area_id != 0 && assignment.area_id != 0 {
            let areas = self.tables.table::<AreaTableEntry>();
            let mut area_id = query.area_id;
            let mut hops: u8 = 0;
            while area_id != assignment.area_id {
                let area = u32::try_from(area_id).ok().and_then(|id| areas.lookup(id))?;
                area_id = area.parent_area_id as i32;
                hops = hops.checked_add(1)?;
            }
            status.area_priority = Some(hops);
        }

        if query.map_id >= 0 && assignment.map_id >= 0 {
            if query.map_id == assignment.map_id {
                status.map_priority = 0;
            } else {
                let map = self.tables.table::<MapEntry>().lookup(query.map_id as u32)?;
                if map.parent_map_id as i32 == assignment.map_id {
                    status.map_priority = 1;
                } else if map.cosmetic_parent_map_id as i32 == assignment.map_id {
                    status.map_priority = 2;
                } else {
                    return None;
                }
            }
        }

        if (query.wmo_group_id != 0 || query.wmo_doodad_placement_id != 0)
            && (assignment.wmo_group_id != 0 || assignment.wmo_doodad_placement_id != 0)
        {
            let mut has_doodad_placement = false;
            if query.wmo_doodad_placement_id != 0 && assignment.wmo_doodad_placement_id != 0 {
                if query.wmo_doodad_placement_id != assignment.wmo_doodad_placement_id {
                    return None;
                }
                has_doodad_placement = true;
            }
            if query.wmo_group_id != 0 && assignment.wmo_group_id != 0 {
                if query.wmo_group_id != assignment.wmo_group_id {
                    return None;
                }
                status.wmo_priority = if has_doodad_placement { 0 } else { 2 };
            } else if has_doodad_placement {
                status.wmo_priority = 1;
            }
        }

        Some(status)
    }

    /// Best matching UI map assignment for a world position.
    pub fn find_nearest_map_assignment(
        &self,
        query: &UiMapQuery,
        system: UiMapSystem,
    ) -> Option<&UiMapAssignmentEntry> {
        let index = &self.index.ui_maps.systems[system.index()];
        let assignments = self.tables.table::<UiMapAssignmentEntry>();
        let mut nearest: Option<AssignmentStatus<'_>> = None;

        let mut consider = |bucket: &HashMap<i32, Vec<u32>>, key: i32| {
            for assignment in bucket
                .get(&key)
                .into_iter()
                .flatten()
                .filter_map(|id| assignments.lookup(*id))
            {
                let Some(status) = self.assignment_status(query, assignment) else {
                    continue;
                };
                let better = nearest
                    .as_ref()
                    .map_or(true, |best| status.compare(best) == Ordering::Less);
                if better {
                    nearest = Some(status);
                }
            }
        };

        consider(&index.by_wmo_group, query.wmo_group_id);
        consider(&index.by_wmo_doodad_placement, query.wmo_doodad_placement_id);

        let areas = self.tables.table::<AreaTableEntry>();
        let mut area = u32::try_from(query.area_id).ok().and_then(|id| areas.lookup(id));
        let mut visited = 0;
        while let Some(entry) = area {
            consider(&index.by_area, entry.id as i32);
            visited += 1;
            if visited > MAX_UI_MAP_DEPTH {
                break;
            }
            area = areas.lookup(entry.parent_area_id as u32);
        }

        if query.map_id > 0 {
            if let Some(map) = self.tables.table::<MapEntry>().lookup(query.map_id as u32) {
                consider(&index.by_map, map.id as i32);
                if map.parent_map_id >= 0 {
                    consider(&index.by_map, map.parent_map_id as i32);
                }
                if map.cosmetic_parent_map_id >= 0 {
                    consider(&index.by_map, map.cosmetic_parent_map_id as i32);
                }
            }
        }

        nearest.map(|status| status.assignment)
    }

    /// Re-projects a UI position through parent bounds up to continent level.
    fn global_ui_map_position(&self, mut ui_map_id: i32, mut position: Position2D) -> Position2D {
        let ui_maps = self.tables.table::<UiMapEntry>();
        for _ in 0..MAX_UI_MAP_DEPTH {
            let Some(ui_map) = u32::try_from(ui_map_id).ok().and_then(|id| ui_maps.lookup(id)) else {
                break;
            };
            if ui_map.map_type <= UiMapType::Continent as u8 {
                break;
            }
            let Some(bounds) = self
                .index
                .ui_maps
                .bounds
                .get(&ui_map.id)
                .filter(|bounds| bounds.is_ui_assignment)
            else {
                break;
            };
            position = Position2D::new(
                (1.0 - position.x) * bounds.bounds[1] + bounds.bounds[3] * position.x,
                (1.0 - position.y) * bounds.bounds[0] + bounds.bounds[2] * position.y,
            );
            ui_map_id = ui_map.parent_ui_map_id;
        }
        position
    }

    /// Maps a world position onto a UI map.
    ///
    /// With `local` the position is relative to the matched UI map, otherwise
    /// it is expressed in the UI space of the enclosing continent.
    pub fn ui_map_position(
        &self,
        query: &UiMapQuery,
        system: UiMapSystem,
        local: bool,
    ) -> Option<UiMapPosition> {
        let assignment = self.find_nearest_map_assignment(query, system)?;
        let (min, max) = (assignment.region_min(), assignment.region_max());

        let mut relative = Position2D::new(0.5, 0.5);
        let region_size = Position2D::new(max.x - min.x, max.y - min.y);
        if region_size.x > 0.0 {
            relative.x = (query.position.x - min.x) / region_size.x;
        }
        if region_size.y > 0.0 {
            relative.y = (query.position.y - min.y) / region_size.y;
        }

        // world x and y are swapped in UI space
        let mut position = Position2D::new(
            relative.y * assignment.ui_min[0] + (1.0 - relative.y) * assignment.ui_max[0],
            relative.x * assignment.ui_min[1] + (1.0 - relative.x) * assignment.ui_max[1],
        );
        if !local {
            position = self.global_ui_map_position(assignment.ui_map_id, position);
        }

        Some(UiMapPosition {
            ui_map_id: assignment.ui_map_id,
            position,
        })
    }

    /// Assignments of a UI map.
    pub fn ui_map_assignments(&self, ui_map_id: i32) -> Vec<&UiMapAssignmentEntry> {
        self.resolve::<UiMapAssignmentEntry>(self.index.ui_maps.by_ui_map.get(&ui_map_id))
    }

    /// Placement of a UI map inside its parent.
    pub fn ui_map_bounds(&self, ui_map_id: u32) -> Option<&UiMapBounds> {
        self.index.ui_maps.bounds.get(&ui_map_id)
    }
}
