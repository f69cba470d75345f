//! Queries over tables loaded from disk.

use ntest::timeout;

use db2_core::defines::{ItemContext, Position3D, UiMapSystem, UiMapType};
use db2_core::manager::{CurveInterpolationMode, UiMapQuery};
use db2_core::tables::{
    ArtifactPowerEntry, ArtifactPowerRankEntry, CurveEntry, CurvePointEntry, ItemBonusTreeNodeEntry,
    ItemSparseEntry, ItemXBonusTreeEntry, MapEntry, UiMapAssignmentEntry, UiMapEntry,
};
use db2_core::{Db2Manager, Locale, TableRegistry};

use super::helpers::DataDir;

fn curve_points(curve_id: u16, first_id: u32, points: &[(f32, f32)]) -> Vec<CurvePointEntry> {
    points
        .iter()
        .enumerate()
        .map(|(i, &(x, y))| CurvePointEntry {
            id: first_id + i as u32,
            pos: [x, y],
            pos_pre_squish: [x, y],
            curve_id,
            order_index: i as u8,
        })
        .collect()
}

fn load(data: &DataDir) -> Db2Manager {
    let (tables, summary) = TableRegistry::load_all(&data.config()).unwrap();
    assert!(summary.is_complete(), "failed tables: {:?}", summary.failed);
    Db2Manager::new(tables)
}

fn curve_manager() -> Db2Manager {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(
        Locale::EnUs,
        &[
            CurveEntry { id: 1, kind: 0, flags: 0 },
            CurveEntry { id: 2, kind: 2, flags: 0 },
            CurveEntry { id: 3, kind: 0, flags: 0 },
            CurveEntry { id: 4, kind: 1, flags: 0 },
            CurveEntry { id: 5, kind: 2, flags: 0 },
            CurveEntry { id: 6, kind: 3, flags: 0 },
        ],
    );
    let mut points = Vec::new();
    points.extend(curve_points(1, 100, &[(0.0, 0.0), (10.0, 100.0)]));
    points.extend(curve_points(2, 200, &[(5.0, 42.0)]));
    points.extend(curve_points(3, 300, &[(0.0, 0.0), (10.0, 100.0), (20.0, 50.0)]));
    points.extend(curve_points(4, 400, &[(0.0, 0.0), (1.0, 1.0), (2.0, 4.0), (3.0, 9.0)]));
    points.extend(curve_points(
        5,
        500,
        &[(0.0, 0.0), (1.0, 10.0), (2.0, 0.0), (3.0, 10.0), (4.0, 0.0)],
    ));
    points.extend(curve_points(6, 600, &[(0.0, 0.0), (10.0, 10.0)]));
    // stored out of order, the index column decides
    points.reverse();
    data.write(Locale::EnUs, &points);
    load(&data)
}

#[test]
#[timeout(10000)]
fn test_linear_curve_midpoint() {
    let manager = curve_manager();
    assert_eq!(manager.curve_interpolation_mode(1), Some(CurveInterpolationMode::Linear));
    assert_eq!(manager.evaluate_curve(1, 5.0), 50.0);
}

#[test]
#[timeout(10000)]
fn test_single_point_curve_is_constant() {
    let manager = curve_manager();
    assert_eq!(manager.curve_interpolation_mode(2), Some(CurveInterpolationMode::Constant));
    for x in [-100.0, 0.0, 5.0, 6.0, 1e9] {
        assert_eq!(manager.evaluate_curve(2, x), 42.0);
    }
}

#[test]
#[timeout(10000)]
fn test_curve_evaluation_is_idempotent() {
    let manager = curve_manager();
    for curve_id in 1..=6 {
        for x in [-3.0, 0.0, 0.37, 1.5, 2.25, 7.0, 19.9, 40.0] {
            let first = manager.evaluate_curve(curve_id, x);
            let second = manager.evaluate_curve(curve_id, x);
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }
}

#[test]
#[timeout(10000)]
fn test_curves_clamp_outside_point_range() {
    let manager = curve_manager();
    for curve_id in [1, 3, 6] {
        let points = manager.curve_points(curve_id);
        let (first, last) = (points[0], points[points.len() - 1]);
        assert_eq!(manager.evaluate_curve(curve_id, first.x - 1.0), first.y);
        assert_eq!(manager.evaluate_curve(curve_id, first.x - 1000.0), first.y);
        assert_eq!(manager.evaluate_curve(curve_id, last.x + 1.0), last.y);
        assert_eq!(manager.evaluate_curve(curve_id, last.x + 1000.0), last.y);
    }
    assert_eq!(manager.evaluate_curve(3, 15.0), 75.0);
}

#[test]
#[timeout(10000)]
fn test_catmull_rom_and_bezier_reference_values() {
    let manager = curve_manager();

    assert_eq!(manager.curve_interpolation_mode(4), Some(CurveInterpolationMode::CatmullRom));
    assert_eq!(manager.evaluate_curve(4, 1.5), 2.25);
    // boundaries hold the second and second-to-last points
    assert_eq!(manager.evaluate_curve(4, 0.5), 1.0);
    assert_eq!(manager.evaluate_curve(4, 10.0), 4.0);

    assert_eq!(manager.curve_interpolation_mode(5), Some(CurveInterpolationMode::Bezier));
    assert_eq!(manager.evaluate_curve(5, 2.0), 5.0);
    assert_eq!(manager.evaluate_curve(5, 0.0), 0.0);
    assert_eq!(manager.evaluate_curve(5, -4.0), -400.0);

    assert_eq!(manager.curve_interpolation_mode(6), Some(CurveInterpolationMode::Cosine));
    assert!((manager.evaluate_curve(6, 5.0) - 5.0).abs() < 1e-5);
}

#[test]
#[timeout(10000)]
fn test_dangling_rank_is_not_indexed() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(Locale::EnUs, &[ArtifactPowerEntry { id: 10, artifact_id: 2, ..Default::default() }]);
    data.write(
        Locale::EnUs,
        &[
            ArtifactPowerRankEntry { id: 1, rank_index: 0, artifact_power_id: 10, ..Default::default() },
            ArtifactPowerRankEntry { id: 2, rank_index: 0, artifact_power_id: 99, ..Default::default() },
        ],
    );
    let manager = load(&data);

    assert_eq!(manager.tables().get::<ArtifactPowerRankEntry>().unwrap().len(), 2);
    assert_eq!(manager.artifact_power_rank(10, 0).map(|rank| rank.id), Some(1));
    assert!(manager.artifact_power_rank(99, 0).is_none());
}

#[test]
#[timeout(10000)]
fn test_bonus_tree_from_disk() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    let node = |id: u32, parent: u32, context: ItemContext, child_tree: u16, child_list: u16| {
        ItemBonusTreeNodeEntry {
            id,
            item_context: context.0,
            child_item_bonus_tree_id: child_tree,
            child_item_bonus_list_id: child_list,
            parent_item_bonus_tree_id: parent,
            ..Default::default()
        }
    };
    data.write(
        Locale::EnUs,
        &[
            node(1, 50, ItemContext::NONE, 0, 600),
            node(2, 50, ItemContext::DUNGEON_HEROIC, 51, 0),
            node(3, 51, ItemContext::NONE, 0, 601),
            node(4, 51, ItemContext::NONE, 0, 602),
        ],
    );
    data.write(Locale::EnUs, &[ItemXBonusTreeEntry { id: 1, item_bonus_tree_id: 50, item_id: 19019 }]);
    data.write(Locale::EnUs, &[ItemSparseEntry { id: 19019, item_level: 80, ..Default::default() }]);
    let manager = load(&data);

    let ids: Vec<u32> = manager.item_bonus_tree(50, true).iter().map(|node| node.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    let direct: Vec<u32> = manager.item_bonus_tree(50, false).iter().map(|node| node.id).collect();
    assert_eq!(direct, vec![1, 2]);
    assert_eq!(
        manager.all_item_bonus_tree_bonuses(50).into_iter().collect::<Vec<_>>(),
        vec![600, 601, 602]
    );

    // the heroic node is skipped but its child tree is still walked
    assert_eq!(
        manager.default_item_bonus_tree(19019, ItemContext::DUNGEON_NORMAL),
        vec![600, 601, 602]
    );
    // two direct nodes apply to heroic, so the tree is ambiguous and skipped
    assert!(manager.default_item_bonus_tree(19019, ItemContext::DUNGEON_HEROIC).is_empty());
    assert!(manager.default_item_bonus_tree(1, ItemContext::NONE).is_empty());
}

#[test]
#[timeout(10000)]
fn test_ui_map_position_from_disk() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(
        Locale::EnUs,
        &[MapEntry { id: 1, parent_map_id: -1, cosmetic_parent_map_id: -1, ..Default::default() }],
    );
    data.write(
        Locale::EnUs,
        &[
            UiMapEntry { id: 12, parent_ui_map_id: -1, map_type: UiMapType::Continent as u8, ..Default::default() },
            UiMapEntry { id: 1411, parent_ui_map_id: 12, map_type: UiMapType::Zone as u8, ..Default::default() },
        ],
    );
    data.write(
        Locale::EnUs,
        &[
            UiMapAssignmentEntry {
                id: 1,
                ui_min: [0.0, 0.0],
                ui_max: [1.0, 1.0],
                region: [-4000.0, -4000.0, -500.0, 4000.0, 4000.0, 500.0],
                ui_map_id: 12,
                map_id: 1,
                ..Default::default()
            },
            UiMapAssignmentEntry {
                id: 2,
                ui_min: [0.0, 0.0],
                ui_max: [1.0, 1.0],
                region: [0.0, 0.0, -500.0, 800.0, 800.0, 500.0],
                ui_map_id: 1411,
                map_id: 1,
                ..Default::default()
            },
        ],
    );
    let manager = load(&data);

    let query = UiMapQuery::new(Position3D::new(200.0, 600.0, 10.0), 1, 0);
    let local = manager.ui_map_position(&query, UiMapSystem::World, true).unwrap();
    assert_eq!(local.ui_map_id, 1411);
    assert!((local.position.x - 0.25).abs() < 1e-5);
    assert!((local.position.y - 0.75).abs() < 1e-5);

    // zone spans 0.4..0.5 of the continent on both UI axes
    let global = manager.ui_map_position(&query, UiMapSystem::World, false).unwrap();
    assert_eq!(global.ui_map_id, 1411);
    assert!((global.position.x - 0.425).abs() < 1e-5);
    assert!((global.position.y - 0.475).abs() < 1e-5);

    let outside_zone = UiMapQuery::new(Position3D::new(-2000.0, -2000.0, 0.0), 1, 0);
    let continent = manager.ui_map_position(&outside_zone, UiMapSystem::World, false).unwrap();
    assert_eq!(continent.ui_map_id, 12);
    assert!((continent.position.x - 0.75).abs() < 1e-5);
    assert!((continent.position.y - 0.75).abs() < 1e-5);

    assert!(manager
        .ui_map_position(&UiMapQuery::new(Position3D::new(0.0, 0.0, 0.0), 7, 0), UiMapSystem::World, true)
        .is_none());
}
