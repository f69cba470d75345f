//! Registry loading and the startup sequence.

use ntest::timeout;

use db2_core::game_table::CombatRating;
use db2_core::hotfix::{HotfixStatus, MemoryHotfixSource};
use db2_core::tables::{CurvePointEntry, MapEntry, SkillLineEntry};
use db2_core::{
    DataError, Db2Record, Db2Storage, GameData, Locale, LocalizedString, TableRegistry,
    VersionCheck,
};

use super::helpers::DataDir;

fn curve_point(id: u32, curve_id: u16, order_index: u8, x: f32, y: f32) -> CurvePointEntry {
    CurvePointEntry {
        id,
        pos: [x, y],
        pos_pre_squish: [x, y],
        curve_id,
        order_index,
    }
}

fn map(id: u32, name: &str) -> MapEntry {
    MapEntry {
        id,
        directory: name.to_string(),
        map_name: LocalizedString::new(Locale::EnUs, name),
        parent_map_id: -1,
        cosmetic_parent_map_id: -1,
        ..Default::default()
    }
}

#[test]
#[timeout(10000)]
fn test_records_are_keyed_by_id() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(
        Locale::EnUs,
        &[
            curve_point(900, 1, 0, 0.0, 0.0),
            curve_point(12, 1, 1, 1.0, 1.0),
            curve_point(77_000, 2, 0, 0.0, 5.0),
        ],
    );
    data.write(Locale::EnUs, &[map(571, "Northrend"), map(0, "Azeroth"), map(1, "Kalimdor")]);

    let (tables, summary) = TableRegistry::load_all(&data.config()).unwrap();
    assert!(summary.is_complete());
    assert_eq!(summary.loaded, TableRegistry::known_tables().len());

    let points = tables.get::<CurvePointEntry>().unwrap();
    assert_eq!(points.len(), 3);
    for point in points.iter() {
        assert_eq!(points.lookup(point.id).map(|p| p.id), Some(point.id));
    }
    let maps = tables.get::<MapEntry>().unwrap();
    for entry in maps.iter() {
        assert_eq!(maps.lookup(entry.id).map(|m| m.id), Some(entry.id));
    }
    assert_eq!(maps.max_id(), Some(571));

    let store = tables
        .storage(db2_core::format::table_hash(MapEntry::TABLE_NAME))
        .unwrap();
    assert_eq!(store.table_name(), "Map");
    assert_eq!(store.len(), 3);
}

#[test]
fn test_four_row_round_trip() {
    let data = DataDir::with_locales(&[]);
    let rows = [
        curve_point(4, 9, 3, 40.0, -1.5),
        curve_point(1, 9, 0, 0.0, 0.25),
        curve_point(3, 9, 2, 30.0, 1e6),
        curve_point(2, 9, 1, 10.0, f32::MIN_POSITIVE),
    ];
    data.write(Locale::EnUs, &rows);

    let storage =
        Db2Storage::<CurvePointEntry>::load(&data.table_path(Locale::EnUs, "CurvePoint"), Locale::EnUs)
            .unwrap();
    let loaded: Vec<&CurvePointEntry> = storage.iter().collect();
    assert_eq!(loaded.len(), 4);
    let mut expected = rows.to_vec();
    expected.sort_by_key(|point| point.id);
    for (loaded, expected) in loaded.into_iter().zip(&expected) {
        assert_eq!(loaded, expected);
        assert_eq!(loaded.pos[1].to_bits(), expected.pos[1].to_bits());
    }
}

#[test]
#[timeout(10000)]
fn test_absent_locale_is_skipped() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(Locale::EnUs, &[map(1, "Kalimdor")]);

    let (tables, summary) = TableRegistry::load_all(&data.config()).unwrap();
    assert!(summary.is_complete());
    assert_eq!(tables.available_locales().iter().collect::<Vec<_>>(), vec![Locale::EnUs]);
    assert_eq!(summary.available_locales, tables.available_locales());

    let mut maps = Db2Storage::<MapEntry>::load(&data.table_path(Locale::EnUs, "Map"), Locale::EnUs).unwrap();
    let merged = maps
        .load_locale_overlay(&data.table_path(Locale::DeDe, "Map"), Locale::DeDe)
        .unwrap();
    assert!(!merged);
    assert_eq!(maps.lookup(1).unwrap().map_name.get(Locale::DeDe), "");
}

#[test]
#[timeout(10000)]
fn test_locale_overlay_merges_strings() {
    let data = DataDir::with_locales(&[Locale::EnUs, Locale::DeDe]);
    let skill = |id: u32, name: &str, locale: Locale| SkillLineEntry {
        id,
        display_name: LocalizedString::new(locale, name),
        category_id: 11,
        ..Default::default()
    };
    data.write(Locale::EnUs, &[skill(164, "Blacksmithing", Locale::EnUs), skill(171, "Alchemy", Locale::EnUs)]);
    data.write(Locale::DeDe, &[skill(164, "Schmiedekunst", Locale::DeDe), skill(999, "Unbekannt", Locale::DeDe)]);

    let (tables, _) = TableRegistry::load_all(&data.config()).unwrap();
    let skills = tables.get::<SkillLineEntry>().unwrap();
    assert_eq!(skills.len(), 2);
    let blacksmithing = skills.lookup(164).unwrap();
    assert_eq!(blacksmithing.display_name.get(Locale::EnUs), "Blacksmithing");
    assert_eq!(blacksmithing.display_name.get(Locale::DeDe), "Schmiedekunst");
    assert_eq!(skills.lookup(171).unwrap().display_name.get(Locale::DeDe), "");
    assert!(!skills.contains(999));
}

#[test]
fn test_default_locale_missing_is_fatal() {
    let data = DataDir::with_locales(&[Locale::DeDe]);
    let result = TableRegistry::load_all(&data.config());
    assert!(matches!(result, Err(DataError::DefaultLocaleMissing { .. })));
    assert!(matches!(
        GameData::load(&data.config()),
        Err(DataError::DefaultLocaleMissing { .. })
    ));
}

#[test]
#[timeout(10000)]
fn test_corrupt_table_fails_startup() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    std::fs::write(data.table_path(Locale::EnUs, "Map"), b"WDB1 not a table").unwrap();

    let (tables, summary) = TableRegistry::load_all(&data.config()).unwrap();
    assert_eq!(summary.failed, vec!["Map".to_string()]);
    assert!(tables.get::<MapEntry>().unwrap().is_empty());

    match GameData::load(&data.config()) {
        Err(DataError::TablesFailed { tables }) => assert_eq!(tables, vec!["Map".to_string()]),
        other => panic!("expected TablesFailed, got {:?}", other.map(|_| ())),
    }
}

#[test]
#[timeout(10000)]
fn test_version_check_fails_startup() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(Locale::EnUs, &[map(2_828, "Latest")]);

    let mut config = data.config();
    config.version_checks = vec![VersionCheck::new("Map", 2_828)];
    assert!(GameData::load(&config).is_ok());

    config.version_checks.push(VersionCheck::new("CurvePoint", 1_029_826));
    match GameData::load(&config) {
        Err(DataError::OutdatedClientData { missing }) => assert_eq!(missing.len(), 1),
        other => panic!("expected OutdatedClientData, got {:?}", other.map(|_| ())),
    }
}

#[test]
#[timeout(10000)]
fn test_full_startup_sequence() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(Locale::EnUs, &[map(0, "Azeroth"), map(1, "Kalimdor"), map(530, "Outland")]);

    let map_hash = db2_core::format::table_hash(MapEntry::TABLE_NAME);
    let mut hotfixes = MemoryHotfixSource::new();
    hotfixes
        .push_data(10, map_hash, 530, HotfixStatus::RecordRemoved as u8)
        .push_data(11, map_hash, 1, HotfixStatus::RecordRemoved as u8)
        .push_data(12, map_hash, 1, HotfixStatus::Valid as u8);
    let hotfix_path = data.path().join("hotfixes.json");
    std::fs::write(&hotfix_path, serde_json::to_vec_pretty(&hotfixes).unwrap()).unwrap();

    data.write_game_table("BaseMp", 14, &[vec![100.0; 14], vec![120.0; 14]]);
    data.write_game_table("HpPerSta", 1, &[vec![10.0], vec![10.0]]);
    data.write_game_table("SpellScaling", 22, &[vec![1.0; 22], vec![2.0; 22]]);
    data.write_game_table("xp", 5, &[vec![400.0, 0.0, 0.0, 0.0, 0.0], vec![900.0, 0.0, 0.0, 0.0, 0.0]]);
    let mut ratings = vec![1.0; 32];
    ratings[CombatRating::Mastery as usize] = 30.0;
    data.write_game_table("CombatRatings", 32, &[ratings.clone(), ratings]);

    let mut config = data.config();
    config.hotfix_path = Some(hotfix_path);
    config.load_game_tables = true;
    let game_data = GameData::load(&config).unwrap();

    let maps = game_data.manager.tables().get::<MapEntry>().unwrap();
    assert!(maps.contains(0));
    assert!(maps.contains(1));
    assert!(!maps.contains(530));
    assert_eq!(game_data.hotfixes.max_hotfix_id(), 12);

    let game_tables = game_data.game_tables.unwrap();
    assert_eq!(game_tables.xp_for_level(2), 900.0);
    assert_eq!(game_tables.combat_rating(1, CombatRating::Mastery), 30.0);
    assert_eq!(game_tables.base_mp(2, db2_core::defines::Class::Priest), 120.0);
}

#[test]
#[timeout(10000)]
fn test_missing_game_tables_fail_startup() {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    let mut config = data.config();
    config.load_game_tables = true;
    assert!(matches!(
        GameData::load(&config),
        Err(DataError::TablesFailed { tables }) if tables.len() == 5
    ));
}
