//! Hotfix overlay against loaded tables.

use ntest::timeout;

use db2_core::format::table_hash;
use db2_core::hotfix::{HotfixSource, HotfixStatus, HotfixStore, JsonHotfixSource, MemoryHotfixSource};
use db2_core::tables::{ArtifactPowerEntry, MapEntry, MountEntry};
use db2_core::{Db2Manager, Db2Record, Locale, TableRegistry};

use super::helpers::DataDir;

fn loaded_tables() -> TableRegistry {
    let data = DataDir::with_locales(&[Locale::EnUs]);
    data.write(
        Locale::EnUs,
        &(1..=5)
            .map(|id| MapEntry { id, ..Default::default() })
            .collect::<Vec<_>>(),
    );
    data.write(
        Locale::EnUs,
        &[
            MountEntry { id: 6, source_spell_id: 458, ..Default::default() },
            MountEntry { id: 7, source_spell_id: 459, ..Default::default() },
        ],
    );
    data.write(
        Locale::EnUs,
        &[
            ArtifactPowerEntry { id: 100, artifact_id: 1, ..Default::default() },
            ArtifactPowerEntry { id: 101, artifact_id: 1, ..Default::default() },
        ],
    );
    let (tables, summary) = TableRegistry::load_all(&data.config()).unwrap();
    assert!(summary.is_complete());
    tables
}

#[test]
#[timeout(10000)]
fn test_removed_records_are_erased() {
    let mut tables = loaded_tables();
    let map_hash = table_hash(MapEntry::TABLE_NAME);
    let mut source = MemoryHotfixSource::new();
    source
        .push_data(1, map_hash, 2, HotfixStatus::RecordRemoved as u8)
        .push_data(2, map_hash, 4, HotfixStatus::RecordRemoved as u8)
        .push_data(3, map_hash, 40, HotfixStatus::RecordRemoved as u8)
        .push_data(4, map_hash, 5, HotfixStatus::Valid as u8);

    let store = HotfixStore::load(&source, &tables).unwrap();
    assert_eq!(store.reconcile(&mut tables), 2);

    let maps = tables.get::<MapEntry>().unwrap();
    for record in source.hotfix_data().unwrap() {
        if record.status == HotfixStatus::RecordRemoved as u8 {
            assert!(maps.lookup(record.record_id as u32).is_none());
        }
    }
    assert_eq!(maps.len(), 3);
    assert!(maps.contains(5));
}

#[test]
#[timeout(10000)]
fn test_later_push_determines_status() {
    let mut tables = loaded_tables();
    let map_hash = table_hash(MapEntry::TABLE_NAME);

    let mut removed_last = MemoryHotfixSource::new();
    removed_last
        .push_data(20, map_hash, 3, HotfixStatus::RecordRemoved as u8)
        .push_data(10, map_hash, 3, HotfixStatus::Valid as u8);
    let store = HotfixStore::load(&removed_last, &tables).unwrap();
    assert_eq!(store.record_status(map_hash, 3), Some(HotfixStatus::RecordRemoved));
    store.reconcile(&mut tables);
    assert!(!tables.get::<MapEntry>().unwrap().contains(3));

    let mut valid_last = MemoryHotfixSource::new();
    valid_last
        .push_data(10, map_hash, 1, HotfixStatus::RecordRemoved as u8)
        .push_data(20, map_hash, 1, HotfixStatus::Valid as u8);
    let store = HotfixStore::load(&valid_last, &tables).unwrap();
    assert_eq!(store.record_status(map_hash, 1), Some(HotfixStatus::Valid));
    assert_eq!(store.reconcile(&mut tables), 0);
    assert!(tables.get::<MapEntry>().unwrap().contains(1));
}

#[test]
#[timeout(10000)]
fn test_apply_hotfixes_rebuilds_indices() {
    let mut manager = Db2Manager::new(loaded_tables());
    assert_eq!(manager.mount_by_spell(458).map(|mount| mount.id), Some(6));
    assert_eq!(manager.artifact_powers(1).len(), 2);

    let hotfixes = JsonHotfixSource::from_json(&format!(
        r#"{{
            "hotfix_data": [
                {{"Id": 1, "UniqueId": 1, "TableHash": {mount}, "RecordId": 6, "Status": 2}},
                {{"Id": 2, "UniqueId": 2, "TableHash": {power}, "RecordId": 101, "Status": 2}}
            ]
        }}"#,
        mount = table_hash(MountEntry::TABLE_NAME),
        power = table_hash(ArtifactPowerEntry::TABLE_NAME),
    ))
    .unwrap();
    let store = HotfixStore::load(&hotfixes, manager.tables()).unwrap();

    assert_eq!(manager.apply_hotfixes(&store), 2);
    assert!(manager.mount_by_spell(458).is_none());
    assert_eq!(manager.mount_by_spell(459).map(|mount| mount.id), Some(7));
    let powers: Vec<u32> = manager.artifact_powers(1).iter().map(|power| power.id).collect();
    assert_eq!(powers, vec![100]);
}
