use std::fs;

use carddeck::prompt::{AssumeYes, Scripted};
use carddeck::store::{BlobStore, FileStore};
use carddeck::{AppState, CardError, Session};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn open(path: &std::path::Path) -> Session<FileStore, StdRng> {
    Session::open_with_rng(FileStore::new(path), StdRng::seed_from_u64(5)).unwrap()
}

#[test]
fn deck_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.json");

    let id = {
        let mut s = open(&path);
        let id = s.create_card("Q1", "A1").unwrap();
        s.refresh();
        s.rate(false).unwrap();
        id
    };

    let s = open(&path);
    let card = s.state().card(&id).unwrap();
    assert_eq!(card.weight, 5);
    assert_eq!(s.current_card().unwrap().id, id);
}

#[test]
fn store_reports_its_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deck.json");
    let mut s = open(&path);
    assert_eq!(s.store().path(), path.as_path());
    s.create_card("Q", "A").unwrap();
    assert!(s.store().path().exists());
}

#[test]
fn export_then_import_round_trips_except_active_tab() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = open(&dir.path().join("deck.json"));
    s.create_card("general", "1").unwrap();
    s.create_tab_named("Verbs").unwrap();
    let c = s.create_card("hablar", "to speak").unwrap();
    s.archive_card(&c).unwrap();
    let original = s.state().clone();

    let backup = s.export_to_dir(dir.path()).unwrap();
    assert!(backup
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("cards_backup_"));

    let other = dir.path().join("other.json");
    let mut fresh = open(&other);
    let text = fs::read_to_string(&backup).unwrap();
    assert!(fresh.import(&text, &mut AssumeYes).unwrap());

    let expected = AppState {
        active_tab_id: original.tabs[0].id.clone(),
        ..original
    };
    assert_eq!(fresh.state(), &expected);

    let reloaded = open(&other);
    assert_eq!(reloaded.state(), &expected);
}

#[test]
fn import_missing_cards_keeps_file_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.json");
    let mut s = open(&path);
    s.create_card("Q", "A").unwrap();
    let bytes = fs::read(&path).unwrap();

    let err = s
        .import(r#"{"tabs": [{"id": "t", "name": "x"}]}"#, &mut AssumeYes)
        .unwrap_err();
    assert!(matches!(err, CardError::InvalidFormat(_)));
    assert_eq!(fs::read(&path).unwrap(), bytes);
}

#[test]
fn corrupt_file_stops_startup() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.json");
    fs::write(&path, "not json at all").unwrap();
    let err = Session::open(FileStore::new(&path)).err().unwrap();
    assert!(matches!(err, CardError::CorruptState(_)));
}

#[test]
fn dangling_active_tab_is_repaired_and_written_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("deck.json");
    fs::write(
        &path,
        r#"{"tabs":[{"id":"tab-a","name":"A","createdAt":1},{"id":"tab-b","name":"B","createdAt":2}],
            "cards":[],"activeTabId":"tab-gone"}"#,
    )
    .unwrap();
    let s = open(&path);
    assert_eq!(s.state().active_tab_id, "tab-a");
    let on_disk: AppState =
        serde_json::from_str(&FileStore::new(&path).read().unwrap().unwrap()).unwrap();
    assert_eq!(on_disk.active_tab_id, "tab-a");
}

#[test]
fn deleting_a_tab_cascades_and_keeps_the_rest() {
    let dir = tempfile::tempdir().unwrap();
    let mut s = open(&dir.path().join("deck.json"));
    let general = s.state().active_tab_id.clone();
    s.create_card("keep-1", "x").unwrap();
    s.create_card("keep-2", "x").unwrap();
    let verbs = s.create_tab_named("Verbs").unwrap();
    s.create_card("gone", "x").unwrap();

    let mut yes = Scripted::new().confirm_with(true);
    assert!(s.delete_tab(&verbs, &mut yes).unwrap());
    assert_eq!(s.state().active_tab_id, general);
    let fronts: Vec<_> = s.state().cards.iter().map(|c| c.front.as_str()).collect();
    assert_eq!(fronts, ["keep-1", "keep-2"]);
    assert!(matches!(
        s.delete_tab(&general, &mut yes),
        Err(CardError::LastTab)
    ));
}
