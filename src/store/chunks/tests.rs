use super::*;
use crate::RagError;
use tempfile::TempDir;

fn sample_chunks() -> Vec<String> {
    vec![
        "first chunk of text".to_string(),
        "second chunk, with punctuation!".to_string(),
        "third chunk — unicode és ünïcode ✓".to_string(),
    ]
}

#[test]
fn positional_access() {
    let store = ChunkStore::from_chunks(sample_chunks());

    assert_eq!(store.len(), 3);
    assert_eq!(store.get(0), Some("first chunk of text"));
    assert_eq!(store.get(2), Some("third chunk — unicode és ünïcode ✓"));
    assert_eq!(store.get(3), None);
}

#[test]
fn save_load_round_trip() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("chunks.json");

    let store = ChunkStore::from_chunks(sample_chunks());
    store.save(&path).expect("save succeeds");

    let reloaded = ChunkStore::load(&path).expect("load succeeds");
    assert_eq!(reloaded, store);
}

#[test]
fn empty_store_round_trips() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("chunks.json");

    let store = ChunkStore::from_chunks(Vec::new());
    store.save(&path).expect("save succeeds");

    let reloaded = ChunkStore::load(&path).expect("load succeeds");
    assert!(reloaded.is_empty());
}

#[test]
fn load_rejects_garbage() {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("chunks.json");
    std::fs::write(&path, "{\"not\": \"a list\"}").expect("write file");

    assert!(matches!(ChunkStore::load(&path), Err(RagError::Store(_))));
}

#[test]
fn iter_preserves_order() {
    let store = ChunkStore::from_chunks(sample_chunks());
    let collected: Vec<&str> = store.iter().collect();

    assert_eq!(collected[0], "first chunk of text");
    assert_eq!(collected[2], "third chunk — unicode és ünïcode ✓");
}
