//! Integration tests for the storage environments.

use heapdb::storage::{
    BLOCK_SIZE, BlockId, BlockStore, Environment, FileEnvironment, MemoryEnvironment, OpenMode,
    StorageError,
};
use tempfile::tempdir;

fn block_with(first: u8) -> Vec<u8> {
    let mut buf = vec![0u8; BLOCK_SIZE];
    buf[0] = first;
    buf[BLOCK_SIZE - 1] = first;
    buf
}

/// Exercises the store contract the heap layer relies on.
fn check_store_contract<E: Environment>(env: &E) {
    assert!(matches!(env.open_store("t", OpenMode::Existing), Err(e) if e.is_not_found()));

    let mut store = env.open_store("t", OpenMode::CreateNew).unwrap();
    assert_eq!(store.stat().unwrap().entry_count, 0);
    assert!(matches!(
        env.open_store("t", OpenMode::CreateNew),
        Err(StorageError::AlreadyExists { .. })
    ));
    assert!(matches!(
        env.open_store("../t", OpenMode::CreateNew),
        Err(StorageError::InvalidName { .. })
    ));

    for n in 1..=3u32 {
        store.put(BlockId::new(n), &block_with(n as u8 * 10)).unwrap();
    }
    assert_eq!(store.stat().unwrap().entry_count, 3);

    // Overwrite keeps the count
    store.put(BlockId::new(2), &block_with(99)).unwrap();
    assert_eq!(store.stat().unwrap().entry_count, 3);

    let mut buf = vec![0u8; BLOCK_SIZE];
    for (n, expected) in [(1, 10u8), (2, 99), (3, 30)] {
        store.get(BlockId::new(n), &mut buf).unwrap();
        assert_eq!(buf, block_with(expected));
    }
    store.sync().unwrap();

    assert!(matches!(
        store.get(BlockId::new(4), &mut buf),
        Err(StorageError::BlockNotFound(_))
    ));
    assert!(matches!(
        store.put(BlockId::new(0), &buf),
        Err(StorageError::InvalidBlockId(_))
    ));
    assert!(matches!(
        store.put(BlockId::new(1), &buf[..100]),
        Err(StorageError::InvalidBufferSize { .. })
    ));
    drop(store);

    // A second handle sees the same blocks
    let store = env.open_store("t", OpenMode::Existing).unwrap();
    assert_eq!(store.stat().unwrap().entry_count, 3);
    drop(store);

    env.remove_store("t").unwrap();
    assert!(matches!(env.open_store("t", OpenMode::Existing), Err(e) if e.is_not_found()));
    assert!(env.remove_store("t").unwrap_err().is_not_found());
}

#[test]
fn test_memory_environment_contract() {
    check_store_contract(&MemoryEnvironment::new());
}

#[test]
fn test_file_environment_contract() {
    let dir = tempdir().unwrap();
    check_store_contract(&FileEnvironment::open(dir.path()).unwrap());
}

#[test]
fn test_file_environment_persists_across_reopen() {
    let dir = tempdir().unwrap();
    {
        let env = FileEnvironment::open(dir.path()).unwrap();
        let mut store = env.open_store("persist", OpenMode::CreateNew).unwrap();
        store.put(BlockId::FIRST, &block_with(7)).unwrap();
        store.put(BlockId::new(2), &block_with(8)).unwrap();
        store.sync().unwrap();
        env.close();
    }

    let env = FileEnvironment::open(dir.path()).unwrap();
    let store = env.open_store("persist", OpenMode::Existing).unwrap();
    assert_eq!(store.stat().unwrap().entry_count, 2);
    let mut buf = vec![0u8; BLOCK_SIZE];
    store.get(BlockId::new(2), &mut buf).unwrap();
    assert_eq!(buf, block_with(8));
}

#[test]
fn test_file_store_rejects_holes() {
    let dir = tempdir().unwrap();
    let env = FileEnvironment::open(dir.path()).unwrap();
    let mut store = env.open_store("t", OpenMode::CreateNew).unwrap();
    assert!(matches!(
        store.put(BlockId::new(2), &block_with(1)),
        Err(StorageError::InvalidBlockId(_))
    ));
}

#[test]
fn test_file_store_detects_truncated_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("bad.db"), [0u8; 100]).unwrap();
    let env = FileEnvironment::open(dir.path()).unwrap();
    assert!(matches!(
        env.open_store("bad", OpenMode::Existing),
        Err(StorageError::Corrupted(_))
    ));
}

#[test]
fn test_closed_environment() {
    let env = MemoryEnvironment::new();
    env.open_store("t", OpenMode::CreateNew).unwrap();
    env.close();
    assert!(env.is_closed());
    assert!(matches!(
        env.open_store("t", OpenMode::Existing),
        Err(StorageError::EnvironmentClosed)
    ));
}
