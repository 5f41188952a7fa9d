use listing_adapters::FsObjectStore;
use listing_core::adapter::{ObjectStore, StoreError};

#[test]
fn put_move_and_list_round_trip_on_disk() {
    let dir = tempfile::tempdir().expect("tmp");
    let store = FsObjectStore::open(dir.path().join("bucket")).expect("open");

    store.put("staging/response_data_2025-03-01-00-00-00.csv", b"a,b\n").expect("put");
    store.put("response_data_2025-02-28-00-00-00.csv", b"a,b\n").expect("put");
    store.move_object("staging/response_data_2025-03-01-00-00-00.csv",
                      "response_data_2025-03-01-00-00-00.csv")
         .expect("move");

    let keys: Vec<String> = store.list("response_data").expect("list").into_iter().collect();
    assert_eq!(keys,
               vec!["response_data_2025-02-28-00-00-00.csv", "response_data_2025-03-01-00-00-00.csv"]);
    assert!(store.list("staging/").expect("list").is_empty());
    assert_eq!(store.get("response_data_2025-03-01-00-00-00.csv").expect("get"), b"a,b\n");
}

#[test]
fn nested_keys_are_listed_with_slashes() {
    let dir = tempfile::tempdir().expect("tmp");
    let store = FsObjectStore::open(dir.path()).expect("open");
    store.put("landing/2025/a.csv", b"1").expect("put");
    store.put("landing/b.csv", b"2").expect("put");

    let keys: Vec<String> = store.list("landing/").expect("list").into_iter().collect();
    assert_eq!(keys, vec!["landing/2025/a.csv", "landing/b.csv"]);
    assert!(store.exists("landing/2025/a.csv").expect("exists"));
    assert!(!store.exists("landing/2025").expect("directories are not objects"));
}

#[test]
fn missing_objects_and_bad_keys_are_reported() {
    let dir = tempfile::tempdir().expect("tmp");
    let store = FsObjectStore::open(dir.path()).expect("open");

    assert!(matches!(store.get("nope.csv"), Err(StoreError::NotFound(_))));
    assert!(matches!(store.move_object("nope.csv", "dest.csv"), Err(StoreError::NotFound(_))));
    assert!(matches!(store.put("../escape.csv", b""), Err(StoreError::InvalidKey(_))));
    assert!(matches!(store.put(".hidden", b""), Err(StoreError::InvalidKey(_))));
}

#[test]
fn overwriting_put_replaces_content() {
    let dir = tempfile::tempdir().expect("tmp");
    let store = FsObjectStore::open(dir.path()).expect("open");
    store.put("k.csv", b"old").expect("put");
    store.put("k.csv", b"new").expect("put");
    assert_eq!(store.get("k.csv").expect("get"), b"new");
    assert_eq!(store.list("").expect("list").len(), 1);
}
