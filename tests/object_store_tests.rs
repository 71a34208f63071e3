use bytes::Bytes;
use data_query::object_store::{LocalStore, ObjectStore, ObjectStoreError};

#[tokio::test]
async fn test_local_store_put_returns_location() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let data = Bytes::from("a,b\n1,2\n");
    let location = store.put("upload.csv", data.clone()).await.unwrap();

    assert_eq!(
        std::path::Path::new(&location),
        dir.path().join("upload.csv")
    );
    assert_eq!(std::fs::read(&location).unwrap(), data.to_vec());

    let retrieved = store.get(&location).await.unwrap();
    assert_eq!(retrieved, data);
}

#[tokio::test]
async fn test_local_store_creates_base_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("nested").join("uploads");
    LocalStore::new(&nested).unwrap();
    assert!(nested.is_dir());
}

#[tokio::test]
async fn test_local_store_exists() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let missing = dir.path().join("missing.csv");
    assert!(!store.exists(&missing.to_string_lossy()).await.unwrap());

    let location = store.put("present.csv", Bytes::from("data")).await.unwrap();
    assert!(store.exists(&location).await.unwrap());
}

#[tokio::test]
async fn test_local_store_delete() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let location = store.put("to-delete.csv", Bytes::from("data")).await.unwrap();
    store.delete(&location).await.unwrap();
    assert!(!store.exists(&location).await.unwrap());

    // Deleting again should not error
    store.delete(&location).await.unwrap();
}

#[tokio::test]
async fn test_local_store_get_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path()).unwrap();

    let missing = dir.path().join("missing.csv");
    let result = store.get(&missing.to_string_lossy()).await;
    assert!(matches!(result, Err(ObjectStoreError::NotFound(_))));
}
