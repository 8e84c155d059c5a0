use zeroreport_store::{LocalObjectStore, ObjectStore, StoreError};

#[tokio::test]
async fn put_then_get_and_head() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path());

    store
        .put(
            "out",
            "staging/ingest_date=2024-03-07/doc_id=abc/metadata.json",
            b"{\"status\":\"OK\"}".to_vec(),
            "application/json",
        )
        .await
        .unwrap();

    let bytes = store
        .get("out", "staging/ingest_date=2024-03-07/doc_id=abc/metadata.json")
        .await
        .unwrap();
    assert_eq!(bytes, b"{\"status\":\"OK\"}");

    let info = store
        .head("out", "staging/ingest_date=2024-03-07/doc_id=abc/metadata.json")
        .await
        .unwrap();
    assert_eq!(info.size, bytes.len() as u64);
    assert!(info.etag.is_some());

    assert!(
        dir.path()
            .join("out/staging/ingest_date=2024-03-07/doc_id=abc/metadata.json")
            .is_file()
    );
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path());

    let err = store.get("reports", "raw/absent.pdf").await.unwrap_err();
    assert!(err.is_not_found());

    let err = store.head("reports", "raw/absent.pdf").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn directory_is_not_an_object() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("reports/raw/folder.pdf")).unwrap();
    let store = LocalObjectStore::new(dir.path());

    let err = store.head("reports", "raw/folder.pdf").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn overwrite_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path());

    for body in [b"first".to_vec(), b"second".to_vec()] {
        store
            .put("out", "k/metadata.json", body, "application/json")
            .await
            .unwrap();
    }
    assert_eq!(
        store.get("out", "k/metadata.json").await.unwrap(),
        b"second"
    );
}

#[tokio::test]
async fn escaping_key_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path());
    let err = store
        .put("out", "../outside.json", b"x".to_vec(), "application/json")
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidKey(_)));
}

#[tokio::test]
async fn head_etag_changes_when_object_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path());

    store
        .put("reports", "raw/a.pdf", vec![b'x'; 2048], "application/pdf")
        .await
        .unwrap();
    let before = store.head("reports", "raw/a.pdf").await.unwrap();

    store
        .put("reports", "raw/a.pdf", vec![b'x'; 4096], "application/pdf")
        .await
        .unwrap();
    let after = store.head("reports", "raw/a.pdf").await.unwrap();

    assert_eq!(before.size, 2048);
    assert_eq!(after.size, 4096);
    assert!(before.etag.is_some());
    assert_ne!(before.etag, after.etag);
}
