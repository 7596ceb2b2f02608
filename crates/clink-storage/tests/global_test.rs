mod helpers;

use clink_storage::{global, StorageError, StorageRegistry};
use helpers::RecordingStorage;
use std::path::Path;

// The global registry lives for the whole test binary, so everything that
// depends on install order runs in one test.
#[tokio::test]
async fn test_global_registry_lifecycle() {
    assert!(!global::is_installed());
    assert_eq!(global::get_url("s3:a.jpg", &[]).await, "");
    assert!(matches!(
        global::delete("s3:a.jpg").await,
        Err(StorageError::ConfigError(_))
    ));

    let s3 = RecordingStorage::new("s3");
    let mut registry = StorageRegistry::new();
    registry.add_storage("s3", s3.clone()).unwrap();
    registry.set_default_storage("s3").unwrap();

    global::install(registry.clone()).unwrap();
    assert!(global::is_installed());
    assert!(matches!(
        global::install(registry),
        Err(StorageError::ConfigError(_))
    ));

    let c_link = global::create_c_link(Path::new("/tmp/x"), "/a.jpg").await.unwrap();
    assert_eq!(c_link, "s3:a.jpg");
    assert_eq!(global::prepare_c_link("b.jpg").unwrap(), "s3:b.jpg");
    assert_eq!(global::get_url(&c_link, &[]).await, "mock://s3/a.jpg");
    global::upload_by_c_link(Path::new("/tmp/y"), &c_link).await.unwrap();
    global::delete(&c_link).await.unwrap();

    assert_eq!(
        s3.calls(),
        vec![
            "store /a.jpg",
            "get_url s3:a.jpg",
            "store_by_c_link s3:a.jpg",
            "remove s3:a.jpg",
        ]
    );
}
