use gemini_nodes::credentials::{CredentialStore, Credentials};
use gemini_nodes::prelude::*;

mod support;

#[test]
fn missing_file_is_created_with_placeholders() {
    let dir = tempfile::tempdir().unwrap();
    let dispatcher =
        RequestDispatcher::new(support::settings("http://127.0.0.1:9", dir.path())).unwrap();

    assert!(!dispatcher.is_configured());
    let contents = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    assert_eq!(
        contents,
        "{\n    \"GEMINI_API_KEY\": \"your key\",\n    \"PROXY\": \"\"\n}"
    );
}

#[test]
fn configure_persists_and_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.json");
    let mut dispatcher =
        RequestDispatcher::new(support::settings("http://127.0.0.1:9", dir.path())).unwrap();

    assert!(dispatcher.configure("k-1", Some("http://127.0.0.1:7890")).unwrap());
    assert!(dispatcher.is_configured());
    assert_eq!(
        CredentialStore::new(&path).load_or_init().unwrap(),
        Credentials::new("k-1", "http://127.0.0.1:7890")
    );

    // Unchanged values never touch the file.
    std::fs::remove_file(&path).unwrap();
    assert!(!dispatcher.configure("k-1", None).unwrap());
    assert!(!dispatcher.configure("", Some("http://127.0.0.1:7890")).unwrap());
    assert!(!path.exists());

    assert!(dispatcher.configure("", Some("")).unwrap());
    assert_eq!(dispatcher.credentials(), &Credentials::new("k-1", ""));
}

#[test]
fn invalid_proxy_is_rejected_before_saving() {
    let dir = tempfile::tempdir().unwrap();
    let settings = support::settings_with_key("http://127.0.0.1:9", dir.path());
    let mut dispatcher = RequestDispatcher::new(settings).unwrap();

    let err = dispatcher.configure("", Some("http://[::1")).unwrap_err();
    assert!(matches!(err, NodeError::Configuration(_)), "{err}");

    let stored = CredentialStore::new(dir.path().join("config.json"))
        .load_or_init()
        .unwrap();
    assert_eq!(stored, Credentials::new(support::TEST_KEY, ""));
    assert_eq!(dispatcher.credentials(), &stored);
}
