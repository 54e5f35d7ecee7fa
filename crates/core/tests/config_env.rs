use doctext_core::config;

// Kept alone in this binary: it mutates process environment.
#[test]
fn env_overrides_single_keys_over_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("doctext.toml");
    std::fs::write(&path, "[classification]\nthreshold = 0.5\n\n[server]\ncors = false\n").unwrap();

    std::env::set_var("DOCTEXT__CLASSIFICATION__THRESHOLD", "0.3");
    std::env::set_var("DOCTEXT__SERVER__REQUEST_TIMEOUT_SECS", "5");
    let cfg = config::load(Some(path.to_str().unwrap())).unwrap();
    std::env::remove_var("DOCTEXT__CLASSIFICATION__THRESHOLD");
    std::env::remove_var("DOCTEXT__SERVER__REQUEST_TIMEOUT_SECS");

    assert!((cfg.classification.threshold - 0.3).abs() < 1e-6);
    assert!(!cfg.classification.reject_empty_vector);
    assert_eq!(cfg.server.request_timeout_secs, 5);
    assert_eq!(cfg.server.bind, "127.0.0.1:8000");
    assert!(!cfg.server.cors);
}
