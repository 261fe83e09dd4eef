use league_backend::bootstrap::redact_db_url;
use league_backend::config::AppConfig;
use league_backend::test_support::common::{init_tracing_for_tests, test_config};

#[test]
fn test_tracing_and_config() {
    // Initialize tracing for tests (should not panic)
    init_tracing_for_tests();

    let config = test_config();
    assert!(!config.require_invite_code);
    assert_eq!(config.rules, AppConfig::default().rules);
    assert_eq!(redact_db_url(&config.database_url), "sqlite::memory:");
}
