//! Loading `bluejay.toml`.

use bluejay::{App, BluejayConfig};
use bluejay_database::InMemoryStore;
use std::io::Write;
use std::sync::Arc;
use tempfile::NamedTempFile;

const FULL: &str = r##"
[settings]
approval_mode = true
llm_rate_limit_per_minute = 30
loop_sleep_seconds = 5
drain_batch_size = 3
parallel_bots = true
database_path = "/tmp/bluejay-test.db"

[settings.classifier]
model = "gpt-4o"
api_key_env = "BLUEJAY_TEST_KEY"
max_attempts = 2

[admin]
bind = "127.0.0.1:9090"

[logging]
json = true

[[bots]]
handle = "helper.bsky.social"
app_password_env = "HELPER_PW"
approval_mode = false
persona = { tone = "dry", emoji_density = 0, formality = 2, humour = 0 }
rate_limit = { max_per_minute = 2, max_per_hour = 20 }
block = { users = ["troll.bsky.social"], phrases = [], hashtags = ["#spam"] }
reply_rules = { allow_unprompted = true, keywords = ["rustlang"] }

[[bots]]
handle = "quiet.bsky.social"
"##;

fn write(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_document() {
    let file = write(FULL);
    let config = BluejayConfig::from_file(file.path()).unwrap();

    let runtime = &config.settings.runtime;
    assert!(*runtime.approval_mode());
    assert_eq!(*runtime.llm_rate_limit_per_minute(), 30);
    assert_eq!(runtime.loop_sleep().as_secs(), 5);
    assert_eq!(*runtime.drain_batch_size(), 3);
    assert!(*runtime.parallel_bots());
    assert_eq!(*runtime.notification_limit(), 50);

    let classifier = &config.settings.classifier;
    assert_eq!(classifier.model(), "gpt-4o");
    assert_eq!(classifier.api_key_env(), "BLUEJAY_TEST_KEY");
    assert_eq!(*classifier.max_attempts(), 2);
    assert_eq!(*classifier.initial_backoff_ms(), 1000);

    assert_eq!(config.admin.bind.as_deref(), Some("127.0.0.1:9090"));
    assert!(config.logging.json);

    let helper = config.bot("helper.bsky.social").unwrap();
    assert_eq!(helper.password_env(), "HELPER_PW");
    assert_eq!(*helper.approval_mode(), Some(false));
    assert_eq!(helper.persona().formality, 2);
    assert_eq!(helper.rate_limit().max_per_minute, 2);
    assert!(helper.reply_rules().search_enabled());

    let quiet = config.bot("quiet.bsky.social").unwrap();
    assert_eq!(quiet.password_env(), "QUIET_BSKY_SOCIAL_APP_PASSWORD");
    assert_eq!(quiet.rate_limit().max_per_hour, 100);
    assert!(quiet.approval_mode().is_none());
    assert!(!quiet.reply_rules().search_enabled());
}

#[test]
fn test_missing_sections_default() {
    let file = write("[[bots]]\nhandle = \"a.bsky.social\"\n");
    let config = BluejayConfig::load(file.path()).unwrap();
    assert_eq!(config.settings.runtime.loop_sleep().as_secs(), 20);
    assert_eq!(config.settings.classifier.model(), "gpt-4o-mini");
    assert!(config.admin.bind.is_none());
    assert!(!config.logging.json);
}

#[test]
fn test_load_rejects_empty_bot_list() {
    let file = write("[settings]\nloop_sleep_seconds = 5\n");
    let err = BluejayConfig::load(file.path()).unwrap_err();
    assert!(err.message.contains("No bots configured"));
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BluejayConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(err.message.contains("absent.toml"));
}

#[test]
fn test_malformed_file_is_config_error() {
    let file = write("[settings]\nloop_sleep_seconds = \"soon\"\n");
    let err = BluejayConfig::from_file(file.path()).unwrap_err();
    assert!(err.message.contains("Failed to parse configuration"));
}

#[test]
fn test_missing_password_fails_before_any_worker() {
    let file = write(FULL);
    let config = BluejayConfig::from_file(file.path()).unwrap();
    let err = config
        .validate_credentials(|name| (name == "BLUEJAY_TEST_KEY").then(|| "k".to_string()))
        .unwrap_err();
    assert!(err.message.contains("HELPER_PW"));
}

#[test]
fn test_admin_service_covers_every_bot() {
    let file = write(FULL);
    let config = BluejayConfig::from_file(file.path()).unwrap();
    let app = App::with_store(config, Arc::new(InMemoryStore::new()));
    let admin = app.admin(&[]);

    let mut handles = admin.bot_handles();
    handles.sort();
    assert_eq!(handles, vec!["helper.bsky.social", "quiet.bsky.social"]);
    assert!(app.bot("nobody.bsky.social").is_err());
}

#[test]
fn test_shipped_example_parses() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../bluejay.example.toml");
    let config = BluejayConfig::from_file(&path).unwrap();
    config.validate_bots().unwrap();
    assert_eq!(config.bots.len(), 2);
    assert!(config.bots[1].reply_rules().search_enabled());
}
