use tempfile::TempDir;

use pathway_core::config::Config;

// Lives in its own test binary: it mutates the process environment.
#[test]
fn app_env_vars_override_files() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.toml"), "[cache]\nttl_secs = 120\n").unwrap();
    std::env::set_var("APP_CACHE__TTL_SECS", "42");
    let settings = Config::load_for_env(tmp.path(), "dev").unwrap().settings().unwrap();
    std::env::remove_var("APP_CACHE__TTL_SECS");
    assert_eq!(settings.cache.ttl_secs, 42);
}
