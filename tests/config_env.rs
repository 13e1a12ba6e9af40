// tests/config_env.rs
use saferoom_monitor::config::monitor::{MonitorConfig, ENV_BACKEND_URL, ENV_CONFIG_PATH};
use std::{env, fs};

#[test]
fn load_from_toml_file() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("monitor.toml");
    fs::write(
        &p,
        r#"
backend_url = "http://cam.local:8000/"
page_size = 24
static_dir = "web/build"

[intervals]
activity_ms = 2000
"#,
    )
    .unwrap();

    let cfg = MonitorConfig::load_from(&p).unwrap();
    assert_eq!(cfg.backend_url, "http://cam.local:8000");
    assert_eq!(cfg.page_size, 24);
    assert_eq!(cfg.intervals.activity_ms, 2_000);
    assert_eq!(cfg.intervals.heatmap_ms, 60_000);
    assert!(cfg.static_dir.is_some());

    fs::write(&p, "page_size = \"many\"").unwrap();
    assert!(MonitorConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is not picked up.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_BACKEND_URL);

    // 1) Nothing → defaults
    let cfg = MonitorConfig::load_default().unwrap();
    assert_eq!(cfg.backend_url, "http://127.0.0.1:8000");

    // 2) ./config/monitor.toml
    fs::create_dir_all(tmp.path().join("config")).unwrap();
    fs::write(
        tmp.path().join("config/monitor.toml"),
        r#"backend_url = "http://from-file:8000""#,
    )
    .unwrap();
    assert_eq!(
        MonitorConfig::load_default().unwrap().backend_url,
        "http://from-file:8000"
    );

    // 3) Env path wins; a missing env path is an error
    let p_env = tmp.path().join("other.toml");
    fs::write(&p_env, r#"backend_url = "http://from-env-path:8000""#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    assert_eq!(
        MonitorConfig::load_default().unwrap().backend_url,
        "http://from-env-path:8000"
    );
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(MonitorConfig::load_default().is_err());
    env::remove_var(ENV_CONFIG_PATH);

    // 4) BACKEND_URL overrides whatever the file says
    env::set_var(ENV_BACKEND_URL, "http://override:9000/");
    assert_eq!(
        MonitorConfig::load_default().unwrap().backend_url,
        "http://override:9000"
    );
    env::remove_var(ENV_BACKEND_URL);

    env::set_current_dir(&old).unwrap();
}
