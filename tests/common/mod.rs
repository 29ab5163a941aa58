use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use mcpbot::config::Config;
use mcpbot::storage::KvStore;

#[allow(dead_code)]
pub fn create_temp_store() -> (KvStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = KvStore::open(tmp.path().join("store")).expect("failed to open store");
    (store, tmp)
}

/// Config whose store lives in `dir` and whose endpoints point at `api_base`
#[allow(dead_code)]
pub fn config_for(dir: &TempDir, api_base: &str) -> Config {
    let mut config = Config::default();
    config.storage.path = Some(dir.path().join("store"));
    config.provider.openai.api_base = api_base.to_string();
    config.provider.gemini.api_base = api_base.to_string();
    config
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}
