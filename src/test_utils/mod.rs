//! Test utilities for the exporter
//!
//! Helpers for building fake game installations in temporary directories and
//! for enabling log output while running tests.
//!
//! # Example
//!
//! ```rust,no_run
//! use factorio_export::test_utils::TestInstallation;
//!
//! let installation = TestInstallation::new();
//! installation.write_base("1.1.80");
//! installation.write_mod("bobplates", "1.1.5", &["? FNEI"]);
//!
//! let config = installation.config();
//! assert!(config.factorio_directory.join("data/base/info.json").exists());
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;
use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use zip::write::SimpleFileOptions;

use crate::config::ExportConfig;
use crate::factorio::GAME_BINARY;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. The given level wins, otherwise
/// `RUST_LOG` is used. Without either, tests stay silent.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true) // show targets like "factorio" or "reducer"
            .with_thread_ids(false)
            .try_init();
    });
}

/// A fake game installation inside a temporary directory.
///
/// The directory is removed when the installation is dropped.
pub struct TestInstallation {
    temp: TempDir,
}

impl Default for TestInstallation {
    fn default() -> Self {
        Self::new()
    }
}

impl TestInstallation {
    /// Create the directory layout with an empty game binary.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be written.
    #[must_use]
    pub fn new() -> Self {
        let installation = Self {
            temp: TempDir::new().expect("Failed to create temp dir"),
        };
        let config = installation.config();

        let binary = config.factorio_directory.join(GAME_BINARY);
        std::fs::create_dir_all(binary.parent().expect("binary has a parent")).expect("Failed to create bin");
        std::fs::write(&binary, "").expect("Failed to write binary");
        std::fs::create_dir_all(config.factorio_directory.join("data")).expect("Failed to create data");
        std::fs::create_dir_all(&config.mods_directory).expect("Failed to create mods");
        std::fs::create_dir_all(&config.dump_mod_directory).expect("Failed to create dump mod");
        installation
    }

    /// Root of the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// A configuration pointing all directories into the installation.
    #[must_use]
    pub fn config(&self) -> ExportConfig {
        let root = self.temp.path();
        ExportConfig {
            factorio_directory: root.join("factorio"),
            mods_directory: root.join("mods"),
            instances_directory: root.join("instances"),
            data_directory: root.join("data"),
            dump_mod_directory: root.join("dump"),
            number_of_instances: 2,
            max_attempts: 2,
            retry_delay_ms: 1,
            ..ExportConfig::default()
        }
    }

    /// Write [`Self::config`] as `config.toml` and return its path.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn write_config(&self) -> PathBuf {
        let path = self.temp.path().join("config.toml");
        let content = toml::to_string(&self.config()).expect("Failed to serialize config");
        std::fs::write(&path, content).expect("Failed to write config.toml");
        path
    }

    /// Write the info.json of the base mod.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    pub fn write_base(&self, version: &str) {
        write_base(&self.config().factorio_directory, version);
    }

    /// Write a zipped mod into the mods directory.
    ///
    /// # Panics
    ///
    /// Panics if the zip cannot be written.
    pub fn write_mod(&self, name: &str, version: &str, dependencies: &[&str]) {
        write_mod_zip(&self.config().mods_directory, name, version, dependencies);
    }
}

/// Write the info.json of the base mod into a fake game installation.
///
/// # Panics
///
/// Panics if the file cannot be written.
pub fn write_base(factorio_directory: &Path, version: &str) {
    let directory = factorio_directory.join("data").join("base");
    std::fs::create_dir_all(&directory).expect("Failed to create base mod directory");
    let info = serde_json::json!({"name": "base", "version": version, "title": "Base Mod"});
    std::fs::write(directory.join("info.json"), info.to_string()).expect("Failed to write info.json");
}

/// Write a mod zip `<name>_<version>.zip` containing an info.json.
///
/// # Panics
///
/// Panics if the zip cannot be written.
pub fn write_mod_zip(mods_directory: &Path, name: &str, version: &str, dependencies: &[&str]) {
    std::fs::create_dir_all(mods_directory).expect("Failed to create mods directory");
    let path = mods_directory.join(format!("{name}_{version}.zip"));
    let file = std::fs::File::create(path).expect("Failed to create zip");
    let mut writer = zip::ZipWriter::new(file);

    let info = serde_json::json!({
        "name": name,
        "version": version,
        "title": format!("The {name} mod"),
        "author": "Tester",
        "dependencies": dependencies,
    });
    let folder = format!("{name}_{version}");
    writer
        .start_file(format!("{folder}/info.json"), SimpleFileOptions::default())
        .expect("Failed to start info.json");
    writer.write_all(info.to_string().as_bytes()).expect("Failed to write info.json");
    writer
        .start_file(format!("{folder}/data.lua"), SimpleFileOptions::default())
        .expect("Failed to start data.lua");
    writer.write_all(b"-- nothing").expect("Failed to write data.lua");
    writer.finish().expect("Failed to finish zip");
}
