/// Location of the configuration file.
///
/// The platform config directory is used when it exists
/// (`~/.config/closest-aircraft/` on Linux,
/// `~/Library/Application Support/closest-aircraft/` on macOS).
/// Otherwise the working directory is used, which also keeps
/// `cargo run` workflows simple.

use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
pub const APP_DIR: &str = "closest-aircraft";

/// Configuration file name
pub const CONFIG_FILE: &str = "config.toml";

/// Directory holding `config.toml`.
pub fn config_dir() -> PathBuf {
    config_dir_from(dirs::config_dir())
}

fn config_dir_from(platform_dir: Option<PathBuf>) -> PathBuf {
    match platform_dir {
        Some(dir) => dir.join(APP_DIR),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Full path of the default configuration file.
pub fn default_config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Ensure a directory exists, creating it and all parents if necessary.
/// Returns the path unchanged for chaining.
pub fn ensure_dir(path: &Path) -> std::io::Result<&Path> {
    std::fs::create_dir_all(path)?;
    Ok(path)
}
