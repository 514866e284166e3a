// SPDX-License-Identifier: MPL-2.0
//! Application directory resolution.
//!
//! # Resolution Order
//!
//! 1. **Explicit override** passed to a `_with_override()` function (tests)
//! 2. **CLI arguments** `--data-dir` / `--config-dir`, set via [`init_cli_overrides`]
//! 3. **Environment variables** `COLLAGE_LENS_DATA_DIR` / `COLLAGE_LENS_CONFIG_DIR`
//! 4. **Platform default** via the `dirs` crate, with the app name appended
//!
//! The data directory holds the downloaded background removal model; the
//! config directory holds `settings.toml`.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Application name used for directory naming.
const APP_NAME: &str = "CollageLens";

/// Environment variable to override the data directory.
pub const ENV_DATA_DIR: &str = "COLLAGE_LENS_DATA_DIR";

/// Environment variable to override the config directory.
pub const ENV_CONFIG_DIR: &str = "COLLAGE_LENS_CONFIG_DIR";

static CLI_DATA_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();
static CLI_CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Records the `--data-dir` and `--config-dir` arguments.
///
/// Call once at startup, before any path is resolved. Returns `false` if
/// overrides were already recorded, in which case the first values stay.
pub fn init_cli_overrides(data_dir: Option<PathBuf>, config_dir: Option<PathBuf>) -> bool {
    let data_set = CLI_DATA_DIR.set(data_dir).is_ok();
    let config_set = CLI_CONFIG_DIR.set(config_dir).is_ok();
    data_set && config_set
}

/// Where a directory kind is looked up.
struct DirSource {
    cli: &'static OnceLock<Option<PathBuf>>,
    env_var: &'static str,
    platform: fn() -> Option<PathBuf>,
}

static DATA: DirSource = DirSource {
    cli: &CLI_DATA_DIR,
    env_var: ENV_DATA_DIR,
    platform: dirs::data_dir,
};

static CONFIG: DirSource = DirSource {
    cli: &CLI_CONFIG_DIR,
    env_var: ENV_CONFIG_DIR,
    platform: dirs::config_dir,
};

fn resolve(source: &DirSource, override_path: Option<PathBuf>) -> Option<PathBuf> {
    if let Some(path) = override_path {
        return Some(path);
    }

    if let Some(path) = source.cli.get().and_then(Clone::clone) {
        return Some(path);
    }

    if let Ok(env_path) = std::env::var(source.env_var) {
        if !env_path.is_empty() {
            return Some(PathBuf::from(env_path));
        }
    }

    (source.platform)().map(|mut path| {
        path.push(APP_NAME);
        path
    })
}

/// Returns the application data directory path.
///
/// Platform defaults:
/// - Linux: `~/.local/share/CollageLens/`
/// - macOS: `~/Library/Application Support/CollageLens/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\CollageLens\`
///
/// Returns `None` if the data directory cannot be determined.
pub fn get_app_data_dir() -> Option<PathBuf> {
    resolve(&DATA, None)
}

pub fn get_app_data_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(&DATA, override_path)
}

/// Returns the application config directory path.
///
/// Platform defaults:
/// - Linux: `~/.config/CollageLens/`
/// - macOS: `~/Library/Application Support/CollageLens/`
/// - Windows: `C:\Users\<User>\AppData\Roaming\CollageLens\`
///
/// Returns `None` if the config directory cannot be determined.
pub fn get_app_config_dir() -> Option<PathBuf> {
    resolve(&CONFIG, None)
}

pub fn get_app_config_dir_with_override(override_path: Option<PathBuf>) -> Option<PathBuf> {
    resolve(&CONFIG, override_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests touching env vars must not run concurrently.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    #[test]
    fn platform_defaults_contain_app_name() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::remove_var(ENV_DATA_DIR);
        std::env::remove_var(ENV_CONFIG_DIR);

        for path in [get_app_data_dir(), get_app_config_dir()].into_iter().flatten() {
            assert!(path.to_string_lossy().contains(APP_NAME));
            assert!(path.is_absolute());
        }
    }

    #[test]
    fn override_path_takes_precedence() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_DATA_DIR, "/env/path");

        let override_path = PathBuf::from("/override/path");
        assert_eq!(
            get_app_data_dir_with_override(Some(override_path.clone())),
            Some(override_path.clone())
        );
        assert_eq!(
            get_app_config_dir_with_override(Some(override_path.clone())),
            Some(override_path)
        );

        std::env::remove_var(ENV_DATA_DIR);
    }

    #[test]
    fn env_var_overrides_platform_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_CONFIG_DIR, "/test/config/dir");

        assert_eq!(get_app_config_dir(), Some(PathBuf::from("/test/config/dir")));

        std::env::remove_var(ENV_CONFIG_DIR);
    }

    #[test]
    fn empty_env_var_is_ignored() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(ENV_DATA_DIR, "");

        if let Some(path) = get_app_data_dir() {
            assert!(path.to_string_lossy().contains(APP_NAME));
        }

        std::env::remove_var(ENV_DATA_DIR);
    }
}
