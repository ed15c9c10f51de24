//! Shared test utilities for integration tests
//!
//! Isolates the environment variables the config loader reads so tests that
//! change them cannot race each other.

use std::sync::Mutex;
use tempfile::TempDir;

/// Global mutex to serialize environment variable access across all tests
static ENV_MUTEX: Mutex<()> = Mutex::new(());

const ISOLATED_VARS: &[&str] = &[
    "HOME",
    "XDG_CONFIG_HOME",
    "XDG_DATA_HOME",
    "PLAYLOG_ENV",
    "PLAYLOG__SERVICE__GAME",
];

/// Environment variable state to restore after test
struct EnvState {
    saved: Vec<(&'static str, Option<String>)>,
}

impl EnvState {
    fn capture() -> Self {
        Self {
            saved: ISOLATED_VARS
                .iter()
                .map(|name| (*name, std::env::var(name).ok()))
                .collect(),
        }
    }

    fn restore(self) {
        for (name, value) in self.saved {
            match value {
                Some(orig) => std::env::set_var(name, orig),
                None => std::env::remove_var(name),
            }
        }
    }
}

/// Run `f` with HOME, XDG_CONFIG_HOME and XDG_DATA_HOME pointing into
/// `test_dir` and every playlog variable cleared. The original environment
/// is restored afterwards.
pub fn with_xdg_env<F, R>(test_dir: &TempDir, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let env_state = EnvState::capture();

    let test_config_home = test_dir.path().join("config-home");
    let test_data_home = test_dir.path().join("data");
    let test_home = test_dir.path().join("home");
    for dir in [&test_config_home, &test_data_home, &test_home] {
        std::fs::create_dir_all(dir).unwrap();
    }

    std::env::set_var("HOME", &test_home);
    std::env::set_var("XDG_CONFIG_HOME", &test_config_home);
    std::env::set_var("XDG_DATA_HOME", &test_data_home);
    std::env::remove_var("PLAYLOG_ENV");
    std::env::remove_var("PLAYLOG__SERVICE__GAME");

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));
    env_state.restore();
    match result {
        Ok(value) => value,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
