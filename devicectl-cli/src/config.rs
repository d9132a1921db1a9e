//! Environment loading for devicectl
//!
//! `.env` files are read before argument parsing so that clap's `env`
//! fallbacks (e.g. `DATABASE_URL`) see them. Already-set variables win.

use std::path::PathBuf;

/// Directory holding the user-level `.env` (~/.devicectl)
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".devicectl"))
}

/// Load `.env` from the current directory, then `~/.devicectl/.env`.
///
/// Returns the files that were loaded. Tracing is not initialized yet when
/// this runs, so the caller logs the result.
pub fn load_dotenv() -> Vec<PathBuf> {
    let mut loaded = Vec::new();

    if let Ok(path) = dotenvy::dotenv() {
        loaded.push(path);
    }

    if let Some(env_file) = config_dir().map(|dir| dir.join(".env")) {
        if env_file.exists() && dotenvy::from_path(&env_file).is_ok() {
            loaded.push(env_file);
        }
    }

    loaded
}
