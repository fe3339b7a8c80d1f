//! Global singletons and user preferences.

pub mod debug_store;
pub mod settings;

/// Directory holding this application's preferences, if the platform has one.
#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}
