//! Remembers whether the visual debug overlay was on, as a small TOML file next to the settings.

use sheetdesk_core::debug::{DebugStateStore, PersistedDebugState, StoreError};

pub struct TomlDebugStore {
    path: Option<std::path::PathBuf>,
}
impl TomlDebugStore {
    const FILENAME: &'static str = "visual-debug.toml";
    /// Store in the preferences dir. If there is none, every access fails with
    /// [`StoreError::NoLocation`].
    #[must_use]
    pub fn in_preferences() -> Self {
        Self {
            path: super::preferences_dir().map(|dir| dir.join(Self::FILENAME)),
        }
    }
    #[must_use]
    pub fn at(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }
}
impl DebugStateStore for TomlDebugStore {
    fn load(&self) -> Result<Option<PersistedDebugState>, StoreError> {
        let path = self.path.as_ref().ok_or(StoreError::NoLocation)?;
        let string = match std::fs::read_to_string(path) {
            Ok(string) => string,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        toml::from_str(&string)
            .map(Some)
            .map_err(|e| StoreError::Malformed(e.to_string()))
    }
    fn save(&self, state: &PersistedDebugState) -> Result<(), StoreError> {
        let path = self.path.as_ref().ok_or(StoreError::NoLocation)?;
        if let Some(parent) = path.parent() {
            // Not recursive, same as settings.
            let _ = std::fs::DirBuilder::new().create(parent);
        }
        let string = toml::to_string(state).map_err(|e| StoreError::Malformed(e.to_string()))?;
        std::fs::write(path, string)?;
        Ok(())
    }
}
