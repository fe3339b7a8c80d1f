pub mod json;

pub use json::{JsonSerializer, ParseError, Provenance, SceneSerializer, SerializeError};

use crate::state::Scene;

#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
}

/// Read a scene document from disk.
/// # Errors
/// If the file can't be read or isn't a readable document.
pub fn read_path(path: impl AsRef<std::path::Path>) -> Result<Scene, FileError> {
    let text = std::fs::read_to_string(path)?;
    Ok(json::parse_scene(&text)?.into_scene())
}

/// Write a scene to disk as a self-contained document.
/// # Errors
/// If encoding or writing fails.
pub fn write_path(
    path: impl AsRef<std::path::Path>,
    scene: &Scene,
    serializer: &dyn SceneSerializer,
) -> Result<(), FileError> {
    let text = serializer.serialize(
        &scene.elements,
        &scene.app_state,
        &scene.files,
        Provenance::Local,
    )?;
    std::fs::write(path, text)?;
    Ok(())
}
