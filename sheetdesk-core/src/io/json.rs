//! # Scene documents
//!
//! The `.excalidraw` format: a pretty-printed JSON object
//! `{type, version, source, elements, appState, files}`.
//! Only live elements are written, and only the parts of the app state that describe the
//! drawing rather than the editor session.

use crate::state::{element, AppState, BinaryFiles, Element};

/// Value of the `type` field.
pub const DOCUMENT_TYPE: &str = "excalidraw";
/// Newest format revision this crate reads and the one it writes.
pub const FORMAT_VERSION: u32 = 2;
pub const FILE_EXTENSION: &str = "excalidraw";

/// The context a snapshot is produced for.
#[derive(Clone, Copy, PartialEq, Eq, Debug, strum::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Provenance {
    /// A self-contained file for the user, embedding the files the drawing uses.
    Local,
    /// Storage which keeps binary files elsewhere.
    Database,
}

/// The subset of [`AppState`] that travels with a document.
#[derive(serde::Serialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAppState {
    pub view_background_color: String,
    pub grid_size: u32,
    pub grid_mode_enabled: bool,
}
impl From<&AppState> for ExportedAppState {
    fn from(state: &AppState) -> Self {
        Self {
            view_background_color: state.view_background_color.clone(),
            grid_size: state.grid_size,
            grid_mode_enabled: state.grid_mode_enabled,
        }
    }
}

/// The app state as found in a document. Other writers leave fields out or set them to
/// `null`, both meaning "default".
#[derive(serde::Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
struct ImportedAppState {
    view_background_color: Option<String>,
    grid_size: Option<u32>,
    grid_mode_enabled: Option<bool>,
}
impl ImportedAppState {
    fn apply_to(self, mut state: AppState) -> AppState {
        if let Some(color) = self.view_background_color {
            state.view_background_color = color;
        }
        if let Some(size) = self.grid_size {
            state.grid_size = size;
        }
        if let Some(enabled) = self.grid_mode_enabled {
            state.grid_mode_enabled = enabled;
        }
        state
    }
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct DocumentOut<'a> {
    #[serde(rename = "type")]
    ty: &'static str,
    version: u32,
    source: &'a str,
    elements: Vec<&'a Element>,
    app_state: ExportedAppState,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<std::collections::BTreeMap<&'a crate::state::FileId, &'a crate::state::FileResource>>,
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct DocumentIn {
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    version: Option<u32>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    elements: Vec<Element>,
    #[serde(default)]
    app_state: Option<ImportedAppState>,
    #[serde(default)]
    files: BinaryFiles,
}

#[derive(thiserror::Error, Debug)]
pub enum SerializeError {
    #[error("failed to encode scene: {0}")]
    Json(#[from] serde_json::Error),
}
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("malformed document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not a scene document (type {0:?})")]
    WrongType(String),
    #[error("document version {0} is newer than supported version {}", FORMAT_VERSION)]
    UnsupportedVersion(u32),
}

/// Serialize a scene into document text.
///
/// Deleted elements are left out. For [`Provenance::Local`], files not referenced by any written
/// element are left out too, and for [`Provenance::Database`] files are omitted altogether.
/// # Errors
/// If any part of the scene fails to encode.
pub fn serialize_as_json(
    elements: &[Element],
    app_state: &AppState,
    files: &BinaryFiles,
    provenance: Provenance,
    source: &str,
) -> Result<String, SerializeError> {
    let elements: Vec<&Element> = elements.iter().filter(|e| e.is_live()).collect();
    let files = match provenance {
        Provenance::Local => Some(
            elements
                .iter()
                .filter_map(|e| e.file_id.as_ref())
                .filter_map(|id| files.get_key_value(id))
                .collect(),
        ),
        Provenance::Database => None,
    };
    let document = DocumentOut {
        ty: DOCUMENT_TYPE,
        version: FORMAT_VERSION,
        source,
        elements,
        app_state: app_state.into(),
        files,
    };
    Ok(serde_json::to_string_pretty(&document)?)
}

/// A document, read back.
#[derive(Clone, Debug)]
pub struct ImportedScene {
    pub source: Option<String>,
    pub elements: Vec<Element>,
    /// Full app state, with fields absent from the document at their defaults.
    pub app_state: AppState,
    pub files: BinaryFiles,
}
impl ImportedScene {
    #[must_use]
    pub fn into_scene(self) -> crate::state::Scene {
        crate::state::Scene {
            elements: self.elements,
            app_state: self.app_state,
            files: self.files,
        }
    }
}

/// Parse document text. The inverse of [`serialize_as_json`].
/// # Errors
/// If the text is not a scene document this crate can read.
pub fn parse_scene(text: &str) -> Result<ImportedScene, ParseError> {
    let document: DocumentIn = serde_json::from_str(text)?;
    if document.ty != DOCUMENT_TYPE {
        return Err(ParseError::WrongType(document.ty));
    }
    // Unversioned documents predate versioning and are readable.
    if let Some(version) = document.version.filter(|&v| v > FORMAT_VERSION) {
        return Err(ParseError::UnsupportedVersion(version));
    }
    let app_state = document
        .app_state
        .unwrap_or_default()
        .apply_to(AppState::default());
    Ok(ImportedScene {
        source: document.source,
        elements: element::non_deleted(&document.elements),
        app_state,
        files: document.files,
    })
}

/// Produces snapshot text from a scene.
pub trait SceneSerializer {
    /// # Errors
    /// If the scene could not be encoded.
    fn serialize(
        &self,
        elements: &[Element],
        app_state: &AppState,
        files: &BinaryFiles,
        provenance: Provenance,
    ) -> Result<String, SerializeError>;
}

/// The standard serializer, stamping documents with the given `source` origin.
#[derive(Clone, Debug)]
pub struct JsonSerializer {
    pub source: String,
}
impl Default for JsonSerializer {
    fn default() -> Self {
        Self {
            source: concat!("sheetdesk/", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}
impl SceneSerializer for JsonSerializer {
    fn serialize(
        &self,
        elements: &[Element],
        app_state: &AppState,
        files: &BinaryFiles,
        provenance: Provenance,
    ) -> Result<String, SerializeError> {
        serialize_as_json(elements, app_state, files, provenance, &self.source)
    }
}
