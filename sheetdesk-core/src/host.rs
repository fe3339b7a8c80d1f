//! # Host
//!
//! The narrow imperative surface through which menu behaviors reach the drawing engine.
//! [`crate::engine::SceneEngine`] is the in-process implementation.

use crate::state::{AppState, BinaryFiles, Element};

/// Whether a scene update should be recorded in undo/redo history.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, strum::AsRefStr)]
pub enum CaptureUpdate {
    /// Record the update as one undoable step.
    #[default]
    Immediately,
    /// Apply without touching history. Used for resets and for loading. Replacing the
    /// elements this way also ends all earlier history.
    Never,
}

/// A replacement for parts of the scene. `None` fields are left untouched.
#[derive(Clone, Debug, Default)]
pub struct SceneUpdate {
    pub elements: Option<Vec<Element>>,
    pub app_state: Option<AppState>,
    pub capture: CaptureUpdate,
}

/// A short-lived notification shown to the user.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Toast {
    pub message: String,
}
impl Toast {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum HostError {
    #[error("scene update rejected: {0}")]
    Rejected(#[from] crate::commands::CommandError),
    #[error("drawing engine unavailable")]
    Unavailable,
}

pub trait SceneHost {
    /// The live (non-deleted) elements, back to front.
    fn scene_elements(&self) -> Vec<Element>;
    fn app_state(&self) -> AppState;
    fn files(&self) -> BinaryFiles;
    /// Replace parts of the scene, as described by `update`.
    /// # Errors
    /// If the engine could not apply the update. The scene is then unchanged.
    fn update_scene(&self, update: SceneUpdate) -> Result<(), HostError>;
    /// Show a toast, replacing any current one. `None` hides it.
    fn set_toast(&self, toast: Option<Toast>);
}
