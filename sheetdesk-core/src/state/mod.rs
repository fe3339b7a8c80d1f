//! # State
//!
//! The data making up a drawing: its elements, the editor's [`AppState`], and the binary
//! files the elements refer to. Mutation goes through the [`crate::queue`], which keeps
//! track of history.

pub mod app_state;
pub mod element;
pub mod files;
pub mod writer;

pub use app_state::{AppState, ResetAppStateDelta, Theme};
pub use element::{Element, ElementId, ElementKind};
pub use files::{BinaryFiles, FileId, FileResource};

#[derive(Clone, Default, Debug, PartialEq)]
pub struct Scene {
    /// In z-order, back to front. May contain soft-deleted elements.
    pub elements: Vec<Element>,
    pub app_state: AppState,
    pub files: BinaryFiles,
}
impl Scene {
    /// Position of the element with the given ID, deleted or not.
    #[must_use]
    pub fn position_of(&self, id: &ElementId) -> Option<usize> {
        self.elements.iter().position(|e| &e.id == id)
    }
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.elements.iter().filter(|e| e.is_live()).count()
    }
}
