//! # Commands
//!
//! Commands are the way the scene is modified while keeping history. Every captured change
//! is recorded as a command by a [`crate::state::writer::SceneWriter`], and can be walked
//! backwards and forwards by the [`crate::queue`].
//!
//! Changes made with [`crate::host::CaptureUpdate::Never`] bypass commands entirely, so
//! recorded commands may come to describe a state that no longer exists. Consumers report
//! that as [`CommandError::MismatchedState`] instead of applying it.

use crate::state::{AppState, Element};

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("command constructed for a state that does not match the current state")]
    MismatchedState,
    #[error("resource referenced by the command is not found")]
    UnknownResource,
}
pub trait CommandConsumer<C> {
    /// Apply a single command. If this generates an error,
    /// the state of `self` should *not* be observably changed.
    fn apply(&mut self, command: DoUndo<'_, C>) -> Result<(), CommandError>;
}

#[derive(Clone, Debug)]
pub enum ElementCommand {
    Inserted {
        index: usize,
        element: Box<Element>,
    },
    Removed {
        index: usize,
        element: Box<Element>,
    },
    Changed {
        index: usize,
        from: Box<Element>,
        to: Box<Element>,
    },
}
#[derive(Clone, Debug)]
pub enum AppStateCommand {
    Changed {
        from: Box<AppState>,
        to: Box<AppState>,
    },
}

#[derive(Clone, Debug)]
pub enum ScopeType {
    /// Commands are grouped because they were individual parts in part of a single, larger operation.
    Atoms,
    /// A writer panicked mid write. The commands contained may be part of an incomplete operation,
    /// but are still tracked so history matches the state.
    WritePanic,
}
/// Commands about commands!
#[derive(Clone, Debug)]
pub enum MetaCommand {
    /// Many commands treated as one, as far as the user can tell.
    Scope(ScopeType, Box<[Command]>),
    /// The scene was written to disk. Undoing this does nothing, but it marks
    /// where in history the file on disk stands.
    Save(std::path::PathBuf),
}

#[derive(Clone, Debug)]
pub enum Command {
    Meta(MetaCommand),
    Element(ElementCommand),
    AppState(AppStateCommand),
    // Root of the history tree. Invalid anywhere else.
    Dummy,
}
impl From<MetaCommand> for Command {
    fn from(value: MetaCommand) -> Self {
        Self::Meta(value)
    }
}
impl From<ElementCommand> for Command {
    fn from(value: ElementCommand) -> Self {
        Self::Element(value)
    }
}
impl From<AppStateCommand> for Command {
    fn from(value: AppStateCommand) -> Self {
        Self::AppState(value)
    }
}
impl Command {
    #[must_use]
    pub fn meta(&self) -> Option<&MetaCommand> {
        match self {
            Self::Meta(m) => Some(m),
            _ => None,
        }
    }
}

#[derive(PartialEq, Eq, Debug)]
pub enum DoUndo<'c, T> {
    Do(&'c T),
    Undo(&'c T),
}
// Derive would needlessly require `T: Copy`.
impl<T> Clone for DoUndo<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T> Copy for DoUndo<'_, T> {}
impl<'c, T> DoUndo<'c, T> {
    /// Wrap a different command with the same direction.
    #[must_use]
    pub fn with<'o, O>(&self, other: &'o O) -> DoUndo<'o, O> {
        match self {
            Self::Do(_) => DoUndo::Do(other),
            Self::Undo(_) => DoUndo::Undo(other),
        }
    }
}
