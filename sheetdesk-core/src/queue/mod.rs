//! Command Queue
//!
//! The queue owns a [`Scene`] along with its history. History is a tree, where undoing and then
//! making a new change starts a new branch rather than discarding the undone one.
//! "First child" represents earlier series of commands that were undone, "last" is the most recent.
//!
//! Changes can be made two ways: [`SceneQueue::write_with`] records every change as a command,
//! while [`SceneQueue::write_uncaptured`] mutates the scene directly and leaves history as-is.
//! Uncaptured changes are never undone, and history recorded before one is only replayed
//! where it still matches the scene.

use std::sync::Arc;

use crate::{
    commands::{self, CommandConsumer, DoUndo},
    state::Scene,
};

pub mod writer;

struct SceneQueueInner {
    command_tree: slab_tree::Tree<commands::Command>,
    root: slab_tree::NodeId,
    /// Most recent command reflected by `scene`.
    present: slab_tree::NodeId,
    /// Where in history the scene was last saved, if ever.
    saved_at: Option<slab_tree::NodeId>,
    /// Set by uncaptured writes, as those aren't visible in history.
    modified_outside_history: bool,
    scene: Scene,
}
impl SceneQueueInner {
    fn new(scene: Scene) -> Self {
        let mut command_tree = slab_tree::Tree::new();
        let root = command_tree.set_root(commands::Command::Dummy);
        Self {
            command_tree,
            root,
            present: root,
            saved_at: None,
            modified_outside_history: false,
            scene,
        }
    }
    /// Append a command as the newest child of the present, and make it the present.
    fn push_history(&mut self, command: commands::Command) {
        let Some(mut present) = self.command_tree.get_mut(self.present) else {
            // Never trimmed, so this is a broken tree. Refuse to write rather than
            // attaching the command somewhere it doesn't belong.
            log::error!("present node {:?} missing from history", self.present);
            return;
        };
        self.present = present.append(command).node_id();
    }
    /// Drop all history, keeping the scene. The present becomes a fresh root.
    fn forget_history(&mut self) {
        let mut command_tree = slab_tree::Tree::new();
        let root = command_tree.set_root(commands::Command::Dummy);
        self.command_tree = command_tree;
        self.root = root;
        self.present = root;
        self.saved_at = None;
    }
    fn undo_one(&mut self) -> bool {
        let Self {
            command_tree,
            root,
            present,
            scene,
            ..
        } = self;
        loop {
            if *present == *root {
                return false;
            }
            let Some(node) = command_tree.get(*present) else {
                log::error!("present node {present:?} missing from history");
                return false;
            };
            let Some(parent) = node.parent().map(|parent| parent.node_id()) else {
                return false;
            };
            let command = node.data();
            if let Err(e) = scene.apply(DoUndo::Undo(command)) {
                log::warn!("skipped undo of stale history entry: {e}");
            }
            *present = parent;
            // Save markers don't count as a step of their own.
            if !is_save_marker(command) {
                return true;
            }
        }
    }
    fn redo_one(&mut self) -> bool {
        let Self {
            command_tree,
            present,
            scene,
            ..
        } = self;
        loop {
            let Some(node) = command_tree.get(*present) else {
                log::error!("present node {present:?} missing from history");
                return false;
            };
            let Some(next) = node.last_child() else {
                return false;
            };
            let command = next.data();
            if let Err(e) = scene.apply(DoUndo::Do(command)) {
                log::warn!("skipped redo of stale history entry: {e}");
            }
            *present = next.node_id();
            if !is_save_marker(command) {
                return true;
            }
        }
    }
}
fn is_save_marker(command: &commands::Command) -> bool {
    matches!(command.meta(), Some(commands::MetaCommand::Save(_)))
}

/// A scene and its history. Cloning gives another handle to the same queue.
#[derive(Clone)]
pub struct SceneQueue {
    inner: Arc<parking_lot::RwLock<SceneQueueInner>>,
}
impl Default for SceneQueue {
    fn default() -> Self {
        Self::from_scene(Scene::default())
    }
}
impl SceneQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Create a queue from data, without a history.
    #[must_use]
    pub fn from_scene(scene: Scene) -> Self {
        Self {
            inner: Arc::new(SceneQueueInner::new(scene).into()),
        }
    }
    /// Locks the queue for writing commands during the span of the closure, where each modification of the scene is tracked
    /// by the queue. If multiple commands are written, they will be written in order as a single Atoms scope.
    pub fn write_with<F, T>(&self, write: F) -> T
    where
        F: FnOnce(&mut writer::SceneQueueWriter<'_>) -> T,
    {
        let lock = self.inner.write();
        let mut writer = writer::SceneQueueWriter {
            lock,
            commands: smallvec::SmallVec::new(),
        };
        // Panic safe - the writer's Drop impl records whatever was written so far.
        write(&mut writer)
    }
    /// Swap in a new scene, discarding all history.
    pub fn reset(&self, scene: Scene) {
        *self.inner.write() = SceneQueueInner::new(scene);
    }
    /// Mutate the scene without recording history.
    pub fn write_uncaptured<F, T>(&self, write: F) -> T
    where
        F: FnOnce(&mut Scene) -> T,
    {
        let mut lock = self.inner.write();
        lock.modified_outside_history = true;
        write(&mut lock.scene)
    }
    /// Mutate the scene without recording history, and cut off all history before it.
    /// For changes replacing so much of the scene that earlier commands could only
    /// resurrect what was replaced.
    pub fn write_detached<F, T>(&self, write: F) -> T
    where
        F: FnOnce(&mut Scene) -> T,
    {
        let mut lock = self.inner.write();
        lock.forget_history();
        lock.modified_outside_history = true;
        write(&mut lock.scene)
    }
    /// Inspect the scene as it is at this moment.
    pub fn read_with<F, T>(&self, read: F) -> T
    where
        F: FnOnce(&Scene) -> T,
    {
        read(&self.inner.read().scene)
    }
    #[must_use]
    pub fn clone_scene(&self) -> Scene {
        self.read_with(Scene::clone)
    }
    /// Step back through history. Returns the number of steps actually taken.
    pub fn undo_n(&self, num: usize) -> usize {
        let mut lock = self.inner.write();
        (0..num).take_while(|_| lock.undo_one()).count()
    }
    /// Step forward through the most recent branch. Returns the number of steps actually taken.
    pub fn redo_n(&self, num: usize) -> usize {
        let mut lock = self.inner.write();
        (0..num).take_while(|_| lock.redo_one()).count()
    }
    pub fn undo(&self) -> bool {
        self.undo_n(1) == 1
    }
    pub fn redo(&self) -> bool {
        self.redo_n(1) == 1
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        let lock = self.inner.read();
        lock.present != lock.root
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        let lock = self.inner.read();
        lock.command_tree
            .get(lock.present)
            .is_some_and(|node| node.last_child().is_some())
    }
    /// Note in history that the scene was written to `path`.
    pub fn mark_saved(&self, path: std::path::PathBuf) {
        let mut lock = self.inner.write();
        lock.push_history(commands::MetaCommand::Save(path).into());
        let present = lock.present;
        lock.saved_at = Some(present);
        lock.modified_outside_history = false;
    }
    /// Whether the scene differs from the last save, as far as history can tell.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        let lock = self.inner.read();
        lock.modified_outside_history || lock.saved_at != Some(lock.present)
    }
}
