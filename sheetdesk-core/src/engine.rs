//! An in-memory drawing engine, exposing a [`SceneQueue`] through [`SceneHost`].

use crate::{
    host::{CaptureUpdate, HostError, SceneHost, SceneUpdate, Toast},
    queue::SceneQueue,
    state::{element, AppState, BinaryFiles, Element, FileResource, Scene},
};

#[derive(Default)]
pub struct SceneEngine {
    queue: SceneQueue,
    toast: parking_lot::Mutex<Option<Toast>>,
}
impl SceneEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn queue(&self) -> &SceneQueue {
        &self.queue
    }
    /// Replace the scene with a freshly loaded one. History starts over.
    pub fn load_scene(&self, scene: Scene) {
        self.queue.reset(scene);
    }
    /// Add an element on top, as an undoable step.
    pub fn insert_element(&self, element: Element) {
        self.queue.write_with(|writer| {
            writer.scene().push(element);
        });
    }
    /// Attach a binary file. Files are not part of history.
    pub fn add_file(&self, file: FileResource) {
        self.queue.write_uncaptured(|scene| {
            scene.files.insert(file.id.clone(), file);
        });
    }
    pub fn undo(&self) -> bool {
        self.queue.undo()
    }
    pub fn redo(&self) -> bool {
        self.queue.redo()
    }
    /// The current toast, if any.
    #[must_use]
    pub fn toast(&self) -> Option<Toast> {
        self.toast.lock().clone()
    }
    /// Take the current toast, hiding it.
    pub fn take_toast(&self) -> Option<Toast> {
        self.toast.lock().take()
    }
}
impl SceneHost for SceneEngine {
    fn scene_elements(&self) -> Vec<Element> {
        self.queue.read_with(|scene| element::non_deleted(&scene.elements))
    }
    fn app_state(&self) -> AppState {
        self.queue.read_with(|scene| scene.app_state.clone())
    }
    fn files(&self) -> BinaryFiles {
        self.queue.read_with(|scene| scene.files.clone())
    }
    fn update_scene(&self, update: SceneUpdate) -> Result<(), HostError> {
        let SceneUpdate {
            elements,
            app_state,
            capture,
        } = update;
        log::debug!(
            "updating scene (elements: {}, app state: {}, capture: {})",
            elements.as_ref().map_or("kept".to_owned(), |e| e.len().to_string()),
            if app_state.is_some() { "replaced" } else { "kept" },
            capture.as_ref(),
        );
        match capture {
            CaptureUpdate::Immediately => self.queue.write_with(|writer| {
                let mut scene = writer.scene();
                if let Some(elements) = elements {
                    scene.replace_elements(elements);
                }
                if let Some(app_state) = app_state {
                    scene.set_app_state(app_state);
                }
            }),
            // Replaced elements would come back through earlier history, so it goes.
            CaptureUpdate::Never if elements.is_some() => self.queue.write_detached(|scene| {
                if let Some(elements) = elements {
                    scene.elements = elements;
                }
                if let Some(app_state) = app_state {
                    scene.app_state = app_state;
                }
            }),
            CaptureUpdate::Never => self.queue.write_uncaptured(|scene| {
                if let Some(app_state) = app_state {
                    scene.app_state = app_state;
                }
            }),
        }
        Ok(())
    }
    fn set_toast(&self, toast: Option<Toast>) {
        if let Some(toast) = &toast {
            log::info!("toast: {}", toast.message);
        }
        *self.toast.lock() = toast;
    }
}
