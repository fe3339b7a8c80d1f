//! # Visual debugging
//!
//! A developer overlay, drawn over the canvas by the renderer from the frames collected in
//! [`DebugState`]. Whether it is on is remembered across runs through a [`DebugStateStore`].
//!
//! The state is an explicit context: whoever draws the overlay is handed the [`VisualDebug`],
//! loaded once at startup with [`VisualDebug::load`].

/// What is remembered across runs.
#[derive(serde::Serialize, serde::Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct PersistedDebugState {
    pub enabled: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("malformed debug state: {0}")]
    Malformed(String),
    #[error("no location to store debug state")]
    NoLocation,
}

/// Durable storage for [`PersistedDebugState`].
pub trait DebugStateStore {
    /// `Ok(None)` if nothing was ever saved.
    /// # Errors
    /// If a saved state exists but can't be read.
    fn load(&self) -> Result<Option<PersistedDebugState>, StoreError>;
    /// # Errors
    /// If the state couldn't be written.
    fn save(&self, state: &PersistedDebugState) -> Result<(), StoreError>;
}

/// Keeps the state for the lifetime of the process only.
#[derive(Default)]
pub struct MemoryDebugStore(parking_lot::Mutex<Option<PersistedDebugState>>);
impl MemoryDebugStore {
    #[must_use]
    pub fn new(initial: Option<PersistedDebugState>) -> Self {
        Self(initial.into())
    }
}
impl DebugStateStore for MemoryDebugStore {
    fn load(&self) -> Result<Option<PersistedDebugState>, StoreError> {
        Ok(*self.0.lock())
    }
    fn save(&self, state: &PersistedDebugState) -> Result<(), StoreError> {
        *self.0.lock() = Some(*state);
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DebugShape {
    Line { from: [f64; 2], to: [f64; 2] },
    Point([f64; 2]),
}
#[derive(Clone, PartialEq, Debug)]
pub struct DebugElement {
    pub color: String,
    pub shape: DebugShape,
    /// Kept through [`VisualDebug::clear_transient`].
    pub permanent: bool,
}
/// One frame worth of overlay.
pub type DebugFrame = Vec<DebugElement>;

#[derive(Clone, Default, PartialEq, Debug)]
pub struct DebugState {
    /// Oldest first. The last frame is the one being drawn into.
    pub data: Vec<DebugFrame>,
}

#[derive(Default, Debug)]
pub struct VisualDebug {
    state: Option<DebugState>,
}
impl VisualDebug {
    /// Restore from the store. Unreadable states are treated as disabled.
    #[must_use]
    pub fn load(store: &dyn DebugStateStore) -> Self {
        let enabled = match store.load() {
            Ok(state) => state.is_some_and(|s| s.enabled),
            Err(e) => {
                log::warn!("failed to load visual debug state: {e}");
                false
            }
        };
        Self {
            state: enabled.then(DebugState::default),
        }
    }
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.state.is_some()
    }
    #[must_use]
    pub fn state(&self) -> Option<&DebugState> {
        self.state.as_ref()
    }
    /// Flip the overlay, remember the choice, and ask for a repaint.
    /// Returns whether the overlay is now enabled.
    pub fn toggle(&mut self, store: &dyn DebugStateStore, repaint: impl FnOnce()) -> bool {
        let enabled = if self.state.take().is_some() {
            false
        } else {
            self.state = Some(DebugState::default());
            true
        };
        log::debug!("visual debug {}", if enabled { "on" } else { "off" });
        if let Err(e) = store.save(&PersistedDebugState { enabled }) {
            log::warn!("failed to save visual debug state: {e}");
        }
        repaint();
        enabled
    }
    fn push(&mut self, element: DebugElement) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        match state.data.last_mut() {
            Some(frame) => frame.push(element),
            None => state.data.push(vec![element]),
        }
    }
    pub fn draw_line(&mut self, from: [f64; 2], to: [f64; 2], color: &str, permanent: bool) {
        self.push(DebugElement {
            color: color.to_owned(),
            shape: DebugShape::Line { from, to },
            permanent,
        });
    }
    pub fn draw_point(&mut self, at: [f64; 2], color: &str, permanent: bool) {
        self.push(DebugElement {
            color: color.to_owned(),
            shape: DebugShape::Point(at),
            permanent,
        });
    }
    /// Start a new frame for subsequent drawing.
    pub fn next_frame(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.data.push(Vec::new());
        }
    }
    /// Drop everything not marked permanent, along with frames left empty.
    pub fn clear_transient(&mut self) {
        if let Some(state) = self.state.as_mut() {
            for frame in &mut state.data {
                frame.retain(|e| e.permanent);
            }
            state.data.retain(|frame| !frame.is_empty());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    struct BrokenStore;
    impl DebugStateStore for BrokenStore {
        fn load(&self) -> Result<Option<PersistedDebugState>, StoreError> {
            Err(StoreError::Malformed("garbage".into()))
        }
        fn save(&self, _: &PersistedDebugState) -> Result<(), StoreError> {
            Err(StoreError::NoLocation)
        }
    }

    #[test]
    fn toggle_twice_restores() {
        let store = MemoryDebugStore::default();
        let mut debug = VisualDebug::load(&store);
        assert!(!debug.is_enabled());
        assert!(debug.state().is_none());

        let repaints = std::cell::Cell::new(0);
        assert!(debug.toggle(&store, || repaints.set(repaints.get() + 1)));
        assert_eq!(debug.state(), Some(&DebugState::default()));
        assert_eq!(store.load().unwrap(), Some(PersistedDebugState { enabled: true }));

        assert!(!debug.toggle(&store, || repaints.set(repaints.get() + 1)));
        assert!(debug.state().is_none());
        assert_eq!(store.load().unwrap(), Some(PersistedDebugState { enabled: false }));
        assert_eq!(repaints.get(), 2);
    }
    #[test]
    fn enabled_at_startup() {
        let store = MemoryDebugStore::new(Some(PersistedDebugState { enabled: true }));
        let debug = VisualDebug::load(&store);
        assert!(debug.is_enabled());
        assert!(debug.state().unwrap().data.is_empty());
    }
    #[test]
    fn broken_store_still_toggles() {
        let mut debug = VisualDebug::load(&BrokenStore);
        assert!(!debug.is_enabled());
        let mut repainted = false;
        assert!(debug.toggle(&BrokenStore, || repainted = true));
        assert!(repainted);
    }
    #[test]
    fn drawing() {
        let store = MemoryDebugStore::default();
        let mut debug = VisualDebug::default();
        // Disabled, nothing collected.
        debug.draw_point([0.0, 0.0], "red", false);
        debug.toggle(&store, || ());
        assert!(debug.state().unwrap().data.is_empty());

        debug.draw_point([0.0, 0.0], "red", false);
        debug.next_frame();
        debug.draw_line([0.0, 0.0], [1.0, 1.0], "blue", true);
        debug.draw_point([2.0, 2.0], "green", false);
        assert_eq!(debug.state().unwrap().data.len(), 2);

        debug.clear_transient();
        let data = &debug.state().unwrap().data;
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].len(), 1);
        assert_eq!(data[0][0].color, "blue");
    }
}
