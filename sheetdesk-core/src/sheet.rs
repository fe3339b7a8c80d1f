//! # New sheet
//!
//! Stash the current drawing as a downloaded file, then clear the canvas for new work.
//! The clear is the very last step and is not recorded in history, so a failure anywhere
//! before it leaves the drawing as it was, and undo afterwards can't bring the old drawing
//! back onto the fresh sheet.

use crate::{
    download::{self, Blob, DownloadError, Downloader},
    host::{CaptureUpdate, HostError, SceneHost, SceneUpdate, Toast},
    io::{json::FILE_EXTENSION, Provenance, SceneSerializer, SerializeError},
    state::ResetAppStateDelta,
};

/// Shown for any failure, whichever step it came from.
pub const FAILURE_MESSAGE: &str = "Error creating new sheet";

/// Source of wall-clock time.
pub trait Clock {
    fn now(&self) -> chrono::NaiveDateTime;
}
/// Local time of the machine.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalClock;
impl Clock for LocalClock {
    fn now(&self) -> chrono::NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}
#[derive(Clone, Copy, Debug, Default)]
pub struct UtcClock;
impl Clock for UtcClock {
    fn now(&self) -> chrono::NaiveDateTime {
        chrono::Utc::now().naive_utc()
    }
}

/// `sheet-YYYY-MM-DD-HH-MM-SS.excalidraw`, to the whole second.
#[must_use]
pub fn sheet_filename(at: chrono::NaiveDateTime) -> String {
    format!("sheet-{}.{FILE_EXTENSION}", at.format("%Y-%m-%d-%H-%M-%S"))
}

#[derive(thiserror::Error, Debug)]
pub enum NewSheetError {
    #[error("failed to serialize the current sheet")]
    Serialize(#[from] SerializeError),
    #[error("failed to download the current sheet")]
    Download(#[from] DownloadError),
    #[error("failed to reset the scene")]
    Reset(#[from] HostError),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum NewSheetOutcome {
    /// No engine to act on. Nothing happened.
    NoHost,
    /// The canvas was empty, so it was only reset.
    Reset,
    /// The previous drawing was offered as `filename`, then the canvas reset.
    SavedAndReset { filename: String },
    /// Something went wrong and was reported to the user. The scene is unchanged.
    Failed,
}

/// Everything the operation needs besides the engine.
pub struct NewSheet<'a> {
    pub serializer: &'a dyn SceneSerializer,
    pub downloader: &'a dyn Downloader,
    pub clock: &'a dyn Clock,
}
impl NewSheet<'_> {
    /// Save the current drawing if it has any content, then reset the canvas.
    ///
    /// Never fails outwardly: errors are logged and toasted, and reported as
    /// [`NewSheetOutcome::Failed`].
    pub fn run(&self, host: Option<&dyn SceneHost>) -> NewSheetOutcome {
        let Some(host) = host else {
            return NewSheetOutcome::NoHost;
        };
        match self.try_run(host) {
            Ok(Some(filename)) => NewSheetOutcome::SavedAndReset { filename },
            Ok(None) => NewSheetOutcome::Reset,
            Err(e) => {
                log::error!("Error creating new sheet: {:#}", anyhow::Error::new(e));
                host.set_toast(Some(Toast::new(FAILURE_MESSAGE)));
                NewSheetOutcome::Failed
            }
        }
    }
    fn try_run(&self, host: &dyn SceneHost) -> Result<Option<String>, NewSheetError> {
        let elements = host.scene_elements();
        let app_state = host.app_state();
        let files = host.files();

        let saved = if elements.is_empty() {
            None
        } else {
            let data =
                self.serializer
                    .serialize(&elements, &app_state, &files, Provenance::Local)?;
            let filename = sheet_filename(self.clock.now());
            let size = data.len();
            download::download(
                self.downloader,
                Blob::new(data, download::MIME_JSON),
                &filename,
            )?;
            log::info!(
                "saved {} elements ({}) as {filename}",
                elements.len(),
                human_bytes::human_bytes(size as f64)
            );
            host.set_toast(Some(Toast::new(format!("Saved as {filename}"))));
            Some(filename)
        };

        host.update_scene(SceneUpdate {
            elements: Some(Vec::new()),
            app_state: Some(ResetAppStateDelta.apply(app_state)),
            capture: CaptureUpdate::Never,
        })?;
        Ok(saved)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        download::test::RecordingDownloader,
        engine::SceneEngine,
        io::{json, JsonSerializer},
        state::{AppState, BinaryFiles, Element, ElementKind, FileResource, Theme},
    };

    struct FixedClock(chrono::NaiveDateTime);
    impl Clock for FixedClock {
        fn now(&self) -> chrono::NaiveDateTime {
            self.0
        }
    }
    fn example_time() -> chrono::NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|d| d.and_hms_milli_opt(14, 7, 9, 734))
            .unwrap()
    }
    struct FailingSerializer;
    impl SceneSerializer for FailingSerializer {
        fn serialize(
            &self,
            _: &[Element],
            _: &AppState,
            _: &BinaryFiles,
            _: Provenance,
        ) -> Result<String, SerializeError> {
            let err = serde_json::from_str::<u8>("nope").unwrap_err();
            Err(err.into())
        }
    }
    /// Engine that refuses every update.
    struct StuckEngine(SceneEngine);
    impl SceneHost for StuckEngine {
        fn scene_elements(&self) -> Vec<Element> {
            self.0.scene_elements()
        }
        fn app_state(&self) -> AppState {
            self.0.app_state()
        }
        fn files(&self) -> BinaryFiles {
            self.0.files()
        }
        fn update_scene(&self, _: SceneUpdate) -> Result<(), HostError> {
            Err(HostError::Unavailable)
        }
        fn set_toast(&self, toast: Option<Toast>) {
            self.0.set_toast(toast);
        }
    }

    /// Engine with three captured elements, a selection, a file, and a dark theme.
    fn busy_engine() -> SceneEngine {
        let engine = SceneEngine::new();
        let file = FileResource::from_bytes("image/png", b"picture");
        engine.add_file(file.clone());
        let elements = [
            Element::new(ElementKind::Rectangle, [0.0, 0.0], [10.0, 10.0]),
            Element::new(ElementKind::Text, [20.0, 0.0], [50.0, 12.0]),
            Element::new_image(file.id, [0.0, 40.0], [32.0, 32.0]),
        ];
        for element in &elements {
            engine.insert_element(element.clone());
        }
        let mut app_state = engine.app_state();
        app_state.theme = Theme::Dark;
        app_state.selected_element_ids = elements.iter().map(|e| e.id.clone()).collect();
        app_state.selection_element = Some(Box::new(Element::new(
            ElementKind::Selection,
            [0.0; 2],
            [5.0; 2],
        )));
        app_state.resizing_element = Some(Box::new(elements[0].clone()));
        engine
            .update_scene(SceneUpdate {
                app_state: Some(app_state),
                ..SceneUpdate::default()
            })
            .unwrap();
        engine
    }

    #[test]
    fn example_filename() {
        assert_eq!(
            sheet_filename(example_time()),
            "sheet-2024-03-05-14-07-09.excalidraw"
        );
    }
    #[test]
    fn no_host_no_op() {
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &JsonSerializer::default(),
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };
        assert_eq!(new_sheet.run(None), NewSheetOutcome::NoHost);
        assert!(downloader.delivered.lock().is_empty());
    }
    #[test]
    fn saves_then_resets() {
        let engine = busy_engine();
        let before = engine.app_state();
        let files_before = engine.files();
        let elements_before = engine.scene_elements();
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &JsonSerializer::default(),
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };

        let outcome = new_sheet.run(Some(&engine));
        assert_eq!(
            outcome,
            NewSheetOutcome::SavedAndReset {
                filename: "sheet-2024-03-05-14-07-09.excalidraw".into()
            }
        );
        assert_eq!(
            engine.toast().map(|t| t.message).as_deref(),
            Some("Saved as sheet-2024-03-05-14-07-09.excalidraw")
        );

        // Exactly one artifact, released afterwards.
        let delivered = downloader.delivered.lock();
        assert_eq!(delivered.len(), 1);
        let (filename, blob) = &delivered[0];
        assert_eq!(filename, "sheet-2024-03-05-14-07-09.excalidraw");
        assert_eq!(blob.mime, "application/json");
        assert!(downloader.live.lock().is_empty());
        assert_eq!(downloader.revoked.lock().len(), 1);

        // Content reads back as the drawing that was there.
        let imported = json::parse_scene(std::str::from_utf8(&blob.bytes).unwrap()).unwrap();
        assert_eq!(imported.elements, elements_before);
        assert_eq!(imported.files, files_before);
        assert_eq!(
            json::ExportedAppState::from(&imported.app_state),
            json::ExportedAppState::from(&before)
        );

        // Fresh sheet.
        assert!(engine.scene_elements().is_empty());
        let after = engine.app_state();
        assert!(after.selected_element_ids.is_empty());
        assert!(after.resizing_element.is_none());
        assert!(after.selection_element.is_none());
        assert_eq!(after, ResetAppStateDelta.apply(before));
        assert_eq!(after.theme, Theme::Dark);
        assert_eq!(engine.files(), files_before);
    }
    #[test]
    fn undo_does_not_restore() {
        let engine = busy_engine();
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &JsonSerializer::default(),
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };
        new_sheet.run(Some(&engine));
        let after = engine.app_state();

        while engine.undo() {}
        assert!(engine.scene_elements().is_empty());
        assert_eq!(engine.app_state(), after);
    }
    #[test]
    fn undo_then_redo_does_not_restore() {
        let engine = SceneEngine::new();
        engine.insert_element(Element::new(ElementKind::Rectangle, [0.0; 2], [4.0; 2]));
        engine.insert_element(Element::new(ElementKind::Ellipse, [8.0; 2], [4.0; 2]));
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &JsonSerializer::default(),
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };
        assert!(matches!(
            new_sheet.run(Some(&engine)),
            NewSheetOutcome::SavedAndReset { .. }
        ));

        while engine.undo() {}
        while engine.redo() {}
        assert!(engine.scene_elements().is_empty());
        assert!(engine.queue().read_with(|s| s.elements.is_empty()));

        // Work on the new sheet is undoable on its own.
        engine.insert_element(Element::new(ElementKind::Text, [0.0; 2], [1.0; 2]));
        assert!(engine.undo());
        assert!(!engine.undo());
        assert!(engine.scene_elements().is_empty());
    }
    #[test]
    fn empty_scene_only_resets() {
        let engine = SceneEngine::new();
        let mut app_state = engine.app_state();
        app_state.selected_element_ids.insert("ghost".into());
        app_state.selection_element = Some(Box::new(Element::new(
            ElementKind::Selection,
            [0.0; 2],
            [1.0; 2],
        )));
        app_state.resizing_element = Some(Box::new(Element::new(
            ElementKind::Rectangle,
            [0.0; 2],
            [2.0; 2],
        )));
        let untouched = app_state.clone();
        engine
            .update_scene(SceneUpdate {
                app_state: Some(app_state),
                capture: CaptureUpdate::Never,
                ..SceneUpdate::default()
            })
            .unwrap();
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &FailingSerializer,
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };

        // Never reaches the serializer, so its failure can't show.
        assert_eq!(new_sheet.run(Some(&engine)), NewSheetOutcome::Reset);
        assert!(downloader.delivered.lock().is_empty());
        assert!(engine.toast().is_none());
        assert!(engine.scene_elements().is_empty());
        let after = engine.app_state();
        assert!(after.selected_element_ids.is_empty());
        assert!(after.selection_element.is_none());
        assert!(after.resizing_element.is_none());
        assert_eq!(after, ResetAppStateDelta.apply(untouched));
    }
    #[test]
    fn deleted_only_counts_as_empty() {
        let engine = SceneEngine::new();
        let element = Element::new(ElementKind::Diamond, [0.0; 2], [1.0; 2]);
        let id = element.id.clone();
        engine.insert_element(element);
        engine
            .queue()
            .write_with(|w| w.scene().delete(&id))
            .unwrap();
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &JsonSerializer::default(),
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };
        assert_eq!(new_sheet.run(Some(&engine)), NewSheetOutcome::Reset);
        assert!(downloader.delivered.lock().is_empty());
    }
    #[test]
    fn serialize_failure_keeps_scene() {
        let engine = busy_engine();
        let before = engine.queue().clone_scene();
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &FailingSerializer,
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };
        assert_eq!(new_sheet.run(Some(&engine)), NewSheetOutcome::Failed);
        assert_eq!(
            engine.toast().map(|t| t.message).as_deref(),
            Some(FAILURE_MESSAGE)
        );
        assert_eq!(engine.queue().clone_scene(), before);
        assert!(downloader.delivered.lock().is_empty());
    }
    #[test]
    fn download_failure_keeps_scene() {
        let engine = busy_engine();
        let before = engine.queue().clone_scene();
        let downloader = RecordingDownloader {
            fail_trigger: true,
            ..Default::default()
        };
        let new_sheet = NewSheet {
            serializer: &JsonSerializer::default(),
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };
        assert_eq!(new_sheet.run(Some(&engine)), NewSheetOutcome::Failed);
        assert_eq!(engine.queue().clone_scene(), before);
        // Released despite the failure.
        assert!(downloader.live.lock().is_empty());
        assert_eq!(downloader.revoked.lock().len(), 1);
    }
    #[test]
    fn reset_failure_reported() {
        let engine = StuckEngine(busy_engine());
        let files_before = engine.files();
        let downloader = RecordingDownloader::default();
        let new_sheet = NewSheet {
            serializer: &JsonSerializer::default(),
            downloader: &downloader,
            clock: &FixedClock(example_time()),
        };
        assert_eq!(new_sheet.run(Some(&engine)), NewSheetOutcome::Failed);
        // The save went through before the reset failed; the generic message wins.
        assert_eq!(downloader.delivered.lock().len(), 1);
        assert_eq!(
            engine.0.toast().map(|t| t.message).as_deref(),
            Some(FAILURE_MESSAGE)
        );
        assert_eq!(engine.scene_elements().len(), 3);
        assert_eq!(engine.files(), files_before);
    }
}
