//! Line-oriented front end. Shows the main menu as text and services chosen entries against the
//! in-process engine.

use std::io::Write;

use sheetdesk_core::{
    debug::{DebugStateStore, VisualDebug},
    download::{self, Blob, DirectoryDownloader},
    engine::SceneEngine,
    host::{CaptureUpdate, SceneHost, SceneUpdate},
    io::{self, json::FILE_EXTENSION, JsonSerializer, Provenance, SceneSerializer},
    menu::{self, DefaultItem, MenuAction, MenuEntry, MenuProps, ThemeChoice},
    sheet::{Clock, NewSheet, NewSheetOutcome},
    state::{AppState, Element, ElementKind, Scene, Theme},
};

use crate::global::settings::Settings;

/// Whether to keep reading commands.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W: Write> {
    engine: SceneEngine,
    debug: VisualDebug,
    debug_store: Box<dyn DebugStateStore>,
    downloader: DirectoryDownloader,
    serializer: JsonSerializer,
    clock: Box<dyn Clock>,
    props: MenuProps,
    /// The file `SaveToActiveFile` writes to.
    active_file: Option<std::path::PathBuf>,
    out: W,
}

/// Name an entry can be run by. Case insensitive.
fn entry_name(entry: &MenuEntry) -> Option<&str> {
    match entry {
        MenuEntry::Default { item, .. } => Some(item.as_ref()),
        MenuEntry::Item {
            action: MenuAction::NewSheet,
            ..
        } => Some("NewSheet"),
        MenuEntry::Item {
            action: MenuAction::ToggleVisualDebug,
            ..
        } => Some("VisualDebug"),
        MenuEntry::Item { label, .. } | MenuEntry::Link { label, .. } => Some(*label),
        MenuEntry::Custom(_) | MenuEntry::Separator => None,
    }
}

/// One line summary of the scene, written on every repaint.
fn status_line(engine: &SceneEngine, debug: &VisualDebug, active_file: Option<&std::path::Path>) -> String {
    let (live, theme, background) = engine.queue().read_with(|scene| {
        (
            scene.live_count(),
            scene.app_state.theme,
            scene.app_state.view_background_color.clone(),
        )
    });
    let queue = engine.queue();
    format!(
        "{live} element(s){} | {} | theme {} | background {background} | undo {} redo {} | visual debug {}",
        if queue.is_dirty() { " *" } else { "" },
        active_file.map_or_else(|| "no file".to_owned(), |path| path.display().to_string()),
        theme.as_ref(),
        if queue.can_undo() { "yes" } else { "no" },
        if queue.can_redo() { "yes" } else { "no" },
        match debug.state() {
            Some(state) => format!("on ({} frames)", state.data.len()),
            None => "off".to_owned(),
        },
    )
}

impl<W: Write> Shell<W> {
    pub fn new(settings: &Settings, debug_store: Box<dyn DebugStateStore>, out: W) -> Self {
        let debug = VisualDebug::load(debug_store.as_ref());
        let engine = SceneEngine::new();
        let props = settings.menu_props();
        // The stored choice applies from the start, quietly.
        if let Err(e) = engine.update_scene(SceneUpdate {
            app_state: Some(AppState {
                theme: props.theme.resolve(Theme::Light),
                ..engine.app_state()
            }),
            capture: CaptureUpdate::Never,
            ..SceneUpdate::default()
        }) {
            log::warn!("failed to apply the stored theme: {e:#}");
        }
        Self {
            engine,
            debug,
            debug_store,
            downloader: DirectoryDownloader::new(settings.downloads_dir()),
            serializer: JsonSerializer {
                source: settings.source.clone(),
            },
            clock: settings.timestamps.clock(),
            props,
            active_file: None,
            out,
        }
    }
    #[must_use]
    pub fn engine(&self) -> &SceneEngine {
        &self.engine
    }
    #[must_use]
    pub fn menu(&self) -> Vec<MenuEntry> {
        menu::assemble(&self.props)
    }
    /// Open a scene file, replacing the current scene and history.
    /// # Errors
    /// If the file can't be read as a scene. The current scene is kept.
    pub fn open(&mut self, path: &std::path::Path) -> Result<(), io::FileError> {
        let scene = io::read_path(path)?;
        log::info!("opened {} ({} elements)", path.display(), scene.live_count());
        self.engine.load_scene(scene);
        self.active_file = Some(path.to_owned());
        Ok(())
    }
    /// Run one line of input.
    /// # Errors
    /// Only if output could not be written. Command failures are reported to the user.
    pub fn execute(&mut self, line: &str) -> std::io::Result<Flow> {
        let line = line.trim();
        let (command, argument) = match line.split_once(char::is_whitespace) {
            Some((command, argument)) => (command, Some(argument.trim()).filter(|a| !a.is_empty())),
            None => (line, None),
        };
        let result = match command {
            "" => Ok(()),
            "quit" | "exit" => return Ok(Flow::Quit),
            "menu" => self.print_menu(),
            "status" => self.repaint(),
            "undo" => self.step(SceneEngine::undo, "undo"),
            "redo" => self.step(SceneEngine::redo, "redo"),
            "add" => self.add(argument),
            other => match self.find_entry(other) {
                Some(action) => self.dispatch(action, argument),
                None => Err(anyhow::anyhow!("unknown command {other:?}, try `menu`")),
            },
        };
        if let Err(e) = result {
            log::warn!("{line:?} failed: {e:#}");
            writeln!(self.out, "error: {e:#}")?;
        }
        if let Some(toast) = self.engine.take_toast() {
            writeln!(self.out, "[{}]", toast.message)?;
        }
        Ok(Flow::Continue)
    }
    /// Entries are chosen by their position in `menu` or by name.
    fn find_entry(&self, choice: &str) -> Option<MenuAction> {
        let entries = self.menu();
        if let Ok(number) = choice.parse::<usize>() {
            return entries.get(number.checked_sub(1)?)?.action();
        }
        entries
            .iter()
            .find(|entry| entry_name(entry).is_some_and(|name| name.eq_ignore_ascii_case(choice)))
            .and_then(MenuEntry::action)
    }
    fn print_menu(&mut self) -> anyhow::Result<()> {
        for (number, entry) in self.menu().iter().enumerate() {
            let number = number + 1;
            match entry {
                MenuEntry::Separator => writeln!(self.out, "    ----")?,
                MenuEntry::Default {
                    highlighted,
                    detail,
                    ..
                } => writeln!(
                    self.out,
                    "{number:>3} {}{}{}",
                    entry.label().unwrap_or_default(),
                    detail.as_ref().map(|d| format!(" ({d})")).unwrap_or_default(),
                    if *highlighted { " *" } else { "" },
                )?,
                MenuEntry::Link {
                    label,
                    href,
                    highlighted,
                    ..
                } => writeln!(
                    self.out,
                    "{number:>3} {label} -> {href}{}",
                    if *highlighted { " *" } else { "" }
                )?,
                MenuEntry::Item { label, .. } => writeln!(self.out, "{number:>3} {label}")?,
                MenuEntry::Custom(_) => writeln!(
                    self.out,
                    "{number:>3} {}",
                    entry.label().unwrap_or_default()
                )?,
            }
        }
        Ok(())
    }
    fn repaint(&mut self) -> anyhow::Result<()> {
        let status = status_line(&self.engine, &self.debug, self.active_file.as_deref());
        writeln!(self.out, "{status}")?;
        Ok(())
    }
    fn step(&mut self, step: fn(&SceneEngine) -> bool, name: &str) -> anyhow::Result<()> {
        if !step(&self.engine) {
            writeln!(self.out, "nothing to {name}")?;
        }
        self.repaint()
    }
    fn add(&mut self, kind: Option<&str>) -> anyhow::Result<()> {
        let kind = kind.unwrap_or("rectangle");
        let kind: ElementKind = kind
            .parse()
            .map_err(|_| anyhow::anyhow!("unknown element kind {kind:?}"))?;
        // Cascade new elements so they don't stack exactly.
        #[allow(clippy::cast_precision_loss)]
        let offset = self.engine.queue().read_with(Scene::live_count) as f64 * 20.0;
        self.engine
            .insert_element(Element::new(kind, [offset, offset], [100.0, 80.0]));
        self.repaint()
    }
    /// Perform a menu action. `argument` is the rest of the line the action was chosen by.
    /// # Errors
    /// If the action could not be completed.
    pub fn dispatch(&mut self, action: MenuAction, argument: Option<&str>) -> anyhow::Result<()> {
        log::debug!("dispatching {action:?}");
        match action {
            MenuAction::NewSheet => {
                let outcome = NewSheet {
                    serializer: &self.serializer,
                    downloader: &self.downloader,
                    clock: self.clock.as_ref(),
                }
                .run(Some(&self.engine));
                match outcome {
                    NewSheetOutcome::Reset | NewSheetOutcome::SavedAndReset { .. } => {
                        // The fresh sheet is not the opened file anymore.
                        self.active_file = None;
                        self.repaint()
                    }
                    // Already toasted.
                    NewSheetOutcome::Failed | NewSheetOutcome::NoHost => Ok(()),
                }
            }
            MenuAction::ToggleVisualDebug => {
                let mut repaint_requested = false;
                let enabled = self
                    .debug
                    .toggle(self.debug_store.as_ref(), || repaint_requested = true);
                writeln!(
                    self.out,
                    "visual debug {}",
                    if enabled { "on" } else { "off" }
                )?;
                if repaint_requested {
                    self.repaint()?;
                }
                Ok(())
            }
            MenuAction::SetTheme(choice) => self.set_theme(choice),
            MenuAction::OpenLink(href) => {
                log::info!("open {href}");
                writeln!(self.out, "open {href} in a browser")?;
                Ok(())
            }
            MenuAction::OpenCollabDialog => self.unavailable("Live collaboration"),
            MenuAction::Default(item) => self.default_item(item, argument),
        }
    }
    fn default_item(&mut self, item: DefaultItem, argument: Option<&str>) -> anyhow::Result<()> {
        match item {
            DefaultItem::LoadScene => {
                let path = argument.ok_or_else(|| anyhow::anyhow!("LoadScene needs a path"))?;
                self.open(std::path::Path::new(path))?;
                self.repaint()
            }
            DefaultItem::SaveToActiveFile => {
                let path = self
                    .active_file
                    .clone()
                    .ok_or_else(|| anyhow::anyhow!("no file is open, use Export"))?;
                io::write_path(&path, &self.engine.queue().clone_scene(), &self.serializer)?;
                self.engine.queue().mark_saved(path.clone());
                writeln!(self.out, "saved to {}", path.display())?;
                Ok(())
            }
            DefaultItem::Export => self.export(argument),
            DefaultItem::ClearCanvas => {
                self.engine.update_scene(SceneUpdate {
                    elements: Some(Vec::new()),
                    capture: CaptureUpdate::Immediately,
                    ..SceneUpdate::default()
                })?;
                self.repaint()
            }
            DefaultItem::ToggleTheme => self.set_theme(self.props.theme.cycle()),
            DefaultItem::ChangeCanvasBackground => {
                let color = argument
                    .ok_or_else(|| anyhow::anyhow!("ChangeCanvasBackground needs a color"))?;
                self.engine.update_scene(SceneUpdate {
                    app_state: Some(AppState {
                        view_background_color: color.to_owned(),
                        ..self.engine.app_state()
                    }),
                    capture: CaptureUpdate::Immediately,
                    ..SceneUpdate::default()
                })?;
                self.repaint()
            }
            DefaultItem::SaveAsImage
            | DefaultItem::LiveCollaborationTrigger
            | DefaultItem::CommandPalette
            | DefaultItem::SearchMenu
            | DefaultItem::Help
            | DefaultItem::Socials => self.unavailable(item.label()),
        }
    }
    /// Write the scene to `path`, or deliver it as a download if there is none.
    fn export(&mut self, path: Option<&str>) -> anyhow::Result<()> {
        let scene = self.engine.queue().clone_scene();
        if let Some(path) = path {
            io::write_path(path, &scene, &self.serializer)?;
            writeln!(self.out, "exported to {path}")?;
            return Ok(());
        }
        let name = scene
            .app_state
            .name
            .as_deref()
            .filter(|name| !name.is_empty())
            .unwrap_or("untitled");
        let filename = format!("{name}.{FILE_EXTENSION}");
        let data = self.serializer.serialize(
            &scene.elements,
            &scene.app_state,
            &scene.files,
            Provenance::Local,
        )?;
        download::download(
            &self.downloader,
            Blob::new(data, download::MIME_JSON),
            &filename,
        )?;
        writeln!(
            self.out,
            "exported as {filename} to {}",
            self.downloader.directory().display()
        )?;
        Ok(())
    }
    fn set_theme(&mut self, choice: ThemeChoice) -> anyhow::Result<()> {
        self.props.theme = choice;
        // A preference, not an edit. Stays out of history.
        self.engine.update_scene(SceneUpdate {
            app_state: Some(AppState {
                theme: choice.resolve(Theme::Light),
                ..self.engine.app_state()
            }),
            capture: CaptureUpdate::Never,
            ..SceneUpdate::default()
        })?;
        writeln!(self.out, "theme: {}", choice.as_ref())?;
        Ok(())
    }
    fn unavailable(&mut self, what: &str) -> anyhow::Result<()> {
        log::info!("{what} requested, but isn't available in this host");
        writeln!(self.out, "{what} isn't available here")?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use sheetdesk_core::debug::MemoryDebugStore;

    fn scratch_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("sheetdesk-shell-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
    fn shell(dir: &std::path::Path, developer_tools: bool) -> Shell<Vec<u8>> {
        let settings = Settings {
            downloads_dir: Some(dir.to_owned()),
            developer_tools,
            ..Settings::default()
        };
        Shell::new(&settings, Box::new(MemoryDebugStore::default()), Vec::new())
    }
    fn output(shell: &mut Shell<Vec<u8>>) -> String {
        String::from_utf8(std::mem::take(&mut shell.out)).unwrap()
    }
    fn files_in(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn new_sheet_saves_and_clears() {
        let dir = scratch_dir();
        let mut shell = shell(&dir, false);
        shell.execute("add ellipse").unwrap();
        shell.execute("add text").unwrap();
        output(&mut shell);

        assert_eq!(shell.execute("NewSheet").unwrap(), Flow::Continue);
        let out = output(&mut shell);
        assert!(out.contains("0 element(s)"), "{out}");

        let files = files_in(&dir);
        assert_eq!(files.len(), 1);
        assert!(files[0].starts_with("sheet-") && files[0].ends_with(".excalidraw"));
        assert!(out.contains(&format!("[Saved as {}]", files[0])), "{out}");

        let saved = io::read_path(dir.join(&files[0])).unwrap();
        assert_eq!(saved.live_count(), 2);

        // Neither undo nor redo brings the old drawing back onto the new sheet.
        shell.execute("undo").unwrap();
        assert!(shell.engine().scene_elements().is_empty());
        shell.execute("redo").unwrap();
        assert!(shell.engine().scene_elements().is_empty());
        assert!(output(&mut shell).contains("nothing to redo"));
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn new_sheet_on_empty_canvas() {
        let dir = scratch_dir();
        let mut shell = shell(&dir, false);
        // By position, as listed by `menu`.
        shell.execute("3").unwrap();
        assert!(!output(&mut shell).contains('['));
        assert!(files_in(&dir).is_empty());
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn visual_debug_needs_developer_tools() {
        let dir = scratch_dir();
        let mut release = shell(&dir, false);
        if !cfg!(debug_assertions) {
            release.execute("VisualDebug").unwrap();
            assert!(output(&mut release).contains("unknown command"));
        }

        let mut developer = shell(&dir, true);
        developer.execute("visualdebug").unwrap();
        assert!(output(&mut developer).contains("visual debug on"));
        developer.execute("status").unwrap();
        assert!(output(&mut developer).contains("visual debug on (0 frames)"));
        developer.execute("visualdebug").unwrap();
        assert!(output(&mut developer).contains("visual debug off"));
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn open_edit_save() {
        let dir = scratch_dir();
        let path = dir.join("drawing.excalidraw");
        let mut shell = shell(&dir, false);
        shell.execute("add diamond").unwrap();
        shell
            .execute(&format!("Export {}", path.display()))
            .unwrap();

        let mut shell = self::shell(&dir, false);
        shell
            .execute(&format!("LoadScene {}", path.display()))
            .unwrap();
        assert_eq!(shell.engine().scene_elements().len(), 1);
        shell.execute("add line").unwrap();
        shell.execute("SaveToActiveFile").unwrap();
        assert!(output(&mut shell).contains("saved to"));
        assert_eq!(io::read_path(&path).unwrap().live_count(), 2);
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn save_without_file() {
        let dir = scratch_dir();
        let mut shell = shell(&dir, false);
        shell.execute("savetoactivefile").unwrap();
        assert!(output(&mut shell).contains("error: no file is open"));
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn clear_is_undoable() {
        let dir = scratch_dir();
        let mut shell = shell(&dir, false);
        shell.execute("add").unwrap();
        shell.execute("ClearCanvas").unwrap();
        assert!(shell.engine().scene_elements().is_empty());
        shell.execute("undo").unwrap();
        assert_eq!(shell.engine().scene_elements().len(), 1);
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn stored_theme_applied_at_startup() {
        let dir = scratch_dir();
        let settings = Settings {
            downloads_dir: Some(dir.clone()),
            theme: ThemeChoice::Dark,
            ..Settings::default()
        };
        let shell = Shell::new(&settings, Box::new(MemoryDebugStore::default()), Vec::new());
        assert_eq!(shell.engine().app_state().theme, Theme::Dark);
        assert!(!shell.engine().queue().can_undo());
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn theme_and_background() {
        let dir = scratch_dir();
        let mut shell = shell(&dir, false);
        // System, then light, then dark.
        shell.execute("ToggleTheme").unwrap();
        shell.execute("ToggleTheme").unwrap();
        assert!(output(&mut shell).contains("theme: dark"));
        assert_eq!(shell.engine().app_state().theme, Theme::Dark);
        // Preferences aren't undone.
        assert!(!shell.engine().queue().can_undo());

        shell.execute("ChangeCanvasBackground #123456").unwrap();
        assert_eq!(shell.engine().app_state().view_background_color, "#123456");
        shell.execute("undo").unwrap();
        assert_eq!(shell.engine().app_state().view_background_color, "#ffffff");
        let _ = std::fs::remove_dir_all(dir);
    }
    #[test]
    fn unknown_and_unavailable() {
        let dir = scratch_dir();
        let mut shell = shell(&dir, false);
        shell.execute("help").unwrap();
        assert!(output(&mut shell).contains("Help isn't available here"));
        shell.execute("add teapot").unwrap();
        assert!(output(&mut shell).contains("unknown element kind"));
        shell.execute("99").unwrap();
        assert!(output(&mut shell).contains("unknown command"));
        assert_eq!(shell.execute("quit").unwrap(), Flow::Quit);
        let _ = std::fs::remove_dir_all(dir);
    }
}
