#![warn(clippy::pedantic)]

pub mod global;
pub mod shell;

use anyhow::Result as AnyResult;

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Info)
            .parse_default_env()
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    let global::settings::Loaded {
        settings,
        failed_to_load,
    } = global::settings::Settings::load();
    if failed_to_load {
        log::warn!("Settings could not be read. To prevent data loss, they will not be overwritten.");
    } else if let Err(e) = settings.save() {
        // Writes out defaults for discoverability. Not fatal.
        log::warn!("Failed to save settings: {e:#}");
    }

    let stdout = std::io::stdout();
    let mut shell = shell::Shell::new(
        &settings,
        Box::new(global::debug_store::TomlDebugStore::in_preferences()),
        stdout.lock(),
    );

    // Args are a simple list of paths to open at startup. The first that opens wins.
    let paths: Vec<std::path::PathBuf> = std::env::args_os().skip(1).map(Into::into).collect();
    let loading_succeeded = paths.is_empty()
        || paths.iter().any(|path| match shell.open(path) {
            Ok(()) => true,
            Err(e) => {
                log::error!("failed to open file {path:?}: {e:#}");
                false
            }
        });
    if !loading_succeeded {
        log::warn!("none of the given files could be opened, starting with an empty sheet");
    }

    shell.execute("status")?;
    if has_term {
        shell.execute("menu")?;
    }
    for line in std::io::stdin().lines() {
        if shell.execute(&line?)? == shell::Flow::Quit {
            break;
        }
    }
    Ok(())
}
