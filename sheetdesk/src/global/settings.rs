use sheetdesk_core::{
    menu::{MenuFeatures, MenuProps, PlusLinks, ThemeChoice},
    sheet::{Clock, LocalClock, UtcClock},
};

const DOCUMENTATION: &str = r#"# Sheetdesk settings. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys and values are case sensitive.

# downloads_dir: where saved sheets are delivered. Defaults to the system downloads folder.
# source: origin written into saved documents.
# timestamps: "local" or "utc", the clock used to name saved sheets.
# developer_tools: offer developer entries, such as Visual Debug, in release builds.

"#;

/// Which clock names the saved sheets.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TimestampZone {
    #[default]
    Local,
    Utc,
}
impl TimestampZone {
    #[must_use]
    pub fn clock(self) -> Box<dyn Clock> {
        match self {
            Self::Local => Box::new(LocalClock),
            Self::Utc => Box::new(UtcClock),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(default)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downloads_dir: Option<std::path::PathBuf>,
    pub source: String,
    pub timestamps: TimestampZone,
    pub collaboration: bool,
    pub developer_tools: bool,
    pub theme: ThemeChoice,
    pub plus_landing_url: String,
    pub plus_app_url: String,
    pub plus_signed_in: bool,
}
impl Default for Settings {
    fn default() -> Self {
        let plus = PlusLinks::default();
        Self {
            downloads_dir: None,
            source: sheetdesk_core::io::JsonSerializer::default().source,
            timestamps: TimestampZone::default(),
            collaboration: false,
            developer_tools: false,
            theme: ThemeChoice::default(),
            plus_landing_url: plus.landing_url,
            plus_app_url: plus.app_url,
            plus_signed_in: plus.signed_in,
        }
    }
}

/// Settings as read at startup, and whether reading them went wrong.
pub struct Loaded {
    pub settings: Settings,
    /// The file exists but couldn't be understood. It should not be overwritten, the user
    /// probably wants to fix it.
    pub failed_to_load: bool,
}

impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Read the user's settings from preferences, or defaults if there are none.
    #[must_use]
    pub fn load() -> Loaded {
        match super::preferences_dir() {
            None => {
                log::warn!("No preferences dir found, using default settings.");
                Loaded {
                    settings: Self::default(),
                    failed_to_load: false,
                }
            }
            Some(mut dir) => {
                dir.push(Self::FILENAME);
                Self::load_or_default(&dir)
            }
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Loaded {
        if !path.exists() {
            return Loaded {
                settings: Self::default(),
                failed_to_load: false,
            };
        }
        let settings: anyhow::Result<Settings> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let settings : Settings = toml::from_str(&string)?;

            Ok(settings)
        };
        match settings {
            Ok(settings) => Loaded {
                settings,
                failed_to_load: false,
            },
            Err(e) => {
                log::warn!("Failed to load settings from {}: {e:#}", path.display());
                Loaded {
                    settings: Self::default(),
                    failed_to_load: true,
                }
            }
        }
    }
    /// Write to the preferences dir.
    /// # Errors
    /// If there is no preferences dir, or writing failed.
    pub fn save(&self) -> anyhow::Result<()> {
        let mut preferences =
            super::preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);

        preferences.push(Self::FILENAME);
        self.save_to(&preferences)
    }
    /// # Errors
    /// If encoding or writing failed.
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let string = DOCUMENTATION.to_owned() + &toml::ser::to_string_pretty(self)?;
        std::fs::write(path, string)?;
        Ok(())
    }
    /// Where saved sheets go. Falls back on the working directory.
    #[must_use]
    pub fn downloads_dir(&self) -> std::path::PathBuf {
        self.downloads_dir
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| ".".into())
    }
    /// Menu configuration. Developer entries are on for debug builds, or when asked for.
    #[must_use]
    pub fn menu_props(&self) -> MenuProps {
        MenuProps {
            collab_enabled: self.collaboration,
            is_collaborating: false,
            theme: self.theme,
            plus: PlusLinks {
                landing_url: self.plus_landing_url.clone(),
                app_url: self.plus_app_url.clone(),
                signed_in: self.plus_signed_in,
            },
            features: MenuFeatures {
                visual_debug: cfg!(debug_assertions) || self.developer_tools,
            },
        }
    }
}
