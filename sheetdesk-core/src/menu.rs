//! # Main menu
//!
//! The application menu, as data. Hosts render the entries however they like and hand the
//! [`MenuAction`] of a chosen entry back for dispatch.

use crate::state::Theme;

/// Theme as offered to the user, where following the system is an option.
#[derive(
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::EnumString,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Debug,
    Default,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ThemeChoice {
    #[default]
    System,
    Light,
    Dark,
}
impl ThemeChoice {
    /// The next choice in the light → dark → system cycle.
    #[must_use]
    pub fn cycle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::System,
            Self::System => Self::Light,
        }
    }
    /// Resolve to a concrete theme, given what the system prefers.
    #[must_use]
    pub fn resolve(self, system: Theme) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::System => system,
        }
    }
}

/// Stock items whose behavior belongs to the host.
#[derive(strum::AsRefStr, strum::EnumString, Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum DefaultItem {
    LoadScene,
    SaveToActiveFile,
    Export,
    SaveAsImage,
    LiveCollaborationTrigger,
    CommandPalette,
    SearchMenu,
    Help,
    ClearCanvas,
    Socials,
    ToggleTheme,
    ChangeCanvasBackground,
}
impl DefaultItem {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadScene => "Open",
            Self::SaveToActiveFile => "Save to...",
            Self::Export => "Export",
            Self::SaveAsImage => "Export image...",
            Self::LiveCollaborationTrigger => "Live collaboration...",
            Self::CommandPalette => "Command palette",
            Self::SearchMenu => "Find on canvas",
            Self::Help => "Help",
            Self::ClearCanvas => "Reset the canvas",
            Self::Socials => "Socials",
            Self::ToggleTheme => "Theme",
            Self::ChangeCanvasBackground => "Canvas background",
        }
    }
}

#[derive(strum::AsRefStr, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Icon {
    Plus,
    Logo,
    Login,
    Eye,
}

/// What choosing an entry asks for.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MenuAction {
    Default(DefaultItem),
    /// Save the drawing if non-empty, then start over.
    NewSheet,
    ToggleVisualDebug,
    OpenCollabDialog,
    SetTheme(ThemeChoice),
    OpenLink(String),
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum CustomItem {
    LanguageList,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum MenuEntry {
    Default {
        item: DefaultItem,
        highlighted: bool,
        /// Extra state shown by the item, like the current theme.
        detail: Option<String>,
        action: MenuAction,
    },
    Item {
        icon: Icon,
        label: &'static str,
        action: MenuAction,
    },
    Link {
        icon: Icon,
        label: &'static str,
        href: String,
        highlighted: bool,
    },
    Custom(CustomItem),
    Separator,
}
impl MenuEntry {
    fn default_item(item: DefaultItem) -> Self {
        Self::Default {
            item,
            highlighted: false,
            detail: None,
            action: MenuAction::Default(item),
        }
    }
    /// What choosing this entry does. Separators and custom widgets do nothing.
    #[must_use]
    pub fn action(&self) -> Option<MenuAction> {
        match self {
            Self::Default { action, .. } | Self::Item { action, .. } => Some(action.clone()),
            Self::Link { href, .. } => Some(MenuAction::OpenLink(href.clone())),
            Self::Custom(_) | Self::Separator => None,
        }
    }
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Default { item, .. } => Some(item.label()),
            Self::Item { label, .. } | Self::Link { label, .. } => Some(*label),
            Self::Custom(CustomItem::LanguageList) => Some("Language"),
            Self::Separator => None,
        }
    }
}

/// Capabilities decided when the application is built or configured, never by the menu itself.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct MenuFeatures {
    /// Offer the visual debug overlay. Meant for development builds.
    pub visual_debug: bool,
}

/// Where the upsell links go.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PlusLinks {
    pub landing_url: String,
    pub app_url: String,
    pub signed_in: bool,
}
impl Default for PlusLinks {
    fn default() -> Self {
        Self {
            landing_url: "https://plus.excalidraw.com".into(),
            app_url: "https://app.excalidraw.com".into(),
            signed_in: false,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MenuProps {
    pub collab_enabled: bool,
    pub is_collaborating: bool,
    pub theme: ThemeChoice,
    pub plus: PlusLinks,
    pub features: MenuFeatures,
}

/// Lay out the main menu.
#[must_use]
pub fn assemble(props: &MenuProps) -> Vec<MenuEntry> {
    use MenuEntry as E;
    let mut entries = vec![
        E::default_item(DefaultItem::LoadScene),
        E::default_item(DefaultItem::SaveToActiveFile),
        E::Item {
            icon: Icon::Plus,
            label: "New Sheet",
            action: MenuAction::NewSheet,
        },
        E::default_item(DefaultItem::Export),
        E::default_item(DefaultItem::SaveAsImage),
    ];
    if props.collab_enabled {
        entries.push(E::Default {
            item: DefaultItem::LiveCollaborationTrigger,
            highlighted: false,
            detail: props.is_collaborating.then(|| "active".to_owned()),
            action: MenuAction::OpenCollabDialog,
        });
    }
    entries.extend([
        E::Default {
            item: DefaultItem::CommandPalette,
            highlighted: true,
            detail: None,
            action: MenuAction::Default(DefaultItem::CommandPalette),
        },
        E::default_item(DefaultItem::SearchMenu),
        E::default_item(DefaultItem::Help),
        E::default_item(DefaultItem::ClearCanvas),
        E::Separator,
        E::Link {
            icon: Icon::Logo,
            label: "Excalidraw+",
            href: format!(
                "{}/plus?utm_source=excalidraw&utm_medium=app&utm_content=hamburger",
                props.plus.landing_url
            ),
            highlighted: false,
        },
        E::default_item(DefaultItem::Socials),
        E::Link {
            icon: Icon::Login,
            label: if props.plus.signed_in {
                "Sign in"
            } else {
                "Sign up"
            },
            href: format!(
                "{}{}?utm_source=signin&utm_medium=app&utm_content=hamburger",
                props.plus.app_url,
                if props.plus.signed_in { "" } else { "/sign-up" }
            ),
            highlighted: true,
        },
    ]);
    if props.features.visual_debug {
        entries.push(E::Item {
            icon: Icon::Eye,
            label: "Visual Debug",
            action: MenuAction::ToggleVisualDebug,
        });
    }
    entries.extend([
        E::Separator,
        E::Default {
            item: DefaultItem::ToggleTheme,
            highlighted: false,
            detail: Some(props.theme.as_ref().to_owned()),
            action: MenuAction::SetTheme(props.theme.cycle()),
        },
        E::Custom(CustomItem::LanguageList),
        E::default_item(DefaultItem::ChangeCanvasBackground),
    ]);
    entries
}
