use super::element::{Element, ElementId};

#[derive(
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Debug,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// UI and editor state that rides along with the scene's elements.
#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase", default)]
pub struct AppState {
    pub theme: Theme,
    pub view_background_color: String,
    pub grid_size: u32,
    pub grid_mode_enabled: bool,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub zoom: f64,
    pub name: Option<String>,
    #[serde(with = "selection_map")]
    pub selected_element_ids: hashbrown::HashSet<ElementId>,
    /// Element being resized by an in-progress drag, if any.
    pub resizing_element: Option<Box<Element>>,
    /// The rubber-band box of an in-progress selection drag, if any.
    pub selection_element: Option<Box<Element>>,
}
impl Default for AppState {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            view_background_color: "#ffffff".into(),
            grid_size: 20,
            grid_mode_enabled: false,
            scroll_x: 0.0,
            scroll_y: 0.0,
            zoom: 1.0,
            name: None,
            selected_element_ids: hashbrown::HashSet::new(),
            resizing_element: None,
            selection_element: None,
        }
    }
}

/// The fields of [`AppState`] which are cleared when the canvas is made ready for a new sheet.
/// Everything not named here is carried over unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResetAppStateDelta;
impl ResetAppStateDelta {
    #[must_use]
    pub fn apply(self, mut state: AppState) -> AppState {
        state.selected_element_ids.clear();
        state.resizing_element = None;
        state.selection_element = None;
        state
    }
}

/// Selection is written as `{"<id>": true, ...}`.
mod selection_map {
    use super::ElementId;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(
        set: &hashbrown::HashSet<ElementId>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let map: std::collections::BTreeMap<&ElementId, bool> =
            set.iter().map(|id| (id, true)).collect();
        map.serialize(serializer)
    }
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<hashbrown::HashSet<ElementId>, D::Error> {
        let map = hashbrown::HashMap::<ElementId, bool>::deserialize(deserializer)?;
        Ok(map
            .into_iter()
            .filter_map(|(id, selected)| selected.then_some(id))
            .collect())
    }
}
