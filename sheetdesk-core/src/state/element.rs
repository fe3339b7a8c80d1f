//! # Elements
//!
//! The shapes making up a scene. Only the attributes this crate reasons about are typed,
//! everything else an element carries is kept verbatim in [`Element::extra`] so documents
//! written by other tools survive a load/save cycle untouched.

use super::files::FileId;

/// Stable identity of an element, unique within a scene.
#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[serde(transparent)]
pub struct ElementId(pub String);
impl ElementId {
    /// Generate a new random ID.
    #[must_use]
    pub fn new_random() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
impl From<&str> for ElementId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

#[derive(
    serde::Serialize,
    serde::Deserialize,
    strum::AsRefStr,
    strum::EnumString,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Debug,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Arrow,
    Line,
    Freedraw,
    Text,
    Image,
    Frame,
    Selection,
}

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(rename = "type")]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub angle: f64,
    /// Bumped on every change of the element.
    #[serde(default = "first_version")]
    pub version: u32,
    /// Elements are soft-deleted so that collaborators can reconcile.
    #[serde(default)]
    pub is_deleted: bool,
    /// Only set for [`ElementKind::Image`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_id: Option<FileId>,
    /// Attributes not modeled here, in document order.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
fn first_version() -> u32 {
    1
}
impl Element {
    /// Create a new, live element with a fresh ID.
    #[must_use]
    pub fn new(kind: ElementKind, [x, y]: [f64; 2], [width, height]: [f64; 2]) -> Self {
        Self {
            id: ElementId::new_random(),
            kind,
            x,
            y,
            width,
            height,
            angle: 0.0,
            version: first_version(),
            is_deleted: false,
            file_id: None,
            extra: serde_json::Map::new(),
        }
    }
    /// Create an image element displaying the given file.
    #[must_use]
    pub fn new_image(file_id: FileId, position: [f64; 2], size: [f64; 2]) -> Self {
        Self {
            file_id: Some(file_id),
            ..Self::new(ElementKind::Image, position, size)
        }
    }
    #[must_use]
    pub fn is_live(&self) -> bool {
        !self.is_deleted
    }
}

/// Clone out all the elements which have not been deleted, in order.
#[must_use]
pub fn non_deleted(elements: &[Element]) -> Vec<Element> {
    elements.iter().filter(|e| e.is_live()).cloned().collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_attributes_survive() {
        let json = r##"{
            "id": "abc",
            "type": "rectangle",
            "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0,
            "strokeColor": "#1e1e1e",
            "roughness": 1
        }"##;
        let element: Element = serde_json::from_str(json).unwrap();
        assert_eq!(element.id.as_str(), "abc");
        assert_eq!(element.version, 1);
        assert!(element.is_live());
        assert_eq!(element.extra["strokeColor"], "#1e1e1e");

        let back = serde_json::to_value(&element).unwrap();
        assert_eq!(back["roughness"], 1);
        assert_eq!(back["type"], "rectangle");
        // Not an image, so no file reference written.
        assert!(back.get("fileId").is_none());
    }
    #[test]
    fn kind_names() {
        use std::str::FromStr;
        assert_eq!(ElementKind::Freedraw.as_ref(), "freedraw");
        assert_eq!(ElementKind::from_str("diamond"), Ok(ElementKind::Diamond));
        assert!(ElementKind::from_str("hexagon").is_err());
    }
}
