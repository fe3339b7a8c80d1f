//! # Binary files
//!
//! Embedded binary resources (images, mostly) referenced by elements through their [`FileId`].
//! Payloads are stored as data URLs so that a scene document is self-contained.

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[serde(transparent)]
pub struct FileId(pub String);
impl FileId {
    /// Derive an ID from the contents of a file. Identical payloads share an ID.
    #[must_use]
    pub fn of_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
impl std::fmt::Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileResource {
    pub id: FileId,
    pub mime_type: String,
    #[serde(rename = "dataURL")]
    pub data_url: String,
    /// Unix millis.
    pub created: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_retrieved: Option<i64>,
}
impl FileResource {
    /// Wrap raw bytes into a resource, encoding them as a base64 data URL.
    #[must_use]
    pub fn from_bytes(mime_type: &str, bytes: &[u8]) -> Self {
        use base64::Engine;
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            id: FileId::of_bytes(bytes),
            mime_type: mime_type.to_owned(),
            data_url: format!("data:{mime_type};base64,{encoded}"),
            created: chrono::Utc::now().timestamp_millis(),
            last_retrieved: None,
        }
    }
    /// Decode the payload. `None` if the data URL is not base64 or is malformed.
    #[must_use]
    pub fn bytes(&self) -> Option<Vec<u8>> {
        use base64::Engine;
        let (header, payload) = self.data_url.strip_prefix("data:")?.split_once(',')?;
        if !header.ends_with(";base64") {
            return None;
        }
        base64::engine::general_purpose::STANDARD
            .decode(payload)
            .ok()
    }
}

pub type BinaryFiles = hashbrown::HashMap<FileId, FileResource>;

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn data_url() {
        let file = FileResource::from_bytes("image/png", b"\x89PNG fake");
        assert!(file.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(file.bytes().as_deref(), Some(&b"\x89PNG fake"[..]));
        // Content addressed.
        assert_eq!(file.id, FileId::of_bytes(b"\x89PNG fake"));
        assert_ne!(file.id, FileId::of_bytes(b"something else"));
    }
    #[test]
    fn rejects_plain_data_url() {
        let mut file = FileResource::from_bytes("text/plain", b"hi");
        file.data_url = "data:text/plain,hi".into();
        assert_eq!(file.bytes(), None);
    }
}
