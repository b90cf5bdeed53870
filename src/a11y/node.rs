use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between the frame ordinal and the backend node id
pub const ENCODED_ID_SEPARATOR: char = '-';

/// A single node of a frame's accessibility data
///
/// Frames deliver their nodes as a flat list; hierarchy is reconstructed from
/// `child_ids`. All fields besides `role` and `node_id` are optional because
/// the underlying driver may not be able to compute them for every node.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AxNode {
    /// Accessibility role (e.g., "button", "link", "generic")
    pub role: String,

    /// Accessible name, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Node id unique within one frame snapshot
    pub node_id: String,

    /// Backend node reference used for locator lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_node_id: Option<u64>,

    /// Ordered child node ids
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub child_ids: Vec<String>,

    /// For frame-hosting nodes: the id of the frame they host
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,

    /// Underlying element tag name, if known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

impl AxNode {
    /// Create a new node with the given role and within-frame id
    pub fn new(role: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            name: None,
            node_id: node_id.into(),
            backend_node_id: None,
            child_ids: Vec::new(),
            frame_id: None,
            tag: None,
        }
    }

    /// Builder method: set the accessible name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Builder method: set the backend node id
    pub fn with_backend_id(mut self, backend_node_id: u64) -> Self {
        self.backend_node_id = Some(backend_node_id);
        self
    }

    /// Builder method: set the child ids
    pub fn with_children(mut self, child_ids: Vec<&str>) -> Self {
        self.child_ids = child_ids.into_iter().map(String::from).collect();
        self
    }

    /// Builder method: mark the node as hosting a nested frame
    pub fn with_frame_id(mut self, frame_id: impl Into<String>) -> Self {
        self.frame_id = Some(frame_id.into());
        self
    }

    /// Builder method: set the element tag name
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Whether this node hosts a nested frame
    pub fn is_frame_host(&self) -> bool {
        self.frame_id.is_some() || self.role.eq_ignore_ascii_case("iframe")
            || self.tag.as_deref().is_some_and(|t| t.eq_ignore_ascii_case("iframe"))
    }

    /// Whether the accessible name carries any visible text
    pub fn has_name(&self) -> bool {
        self.name.as_deref().is_some_and(|n| !n.trim().is_empty())
    }
}

/// Frame-scoped composite identifier of the form `<frameOrdinal>-<backendNodeId>`
///
/// Unique only within one combined-tree snapshot. The separator distinguishes
/// composite ids from raw, single-context ids; a raw id never constructs an
/// `EncodedId`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedId(String);

impl EncodedId {
    /// Compose an id from a frame ordinal and a backend node id
    pub fn new(frame_ordinal: u64, backend_node_id: u64) -> Self {
        Self(format!("{}{}{}", frame_ordinal, ENCODED_ID_SEPARATOR, backend_node_id))
    }

    /// Parse a composite id; returns `None` for raw (separator-free) ids
    pub fn parse(s: &str) -> Option<Self> {
        let (ordinal, backend) = s.split_once(ENCODED_ID_SEPARATOR)?;
        ordinal.parse::<u64>().ok()?;
        backend.parse::<u64>().ok()?;
        Some(Self(s.to_string()))
    }

    /// Whether a raw string is in the composite form
    pub fn is_composite(s: &str) -> bool {
        s.contains(ENCODED_ID_SEPARATOR)
    }

    /// The frame ordinal half
    pub fn frame_ordinal(&self) -> u64 {
        self.0
            .split_once(ENCODED_ID_SEPARATOR)
            .and_then(|(o, _)| o.parse().ok())
            .unwrap_or(0)
    }

    /// The backend node id half
    pub fn backend_node_id(&self) -> u64 {
        self.0
            .split_once(ENCODED_ID_SEPARATOR)
            .and_then(|(_, b)| b.parse().ok())
            .unwrap_or(0)
    }

    /// The textual form
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EncodedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoded_id_format() {
        let id = EncodedId::new(2, 417);
        assert_eq!(id.as_str(), "2-417");
        assert_eq!(id.frame_ordinal(), 2);
        assert_eq!(id.backend_node_id(), 417);
    }

    #[test]
    fn test_encoded_id_parse() {
        assert_eq!(EncodedId::parse("0-12"), Some(EncodedId::new(0, 12)));
        assert!(EncodedId::parse("12").is_none());
        assert!(EncodedId::parse("a-12").is_none());
        assert!(EncodedId::parse("0-b").is_none());
    }

    #[test]
    fn test_is_composite() {
        assert!(EncodedId::is_composite("0-12"));
        assert!(!EncodedId::is_composite("12"));
    }

    #[test]
    fn test_node_builders() {
        let node = AxNode::new("button", "7")
            .with_name("Submit")
            .with_backend_id(42)
            .with_tag("button");

        assert_eq!(node.role, "button");
        assert_eq!(node.name.as_deref(), Some("Submit"));
        assert_eq!(node.backend_node_id, Some(42));
        assert!(node.has_name());
        assert!(!node.is_frame_host());
    }

    #[test]
    fn test_frame_host_detection() {
        let by_frame_id = AxNode::new("generic", "1").with_frame_id("frame-a");
        assert!(by_frame_id.is_frame_host());

        let by_role = AxNode::new("Iframe", "2");
        assert!(by_role.is_frame_host());

        let by_tag = AxNode::new("generic", "3").with_tag("iframe");
        assert!(by_tag.is_frame_host());
    }

    #[test]
    fn test_blank_name_is_not_a_name() {
        let node = AxNode::new("generic", "1").with_name("   ");
        assert!(!node.has_name());
    }

    #[test]
    fn test_node_serialization() {
        let node = AxNode::new("link", "3")
            .with_name("Docs")
            .with_backend_id(9)
            .with_children(vec!["4", "5"]);

        let json = serde_json::to_string(&node).unwrap();
        let parsed: AxNode = serde_json::from_str(&json).unwrap();
        assert_eq!(node, parsed);
    }
}
