use crate::a11y::locator_map::LocatorMap;
use crate::a11y::node::{AxNode, EncodedId};
use crate::page::AxSnapshot;
use std::collections::{HashMap, HashSet};

/// Roles that carry no information of their own and are collapsed into
/// their parent unless experimental traversal is enabled
const STRUCTURAL_ROLES: [&str; 4] = ["generic", "none", "ignored", "InlineTextBox"];

/// One rendered line of a simplified tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLine {
    /// Indentation depth
    pub depth: usize,

    /// Encoded id, when the node has a backend reference
    pub id: Option<EncodedId>,

    /// Rendered `role: name` text
    pub text: String,
}

impl TreeLine {
    /// Render the line with two-space indentation per depth level
    pub fn render(&self) -> String {
        let indent = "  ".repeat(self.depth);
        match &self.id {
            Some(id) => format!("{}[{}] {}", indent, id, self.text),
            None => format!("{}{}", indent, self.text),
        }
    }
}

/// The encoding of a single frame's accessibility data
#[derive(Debug, Clone, Default)]
pub struct EncodedFrame {
    /// Rendered lines in reading order
    pub lines: Vec<TreeLine>,

    /// Locators for every encoded node whose xpath could be computed
    pub locator_map: LocatorMap,

    /// Frame-hosting nodes discovered but not descended into
    pub frame_nodes: Vec<AxNode>,
}

impl EncodedFrame {
    /// Render the whole frame as the model-consumable text tree
    pub fn simplified(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(&line.render());
            out.push('\n');
        }
        out
    }
}

/// Encode one frame's snapshot into a simplified tree and a locator map
///
/// Every node that appears in the output has at most one locator-map entry;
/// nodes whose xpath the driver could not compute still render (callers must
/// tolerate lookup misses). Frame-hosting nodes become leaf markers and are
/// reported in `frame_nodes`; descending into them is the combiner's job.
pub fn encode_frame(snapshot: &AxSnapshot, frame_ordinal: u64, experimental: bool) -> EncodedFrame {
    let by_id: HashMap<&str, &AxNode> = snapshot
        .nodes
        .iter()
        .map(|n| (n.node_id.as_str(), n))
        .collect();

    let mut encoded = EncodedFrame::default();
    let mut visited = HashSet::new();

    for root in find_roots(&snapshot.nodes) {
        walk(
            root,
            0,
            frame_ordinal,
            experimental,
            snapshot,
            &by_id,
            &mut visited,
            &mut encoded,
        );
    }

    encoded
}

/// Nodes not referenced as anyone's child are the forest roots
fn find_roots(nodes: &[AxNode]) -> Vec<&AxNode> {
    let referenced: HashSet<&str> = nodes
        .iter()
        .flat_map(|n| n.child_ids.iter().map(String::as_str))
        .collect();

    let roots: Vec<&AxNode> = nodes
        .iter()
        .filter(|n| !referenced.contains(n.node_id.as_str()))
        .collect();

    if roots.is_empty() {
        // Cyclic snapshot with no entry point; fall back to document order
        nodes.first().into_iter().collect()
    } else {
        roots
    }
}

#[allow(clippy::too_many_arguments)]
fn walk<'a>(
    node: &'a AxNode,
    depth: usize,
    frame_ordinal: u64,
    experimental: bool,
    snapshot: &AxSnapshot,
    by_id: &HashMap<&str, &'a AxNode>,
    visited: &mut HashSet<&'a str>,
    out: &mut EncodedFrame,
) {
    // Cyclic child references would otherwise recurse forever
    if !visited.insert(node.node_id.as_str()) {
        return;
    }

    if node.is_frame_host() {
        out.frame_nodes.push(node.clone());
        emit(node, depth, frame_ordinal, snapshot, out);
        return;
    }

    let collapsible = !experimental
        && !node.has_name()
        && STRUCTURAL_ROLES.iter().any(|r| node.role.eq_ignore_ascii_case(r));

    let child_depth = if collapsible {
        // Hoist children into the parent's position
        depth
    } else {
        emit(node, depth, frame_ordinal, snapshot, out);
        depth + 1
    };

    for child_id in &node.child_ids {
        match by_id.get(child_id.as_str()) {
            Some(&child) => walk(
                child,
                child_depth,
                frame_ordinal,
                experimental,
                snapshot,
                by_id,
                visited,
                out,
            ),
            None => log::debug!("snapshot references unknown child node {}", child_id),
        }
    }
}

fn emit(node: &AxNode, depth: usize, frame_ordinal: u64, snapshot: &AxSnapshot, out: &mut EncodedFrame) {
    let id = node
        .backend_node_id
        .map(|backend| EncodedId::new(frame_ordinal, backend));

    if let (Some(id), Some(backend)) = (&id, node.backend_node_id) {
        if let Some(xpath) = snapshot.xpath_by_backend.get(&backend) {
            out.locator_map.insert(id.clone(), xpath.clone());
        }
    }

    let text = match node.name.as_deref().filter(|n| !n.trim().is_empty()) {
        Some(name) => format!("{}: {}", node.role, name.trim()),
        None => node.role.clone(),
    };

    out.lines.push(TreeLine { depth, id, text });
}
