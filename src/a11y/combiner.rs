use crate::a11y::encoder::{encode_frame, EncodedFrame, TreeLine};
use crate::a11y::locator_map::LocatorMap;
use crate::a11y::node::{AxNode, EncodedId};
use crate::error::Result;
use crate::page::{AxSnapshot, FrameId, PageDriver};
use futures::future::BoxFuture;

/// The merged, model-consumable projection of one or more frames
#[derive(Debug, Clone, Default)]
pub struct CombinedTree {
    /// Depth-first text rendering of the combined forest
    pub tree: String,

    /// Locators for every addressable node across all visited frames
    pub locator_map: LocatorMap,

    /// Flat mode only: frame-hosting nodes discovered but not traversed
    pub discovered_frames: Vec<AxNode>,

    /// Recursive mode only: frames whose snapshot could not be fetched
    pub skipped_frames: Vec<FrameId>,
}

/// Compose per-frame encodings into one combined tree and locator map
///
/// Flat mode traverses only the top frame and records nested frames as
/// opaque leaf markers. Recursive mode descends into nested frames, merging
/// their encodings under frame-scoped ordinals so ids stay unique across the
/// whole combination. A top-frame snapshot failure is fatal; a nested-frame
/// failure degrades to a skipped frame.
pub async fn combine_frames<D: PageDriver + ?Sized>(
    driver: &D,
    recursive: bool,
    experimental: bool,
) -> Result<CombinedTree> {
    let top = driver.accessibility_snapshot(None).await?;

    if !recursive {
        let encoded = encode_frame(&top, 0, experimental);
        return Ok(CombinedTree {
            tree: encoded.simplified(),
            locator_map: encoded.locator_map,
            discovered_frames: encoded.frame_nodes,
            skipped_frames: Vec::new(),
        });
    }

    let mut pass = CombinePass {
        driver,
        experimental,
        // Top frame is 0; every visited nested frame gets the next ordinal
        // regardless of depth, so repeated backend ids cannot collide.
        next_ordinal: 1,
        locator_map: LocatorMap::new(),
        skipped_frames: Vec::new(),
    };

    let lines = pass.expand_frame(top, 0, String::new(), 0).await;

    Ok(CombinedTree {
        tree: render(&lines),
        locator_map: pass.locator_map,
        discovered_frames: Vec::new(),
        skipped_frames: pass.skipped_frames,
    })
}

fn render(lines: &[TreeLine]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(&line.render());
        out.push('\n');
    }
    out
}

struct CombinePass<'a, D: ?Sized> {
    driver: &'a D,
    experimental: bool,
    next_ordinal: u64,
    locator_map: LocatorMap,
    skipped_frames: Vec<FrameId>,
}

impl<'a, D: PageDriver + ?Sized> CombinePass<'a, D> {
    /// Encode one frame and splice every reachable child frame's lines
    /// beneath its host node
    fn expand_frame(
        &mut self,
        snapshot: AxSnapshot,
        ordinal: u64,
        xpath_prefix: String,
        base_depth: usize,
    ) -> BoxFuture<'_, Vec<TreeLine>> {
        Box::pin(async move {
            let EncodedFrame {
                mut lines,
                locator_map,
                frame_nodes,
            } = encode_frame(&snapshot, ordinal, self.experimental);

            for line in &mut lines {
                line.depth += base_depth;
            }

            for (id, locator) in locator_map.iter() {
                self.locator_map
                    .insert(id.clone(), format!("{}{}", xpath_prefix, locator));
            }

            for host in frame_nodes {
                let Some(frame_id) = host.frame_id.clone() else {
                    log::debug!("frame host {} has no frame id, leaving as leaf", host.node_id);
                    continue;
                };

                let child = match self.driver.accessibility_snapshot(Some(&frame_id)).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        log::warn!("skipping frame {}: {}", frame_id, e);
                        self.skipped_frames.push(frame_id);
                        continue;
                    }
                };

                let host_xpath = host
                    .backend_node_id
                    .and_then(|backend| snapshot.xpath_by_backend.get(&backend))
                    .map(|xpath| format!("{}{}", xpath_prefix, xpath))
                    .unwrap_or_else(|| xpath_prefix.clone());

                let child_ordinal = self.next_ordinal;
                self.next_ordinal += 1;

                let host_line = host
                    .backend_node_id
                    .map(|backend| EncodedId::new(ordinal, backend))
                    .and_then(|id| lines.iter().position(|l| l.id.as_ref() == Some(&id)));

                let (insert_at, child_depth) = match host_line {
                    Some(pos) => (pos + 1, lines[pos].depth + 1),
                    None => (lines.len(), base_depth + 1),
                };

                let child_lines = self
                    .expand_frame(child, child_ordinal, host_xpath, child_depth)
                    .await;

                lines.splice(insert_at..insert_at, child_lines);
            }

            lines
        })
    }
}
