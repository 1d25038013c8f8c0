//! Disposal engine.
//!
//! Releases everything a context owns in a fixed order: frame loop, render
//! graph resources, native context, hardware slot, surface listeners. Native
//! failures are logged and counted, never propagated: the caller's bookkeeping
//! must go ahead regardless.

use crate::graph::{GpuResource, RenderGraph, ResourceKind, SceneNode};
use crate::pool::RenderContextEntry;

/// Outcome of a disposal pass.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReleaseReport {
    /// Scene nodes visited.
    pub nodes: usize,
    /// Resources released successfully.
    pub released: usize,
    /// Release calls that failed (logged as warnings).
    pub faults: usize,
}

impl ReleaseReport {
    /// Releases one resource on behalf of the node `owner`.
    pub fn release(&mut self, owner: &str, kind: ResourceKind, resource: &mut dyn GpuResource) {
        match resource.release() {
            Ok(()) => self.released += 1,
            Err(err) => {
                self.faults += 1;
                log::warn!("failed to release {kind} of `{owner}`: {err:#}");
            }
        }
    }

    fn merge(&mut self, other: ReleaseReport) {
        self.nodes += other.nodes;
        self.released += other.released;
        self.faults += other.faults;
    }
}

/// Releases the GPU resources of every node in `graph`, depth-first.
///
/// Nodes keep existing afterwards but own nothing; a second pass releases nothing.
pub fn release_graph(graph: &mut RenderGraph) -> ReleaseReport {
    let mut report = ReleaseReport::default();
    for node in graph.scene.nodes_mut() {
        release_node(node.as_mut(), &mut report);
    }
    report
}

fn release_node(node: &mut dyn SceneNode, report: &mut ReleaseReport) {
    report.nodes += 1;
    node.release_gpu_resources(report);
    node.for_each_child(&mut |child| release_node(child, report));
}

/// Tears down an entry: cancels its loop, drains its graph, disposes the native
/// context, forces the hardware context loss and detaches surface listeners.
///
/// Idempotent; a released entry yields an empty report.
pub fn release_context(entry: &mut RenderContextEntry) -> ReleaseReport {
    entry.cancel_animation();
    if entry.is_released() {
        return ReleaseReport::default();
    }

    let label = entry.label().to_string();
    let mut report = ReleaseReport::default();
    report.merge(release_graph(&mut entry.graph));

    let context = entry.context_mut();
    if let Err(err) = context.dispose() {
        report.faults += 1;
        log::warn!("warning disposing renderer for `{label}`: {err:#}");
    }
    if let Err(err) = context.force_context_loss() {
        report.faults += 1;
        log::warn!("warning forcing context loss for `{label}`: {err:#}");
    }

    entry.mark_released();
    log::debug!(
        "released `{label}`: {} nodes, {} resources, {} faults",
        report.nodes,
        report.released,
        report.faults
    );
    report
}
