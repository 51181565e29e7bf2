// Copyright 2025 the Berth Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error types for tree operations and window creation.

use thiserror::Error;

use crate::{NodeId, PanelId};

/// A tree operation was called in a way that indicates a bug in the caller.
///
/// None of these are runtime conditions: each one is also logged at error
/// level when it is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DockError {
    /// The node handle no longer refers to a live node.
    #[error("node {0:?} is stale")]
    StaleNode(NodeId),
    /// The panel handle no longer refers to a live panel.
    #[error("panel {0:?} is stale")]
    StalePanel(PanelId),
    /// A node cannot be docked onto itself.
    #[error("cannot dock node {0:?} onto itself")]
    DockOntoSelf(NodeId),
    /// Docking onto a descendant would create a cycle.
    #[error("cannot dock node {node:?} onto its descendant {target:?}")]
    DockOntoDescendant {
        /// The node being docked.
        node: NodeId,
        /// Its descendant.
        target: NodeId,
    },
    /// Fill targets must be leaves.
    #[error("cannot fill into split node {0:?}")]
    FillIntoSplit(NodeId),
    /// Split content cannot be merged into a leaf that already has panels.
    #[error("node {0:?} already has panels")]
    TargetNotEmpty(NodeId),
    /// The root node is never unset, floated, or discarded.
    #[error("the root node cannot leave its mode")]
    UnsetRoot,
    /// The panel already belongs to a node.
    #[error("panel {0:?} is already docked")]
    PanelAlreadyDocked(PanelId),
    /// The operation needs a floating or standalone tree root.
    #[error("node {0:?} is not a floating tree root")]
    NotARoot(NodeId),
    /// The operation needs a standalone node.
    #[error("node {0:?} is not standalone")]
    NotStandalone(NodeId),
}

/// The window provider could not satisfy a request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    /// The native window could not be created.
    #[error("failed to create window {title:?}: {reason}")]
    CreationFailed {
        /// Title the window was requested with.
        title: String,
        /// Provider-specific reason.
        reason: String,
    },
}

/// A broken structural invariant found by
/// [`DockTree::check_integrity`](crate::DockTree::check_integrity).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// A node has both children and panels.
    #[error("node {0:?} has both split children and panels")]
    ContentAndChildren(NodeId),
    /// A node has exactly one child.
    #[error("node {0:?} has only one child")]
    HalfSplit(NodeId),
    /// A child's parent link does not point back at its parent.
    #[error("node {child:?} does not point back to parent {parent:?}")]
    BrokenParentLink {
        /// The parent holding the child.
        parent: NodeId,
        /// The child with the wrong back-reference.
        child: NodeId,
    },
    /// A node is referenced as a child from more than one place.
    #[error("node {0:?} is owned more than once")]
    SharedChild(NodeId),
    /// A docked node is not reachable from any tree root.
    #[error("node {0:?} is unreachable")]
    Unreachable(NodeId),
    /// A non-root leaf has no panels.
    #[error("node {0:?} is an empty leaf")]
    EmptyLeaf(NodeId),
    /// The mode does not agree with the registries or the parent link.
    #[error("node {0:?} has an inconsistent mode")]
    ModeMismatch(NodeId),
    /// A panel's owner does not list it exactly once.
    #[error("panel {0:?} is not listed exactly once by its node")]
    OrphanedPanel(PanelId),
    /// The active tab index is out of range.
    #[error("node {0:?} has an out-of-range active panel")]
    ActiveOutOfRange(NodeId),
}
