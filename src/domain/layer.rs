//! Layer traits and per-layer node storage.
//!
//! Each of the six asset layers owns a [`Store`]: the layer's nodes in
//! insertion order plus a petgraph [`DiGraphMap`] holding the structural
//! parent/child forest (edges point child → parent). The graph is the sole
//! source of truth for structural relationships, and lets
//! [`Store::attach`] reject edges that would make a node its own ancestor.

use std::{collections::BTreeSet, marker::PhantomData, num::NonZeroUsize};

use petgraph::{algo::has_path_connecting, graphmap::DiGraphMap, Direction};
use thiserror::Error;

use crate::domain::{
    model::Model,
    need::{Dimension, ProtectionNeed},
    node::{NodeBuilder, NodeData, NodeId},
};

/// One of the six fixed asset layers of a [`Model`].
///
/// Implemented by the marker types [`Information`](crate::domain::Information)
/// through [`Building`](crate::domain::Building). The trait ties a marker to
/// its store inside the model and to the aggregation rule used for effective
/// protection needs. The default aggregation is purely structural; layers
/// that carry dependent edges override it.
pub trait Layer: Sized {
    /// 1-based position of the layer in the fixed chain; also the numeric
    /// prefix of the layer's export file.
    const POSITION: usize;

    /// File stem of the layer's export file (e.g. `"informationen"`).
    const FILE_STEM: &'static str;

    /// The layer's store within the model.
    fn store(model: &Model) -> &Store<Self>;

    /// Mutable access to the layer's store within the model.
    fn store_mut(model: &mut Model) -> &mut Store<Self>;

    /// The effective protection need of `node` for `dimension`.
    ///
    /// Combines the parent's own declaration (one hop only, deliberately not
    /// the parent's aggregated value), the node's own declaration and the
    /// children's effective needs. Recomputed on every call.
    fn effective(model: &Model, node: NodeId<Self>, dimension: Dimension) -> Option<ProtectionNeed> {
        structural_effective(model, node, dimension)
    }
}

/// A layer whose nodes additionally reference nodes of the layer below.
///
/// The associated type fixes which layer may be referenced, so dependent
/// edges can only be declared between adjacent layers of the chain.
pub trait Secondary: Layer {
    /// The layer this layer's nodes depend on.
    type Dependent: Layer;

    /// Column name of the exported dependent list (e.g. `"Räume"`).
    const DEPENDENT_COLUMN: &'static str;
}

/// Errors returned when wiring a child node under a parent.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttachError {
    /// The child node is already attached to a parent.
    #[error("node '{child}' already has a parent")]
    AlreadyAttached {
        /// Display label of the child node.
        child: String,
    },
    /// The edge would make a node its own ancestor.
    #[error("attaching '{child}' to '{parent}' would create a cycle")]
    Cycle {
        /// Display label of the child node.
        child: String,
        /// Display label of the intended parent node.
        parent: String,
    },
}

/// Storage for one layer: nodes in insertion order plus the structural
/// parent/child forest.
#[derive(Debug, Clone)]
pub struct Store<L> {
    nodes: Vec<NodeData>,
    /// Edges point child → parent; at most one outgoing edge per node.
    graph: DiGraphMap<usize, ()>,
    layer: PhantomData<fn() -> L>,
}

impl<L> Default for Store<L> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            graph: DiGraphMap::new(),
            layer: PhantomData,
        }
    }
}

impl<L: Layer> Store<L> {
    pub(crate) fn push(&mut self, node: NodeBuilder) -> usize {
        let index = self.nodes.len();
        self.graph.add_node(index);
        self.nodes.push(NodeData::from(node));
        index
    }

    pub(crate) fn node(&self, index: usize) -> &NodeData {
        &self.nodes[index]
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn parent(&self, index: usize) -> Option<usize> {
        self.graph
            .neighbors_directed(index, Direction::Outgoing)
            .next()
    }

    pub(crate) fn children(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.graph.neighbors_directed(index, Direction::Incoming)
    }

    /// All transitive structural descendants of `index`.
    pub(crate) fn descendants(&self, index: usize) -> BTreeSet<usize> {
        let mut all = BTreeSet::new();
        for child in self.children(index) {
            all.insert(child);
            all.extend(self.descendants(child));
        }
        all
    }

    /// Depth of `index`: 0 at a root, parent level + 1 otherwise.
    pub(crate) fn level(&self, index: usize) -> usize {
        self.parent(index).map_or(0, |parent| self.level(parent) + 1)
    }

    /// Own hidden flag OR any ancestor's effective hidden flag.
    pub(crate) fn effective_hidden(&self, index: usize) -> bool {
        self.node(index).hidden
            || self
                .parent(index)
                .is_some_and(|parent| self.effective_hidden(parent))
    }

    pub(crate) fn attach(&mut self, parent: usize, child: usize) -> Result<(), AttachError> {
        if self.parent(child).is_some() {
            return Err(AttachError::AlreadyAttached {
                child: self.node(child).id_and_name(),
            });
        }
        // A cycle would arise exactly when the child is already an ancestor
        // of the intended parent.
        if parent == child || has_path_connecting(&self.graph, parent, child, None) {
            return Err(AttachError::Cycle {
                child: self.node(child).id_and_name(),
                parent: self.node(parent).id_and_name(),
            });
        }
        self.graph.add_edge(child, parent, ());
        Ok(())
    }

    pub(crate) fn add_dependent(&mut self, node: usize, dependent: usize) {
        self.nodes[node].dependents.insert(dependent);
    }

    /// Assigns display identifiers by 1-based ordinal position.
    ///
    /// Only nodes whose identifier is still unset receive one, so re-running
    /// is a no-op for already-assigned nodes. With `skip_hidden`, effectively
    /// hidden nodes are left unassigned; because the identifier is the
    /// node's position rather than a compacted counter, skipped nodes leave
    /// gaps in the visible numbering.
    pub(crate) fn assign_ids(&mut self, skip_hidden: bool) {
        let hidden: Vec<bool> = (0..self.nodes.len())
            .map(|index| self.effective_hidden(index))
            .collect();

        for (index, node) in self.nodes.iter_mut().enumerate() {
            if node.id.is_none() && !(skip_hidden && hidden[index]) {
                node.id = NonZeroUsize::new(index + 1);
            }
        }
    }
}

/// Structural aggregation: parent's own declaration, own declaration, and
/// the children's effective needs.
pub(crate) fn structural_effective<L: Layer>(
    model: &Model,
    node: NodeId<L>,
    dimension: Dimension,
) -> Option<ProtectionNeed> {
    let store = L::store(model);

    let parent_declared = store
        .parent(node.index)
        .and_then(|parent| store.node(parent).needs.get(dimension).cloned());
    let own = store.node(node.index).needs.get(dimension).cloned();
    let children: Vec<_> = store
        .children(node.index)
        .map(|child| L::effective(model, NodeId::new(child), dimension))
        .collect();

    ProtectionNeed::determine([parent_declared, own].into_iter().chain(children))
}

/// Extended aggregation for dependent-bearing layers: structural inputs plus
/// the effective needs of the whole dependent closure.
pub(crate) fn secondary_effective<L: Secondary>(
    model: &Model,
    node: NodeId<L>,
    dimension: Dimension,
) -> Option<ProtectionNeed> {
    let store = L::store(model);

    let parent_declared = store
        .parent(node.index)
        .and_then(|parent| store.node(parent).needs.get(dimension).cloned());
    let own = store.node(node.index).needs.get(dimension).cloned();
    let dependents: Vec<_> = dependent_closure::<L>(model, node)
        .into_iter()
        .map(|dependent| {
            <L::Dependent as Layer>::effective(model, NodeId::new(dependent), dimension)
        })
        .collect();
    let children: Vec<_> = store
        .children(node.index)
        .map(|child| L::effective(model, NodeId::new(child), dimension))
        .collect();

    ProtectionNeed::determine(
        [parent_declared, own]
            .into_iter()
            .chain(dependents)
            .chain(children),
    )
}

/// The full dependent closure of `node`, as indices into the dependent layer.
///
/// Every declared dependent together with all of its structural descendants
/// (depending on a node means depending on its whole subtree), unioned with
/// the closures of the node's own structural children.
pub(crate) fn dependent_closure<L: Secondary>(model: &Model, node: NodeId<L>) -> BTreeSet<usize> {
    let store = L::store(model);
    let dependent_store = <L::Dependent as Layer>::store(model);

    let mut closure = BTreeSet::new();
    for &declared in &store.node(node.index).dependents {
        closure.insert(declared);
        closure.extend(dependent_store.descendants(declared));
    }
    for child in store.children(node.index) {
        closure.extend(dependent_closure::<L>(model, NodeId::new(child)));
    }
    closure
}
