//! Node handles, builders and read-only views.

use std::{
    collections::BTreeSet,
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
    num::NonZeroUsize,
};

use crate::domain::{
    layer::{dependent_closure, Layer, Secondary},
    model::Model,
    need::{DeclaredNeeds, Dimension, ProtectionNeed},
};

/// Typed handle to a node in one layer of a [`Model`].
///
/// The layer type parameter makes cross-layer confusion of handles a compile
/// error: a `NodeId<Room>` cannot be attached under a `NodeId<Building>`, and
/// only a `NodeId<Information>` can be declared a dependent of a process.
///
/// A handle is only meaningful for the model that issued it.
pub struct NodeId<L> {
    pub(crate) index: usize,
    layer: PhantomData<fn() -> L>,
}

impl<L> NodeId<L> {
    pub(crate) const fn new(index: usize) -> Self {
        Self {
            index,
            layer: PhantomData,
        }
    }
}

// Manual impls: deriving would put unnecessary bounds on `L`.
impl<L> Clone for NodeId<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for NodeId<L> {}

impl<L> fmt::Debug for NodeId<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NodeId").field(&self.index).finish()
    }
}

impl<L> PartialEq for NodeId<L> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<L> Eq for NodeId<L> {}

impl<L> PartialOrd for NodeId<L> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<L> Ord for NodeId<L> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.index.cmp(&other.index)
    }
}

impl<L> Hash for NodeId<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

/// A detached node description.
///
/// Carries everything a node owns itself: name, optional description and
/// remark, the hidden flag and the declared protection needs. Structural
/// wiring happens separately, through [`Model::attach`] and
/// [`Model::add_dependent`], after the node has been added to a layer.
#[derive(Debug, Clone, Default)]
pub struct NodeBuilder {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) remark: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) needs: DeclaredNeeds,
}

impl NodeBuilder {
    /// Starts a node description with the given display name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the free-text description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets the free-text remark.
    #[must_use]
    pub fn remark(mut self, remark: impl Into<String>) -> Self {
        self.remark = Some(remark.into());
        self
    }

    /// Marks the node as hidden.
    ///
    /// Hidden nodes are suppressed in exports and propagate their hidden
    /// state to all structural descendants.
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Declares the node's own protection need for one dimension.
    ///
    /// Replaces any previously declared need for the same dimension.
    #[must_use]
    pub fn need(mut self, dimension: Dimension, need: ProtectionNeed) -> Self {
        self.needs.set(dimension, need);
        self
    }
}

/// The data stored for a single node inside a layer store.
#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) id: Option<NonZeroUsize>,
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) remark: Option<String>,
    pub(crate) hidden: bool,
    pub(crate) needs: DeclaredNeeds,
    /// Declared cross-layer dependents, as indices into the layer below.
    /// Stays empty for the bottom layer, which has no typed way to fill it.
    pub(crate) dependents: BTreeSet<usize>,
}

impl From<NodeBuilder> for NodeData {
    fn from(builder: NodeBuilder) -> Self {
        Self {
            id: None,
            name: builder.name,
            description: builder.description,
            remark: builder.remark,
            hidden: builder.hidden,
            needs: builder.needs,
            dependents: BTreeSet::new(),
        }
    }
}

impl NodeData {
    pub(crate) fn id_and_name(&self) -> String {
        self.id
            .map_or_else(|| self.name.clone(), |id| format!("{id}: {}", self.name))
    }
}

/// Borrowed read access to a node and the aggregations defined over it.
///
/// Obtained from [`Model::view`]. Plain field accessors return the node's own
/// declared data; [`level`](Self::level), [`hidden`](Self::hidden) and
/// [`effective_need`](Self::effective_need) walk the structural neighborhood
/// (and, for dependent-bearing layers, the dependent closure) on every call.
pub struct NodeView<'a, L: Layer> {
    pub(crate) model: &'a Model,
    pub(crate) id: NodeId<L>,
}

impl<'a, L: Layer + 'a> NodeView<'a, L> {
    fn data(&self) -> &'a NodeData {
        L::store(self.model).node(self.id.index)
    }

    /// The handle this view was created from.
    #[must_use]
    pub const fn node_id(&self) -> NodeId<L> {
        self.id
    }

    /// The display identifier, if one has been assigned.
    #[must_use]
    pub fn id(&self) -> Option<NonZeroUsize> {
        self.data().id
    }

    /// The node's display name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.data().name
    }

    /// The free-text description, if any.
    #[must_use]
    pub fn description(&self) -> Option<&'a str> {
        self.data().description.as_deref()
    }

    /// The free-text remark, if any.
    #[must_use]
    pub fn remark(&self) -> Option<&'a str> {
        self.data().remark.as_deref()
    }

    /// The node's own declared need for the given dimension.
    ///
    /// This is the raw declaration; see
    /// [`effective_need`](Self::effective_need) for the aggregated value.
    #[must_use]
    pub fn declared_need(&self, dimension: Dimension) -> Option<&'a ProtectionNeed> {
        self.data().needs.get(dimension)
    }

    /// Depth in the structural tree: 0 at a root, parent level + 1 otherwise.
    #[must_use]
    pub fn level(&self) -> usize {
        L::store(self.model).level(self.id.index)
    }

    /// Whether the node is effectively hidden.
    ///
    /// True when the node's own hidden flag is set or any structural ancestor
    /// is hidden; the flag propagates downward unconditionally.
    #[must_use]
    pub fn hidden(&self) -> bool {
        L::store(self.model).effective_hidden(self.id.index)
    }

    /// The node's structural parent, if any.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId<L>> {
        L::store(self.model).parent(self.id.index).map(NodeId::new)
    }

    /// The node's direct structural children, in attachment order.
    pub fn children(&self) -> impl Iterator<Item = NodeId<L>> + 'a {
        L::store(self.model).children(self.id.index).map(NodeId::new)
    }

    /// The fully aggregated protection need for the given dimension.
    ///
    /// Combines the parent's own declaration, the node's own declaration, the
    /// children's effective needs and, for dependent-bearing layers, the
    /// effective needs of the whole dependent closure. Absent only when no
    /// declaration exists anywhere in that neighborhood.
    #[must_use]
    pub fn effective_need(&self, dimension: Dimension) -> Option<ProtectionNeed> {
        L::effective(self.model, self.id, dimension)
    }

    /// Display label: `"{id}: {name}"` once an identifier is assigned, the
    /// bare name before that.
    #[must_use]
    pub fn id_and_name(&self) -> String {
        self.data().id_and_name()
    }
}

impl<L: Secondary> NodeView<'_, L> {
    /// The full dependent closure of the node.
    ///
    /// Contains every explicitly declared dependent, all structural
    /// descendants of those dependents, and the closures of the node's own
    /// structural children. Returned in ascending insertion order.
    #[must_use]
    pub fn dependent_closure(&self) -> Vec<NodeId<L::Dependent>> {
        dependent_closure::<L>(self.model, self.id)
            .into_iter()
            .map(NodeId::new)
            .collect()
    }
}
