//! The six-layer asset model.
//!
//! A [`Model`] owns one [`Store`] per layer, in the fixed chain order
//! Information → Process → Application → Infrastructure → Room → Building.
//! Nodes are created detached via [`NodeBuilder`], appended to a layer with
//! [`Model::add`], and wired afterwards with [`Model::attach`] (structural
//! parent/child within a layer) and [`Model::add_dependent`] (cross-layer
//! dependency on the layer below).
//!
//! All derived values (level, effective hidden state, effective protection
//! needs, dependent closures) are recomputed on each query. The model is
//! built once and then only read, so the uncached walk is cheap at the scale
//! of a single organization's asset inventory.

use tracing::debug;

use crate::domain::{
    layer::{secondary_effective, AttachError, Layer, Secondary, Store},
    need::{Dimension, ProtectionNeed},
    node::{NodeBuilder, NodeId, NodeView},
};

/// Marker for the information-asset layer (chain position 1).
#[derive(Debug, Clone, Copy)]
pub struct Information;

/// Marker for the business-process layer (chain position 2).
#[derive(Debug, Clone, Copy)]
pub struct Process;

/// Marker for the application layer (chain position 3).
#[derive(Debug, Clone, Copy)]
pub struct Application;

/// Marker for the infrastructure layer (chain position 4).
#[derive(Debug, Clone, Copy)]
pub struct Infrastructure;

/// Marker for the room layer (chain position 5).
#[derive(Debug, Clone, Copy)]
pub struct Room;

/// Marker for the building layer (chain position 6).
#[derive(Debug, Clone, Copy)]
pub struct Building;

impl Layer for Information {
    const POSITION: usize = 1;
    const FILE_STEM: &'static str = "informationen";

    fn store(model: &Model) -> &Store<Self> {
        &model.informations
    }

    fn store_mut(model: &mut Model) -> &mut Store<Self> {
        &mut model.informations
    }
}

impl Layer for Process {
    const POSITION: usize = 2;
    const FILE_STEM: &'static str = "prozesse";

    fn store(model: &Model) -> &Store<Self> {
        &model.processes
    }

    fn store_mut(model: &mut Model) -> &mut Store<Self> {
        &mut model.processes
    }

    fn effective(model: &Model, node: NodeId<Self>, dimension: Dimension) -> Option<ProtectionNeed> {
        secondary_effective::<Self>(model, node, dimension)
    }
}

impl Secondary for Process {
    type Dependent = Information;
    const DEPENDENT_COLUMN: &'static str = "Information";
}

impl Layer for Application {
    const POSITION: usize = 3;
    const FILE_STEM: &'static str = "anwendungen";

    fn store(model: &Model) -> &Store<Self> {
        &model.applications
    }

    fn store_mut(model: &mut Model) -> &mut Store<Self> {
        &mut model.applications
    }

    fn effective(model: &Model, node: NodeId<Self>, dimension: Dimension) -> Option<ProtectionNeed> {
        secondary_effective::<Self>(model, node, dimension)
    }
}

impl Secondary for Application {
    type Dependent = Process;
    const DEPENDENT_COLUMN: &'static str = "Geschäftsprozesse";
}

impl Layer for Infrastructure {
    const POSITION: usize = 4;
    const FILE_STEM: &'static str = "infrastrukturen";

    fn store(model: &Model) -> &Store<Self> {
        &model.infrastructures
    }

    fn store_mut(model: &mut Model) -> &mut Store<Self> {
        &mut model.infrastructures
    }

    fn effective(model: &Model, node: NodeId<Self>, dimension: Dimension) -> Option<ProtectionNeed> {
        secondary_effective::<Self>(model, node, dimension)
    }
}

impl Secondary for Infrastructure {
    type Dependent = Application;
    const DEPENDENT_COLUMN: &'static str = "Anwendungen";
}

impl Layer for Room {
    const POSITION: usize = 5;
    const FILE_STEM: &'static str = "raeume";

    fn store(model: &Model) -> &Store<Self> {
        &model.rooms
    }

    fn store_mut(model: &mut Model) -> &mut Store<Self> {
        &mut model.rooms
    }

    fn effective(model: &Model, node: NodeId<Self>, dimension: Dimension) -> Option<ProtectionNeed> {
        secondary_effective::<Self>(model, node, dimension)
    }
}

impl Secondary for Room {
    type Dependent = Infrastructure;
    const DEPENDENT_COLUMN: &'static str = "Infrastrukturen";
}

impl Layer for Building {
    const POSITION: usize = 6;
    const FILE_STEM: &'static str = "gebaeude";

    fn store(model: &Model) -> &Store<Self> {
        &model.buildings
    }

    fn store_mut(model: &mut Model) -> &mut Store<Self> {
        &mut model.buildings
    }

    fn effective(model: &Model, node: NodeId<Self>, dimension: Dimension) -> Option<ProtectionNeed> {
        secondary_effective::<Self>(model, node, dimension)
    }
}

impl Secondary for Building {
    type Dependent = Room;
    const DEPENDENT_COLUMN: &'static str = "Räume";
}

/// An organization's asset landscape: six typed layers of nodes.
///
/// The model owns its nodes exclusively; handles ([`NodeId`]) are plain
/// indices and all structural links are non-owning. There is no deletion:
/// the model is built up once and then queried.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub(crate) informations: Store<Information>,
    pub(crate) processes: Store<Process>,
    pub(crate) applications: Store<Application>,
    pub(crate) infrastructures: Store<Infrastructure>,
    pub(crate) rooms: Store<Room>,
    pub(crate) buildings: Store<Building>,
}

impl Model {
    /// Creates an empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node to layer `L` and returns its handle.
    ///
    /// Insertion order is significant: it determines both the export row
    /// order and the positional display identifiers assigned by
    /// [`assign_ids`](Self::assign_ids).
    pub fn add<L: Layer>(&mut self, node: NodeBuilder) -> NodeId<L> {
        NodeId::new(L::store_mut(self).push(node))
    }

    /// Wires `child` under `parent` in the layer's structural tree.
    ///
    /// # Errors
    ///
    /// Returns [`AttachError::AlreadyAttached`] if the child already has a
    /// parent, or [`AttachError::Cycle`] if the edge would make a node its
    /// own ancestor.
    ///
    /// # Panics
    ///
    /// Panics if either handle was issued by a different model.
    pub fn attach<L: Layer>(
        &mut self,
        parent: NodeId<L>,
        child: NodeId<L>,
    ) -> Result<(), AttachError> {
        L::store_mut(self).attach(parent.index, child.index)
    }

    /// Declares `dependent` as a cross-layer dependent of `node`.
    ///
    /// Dependents form a set; declaring the same edge twice is a no-op. The
    /// typed handle restricts dependents to the layer directly below `L` in
    /// the chain.
    ///
    /// # Panics
    ///
    /// Panics if either handle was issued by a different model.
    pub fn add_dependent<L: Secondary>(&mut self, node: NodeId<L>, dependent: NodeId<L::Dependent>) {
        L::store_mut(self).add_dependent(node.index, dependent.index);
    }

    /// Borrowed read access to a node.
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different model.
    #[must_use]
    pub fn view<L: Layer>(&self, node: NodeId<L>) -> NodeView<'_, L> {
        assert!(
            node.index < L::store(self).len(),
            "node handle out of range for this model"
        );
        NodeView {
            model: self,
            id: node,
        }
    }

    /// The fully aggregated protection need of a node for one dimension.
    ///
    /// Shorthand for `model.view(node).effective_need(dimension)`.
    ///
    /// # Panics
    ///
    /// Panics if the handle was issued by a different model.
    #[must_use]
    pub fn effective_need<L: Layer>(
        &self,
        node: NodeId<L>,
        dimension: Dimension,
    ) -> Option<ProtectionNeed> {
        L::effective(self, node, dimension)
    }

    /// Iterates a layer's node handles in insertion order.
    pub fn nodes<'a, L: Layer + 'a>(&'a self) -> impl Iterator<Item = NodeId<L>> + 'a {
        (0..L::store(self).len()).map(NodeId::new)
    }

    /// Assigns display identifiers across all six layers.
    ///
    /// Each layer is walked in insertion order; the candidate identifier is
    /// the node's 1-based position. Nodes that already carry an identifier
    /// keep it. With `skip_hidden`, effectively hidden nodes are left
    /// unassigned and leave gaps in the visible numbering.
    pub fn assign_ids(&mut self, skip_hidden: bool) {
        debug!(skip_hidden, "assigning display identifiers");
        self.informations.assign_ids(skip_hidden);
        self.processes.assign_ids(skip_hidden);
        self.applications.assign_ids(skip_hidden);
        self.infrastructures.assign_ids(skip_hidden);
        self.rooms.assign_ids(skip_hidden);
        self.buildings.assign_ids(skip_hidden);
    }
}
