//! Domain model for protection-need classification.
//!
//! This module contains the core types: severity categories, protection-need
//! values and their combination algebra, the typed six-layer model, and the
//! on-demand aggregation engine that derives each node's effective
//! protection need.

pub mod category;
pub use category::ProtectionCategory;

pub mod need;
pub use need::{DeclaredNeeds, Dimension, ProtectionNeed};

pub mod node;
pub use node::{NodeBuilder, NodeId, NodeView};

pub mod layer;
pub use layer::{AttachError, Layer, Secondary, Store};

pub mod model;
pub use model::{Application, Building, Information, Infrastructure, Model, Process, Room};
