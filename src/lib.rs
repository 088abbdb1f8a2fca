//! Protection-need modelling for information-security asset inventories.
//!
//! Models an organization's assets as a six-layer hierarchy (information
//! assets, business processes, applications, infrastructure, rooms and
//! buildings) and derives, for every node, an aggregated protection-need
//! classification across the CIA triad (confidentiality, integrity,
//! availability). Classifications declared on individual nodes propagate
//! through structural parent/child trees within each layer and through
//! declared cross-layer dependency edges, so that e.g. a highly confidential
//! information asset raises the effective confidentiality of every process,
//! application and site that relies on it.
//!
//! The aggregated model can be exported as one CSV file per layer via
//! [`storage::write_csvs`].

pub mod domain;
pub use domain::{
    Application, AttachError, Building, DeclaredNeeds, Dimension, Information, Infrastructure,
    Layer, Model, NodeBuilder, NodeId, NodeView, Process, ProtectionCategory, ProtectionNeed,
    Room, Secondary,
};

pub mod storage;
pub use storage::{write_csvs, ExportError, Record};
