//! Project file format for patchbay signal graphs.
//!
//! A project is a [`GraphModel`](patchbay_core::GraphModel) plus editor
//! layout, persisted as a versioned JSON document. Loading is all-or-nothing:
//! a document either reconstructs into a fully valid graph or the load fails
//! with a [`ProjectError`] and nothing is returned.
//!
//! # Example
//!
//! ```rust,no_run
//! use patchbay_core::{GraphModel, NodeKind};
//! use patchbay_project::Project;
//!
//! let mut project = Project::new();
//! let freq = project.model.add_node(NodeKind::Constant(440.0)).unwrap();
//! let osc = project.model.add_node(NodeKind::Sine).unwrap();
//! let sink = project.model.add_node(NodeKind::Sink).unwrap();
//! project.model.connect(freq, 0, osc, 0).unwrap();
//! project.model.connect(osc, 0, sink, 0).unwrap();
//!
//! project.save("patch.json").unwrap();
//! let restored = Project::load("patch.json").unwrap();
//! assert_eq!(restored.model.node_count(), 3);
//! ```

mod document;
mod error;
mod project;

pub use document::{ConnectionRecord, FORMAT_VERSION, ModuleParams, ModuleRecord, ProjectDoc};
pub use error::ProjectError;
pub use project::Project;
