//! On-disk JSON document types.
//!
//! The document is a plain serde mirror of the graph: a list of module
//! records keyed by node id plus a list of port-addressed connections.
//! Node ids in a document are only meaningful within that document; loading
//! may renumber them.
//!
//! # JSON Format
//!
//! ```json
//! {
//!   "version": 1,
//!   "modules": [
//!     { "node_id": 0, "module_kind": "constant", "params": { "value": 440.0 }, "position": [40.0, 80.0] },
//!     { "node_id": 1, "module_kind": "sine", "position": [160.0, 80.0] },
//!     { "node_id": 2, "module_kind": "sink", "position": [280.0, 80.0] }
//!   ],
//!   "connections": [
//!     { "from": 0, "from_port": 0, "to": 1, "to_port": 0 },
//!     { "from": 1, "from_port": 0, "to": 2, "to_port": 0 }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Format version written by this build.
pub const FORMAT_VERSION: u32 = 1;

/// Root of a persisted project file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDoc {
    /// Format version; loading rejects versions newer than
    /// [`FORMAT_VERSION`].
    pub version: u32,

    /// One record per node in the graph.
    #[serde(default)]
    pub modules: Vec<ModuleRecord>,

    /// Port-addressed connections between module records.
    #[serde(default)]
    pub connections: Vec<ConnectionRecord>,
}

/// One node of the persisted graph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModuleRecord {
    /// Document-local node id, referenced by connection records.
    pub node_id: u32,

    /// Stable kind name, e.g. `"sine"` or `"constant"`.
    pub module_kind: String,

    /// Kind-specific parameters; only `"constant"` uses any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<ModuleParams>,

    /// Editor canvas position. Opaque to the engine; round-trips as layout.
    #[serde(default)]
    pub position: [f32; 2],
}

/// Kind-specific parameter block.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct ModuleParams {
    /// Literal value of a `"constant"` module.
    #[serde(default)]
    pub value: f32,
}

/// One persisted edge, ports included.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionRecord {
    /// Source module's document-local node id.
    pub from: u32,
    /// Output port on the source.
    pub from_port: u16,
    /// Destination module's document-local node id.
    pub to: u32,
    /// Input port on the destination.
    pub to_port: u16,
}
