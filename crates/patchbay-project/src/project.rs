//! In-memory project and document conversion.

use std::collections::BTreeMap;
use std::path::Path;

use patchbay_core::{GraphModel, NodeId, NodeKind};

use crate::document::{
    ConnectionRecord, FORMAT_VERSION, ModuleParams, ModuleRecord, ProjectDoc,
};
use crate::error::ProjectError;

/// A signal graph plus the editor layout that travels with it.
///
/// The layout is opaque positioning data: the engine never reads it, but it
/// survives the save/load round trip so an editor can restore its canvas.
#[derive(Debug, Default)]
pub struct Project {
    /// The signal graph.
    pub model: GraphModel,
    /// Canvas position per node. Nodes without an entry render at the
    /// origin.
    pub layout: Vec<(NodeId, [f32; 2])>,
}

impl Project {
    /// Creates an empty project.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a project from a JSON file.
    ///
    /// All-or-nothing: any structural problem in the document returns an
    /// error and no partial graph.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProjectError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ProjectError::read_file(path, e))?;
        let doc: ProjectDoc = serde_json::from_str(&content)?;
        let project = Self::from_document(&doc)?;
        tracing::debug!(
            path = %path.display(),
            nodes = project.model.node_count(),
            "project_load"
        );
        Ok(project)
    }

    /// Save the project to a JSON file, pretty-printed.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ProjectError> {
        let path = path.as_ref();
        let doc = self.to_document();
        let content = serde_json::to_string_pretty(&doc)?;
        std::fs::write(path, content).map_err(|e| ProjectError::write_file(path, e))?;
        tracing::debug!(path = %path.display(), nodes = doc.modules.len(), "project_save");
        Ok(())
    }

    /// Serializes the project into a version-1 document.
    pub fn to_document(&self) -> ProjectDoc {
        let positions: BTreeMap<NodeId, [f32; 2]> = self.layout.iter().copied().collect();

        let modules = self
            .model
            .nodes()
            .map(|(id, kind)| ModuleRecord {
                node_id: id.index(),
                module_kind: kind.name().to_owned(),
                params: match kind {
                    NodeKind::Constant(value) => Some(ModuleParams { value }),
                    _ => None,
                },
                position: positions.get(&id).copied().unwrap_or_default(),
            })
            .collect();

        let connections = self
            .model
            .connections()
            .map(|(from, from_port, to, to_port)| ConnectionRecord {
                from: from.index(),
                from_port,
                to: to.index(),
                to_port,
            })
            .collect();

        ProjectDoc {
            version: FORMAT_VERSION,
            modules,
            connections,
        }
    }

    /// Rebuilds a project from a document.
    ///
    /// Node ids may be renumbered; the reconstructed graph is isomorphic to
    /// the saved one. Fails on an unsupported version, an unknown module
    /// kind, a duplicate or dangling node id, or any connection the graph
    /// itself refuses (bad port, cycle).
    pub fn from_document(doc: &ProjectDoc) -> Result<Self, ProjectError> {
        if doc.version == 0 || doc.version > FORMAT_VERSION {
            return Err(ProjectError::UnsupportedVersion(doc.version));
        }

        let mut model = GraphModel::new();
        let mut layout = Vec::with_capacity(doc.modules.len());
        let mut id_map: BTreeMap<u32, NodeId> = BTreeMap::new();

        for record in &doc.modules {
            if id_map.contains_key(&record.node_id) {
                return Err(ProjectError::DuplicateNodeId(record.node_id));
            }
            let kind = parse_kind(&record.module_kind, record.params)?;
            let id = model.add_node(kind)?;
            id_map.insert(record.node_id, id);
            layout.push((id, record.position));
        }

        for conn in &doc.connections {
            let from = *id_map
                .get(&conn.from)
                .ok_or(ProjectError::DanglingConnection(conn.from))?;
            let to = *id_map
                .get(&conn.to)
                .ok_or(ProjectError::DanglingConnection(conn.to))?;
            model.connect(from, conn.from_port, to, conn.to_port)?;
        }

        Ok(Self { model, layout })
    }
}

fn parse_kind(name: &str, params: Option<ModuleParams>) -> Result<NodeKind, ProjectError> {
    let kind = match name {
        "sine" => NodeKind::Sine,
        "triangle" => NodeKind::Triangle,
        "sawtooth" => NodeKind::Sawtooth,
        "square" => NodeKind::Square,
        "constant" => NodeKind::Constant(params.unwrap_or_default().value),
        "add" => NodeKind::Add,
        "multiply" => NodeKind::Multiply,
        "divide" => NodeKind::Divide,
        "sink" => NodeKind::Sink,
        other => return Err(ProjectError::UnknownModuleKind(other.to_owned())),
    };
    Ok(kind)
}
