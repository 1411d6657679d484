// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! The portable JSON document a diagram is saved as.
//!
//! Decoding never touches a live diagram: it builds a fresh graph and only
//! hands it back once the whole document validated. Node ids in the document
//! are remapped through a table while nodes are rebuilt, so documents written
//! by other sessions cannot collide with ids already in use.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::model::{
    ConnectionStylePatch, Diagram, GraphModel, Node, NodeId, NodeStylePatch, Point, Side, Size,
    DEFAULT_NODE_SIZE,
};
use crate::viewport::Viewport;

pub const DOCUMENT_VERSION: &str = "1.0";

#[derive(Debug)]
pub enum MalformedDocumentError {
    Json(serde_json::Error),
    InvalidId {
        field: &'static str,
        value: String,
    },
    DuplicateNodeId {
        id: String,
    },
    MissingField {
        node_id: String,
        field: &'static str,
    },
    NonFinite {
        field: &'static str,
    },
    UnsupportedVersion {
        version: String,
    },
}

impl fmt::Display for MalformedDocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(source) => write!(f, "invalid diagram json: {source}"),
            Self::InvalidId { field, value } => write!(f, "invalid id for {field}: {value:?}"),
            Self::DuplicateNodeId { id } => write!(f, "duplicate node id {id:?}"),
            Self::MissingField { node_id, field } => {
                write!(f, "node {node_id:?} is missing {field}")
            }
            Self::NonFinite { field } => write!(f, "non-finite number in {field}"),
            Self::UnsupportedVersion { version } => {
                write!(f, "unsupported document version {version:?} (expected 1.x)")
            }
        }
    }
}

impl std::error::Error for MalformedDocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Json(source) => Some(source),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for MalformedDocumentError {
    fn from(source: serde_json::Error) -> Self {
        Self::Json(source)
    }
}

/// Older saves used numeric ids; both spellings are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DocumentId {
    Text(String),
    Number(serde_json::Number),
}

impl DocumentId {
    fn key(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        }
    }
}

impl From<&NodeId> for DocumentId {
    fn from(id: &NodeId) -> Self {
        Self::Text(id.as_str().to_owned())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointDocument {
    pub x: f64,
    pub y: f64,
}

/// `{x, y}` sizes written by earlier saves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LegacySizeDocument {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDocument {
    pub id: DocumentId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<PointDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<LegacySizeDocument>,
    #[serde(default)]
    pub text: String,
    #[serde(default, alias = "fill", skip_serializing_if = "Option::is_none")]
    pub color: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub is_central: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(alias = "fromId", alias = "node1Id")]
    pub source: DocumentId,
    #[serde(alias = "toId", alias = "node2Id")]
    pub target: DocumentId,
    #[serde(default, alias = "direction", skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<SmolStr>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportDocument {
    pub pan: PointDocument,
    pub zoom: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramDocument {
    #[serde(default = "default_version")]
    pub version: String,
    pub nodes: Vec<NodeDocument>,
    pub connections: Vec<ConnectionDocument>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportDocument>,
    #[serde(default, rename = "zoomLevel", skip_serializing_if = "Option::is_none")]
    pub legacy_zoom: Option<f64>,
    #[serde(
        default,
        rename = "panOffset",
        alias = "canvasPan",
        skip_serializing_if = "Option::is_none"
    )]
    pub legacy_pan: Option<PointDocument>,
}

fn default_version() -> String {
    DOCUMENT_VERSION.to_owned()
}

impl DiagramDocument {
    pub fn from_diagram(diagram: &Diagram) -> Self {
        let graph = diagram.graph();
        let nodes = graph
            .nodes()
            .iter()
            .map(|(node_id, node)| node_document(node_id, node))
            .collect();
        let connections = graph
            .connections()
            .iter()
            .map(|(connection_id, connection)| ConnectionDocument {
                id: Some(DocumentId::Text(connection_id.as_str().to_owned())),
                source: connection.source().into(),
                target: connection.target().into(),
                side: connection.side().map(|side| side.as_str().to_owned()),
                color: Some(connection.style().color.clone()),
                style: Some(connection.style().line_style.clone()),
            })
            .collect();
        let viewport = diagram.viewport();

        Self {
            version: default_version(),
            nodes,
            connections,
            viewport: Some(ViewportDocument {
                pan: PointDocument {
                    x: viewport.pan().x,
                    y: viewport.pan().y,
                },
                zoom: viewport.zoom(),
            }),
            legacy_zoom: None,
            legacy_pan: None,
        }
    }

    /// Rebuilds a diagram with freshly allocated ids.
    ///
    /// Connections whose endpoints are not in the document are dropped with a
    /// warning; everything else that fails validation rejects the whole document.
    pub fn into_diagram(self, default_node_size: Size) -> Result<Diagram, MalformedDocumentError> {
        self.rebuild_into(GraphModel::new().with_default_node_size(default_node_size))
    }

    /// Like [`DiagramDocument::into_diagram`], but allocates from `graph`'s id
    /// counters so rebuilt ids never repeat ids `graph` already handed out.
    /// `graph` is cleared first.
    pub fn rebuild_into(self, mut graph: GraphModel) -> Result<Diagram, MalformedDocumentError> {
        if !self.version.starts_with("1.") && self.version != "1" {
            return Err(MalformedDocumentError::UnsupportedVersion {
                version: self.version,
            });
        }

        graph.clear();
        let default_node_size = graph.default_node_size();
        let mut remap: HashMap<String, NodeId> = HashMap::with_capacity(self.nodes.len());

        for doc in self.nodes {
            let key = doc.id.key();
            if key.is_empty() {
                return Err(MalformedDocumentError::InvalidId {
                    field: "nodes[].id",
                    value: key,
                });
            }
            if remap.contains_key(&key) {
                return Err(MalformedDocumentError::DuplicateNodeId { id: key });
            }

            let position = match (doc.x, doc.y, doc.position) {
                (Some(x), Some(y), _) => Point::new(x, y),
                (_, _, Some(p)) => Point::new(p.x, p.y),
                _ => {
                    return Err(MalformedDocumentError::MissingField {
                        node_id: key,
                        field: "position",
                    })
                }
            };
            ensure_finite(position.is_finite(), "nodes[].position")?;

            let size = match (doc.width, doc.height, doc.size) {
                (Some(width), Some(height), _) => Size::new(width, height),
                (_, _, Some(legacy)) => Size::new(legacy.x, legacy.y),
                _ => default_node_size,
            };
            ensure_finite(size.is_finite(), "nodes[].size")?;
            if let Some(font_size) = doc.font_size {
                ensure_finite(font_size.is_finite(), "nodes[].fontSize")?;
            }

            let node_id = graph.create_node(position, doc.text, doc.is_central);
            graph.update_node_size(&node_id, size);
            graph.update_node_style(
                &node_id,
                &NodeStylePatch {
                    fill: doc.color,
                    text_color: doc.text_color,
                    font_size: doc.font_size,
                },
            );
            remap.insert(key, node_id);
        }

        for doc in self.connections {
            let source_key = doc.source.key();
            let target_key = doc.target.key();
            let (Some(source), Some(target)) = (remap.get(&source_key), remap.get(&target_key))
            else {
                tracing::warn!(
                    source = %source_key,
                    target = %target_key,
                    "dropping connection with unknown endpoint"
                );
                continue;
            };

            let side = match doc.side.as_deref().map(str::parse::<Side>) {
                Some(Ok(side)) => Some(side),
                Some(Err(err)) => {
                    tracing::warn!(%err, "ignoring connection side hint");
                    None
                }
                None => None,
            };
            let Ok(connection_id) = graph.create_connection(source, target, side) else {
                continue;
            };
            graph.update_connection_style(
                &connection_id,
                &ConnectionStylePatch {
                    color: doc.color,
                    line_style: doc.style,
                },
            );
        }

        let viewport = match (self.viewport, self.legacy_zoom, self.legacy_pan) {
            (Some(doc), _, _) => (Point::new(doc.pan.x, doc.pan.y), doc.zoom),
            (None, zoom, pan) => (
                pan.map(|p| Point::new(p.x, p.y)).unwrap_or_default(),
                zoom.unwrap_or(1.0),
            ),
        };
        ensure_finite(viewport.0.is_finite(), "viewport.pan")?;
        ensure_finite(viewport.1.is_finite(), "viewport.zoom")?;

        Ok(Diagram::new(graph, Viewport::new(viewport.0, viewport.1)))
    }
}

fn node_document(node_id: &NodeId, node: &Node) -> NodeDocument {
    let position = node.position();
    let size = node.size();
    let style = node.style();
    NodeDocument {
        id: node_id.into(),
        x: Some(position.x),
        y: Some(position.y),
        width: Some(size.width),
        height: Some(size.height),
        position: None,
        size: None,
        text: node.text().to_owned(),
        color: Some(style.fill.clone()),
        text_color: Some(style.text_color.clone()),
        font_size: Some(style.font_size),
        is_central: node.is_central(),
    }
}

fn ensure_finite(ok: bool, field: &'static str) -> Result<(), MalformedDocumentError> {
    if ok {
        Ok(())
    } else {
        Err(MalformedDocumentError::NonFinite { field })
    }
}

pub fn encode(diagram: &Diagram) -> Result<String, serde_json::Error> {
    serde_json::to_string(&DiagramDocument::from_diagram(diagram))
}

/// Human-readable form for file export, newline-terminated.
pub fn encode_pretty(diagram: &Diagram) -> Result<String, serde_json::Error> {
    let mut out = serde_json::to_string_pretty(&DiagramDocument::from_diagram(diagram))?;
    out.push('\n');
    Ok(out)
}

pub fn decode(json: &str) -> Result<Diagram, MalformedDocumentError> {
    decode_with_node_size(json, DEFAULT_NODE_SIZE)
}

pub fn decode_with_node_size(
    json: &str,
    default_node_size: Size,
) -> Result<Diagram, MalformedDocumentError> {
    parse(json)?.into_diagram(default_node_size)
}

/// Parses without validating; validation happens when the document is rebuilt.
pub fn parse(json: &str) -> Result<DiagramDocument, MalformedDocumentError> {
    Ok(serde_json::from_str(json)?)
}
