use std::io;

use thiserror::Error;

use crate::model::ComponentKind;
use crate::protocol::MessageKind;

/// Structural problems in a surface tree offered for adoption.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("surface root must be of type Surface, found {found:?}")]
    NotSurfaceRoot { found: ComponentKind },

    #[error("node '{id}' has type Surface but is not the root")]
    NestedSurface { id: String },

    #[error("duplicate node id '{id}'")]
    DuplicateId { id: String },

    #[error("node with an empty id below '{parent}'")]
    EmptyId { parent: String },
}

/// Reasons a data model patch was refused. A refused patch never mutates the tree.
#[derive(Debug, Error)]
pub enum PatchError {
    #[error("patch path is empty")]
    EmptyPath,

    #[error("patch path '{path}' has no field segment after the node id")]
    MissingField { path: String },

    #[error("patch path '{path}' contains an empty segment")]
    EmptySegment { path: String },

    #[error("field '{field}' cannot be patched")]
    UnpatchableField { field: String },

    #[error("no node with id '{id}'")]
    NodeNotFound { id: String },

    #[error("node id '{id}' is empty or already in use")]
    InvalidId { id: String },

    #[error("patch on '{id}' would leave the Surface type off the root or below it")]
    MisplacedSurface { id: String },

    #[error("invalid array index '{segment}'")]
    InvalidIndex { segment: String },

    #[error("failed to encode node '{id}' for patching: {source}")]
    Encode {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("patched node '{id}' failed validation: {source}")]
    Rejected {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Stream-level failures. These end the consumption loop.
#[derive(Debug, Error)]
pub enum StreamError {
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("frame too large: {len} > {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("malformed {kind} payload: {source}")]
    Payload {
        kind: MessageKind,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid surface '{surface_id}': {source}")]
    InvalidSurface {
        surface_id: String,
        #[source]
        source: TreeError,
    },
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("failed to spawn {name} thread: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: io::Error,
    },
}

impl HostError {
    #[must_use]
    pub fn spawn(name: &'static str, source: io::Error) -> Self {
        Self::Spawn { name, source }
    }
}
