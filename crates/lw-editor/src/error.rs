use lw_core::{NodeId, PortName};
use thiserror::Error;

/// Why a connection attempt was refused.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConnectError {
    #[error("Cannot connect \"{source_port}\" output to \"{target_port}\" input: port types differ")]
    PortMismatch {
        source_port: PortName,
        target_port: PortName,
    },

    #[error("Cannot connect {node} to itself")]
    SelfLoop { node: NodeId },
}

/// Inbound authority messages that could not be understood.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("invalid event JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown authority event `{0}`")]
    UnknownEvent(String),

    #[error("event `{event}` is missing `{field}`")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
}

/// Failures surfaced to the user or host.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("Failed to add node: {message}")]
    PlacementFailure {
        placeholder: Option<NodeId>,
        message: String,
    },

    #[error("{0}")]
    Rejected(String),
}
