pub mod flow;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;
pub mod store;
pub mod wire;

pub use flow::FlowView;
pub use id::{EdgeId, NodeId};
pub use layout::{CompositeFrame, NodeGeometry, resolve_layout};
pub use model::*;
pub use store::{GraphStore, Selection};
pub use wire::DecodeError;

// Re-export kurbo so downstream crates agree on geometry types
pub use kurbo;
