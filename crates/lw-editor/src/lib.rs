//! Interactive engine for the living-web flow editor.
//!
//! [`Editor`] consumes platform-neutral [`InputEvent`]s and authority
//! [`AuthorityEvent`]s and answers with [`Effect`]s for the host.

pub mod bounds;
pub mod config;
pub mod connect;
pub mod drag;
pub mod editor;
pub mod error;
pub mod fade;
pub mod input;
pub mod placement;
pub mod selection;
pub mod shortcuts;
pub mod sync;
pub mod viewport;

pub use bounds::{BoundsUpdate, CanvasBounds, SurfaceLayout};
pub use config::EditorConfig;
pub use editor::{Editor, Effect, Gesture, Notice, NoticeLevel};
pub use error::{ConnectError, EditorError, SyncError};
pub use input::{InputEvent, Modifiers, PaletteItem, PaletteKind};
pub use selection::ToolbarState;
pub use sync::{AuthorityEvent, Intent, PendingPlacement, PendingPlacements, Suggestion};
pub use viewport::Viewport;
