//! Backend-neutral rendering for the living-web editor.
//!
//! [`paint::build_display_list`] turns editor state into a
//! [`scene::DisplayList`]; any [`scene::Surface`] can replay it.

pub mod hit;
pub mod paint;
pub mod scene;
pub mod svg;
pub mod vello_surface;

pub use hit::{GeometricHitTester, Hit, HitTester};
pub use paint::{Ghost, PaintInput, Theme, build_display_list};
pub use scene::{DisplayList, DrawItem, Rgba, StrokeStyle, Surface, TextAlign, replay};
