//! Drawing-tool primitives.
//!
//! All ~30 kinds share one [`Tool`] entity carrying `{points, options}`;
//! kind-specific geometry lives in `match` dispatch over [`ToolKind`].

pub mod hit_test;
pub mod kind;
pub mod levels;
pub mod options;
pub mod tool;

pub use hit_test::{HitContext, ToolHit};
pub use kind::{Placement, ShapeFamily, ToolKind, initial_sticky_options};
pub use options::{FibLevel, ToolOptions};
pub use tool::{Tool, ToolId, ToolState};
