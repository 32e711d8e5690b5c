//! CraftDraft Core Library
//!
//! Platform-agnostic interactive drafting engine for the CraftDraft 2D CAD editor:
//! camera, picking, snapping, the drafting tools and the kernel boundary.

pub mod ambiguity;
pub mod camera;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod geometry;
pub mod input;
pub mod kernel;
pub mod numeric;
pub mod overlay;
pub mod selection;
pub mod snap;
pub mod spatial;
pub mod store;
pub mod tools;

pub use ambiguity::AmbiguityController;
pub use camera::Camera;
pub use config::{ConfigError, EngineConfig};
pub use document::{Document, Entity, EntityId, Layer, LayerId};
pub use editor::Editor;
pub use error::{EditError, ToolError, ToolResult, Warning};
pub use geometry::{Geometry, Transform, WorldPoint};
pub use hit_test::{Hit, HitKind, hit_test};
pub use input::{InputEvent, InputState, Key, KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use kernel::{EditOp, EpsPolicy, GeometryKernel, MemoryKernel, Reason};
pub use numeric::NumericInput;
pub use overlay::{OverlayItem, OverlayStyle};
pub use selection::SelectionState;
pub use snap::{SnapCandidate, SnapKind, SnapResult, compute_snap};
pub use spatial::SpatialIndex;
pub use store::DocStore;
pub use tools::{ToolKind, ToolManager};
