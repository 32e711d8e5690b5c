//! Interactive drafting tools.
//!
//! Every tool is a small state machine driven by pointer, key and wheel
//! events. Tools never touch the document directly: they read the store's
//! caches through a [`ToolContext`] and submit [`EditOp`]s via
//! [`ToolContext::commit`].

mod arc;
mod circle;
mod corner;
mod line;
mod mirror;
mod offset;
mod pattern;
mod polyline;
mod rect;
mod rotate;
mod scale;
mod transform;
mod translate;
mod trim;

pub use arc::{ArcState, ArcTool};
pub use circle::CircleTool;
pub use corner::{CornerOp, CornerStep, CornerTool};
pub use line::{LineState, LineTool};
pub use mirror::MirrorTool;
pub use offset::OffsetTool;
pub use pattern::PatternTool;
pub use polyline::PolylineTool;
pub use rect::RectTool;
pub use rotate::RotateTool;
pub use scale::ScaleTool;
pub use translate::MoveTool;
pub use trim::{TrimStep, TrimTool};

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::document::LayerId;
use crate::error::{ToolError, ToolResult};
use crate::hit_test::{Hit, hit_test};
use crate::input::{KeyEvent, Modifiers};
use crate::kernel::{EditOp, Reason};
use crate::numeric::NumericInput;
use crate::overlay::OverlayItem;
use crate::snap::{SnapResult, compute_snap};
use crate::store::DocStore;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Line,
    Move,
    Rotate,
    Scale,
    Offset,
    Trim,
    Rect,
    Circle,
    Arc,
    Polyline,
    Fillet,
    Chamfer,
    Mirror,
    Pattern,
}

impl ToolKind {
    /// Every tool, in toolbar order.
    pub const ALL: [ToolKind; 14] = [
        ToolKind::Line,
        ToolKind::Move,
        ToolKind::Rotate,
        ToolKind::Scale,
        ToolKind::Offset,
        ToolKind::Trim,
        ToolKind::Rect,
        ToolKind::Circle,
        ToolKind::Arc,
        ToolKind::Polyline,
        ToolKind::Fillet,
        ToolKind::Chamfer,
        ToolKind::Mirror,
        ToolKind::Pattern,
    ];

    /// Display name, also used as the title of warnings.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Line => "Line",
            ToolKind::Move => "Move",
            ToolKind::Rotate => "Rotate",
            ToolKind::Scale => "Scale",
            ToolKind::Offset => "Offset",
            ToolKind::Trim => "Trim",
            ToolKind::Rect => "Rect",
            ToolKind::Circle => "Circle",
            ToolKind::Arc => "Arc",
            ToolKind::Polyline => "Polyline",
            ToolKind::Fillet => "Fillet",
            ToolKind::Chamfer => "Chamfer",
            ToolKind::Mirror => "Mirror",
            ToolKind::Pattern => "Pattern",
        }
    }

    fn index(self) -> usize {
        ToolKind::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

/// Borrowed services a tool may use while handling one event.
pub struct ToolContext<'a> {
    pub store: &'a mut DocStore,
    pub camera: &'a Camera,
    pub modifiers: Modifiers,
    pub config: &'a EngineConfig,
}

impl ToolContext<'_> {
    pub fn to_world(&self, screen: Point) -> Point {
        self.camera.screen_to_world(screen)
    }

    /// Snap a world point, honouring the configured capture radius.
    pub fn snap(&self, world: Point, anchor: Option<Point>) -> SnapResult {
        let radius = self.config.snap_radius_px.map(|px| self.camera.world_radius(px));
        compute_snap(&*self.store, world, anchor).within(radius)
    }

    /// Pick the entity under a screen point.
    pub fn hit(&self, screen: Point) -> Option<Hit> {
        hit_test(&*self.store, self.camera, screen, self.config.hit_radius_px)
    }

    /// Layer that creation tools draw on.
    pub fn target_layer(&self) -> Result<LayerId, ToolError> {
        self.store.first_layer_id().ok_or(ToolError::NoLayer)
    }

    pub fn commit(&mut self, op: EditOp) -> Result<(), Reason> {
        self.store.commit(op)
    }
}

/// Uniform event interface implemented by every tool.
pub trait ToolHandler {
    fn on_pointer_down(&mut self, _ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        Ok(())
    }

    fn on_pointer_move(&mut self, _ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        Ok(())
    }

    fn on_pointer_up(&mut self, _ctx: &mut ToolContext<'_>, _screen: Point) -> ToolResult {
        Ok(())
    }

    fn on_key(&mut self, _ctx: &mut ToolContext<'_>, _key: &KeyEvent) -> ToolResult {
        Ok(())
    }

    /// Returns true when the tool consumed the wheel step.
    fn on_wheel(&mut self, _ctx: &mut ToolContext<'_>, _delta_y: f64) -> bool {
        false
    }

    /// Called on the outgoing tool when another tool becomes active.
    ///
    /// Pending ambiguity choices are dropped; other gesture state is kept.
    fn on_deactivate(&mut self, _ctx: &mut ToolContext<'_>) {}

    /// Abort the gesture: drop transient state and close any open undo group.
    fn cancel(&mut self, ctx: &mut ToolContext<'_>);

    /// Transient items to draw over the document.
    fn overlay(&self) -> Vec<OverlayItem>;

    /// True when no gesture is in progress.
    fn is_idle(&self) -> bool;

    /// The tool's typed numeric override.
    fn numeric(&self) -> &NumericInput;
}

/// One instance of each tool.
#[derive(Debug, Clone)]
pub enum Tool {
    Line(LineTool),
    Move(MoveTool),
    Rotate(RotateTool),
    Scale(ScaleTool),
    Offset(OffsetTool),
    Trim(TrimTool),
    Rect(RectTool),
    Circle(CircleTool),
    Arc(ArcTool),
    Polyline(PolylineTool),
    Fillet(CornerTool),
    Chamfer(CornerTool),
    Mirror(MirrorTool),
    Pattern(PatternTool),
}

macro_rules! dispatch {
    ($tool:expr, $t:ident => $body:expr) => {
        match $tool {
            Tool::Line($t) => $body,
            Tool::Move($t) => $body,
            Tool::Rotate($t) => $body,
            Tool::Scale($t) => $body,
            Tool::Offset($t) => $body,
            Tool::Trim($t) => $body,
            Tool::Rect($t) => $body,
            Tool::Circle($t) => $body,
            Tool::Arc($t) => $body,
            Tool::Polyline($t) => $body,
            Tool::Fillet($t) => $body,
            Tool::Chamfer($t) => $body,
            Tool::Mirror($t) => $body,
            Tool::Pattern($t) => $body,
        }
    };
}

impl Tool {
    /// Fresh tool of the given kind.
    pub fn new(kind: ToolKind) -> Self {
        match kind {
            ToolKind::Line => Tool::Line(LineTool::new()),
            ToolKind::Move => Tool::Move(MoveTool::new()),
            ToolKind::Rotate => Tool::Rotate(RotateTool::new()),
            ToolKind::Scale => Tool::Scale(ScaleTool::new()),
            ToolKind::Offset => Tool::Offset(OffsetTool::new()),
            ToolKind::Trim => Tool::Trim(TrimTool::new()),
            ToolKind::Rect => Tool::Rect(RectTool::new()),
            ToolKind::Circle => Tool::Circle(CircleTool::new()),
            ToolKind::Arc => Tool::Arc(ArcTool::new()),
            ToolKind::Polyline => Tool::Polyline(PolylineTool::new()),
            ToolKind::Fillet => Tool::Fillet(CornerTool::fillet()),
            ToolKind::Chamfer => Tool::Chamfer(CornerTool::chamfer()),
            ToolKind::Mirror => Tool::Mirror(MirrorTool::new()),
            ToolKind::Pattern => Tool::Pattern(PatternTool::new()),
        }
    }

    pub fn kind(&self) -> ToolKind {
        match self {
            Tool::Line(_) => ToolKind::Line,
            Tool::Move(_) => ToolKind::Move,
            Tool::Rotate(_) => ToolKind::Rotate,
            Tool::Scale(_) => ToolKind::Scale,
            Tool::Offset(_) => ToolKind::Offset,
            Tool::Trim(_) => ToolKind::Trim,
            Tool::Rect(_) => ToolKind::Rect,
            Tool::Circle(_) => ToolKind::Circle,
            Tool::Arc(_) => ToolKind::Arc,
            Tool::Polyline(_) => ToolKind::Polyline,
            Tool::Fillet(_) => ToolKind::Fillet,
            Tool::Chamfer(_) => ToolKind::Chamfer,
            Tool::Mirror(_) => ToolKind::Mirror,
            Tool::Pattern(_) => ToolKind::Pattern,
        }
    }

    /// The variant's handler.
    pub fn handler(&self) -> &dyn ToolHandler {
        dispatch!(self, t => t)
    }

    pub fn handler_mut(&mut self) -> &mut dyn ToolHandler {
        dispatch!(self, t => t)
    }
}

/// Holds every tool and tracks which one receives events.
///
/// Switching tools does not cancel the outgoing tool's gesture; its state is
/// kept until the user returns to it or presses Escape there. Ambiguity
/// candidates are the exception: the editor drops them on switch.
#[derive(Debug, Clone)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    tools: Vec<Tool>,
}

impl Default for ToolManager {
    fn default() -> Self {
        Self {
            current_tool: ToolKind::default(),
            tools: ToolKind::ALL.iter().map(|k| Tool::new(*k)).collect(),
        }
    }
}

impl ToolManager {
    /// Create a new tool manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.current_tool {
            log::debug!("Tool switched {} -> {}", self.current_tool.name(), tool.name());
        }
        self.current_tool = tool;
    }

    pub fn get(&self, kind: ToolKind) -> &Tool {
        &self.tools[kind.index()]
    }

    pub fn get_mut(&mut self, kind: ToolKind) -> &mut Tool {
        &mut self.tools[kind.index()]
    }

    pub fn active(&self) -> &Tool {
        self.get(self.current_tool)
    }

    pub fn active_mut(&mut self) -> &mut Tool {
        let kind = self.current_tool;
        self.get_mut(kind)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Tracks whether a tool has an undo group open so it is closed exactly once.
#[derive(Debug, Clone, Default)]
pub(crate) struct UndoGroup {
    open: bool,
}

impl UndoGroup {
    pub(crate) fn begin(&mut self, store: &mut DocStore, name: &str) {
        if self.open {
            return;
        }
        match store.begin_group(name) {
            Ok(()) => self.open = true,
            Err(reason) => log::warn!("Could not open undo group {name}: {reason}"),
        }
    }

    pub(crate) fn end(&mut self, store: &mut DocStore) {
        if !self.open {
            return;
        }
        self.open = false;
        if let Err(reason) = store.end_group() {
            log::warn!("Could not close undo group: {reason}");
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.open
    }
}

/// Exclusive horizontal/vertical constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisLock {
    #[default]
    None,
    Horizontal,
    Vertical,
}

impl AxisLock {
    /// Turn `lock` on, or off if it is already on.
    pub fn toggle(self, lock: AxisLock) -> AxisLock {
        if self == lock { AxisLock::None } else { lock }
    }

    /// Constrain `p` relative to `anchor`.
    pub fn apply(self, anchor: Point, p: Point) -> Point {
        match self {
            AxisLock::None => p,
            AxisLock::Horizontal => Point::new(p.x, anchor.y),
            AxisLock::Vertical => Point::new(anchor.x, p.y),
        }
    }

    /// Unit direction along the lock, signed like `v`.
    pub fn direction(self, v: Vec2) -> Option<Vec2> {
        match self {
            AxisLock::None => None,
            AxisLock::Horizontal => Some(Vec2::new(if v.x < 0.0 { -1.0 } else { 1.0 }, 0.0)),
            AxisLock::Vertical => Some(Vec2::new(0.0, if v.y < 0.0 { -1.0 } else { 1.0 })),
        }
    }
}

/// Independent horizontal and vertical locks; both on is a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AxisLocks {
    pub horizontal: bool,
    pub vertical: bool,
}

impl AxisLocks {
    pub fn conflict(&self) -> bool {
        self.horizontal && self.vertical
    }

    pub fn apply(&self, anchor: Point, mut p: Point) -> Point {
        if self.horizontal {
            p.y = anchor.y;
        }
        if self.vertical {
            p.x = anchor.x;
        }
        p
    }

    /// Toggle on H or V. Returns true if the key was a lock key.
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key.key.is_char('h') {
            self.horizontal = !self.horizontal;
            true
        } else if key.key.is_char('v') {
            self.vertical = !self.vertical;
            true
        } else {
            false
        }
    }
}

/// Move `p` so it lies `length` from `anchor` along the anchor-to-`p` direction.
///
/// Returns `p` unchanged when it coincides with `anchor`.
pub(crate) fn with_length(anchor: Point, p: Point, length: f64) -> Point {
    let v = p - anchor;
    let len = v.hypot();
    if len > 0.0 { anchor + v * (length / len) } else { p }
}


#[cfg(test)]
pub(crate) mod test_support {
    //! Fixture for driving tools directly in unit tests.

    use super::ToolContext;
    use crate::camera::Camera;
    use crate::config::EngineConfig;
    use crate::document::{DEFAULT_LAYER_ID, Document, Entity};
    use crate::geometry::Geometry;
    use crate::input::{Key, KeyEvent, Modifiers};
    use crate::kernel::MemoryKernel;
    use crate::store::DocStore;
    use kurbo::Point;

    pub struct Fixture {
        pub store: DocStore,
        pub camera: Camera,
        pub config: EngineConfig,
        pub modifiers: Modifiers,
    }

    impl Fixture {
        pub fn new() -> Self {
            Self::with(vec![])
        }

        /// Document holding the given entities on the default layer.
        pub fn with(entities: Vec<(&str, Geometry)>) -> Self {
            let mut doc = Document::new();
            for (id, geom) in entities {
                doc.push(Entity::new(id, DEFAULT_LAYER_ID, geom));
            }
            let config = EngineConfig::default();
            Self {
                store: DocStore::new(Box::new(MemoryKernel::new()), doc, &config),
                camera: Camera::new(),
                config,
                modifiers: Modifiers::default(),
            }
        }

        pub fn ctx(&mut self) -> ToolContext<'_> {
            ToolContext {
                store: &mut self.store,
                camera: &self.camera,
                modifiers: self.modifiers,
                config: &self.config,
            }
        }

        pub fn select(&mut self, ids: &[&str]) {
            self.store.selection_mut().set(ids.iter().copied());
        }

        /// Geometry of every document entity, in order.
        pub fn geoms(&self) -> Vec<Geometry> {
            self.store.document().entities.iter().map(|e| e.geom.clone()).collect()
        }

        pub fn geom(&self, id: &str) -> Geometry {
            self.store.document().entity(id).map(|e| e.geom.clone()).unwrap_or_else(|| panic!("no entity {id}"))
        }
    }

    /// Screen point over world `(x, y)` with the default camera.
    pub fn at(x: f64, y: f64) -> Point {
        Point::new(x, -y)
    }

    pub fn key(c: char) -> KeyEvent {
        KeyEvent::plain(Key::Char(c))
    }

    pub fn special(k: Key) -> KeyEvent {
        KeyEvent::plain(k)
    }

    pub fn close(a: Point, b: Point) -> bool {
        a.distance(b) < 1e-9
    }
}
