//! Window-level event routing: one place that owns the store, the camera and
//! every tool, and turns input events into tool calls.

use crate::camera::Camera;
use crate::config::EngineConfig;
use crate::document::{Document, EntityId};
use crate::error::{EditError, ToolResult, Warning};
use crate::input::{InputEvent, InputState, KeyEvent, MouseButton, PointerEvent};
use crate::kernel::{GeometryKernel, MemoryKernel};
use crate::overlay::OverlayItem;
use crate::store::DocStore;
use crate::tools::{ToolContext, ToolHandler, ToolKind, ToolManager};

/// The interactive drafting engine.
#[derive(Debug)]
pub struct Editor {
    store: DocStore,
    camera: Camera,
    config: EngineConfig,
    tools: ToolManager,
    input: InputState,
    warnings: Vec<Warning>,
}

impl Editor {
    pub fn new(kernel: Box<dyn GeometryKernel>, document: Document, config: EngineConfig) -> Self {
        let store = DocStore::new(kernel, document, &config);
        Self {
            store,
            camera: Camera::with_limits(config.min_zoom, config.max_zoom),
            config,
            tools: ToolManager::new(),
            input: InputState::new(),
            warnings: Vec::new(),
        }
    }

    /// Editor over an empty document backed by the in-memory kernel.
    pub fn with_memory_kernel(config: EngineConfig) -> Self {
        Self::new(Box::new(MemoryKernel::new()), Document::new(), config)
    }

    pub fn store(&self) -> &DocStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut DocStore {
        &mut self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    /// Activate `tool`. The outgoing tool loses any pending ambiguity choice.
    pub fn set_tool(&mut self, tool: ToolKind) {
        if tool != self.tools.current_tool {
            self.with_tool(|outgoing, ctx| outgoing.on_deactivate(ctx));
        }
        self.tools.set_tool(tool);
    }

    /// Replace the selection.
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<EntityId>,
    {
        self.store.selection_mut().set(ids);
    }

    /// Warnings queued since the last call.
    pub fn take_warnings(&mut self) -> Vec<Warning> {
        std::mem::take(&mut self.warnings)
    }

    /// Overlay of the active tool.
    pub fn overlay(&self) -> Vec<OverlayItem> {
        self.tools.active().handler().overlay()
    }

    /// Process one input event to completion.
    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Pointer { pointer } => self.handle_pointer(pointer),
            InputEvent::Key { key } => self.handle_key(key),
            InputEvent::Modifiers { modifiers } => self.input.set_modifiers(modifiers),
            InputEvent::SetTool { tool } => self.set_tool(tool),
            InputEvent::Select { ids } => self.select(ids),
            InputEvent::Pan { delta } => self.camera.pan(delta),
            InputEvent::Undo => self.undo(),
            InputEvent::Redo => self.redo(),
        }
    }

    pub fn undo(&mut self) {
        match self.store.undo() {
            Ok(()) => log::info!("Undo"),
            Err(reason) => self.warn("Undo", reason.into()),
        }
    }

    pub fn redo(&mut self) {
        match self.store.redo() {
            Ok(()) => log::info!("Redo"),
            Err(reason) => self.warn("Redo", reason.into()),
        }
    }

    fn handle_pointer(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(&event);
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
            } => {
                let result = self.with_tool(|tool, ctx| tool.on_pointer_down(ctx, position));
                self.report(result);
            }
            PointerEvent::Up {
                position,
                button: MouseButton::Left,
            } => {
                let result = self.with_tool(|tool, ctx| tool.on_pointer_up(ctx, position));
                self.report(result);
            }
            PointerEvent::Move { position } => {
                // Middle drag pans regardless of the active tool.
                if self.input.is_button_pressed(MouseButton::Middle) {
                    let delta = self.input.pointer_delta();
                    self.camera.pan(delta);
                    return;
                }
                let result = self.with_tool(|tool, ctx| tool.on_pointer_move(ctx, position));
                self.report(result);
            }
            PointerEvent::Wheel { position, delta_y } => {
                let consumed = self.with_tool(|tool, ctx| tool.on_wheel(ctx, delta_y));
                if !consumed {
                    self.camera.wheel_zoom(position, delta_y, self.config.wheel_zoom_factor);
                }
            }
            PointerEvent::Down { .. } | PointerEvent::Up { .. } => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.is_undo() {
            self.undo();
        } else if key.is_redo() {
            self.redo();
        } else {
            let result = self.with_tool(|tool, ctx| tool.on_key(ctx, &key));
            self.report(result);
        }
    }

    fn with_tool<R>(&mut self, f: impl FnOnce(&mut dyn ToolHandler, &mut ToolContext<'_>) -> R) -> R {
        let mut ctx = ToolContext {
            store: &mut self.store,
            camera: &self.camera,
            modifiers: self.input.modifiers,
            config: &self.config,
        };
        f(self.tools.active_mut().handler_mut(), &mut ctx)
    }

    fn report(&mut self, result: ToolResult) {
        if let Err(err) = result {
            let title = self.tools.current_tool.name();
            self.warn(title, err);
        }
    }

    fn warn(&mut self, title: &str, err: EditError) {
        log::warn!("{title}: {err}");
        self.warnings.push(Warning::from_error(title, &err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DEFAULT_LAYER_ID, Entity};
    use crate::geometry::Geometry;
    use crate::input::{Key, Modifiers};
    use crate::kernel::codes;
    use kurbo::{Point, Vec2};

    fn down(x: f64, y: f64) -> InputEvent {
        InputEvent::Pointer {
            pointer: PointerEvent::Down {
                position: Point::new(x, -y),
                button: MouseButton::Left,
            },
        }
    }

    fn up(x: f64, y: f64) -> InputEvent {
        InputEvent::Pointer {
            pointer: PointerEvent::Up {
                position: Point::new(x, -y),
                button: MouseButton::Left,
            },
        }
    }

    fn moved(x: f64, y: f64) -> InputEvent {
        InputEvent::Pointer {
            pointer: PointerEvent::Move {
                position: Point::new(x, -y),
            },
        }
    }

    fn key(key: Key) -> InputEvent {
        InputEvent::Key {
            key: KeyEvent::plain(key),
        }
    }

    #[test]
    fn test_line_then_undo_redo_chords() {
        let mut editor = Editor::with_memory_kernel(EngineConfig::default());
        editor.handle(down(0.0, 0.0));
        editor.handle(moved(3.0, 4.0));
        editor.handle(up(3.0, 4.0));
        assert_eq!(editor.store().document().entities.len(), 1);

        let ctrl = |c| InputEvent::Key {
            key: KeyEvent {
                key: Key::Char(c),
                modifiers: Modifiers::ctrl(),
            },
        };
        editor.handle(ctrl('z'));
        assert!(editor.store().document().entities.is_empty());
        editor.handle(ctrl('y'));
        assert_eq!(editor.store().document().entities.len(), 1);
        assert!(editor.take_warnings().is_empty());
    }

    #[test]
    fn test_failures_become_warnings() {
        let mut editor = Editor::with_memory_kernel(EngineConfig::default());
        editor.handle(InputEvent::Undo);
        editor.handle(InputEvent::SetTool { tool: ToolKind::Move });
        editor.handle(down(0.0, 0.0));
        let warnings = editor.take_warnings();
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].title, "Undo");
        assert_eq!(warnings[0].code, codes::HISTORY_NOTHING_TO_UNDO);
        assert_eq!(warnings[1].title, "Move");
        assert_eq!(warnings[1].code, codes::EDIT_NO_SELECTION);
        assert!(editor.take_warnings().is_empty());
    }

    #[test]
    fn test_wheel_zooms_when_tool_ignores_it() {
        let mut editor = Editor::with_memory_kernel(EngineConfig::default());
        editor.handle(InputEvent::Pointer {
            pointer: PointerEvent::Wheel {
                position: Point::ZERO,
                delta_y: 1.0,
            },
        });
        assert!((editor.camera().zoom - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_wheel_cycles_trim_candidates() {
        let mut doc = Document::new();
        doc.push(Entity::new("t", DEFAULT_LAYER_ID, Geometry::line(Point::ZERO, Point::new(10.0, 0.0))));
        doc.push(Entity::new("c", DEFAULT_LAYER_ID, Geometry::Circle { c: Point::new(5.0, 0.0), r: 2.0 }));
        let mut editor = Editor::new(Box::new(MemoryKernel::new()), doc, EngineConfig::default());
        editor.handle(InputEvent::SetTool { tool: ToolKind::Trim });
        editor.handle(down(5.0, 0.0));
        editor.handle(down(5.0, 2.0));
        let zoom = editor.camera().zoom;
        editor.handle(InputEvent::Pointer {
            pointer: PointerEvent::Wheel {
                position: Point::ZERO,
                delta_y: 1.0,
            },
        });
        assert_eq!(editor.camera().zoom, zoom);
        editor.handle(key(Key::Escape));
        assert!(editor.tools().active().handler().is_idle());
    }

    #[test]
    fn test_pan_and_middle_drag() {
        let mut editor = Editor::with_memory_kernel(EngineConfig::default());
        editor.handle(InputEvent::Pan { delta: Vec2::new(10.0, 0.0) });
        assert!((editor.camera().origin.x + 10.0).abs() < 1e-12);

        editor.handle(InputEvent::Pointer {
            pointer: PointerEvent::Down {
                position: Point::ZERO,
                button: MouseButton::Middle,
            },
        });
        editor.handle(InputEvent::Pointer {
            pointer: PointerEvent::Move {
                position: Point::new(5.0, 0.0),
            },
        });
        assert!((editor.camera().origin.x + 15.0).abs() < 1e-12);
        assert!(editor.store().document().entities.is_empty());
    }

    #[test]
    fn test_tool_switch_keeps_gesture() {
        let mut editor = Editor::with_memory_kernel(EngineConfig::default());
        editor.handle(InputEvent::SetTool { tool: ToolKind::Polyline });
        editor.handle(down(0.0, 0.0));
        editor.handle(up(0.0, 0.0));
        editor.handle(InputEvent::SetTool { tool: ToolKind::Circle });
        editor.handle(InputEvent::SetTool { tool: ToolKind::Polyline });
        editor.handle(down(4.0, 0.0));
        editor.handle(up(4.0, 0.0));
        editor.handle(key(Key::Enter));
        assert!(matches!(
            editor.store().document().entities.as_slice(),
            [Entity { geom: Geometry::Polyline { .. }, .. }]
        ));
    }

    #[test]
    fn test_tool_switch_drops_trim_candidates() {
        let mut doc = Document::new();
        doc.push(Entity::new("t", DEFAULT_LAYER_ID, Geometry::line(Point::ZERO, Point::new(10.0, 0.0))));
        doc.push(Entity::new("c", DEFAULT_LAYER_ID, Geometry::Circle { c: Point::new(5.0, 0.0), r: 2.0 }));
        let before = doc.clone();
        let mut editor = Editor::new(Box::new(MemoryKernel::new()), doc, EngineConfig::default());
        editor.handle(InputEvent::SetTool { tool: ToolKind::Trim });
        editor.handle(down(5.0, 0.0));
        editor.handle(down(5.0, 2.0));
        assert!(!editor.tools().active().handler().is_idle());

        editor.handle(InputEvent::SetTool { tool: ToolKind::Line });
        editor.handle(InputEvent::SetTool { tool: ToolKind::Trim });
        assert!(editor.tools().active().handler().is_idle());
        assert!(editor.overlay().is_empty());
        editor.handle(key(Key::Enter));
        assert_eq!(editor.store().document(), &before);
        assert!(editor.take_warnings().is_empty());
    }
}
