//! Keyboard shortcut registry and documentation.

use craftdraft_core::{Key, KeyEvent, ToolKind};

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    /// Tool the shortcut applies to; `None` for editor-wide shortcuts.
    pub tool: Option<ToolKind>,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, shift: bool, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            shift,
            tool: None,
            description,
        }
    }

    /// Shortcut handled by one tool only.
    pub const fn for_tool(tool: ToolKind, key: &'static str, description: &'static str) -> Self {
        Self {
            key,
            ctrl: false,
            shift: false,
            tool: Some(tool),
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }

    /// Whether a key press triggers this shortcut.
    pub fn matches(&self, event: &KeyEvent) -> bool {
        if event.modifiers.ctrl != self.ctrl || event.modifiers.shift != self.shift {
            return false;
        }
        match event.key {
            Key::Char(c) => {
                let mut chars = self.key.chars();
                matches!((chars.next(), chars.next()), (Some(k), None) if k.eq_ignore_ascii_case(&c))
            }
            Key::Enter => self.key == "Enter",
            Key::Escape => self.key == "Escape",
            Key::Tab => self.key == "Tab",
            Key::BackTab => self.key == "Shift+Tab",
            Key::Backspace => self.key == "Backspace",
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("Z", true, false, "Undo"),
            Shortcut::new("Z", true, true, "Redo"),
            Shortcut::new("Y", true, false, "Redo"),
            Shortcut::new("Escape", false, false, "Cancel the current gesture"),
            Shortcut::new("Backspace", false, false, "Delete the last typed digit"),
            Shortcut::for_tool(ToolKind::Line, "H", "Toggle horizontal lock"),
            Shortcut::for_tool(ToolKind::Line, "V", "Toggle vertical lock"),
            Shortcut::for_tool(ToolKind::Move, "X", "Lock movement to the X axis"),
            Shortcut::for_tool(ToolKind::Move, "Y", "Lock movement to the Y axis"),
            Shortcut::for_tool(ToolKind::Rotate, "Enter", "Commit the pending rotation"),
            Shortcut::for_tool(ToolKind::Scale, "Enter", "Commit the pending scale"),
            Shortcut::for_tool(ToolKind::Offset, "Enter", "Commit the offset"),
            Shortcut::for_tool(ToolKind::Trim, "Tab", "Next trim candidate"),
            Shortcut::for_tool(ToolKind::Trim, "Shift+Tab", "Previous trim candidate"),
            Shortcut::for_tool(ToolKind::Trim, "Enter", "Apply the current trim candidate"),
            Shortcut::for_tool(ToolKind::Rect, "H", "Toggle horizontal lock"),
            Shortcut::for_tool(ToolKind::Rect, "V", "Toggle vertical lock"),
            Shortcut::for_tool(ToolKind::Arc, "A", "Toggle end-angle lock"),
            Shortcut::for_tool(ToolKind::Polyline, "Enter", "Finish open"),
            Shortcut::for_tool(ToolKind::Polyline, "C", "Finish closed"),
            Shortcut::for_tool(ToolKind::Polyline, "Backspace", "Remove the last vertex"),
            Shortcut::for_tool(ToolKind::Polyline, "H", "Toggle horizontal lock"),
            Shortcut::for_tool(ToolKind::Polyline, "V", "Toggle vertical lock"),
            Shortcut::for_tool(ToolKind::Fillet, "Tab", "Next corner candidate"),
            Shortcut::for_tool(ToolKind::Fillet, "Enter", "Apply the current corner"),
            Shortcut::for_tool(ToolKind::Chamfer, "Tab", "Next corner candidate"),
            Shortcut::for_tool(ToolKind::Chamfer, "Enter", "Apply the current corner"),
            Shortcut::for_tool(ToolKind::Pattern, "Enter", "Create the linear pattern"),
        ]
    }

    /// Shortcuts that apply while `tool` is active, editor-wide ones first.
    pub fn for_tool(tool: ToolKind) -> Vec<Shortcut> {
        Self::all()
            .into_iter()
            .filter(|s| s.tool.is_none_or(|t| t == tool))
            .collect()
    }

    /// Description of what a key press does with `tool` active.
    pub fn describe(tool: ToolKind, event: &KeyEvent) -> Option<&'static str> {
        Self::for_tool(tool)
            .into_iter()
            .find(|s| s.matches(event))
            .map(|s| s.description)
    }

    /// Print all shortcuts to console.
    pub fn print_all() {
        println!("\n=== Keyboard Shortcuts ===");
        for shortcut in Self::all() {
            let scope = shortcut.tool.map_or("All", |t| t.name());
            println!("  {:10} {:12} {}", scope, shortcut.format(), shortcut.description);
        }
        println!();
    }
}
