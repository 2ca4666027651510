//! Input model: tools, tool settings, selection, and keyboard commands.
//!
//! This module defines the UI-side state the engine consults when it turns a
//! toolbar click or key press into a document edit. `Tool` and `ToolSettings`
//! decide how new strokes look, `UiState::selection` names the primitives
//! that Delete and recoloring act on, and [`command_for`] maps key presses to
//! history commands.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::{DEFAULT_COLOR, DEFAULT_ERASER_SIZE, DEFAULT_PENCIL_SIZE};
use crate::identity::Identity;

/// Which tool is currently active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tool {
    /// Pointer / selection tool (default). Dragging empty space pans.
    #[default]
    Cursor,
    /// Freehand drawing with the current color.
    Pencil,
    /// Freehand erasing.
    Eraser,
}

impl Tool {
    /// Whether pointer drags produce freehand strokes.
    #[must_use]
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Pencil | Self::Eraser)
    }

    /// Parse a toolbar tool name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "cursor" => Some(Self::Cursor),
            "pencil" => Some(Self::Pencil),
            "eraser" => Some(Self::Eraser),
            _ => None,
        }
    }
}

/// Closed shapes offered by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Rectangle,
    Triangle,
}

impl Shape {
    /// Parse a toolbar shape name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "circle" => Some(Self::Circle),
            "rectangle" | "rect" => Some(Self::Rectangle),
            "triangle" => Some(Self::Triangle),
            _ => None,
        }
    }
}

/// Brush settings shared by every tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolSettings {
    /// CSS color for new primitives and pencil strokes.
    pub color: String,
    /// Pencil stroke width in pixels.
    pub pencil_size: f64,
    /// Eraser stroke width in pixels.
    pub eraser_size: f64,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_owned(),
            pencil_size: DEFAULT_PENCIL_SIZE,
            eraser_size: DEFAULT_ERASER_SIZE,
        }
    }
}

/// Keyboard modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Command on macOS.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the browser (e.g. `"Delete"`, `"z"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

/// A history or selection command triggered from the keyboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Undo,
    Redo,
    DeleteSelection,
}

/// Map a key press to a command.
#[must_use]
pub fn command_for(key: &Key, modifiers: Modifiers) -> Option<Command> {
    match key.0.as_str() {
        "Delete" | "Backspace" => Some(Command::DeleteSelection),
        "z" | "Z" if modifiers.command() && modifiers.shift => Some(Command::Redo),
        "z" | "Z" if modifiers.command() => Some(Command::Undo),
        "y" | "Y" if modifiers.command() => Some(Command::Redo),
        _ => None,
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Currently active tool.
    pub tool: Tool,
    /// Brush settings.
    pub settings: ToolSettings,
    /// Selected primitives; the first is the active one.
    pub selection: Vec<Identity>,
}

impl UiState {
    /// The active (first selected) primitive.
    #[must_use]
    pub fn active(&self) -> Option<&Identity> {
        self.selection.first()
    }

    /// Drop `identity` from the selection if present.
    pub fn deselect(&mut self, identity: &Identity) {
        self.selection.retain(|id| id != identity);
    }
}
