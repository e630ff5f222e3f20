//! Hardcoded UI strings, glyphs, and colors for terminal output.

use crossterm::style::Color;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

pub const INDENT_1: &str = "  ";
pub const TOOL_OUTPUT_PREVIEW_LINES: usize = 20;

// ---------------------------------------------------------------------------
// Labels / glyphs
// ---------------------------------------------------------------------------

pub const PROMPT_SYMBOL: &str = ">";
pub const PROMPT_PLAIN: &str = "You: ";
pub const LABEL_AGENT: &str = "Agent:";
pub const LABEL_WARNING: &str = "warning:";
pub const LABEL_ERROR: &str = "error:";

pub const GLYPH_SECTION_BULLET: &str = "•";
pub const GLYPH_OK: &str = "✓";
pub const GLYPH_CANCEL: &str = "✗";
pub const GLYPH_ATTENTION: &str = "⚠";

pub const CONFIRMATION_TITLE: &str = "⚠ Confirmation Required";
pub const CONFIRMATION_WIDTH: usize = 60;

// ---------------------------------------------------------------------------
// Colors
// ---------------------------------------------------------------------------

pub const COLOR_PROMPT: Color = Color::Green;
pub const COLOR_AGENT_LABEL: Color = Color::Blue;
pub const COLOR_TOOL_FRAME: Color = Color::DarkCyan;
pub const COLOR_TOOL_TEXT: Color = Color::Grey;
pub const COLOR_CONFIRM_FRAME: Color = Color::Yellow;
pub const COLOR_CONFIRM_SHELL: Color = Color::Red;
pub const COLOR_CONFIRM_TOOL: Color = Color::Magenta;
pub const COLOR_APPROVED: Color = Color::Green;
pub const COLOR_DENIED: Color = Color::Red;
pub const COLOR_WARNING: Color = Color::Yellow;
pub const COLOR_ERROR: Color = Color::Red;
pub const COLOR_SECTION_BULLET: Color = Color::DarkGrey;
pub const COLOR_SECTION_TITLE: Color = Color::White;
pub const COLOR_FIELD_KEY: Color = Color::DarkGrey;
pub const COLOR_FIELD_VALUE: Color = Color::Grey;
