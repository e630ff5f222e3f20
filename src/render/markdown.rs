//! Markdown-to-terminal rendering for assistant replies.

use termimad::MadSkin;

/// Lay out markdown as plain terminal text. Styling is left to the caller.
pub fn render_markdown_for_terminal(input: &str) -> String {
    let skin = MadSkin::no_style();
    let formatted = skin.text(input, None).to_string();
    formatted.trim_end_matches('\n').to_string()
}
