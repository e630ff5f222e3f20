//! Terminal output for the interactive shell.
//!
//! Everything except assistant replies and command output goes to stderr so
//! stdout stays clean when piped. Layout is computed by plain functions that
//! return lines; [`Renderer`] only adds color and writes them.

pub mod input;
mod markdown;
pub mod settings;

pub use markdown::render_markdown_for_terminal;

use crossterm::style::{Color, Stylize};
use std::io::{self, Write};

use crate::gate::{PendingToolRequest, PromptFeedback, ToolCategory};

/// Values shown in the startup banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerInfo {
    pub name: String,
    pub provider: String,
    pub model: String,
    pub memory: bool,
    pub confirm_terminal: bool,
    pub confirm_tools: bool,
    pub tool_count: usize,
}

/// Handles all terminal output formatting.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    /// Print the user input prompt (to stderr).
    pub fn prompt(&self) {
        if self.color {
            eprint!("{} ", settings::PROMPT_SYMBOL.with(settings::COLOR_PROMPT).bold());
        } else {
            eprint!("{}", settings::PROMPT_PLAIN);
        }
        let _ = io::stderr().flush();
    }

    /// Print the assistant's reply as terminal-formatted markdown (to stdout).
    pub fn assistant_message(&self, content: &str) {
        let rendered = render_markdown_for_terminal(content);
        if self.color {
            println!(
                "\n{}\n{rendered}\n",
                settings::LABEL_AGENT.with(settings::COLOR_AGENT_LABEL).bold()
            );
        } else {
            println!("\n{}\n{rendered}\n", settings::LABEL_AGENT);
        }
    }

    /// Print one tool's output in a titled frame (to stderr).
    pub fn tool_output(&self, tool_name: &str, output: &str) {
        let lines = tool_box_lines(tool_name, output, settings::TOOL_OUTPUT_PREVIEW_LINES);
        let last = lines.len().saturating_sub(1);
        for (idx, line) in lines.iter().enumerate() {
            if !self.color {
                eprintln!("{line}");
            } else if idx == 0 || idx == last {
                eprintln!("{}", line.as_str().with(settings::COLOR_TOOL_FRAME));
            } else {
                let body = line.strip_prefix("│ ").unwrap_or(line);
                eprintln!(
                    "{} {}",
                    "│".with(settings::COLOR_TOOL_FRAME),
                    body.with(settings::COLOR_TOOL_TEXT)
                );
            }
        }
    }

    pub fn banner(&self, info: &BannerInfo) {
        let title = format!("{} {}", info.name, crate::build_info::version_summary());
        let rule = "─".repeat(settings::CONFIRMATION_WIDTH);
        if self.color {
            eprintln!("{}", title.as_str().with(settings::COLOR_AGENT_LABEL).bold());
            eprintln!("{}", rule.as_str().with(settings::COLOR_SECTION_BULLET));
        } else {
            eprintln!("{title}\n{rule}");
        }
        for (key, value) in banner_fields(info) {
            self.field(key, &value);
        }
        self.detail("Type //help for commands, 'exit' to quit.");
        eprintln!();
    }

    /// Print a small section header.
    pub fn section(&self, title: &str) {
        if self.color {
            eprintln!(
                "{} {}",
                settings::GLYPH_SECTION_BULLET.with(settings::COLOR_SECTION_BULLET),
                title.with(settings::COLOR_SECTION_TITLE).bold()
            );
        } else {
            eprintln!("{title}:");
        }
    }

    /// Print a key/value line under a section.
    pub fn field(&self, key: &str, value: &str) {
        if self.color {
            eprintln!(
                "{}{} {}",
                settings::INDENT_1,
                format!("{key}:").with(settings::COLOR_FIELD_KEY),
                value.with(settings::COLOR_FIELD_VALUE),
            );
        } else {
            eprintln!("{}{key}: {value}", settings::INDENT_1);
        }
    }

    pub fn detail(&self, text: &str) {
        if self.color {
            eprintln!("{}{}", settings::INDENT_1, text.with(settings::COLOR_FIELD_VALUE));
        } else {
            eprintln!("{}{text}", settings::INDENT_1);
        }
    }

    pub fn warn(&self, msg: &str) {
        self.labelled(settings::LABEL_WARNING, settings::COLOR_WARNING, msg);
    }

    pub fn error(&self, msg: &str) {
        self.labelled(settings::LABEL_ERROR, settings::COLOR_ERROR, msg);
    }

    fn labelled(&self, label: &str, color: Color, msg: &str) {
        if self.color {
            eprintln!("{} {msg}", label.with(color).bold());
        } else {
            eprintln!("{label} {msg}");
        }
    }

    /// Print a plain status line (to stderr).
    pub fn notice(&self, msg: &str) {
        if self.color {
            eprintln!("{}", msg.with(settings::COLOR_WARNING));
        } else {
            eprintln!("{msg}");
        }
    }

    /// Print the text returned by a `//command` (to stdout).
    pub fn command_output(&self, text: &str) {
        println!("{text}");
    }

    // -----------------------------------------------------------------------
    // Confirmation
    // -----------------------------------------------------------------------

    /// Print the batch awaiting approval.
    pub fn confirmation_request(&self, batch: &[PendingToolRequest]) {
        let lines = confirmation_lines(batch);
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr);
        for line in &lines {
            if !self.color {
                let _ = writeln!(stderr, "{line}");
                continue;
            }
            match line.chars().next() {
                Some('│') => {
                    let body = &line['│'.len_utf8()..];
                    let body_color = if body.contains(&format!("[{}]", ToolCategory::Shell.label())) {
                        settings::COLOR_CONFIRM_SHELL
                    } else if body.contains(&format!("[{}]", ToolCategory::Generic.label())) {
                        settings::COLOR_CONFIRM_TOOL
                    } else {
                        settings::COLOR_FIELD_VALUE
                    };
                    let _ = writeln!(
                        stderr,
                        "{}{}",
                        "│".with(settings::COLOR_CONFIRM_FRAME),
                        body.with(body_color)
                    );
                }
                _ => {
                    let _ = writeln!(stderr, "{}", line.as_str().with(settings::COLOR_CONFIRM_FRAME));
                }
            }
        }
    }

    /// Print the yes/no question without a trailing newline.
    pub fn confirmation_prompt(&self, question: &str) {
        if self.color {
            eprint!("{}", question.with(settings::COLOR_WARNING));
        } else {
            eprint!("{question}");
        }
    }

    pub fn confirmation_feedback(&self, feedback: PromptFeedback) {
        let text = feedback_text(feedback);
        if !self.color {
            eprintln!("{text}");
            return;
        }
        let color = match feedback {
            PromptFeedback::Invalid => settings::COLOR_WARNING,
            PromptFeedback::Approved => settings::COLOR_APPROVED,
            PromptFeedback::Denied => settings::COLOR_DENIED,
        };
        eprintln!("{}", text.with(color));
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Framed tool output: a title row, one `│ ` row per output line, a footer.
///
/// Output longer than `max_lines` is cut with a count of the hidden lines.
pub fn tool_box_lines(tool_name: &str, output: &str, max_lines: usize) -> Vec<String> {
    let header = format!("╭─ Tool: {tool_name} ─╮");
    let width = header.chars().count();
    let mut lines = vec![header];

    let body: Vec<&str> = output.trim_end().lines().collect();
    for line in body.iter().take(max_lines) {
        lines.push(format!("│ {line}"));
    }
    if body.len() > max_lines {
        lines.push(format!("│ ...{} more lines", body.len() - max_lines));
    }

    lines.push(format!("╰{}╯", "─".repeat(width.saturating_sub(2))));
    lines
}

/// Boxed listing of a confirmation batch, numbered from 1.
pub fn confirmation_lines(batch: &[PendingToolRequest]) -> Vec<String> {
    let inner = settings::CONFIRMATION_WIDTH;
    let title = format!("╭─ {} ", settings::CONFIRMATION_TITLE);
    let pad = (inner + 2).saturating_sub(title.chars().count() + 1);
    let mut lines = vec![
        format!("{title}{}╮", "─".repeat(pad)),
        format!("│ The agent wants to execute {} tool(s):", batch.len()),
        format!("├{}┤", "─".repeat(inner)),
    ];
    for (idx, request) in batch.iter().enumerate() {
        lines.push(format!(
            "│ {}. [{}] {}",
            idx + 1,
            request.category.label(),
            request.tool_name
        ));
        lines.push(format!("│    {}", request.payload));
    }
    lines.push(format!("╰{}╯", "─".repeat(inner)));
    lines
}

pub fn feedback_text(feedback: PromptFeedback) -> String {
    match feedback {
        PromptFeedback::Invalid => "Please answer 'yes' or 'no'".to_string(),
        PromptFeedback::Approved => {
            format!("{} Approved - executing all tools...\n", settings::GLYPH_OK)
        }
        PromptFeedback::Denied => {
            format!("{} Cancelled - blocking all tool execution\n", settings::GLYPH_CANCEL)
        }
    }
}

fn on_off(flag: bool) -> String {
    if flag { "ON" } else { "OFF" }.to_string()
}

fn banner_fields(info: &BannerInfo) -> Vec<(&'static str, String)> {
    vec![
        ("Provider", info.provider.clone()),
        ("Model", info.model.clone()),
        ("Memory", on_off(info.memory)),
        ("Confirm Terminal", on_off(info.confirm_terminal)),
        ("Confirm Tools", on_off(info.confirm_tools)),
        ("Tools", info.tool_count.to_string()),
    ]
}
