//! Targeted config persistence.
//!
//! Only the keys a command changes are rewritten; comments, ordering and
//! unrelated sections of the file are left as they are.

use std::path::Path;

use crate::error::ConfigError;

use super::ConfirmationConfig;

/// Persist every `[confirmation]` key.
pub fn persist_confirmation(path: &Path, confirmation: &ConfirmationConfig) -> Result<(), ConfigError> {
    let entries = toml::Value::Array(
        confirmation
            .safe_commands
            .iter()
            .map(|entry| toml::Value::String(entry.clone()))
            .collect(),
    );
    persist_values(
        path,
        "confirmation",
        &[
            ("confirm_terminal", confirmation.confirm_terminal.to_string()),
            ("confirm_tools", confirmation.confirm_tools.to_string()),
            ("whitelist_enabled", confirmation.whitelist_enabled.to_string()),
            ("safe_commands", entries.to_string()),
            ("batch_window_ms", confirmation.batch_window_ms.to_string()),
        ],
    )
}

/// Persist `[model].name`.
pub fn persist_model_name(path: &Path, name: &str) -> Result<(), ConfigError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ConfigError::Invalid("model.name cannot be empty".into()));
    }
    persist_values(path, "model", &[("name", toml_string(name))])
}

/// Persist `[agent].system_prompt`.
pub fn persist_system_prompt(path: &Path, prompt: &str) -> Result<(), ConfigError> {
    persist_values(path, "agent", &[("system_prompt", toml_string(prompt))])
}

fn persist_values(path: &Path, section: &str, values: &[(&str, String)]) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err.into()),
    };
    for (key, value) in values {
        text = upsert_value(&text, section, key, value);
    }
    std::fs::write(path, text)?;
    tracing::debug!(path = %path.display(), section, "persisted config values");
    Ok(())
}

/// Set `section.key = value` (value is a TOML literal), replacing an existing
/// assignment including any continuation lines of a multi-line value.
pub(super) fn upsert_value(input: &str, section: &str, key: &str, value: &str) -> String {
    let mut lines = if input.is_empty() {
        Vec::new()
    } else {
        input.lines().map(str::to_string).collect::<Vec<_>>()
    };
    let header = format!("[{section}]");
    let assignment = format!("{key} = {value}");

    let Some(start) = lines
        .iter()
        .position(|line| line.trim().eq_ignore_ascii_case(&header))
    else {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(header);
        lines.push(assignment);
        return ensure_trailing_newline(lines.join("\n"));
    };

    let end = lines
        .iter()
        .enumerate()
        .skip(start + 1)
        .find(|(_, line)| is_table_header(line))
        .map(|(idx, _)| idx)
        .unwrap_or(lines.len());

    if let Some(idx) = (start + 1..end).find(|&idx| is_assignment_key(&lines[idx], key)) {
        let last = assignment_end(&lines, idx, end);
        lines.splice(idx..=last, std::iter::once(assignment));
        return ensure_trailing_newline(lines.join("\n"));
    }

    // Append after the section's last non-blank line.
    let insert_at = (start + 1..end)
        .rev()
        .find(|&idx| !lines[idx].trim().is_empty())
        .map(|idx| idx + 1)
        .unwrap_or(start + 1);
    lines.insert(insert_at, assignment);
    ensure_trailing_newline(lines.join("\n"))
}

fn is_table_header(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with('[') && trimmed.ends_with(']') && !trimmed.contains('=')
}

/// Return true when `line` assigns a value to `key` (e.g., `key = ...`).
fn is_assignment_key(line: &str, key: &str) -> bool {
    let trimmed = line.trim_start();
    let Some(rest) = trimmed.strip_prefix(key) else {
        return false;
    };
    rest.trim_start().starts_with('=')
}

/// Index of the last line belonging to the assignment starting at `idx`:
/// the first line at which the assignment parses as complete TOML. A value
/// that never parses is treated as a single line.
fn assignment_end(lines: &[String], idx: usize, section_end: usize) -> usize {
    let mut candidate = String::new();
    for last in idx..section_end {
        if last > idx {
            candidate.push('\n');
        }
        candidate.push_str(&lines[last]);
        if candidate.parse::<toml::Table>().is_ok() {
            return last;
        }
    }
    idx
}

/// Encode `value` as a TOML string literal.
fn toml_string(value: &str) -> String {
    toml::Value::String(value.to_string()).to_string()
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
