//! Usage text for a command node

use crate::cli::command::{CommandNode, NodeKind};
use crate::cli::options::{FlagSpec, ValueKind};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Render usage for the node reached through `path`
///
/// ```text
/// usage: cmd [flags] <command>
///
/// Manage things.
///
/// commands:
///   list   List things
///   run    Run a thing
///
/// flags:
///   -configfile string   configuration file path (default "app.toml")
///   -debug               turn on debug logging
/// ```
pub fn render(path: &str, node: &CommandNode) -> String {
    let flags = node.options().map(|o| o.flags()).unwrap_or_default();

    let mut out = String::new();
    let _ = write!(out, "usage: {}", path);
    if !flags.is_empty() {
        out.push_str(" [flags]");
    }
    match node.kind() {
        NodeKind::Terminal(_) => out.push_str(" [args...]"),
        NodeKind::Subcommands(_) => out.push_str(" <command>"),
    }
    out.push('\n');

    if !node.help().is_empty() {
        let _ = write!(out, "\n{}\n", node.help().trim_end());
    }

    if let Some(children) = node.subcommands().filter(|c| !c.is_empty()) {
        out.push_str("\ncommands:\n");
        let rows: Vec<(String, String)> = children
            .iter()
            .map(|(name, child)| (name.clone(), first_line(child.help()).to_string()))
            .collect();
        write_rows(&mut out, &rows);
    }

    if !flags.is_empty() {
        out.push_str("\nflags:\n");
        let rows: Vec<(String, String)> = flags.iter().map(flag_row).collect();
        write_rows(&mut out, &rows);
    }

    out
}

fn flag_row(spec: &FlagSpec) -> (String, String) {
    let left = match spec.kind {
        ValueKind::Bool => format!("-{}", spec.name),
        kind => format!("-{} {}", spec.name, kind),
    };

    let mut right = spec.short.clone();
    if !spec.default.is_zero() {
        let shown = match spec.kind {
            ValueKind::String => format!("{:?}", spec.default.to_string()),
            _ => spec.default.to_string(),
        };
        if !right.is_empty() {
            right.push(' ');
        }
        let _ = write!(right, "(default {})", shown);
    }
    (left, right)
}

fn write_rows(out: &mut String, rows: &[(String, String)]) {
    let width = rows
        .iter()
        .map(|(left, _)| UnicodeWidthStr::width(left.as_str()))
        .max()
        .unwrap_or(0);

    for (left, right) in rows {
        if right.is_empty() {
            let _ = writeln!(out, "  {}", left);
            continue;
        }
        let pad = width - UnicodeWidthStr::width(left.as_str());
        let _ = writeln!(out, "  {}{}   {}", left, " ".repeat(pad), right);
    }
}

fn first_line(text: &str) -> &str {
    text.lines().next().unwrap_or_default().trim()
}
