//! Human-readable progress transcript printed to stdout.
//!
//! Each line is indented two spaces per level of recursion. Permission and
//! permission-warning lines sit two further spaces under their item.

const INDENT: usize = 2;

fn pad(depth: usize) -> String {
    " ".repeat(depth * INDENT)
}

pub fn folder_line(depth: usize, name: &str) -> String {
    format!("{}📁 Folder: {}", pad(depth), name)
}

pub fn file_line(depth: usize, name: &str) -> String {
    format!("{}📄 File: {}", pad(depth), name)
}

pub fn permission_line(depth: usize, grantee: &str) -> String {
    format!("{}  🔐 Copied permission for {}", pad(depth), grantee)
}

pub fn permission_failed_line(
    depth: usize,
    grantee: &str,
    error: &dyn std::fmt::Display,
) -> String {
    format!(
        "{}  ⚠️ Failed to copy permission for {}: {}",
        pad(depth),
        grantee,
        error
    )
}

pub fn permission_list_failed_line(depth: usize, error: &dyn std::fmt::Display) -> String {
    format!("{}  ⚠️ Failed to read permissions: {}", pad(depth), error)
}

pub fn error_line(depth: usize, what: &str, name: &str, error: &dyn std::fmt::Display) -> String {
    format!("{}✗ Error copying {} '{}': {}", pad(depth), what, name, error)
}

/// Writes progress lines; `quiet` suppresses them (tests, scripted runs).
#[derive(Debug, Clone, Copy, Default)]
pub struct Progress {
    quiet: bool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn quiet() -> Self {
        Self { quiet: true }
    }

    pub fn emit(&self, line: String) {
        if !self.quiet {
            println!("{}", line);
        }
    }

    pub fn started(&self, source: &str, destination: &str) {
        self.emit(format!(
            "\n🔄 Starting copy:\n  From: {}\n  To:   {}\n",
            source, destination
        ));
    }

    pub fn finished(&self) {
        self.emit("\n✅ Done copying folder with permissions!".to_string());
    }
}
