//! Upload intake: manual file selection and drag-and-drop.
//!
//! Owns the transient drag-active flag and hands complete file sets to the
//! [`DocumentRegistry`]. In a terminal, dropping files onto the window pastes
//! their paths; [`parse_dropped_paths`] turns that text back into files.

use std::path::{Path, PathBuf};

use url::Url;

use crate::core::models::UploadFile;
use crate::core::registry::DocumentRegistry;

/// Extensions offered as a hint. The backend decides what it accepts.
pub const ACCEPTED_EXTENSIONS: [&str; 5] = ["pdf", "doc", "docx", "txt", "md"];

/// Whether a file name carries one of the advertised extensions.
pub fn is_accepted(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            ACCEPTED_EXTENSIONS
                .iter()
                .any(|accepted| accepted.eq_ignore_ascii_case(e))
        })
        .unwrap_or(false)
}

/// `.pdf, .doc, .docx, .txt, .md`
pub fn accepted_hint() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|e| format!(".{e}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Default)]
pub struct UploadIntake {
    drag_active: bool,
}

impl UploadIntake {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drag_active(&self) -> bool {
        self.drag_active
    }

    pub fn drag_enter(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_over(&mut self) {
        self.drag_active = true;
    }

    pub fn drag_leave(&mut self) {
        self.drag_active = false;
    }

    /// Finish a drag. Forwards the set only if it carries at least one file.
    pub fn drop(&mut self, files: Vec<UploadFile>, registry: &mut DocumentRegistry) -> bool {
        self.drag_active = false;
        if files.is_empty() {
            return false;
        }
        self.forward(files, registry)
    }

    /// Files chosen through the picker.
    pub fn select(&mut self, files: Vec<UploadFile>, registry: &mut DocumentRegistry) -> bool {
        if files.is_empty() {
            return false;
        }
        self.forward(files, registry)
    }

    fn forward(&self, files: Vec<UploadFile>, registry: &mut DocumentRegistry) -> bool {
        let unusual: Vec<&str> = files
            .iter()
            .map(|f| f.file_name.as_str())
            .filter(|name| !is_accepted(name))
            .collect();
        if !unusual.is_empty() {
            log::debug!("Forwarding files outside the advertised types: {unusual:?}");
        }
        registry.submit_upload(files)
    }
}

/// Parse text pasted by a terminal drop (or typed into the picker) into
/// upload files.
///
/// Accepts one path per line or several space-separated paths, with optional
/// single/double quotes, `file:` URIs and backslash-escaped spaces.
pub fn parse_dropped_paths(text: &str) -> Vec<UploadFile> {
    let mut paths = Vec::new();
    for line in text.lines() {
        paths.extend(split_paths(line.trim()));
    }
    paths
        .into_iter()
        .filter(|p| !p.is_empty())
        .map(|p| UploadFile::from_path(token_to_path(p)))
        .collect()
}

/// Decode `file:` URIs (percent escapes, `localhost` host). Anything that
/// does not parse as one is taken as a plain path.
fn token_to_path(token: String) -> PathBuf {
    if token.starts_with("file:") {
        match Url::parse(&token).map(|url| url.to_file_path()) {
            Ok(Ok(path)) => return path,
            _ => log::debug!("Treating unparseable file URI as a path: {token}"),
        }
    }
    PathBuf::from(token)
}

fn split_paths(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => quote = Some(c),
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            (None, c) if c.is_whitespace() => {
                if !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                }
            }
            (None, c) => current.push(c),
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}
