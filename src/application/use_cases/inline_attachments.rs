use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

/// `[[attachment:<display name>|<path>]]`
const PLACEHOLDER_PATTERN: &str = r"\[\[attachment:(?P<name>[^|\]]+)\|(?P<path>[^\]]+)\]\]";

fn placeholder_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).expect("placeholder pattern is valid"))
}

/// Placeholder text a client embeds in a message to attach a stored upload.
pub fn attachment_placeholder(display_name: &str, path: &Path) -> String {
    let name: String = display_name
        .chars()
        .filter(|c| !matches!(c, '|' | ']' | '['))
        .collect();
    format!("[[attachment:{}|{}]]", name, path.display())
}

/// Why a placeholder could not be replaced by file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentFailure {
    NotFound,
    OutsideUploadDir,
    NotAFile,
    NotText,
    Unreadable,
}

impl AttachmentFailure {
    pub fn marker(&self, name: &str) -> String {
        let reason = match self {
            AttachmentFailure::NotFound => "could not be found",
            AttachmentFailure::OutsideUploadDir => "is outside the upload directory",
            AttachmentFailure::NotAFile => "is not a regular file",
            AttachmentFailure::NotText => "is not valid UTF-8 text",
            AttachmentFailure::Unreadable => "could not be read",
        };
        format!("[Attachment error: '{name}' {reason}]")
    }
}

/// A turn's text after attachment processing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlinedText {
    /// Original text with successful placeholders removed and failed ones
    /// replaced by error markers.
    pub cleaned_text: String,
    /// Delimited file contents, in placeholder order.
    pub sections: Vec<String>,
}

impl InlinedText {
    /// Final turn content: trimmed text followed by every inlined section.
    pub fn into_content(self) -> String {
        let cleaned = self.cleaned_text.trim();
        if self.sections.is_empty() {
            return cleaned.to_string();
        }

        let sections = self.sections.join("\n\n");
        if cleaned.is_empty() {
            sections
        } else {
            format!("{cleaned}\n\n{sections}")
        }
    }
}

/// Replaces attachment placeholders with the contents of uploaded files.
///
/// Only regular files that resolve (after following symlinks) inside the
/// upload directory are ever read.
#[derive(Debug, Clone)]
pub struct AttachmentInliner {
    upload_dir: PathBuf,
}

impl AttachmentInliner {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn has_placeholders(text: &str) -> bool {
        placeholder_regex().is_match(text)
    }

    pub async fn inline(&self, text: &str) -> InlinedText {
        let mut cleaned_text = String::with_capacity(text.len());
        let mut sections = Vec::new();
        let mut last_end = 0;

        for captures in placeholder_regex().captures_iter(text) {
            let Some(whole) = captures.get(0) else {
                continue;
            };
            let name = captures["name"].trim();
            let raw_path = captures["path"].trim();

            cleaned_text.push_str(&text[last_end..whole.start()]);
            last_end = whole.end();

            match self.read_attachment(raw_path).await {
                Ok(content) => {
                    debug!("Inlined attachment '{}' ({} bytes)", name, content.len());
                    sections.push(wrap_section(name, &content));
                }
                Err(failure) => {
                    warn!("Attachment '{}' at {} not inlined: {:?}", name, raw_path, failure);
                    cleaned_text.push_str(&failure.marker(name));
                }
            }
        }
        cleaned_text.push_str(&text[last_end..]);

        InlinedText {
            cleaned_text,
            sections,
        }
    }

    async fn read_attachment(&self, raw_path: &str) -> Result<String, AttachmentFailure> {
        let requested = Path::new(raw_path);
        let candidate = if requested.is_absolute() {
            requested.to_path_buf()
        } else {
            self.upload_dir.join(requested)
        };

        let root = match tokio::fs::canonicalize(&self.upload_dir).await {
            Ok(root) => root,
            Err(e) => {
                warn!(
                    "Upload directory {} cannot be resolved: {}",
                    self.upload_dir.display(),
                    e
                );
                return Err(AttachmentFailure::OutsideUploadDir);
            }
        };

        // Lexical check first: nothing outside the root is touched.
        let lexical = normalize_lexically(&candidate);
        if !lexical.starts_with(&root) && !lexical.starts_with(normalize_lexically(&self.upload_dir))
        {
            return Err(AttachmentFailure::OutsideUploadDir);
        }

        let resolved = tokio::fs::canonicalize(&candidate)
            .await
            .map_err(|e| failure_from_io(e.kind()))?;

        if !resolved.starts_with(&root) {
            return Err(AttachmentFailure::OutsideUploadDir);
        }

        let metadata = tokio::fs::metadata(&resolved)
            .await
            .map_err(|e| failure_from_io(e.kind()))?;
        if !metadata.is_file() {
            return Err(AttachmentFailure::NotAFile);
        }

        let bytes = tokio::fs::read(&resolved)
            .await
            .map_err(|e| failure_from_io(e.kind()))?;

        String::from_utf8(bytes).map_err(|_| AttachmentFailure::NotText)
    }
}

/// Resolve `.` and `..` without touching the filesystem.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

fn failure_from_io(kind: ErrorKind) -> AttachmentFailure {
    match kind {
        ErrorKind::NotFound => AttachmentFailure::NotFound,
        ErrorKind::InvalidData => AttachmentFailure::NotText,
        _ => AttachmentFailure::Unreadable,
    }
}

fn wrap_section(name: &str, content: &str) -> String {
    format!(
        "--- BEGIN ATTACHMENT: {name} ---\n{}\n--- END ATTACHMENT: {name} ---",
        content.trim_end_matches(['\r', '\n'])
    )
}
