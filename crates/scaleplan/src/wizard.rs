//! Helpers for driving a workflow from the terminal.

use scaleplan_core::EncodedImage;
use scaleplan_error::{WorkflowError, WorkflowResult};
use scaleplan_workflow::WorkflowState;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Structured record written after a run.
pub const RECORD_FILE: &str = "extracted_data.json";
/// Final plan.
pub const PLAN_FILE: &str = "plan.md";
/// Fact-check of the plan.
pub const FACT_CHECK_FILE: &str = "fact_check.md";
/// Slide storyboard.
pub const STORYBOARD_FILE: &str = "storyboard.md";

/// MIME type for a screenshot file, judged by extension.
pub fn mime_for_path(path: &Path) -> Option<&'static str> {
    let extension = path.extension()?.to_str()?.to_ascii_lowercase();
    match extension.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Reads one screenshot from disk.
///
/// # Errors
///
/// Returns a validation error for unsupported extensions, unreadable files
/// and empty files.
pub fn load_screenshot(path: impl AsRef<Path>) -> WorkflowResult<EncodedImage> {
    let path = path.as_ref();
    let mime = mime_for_path(path).ok_or_else(|| {
        WorkflowError::validation(format!(
            "{}: expected a .png, .jpg, .jpeg, .gif or .webp file",
            path.display()
        ))
    })?;
    let bytes = std::fs::read(path)
        .map_err(|e| WorkflowError::validation(format!("{}: {}", path.display(), e)))?;
    if bytes.is_empty() {
        return Err(WorkflowError::validation(format!(
            "{}: file is empty",
            path.display()
        )));
    }
    debug!(path = %path.display(), bytes = bytes.len(), mime, "Loaded screenshot");
    Ok(EncodedImage::from_bytes(mime, &bytes))
}

/// What the reviewer typed at the approval prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    /// Accept the plan
    Approve,
    /// Stop without approving
    Quit,
    /// Anything else is feedback for a revision
    Changes(String),
}

impl ReviewDecision {
    /// Interprets one line of input. A blank line approves.
    ///
    /// ```
    /// use scaleplan::ReviewDecision;
    ///
    /// assert_eq!(ReviewDecision::parse(""), ReviewDecision::Approve);
    /// assert_eq!(ReviewDecision::parse(" q "), ReviewDecision::Quit);
    /// assert_eq!(
    ///     ReviewDecision::parse("add a TikTok section"),
    ///     ReviewDecision::Changes("add a TikTok section".to_string())
    /// );
    /// ```
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_ascii_lowercase().as_str() {
            "" | "a" | "approve" | "y" | "yes" => Self::Approve,
            "q" | "quit" | "exit" => Self::Quit,
            _ => Self::Changes(line.to_string()),
        }
    }
}

/// Writes whatever deliverables the state holds into `dir`, creating it if needed.
///
/// Returns the paths written, in workflow order.
///
/// # Errors
///
/// Returns any I/O error from creating the directory or writing a file.
pub fn write_deliverables(state: &WorkflowState, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut written = Vec::new();

    if let Some(record) = state.extracted() {
        let json = serde_json::to_string_pretty(record).map_err(std::io::Error::other)?;
        written.push(write(dir, RECORD_FILE, &json)?);
    }
    let texts = [
        (PLAN_FILE, state.plan_text()),
        (FACT_CHECK_FILE, state.fact_check_text()),
        (STORYBOARD_FILE, state.storyboard_text()),
    ];
    for (name, text) in texts {
        if let Some(text) = text {
            written.push(write(dir, name, text)?);
        }
    }

    info!(dir = %dir.display(), files = written.len(), "Deliverables written");
    Ok(written)
}

fn write(dir: &Path, name: &str, contents: &str) -> std::io::Result<PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents)?;
    Ok(path)
}
