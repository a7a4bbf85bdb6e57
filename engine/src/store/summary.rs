//! File summaries shown to the selector

use serde::Serialize;

/// Preview limits for a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewLimits {
    pub lines: usize,
    pub chars: usize,
}

impl Default for PreviewLimits {
    fn default() -> Self {
        Self {
            lines: 10,
            chars: 1000,
        }
    }
}

/// Summary of one scanned file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FileSummary {
    Ok {
        path: String,
        /// Content length in characters
        size: usize,
        extension: String,
        preview: String,
    },
    Failed {
        path: String,
        error: String,
    },
}

impl FileSummary {
    pub fn path(&self) -> &str {
        match self {
            Self::Ok { path, .. } | Self::Failed { path, .. } => path,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Selector entry: path, size, extension and preview, closed by `---`.
    /// `None` for failed reads, which are never shown to the model.
    pub fn render(&self) -> Option<String> {
        match self {
            Self::Ok {
                path,
                size,
                extension,
                preview,
            } => Some(format!(
                "Path: {}\nSize: {} bytes\nExtension: {}\nPreview:\n{}\n---",
                path, size, extension, preview
            )),
            Self::Failed { .. } => None,
        }
    }
}

/// First `limits.lines` lines, cut to `limits.chars` characters with `...`
/// appended when cut.
pub fn preview(content: &str, limits: PreviewLimits) -> String {
    let head = content
        .split('\n')
        .take(limits.lines)
        .collect::<Vec<_>>()
        .join("\n");

    match head.char_indices().nth(limits.chars) {
        Some((cut, _)) => format!("{}...", &head[..cut]),
        None => head,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_takes_first_lines() {
        let content: String = (1..=20).map(|i| format!("line {}\n", i)).collect();
        let p = preview(&content, PreviewLimits::default());
        assert_eq!(p.lines().count(), 10);
        assert!(p.ends_with("line 10"));
    }

    #[test]
    fn test_preview_truncation_marks_ellipsis() {
        let content = "x".repeat(1500);
        let p = preview(&content, PreviewLimits::default());
        assert_eq!(p.chars().count(), 1003);
        assert!(p.ends_with("..."));

        let exact = "y".repeat(1000);
        assert_eq!(preview(&exact, PreviewLimits::default()), exact);
    }

    #[test]
    fn test_preview_counts_characters() {
        let content = "é".repeat(5);
        let p = preview(&content, PreviewLimits { lines: 1, chars: 3 });
        assert_eq!(p, "ééé...");
    }

    #[test]
    fn test_render_format() {
        let summary = FileSummary::Ok {
            path: "src/app.py".into(),
            size: 42,
            extension: ".py".into(),
            preview: "import os".into(),
        };
        assert_eq!(
            summary.render().unwrap(),
            "Path: src/app.py\nSize: 42 bytes\nExtension: .py\nPreview:\nimport os\n---"
        );

        let failed = FileSummary::Failed {
            path: "bad.py".into(),
            error: "Error reading file: denied".into(),
        };
        assert!(failed.render().is_none());
        assert_eq!(failed.path(), "bad.py");
    }
}
