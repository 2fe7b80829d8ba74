use crate::error::EditorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of document kinds that can be opened in the editor.
///
/// Every kind maps to its own capability oracle and document lookup in the
/// internal application; anything outside this set is rejected at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Candidate,
    JobPost,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Candidate => "candidate",
            DocumentKind::JobPost => "job_post",
        }
    }

    /// Collection segment used in the internal application's API paths.
    pub fn path_segment(&self) -> &'static str {
        match self {
            DocumentKind::Candidate => "candidates",
            DocumentKind::JobPost => "job_posts",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(DocumentKind::Candidate),
            "job_post" => Ok(DocumentKind::JobPost),
            other => Err(EditorError::UnsupportedDocumentKind(other.to_string())),
        }
    }
}
