use thiserror::Error;

/// Everything that can stop an import before the save document is written.
///
/// "Not newer" is deliberately absent: a stale snapshot is a normal
/// [`Outcome`](crate::importer::Outcome), not a failure.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("invalid JSON: {0}")]
    ParseFailure(#[from] serde_json::Error),

    #[error("no save data in localStorage (open the planner once before importing)")]
    MissingSave,

    #[error("no <digits>_<digits>.json snapshot in the selected directory")]
    NoCandidate,

    #[error("read permission for the snapshot directory was denied")]
    PermissionDenied,

    #[error("read permission for the snapshot directory has not been granted yet")]
    PermissionPending,

    #[error("directory selection was cancelled")]
    Cancelled,

    #[error("{0} is not available in this browser")]
    Unsupported(&'static str),

    #[error("{context}: {detail}")]
    Storage {
        context: &'static str,
        detail: String,
    },
}

impl ImportError {
    pub fn storage(context: &'static str, detail: impl Into<String>) -> Self {
        ImportError::Storage {
            context,
            detail: detail.into(),
        }
    }

    /// Outcomes the user does not need to hear about: they only go to the log.
    pub fn is_quiet(&self) -> bool {
        matches!(
            self,
            ImportError::NoCandidate | ImportError::Cancelled | ImportError::PermissionPending
        )
    }
}
