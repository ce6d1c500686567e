use thiserror::Error;

// ---------------------------------------------------------------------------
// Error taxonomy surfaced to the user
// ---------------------------------------------------------------------------

/// Every failure a user action can run into.
///
/// None of these are fatal: the UI renders them inline and the user can retry
/// with a corrected file or selection.
#[derive(Debug, Error)]
pub enum TernaryError {
    /// Missing columns, non-numeric or negative cells, empty table.
    #[error("invalid input: {0}")]
    InputFormat(String),

    /// A row whose three components add up to zero cannot be normalised.
    #[error("row {row} ('{label}') has a total composition of zero")]
    ZeroComposition { row: usize, label: String },

    /// The three basis compounds are linearly dependent.
    #[error("basis {} / {} / {} is degenerate (rank {rank})", .labels[0], .labels[1], .labels[2])]
    DegenerateBasis { labels: [String; 3], rank: usize },

    /// A basis slot is empty or names a label that is not in the table.
    #[error("basis compound {} is not selected", .slot + 1)]
    IncompleteSelection { slot: usize, label: Option<String> },

    #[error("conversion tool '{program}' was not found")]
    ExternalToolMissing { program: String },

    #[error("conversion tool '{program}' failed: {detail}")]
    ExternalToolFailure { program: String, detail: String },

    #[error("rendering failed: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl TernaryError {
    pub fn input_format(msg: impl Into<String>) -> Self {
        TernaryError::InputFormat(msg.into())
    }

    /// Informational prompts are shown in a neutral colour rather than red.
    pub fn is_prompt(&self) -> bool {
        matches!(self, TernaryError::IncompleteSelection { .. })
    }
}
