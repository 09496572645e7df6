use thiserror::Error;

pub type ViewResult<T> = Result<T, ViewError>;

/// Failures at the edges of the cohort pipeline. Filtering, sorting,
/// paging and aggregation never fail; only parsing caller input, gating a
/// session, and reading record files do.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("unknown sort field: {0}")]
    UnknownSortField(String),

    #[error("unknown sort direction: {0} (expected asc or desc)")]
    UnknownSortDirection(String),

    #[error("unknown risk level: {0} (expected low, medium or high)")]
    UnknownRiskLevel(String),

    #[error("unknown bulk action: {0} (expected export, notify or intervention)")]
    UnknownBulkAction(String),

    #[error("cohort view requires an admin session, got role {0}")]
    AdminRequired(String),

    #[error("duplicate record id: {0}")]
    DuplicateRecordId(String),

    #[error("record {id} has a non-finite {field}")]
    NonFiniteValue { id: String, field: &'static str },

    #[error("page size must be at least 1")]
    InvalidPageSize,

    #[error("failed to read records: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}
