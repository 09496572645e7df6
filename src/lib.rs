//! Filtering, sorting, pagination and summary metrics for an administrator's
//! view over a cohort of student records.
//!
//! Every pipeline stage is a pure function over borrowed records:
//! [`filter::apply`] → [`sort::sort`] → [`paginate::paginate`], with
//! [`metrics::aggregate`] run over the filtered set. [`view::CohortView`]
//! holds the caller-side state (criteria, sort spec, page, selection).

pub mod actions;
pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod models;
pub mod paginate;
pub mod report;
pub mod selection;
pub mod session;
pub mod sort;
pub mod store;
pub mod view;

pub use error::{ViewError, ViewResult};
pub use models::{
    FilterCriteria, MetricsSummary, PageRequest, RiskLevel, SortDirection, SortField, SortSpec,
    StudentRecord, TrendDirection,
};
pub use selection::{BulkAction, BulkActionHandler, SelectionTracker};
pub use session::{AuthenticatedUser, Landing, Role, Session};
pub use view::{CohortSnapshot, CohortView};
