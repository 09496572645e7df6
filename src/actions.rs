use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::models::StudentRecord;
use crate::selection::{BulkAction, BulkActionHandler};
use crate::store;

/// What a bulk action actually did.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Exported { path: PathBuf, count: usize },
    Notified { count: usize },
    InterventionScheduled { count: usize },
    Failed { action: BulkAction, reason: String },
}

/// Command-line side of the bulk-action interface. Exports go to CSV;
/// notifications and interventions are recorded in the log.
pub struct CohortActions<'a> {
    records: &'a [StudentRecord],
    export_dir: PathBuf,
    outcomes: Vec<ActionOutcome>,
}

impl<'a> CohortActions<'a> {
    pub fn new(records: &'a [StudentRecord], export_dir: &Path) -> Self {
        Self {
            records,
            export_dir: export_dir.to_path_buf(),
            outcomes: Vec::new(),
        }
    }

    pub fn outcomes(&self) -> &[ActionOutcome] {
        &self.outcomes
    }

    fn export(&self, ids: &[String]) -> ActionOutcome {
        let selected: Vec<&StudentRecord> = self
            .records
            .iter()
            .filter(|record| ids.contains(&record.id))
            .collect();
        if selected.len() < ids.len() {
            warn!(
                requested = ids.len(),
                found = selected.len(),
                "some selected ids are not in the record set"
            );
        }

        let file_name = format!(
            "cohort-export-{}-{}.csv",
            Utc::now().format("%Y%m%dT%H%M%S"),
            Uuid::new_v4().simple()
        );
        let path = self.export_dir.join(file_name);
        match store::create_csv(&path, selected) {
            Ok(count) => {
                info!(path = %path.display(), count, "exported selected students");
                ActionOutcome::Exported { path, count }
            }
            Err(err) => {
                error!(error = %err, "export failed");
                ActionOutcome::Failed {
                    action: BulkAction::Export,
                    reason: err.to_string(),
                }
            }
        }
    }
}

impl BulkActionHandler for CohortActions<'_> {
    fn handle(&mut self, action: BulkAction, ids: &[String]) {
        let outcome = match action {
            BulkAction::Export => self.export(ids),
            BulkAction::Notify => {
                for id in ids {
                    info!(student = %id, "notification queued");
                }
                ActionOutcome::Notified { count: ids.len() }
            }
            BulkAction::Intervention => {
                for id in ids {
                    info!(student = %id, "intervention scheduled");
                }
                ActionOutcome::InterventionScheduled { count: ids.len() }
            }
        };
        self.outcomes.push(outcome);
    }
}
