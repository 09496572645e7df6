use std::fmt;
use std::str::FromStr;

use tracing::info;

use crate::error::ViewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
    Export,
    Notify,
    Intervention,
}

impl BulkAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkAction::Export => "export",
            BulkAction::Notify => "notify",
            BulkAction::Intervention => "intervention",
        }
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BulkAction {
    type Err = ViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "export" => Ok(BulkAction::Export),
            "notify" => Ok(BulkAction::Notify),
            "intervention" => Ok(BulkAction::Intervention),
            other => Err(ViewError::UnknownBulkAction(other.to_string())),
        }
    }
}

/// Receiver for bulk actions. Whatever the handler does with the ids,
/// including failing, is its own business.
pub trait BulkActionHandler {
    fn handle(&mut self, action: BulkAction, ids: &[String]);
}

impl<F> BulkActionHandler for F
where
    F: FnMut(BulkAction, &[String]),
{
    fn handle(&mut self, action: BulkAction, ids: &[String]) {
        self(action, ids)
    }
}

/// Marked ids on the visible page, kept in the order they were marked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    selected: Vec<String>,
}

impl SelectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Header checkbox. Checking replaces the selection with exactly the
    /// page's ids; ids marked on other pages are dropped.
    pub fn select_all<S: AsRef<str>>(&mut self, page_ids: &[S], checked: bool) {
        self.selected.clear();
        if checked {
            for id in page_ids {
                self.insert(id.as_ref());
            }
        }
    }

    pub fn toggle(&mut self, id: &str, checked: bool) {
        if checked {
            self.insert(id);
        } else {
            self.selected.retain(|selected| selected != id);
        }
    }

    fn insert(&mut self, id: &str) {
        if !self.is_selected(id) {
            self.selected.push(id.to_string());
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|selected| selected == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    /// State of the header checkbox: every id on a non-empty page is marked.
    pub fn all_selected<S: AsRef<str>>(&self, page_ids: &[S]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.is_selected(id.as_ref()))
    }

    /// Hands the current selection to `handler`. Ids are not checked against
    /// any record set.
    pub fn dispatch<H>(&self, action: BulkAction, handler: &mut H)
    where
        H: BulkActionHandler + ?Sized,
    {
        info!(action = %action, count = self.selected.len(), "dispatching bulk action");
        handler.handle(action, &self.selected);
    }
}
