//! Administrator cohort view: the caller-held state (criteria, sort spec,
//! page number, selection) threaded through the pure pipeline stages.

use tracing::{debug, info};

use crate::config::ViewConfig;
use crate::error::ViewResult;
use crate::filter;
use crate::metrics;
use crate::models::{
    FilterCriteria, MetricsSummary, PageRequest, RiskShare, SortField, SortSpec, StudentRecord,
};
use crate::paginate::{self, paginate_request};
use crate::selection::{BulkAction, BulkActionHandler, SelectionTracker};
use crate::session::Session;
use crate::sort;

/// Everything one render of the cohort view needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CohortSnapshot<'a> {
    pub rows: Vec<&'a StudentRecord>,
    pub page_number: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
    pub total_records: usize,
    /// Computed over the whole filtered set, not just `rows`.
    pub metrics: MetricsSummary,
    pub risk_distribution: Vec<RiskShare>,
    pub range_label: String,
}

impl CohortSnapshot<'_> {
    pub fn row_ids(&self) -> Vec<String> {
        self.rows.iter().map(|record| record.id.clone()).collect()
    }
}

/// records → filter → sort → paginate, with metrics over the filtered set.
pub fn snapshot<'a>(
    records: &'a [StudentRecord],
    criteria: &FilterCriteria,
    sort_spec: SortSpec,
    request: PageRequest,
) -> CohortSnapshot<'a> {
    let filtered = filter::apply(records, criteria);
    let ordered = sort::sort(&filtered, sort_spec);
    let page = paginate_request(&ordered, request);

    CohortSnapshot {
        rows: page.items.to_vec(),
        page_number: page.page_number,
        total_pages: page.total_pages,
        filtered_count: filtered.len(),
        total_records: records.len(),
        metrics: metrics::aggregate(&filtered),
        risk_distribution: metrics::risk_distribution(&filtered),
        range_label: page.range_label("students"),
    }
}

#[derive(Debug, Clone)]
pub struct CohortView {
    records: Vec<StudentRecord>,
    criteria: FilterCriteria,
    sort: SortSpec,
    page_size: usize,
    page_number: usize,
    selection: SelectionTracker,
}

impl CohortView {
    /// Opens the view for an admin session; any other role is refused.
    pub fn open(session: &Session, records: Vec<StudentRecord>, config: &ViewConfig) -> ViewResult<Self> {
        session.require_admin()?;
        config.validate()?;
        info!(
            user = %session.user.email,
            records = records.len(),
            "opened cohort view"
        );
        Ok(Self {
            records,
            criteria: FilterCriteria::default(),
            sort: config.default_sort,
            page_size: config.page_size,
            page_number: 1,
            selection: SelectionTracker::new(),
        })
    }

    pub fn records(&self) -> &[StudentRecord] {
        &self.records
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn sort_spec(&self) -> SortSpec {
        self.sort
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn selection(&self) -> &SelectionTracker {
        &self.selection
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        debug!(active = criteria.is_active(), "criteria changed");
        self.criteria = criteria;
        self.page_number = self.page_number.clamp(1, self.total_pages());
    }

    pub fn clear_filters(&mut self) {
        self.set_criteria(FilterCriteria::default());
    }

    /// Column-header click: the same field flips direction, a new field
    /// starts ascending.
    pub fn toggle_sort(&mut self, field: SortField) {
        self.sort = if self.sort.field == field {
            SortSpec::new(field, self.sort.direction.flipped())
        } else {
            SortSpec::ascending(field)
        };
    }

    pub fn set_sort(&mut self, spec: SortSpec) {
        self.sort = spec;
    }

    pub fn total_pages(&self) -> usize {
        let filtered = filter::apply(&self.records, &self.criteria);
        paginate::total_pages(filtered.len(), self.page_size)
    }

    pub fn go_to_page(&mut self, page_number: usize) {
        self.page_number = page_number.clamp(1, self.total_pages());
    }

    pub fn next_page(&mut self) {
        self.go_to_page(self.page_number + 1);
    }

    pub fn previous_page(&mut self) {
        self.go_to_page(self.page_number.saturating_sub(1));
    }

    pub fn render(&self) -> CohortSnapshot<'_> {
        snapshot(
            &self.records,
            &self.criteria,
            self.sort,
            PageRequest::new(self.page_size, self.page_number),
        )
    }

    pub fn select_all(&mut self, checked: bool) {
        let page_ids = self.render().row_ids();
        self.selection.select_all(&page_ids, checked);
    }

    pub fn toggle_selection(&mut self, id: &str, checked: bool) {
        self.selection.toggle(id, checked);
    }

    pub fn all_selected(&self) -> bool {
        self.selection.all_selected(&self.render().row_ids())
    }

    pub fn dispatch<H>(&self, action: BulkAction, handler: &mut H)
    where
        H: BulkActionHandler + ?Sized,
    {
        self.selection.dispatch(action, handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ViewError;
    use crate::models::{RiskLevel, SortDirection};
    use crate::session::{AuthenticatedUser, Role};
    use crate::store::sample_cohort;

    fn session(role: Role) -> Session {
        Session::new(AuthenticatedUser {
            id: "admin-1".to_string(),
            full_name: "Sarah Johnson".to_string(),
            email: "sarah.johnson@university.edu".to_string(),
            role,
        })
    }

    fn cohort(count: usize) -> Vec<StudentRecord> {
        let base = sample_cohort();
        (0..count)
            .map(|index| {
                let mut record = base[index % base.len()].clone();
                record.id = format!("R{index:03}");
                record
            })
            .collect()
    }

    #[test]
    fn high_risk_by_gpa_descending_fits_one_page() {
        let records = sample_cohort();
        let criteria = FilterCriteria {
            risk_level: Some(RiskLevel::High),
            ..FilterCriteria::default()
        };
        let view = snapshot(
            &records,
            &criteria,
            SortSpec::descending(SortField::Gpa),
            PageRequest::new(10, 1),
        );

        let gpas: Vec<f64> = view.rows.iter().map(|r| r.gpa).collect();
        assert_eq!(view.row_ids(), vec!["STU007", "STU003", "STU009"]);
        assert_eq!(gpas, vec![2.9, 2.8, 2.7]);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.page_number, 1);
        assert_eq!(view.metrics.high_risk_count, 3);
    }

    #[test]
    fn two_record_filter_orders_by_gpa() {
        let mut records = sample_cohort();
        records[6].risk_level = RiskLevel::Medium;
        let criteria = FilterCriteria {
            risk_level: Some(RiskLevel::High),
            ..FilterCriteria::default()
        };
        let view = snapshot(
            &records,
            &criteria,
            SortSpec::descending(SortField::Gpa),
            PageRequest::new(10, 1),
        );
        assert_eq!(view.row_ids(), vec!["STU003", "STU009"]);
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.filtered_count, 2);
        assert_eq!(view.total_records, 10);
    }

    #[test]
    fn metrics_cover_the_filtered_set_not_the_page() {
        let records = cohort(25);
        let view = snapshot(
            &records,
            &FilterCriteria::default(),
            SortSpec::default(),
            PageRequest::new(10, 3),
        );
        assert_eq!(view.rows.len(), 5);
        assert_eq!(view.metrics.total_count, 25);
        assert_eq!(view.range_label, "Showing 21 to 25 of 25 students");
    }

    #[test]
    fn only_admins_open_the_view() {
        let err = CohortView::open(&session(Role::Student), sample_cohort(), &ViewConfig::default())
            .unwrap_err();
        assert!(matches!(err, ViewError::AdminRequired(_)));
    }

    #[test]
    fn sort_toggle_policy() {
        let mut view =
            CohortView::open(&session(Role::Admin), sample_cohort(), &ViewConfig::default()).unwrap();
        assert_eq!(view.sort_spec(), SortSpec::ascending(SortField::Name));

        view.toggle_sort(SortField::Name);
        assert_eq!(view.sort_spec().direction, SortDirection::Descending);
        view.toggle_sort(SortField::Name);
        assert_eq!(view.sort_spec().direction, SortDirection::Ascending);

        view.toggle_sort(SortField::Name);
        view.toggle_sort(SortField::Gpa);
        assert_eq!(view.sort_spec(), SortSpec::ascending(SortField::Gpa));
    }

    #[test]
    fn navigation_clamps_and_narrowing_filters_pull_the_page_back() {
        let mut view =
            CohortView::open(&session(Role::Admin), cohort(25), &ViewConfig::default()).unwrap();
        view.previous_page();
        assert_eq!(view.page_number(), 1);
        view.go_to_page(99);
        assert_eq!(view.page_number(), 3);
        view.next_page();
        assert_eq!(view.page_number(), 3);

        view.set_criteria(FilterCriteria {
            risk_level: Some(RiskLevel::High),
            ..FilterCriteria::default()
        });
        assert_eq!(view.page_number(), 1);
        assert_eq!(view.render().filtered_count, 7);
    }

    #[test]
    fn selection_follows_the_visible_page() {
        let mut view =
            CohortView::open(&session(Role::Admin), cohort(25), &ViewConfig::default()).unwrap();
        view.set_sort(SortSpec::ascending(SortField::Id));

        view.select_all(true);
        assert_eq!(view.selection().len(), 10);
        assert!(view.all_selected());

        view.next_page();
        assert!(!view.all_selected());
        view.select_all(true);
        let selected = view.selection().selected_ids().to_vec();
        assert_eq!(selected.first().map(String::as_str), Some("R010"));
        assert_eq!(selected.len(), 10);

        view.toggle_selection("R012", false);
        let mut dispatched = Vec::new();
        let mut handler = |action: BulkAction, ids: &[String]| dispatched.push((action, ids.len()));
        view.dispatch(BulkAction::Export, &mut handler);
        assert_eq!(dispatched, vec![(BulkAction::Export, 9)]);
    }

    #[test]
    fn clearing_filters_restores_everything() {
        let mut view =
            CohortView::open(&session(Role::Admin), sample_cohort(), &ViewConfig::default()).unwrap();
        view.set_criteria(FilterCriteria {
            search_term: Some("lee".to_string()),
            ..FilterCriteria::default()
        });
        assert_eq!(view.render().row_ids(), vec!["STU010"]);
        view.clear_filters();
        assert!(!view.criteria().is_active());
        assert_eq!(view.render().filtered_count, 10);
    }
}
