use std::fmt::Write;

use crate::models::{present, FilterCriteria, SortDirection, SortSpec};
use crate::view::CohortSnapshot;

fn describe_criteria(criteria: &FilterCriteria) -> String {
    let mut parts = Vec::new();
    if let Some(term) = present(&criteria.search_term) {
        parts.push(format!("search \"{term}\""));
    }
    if let Some(department) = present(&criteria.department) {
        parts.push(format!("department {department}"));
    }
    if let Some(level) = criteria.risk_level {
        parts.push(format!("{level} risk"));
    }
    if let Some(range) = present(&criteria.gpa_range) {
        parts.push(format!("GPA {range}"));
    }
    if let Some(year) = present(&criteria.academic_year) {
        parts.push(format!("year {year}"));
    }

    if parts.is_empty() {
        "all students".to_string()
    } else {
        parts.join(", ")
    }
}

pub fn build_report(snapshot: &CohortSnapshot<'_>, criteria: &FilterCriteria, sort: SortSpec) -> String {
    let mut output = String::new();
    let direction = match sort.direction {
        SortDirection::Ascending => "ascending",
        SortDirection::Descending => "descending",
    };

    let _ = writeln!(output, "# Cohort Performance Report");
    let _ = writeln!(
        output,
        "Generated for {} ({} of {} students), sorted by {} {}",
        describe_criteria(criteria),
        snapshot.filtered_count,
        snapshot.total_records,
        sort.field,
        direction
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Students: {}", snapshot.metrics.total_count);
    let _ = writeln!(output, "- Average GPA: {:.2}", snapshot.metrics.average_gpa);
    let _ = writeln!(output, "- High risk: {}", snapshot.metrics.high_risk_count);
    let _ = writeln!(
        output,
        "- Improving: {}%",
        snapshot.metrics.improving_percentage
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Mix");
    for share in &snapshot.risk_distribution {
        let _ = writeln!(
            output,
            "- {}: {} students ({}%)",
            share.level, share.count, share.percentage
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "## Page {} of {}",
        snapshot.page_number, snapshot.total_pages
    );

    if snapshot.rows.is_empty() {
        let _ = writeln!(output, "No students match these filters.");
    } else {
        let _ = writeln!(output, "| Student | ID | GPA | Trend | Risk | Department |");
        let _ = writeln!(output, "|---|---|---|---|---|---|");
        for record in &snapshot.rows {
            let _ = writeln!(
                output,
                "| {} | {} | {:.2} | {} {} | {} | {} |",
                record.name,
                record.student_id,
                record.gpa,
                record.trend_direction().arrow(),
                record.signed_trend(),
                record.risk_level,
                record.department
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "{}", snapshot.range_label);

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageRequest, RiskLevel, SortField};
    use crate::store::sample_cohort;
    use crate::view::snapshot;

    #[test]
    fn report_lists_summary_and_page() {
        let records = sample_cohort();
        let criteria = FilterCriteria {
            risk_level: Some(RiskLevel::High),
            ..FilterCriteria::default()
        };
        let sort = SortSpec::descending(SortField::Gpa);
        let view = snapshot(&records, &criteria, sort, PageRequest::default());
        let report = build_report(&view, &criteria, sort);

        assert!(report.contains("Generated for high risk (3 of 10 students), sorted by gpa descending"));
        assert!(report.contains("- Average GPA: 2.80"));
        assert!(report.contains("- high: 3 students (100%)"));
        assert!(report.contains("| David Martinez | BUS2024007 | 2.90 | ↓ -5% | high | Business |"));
        assert!(report.contains("Showing 1 to 3 of 3 students"));
    }

    #[test]
    fn empty_result_is_reported_plainly() {
        let records = sample_cohort();
        let criteria = FilterCriteria {
            search_term: Some("nobody".to_string()),
            ..FilterCriteria::default()
        };
        let view = snapshot(&records, &criteria, SortSpec::default(), PageRequest::default());
        let report = build_report(&view, &criteria, SortSpec::default());

        assert!(report.contains("No students match these filters."));
        assert!(report.contains("- Average GPA: 0.00"));
        assert!(report.contains("No students to show"));
    }
}
