use std::cmp::Ordering;

use crate::models::{SortDirection, SortField, SortSpec, StudentRecord};

/// Comparable projection of one record field. Text is compared lower-cased;
/// `None` means the record has no usable value for the field.
#[derive(Debug, PartialEq)]
enum SortKey {
    Text(Option<String>),
    Number(Option<f64>),
    Rank(u8),
}

fn key_for(record: &StudentRecord, field: SortField) -> SortKey {
    let text = |value: &str| SortKey::Text(Some(value.to_lowercase()));
    let optional_text = |value: &Option<String>| {
        SortKey::Text(
            value
                .as_deref()
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_lowercase),
        )
    };
    let number = |value: f64| SortKey::Number(if value.is_nan() { None } else { Some(value) });

    match field {
        SortField::Id => text(record.id.as_str()),
        SortField::Name => text(record.name.as_str()),
        SortField::StudentId => text(record.student_id.as_str()),
        SortField::Gpa => number(record.gpa),
        SortField::Trend => number(record.trend),
        SortField::RiskLevel => SortKey::Rank(record.risk_level as u8),
        SortField::Department => text(record.department.as_str()),
        SortField::LastActivity => optional_text(&record.last_activity),
        SortField::AcademicYear => optional_text(&record.academic_year),
    }
}

/// Present values follow `direction`; missing values always trail.
fn compare_present<T, F>(a: Option<T>, b: Option<T>, direction: SortDirection, cmp: F) -> Ordering
where
    F: Fn(&T, &T) -> Ordering,
{
    match (a, b) {
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => cmp(&a, &b),
            SortDirection::Descending => cmp(&b, &a),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_keys(a: SortKey, b: SortKey, direction: SortDirection) -> Ordering {
    match (a, b) {
        (SortKey::Text(a), SortKey::Text(b)) => compare_present(a, b, direction, |a, b| a.cmp(b)),
        (SortKey::Number(a), SortKey::Number(b)) => {
            compare_present(a, b, direction, |a, b| a.total_cmp(b))
        }
        (SortKey::Rank(a), SortKey::Rank(b)) => {
            compare_present(Some(a), Some(b), direction, |a, b| a.cmp(b))
        }
        // A field always projects to the same key kind.
        _ => Ordering::Equal,
    }
}

/// Returns a new ordering of `records`; ties keep their input order.
pub fn sort<'a>(records: &[&'a StudentRecord], spec: SortSpec) -> Vec<&'a StudentRecord> {
    let mut ordered = records.to_vec();
    ordered.sort_by(|a, b| {
        compare_keys(
            key_for(a, spec.field),
            key_for(b, spec.field),
            spec.direction,
        )
    });
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use crate::store::sample_cohort;

    fn ids<'a>(records: &[&'a StudentRecord]) -> Vec<&'a str> {
        records.iter().map(|record| record.id.as_str()).collect()
    }

    #[test]
    fn numeric_fields_sort_by_value() {
        let records = sample_cohort();
        let refs: Vec<&StudentRecord> = records.iter().collect();

        let ascending = sort(&refs, SortSpec::ascending(SortField::Gpa));
        assert_eq!(ascending.first().map(|r| r.id.as_str()), Some("STU009"));
        assert_eq!(ascending.last().map(|r| r.id.as_str()), Some("STU004"));

        let descending = sort(&refs, SortSpec::descending(SortField::Trend));
        assert_eq!(ids(&descending)[..3], ["STU006", "STU001", "STU008"]);
    }

    #[test]
    fn text_fields_ignore_case() {
        let mut records = sample_cohort();
        records[0].name = "alex Thompson".to_string();
        records[1].name = "Aaron Young".to_string();
        let refs: Vec<&StudentRecord> = records.iter().collect();
        let ordered = sort(&refs, SortSpec::ascending(SortField::Name));
        assert_eq!(ids(&ordered)[..2], ["STU002", "STU001"]);
    }

    #[test]
    fn equal_keys_keep_input_order_in_both_directions() {
        let records = sample_cohort();
        let refs: Vec<&StudentRecord> = records.iter().collect();

        let ascending = sort(&refs, SortSpec::ascending(SortField::RiskLevel));
        let low: Vec<&str> = ascending
            .iter()
            .filter(|r| r.risk_level == RiskLevel::Low)
            .map(|r| r.id.as_str())
            .collect();
        assert_eq!(low, vec!["STU001", "STU004", "STU006", "STU008", "STU010"]);
        assert_eq!(ascending[0].risk_level, RiskLevel::Low);

        let descending = sort(&refs, SortSpec::descending(SortField::RiskLevel));
        assert_eq!(ids(&descending)[..3], ["STU003", "STU007", "STU009"]);
        assert_eq!(ids(&descending)[5..], ["STU001", "STU004", "STU006", "STU008", "STU010"]);
    }

    #[test]
    fn resorting_ties_is_stable() {
        let records = sample_cohort();
        let refs: Vec<&StudentRecord> = records.iter().collect();
        let by_name = sort(&refs, SortSpec::ascending(SortField::Name));
        let by_department = sort(&by_name, SortSpec::ascending(SortField::Department));
        let again = sort(&by_department, SortSpec::ascending(SortField::Department));
        assert_eq!(ids(&by_department), ids(&again));

        let computer_science: Vec<&str> = by_department
            .iter()
            .filter(|r| r.department == "Computer Science")
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(computer_science, vec!["Alex Thompson", "Lisa Anderson"]);
    }

    #[test]
    fn missing_values_trail_in_either_direction() {
        let mut records = sample_cohort();
        records.truncate(3);
        records[0].last_activity = None;
        records[1].last_activity = Some("b".to_string());
        records[2].last_activity = Some("a".to_string());
        let refs: Vec<&StudentRecord> = records.iter().collect();

        let ascending = sort(&refs, SortSpec::ascending(SortField::LastActivity));
        assert_eq!(ids(&ascending), vec!["STU003", "STU002", "STU001"]);
        let descending = sort(&refs, SortSpec::descending(SortField::LastActivity));
        assert_eq!(ids(&descending), vec!["STU002", "STU003", "STU001"]);
    }

    #[test]
    fn nan_gpa_sorts_last() {
        let mut records = sample_cohort();
        records.truncate(3);
        records[1].gpa = f64::NAN;
        let refs: Vec<&StudentRecord> = records.iter().collect();
        let descending = sort(&refs, SortSpec::descending(SortField::Gpa));
        assert_eq!(ids(&descending), vec!["STU001", "STU003", "STU002"]);
    }

    #[test]
    fn input_slice_is_not_reordered() {
        let records = sample_cohort();
        let refs: Vec<&StudentRecord> = records.iter().collect();
        let _ = sort(&refs, SortSpec::descending(SortField::Gpa));
        assert_eq!(refs[0].id, "STU001");
        assert_eq!(refs[9].id, "STU010");
    }
}
