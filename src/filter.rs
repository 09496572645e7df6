use tracing::debug;

use crate::models::{present, FilterCriteria, RiskLevel, StudentRecord};

/// Parsed form of a `min-max` GPA range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpaRange {
    pub min: f64,
    pub max: f64,
}

impl GpaRange {
    /// Returns `None` unless the text is exactly two numbers joined by `-`.
    pub fn parse(raw: &str) -> Option<Self> {
        let (min, max) = raw.trim().split_once('-')?;
        let min: f64 = min.trim().parse().ok()?;
        let max: f64 = max.trim().parse().ok()?;
        if min.is_nan() || max.is_nan() {
            return None;
        }
        Some(Self { min, max })
    }

    pub fn contains(&self, gpa: f64) -> bool {
        self.min <= gpa && gpa <= self.max
    }
}

/// Lower-cases and collapses whitespace, `-` and `_` runs into a single `-`,
/// so "Computer Science", "computer-science" and "COMPUTER_SCIENCE" agree.
pub fn normalize_department(value: &str) -> String {
    value
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

/// Criteria resolved once up front so the per-record pass does no parsing.
struct Predicates<'c> {
    search: Option<String>,
    department: Option<String>,
    risk_level: Option<RiskLevel>,
    gpa_range: Option<GpaRange>,
    academic_year: Option<&'c str>,
}

impl<'c> Predicates<'c> {
    fn compile(criteria: &'c FilterCriteria) -> Self {
        let gpa_range = present(&criteria.gpa_range).and_then(|raw| {
            let parsed = GpaRange::parse(raw);
            if parsed.is_none() {
                debug!(range = raw, "ignoring unparseable gpa range");
            }
            parsed
        });

        Self {
            search: present(&criteria.search_term).map(str::to_lowercase),
            department: present(&criteria.department).map(normalize_department),
            risk_level: criteria.risk_level,
            gpa_range,
            academic_year: present(&criteria.academic_year),
        }
    }

    fn is_identity(&self) -> bool {
        self.search.is_none()
            && self.department.is_none()
            && self.risk_level.is_none()
            && self.gpa_range.is_none()
            && self.academic_year.is_none()
    }

    fn matches(&self, record: &StudentRecord) -> bool {
        if let Some(term) = &self.search {
            let hit = record.name.to_lowercase().contains(term)
                || record.student_id.to_lowercase().contains(term);
            if !hit {
                return false;
            }
        }

        if let Some(department) = &self.department {
            if normalize_department(&record.department) != *department {
                return false;
            }
        }

        if let Some(level) = self.risk_level {
            if record.risk_level != level {
                return false;
            }
        }

        if let Some(range) = self.gpa_range {
            if !range.contains(record.gpa) {
                return false;
            }
        }

        if let Some(year) = self.academic_year {
            if record.academic_year.as_deref().map(str::trim) != Some(year) {
                return false;
            }
        }

        true
    }
}

/// Keeps the records that satisfy every present criterion, in input order.
pub fn apply<'a>(records: &'a [StudentRecord], criteria: &FilterCriteria) -> Vec<&'a StudentRecord> {
    let predicates = Predicates::compile(criteria);
    if predicates.is_identity() {
        return records.iter().collect();
    }

    let filtered: Vec<&StudentRecord> = records
        .iter()
        .filter(|record| predicates.matches(record))
        .collect();

    debug!(
        input = records.len(),
        output = filtered.len(),
        "applied filter criteria"
    );
    filtered
}
