use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ViewError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 3] = [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            other => Err(ViewError::UnknownRiskLevel(other.to_string())),
        }
    }
}

/// One student as supplied by the record source. The pipeline only ever
/// reads these; every stage hands back a new view over them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    pub id: String,
    pub name: String,
    pub student_id: String,
    pub gpa: f64,
    /// Signed percentage change since the previous term.
    pub trend: f64,
    pub risk_level: RiskLevel,
    pub department: String,
    #[serde(default)]
    pub last_activity: Option<String>,
    #[serde(default)]
    pub academic_year: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub enrollment_date: Option<NaiveDate>,
}

impl StudentRecord {
    pub fn trend_direction(&self) -> TrendDirection {
        TrendDirection::from_trend(self.trend)
    }

    /// Trend with an explicit sign, e.g. `+5%`, `-2%`, `0%`.
    pub fn signed_trend(&self) -> String {
        if self.trend > 0.0 {
            format!("+{}%", self.trend)
        } else {
            format!("{}%", self.trend)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendDirection {
    Improving,
    Declining,
    Flat,
}

impl TrendDirection {
    pub fn from_trend(trend: f64) -> Self {
        if trend > 0.0 {
            TrendDirection::Improving
        } else if trend < 0.0 {
            TrendDirection::Declining
        } else {
            TrendDirection::Flat
        }
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "↑",
            TrendDirection::Declining => "↓",
            TrendDirection::Flat => "→",
        }
    }
}

/// Declarative filter. Every field is optional; an empty string counts as
/// absent so that cleared form inputs impose no constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterCriteria {
    pub department: Option<String>,
    #[serde(deserialize_with = "blank_as_none_risk")]
    pub risk_level: Option<RiskLevel>,
    /// Closed interval written as `min-max`, e.g. `3.0-3.5`.
    pub gpa_range: Option<String>,
    pub academic_year: Option<String>,
    pub search_term: Option<String>,
}

impl FilterCriteria {
    pub fn is_active(&self) -> bool {
        present(&self.department).is_some()
            || self.risk_level.is_some()
            || present(&self.gpa_range).is_some()
            || present(&self.academic_year).is_some()
            || present(&self.search_term).is_some()
    }
}

/// Returns the trimmed value when the field carries something to match on.
pub(crate) fn present(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn blank_as_none_risk<'de, D>(deserializer: D) -> Result<Option<RiskLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    Id,
    Name,
    StudentId,
    Gpa,
    Trend,
    RiskLevel,
    Department,
    LastActivity,
    AcademicYear,
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Name => "name",
            SortField::StudentId => "studentId",
            SortField::Gpa => "gpa",
            SortField::Trend => "trend",
            SortField::RiskLevel => "riskLevel",
            SortField::Department => "department",
            SortField::LastActivity => "lastActivity",
            SortField::AcademicYear => "academicYear",
        }
    }
}

impl FromStr for SortField {
    type Err = ViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let key: String = value
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "id" => Ok(SortField::Id),
            "name" => Ok(SortField::Name),
            "studentid" => Ok(SortField::StudentId),
            "gpa" => Ok(SortField::Gpa),
            "trend" => Ok(SortField::Trend),
            "risklevel" | "risk" => Ok(SortField::RiskLevel),
            "department" => Ok(SortField::Department),
            "lastactivity" => Ok(SortField::LastActivity),
            "academicyear" | "year" => Ok(SortField::AcademicYear),
            _ => Err(ViewError::UnknownSortField(value.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    #[serde(alias = "asc")]
    Ascending,
    #[serde(alias = "desc")]
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

impl FromStr for SortDirection {
    type Err = ViewError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(ViewError::UnknownSortDirection(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub field: SortField,
    #[serde(default)]
    pub direction: SortDirection,
}

impl SortSpec {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    pub fn ascending(field: SortField) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: SortField) -> Self {
        Self::new(field, SortDirection::Descending)
    }
}

impl Default for SortSpec {
    fn default() -> Self {
        Self::ascending(SortField::Name)
    }
}

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_size: usize,
    /// 1-based; out-of-range values are clamped by the paginator.
    pub page_number: usize,
}

impl PageRequest {
    pub fn new(page_size: usize, page_number: usize) -> Self {
        Self {
            page_size,
            page_number,
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSummary {
    pub total_count: usize,
    pub average_gpa: f64,
    pub high_risk_count: usize,
    pub improving_percentage: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskShare {
    pub level: RiskLevel,
    pub count: usize,
    pub percentage: u32,
}
