use std::borrow::Borrow;
use std::collections::HashMap;

use crate::models::{MetricsSummary, RiskLevel, RiskShare, StudentRecord};

/// Headline statistics over `records`. Accepts owned records or the borrowed
/// views the filter stage produces. Empty input yields all zeros.
pub fn aggregate<R: Borrow<StudentRecord>>(records: &[R]) -> MetricsSummary {
    let mut gpa_total = 0.0;
    let mut high_risk_count = 0usize;
    let mut improving_count = 0usize;

    for record in records {
        let record: &StudentRecord = record.borrow();
        gpa_total += record.gpa;
        if record.risk_level == RiskLevel::High {
            high_risk_count += 1;
        }
        if record.trend > 0.0 {
            improving_count += 1;
        }
    }

    let total_count = records.len();
    let (average_gpa, improving_percentage) = if total_count == 0 {
        (0.0, 0)
    } else {
        (
            round_to(gpa_total / total_count as f64, 2),
            percentage(improving_count, total_count),
        )
    };

    MetricsSummary {
        total_count,
        average_gpa,
        high_risk_count,
        improving_percentage,
    }
}

/// Count and rounded share of each risk level, always in low/medium/high
/// order and always listing all three levels.
pub fn risk_distribution<R: Borrow<StudentRecord>>(records: &[R]) -> Vec<RiskShare> {
    let mut counts: HashMap<RiskLevel, usize> = HashMap::new();
    for record in records {
        let record: &StudentRecord = record.borrow();
        *counts.entry(record.risk_level).or_insert(0) += 1;
    }

    RiskLevel::ALL
        .iter()
        .map(|level| {
            let count = counts.get(level).copied().unwrap_or(0);
            RiskShare {
                level: *level,
                count,
                percentage: if records.is_empty() {
                    0
                } else {
                    percentage(count, records.len())
                },
            }
        })
        .collect()
}

fn percentage(part: usize, whole: usize) -> u32 {
    (100.0 * part as f64 / whole as f64).round() as u32
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
