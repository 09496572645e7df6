use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::Path;

use chrono::NaiveDate;
use tracing::info;
use uuid::Uuid;

use crate::error::{ViewError, ViewResult};
use crate::models::{RiskLevel, StudentRecord};
use crate::session::AuthenticatedUser;

/// The ten-student cohort the admin dashboard ships with.
pub fn sample_cohort() -> Vec<StudentRecord> {
    let students = [
        ("STU001", "Alex Thompson", "CS2024001", 3.8, 5.0, RiskLevel::Low, "Computer Science", "2 hours ago", "alex.thompson", (2022, 8, 15)),
        ("STU002", "Maria Rodriguez", "MATH2024002", 3.2, -2.0, RiskLevel::Medium, "Mathematics", "1 day ago", "maria.rodriguez", (2022, 8, 15)),
        ("STU003", "James Wilson", "PHY2024003", 2.8, -8.0, RiskLevel::High, "Physics", "3 days ago", "james.wilson", (2023, 1, 10)),
        ("STU004", "Emily Chen", "BIO2024004", 3.9, 3.0, RiskLevel::Low, "Biology", "1 hour ago", "emily.chen", (2022, 8, 15)),
        ("STU005", "Michael Brown", "ENG2024005", 3.1, 1.0, RiskLevel::Medium, "Engineering", "4 hours ago", "michael.brown", (2023, 1, 10)),
        ("STU006", "Sarah Davis", "CHEM2024006", 3.6, 7.0, RiskLevel::Low, "Chemistry", "30 minutes ago", "sarah.davis", (2022, 8, 15)),
        ("STU007", "David Martinez", "BUS2024007", 2.9, -5.0, RiskLevel::High, "Business", "2 days ago", "david.martinez", (2023, 8, 15)),
        ("STU008", "Lisa Anderson", "CS2024008", 3.7, 4.0, RiskLevel::Low, "Computer Science", "1 hour ago", "lisa.anderson", (2022, 8, 15)),
        ("STU009", "Robert Taylor", "MATH2024009", 2.7, -10.0, RiskLevel::High, "Mathematics", "5 days ago", "robert.taylor", (2023, 1, 10)),
        ("STU010", "Jennifer Lee", "PHY2024010", 3.4, 2.0, RiskLevel::Low, "Physics", "3 hours ago", "jennifer.lee", (2022, 8, 15)),
    ];

    students
        .into_iter()
        .map(
            |(id, name, student_id, gpa, trend, risk_level, department, last_activity, mailbox, (y, m, d))| {
                StudentRecord {
                    id: id.to_string(),
                    name: name.to_string(),
                    student_id: student_id.to_string(),
                    gpa,
                    trend,
                    risk_level,
                    department: department.to_string(),
                    last_activity: Some(last_activity.to_string()),
                    academic_year: None,
                    email: Some(format!("{mailbox}@university.edu")),
                    enrollment_date: NaiveDate::from_ymd_opt(y, m, d),
                }
            },
        )
        .collect()
}

/// Reads records from a CSV file with camelCase headers. Rows without an
/// `id` get a generated `import-<uuid>` id.
pub fn load_csv(path: &Path) -> ViewResult<Vec<StudentRecord>> {
    #[derive(serde::Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct CsvRow {
        id: Option<String>,
        name: String,
        student_id: String,
        gpa: f64,
        trend: f64,
        risk_level: RiskLevel,
        department: String,
        last_activity: Option<String>,
        academic_year: Option<String>,
        email: Option<String>,
        enrollment_date: Option<NaiveDate>,
    }

    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result?;
        let id = row
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("import-{}", Uuid::new_v4()));

        records.push(StudentRecord {
            id,
            name: row.name,
            student_id: row.student_id,
            gpa: row.gpa,
            trend: row.trend,
            risk_level: row.risk_level,
            department: row.department,
            last_activity: row.last_activity,
            academic_year: row.academic_year,
            email: row.email,
            enrollment_date: row.enrollment_date,
        });
    }

    validate_records(&records)?;
    info!(path = %path.display(), count = records.len(), "loaded records from csv");
    Ok(records)
}

/// Reads a JSON array of records.
pub fn load_json(path: &Path) -> ViewResult<Vec<StudentRecord>> {
    let raw = std::fs::read_to_string(path)?;
    let records: Vec<StudentRecord> = serde_json::from_str(&raw)?;
    validate_records(&records)?;
    info!(path = %path.display(), count = records.len(), "loaded records from json");
    Ok(records)
}

/// Picks the loader from the file extension; anything but `.json` is CSV.
pub fn load_records(path: &Path) -> ViewResult<Vec<StudentRecord>> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_json(path)
    } else {
        load_csv(path)
    }
}

pub fn write_csv<'a, I>(path: &Path, records: I) -> ViewResult<usize>
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    serialize_csv(csv::Writer::from_path(path)?, records)
}

/// Like [`write_csv`], but fails instead of replacing an existing file.
pub fn create_csv<'a, I>(path: &Path, records: I) -> ViewResult<usize>
where
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let file = OpenOptions::new().write(true).create_new(true).open(path)?;
    serialize_csv(csv::Writer::from_writer(file), records)
}

fn serialize_csv<'a, W, I>(mut writer: csv::Writer<W>, records: I) -> ViewResult<usize>
where
    W: std::io::Write,
    I: IntoIterator<Item = &'a StudentRecord>,
{
    let mut written = 0usize;
    for record in records {
        writer.serialize(record)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

pub fn write_json(path: &Path, records: &[StudentRecord]) -> ViewResult<()> {
    let raw = serde_json::to_string_pretty(records)?;
    std::fs::write(path, raw)?;
    Ok(())
}

/// Ids must be unique and `gpa`/`trend` must be real numbers.
fn validate_records(records: &[StudentRecord]) -> ViewResult<()> {
    for record in records {
        for (field, value) in [("gpa", record.gpa), ("trend", record.trend)] {
            if !value.is_finite() {
                return Err(ViewError::NonFiniteValue {
                    id: record.id.clone(),
                    field,
                });
            }
        }
    }
    ensure_unique_ids(records)
}

fn ensure_unique_ids(records: &[StudentRecord]) -> ViewResult<()> {
    let mut seen = HashSet::new();
    for record in records {
        if !seen.insert(record.id.as_str()) {
            return Err(ViewError::DuplicateRecordId(record.id.clone()));
        }
    }
    Ok(())
}

/// The student audience sees only its own record, matched by email.
pub fn find_own_record<'a>(
    records: &'a [StudentRecord],
    user: &AuthenticatedUser,
) -> Option<&'a StudentRecord> {
    records.iter().find(|record| {
        record
            .email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(&user.email))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Role;

    #[test]
    fn sample_ids_are_unique() {
        let records = sample_cohort();
        assert_eq!(records.len(), 10);
        assert!(ensure_unique_ids(&records).is_ok());
    }

    #[test]
    fn csv_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cohort.csv");
        let records = sample_cohort();
        assert_eq!(write_csv(&path, &records).unwrap(), 10);

        let loaded = load_records(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn csv_rows_without_id_get_generated_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.csv");
        std::fs::write(
            &path,
            "id,name,studentId,gpa,trend,riskLevel,department,lastActivity,academicYear,email,enrollmentDate\n\
             ,Nora Quinn,HIS2024011,3.3,0,low,History,,2024-2025,,\n",
        )
        .unwrap();

        let loaded = load_csv(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded[0].id.starts_with("import-"));
        assert_eq!(loaded[0].academic_year.as_deref(), Some("2024-2025"));
        assert_eq!(loaded[0].last_activity, None);
    }

    #[test]
    fn csv_rejects_non_finite_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.csv");
        std::fs::write(
            &path,
            "id,name,studentId,gpa,trend,riskLevel,department,lastActivity,academicYear,email,enrollmentDate\n\
             STU001,Alex Thompson,CS2024001,3.8,5,low,Computer Science,,,,\n\
             STU002,Maria Rodriguez,MATH2024002,NaN,-2,medium,Mathematics,,,,\n",
        )
        .unwrap();

        let err = load_csv(&path).unwrap_err();
        assert!(matches!(
            err,
            ViewError::NonFiniteValue { ref id, field: "gpa" } if id == "STU002"
        ));

        std::fs::write(
            &path,
            "id,name,studentId,gpa,trend,riskLevel,department,lastActivity,academicYear,email,enrollmentDate\n\
             STU003,James Wilson,PHY2024003,2.8,inf,high,Physics,,,,\n",
        )
        .unwrap();
        let err = load_csv(&path).unwrap_err();
        assert!(matches!(err, ViewError::NonFiniteValue { field: "trend", .. }));
    }

    #[test]
    fn json_rejects_duplicate_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cohort.json");
        let mut records = sample_cohort();
        records[1].id = records[0].id.clone();
        write_json(&path, &records).unwrap();

        let err = load_records(&path).unwrap_err();
        assert!(matches!(err, ViewError::DuplicateRecordId(id) if id == "STU001"));
    }

    #[test]
    fn own_record_is_matched_by_email() {
        let records = sample_cohort();
        let user = AuthenticatedUser {
            id: "u-1".to_string(),
            full_name: "Emily Chen".to_string(),
            email: "Emily.Chen@university.edu".to_string(),
            role: Role::Student,
        };
        assert_eq!(find_own_record(&records, &user).map(|r| r.id.as_str()), Some("STU004"));
    }
}
