// 🎓 Student Record - one row of the fee ledger
//
// "Identity is the id, everything else is a value"
//
// The due amount is stored alongside the fees (the persisted format carries
// it), but it can only ever be produced by StudentRecord::new. Every write
// path (add, edit, repair on load) goes through that constructor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};

// ============================================================================
// CLASS OPTIONS
// ============================================================================

/// The fixed class labels, in display order (not alphabetical).
pub const CLASS_OPTIONS: [&str; 6] = ["5th", "6th", "7th", "8th", "9th", "10th"];

/// Owned copy of [`CLASS_OPTIONS`] for settings and charts.
pub fn default_class_options() -> Vec<String> {
    CLASS_OPTIONS.iter().map(|c| c.to_string()).collect()
}

pub fn is_known_class(class_grade: &str) -> bool {
    CLASS_OPTIONS.contains(&class_grade)
}

// ============================================================================
// STUDENT DRAFT
// ============================================================================

/// What the operator submits when adding or editing a student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentDraft {
    pub name: String,
    pub class_grade: String,
    pub total_fees: f64,
    pub paid_fees: f64,
}

impl StudentDraft {
    pub fn new(name: &str, class_grade: &str, total_fees: f64, paid_fees: f64) -> Self {
        StudentDraft {
            name: name.to_string(),
            class_grade: class_grade.to_string(),
            total_fees,
            paid_fees,
        }
    }

    /// Required-field and number checks. Nothing stricter.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(LedgerError::invalid("name is required"));
        }
        if self.class_grade.trim().is_empty() {
            return Err(LedgerError::invalid("class is required"));
        }
        check_fee("total fees", self.total_fees)?;
        check_fee("paid fees", self.paid_fees)?;
        Ok(())
    }
}

fn check_fee(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(LedgerError::invalid(format!("{} must be a number", field)));
    }
    if value < 0.0 {
        return Err(LedgerError::invalid(format!("{} cannot be negative", field)));
    }
    Ok(())
}

// ============================================================================
// STUDENT RECORD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentRecord {
    id: String,
    name: String,
    class_grade: String,
    total_fees: f64,
    paid_fees: f64,
    due_fees: f64,
}

impl StudentRecord {
    /// The single constructor: validates the draft and derives the due amount.
    pub fn new(id: String, draft: &StudentDraft) -> Result<Self> {
        draft.validate()?;

        Ok(StudentRecord {
            id,
            name: draft.name.trim().to_string(),
            class_grade: draft.class_grade.trim().to_string(),
            total_fees: draft.total_fees,
            paid_fees: draft.paid_fees,
            due_fees: draft.total_fees - draft.paid_fees,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn class_grade(&self) -> &str {
        &self.class_grade
    }

    pub fn total_fees(&self) -> f64 {
        self.total_fees
    }

    pub fn paid_fees(&self) -> f64 {
        self.paid_fees
    }

    /// Positive means outstanding, negative means overpaid.
    pub fn due_fees(&self) -> f64 {
        self.due_fees
    }

    pub fn has_dues(&self) -> bool {
        self.due_fees > 0.0
    }

    /// Back to an editable draft (used by the edit form).
    pub fn to_draft(&self) -> StudentDraft {
        StudentDraft {
            name: self.name.clone(),
            class_grade: self.class_grade.clone(),
            total_fees: self.total_fees,
            paid_fees: self.paid_fees,
        }
    }

    /// True when the stored due amount still matches the fees.
    pub fn is_consistent(&self) -> bool {
        self.due_fees == self.total_fees - self.paid_fees
    }

    /// Rebuild the due amount from the fees without re-validating.
    ///
    /// Only for records that came back from storage: data written by an older
    /// front end may carry a stale due, and load must not drop the row.
    pub(crate) fn reconciled(mut self) -> Self {
        self.due_fees = self.total_fees - self.paid_fees;
        self
    }
}

// ============================================================================
// IDENTITY
// ============================================================================

/// Time-based id: Unix milliseconds as a decimal string, never below `floor`,
/// moved forward until it does not collide with an id that is already taken.
pub fn time_based_id<F>(now: DateTime<Utc>, floor: i64, is_taken: F) -> String
where
    F: Fn(&str) -> bool,
{
    let mut candidate = now.timestamp_millis().max(floor);
    loop {
        let id = candidate.to_string();
        if !is_taken(&id) {
            return id;
        }
        candidate += 1;
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn rahul() -> StudentDraft {
        StudentDraft::new("Rahul Patil", "7th", 5000.0, 3000.0)
    }

    #[test]
    fn test_record_derives_due() {
        let record = StudentRecord::new("1".to_string(), &rahul()).unwrap();

        assert_eq!(record.id(), "1");
        assert_eq!(record.name(), "Rahul Patil");
        assert_eq!(record.class_grade(), "7th");
        assert_eq!(record.due_fees(), 2000.0);
        assert!(record.has_dues());
        assert!(record.is_consistent());
    }

    #[test]
    fn test_overpayment_gives_negative_due() {
        let draft = StudentDraft::new("Asha", "5th", 1000.0, 1500.0);
        let record = StudentRecord::new("2".to_string(), &draft).unwrap();

        assert_eq!(record.due_fees(), -500.0);
        assert!(!record.has_dues());
    }

    #[test]
    fn test_draft_requires_name_and_class() {
        let no_name = StudentDraft::new("   ", "7th", 10.0, 0.0);
        assert!(matches!(no_name.validate(), Err(LedgerError::InvalidInput(_))));

        let no_class = StudentDraft::new("Rahul", "", 10.0, 0.0);
        assert!(matches!(no_class.validate(), Err(LedgerError::InvalidInput(_))));
    }

    #[test]
    fn test_draft_rejects_negative_or_nan_fees() {
        let negative = StudentDraft::new("Rahul", "7th", -1.0, 0.0);
        assert!(negative.validate().is_err());

        let nan = StudentDraft::new("Rahul", "7th", 10.0, f64::NAN);
        assert!(nan.validate().is_err());

        let infinite = StudentDraft::new("Rahul", "7th", f64::INFINITY, 0.0);
        assert!(infinite.validate().is_err());
    }

    #[test]
    fn test_record_trims_text_fields() {
        let draft = StudentDraft::new("  Meera Joshi ", " 9th ", 100.0, 0.0);
        let record = StudentRecord::new("3".to_string(), &draft).unwrap();

        assert_eq!(record.name(), "Meera Joshi");
        assert_eq!(record.class_grade(), "9th");
    }

    #[test]
    fn test_json_uses_camel_case_fields() {
        let record = StudentRecord::new("1700000000000".to_string(), &rahul()).unwrap();
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["id"], "1700000000000");
        assert_eq!(json["classGrade"], "7th");
        assert_eq!(json["totalFees"], 5000.0);
        assert_eq!(json["paidFees"], 3000.0);
        assert_eq!(json["dueFees"], 2000.0);
    }

    #[test]
    fn test_reconciled_repairs_stale_due() {
        let stale: StudentRecord = serde_json::from_str(
            r#"{"id":"9","name":"Old","classGrade":"6th","totalFees":800,"paidFees":300,"dueFees":800}"#,
        )
        .unwrap();
        assert!(!stale.is_consistent());

        let fixed = stale.reconciled();
        assert_eq!(fixed.due_fees(), 500.0);
    }

    #[test]
    fn test_time_based_id_skips_taken_ids() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        let free = time_based_id(now, 0, |_| false);
        assert_eq!(free, "1700000000000");

        let bumped = time_based_id(now, 0, |id| id == "1700000000000" || id == "1700000000001");
        assert_eq!(bumped, "1700000000002");
    }

    #[test]
    fn test_time_based_id_respects_floor() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();

        assert_eq!(time_based_id(now, 1_700_000_000_005, |_| false), "1700000000005");
        assert_eq!(time_based_id(now, 1_600_000_000_000, |_| false), "1700000000000");
    }

    #[test]
    fn test_known_classes() {
        assert!(is_known_class("10th"));
        assert!(!is_known_class("11th"));
        assert_eq!(default_class_options().len(), 6);
    }
}
