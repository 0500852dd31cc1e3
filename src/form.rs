// 📝 Student form - what the operator is typing, before it becomes a draft
//
// Fields stay as strings so a half-typed number is never lost. The due
// preview is forgiving (anything unparsable counts as 0); submitting is not.

use crate::error::{LedgerError, Result};
use crate::student::{StudentDraft, StudentRecord, CLASS_OPTIONS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Name,
    ClassGrade,
    TotalFees,
    PaidFees,
}

impl FormField {
    pub const ALL: [FormField; 4] = [
        FormField::Name,
        FormField::ClassGrade,
        FormField::TotalFees,
        FormField::PaidFees,
    ];

    pub fn label(&self) -> &str {
        match self {
            FormField::Name => "Student Name",
            FormField::ClassGrade => "Class",
            FormField::TotalFees => "Total Fees",
            FormField::PaidFees => "Paid Fees",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            FormField::Name => FormField::ClassGrade,
            FormField::ClassGrade => FormField::TotalFees,
            FormField::TotalFees => FormField::PaidFees,
            FormField::PaidFees => FormField::Name,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Name => FormField::PaidFees,
            FormField::ClassGrade => FormField::Name,
            FormField::TotalFees => FormField::ClassGrade,
            FormField::PaidFees => FormField::TotalFees,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub editing_id: Option<String>,
    pub name: String,
    pub class_grade: String,
    pub total_fees: String,
    pub paid_fees: String,
}

impl StudentForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-fill the form to edit an existing record.
    pub fn from_record(record: &StudentRecord) -> Self {
        StudentForm {
            editing_id: Some(record.id().to_string()),
            name: record.name().to_string(),
            class_grade: record.class_grade().to_string(),
            total_fees: record.total_fees().to_string(),
            paid_fees: record.paid_fees().to_string(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id.is_some()
    }

    pub fn title(&self) -> &str {
        if self.is_editing() {
            "Edit Student"
        } else {
            "Add New Student"
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn field_mut(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::ClassGrade => &mut self.class_grade,
            FormField::TotalFees => &mut self.total_fees,
            FormField::PaidFees => &mut self.paid_fees,
        }
    }

    pub fn field(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::ClassGrade => &self.class_grade,
            FormField::TotalFees => &self.total_fees,
            FormField::PaidFees => &self.paid_fees,
        }
    }

    /// Step through the class options. An empty or unknown class starts at
    /// the first (forward) or last (backward) option.
    pub fn cycle_class(&mut self, forward: bool) {
        let len = CLASS_OPTIONS.len();
        let next = match CLASS_OPTIONS.iter().position(|c| *c == self.class_grade) {
            Some(i) if forward => (i + 1) % len,
            Some(i) => (i + len - 1) % len,
            None if forward => 0,
            None => len - 1,
        };
        self.class_grade = CLASS_OPTIONS[next].to_string();
    }

    /// Live due amount while typing: blank or unparsable fields count as 0.
    pub fn due_preview(&self) -> f64 {
        lenient_number(&self.total_fees) - lenient_number(&self.paid_fees)
    }

    pub fn to_draft(&self) -> Result<StudentDraft> {
        let draft = StudentDraft {
            name: self.name.clone(),
            class_grade: self.class_grade.clone(),
            total_fees: strict_number("total fees", &self.total_fees)?,
            paid_fees: strict_number("paid fees", &self.paid_fees)?,
        };
        draft.validate()?;
        Ok(draft)
    }
}

fn lenient_number(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn strict_number(field: &str, raw: &str) -> Result<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::invalid(format!("{} is required", field)));
    }
    trimmed
        .parse::<f64>()
        .map_err(|_| LedgerError::invalid(format!("{} must be a number", field)))
}
