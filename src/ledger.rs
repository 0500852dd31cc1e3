// 📊 Fee Ledger Aggregator - dashboard numbers from a snapshot of students
//
// Everything here is a pure function over a borrowed slice. Results are
// recomputed on every change; at the size of one school's roster that is
// cheaper than keeping an index in sync.

use serde::Serialize;

use crate::student::StudentRecord;

// ============================================================================
// TOTALS
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub count: usize,
    pub collected: f64,
    pub due: f64,
}

pub fn totals(records: &[StudentRecord]) -> Totals {
    records.iter().fold(Totals::default(), |mut acc, r| {
        acc.count += 1;
        acc.collected += r.paid_fees();
        acc.due += r.due_fees();
        acc
    })
}

// ============================================================================
// PER-CLASS BREAKDOWN
// ============================================================================

/// One bar/point of the dashboard charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassSummary {
    pub class_name: String,
    pub student_count: usize,
    pub collected: f64,
    pub due: f64,
}

/// One bucket per label in `class_options`, same order, empty classes included.
///
/// Records with a class outside `class_options` land in no bucket.
pub fn by_class(records: &[StudentRecord], class_options: &[String]) -> Vec<ClassSummary> {
    class_options
        .iter()
        .map(|class_name| {
            let in_class = students_in_class(records, class_name);
            let sums = totals(&in_class);
            ClassSummary {
                class_name: class_name.clone(),
                student_count: sums.count,
                collected: sums.collected,
                due: sums.due,
            }
        })
        .collect()
}

// ============================================================================
// FILTERS
// ============================================================================

/// Students with a positive due amount, in roster order.
pub fn due_students(records: &[StudentRecord]) -> Vec<StudentRecord> {
    records.iter().filter(|r| r.has_dues()).cloned().collect()
}

/// Case-insensitive substring match on the name. Empty query keeps everyone.
pub fn search_by_name(records: &[StudentRecord], query: &str) -> Vec<StudentRecord> {
    let needle = query.to_lowercase();
    records
        .iter()
        .filter(|r| r.name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Exact class match. An empty class selects nobody.
pub fn students_in_class(records: &[StudentRecord], class_grade: &str) -> Vec<StudentRecord> {
    if class_grade.is_empty() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|r| r.class_grade() == class_grade)
        .cloned()
        .collect()
}

// ============================================================================
// DISPLAY
// ============================================================================

/// Rupee amount with thousands separators and at most two decimals, e.g. `₹123,456.5`.
pub fn format_rupees(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let mut out = String::from(if negative && cents > 0 { "-₹" } else { "₹" });
    out.push_str(&grouped);
    if fraction > 0 {
        let decimals = format!("{:02}", fraction);
        out.push('.');
        out.push_str(decimals.trim_end_matches('0'));
    }
    out
}
