// 💬 Reminder Composer - WhatsApp message for parents with pending fees
//
// Builds the text and the wa.me deep link. Opening the link is left to the
// caller; nothing here touches the network.

use serde::Serialize;

use crate::error::{LedgerError, Result};
use crate::student::StudentRecord;

pub const REMINDER_PREFIX: &str = "Following students have pending fees: ";
pub const WHATSAPP_BASE_URL: &str = "https://wa.me";

/// Academy number reminders are sent to unless configured otherwise.
pub const DEFAULT_WHATSAPP_NUMBER: &str = "919834252755";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reminder {
    pub text: String,
    pub link: String,
    pub recipients: usize,
}

/// "Following students have pending fees: Rahul Patil(7th), Aarav(5th)"
pub fn build_reminder_text(due_students: &[StudentRecord]) -> Result<String> {
    if due_students.is_empty() {
        return Err(LedgerError::EmptyInput);
    }

    let list = due_students
        .iter()
        .map(|s| format!("{}({})", s.name(), s.class_grade()))
        .collect::<Vec<_>>()
        .join(", ");

    Ok(format!("{}{}", REMINDER_PREFIX, list))
}

pub fn build_reminder_link(text: &str, phone_number: &str) -> String {
    format!(
        "{}/{}?text={}",
        WHATSAPP_BASE_URL,
        phone_number,
        urlencoding::encode(text)
    )
}

pub fn compose_reminder(due_students: &[StudentRecord], phone_number: &str) -> Result<Reminder> {
    let text = build_reminder_text(due_students)?;
    let link = build_reminder_link(&text, phone_number);

    Ok(Reminder {
        text,
        link,
        recipients: due_students.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student::StudentDraft;

    fn student(id: &str, name: &str, class: &str, total: f64, paid: f64) -> StudentRecord {
        StudentRecord::new(id.to_string(), &StudentDraft::new(name, class, total, paid)).unwrap()
    }

    #[test]
    fn test_text_for_single_student() {
        let due = vec![student("1", "Rahul Patil", "7th", 5000.0, 3000.0)];

        assert_eq!(
            build_reminder_text(&due).unwrap(),
            "Following students have pending fees: Rahul Patil(7th)"
        );
    }

    #[test]
    fn test_text_joins_with_comma_space() {
        let due = vec![
            student("1", "Rahul Patil", "7th", 5000.0, 3000.0),
            student("2", "Aarav", "5th", 100.0, 0.0),
        ];

        assert_eq!(
            build_reminder_text(&due).unwrap(),
            "Following students have pending fees: Rahul Patil(7th), Aarav(5th)"
        );
    }

    #[test]
    fn test_empty_list_is_empty_input() {
        assert!(matches!(build_reminder_text(&[]), Err(LedgerError::EmptyInput)));
        assert!(matches!(
            compose_reminder(&[], DEFAULT_WHATSAPP_NUMBER),
            Err(LedgerError::EmptyInput)
        ));
    }

    #[test]
    fn test_link_percent_encodes_text() {
        let link = build_reminder_link(
            "Following students have pending fees: Rahul Patil(7th)",
            "919834252755",
        );

        assert_eq!(
            link,
            "https://wa.me/919834252755?text=Following%20students%20have%20pending%20fees%3A%20Rahul%20Patil%287th%29"
        );
    }

    #[test]
    fn test_link_encodes_non_ascii_and_separators() {
        let link = build_reminder_link("a&b=c ₹", "1");
        assert_eq!(link, "https://wa.me/1?text=a%26b%3Dc%20%E2%82%B9");
    }

    #[test]
    fn test_compose_reminder_bundles_text_and_link() {
        let due = vec![student("1", "Rahul Patil", "7th", 5000.0, 3000.0)];

        let reminder = compose_reminder(&due, "919834252755").unwrap();

        assert_eq!(reminder.recipients, 1);
        assert!(reminder.link.starts_with("https://wa.me/919834252755?text="));
        let encoded = reminder.link.split("?text=").nth(1).unwrap();
        assert_eq!(urlencoding::decode(encoded).unwrap(), reminder.text);
    }
}
