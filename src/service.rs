//! Fee ledger service: the entry points the dashboard screens and the HTTP
//! API call into. Owns the store; everything it hands out is a copy.

use crate::error::Result;
use crate::ledger::{self, ClassSummary, Totals};
use crate::reminder::{self, Reminder, DEFAULT_WHATSAPP_NUMBER};
use crate::store::StudentStore;
use crate::student::{default_class_options, StudentDraft, StudentRecord};

/// Per-installation settings that the core needs.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerSettings {
    pub class_options: Vec<String>,
    pub whatsapp_number: String,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        LedgerSettings {
            class_options: default_class_options(),
            whatsapp_number: DEFAULT_WHATSAPP_NUMBER.to_string(),
        }
    }
}

pub struct FeeLedger {
    store: StudentStore,
    settings: LedgerSettings,
}

impl FeeLedger {
    pub fn new(store: StudentStore, settings: LedgerSettings) -> Self {
        FeeLedger { store, settings }
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    pub fn class_options(&self) -> &[String] {
        &self.settings.class_options
    }

    // ========================================================================
    // RECORDS
    // ========================================================================

    /// Reload from storage and return the fresh collection.
    pub fn load_all(&mut self) -> Vec<StudentRecord> {
        self.store.load()
    }

    pub fn students(&self) -> &[StudentRecord] {
        self.store.records()
    }

    pub fn student(&self, id: &str) -> Option<StudentRecord> {
        self.store.get(id).cloned()
    }

    pub fn add_student(&mut self, draft: &StudentDraft) -> Result<StudentRecord> {
        self.store.add(draft)
    }

    pub fn edit_student(&mut self, id: &str, draft: &StudentDraft) -> Result<StudentRecord> {
        self.store.update(id, draft)
    }

    pub fn remove_student(&mut self, id: &str) -> Result<()> {
        self.store.remove(id)
    }

    // ========================================================================
    // DASHBOARD
    // ========================================================================

    pub fn totals(&self) -> Totals {
        ledger::totals(self.store.records())
    }

    pub fn class_breakdown(&self) -> Vec<ClassSummary> {
        ledger::by_class(self.store.records(), &self.settings.class_options)
    }

    pub fn due_students(&self) -> Vec<StudentRecord> {
        ledger::due_students(self.store.records())
    }

    pub fn search_students(&self, query: &str) -> Vec<StudentRecord> {
        ledger::search_by_name(self.store.records(), query)
    }

    pub fn students_in_class(&self, class_grade: &str) -> Vec<StudentRecord> {
        ledger::students_in_class(self.store.records(), class_grade)
    }

    // ========================================================================
    // REMINDER
    // ========================================================================

    /// Text + link for everyone with dues. `EmptyInput` when nobody owes.
    pub fn reminder(&self) -> Result<Reminder> {
        reminder::compose_reminder(&self.due_students(), &self.settings.whatsapp_number)
    }

    pub fn reminder_link(&self) -> Result<String> {
        self.reminder().map(|r| r.link)
    }
}
