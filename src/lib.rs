// Fee Ledger - Core Library
// Exposes all modules for use in the dashboard, the API server, and tests

pub mod error;
pub mod student;
pub mod db;
pub mod store;
pub mod ledger;
pub mod reminder;
pub mod auth;
pub mod navigation;
pub mod form;
pub mod service;
pub mod config;
pub mod logging;

#[cfg(feature = "server")]
pub mod api;

// Re-export commonly used types
pub use error::{LedgerError, Result};
pub use student::{
    default_class_options, is_known_class, time_based_id,
    StudentDraft, StudentRecord, CLASS_OPTIONS,
};
pub use db::{setup_database, BlobStore, MemoryBlobStore, SqliteBlobStore};
pub use store::{decode_records, StudentStore, DEFAULT_STORAGE_KEY};
pub use ledger::{
    by_class, due_students, format_rupees, search_by_name, students_in_class, totals,
    ClassSummary, Totals,
};
pub use reminder::{
    build_reminder_link, build_reminder_text, compose_reminder,
    Reminder, DEFAULT_WHATSAPP_NUMBER,
};
pub use auth::{LoginGate, DEFAULT_PASSWORD};
pub use navigation::{Navigator, Screen, APP_SCREENS};
pub use form::{FormField, StudentForm};
pub use service::{FeeLedger, LedgerSettings};
pub use config::{Cli, Command, LedgerArgs};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
