// Only compile UI module when TUI feature is enabled
#[cfg(feature = "tui")]
mod ui;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::io;
use std::process::Command as Process;

// Use library instead of local modules
use fee_ledger::{
    format_rupees, logging, Cli, Command, FeeLedger, LedgerArgs, LedgerError, SqliteBlobStore,
    StudentDraft, StudentRecord, StudentStore,
};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    if let Err(e) = cli.ledger.validate() {
        bail!("Invalid configuration: {}", e);
    }

    let command = cli.command.clone().unwrap_or(Command::Tui);

    if command == Command::Tui {
        // The dashboard owns the terminal, so logs go to a file
        logging::init_file(&cli.ledger.log_level, &cli.ledger.log_path())?;
    } else {
        logging::init_stderr(&cli.ledger.log_level);
    }

    let mut ledger = open_ledger(&cli.ledger)?;

    match command {
        Command::Tui => run_ui_mode(ledger, &cli.ledger)?,
        Command::Stats => print_stats(&ledger),
        Command::List { query, class } => {
            let mut students = match &class {
                Some(class) => ledger.students_in_class(class),
                None => ledger.students().to_vec(),
            };
            if let Some(query) = query.as_deref().filter(|q| !q.trim().is_empty()) {
                let matches = ledger.search_students(query);
                students.retain(|s| matches.iter().any(|m| m.id() == s.id()));
            }
            print_students(&students);
        }
        Command::Due => {
            let due = ledger.due_students();
            if due.is_empty() {
                println!("🎉 No pending dues! All students have cleared their fees.");
            } else {
                print_students(&due);
            }
        }
        Command::Add { name, class, total, paid } => {
            let record = ledger.add_student(&StudentDraft::new(&name, &class, total, paid))?;
            println!("✓ Added {} ({}), due {}", record.name(), record.id(), format_rupees(record.due_fees()));
        }
        Command::Edit { id, name, class, total, paid } => {
            let record = ledger.edit_student(&id, &StudentDraft::new(&name, &class, total, paid))?;
            println!("✓ Updated {} ({}), due {}", record.name(), record.id(), format_rupees(record.due_fees()));
        }
        Command::Remove { id } => {
            ledger.remove_student(&id)?;
            println!("✓ Removed {}", id);
        }
        Command::Remind { open } => match ledger.reminder() {
            Ok(reminder) => {
                println!("📨 {}", reminder.text);
                println!("{}", reminder.link);
                if open {
                    launch_uri(&reminder.link).context("Failed to open reminder link")?;
                }
            }
            Err(LedgerError::EmptyInput) => {
                println!("🎉 No pending dues, nothing to send.");
            }
            Err(e) => return Err(e.into()),
        },
    }

    Ok(())
}

fn open_ledger(args: &LedgerArgs) -> Result<FeeLedger> {
    let backend = SqliteBlobStore::open(&args.db_path)
        .with_context(|| format!("Failed to open database {}", args.db_path.display()))?;
    let store = StudentStore::open(Box::new(backend), &args.storage_key);

    tracing::info!(
        db = %args.db_path.display(),
        students = store.len(),
        "Student store opened"
    );

    Ok(FeeLedger::new(store, args.settings()))
}

fn print_stats(ledger: &FeeLedger) {
    let totals = ledger.totals();

    println!("📊 Fee Summary");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Students:        {}", totals.count);
    println!("Fees collected:  {}", format_rupees(totals.collected));
    println!("Due amount:      {}", format_rupees(totals.due));
    println!();
    println!("{:<8} {:>8} {:>16} {:>16}", "Class", "Students", "Collected", "Due");
    for class in ledger.class_breakdown() {
        println!(
            "{:<8} {:>8} {:>16} {:>16}",
            class.class_name,
            class.student_count,
            format_rupees(class.collected),
            format_rupees(class.due)
        );
    }
}

fn print_students(students: &[StudentRecord]) {
    if students.is_empty() {
        println!("No students found.");
        return;
    }

    println!(
        "{:<15} {:<30} {:<6} {:>14} {:>14} {:>14}",
        "ID", "Name", "Class", "Total", "Paid", "Due"
    );
    for s in students {
        println!(
            "{:<15} {:<30} {:<6} {:>14} {:>14} {:>14}",
            s.id(),
            s.name(),
            s.class_grade(),
            format_rupees(s.total_fees()),
            format_rupees(s.paid_fees()),
            format_rupees(s.due_fees())
        );
    }
}

/// Hand a link to the platform's default opener.
pub(crate) fn launch_uri(uri: &str) -> io::Result<()> {
    let mut cmd = if cfg!(target_os = "macos") {
        let mut cmd = Process::new("open");
        cmd.arg(uri);
        cmd
    } else if cfg!(target_os = "windows") {
        let mut cmd = Process::new("cmd");
        cmd.args(["/C", "start", "", uri]);
        cmd
    } else {
        let mut cmd = Process::new("xdg-open");
        cmd.arg(uri);
        cmd
    };

    cmd.spawn()?;
    tracing::info!("Opened reminder link");
    Ok(())
}

#[cfg(feature = "tui")]
fn run_ui_mode(ledger: FeeLedger, args: &LedgerArgs) -> Result<()> {
    let gate = fee_ledger::LoginGate::new(&args.password);

    let mut app = ui::App::new(ledger, gate, chrono::Utc::now());
    ui::run_ui(&mut app)?;

    println!("\n✅ Dashboard closed");

    Ok(())
}

#[cfg(not(feature = "tui"))]
fn run_ui_mode(_ledger: FeeLedger, _args: &LedgerArgs) -> Result<()> {
    eprintln!("❌ TUI mode not available!");
    eprintln!("   Rebuild with: cargo build --features tui");
    eprintln!("   Or use a subcommand: fee-ledger stats");
    std::process::exit(1);
}
