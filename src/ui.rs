use anyhow::Result;
use chrono::{DateTime, Utc};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Axis, BarChart, Block, Borders, Cell, Chart, Dataset, GraphType, Paragraph, Row, Table,
        TableState, Wrap,
    },
    Frame, Terminal,
};
use std::io;
use std::time::Duration;

use fee_ledger::{
    format_rupees, FeeLedger, FormField, LedgerError, LoginGate, Navigator, Screen,
    StudentForm, StudentRecord, APP_SCREENS,
};

const ACADEMY_NAME: &str = "Shivsadhana Education Academy";
const ACADEMY_TAGLINE: &str = "Empowering Future Leaders";

#[derive(Debug, Clone, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

pub struct App {
    pub ledger: FeeLedger,
    pub nav: Navigator,
    pub gate: LoginGate,
    pub password_input: String,
    pub form: StudentForm,
    pub form_field: FormField,
    pub search: String,
    pub search_active: bool,
    pub students_state: TableState,
    pub remove_class: Option<usize>,
    pub remove_state: TableState,
    pub pending_delete: Option<String>,
    pub status: Option<StatusMessage>,
    pub should_quit: bool,
    pending_link: Option<String>,
}

impl App {
    pub fn new(ledger: FeeLedger, gate: LoginGate, now: DateTime<Utc>) -> Self {
        Self {
            ledger,
            nav: Navigator::new(now),
            gate,
            password_input: String::new(),
            form: StudentForm::new(),
            form_field: FormField::Name,
            search: String::new(),
            search_active: false,
            students_state: TableState::default(),
            remove_class: None,
            remove_state: TableState::default(),
            pending_delete: None,
            status: None,
            should_quit: false,
            pending_link: None,
        }
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        self.nav.tick(now);
    }

    /// Link the operator asked to open, handed over once.
    pub fn take_pending_link(&mut self) -> Option<String> {
        self.pending_link.take()
    }

    pub fn visible_students(&self) -> Vec<StudentRecord> {
        self.ledger.search_students(&self.search)
    }

    pub fn selected_class(&self) -> Option<&str> {
        self.remove_class
            .and_then(|i| self.ledger.class_options().get(i))
            .map(|c| c.as_str())
    }

    pub fn remove_candidates(&self) -> Vec<StudentRecord> {
        self.selected_class()
            .map(|c| self.ledger.students_in_class(c))
            .unwrap_or_default()
    }

    fn info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn error(&mut self, err: &LedgerError) {
        if !err.is_user_facing() {
            tracing::error!(error = %err, "Ledger operation failed");
        }
        self.status = Some(StatusMessage {
            text: err.to_string(),
            is_error: true,
        });
    }

    fn go(&mut self, screen: Screen) {
        if self.nav.go(screen) {
            self.on_enter_screen();
        }
    }

    /// Per-screen reset, mirroring what each screen shows when opened.
    fn on_enter_screen(&mut self) {
        self.pending_delete = None;
        self.search_active = false;
        match self.nav.current() {
            Screen::AddStudent => {
                // Arriving by navigation always means a fresh add
                self.form.reset();
                self.form_field = FormField::Name;
            }
            Screen::ViewStudents => {
                let len = self.visible_students().len();
                clamp_selection(&mut self.students_state, len);
            }
            Screen::RemoveStudents => {
                self.remove_class = None;
                self.remove_state.select(None);
            }
            _ => {}
        }
    }

    // ========================================================================
    // KEY HANDLING
    // ========================================================================

    pub fn handle_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.nav.current() {
            Screen::Splash => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    self.should_quit = true;
                }
            }
            Screen::Login => self.handle_login_key(key, now),
            _ => self.handle_app_key(key),
        }
    }

    fn handle_login_key(&mut self, key: KeyEvent, now: DateTime<Utc>) {
        match key.code {
            KeyCode::Esc => self.should_quit = true,
            KeyCode::Enter => {
                if self.gate.attempt(&self.password_input, now) {
                    self.password_input.clear();
                    self.status = None;
                    self.nav.login();
                    self.on_enter_screen();
                } else {
                    self.password_input.clear();
                }
            }
            KeyCode::Backspace => {
                self.password_input.pop();
            }
            KeyCode::Char(c) => self.password_input.push(c),
            _ => {}
        }
    }

    fn handle_app_key(&mut self, key: KeyEvent) {
        // Navigation that works on every app screen
        match key.code {
            KeyCode::Tab => {
                self.nav.next();
                self.on_enter_screen();
                return;
            }
            KeyCode::BackTab => {
                self.nav.previous();
                self.on_enter_screen();
                return;
            }
            _ => {}
        }

        match self.nav.current() {
            Screen::AddStudent => self.handle_form_key(key),
            Screen::ViewStudents if self.search_active => self.handle_search_key(key),
            screen => {
                if self.handle_menu_key(key) {
                    return;
                }
                match screen {
                    Screen::ViewStudents => self.handle_students_key(key),
                    Screen::FeesReminder => self.handle_reminder_key(key),
                    Screen::RemoveStudents => self.handle_remove_key(key),
                    _ => {}
                }
            }
        }
    }

    /// Shortcuts for screens without text entry. Returns true when consumed.
    fn handle_menu_key(&mut self, key: KeyEvent) -> bool {
        if self.pending_delete.is_some() {
            return false;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('l') => {
                self.gate.logout();
                self.nav.logout();
                self.status = None;
            }
            KeyCode::Char(c @ '1'..='5') => {
                let index = c as usize - '1' as usize;
                self.go(APP_SCREENS[index]);
            }
            _ => return false,
        }
        true
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.form.reset();
                self.go(Screen::Dashboard);
            }
            KeyCode::Up => self.form_field = self.form_field.previous(),
            KeyCode::Down => self.form_field = self.form_field.next(),
            KeyCode::Left if self.form_field == FormField::ClassGrade => self.form.cycle_class(false),
            KeyCode::Right if self.form_field == FormField::ClassGrade => self.form.cycle_class(true),
            KeyCode::Enter => self.submit_form(),
            KeyCode::Backspace => {
                if self.form_field != FormField::ClassGrade {
                    self.form.field_mut(self.form_field).pop();
                }
            }
            KeyCode::Char(c) => match self.form_field {
                FormField::ClassGrade => {}
                FormField::TotalFees | FormField::PaidFees => {
                    if c.is_ascii_digit() || c == '.' {
                        self.form.field_mut(self.form_field).push(c);
                    }
                }
                FormField::Name => self.form.name.push(c),
            },
            _ => {}
        }
    }

    /// Open the form pre-filled for `record`. The only way into edit mode.
    fn start_edit(&mut self, record: &StudentRecord) {
        self.go(Screen::AddStudent);
        self.form = StudentForm::from_record(record);
    }

    fn submit_form(&mut self) {
        let draft = match self.form.to_draft() {
            Ok(draft) => draft,
            Err(e) => return self.error(&e),
        };

        let result = match self.form.editing_id.clone() {
            Some(id) => self.ledger.edit_student(&id, &draft).map(|_| true),
            None => self.ledger.add_student(&draft).map(|_| false),
        };

        match result {
            Ok(was_edit) => {
                self.form.reset();
                self.form_field = FormField::Name;
                if was_edit {
                    self.info("Student updated successfully!");
                    self.go(Screen::ViewStudents);
                } else {
                    // Stay on the form to keep adding
                    self.info("Student added successfully!");
                }
            }
            Err(e) => self.error(&e),
        }
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.search_active = false,
            KeyCode::Backspace => {
                self.search.pop();
            }
            KeyCode::Char(c) => self.search.push(c),
            _ => {}
        }
        let len = self.visible_students().len();
        clamp_selection(&mut self.students_state, len);
    }

    fn handle_students_key(&mut self, key: KeyEvent) {
        let visible = self.visible_students();
        match key.code {
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Down | KeyCode::Char('j') => select_next(&mut self.students_state, visible.len()),
            KeyCode::Up | KeyCode::Char('k') => select_previous(&mut self.students_state, visible.len()),
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(record) = self.students_state.selected().and_then(|i| visible.get(i)) {
                    self.start_edit(record);
                }
            }
            _ => {}
        }
    }

    fn handle_reminder_key(&mut self, key: KeyEvent) {
        if !matches!(key.code, KeyCode::Char('w') | KeyCode::Enter) {
            return;
        }
        match self.ledger.reminder() {
            Ok(reminder) => {
                self.info(format!(
                    "Opening WhatsApp reminder for {} student(s)",
                    reminder.recipients
                ));
                self.pending_link = Some(reminder.link);
            }
            Err(e) => self.error(&e),
        }
    }

    fn handle_remove_key(&mut self, key: KeyEvent) {
        if let Some(id) = self.pending_delete.take() {
            if key.code == KeyCode::Char('y') {
                match self.ledger.remove_student(&id) {
                    Ok(()) => self.info("Student removed"),
                    Err(e) => self.error(&e),
                }
                let len = self.remove_candidates().len();
                clamp_selection(&mut self.remove_state, len);
            } else {
                self.info("Removal cancelled");
            }
            return;
        }

        let class_count = self.ledger.class_options().len();
        match key.code {
            KeyCode::Left | KeyCode::Right if class_count > 0 => {
                let forward = key.code == KeyCode::Right;
                self.remove_class = Some(match self.remove_class {
                    Some(i) if forward => (i + 1) % class_count,
                    Some(i) => (i + class_count - 1) % class_count,
                    None if forward => 0,
                    None => class_count - 1,
                });
                let len = self.remove_candidates().len();
                self.remove_state.select(None);
                clamp_selection(&mut self.remove_state, len);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let len = self.remove_candidates().len();
                select_next(&mut self.remove_state, len);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let len = self.remove_candidates().len();
                select_previous(&mut self.remove_state, len);
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                let candidates = self.remove_candidates();
                if let Some(record) = self.remove_state.selected().and_then(|i| candidates.get(i)) {
                    self.info(format!("Remove {}? Press y to confirm", record.name()));
                    self.pending_delete = Some(record.id().to_string());
                }
            }
            _ => {}
        }
    }
}

fn clamp_selection(state: &mut TableState, len: usize) {
    if len == 0 {
        state.select(None);
    } else {
        let i = state.selected().unwrap_or(0).min(len - 1);
        state.select(Some(i));
    }
}

fn select_next(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(i) if i >= len - 1 => 0,
        Some(i) => i + 1,
        None => 0,
    };
    state.select(Some(i));
}

fn select_previous(state: &mut TableState, len: usize) {
    if len == 0 {
        return;
    }
    let i = match state.selected() {
        Some(0) | None => len - 1,
        Some(i) => i - 1,
    };
    state.select(Some(i));
}

// ============================================================================
// TERMINAL LOOP
// ============================================================================

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.tick(Utc::now());
        terminal.draw(|f| ui(f, app))?;

        if let Some(link) = app.take_pending_link() {
            if let Err(e) = crate::launch_uri(&link) {
                tracing::warn!(error = %e, "Could not open reminder link");
                app.status = Some(StatusMessage {
                    text: format!("Could not open browser. Link: {}", link),
                    is_error: true,
                });
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Poll so the splash delay and the login error window expire on time
        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.handle_key(key, Utc::now());
                }
            }
        }
    }
}

// ============================================================================
// RENDERING
// ============================================================================

fn ui(f: &mut Frame, app: &mut App) {
    let area = f.size();
    match app.nav.current() {
        Screen::Splash => return render_splash(f, area),
        Screen::Login => return render_login(f, area, app),
        _ => {}
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(area);

    render_header(f, chunks[0], app);

    match app.nav.current() {
        Screen::Dashboard => render_dashboard(f, chunks[1], app),
        Screen::AddStudent => render_form(f, chunks[1], app),
        Screen::ViewStudents => render_students(f, chunks[1], app),
        Screen::FeesReminder => render_reminder(f, chunks[1], app),
        Screen::RemoveStudents => render_remove(f, chunks[1], app),
        Screen::Splash | Screen::Login => {}
    }

    render_status_bar(f, chunks[2], app);
}

fn centered_rect(width_percent: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - width_percent) / 2),
            Constraint::Percentage(width_percent),
            Constraint::Percentage((100 - width_percent) / 2),
        ])
        .split(vertical[1])[1]
}

fn render_splash(f: &mut Frame, area: Rect) {
    let content = vec![
        Line::from(""),
        Line::from(Span::styled(
            ACADEMY_NAME,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            ACADEMY_TAGLINE.to_uppercase(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let splash = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(splash, centered_rect(60, 7, area));
}

fn render_login(f: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![
        Line::from(Span::styled(
            "Welcome Back",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(ACADEMY_NAME, Style::default().fg(Color::DarkGray))),
        Line::from(""),
        Line::from(vec![
            Span::styled("Password: ", Style::default().fg(Color::Cyan)),
            Span::raw("*".repeat(app.password_input.chars().count())),
            Span::styled("_", Style::default().fg(Color::Yellow)),
        ]),
        Line::from(""),
    ];

    if app.gate.error_visible(Utc::now()) {
        content.push(Line::from(Span::styled(
            "Incorrect password. Please try again.",
            Style::default().fg(Color::Red),
        )));
    } else {
        content.push(Line::from(Span::styled(
            "Enter to login | Esc to quit",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    let login = Paragraph::new(content)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(" Login "),
        );

    f.render_widget(login, centered_rect(50, 8, area));
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let totals = app.ledger.totals();

    let mut tab_spans = vec![];
    for (i, screen) in APP_SCREENS.iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *screen == app.nav.current() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(format!("{} {}", i + 1, screen.title()), style));
    }

    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Students: {}", totals.count),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  "));
    tab_spans.push(Span::styled(
        format!("Due: {}", format_rupees(totals.due)),
        Style::default().fg(Color::Red),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn stat_card<'a>(title: &'a str, value: String, color: Color) -> Paragraph<'a> {
    Paragraph::new(vec![
        Line::from(Span::styled(title, Style::default().fg(Color::DarkGray))),
        Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color)),
    )
}

fn render_dashboard(f: &mut Frame, area: Rect, app: &App) {
    let totals = app.ledger.totals();
    let breakdown = app.ledger.class_breakdown();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let cards = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(rows[0]);

    f.render_widget(
        stat_card("Total Fees Collected", format_rupees(totals.collected), Color::Green),
        cards[0],
    );
    f.render_widget(
        stat_card("Total Students", totals.count.to_string(), Color::Blue),
        cards[1],
    );
    f.render_widget(
        stat_card("Total Due Amount", format_rupees(totals.due), Color::Red),
        cards[2],
    );

    let charts = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    // Students per class
    let bars: Vec<(&str, u64)> = breakdown
        .iter()
        .map(|c| (c.class_name.as_str(), c.student_count as u64))
        .collect();

    let bar_chart = BarChart::default()
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Students per Class "),
        )
        .data(&bars[..])
        .bar_width(5)
        .bar_gap(2)
        .bar_style(Style::default().fg(Color::Blue))
        .value_style(Style::default().fg(Color::White).bg(Color::Blue));

    f.render_widget(bar_chart, charts[0]);

    // Fees collection vs due
    let collected: Vec<(f64, f64)> = breakdown
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64, c.collected))
        .collect();
    let due: Vec<(f64, f64)> = breakdown
        .iter()
        .enumerate()
        .map(|(i, c)| (i as f64, c.due))
        .collect();

    let y_max = collected
        .iter()
        .chain(due.iter())
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max);
    let y_min = due.iter().map(|(_, y)| *y).fold(0.0_f64, f64::min);
    let y_top = if y_max > 0.0 { y_max * 1.1 } else { 1.0 };

    let datasets = vec![
        Dataset::default()
            .name("Collected")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Green))
            .data(&collected),
        Dataset::default()
            .name("Due")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(Color::Red))
            .data(&due),
    ];

    let x_labels: Vec<Span> = breakdown
        .iter()
        .map(|c| Span::raw(c.class_name.clone()))
        .collect();
    let x_max = breakdown.len().saturating_sub(1).max(1) as f64;

    let line_chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(" Fees Collection vs Due "),
        )
        .x_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(Color::DarkGray))
                .bounds([y_min, y_top])
                .labels(vec![
                    Span::raw(format_rupees(y_min)),
                    Span::raw(format_rupees(y_top)),
                ]),
        );

    f.render_widget(line_chart, charts[1]);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let mut content = vec![Line::from("")];

    for field in FormField::ALL {
        let focused = field == app.form_field;
        let marker = if focused { "→ " } else { "  " };
        let value = match field {
            FormField::ClassGrade if app.form.class_grade.is_empty() => "< Select Class >".to_string(),
            FormField::ClassGrade => format!("< {} >", app.form.class_grade),
            _ => app.form.field(field).to_string(),
        };
        let value_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        content.push(Line::from(vec![
            Span::styled(marker, Style::default().fg(Color::Green)),
            Span::styled(
                format!("{:<14}", field.label()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(value, value_style),
        ]));
        content.push(Line::from(""));
    }

    let due = app.form.due_preview();
    content.push(Line::from(vec![
        Span::raw("  "),
        Span::styled(
            format!("{:<14}", "Due Amount"),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format_rupees(due),
            Style::default()
                .fg(if due > 0.0 { Color::Red } else { Color::Green })
                .add_modifier(Modifier::BOLD),
        ),
    ]));
    content.push(Line::from(""));
    content.push(Line::from(Span::styled(
        "  ↑/↓ field | ←/→ class | Enter save | Esc cancel",
        Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
    )));

    let form = Paragraph::new(content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(format!(" {} ", app.form.title())),
    );

    f.render_widget(form, area);
}

fn student_row(record: &StudentRecord) -> Row<'static> {
    let due_color = if record.has_dues() { Color::Red } else { Color::Green };
    Row::new(vec![
        Cell::from(truncate(record.name(), 30)),
        Cell::from(record.class_grade().to_string()),
        Cell::from(format_rupees(record.total_fees())),
        Cell::from(format_rupees(record.paid_fees())).style(Style::default().fg(Color::Green)),
        Cell::from(format_rupees(record.due_fees())).style(Style::default().fg(due_color)),
    ])
    .height(1)
}

fn student_table<'a>(rows: Vec<Row<'a>>, title: String) -> Table<'a> {
    let header_cells = ["Name", "Class", "Total", "Paid", "Due"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Length(7),
            Constraint::Length(14),
            Constraint::Length(14),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ")
}

fn render_students(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let search_style = if app.search_active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::White)
    };
    let cursor = if app.search_active { "_" } else { "" };
    let search = Paragraph::new(Line::from(vec![
        Span::styled("Search: ", Style::default().fg(Color::Cyan)),
        Span::styled(format!("{}{}", app.search, cursor), search_style),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(search_style));
    f.render_widget(search, chunks[0]);

    let visible = app.visible_students();
    let rows: Vec<Row> = visible.iter().map(student_row).collect();
    let table = student_table(rows, format!(" Students ({}) ", visible.len()));

    f.render_stateful_widget(table, chunks[1], &mut app.students_state);
}

fn render_reminder(f: &mut Frame, area: Rect, app: &App) {
    let due = app.ledger.due_students();

    if due.is_empty() {
        let content = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No Pending Dues!",
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                "All students have cleared their fees.",
                Style::default().fg(Color::DarkGray),
            )),
        ];
        let empty = Paragraph::new(content).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green))
                .title(" Fees Reminder "),
        );
        f.render_widget(empty, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(5)])
        .split(area);

    let rows: Vec<Row> = due.iter().map(student_row).collect();
    f.render_widget(
        student_table(rows, format!(" Pending Fees ({}) ", due.len())),
        chunks[0],
    );

    let preview = match app.ledger.reminder() {
        Ok(reminder) => reminder.text,
        Err(e) => e.to_string(),
    };
    let message = Paragraph::new(vec![
        Line::from(vec![
            Span::styled("w", Style::default().fg(Color::Yellow)),
            Span::raw(" Send WhatsApp reminder"),
        ]),
        Line::from(Span::styled(preview, Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Green))
            .title(" Message "),
    );
    f.render_widget(message, chunks[1]);
}

fn render_remove(f: &mut Frame, area: Rect, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(0)])
        .split(area);

    let class_label = app
        .selected_class()
        .map(|c| format!("< {} >", c))
        .unwrap_or_else(|| "< Select Class >".to_string());
    let selector = Paragraph::new(Line::from(vec![
        Span::styled("Class: ", Style::default().fg(Color::Cyan)),
        Span::styled(class_label, Style::default().fg(Color::Yellow)),
        Span::styled(
            "   ←/→ class | d remove",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        ),
    ]))
    .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)));
    f.render_widget(selector, chunks[0]);

    let Some(class_grade) = app.selected_class().map(str::to_string) else {
        let hint = Paragraph::new("Please select a class to view students.")
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(hint, chunks[1]);
        return;
    };

    let candidates = app.remove_candidates();
    if candidates.is_empty() {
        let hint = Paragraph::new(format!("No students found in {}.", class_grade))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(hint, chunks[1]);
        return;
    }

    let rows: Vec<Row> = candidates.iter().map(student_row).collect();
    let table = student_table(rows, format!(" Remove Students - {} ", class_grade));
    f.render_stateful_widget(table, chunks[1], &mut app.remove_state);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        let color = if status.is_error { Color::Red } else { Color::Green };
        status_spans.push(Span::styled(format!(" {} ", status.text), Style::default().fg(color)));
        status_spans.push(Span::raw(" | "));
    }

    status_spans.push(Span::styled("Tab", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Screen | "));
    match app.nav.current() {
        Screen::ViewStudents => {
            status_spans.push(Span::styled("/", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Search | "));
            status_spans.push(Span::styled("Enter", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Edit | "));
        }
        Screen::AddStudent => {}
        _ => {
            status_spans.push(Span::styled("1-5", Style::default().fg(Color::Yellow)));
            status_spans.push(Span::raw(" Jump | "));
        }
    }
    status_spans.push(Span::styled("l", Style::default().fg(Color::Yellow)));
    status_spans.push(Span::raw(" Logout | "));
    status_spans.push(Span::styled("q", Style::default().fg(Color::Red)));
    status_spans.push(Span::raw(" Quit"));

    let status_bar = Paragraph::new(vec![Line::from(status_spans)]).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White)),
    );

    f.render_widget(status_bar, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}
