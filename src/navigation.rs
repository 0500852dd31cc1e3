use chrono::{DateTime, Duration, Utc};

/// How long the splash screen stays up before the login screen.
pub const SPLASH_DURATION_MS: i64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Splash,
    Login,
    Dashboard,
    AddStudent,
    FeesReminder,
    ViewStudents,
    RemoveStudents,
}

/// Screens reachable after login, in menu order.
pub const APP_SCREENS: [Screen; 5] = [
    Screen::Dashboard,
    Screen::AddStudent,
    Screen::ViewStudents,
    Screen::FeesReminder,
    Screen::RemoveStudents,
];

impl Screen {
    pub fn title(&self) -> &str {
        match self {
            Screen::Splash => "Welcome",
            Screen::Login => "Login",
            Screen::Dashboard => "Dashboard",
            Screen::AddStudent => "Add Student",
            Screen::FeesReminder => "Fees Reminder",
            Screen::ViewStudents => "View Students",
            Screen::RemoveStudents => "Remove Students",
        }
    }

    pub fn is_app_screen(&self) -> bool {
        APP_SCREENS.contains(self)
    }

    fn menu_index(&self) -> Option<usize> {
        APP_SCREENS.iter().position(|s| s == self)
    }
}

/// Which screen is showing. Transitions are direct; there is nothing queued.
#[derive(Debug, Clone)]
pub struct Navigator {
    current: Screen,
    splash_started: DateTime<Utc>,
}

impl Navigator {
    pub fn new(now: DateTime<Utc>) -> Self {
        Navigator {
            current: Screen::Splash,
            splash_started: now,
        }
    }

    pub fn current(&self) -> Screen {
        self.current
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_app_screen()
    }

    /// Leave the splash screen once its delay has passed.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if self.current == Screen::Splash
            && now - self.splash_started >= Duration::milliseconds(SPLASH_DURATION_MS)
        {
            self.current = Screen::Login;
        }
    }

    pub fn login(&mut self) {
        self.current = Screen::Dashboard;
    }

    pub fn logout(&mut self) {
        self.current = Screen::Login;
    }

    /// Jump to an app screen. Ignored before login. Returns whether it moved.
    pub fn go(&mut self, screen: Screen) -> bool {
        if !self.is_authenticated() || !screen.is_app_screen() {
            return false;
        }
        self.current = screen;
        true
    }

    pub fn next(&mut self) {
        if let Some(i) = self.current.menu_index() {
            self.current = APP_SCREENS[(i + 1) % APP_SCREENS.len()];
        }
    }

    pub fn previous(&mut self) {
        if let Some(i) = self.current.menu_index() {
            self.current = APP_SCREENS[(i + APP_SCREENS.len() - 1) % APP_SCREENS.len()];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splash_moves_to_login_after_delay() {
        let start = Utc::now();
        let mut nav = Navigator::new(start);

        nav.tick(start + Duration::milliseconds(1999));
        assert_eq!(nav.current(), Screen::Splash);

        nav.tick(start + Duration::milliseconds(2000));
        assert_eq!(nav.current(), Screen::Login);
    }

    #[test]
    fn test_go_ignored_before_login() {
        let start = Utc::now();
        let mut nav = Navigator::new(start);
        nav.tick(start + Duration::seconds(5));

        assert!(!nav.go(Screen::Dashboard));
        assert_eq!(nav.current(), Screen::Login);
    }

    #[test]
    fn test_login_then_direct_navigation() {
        let mut nav = Navigator::new(Utc::now());
        nav.login();
        assert_eq!(nav.current(), Screen::Dashboard);

        assert!(nav.go(Screen::FeesReminder));
        assert_eq!(nav.current(), Screen::FeesReminder);

        assert!(!nav.go(Screen::Splash));
        assert_eq!(nav.current(), Screen::FeesReminder);
    }

    #[test]
    fn test_next_and_previous_wrap() {
        let mut nav = Navigator::new(Utc::now());
        nav.login();

        nav.previous();
        assert_eq!(nav.current(), Screen::RemoveStudents);
        nav.next();
        assert_eq!(nav.current(), Screen::Dashboard);
        nav.next();
        assert_eq!(nav.current(), Screen::AddStudent);
    }

    #[test]
    fn test_logout_returns_to_login() {
        let mut nav = Navigator::new(Utc::now());
        nav.login();
        nav.logout();

        assert_eq!(nav.current(), Screen::Login);
        assert!(!nav.is_authenticated());
    }
}
