use std::io::{self, Stdout, Write};

use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::outcome::LogoutOutcome;
use crate::domain::ports::Notifier;
use crate::domain::session::ActiveSession;

const PROGRESS_DOTS: usize = 3;

// Terminal panel on stderr with a spinner line that clears itself on dismiss.
#[derive(Default)]
pub struct ModalNotifier {
    spinner: Option<ProgressBar>,
}

impl ModalNotifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Notifier for ModalNotifier {
    fn show(&mut self, session: &ActiveSession) {
        eprintln!("{}", panel(session));

        let style = ProgressStyle::with_template("{prefix:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner());
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(style);
        spinner.set_message("Processing logout...");
        self.spinner = Some(spinner);
    }

    fn tick(&mut self, frame: usize) {
        if let Some(spinner) = &self.spinner {
            spinner.set_prefix(progress_dots(frame));
            spinner.tick();
        }
    }

    fn finish(&mut self, outcome: &LogoutOutcome) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(outcome.status_line());
            spinner.tick();
        }
    }

    fn dismiss(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }
}

// Plain status lines for hooks without an interactive terminal.
pub struct ConsoleNotifier<W: Write = Stdout> {
    out: W,
}

impl ConsoleNotifier<Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> ConsoleNotifier<W> {
    pub fn with_writer(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Notifier for ConsoleNotifier<W> {
    // Console output is advisory; write errors are ignored.
    fn show(&mut self, session: &ActiveSession) {
        let _ = writeln!(self.out, "Active session found: {}", session.describe());
        let _ = writeln!(self.out, "Logging out...");
    }

    fn tick(&mut self, _frame: usize) {}

    fn finish(&mut self, outcome: &LogoutOutcome) {
        let _ = writeln!(self.out, "{}", outcome.status_line());
        let _ = self.out.flush();
    }

    fn dismiss(&mut self) {}
}

pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn show(&mut self, _session: &ActiveSession) {}
    fn tick(&mut self, _frame: usize) {}
    fn finish(&mut self, _outcome: &LogoutOutcome) {}
    fn dismiss(&mut self) {}
}

fn progress_dots(frame: usize) -> String {
    "●".repeat(frame % PROGRESS_DOTS + 1)
}

fn panel(session: &ActiveSession) -> String {
    let mut lines = vec![
        "System Shutdown Detected".to_string(),
        "Logging out from lab session".to_string(),
        String::new(),
    ];
    match (&session.name, &session.register_no) {
        (Some(name), Some(register_no)) => {
            lines.push(format!("Name:        {name}"));
            lines.push(format!("Register No: {register_no}"));
        }
        _ => lines.push(format!("Session:     {}", session.session_id)),
    }

    let width = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0);
    let border = "─".repeat(width + 2);

    let mut out = format!("┌{border}┐\n");
    for line in &lines {
        let pad = width - line.chars().count();
        out.push_str(&format!("│ {line}{} │\n", " ".repeat(pad)));
    }
    out.push_str(&format!("└{border}┘"));
    out
}
