// UI layer: plain terminal rendering of the profile panel, the main menu and
// command output. Colors come from the active `Theme`; everything here is
// cosmetic and never affects control flow.

use crate::command::Command;
use crate::error::CollaboratorError;
use crate::profile::ProfileSnapshot;
use crate::purchase::{AttemptOutcome, AttemptRecord, LoopExit, LoopReport};
use chrono::{DateTime, Local, Utc};
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Stylize};
use crossterm::terminal::{Clear, ClearType};
use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::io::stdout;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Minimal,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Minimal,
            Self::Minimal => Self::Dark,
        }
    }

    fn panel(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Minimal => Color::White,
        }
    }

    fn title(self) -> Color {
        match self {
            Self::Dark => Color::Magenta,
            Self::Minimal => Color::White,
        }
    }

    fn key(self) -> Color {
        match self {
            Self::Dark => Color::Cyan,
            Self::Minimal => Color::White,
        }
    }
}

/// Clear the terminal; a no-op when stdout is not a terminal.
pub fn clear_screen() {
    let mut out = stdout();
    if out.is_tty() {
        let _ = crossterm::execute!(out, Clear(ClearType::All), MoveTo(0, 0));
    }
}

/// Spinner shown while waiting on the gateway.
pub fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// `Rp 1.234.567`
pub fn format_rupiah(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("Rp {}{}", sign, grouped)
}

pub fn format_expiry(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".into())
}

/// Key/value rows of the profile panel.
pub fn profile_rows(snapshot: &ProfileSnapshot) -> Vec<(&'static str, String)> {
    vec![
        ("Number", snapshot.number.clone()),
        ("Type", snapshot.subscription_type.to_string()),
        ("Balance", snapshot.balance.map(format_rupiah).unwrap_or_else(|| "-".into())),
        ("Active until", format_expiry(snapshot.expires_at)),
        ("Info", snapshot.loyalty.to_string()),
    ]
}

fn print_title(title: &str, theme: Theme) {
    let rule = "─".repeat(40usize.saturating_sub(title.len() + 4));
    println!(
        "{} {} {}",
        "──".with(theme.panel()),
        title.with(theme.title()).bold(),
        rule.with(theme.panel())
    );
}

pub fn render_profile(snapshot: &ProfileSnapshot, theme: Theme) {
    print_title("USER PROFILE", theme);
    for (key, value) in profile_rows(snapshot) {
        println!("  {} {}", format!("{:>12}", key).with(theme.key()), value.bold());
    }
    println!();
}

pub fn render_profile_error(err: &CollaboratorError, theme: Theme) {
    print_title("USER PROFILE", theme);
    println!("  {}", format!("Could not load profile: {}", err).red());
    println!();
}

pub fn render_menu(theme: Theme) {
    print_title("MAIN MENU", theme);
    for (token, label) in Command::MENU {
        let label = if *token == "7" {
            format!("⚠ {}", label).red().bold()
        } else {
            label.to_string().white()
        };
        println!("  {} {}", format!("{:>4}", token).green().bold(), label);
    }
    println!();
    println!("{}", "ENTER = repeat last menu | CTRL+C = quit".dark_grey());
}

pub fn print_json(title: &str, value: &Value) {
    println!("{}", title.bold());
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(_) => println!("{}", value),
    }
}

pub fn print_error(err: &CollaboratorError) {
    println!("{}", format!("Error: {}", err).red());
}

pub fn print_warning(msg: &str) {
    println!("{}", msg.red().bold());
}

pub fn print_info(msg: &str) {
    println!("{}", msg.cyan());
}

pub fn attempt_line(record: &AttemptRecord) -> String {
    match &record.result.detail {
        Some(detail) => format!("[#{}] {} {}", record.number, record.result.outcome, detail),
        None => format!("[#{}] {}", record.number, record.result.outcome),
    }
}

pub fn print_attempt(record: &AttemptRecord) {
    let line = attempt_line(record);
    match record.result.outcome {
        AttemptOutcome::Success => println!("{}", line.green()),
        AttemptOutcome::Failed => println!("{}", line.yellow()),
        AttemptOutcome::Fatal => println!("{}", line.red().bold()),
    }
}

pub fn print_loop_summary(report: &LoopReport) {
    let status = match &report.exit {
        LoopExit::Fatal(Some(detail)) => format!("stopped on fatal error: {}", detail),
        LoopExit::Fatal(None) => "stopped on fatal error".to_string(),
        LoopExit::Cancelled => "cancelled".to_string(),
    };
    println!("Auto-buy finished after {} attempt(s), {}", report.attempts, status);
}
