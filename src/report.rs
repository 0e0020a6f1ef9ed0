//! Terminal report: user tables and the end-of-run summary.

use chrono::NaiveDateTime;
use colored::{Color, Colorize};
use is_terminal::IsTerminal;

use crate::audit::{ActivityState, ClassifiedUser, DisableOutcome, DisableStatus, Summary};

/// Width of the name and identifier columns.
const COLUMN_WIDTH: usize = 40;

/// Width of the banner rule.
const BANNER_WIDTH: usize = 94;

/// Disable colour output when stdout is not a terminal.
pub fn init_colors() {
    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }
}

/// Which table a row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Table {
    Users,
    Disabled,
}

fn header(table: Table) -> String {
    let (user, when) = match table {
        Table::Users => ("user", "last connection"),
        Table::Disabled => ("user disabled", "updated_on"),
    };
    format!(
        "{:<5} {:<40} {:<30} {:<10} {:<10} {:<13} {:<40}",
        "#", user, when, "active", "state", "hist/days", "id"
    )
}

/// Clip to `width` characters.
fn clip(value: &str, width: usize) -> String {
    value.chars().take(width).collect()
}

/// Shorten an identifier to the column width, keeping its distinctive tail.
pub fn display_id(id: &str, verbose: bool) -> String {
    let len = id.chars().count();
    if verbose || len <= COLUMN_WIDTH {
        return id.to_string();
    }
    let tail: String = id.chars().skip(len - (COLUMN_WIDTH - 3)).collect();
    format!("...{}", tail)
}

fn active_label(active: bool) -> &'static str {
    if active {
        "True"
    } else {
        "False"
    }
}

fn days_label(user: &ClassifiedUser) -> String {
    user.classification
        .days_since_login
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn format_row(
    user: &ClassifiedUser,
    when: &str,
    active: bool,
    verbose: bool,
) -> String {
    format!(
        "{:<5} {:<40} {:<30} {:<10} {:<10} {:<13} {:<40}",
        user.rank,
        clip(&user.record.name, COLUMN_WIDTH),
        when,
        active_label(active),
        user.classification.state.as_str(),
        days_label(user),
        display_id(&user.record.id, verbose)
    )
}

/// Plain-text row of the users table.
pub fn format_user_row(user: &ClassifiedUser, verbose: bool) -> String {
    let last_login = user
        .record
        .last_successful_login
        .as_deref()
        .filter(|_| user.classification.state != ActivityState::Inactive)
        .unwrap_or("None");
    format_row(user, last_login, user.record.is_active, verbose)
}

/// Plain-text row of the disabled-users table.
pub fn format_outcome_row(outcome: &DisableOutcome, verbose: bool) -> String {
    let user = &outcome.candidate.user;
    match &outcome.status {
        DisableStatus::Proposed => format_user_row(user, verbose),
        DisableStatus::Disabled {
            active,
            last_modified,
        } => format_row(
            user,
            last_modified.as_deref().unwrap_or("-"),
            *active,
            verbose,
        ),
        DisableStatus::Failed(_) => format_row(user, "FAILED", user.record.is_active, verbose),
    }
}

/// One line per failed disable, with the identifier and the underlying error.
pub fn failure_lines(outcomes: &[DisableOutcome], verbose: bool) -> Vec<String> {
    outcomes
        .iter()
        .filter_map(|outcome| match &outcome.status {
            DisableStatus::Failed(e) => {
                let record = &outcome.candidate.user.record;
                Some(format!(
                    "{} ({}) : {}",
                    record.name,
                    display_id(&record.id, verbose),
                    e
                ))
            }
            _ => None,
        })
        .collect()
}

fn user_color(user: &ClassifiedUser) -> Color {
    if !user.record.is_active {
        Color::Red
    } else if user.classification.state != ActivityState::Active {
        Color::Yellow
    } else {
        Color::Green
    }
}

fn info_line(label: &str, value: &str, detail: &str) -> String {
    format!(
        "{:10} {:20} {:20} {:35} {:5}",
        "*****", label, value, detail, "*****"
    )
}

/// Banner printed before the users are fetched.
pub fn print_banner(app_name: &str, now: NaiveDateTime, threshold_days: u32, dry_run: bool) {
    println!("{}", format!("\n{}", "*".repeat(BANNER_WIDTH)).green());
    println!(
        "{}",
        info_line("Analysis", "started", &now.format("%Y-%m-%d %H:%M:%S UTC").to_string()).green()
    );
    println!(
        "{}",
        info_line(app_name, "threshold", &format!("{} days", threshold_days)).green()
    );
    if dry_run {
        println!(
            "{}",
            info_line("Dry Run", "session", "no change applied").yellow()
        );
    }
    println!("{}", format!("{}\n", "*".repeat(BANNER_WIDTH)).green());
}

/// Table of every fetched user.
pub fn print_users(users: &[ClassifiedUser], verbose: bool) {
    println!("{}", header(Table::Users));
    for user in users {
        println!("{}", format_user_row(user, verbose).color(user_color(user)));
    }
}

/// Table of disabled (or, in a dry run, proposed) users.
pub fn print_outcomes(outcomes: &[DisableOutcome], dry_run: bool, verbose: bool) {
    if outcomes.is_empty() {
        println!();
        return;
    }

    println!("\n\n{}", header(Table::Disabled));
    for outcome in outcomes {
        let row = format_outcome_row(outcome, verbose);
        if outcome.is_failure() {
            println!("{}", row.yellow().bold());
        } else {
            println!("{}", row.red());
        }
    }
    println!();

    let failures = failure_lines(outcomes, verbose);
    if !failures.is_empty() {
        println!("{}", "Failed to disable:".yellow().bold());
        for line in &failures {
            println!("  {}", line.yellow());
        }
        println!();
    }

    if dry_run {
        println!(
            "{}",
            info_line("DRY RUN", "SESSION", "NO CHANGE APPLIED").yellow()
        );
        println!();
    }
}

/// Lines of the bucket summary, without colour.
pub fn summary_lines(summary: &Summary) -> Vec<String> {
    let mut lines = vec![
        format!("Active:   {}", summary.active),
        format!("Disabled: {}", summary.disabled),
        format!("Inactive: {}", summary.inactive),
        format!("Dormant:  {}", summary.dormant),
    ];
    if summary.failed > 0 {
        lines.push(format!("Failed disable attempts: {}", summary.failed));
    }
    lines
}

/// Four-line bucket summary.
pub fn print_summary(summary: &Summary) {
    let lines = summary_lines(summary);
    let markers = ["●".green(), "●".red(), "●".yellow(), "●".yellow(), "✗".red()];
    for (marker, line) in markers.iter().zip(&lines) {
        println!("  {} {}", marker, line);
    }
    println!();
}
