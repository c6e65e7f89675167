//! Terminal rendering and interaction seams.

use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm as ConfirmPrompt;
use lifedesk_core::model::expense::Expense;
use lifedesk_core::model::group::GroupDetails;
use lifedesk_core::model::notes::{Notebook, Page, Section};
use lifedesk_core::model::problem::{Problem, Tag};
use lifedesk_core::model::todo::Todo;
use lifedesk_core::model::user::{UserProfile, UserSummary};
use lifedesk_core::{Confirm, Notification, NotificationLevel, Notifier};

/// Prints notifications: successes to stdout, errors to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                println!("{}: {}", notification.title, notification.message)
            }
            NotificationLevel::Error => {
                eprintln!("{}: {}", notification.title, notification.message)
            }
        }
    }
}

/// Asks on the terminal unless `--yes` was given.
pub struct TerminalConfirm {
    pub assume_yes: bool,
}

impl Confirm for TerminalConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ConfirmPrompt::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or(false)
    }
}

pub fn profile(user: &UserProfile) {
    println!("#{} {}", user.id, user.username);
    if let Some(email) = &user.email {
        println!("  email:   {email}");
    }
    if let Some(country) = &user.country {
        println!("  country: {country}");
    }
}

pub fn expenses(rows: &[Expense]) {
    if rows.is_empty() {
        println!("No expenses for this period.");
        return;
    }
    let total: f64 = rows.iter().map(|row| row.amount).sum();
    for row in rows {
        println!(
            "{:>6}  {:>10.2}  {:<12}  {}",
            row.id,
            row.amount,
            row.group_label(),
            row.description
        );
    }
    println!("Total: {total:.2}");
}

pub fn group_details(details: &GroupDetails, rows: &[Expense]) {
    println!("#{} {}", details.group.id, details.group.name);
    println!("Members:");
    users(&details.members);
    println!("Expenses:");
    expenses(rows);
}

pub fn users(rows: &[UserSummary]) {
    for user in rows {
        match &user.email {
            Some(email) => println!("{:>6}  {} <{email}>", user.id, user.username),
            None => println!("{:>6}  {}", user.id, user.username),
        }
    }
}

pub fn todos(rows: &[Todo]) {
    if rows.is_empty() {
        println!("Nothing to do.");
        return;
    }
    for todo in rows {
        let stamp = match (todo.completed_date(), todo.created_date()) {
            (Some(done), _) => format!("  completed {done}"),
            (None, Some(created)) => format!("  created {created}"),
            (None, None) => String::new(),
        };
        println!(
            "{:>6}  [{}]  {}{}{}",
            todo.id,
            todo.status.as_str(),
            todo.title,
            todo.due_date
                .as_deref()
                .map(|due| format!(" (due {due})"))
                .unwrap_or_default(),
            stamp
        );
        if let Some(description) = todo.description.as_deref().filter(|text| !text.is_empty()) {
            println!("        {description}");
        }
    }
}

pub fn titled<'a>(rows: impl IntoIterator<Item = (i64, &'a str)>) {
    for (id, title) in rows {
        println!("{id:>6}  {title}");
    }
}

pub fn notebooks(rows: &[Notebook]) {
    titled(rows.iter().map(|row| (row.id, row.title.as_str())));
}

pub fn sections(rows: &[Section]) {
    titled(rows.iter().map(|row| (row.id, row.title.as_str())));
}

pub fn pages(rows: &[Page]) {
    titled(rows.iter().map(|row| (row.id, row.title.as_str())));
}

pub fn page(page: &Page) {
    println!("# {}", page.title);
    println!();
    println!("{}", page.content.as_deref().unwrap_or_default());
}

pub fn problems(rows: &[Problem]) {
    for problem in rows {
        let tags = problem
            .tags
            .iter()
            .map(|tag| tag.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{:>6}  {:<6}  {:<11}  {}  [{}]",
            problem.id,
            problem.difficulty.as_str(),
            problem.status.as_str(),
            problem.title,
            tags
        );
    }
}

pub fn tags(rows: &[Tag]) {
    titled(rows.iter().map(|row| (row.id, row.name.as_str())));
}
