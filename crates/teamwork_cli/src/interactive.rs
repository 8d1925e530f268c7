//! Terminal-backed selector and confirmation prompts.
//!
//! Prompts go to stderr so stdout stays clean for command output.
//! Without an interactive stdin nothing is selected and nothing is confirmed.

use std::io::{self, BufRead, IsTerminal, Write};
use teamwork_core::{Confirmation, Member, MemberSelector, Record};

/// Asks the user to pick a roster member by number or name.
pub struct StdinSelector;

impl MemberSelector for StdinSelector {
    fn select_member(&self, prompt: &str, roster: &[Record<Member>]) -> Option<String> {
        if !io::stdin().is_terminal() {
            return None;
        }

        eprintln!("{prompt}");
        for (index, member) in roster.iter().enumerate() {
            if member.role.is_empty() {
                eprintln!("  {}) {}", index + 1, member.name);
            } else {
                eprintln!("  {}) {} ({})", index + 1, member.name, member.role);
            }
        }
        eprint!("> ");
        let answer = read_answer()?;
        pick_member(&answer, roster)
    }
}

/// `[y/N]` prompt; anything but `y` or `yes` declines.
pub struct StdinConfirmation;

impl Confirmation for StdinConfirmation {
    fn confirm(&self, message: &str) -> bool {
        if !io::stdin().is_terminal() {
            eprintln!("{message} (pass --yes when not running interactively)");
            return false;
        }

        eprint!("{message} [y/N] ");
        read_answer().is_some_and(|answer| is_yes(&answer))
    }
}

fn read_answer() -> Option<String> {
    io::stderr().flush().ok()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    Some(line.trim().to_string())
}

fn is_yes(answer: &str) -> bool {
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Resolves a 1-based index or an exact name against the roster.
fn pick_member(answer: &str, roster: &[Record<Member>]) -> Option<String> {
    if answer.is_empty() {
        return None;
    }
    if let Ok(position) = answer.parse::<usize>() {
        return position
            .checked_sub(1)
            .and_then(|index| roster.get(index))
            .map(|member| member.name.clone());
    }
    roster
        .iter()
        .find(|member| member.name == answer)
        .map(|member| member.name.clone())
}
