//! Confirmation prompts for destructive actions

use std::io::{self, BufRead, Write};

/// Asks the admin to confirm a destructive action
///
/// A `false` answer means the action is dropped without any network call.
pub trait Confirm: Send + Sync {
    /// Show `prompt` and return whether the admin agreed
    fn confirm(&self, prompt: &str) -> bool;
}

/// Always gives the same answer; backs `--yes` and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoConfirm(pub bool);

impl Confirm for AutoConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, answer = self.0, "auto-confirmed");
        self.0
    }
}

/// Prompts on the terminal and reads a y/N answer from stdin
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stdout = io::stdout().lock();
        if write!(stdout, "{prompt} [y/N] ").and_then(|()| stdout.flush()).is_err() {
            return false;
        }

        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => is_yes(&answer),
            Err(e) => {
                tracing::warn!(error = %e, "could not read confirmation");
                false
            }
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("y\n", true)]
    #[case(" YES ", true)]
    #[case("n", false)]
    #[case("", false)]
    #[case("sure", false)]
    fn test_is_yes(#[case] answer: &str, #[case] expected: bool) {
        assert_eq!(is_yes(answer), expected);
    }

    #[test]
    fn test_auto_confirm() {
        assert!(AutoConfirm(true).confirm("Delete?"));
        assert!(!AutoConfirm(false).confirm("Delete?"));
    }
}
