//! Operator confirmations for destructive commands.

use crate::core::error::SipataniError;
use std::io::IsTerminal;

const NEEDS_TTY: &str = "confirmation needs an interactive terminal; pass --yes to skip it";

/// Ask a yes/no question, defaulting to "no".
///
/// `assume_yes` (the `--yes` flag) answers without prompting. Esc and Ctrl-C
/// count as "no". Without a terminal on stdin the question cannot be asked,
/// which is [`SipataniError::Cancelled`].
pub fn confirm(question: &str, assume_yes: bool) -> Result<bool, SipataniError> {
    if assume_yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(SipataniError::Cancelled(NEEDS_TTY.to_string()));
    }
    match inquire::Confirm::new(question).with_default(false).prompt() {
        Ok(answer) => Ok(answer),
        Err(inquire::InquireError::OperationCanceled)
        | Err(inquire::InquireError::OperationInterrupted) => Ok(false),
        Err(inquire::InquireError::NotTTY) => Err(SipataniError::Cancelled(NEEDS_TTY.to_string())),
        Err(e) => Err(SipataniError::IoError(std::io::Error::other(e.to_string()))),
    }
}
