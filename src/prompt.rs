use inquire::{Confirm as ConfirmPrompt, InquireError};

/// Asks the user before destructive remote actions
pub trait Confirm {
    /// `true` if the user agreed; any prompt failure counts as a refusal
    fn confirm(&self, prompt: &str) -> bool;
}

/// Check if we're running in an interactive terminal
pub fn is_interactive() -> bool {
    atty::is(atty::Stream::Stdin) && atty::is(atty::Stream::Stdout)
}

/// Terminal yes/no prompt, defaulting to "no"
#[derive(Debug, Default, Clone, Copy)]
pub struct InquireConfirm;

impl Confirm for InquireConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        if !is_interactive() {
            log::warn!("Not running in a terminal, declining: {prompt} (pass --yes to skip prompts)");
            return false;
        }

        match ConfirmPrompt::new(prompt).with_default(false).prompt() {
            Ok(answer) => answer,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => false,
            Err(e) => {
                log::warn!("Confirmation prompt failed: {e}");
                false
            }
        }
    }
}

/// Agrees to everything, for `--yes` and scripted runs
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&self, prompt: &str) -> bool {
        log::debug!("Auto-confirmed: {prompt}");
        true
    }
}

/// Refuses everything
#[derive(Debug, Default, Clone, Copy)]
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&self, _prompt: &str) -> bool {
        false
    }
}
