// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Core - User interaction hooks
//
// The core never talks to a terminal or a window directly. Frontends hand it
// a Prompter for yes/no confirmations and status messages.

/// Synchronous dialog facility supplied by the frontend
pub trait Prompter {
    /// Ask a yes/no question
    fn confirm(&self, title: &str, message: &str) -> bool;

    /// Show an informational message
    fn inform(&self, title: &str, message: &str);

    /// Show an error message
    fn error(&self, title: &str, message: &str);
}

/// Prompter that answers every question the same way and drops messages
#[derive(Debug, Clone, Copy)]
pub struct AutoPrompter {
    pub answer: bool,
}

impl AutoPrompter {
    pub const YES: Self = Self { answer: true };
    pub const NO: Self = Self { answer: false };
}

impl Prompter for AutoPrompter {
    fn confirm(&self, title: &str, message: &str) -> bool {
        tracing::debug!("Auto-answering {:?} ({}): {}", title, message, self.answer);
        self.answer
    }

    fn inform(&self, title: &str, message: &str) {
        tracing::info!("{}: {}", title, message);
    }

    fn error(&self, title: &str, message: &str) {
        tracing::warn!("{}: {}", title, message);
    }
}
