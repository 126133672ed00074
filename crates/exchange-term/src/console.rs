// SPDX-License-Identifier: AGPL-3.0
// Campus Exchange Terminal - Console input and dialogs

use exchange_core::Prompter;
use std::io::{self, BufRead, Write};

/// Reads answers from stdin and prints dialogs to stdout
pub struct Console;

impl Console {
    /// Prompt for one line. `None` means stdin is closed.
    pub fn ask(&self, label: &str) -> Option<String> {
        print!("{}: ", label);
        let _ = io::stdout().flush();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                tracing::error!("Failed to read input: {}", e);
                None
            }
        }
    }

    /// Show a numbered list and return the picked position.
    /// `Some(None)` means the answer was not a valid choice.
    pub fn choose(&self, label: &str, options: &[String]) -> Option<Option<usize>> {
        if options.is_empty() {
            println!("(nothing to choose from)");
            return Some(None);
        }
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, option);
        }

        let answer = self.ask(label)?;
        Some(
            answer
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| (1..=options.len()).contains(n))
                .map(|n| n - 1),
        )
    }
}

impl Prompter for Console {
    fn confirm(&self, title: &str, message: &str) -> bool {
        println!("[{}] {}", title, message);
        self.ask("y/N")
            .map(|answer| matches!(answer.trim(), "y" | "Y" | "yes"))
            .unwrap_or(false)
    }

    fn inform(&self, title: &str, message: &str) {
        println!("[{}]\n{}", title, message);
    }

    fn error(&self, title: &str, message: &str) {
        eprintln!("[{}] {}", title, message);
    }
}
