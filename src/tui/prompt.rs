//! Line input for the interactive shell

use crossterm::style::{Color, Stylize};
use std::io::{self, BufRead, Write};

/// Reads one line per turn, prefixed with the current routing mode
#[derive(Default)]
pub struct PromptHandler {
    lines_read: usize,
}

impl PromptHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Show `[label] >` and read a trimmed line. Returns None on EOF (Ctrl+D).
    pub fn read_line(&mut self, label: &str, color: Color) -> Option<String> {
        print!("{} {} ", format!("[{}]", label).with(Color::DarkGrey), ">".with(color));
        io::stdout().flush().ok()?;

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                self.lines_read += 1;
                Some(line.trim().to_string())
            }
        }
    }

    pub fn lines_read(&self) -> usize {
        self.lines_read
    }
}
