//! Terminal colors for the interactive shell

use crate::providers::ProviderKind;
use crossterm::style::Color;

pub struct Theme {
    /// Prompt symbol
    pub prompt: Color,
    /// Response text
    pub response: Color,
    /// System messages
    pub system: Color,
    pub error: Color,
    /// Secondary info
    pub dim: Color,
    pub success: Color,
    /// Banner
    pub title: Color,
    /// Numbers in usage lines and tables
    pub stats: Color,
    /// Slash command names
    pub command: Color,
    /// Provider badges
    pub local: Color,
    pub cloud: Color,
}

impl Theme {
    pub fn provider(&self, kind: ProviderKind) -> Color {
        match kind {
            ProviderKind::Local => self.local,
            ProviderKind::Cloud => self.cloud,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            prompt: Color::Cyan,
            response: Color::White,
            system: Color::DarkYellow,
            error: Color::Red,
            dim: Color::DarkGrey,
            success: Color::Green,
            title: Color::Magenta,
            stats: Color::Blue,
            command: Color::Yellow,
            local: Color::Green,
            cloud: Color::Blue,
        }
    }
}
