//! Terminal rendering for routing results, status and analyses

use crossterm::style::{Color, Stylize};
use termimad::MadSkin;

use super::theme::Theme;
use crate::complexity::ComplexityAnalysis;
use crate::cost::CostEstimate;
use crate::providers::GenerationResult;
use crate::routing::{ProviderStatus, RouterStatus};

pub struct TerminalRenderer {
    theme: Theme,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new() -> Self {
        let theme = Theme::default();
        let skin = Self::build_skin(&theme);
        Self { theme, skin }
    }

    fn build_skin(theme: &Theme) -> MadSkin {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(to_termimad_color(theme.title));
        skin.bold.set_fg(to_termimad_color(Color::White));
        skin.inline_code.set_fg(to_termimad_color(Color::Green));
        skin.code_block.set_fg(to_termimad_color(Color::Green));
        skin
    }

    /// Render the welcome banner with provider status
    pub fn render_banner(&self, version: &str, status: &RouterStatus) {
        println!();
        println!("{}", "  HybridRouter Interactive Mode".with(self.theme.title));
        println!("  {} {}", "v".with(self.theme.dim), version.with(self.theme.dim));
        self.render_status(status);
        println!("  {}", "Type /help for commands, /quit to exit".with(self.theme.dim));
        println!();
    }

    pub fn render_status(&self, status: &RouterStatus) {
        self.render_provider_line("Local", &status.local);
        self.render_provider_line("Cloud", &status.cloud);
    }

    fn render_provider_line(&self, name: &str, status: &ProviderStatus) {
        let (mark, color) = match (status.enabled, status.available) {
            (_, true) => ("\u{2713}", self.theme.success),
            (true, false) => ("\u{2717}", self.theme.error),
            (false, false) => ("-", self.theme.dim),
        };
        let state = if !status.enabled {
            "disabled"
        } else if status.available {
            "available"
        } else {
            "unavailable"
        };
        println!(
            "  {} {:<6} {} {}",
            mark.with(color),
            name,
            status.model.as_str().with(self.theme.stats),
            format!("({})", state).with(self.theme.dim),
        );
    }

    /// Render a routed response with markdown formatting and a provenance line
    pub fn render_result(&self, result: &GenerationResult) {
        println!();
        if has_markdown_elements(&result.content) {
            self.skin.print_text(&result.content);
        } else {
            println!("{}", result.content.as_str().with(self.theme.response));
        }

        let fallback = if result.fallback { " (fallback)" } else { "" };
        println!(
            "\n  {} {}{} {} in + {} out, ${:.6} [{}]",
            "\u{2022}".with(self.theme.dim),
            result.provider.as_str().with(self.theme.provider(result.provider)),
            fallback.with(self.theme.system),
            format!("{}", result.usage.input_tokens).with(self.theme.stats),
            format!("{}", result.usage.output_tokens).with(self.theme.stats),
            result.cost,
            result.model.as_str().with(self.theme.dim),
        );
        println!();
    }

    pub fn render_analysis(&self, analysis: &ComplexityAnalysis) {
        println!(
            "  Complexity: {}  (complex indicators: {}, medium indicators: {})",
            analysis.complexity.to_string().with(self.theme.stats),
            analysis.complex_count,
            analysis.medium_count,
        );
        println!(
            "  Recommended: {} via {}",
            analysis.recommended_task_category.as_str().with(self.theme.command),
            analysis
                .recommended_provider
                .as_str()
                .with(self.theme.provider(analysis.recommended_provider)),
        );
    }

    pub fn render_estimate(&self, estimate: &CostEstimate, tokens: u64) {
        println!(
            "  {} tokens of {}: local ${:.6}, cloud ${:.6} (recommended: {})",
            tokens,
            estimate.task_category.as_str().with(self.theme.command),
            estimate.local_cost,
            estimate.cloud_cost,
            estimate
                .recommended_provider
                .as_str()
                .with(self.theme.provider(estimate.recommended_provider)),
        );
    }

    pub fn render_system(&self, msg: &str) {
        println!("  {} {}", "\u{25b6}".with(self.theme.system), msg.with(self.theme.system));
    }

    pub fn render_error(&self, msg: &str) {
        println!("  {} {}", "\u{2717}".with(self.theme.error), msg.with(self.theme.error));
    }

    pub fn render_success(&self, msg: &str) {
        println!("  {} {}", "\u{2713}".with(self.theme.success), msg.with(self.theme.success));
    }

    pub fn render_info(&self, msg: &str) {
        println!("  {}", msg.with(self.theme.dim));
    }

    pub fn prompt_color(&self) -> Color {
        self.theme.prompt
    }

    pub fn command_color(&self) -> Color {
        self.theme.command
    }

    pub fn dim_color(&self) -> Color {
        self.theme.dim
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if content has markdown elements worth rendering through termimad
fn has_markdown_elements(content: &str) -> bool {
    content.contains("```")
        || content.contains("# ")
        || content.contains("**")
        || content.contains("| ")
}

/// Convert crossterm Color to termimad color
fn to_termimad_color(color: Color) -> termimad::crossterm::style::Color {
    use termimad::crossterm::style::Color as T;
    match color {
        Color::Black => T::Black,
        Color::DarkGrey => T::DarkGrey,
        Color::Red => T::Red,
        Color::Green => T::Green,
        Color::Yellow => T::Yellow,
        Color::DarkYellow => T::DarkYellow,
        Color::Blue => T::Blue,
        Color::Magenta => T::Magenta,
        Color::Cyan => T::Cyan,
        Color::White => T::White,
        Color::Grey => T::Grey,
        _ => T::Reset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_detection() {
        assert!(has_markdown_elements("```sql\nSELECT 1;\n```"));
        assert!(has_markdown_elements("| region | revenue |"));
        assert!(!has_markdown_elements("SELECT 1;"));
    }
}
