//! Slash command parsing and help

use crossterm::style::Stylize;

#[derive(Debug, PartialEq)]
pub enum SlashCommand {
    Help,
    Quit,
    Status,
    Stats,
    /// Show or set the task category for subsequent prompts
    Task(Option<String>),
    /// Show or set the forced provider (`auto` clears it)
    Provider(Option<String>),
    /// Toggle taking the task category from the complexity analyzer
    Auto(Option<String>),
    /// Set or clear the system prompt
    System(Option<String>),
    Analyze(String),
    Estimate(Option<String>),
}

/// Parse a slash command from user input.
/// Returns None if the input is not a known slash command.
pub fn parse_command(input: &str) -> Option<SlashCommand> {
    let input = input.trim();
    if !input.starts_with('/') {
        return None;
    }

    let (cmd, rest) = match input.split_once(' ') {
        Some((cmd, rest)) => (cmd, Some(rest.trim().to_string()).filter(|r| !r.is_empty())),
        None => (input, None),
    };

    match cmd.to_lowercase().as_str() {
        "/help" | "/h" | "/?" => Some(SlashCommand::Help),
        "/quit" | "/q" | "/exit" => Some(SlashCommand::Quit),
        "/status" => Some(SlashCommand::Status),
        "/stats" => Some(SlashCommand::Stats),
        "/task" | "/t" => Some(SlashCommand::Task(rest)),
        "/provider" | "/p" => Some(SlashCommand::Provider(rest)),
        "/auto" => Some(SlashCommand::Auto(rest)),
        "/system" | "/sys" => Some(SlashCommand::System(rest)),
        "/analyze" | "/a" => rest.map(SlashCommand::Analyze),
        "/estimate" | "/cost" => Some(SlashCommand::Estimate(rest)),
        _ => None,
    }
}

/// Render help text for all slash commands
pub fn render_help(renderer: &super::renderer::TerminalRenderer) {
    let cmd_color = renderer.command_color();
    let dim_color = renderer.dim_color();

    println!();
    renderer.render_system("Available commands:");
    println!();

    let commands = [
        ("/help", "Show this help message"),
        ("/quit", "Exit interactive mode"),
        ("/status", "Show provider availability"),
        ("/stats", "Show routing statistics for this session"),
        ("/task [category]", "Show or set the task category"),
        ("/provider [local|cloud|auto]", "Force a provider, or restore policy routing"),
        ("/auto [on|off]", "Pick the task category from query complexity"),
        ("/system [text|clear]", "Set or clear the system prompt"),
        ("/analyze <query>", "Show complexity analysis for a query"),
        ("/estimate [tokens]", "Estimate cost for the current task category"),
    ];

    for (cmd, desc) in &commands {
        println!("  {:<30} {}", cmd.with(cmd_color), desc.with(dim_color));
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_not_a_command() {
        assert_eq!(parse_command("total revenue by region"), None);
    }

    #[test]
    fn test_commands_with_arguments() {
        assert_eq!(
            parse_command("/task  complex-query "),
            Some(SlashCommand::Task(Some("complex-query".to_string())))
        );
        assert_eq!(parse_command("/provider"), Some(SlashCommand::Provider(None)));
        assert_eq!(
            parse_command("/analyze join orders and customers"),
            Some(SlashCommand::Analyze("join orders and customers".to_string()))
        );
        assert_eq!(parse_command("/Q"), Some(SlashCommand::Quit));
    }

    #[test]
    fn test_analyze_requires_query() {
        assert_eq!(parse_command("/analyze"), None);
        assert_eq!(parse_command("/unknown"), None);
    }
}
