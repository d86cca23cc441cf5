//! Interactive terminal shell over the router
//!
//! Each line of plain input is routed as a prompt; slash commands inspect or
//! change how subsequent prompts are routed. Session statistics are kept here,
//! not in the router.

pub mod commands;
pub mod prompt;
pub mod renderer;
pub mod spinner;
pub mod theme;

use crate::config::Config;
use crate::metrics::MetricsTracker;
use crate::providers::ProviderKind;
use crate::routing::{RouteRequest, Router, TaskCategory};

use commands::{parse_command, render_help, SlashCommand};
use prompt::PromptHandler;
use renderer::TerminalRenderer;
use spinner::RoutingSpinner;

use anyhow::Result;
use std::sync::Arc;

enum CommandResult {
    Continue,
    Quit,
}

pub struct InteractiveShell {
    router: Arc<Router>,
    config: Config,
    renderer: TerminalRenderer,
    prompt_handler: PromptHandler,
    metrics: MetricsTracker,
    task: TaskCategory,
    forced: Option<ProviderKind>,
    /// Take the task category from the complexity analyzer
    auto_task: bool,
    system_prompt: Option<String>,
}

impl InteractiveShell {
    pub fn new(router: Arc<Router>, config: Config) -> Self {
        Self {
            router,
            task: config.routing.default_task,
            config,
            renderer: TerminalRenderer::new(),
            prompt_handler: PromptHandler::new(),
            metrics: MetricsTracker::new(),
            forced: None,
            auto_task: false,
            system_prompt: None,
        }
    }

    fn mode_label(&self) -> String {
        let task = if self.auto_task {
            "auto".to_string()
        } else {
            self.task.to_string()
        };
        match self.forced {
            Some(kind) => format!("{} @ {}", task, kind),
            None => task,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let status = self.router.status().await;
        self.renderer.render_banner(env!("CARGO_PKG_VERSION"), &status);

        loop {
            let label = self.mode_label();
            let Some(input) = self
                .prompt_handler
                .read_line(&label, self.renderer.prompt_color())
            else {
                break;
            };

            if input.is_empty() {
                continue;
            }

            if input.starts_with('/') {
                match parse_command(&input) {
                    Some(cmd) => {
                        if let CommandResult::Quit = self.handle_command(cmd).await {
                            break;
                        }
                    }
                    None => self
                        .renderer
                        .render_error("Unknown command. Type /help for commands."),
                }
            } else {
                self.process_prompt(&input).await;
            }
        }

        self.render_session_summary();
        Ok(())
    }

    async fn handle_command(&mut self, cmd: SlashCommand) -> CommandResult {
        match cmd {
            SlashCommand::Help => render_help(&self.renderer),
            SlashCommand::Quit => return CommandResult::Quit,
            SlashCommand::Status => {
                let status = self.router.status().await;
                self.renderer.render_status(&status);
            }
            SlashCommand::Stats => println!("{}", self.metrics.summary()),
            SlashCommand::Task(None) => {
                self.renderer.render_info(&format!("Current task: {}", self.task));
                let all: Vec<&str> = TaskCategory::ALL.iter().map(|c| c.as_str()).collect();
                self.renderer.render_info(&format!("Available: {}", all.join(", ")));
            }
            SlashCommand::Task(Some(name)) => match name.parse::<TaskCategory>() {
                Ok(task) => {
                    self.task = task;
                    self.auto_task = false;
                    self.renderer.render_success(&format!("Task set to: {}", task));
                }
                Err(e) => self.renderer.render_error(&e.to_string()),
            },
            SlashCommand::Provider(None) => match self.forced {
                Some(kind) => self.renderer.render_info(&format!("Forced provider: {}", kind)),
                None => self.renderer.render_info("Provider: policy routing"),
            },
            SlashCommand::Provider(Some(name)) if name.eq_ignore_ascii_case("auto") => {
                self.forced = None;
                self.renderer.render_success("Restored policy routing");
            }
            SlashCommand::Provider(Some(name)) => match name.parse::<ProviderKind>() {
                Ok(kind) => {
                    self.forced = Some(kind);
                    self.renderer
                        .render_success(&format!("Forcing {} provider (no fallback)", kind));
                }
                Err(e) => self.renderer.render_error(&e.to_string()),
            },
            SlashCommand::Auto(arg) => {
                self.auto_task = match arg.as_deref() {
                    Some("off") => false,
                    Some("on") => true,
                    _ => !self.auto_task,
                };
                let state = if self.auto_task { "on" } else { "off" };
                self.renderer.render_success(&format!("Automatic task selection {}", state));
            }
            SlashCommand::System(None) => match &self.system_prompt {
                Some(system) => self.renderer.render_info(&format!("System prompt: {}", system)),
                None => self.renderer.render_info("No system prompt set"),
            },
            SlashCommand::System(Some(text)) if text == "clear" => {
                self.system_prompt = None;
                self.renderer.render_success("System prompt cleared");
            }
            SlashCommand::System(Some(text)) => {
                self.system_prompt = Some(text);
                self.renderer.render_success("System prompt set");
            }
            SlashCommand::Analyze(query) => {
                let analysis = self.router.analyze_query_complexity(&query);
                self.renderer.render_analysis(&analysis);
            }
            SlashCommand::Estimate(tokens) => {
                let tokens = match tokens.map(|t| t.parse::<u64>()) {
                    None => u64::from(self.config.routing.max_tokens),
                    Some(Ok(tokens)) => tokens,
                    Some(Err(_)) => {
                        self.renderer.render_error("Token count must be a whole number");
                        return CommandResult::Continue;
                    }
                };
                let estimate = self.router.estimate_cost(self.task, tokens);
                self.renderer.render_estimate(&estimate, tokens);
            }
        }
        CommandResult::Continue
    }

    async fn process_prompt(&mut self, input: &str) {
        let task = if self.auto_task {
            let analysis = self.router.analyze_query_complexity(input);
            self.renderer.render_info(&format!(
                "{} complexity -> {}",
                analysis.complexity, analysis.recommended_task_category
            ));
            analysis.recommended_task_category
        } else {
            self.task
        };

        let mut request = RouteRequest::new(input, task)
            .with_max_tokens(self.config.routing.max_tokens)
            .with_temperature(self.config.routing.temperature);
        if let Some(system) = &self.system_prompt {
            request = request.with_system(system.clone());
        }
        if let Some(kind) = self.forced {
            request = request.force_provider(kind.as_str());
        }

        let spinner = RoutingSpinner::start(format!("Routing {}...", task));
        let outcome = self.router.route(request).await;
        spinner.stop();

        match outcome {
            Ok(result) => {
                self.metrics.record_result(&result);
                self.renderer.render_result(&result);
            }
            Err(e) => {
                self.metrics.record_failure();
                self.renderer.render_error(&format!("Request failed: {}", e));
                if let Some(source) = std::error::Error::source(&e) {
                    self.renderer.render_info(&format!("Caused by: {}", source));
                }
            }
        }
    }

    fn render_session_summary(&self) {
        let summary = self.metrics.summary();
        println!();
        self.renderer.render_system(&format!(
            "Session: {} prompts, {} routed ({} local, {} cloud), ${:.4} spent",
            self.prompt_handler.lines_read(),
            summary.request_count,
            summary.local_requests,
            summary.cloud_requests,
            summary.total_cost,
        ));
    }
}
