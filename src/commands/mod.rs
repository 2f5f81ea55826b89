//! Command registry for REPL commands
//!
//! Anything that is not a registered command is treated as pattern text.

pub mod audio;
pub mod general;

use crate::session::{Session, Submission};
use std::sync::Arc;

/// Result of executing a command
#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Command executed successfully, continue REPL
    Success,
    /// Command executed, show this message
    Message(String),
    /// Exit the REPL
    Exit,
    /// Not a command, evaluate as a pattern
    NotACommand,
    /// Error occurred
    Error(String),
    /// Watch a file for changes
    Watch(String),
    /// Stop watching a file
    Unwatch(String),
}

/// Context passed to command handlers
pub struct CommandContext {
    pub session: Arc<Session>,
    /// Print full JSON results instead of a one-line summary
    pub json_output: bool,
}

impl CommandContext {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            json_output: false,
        }
    }

    /// Evaluate and schedule a pattern
    pub fn submit(&self, input: &str) -> Submission {
        self.session.submit(input)
    }
}

/// A command handler function
pub type CommandHandler = fn(&str, &mut CommandContext) -> CommandResult;

/// Registry of available commands
pub struct CommandRegistry {
    /// Sorted by prefix length descending for longest-match-first lookup
    commands: Vec<(String, CommandHandler)>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
        }
    }

    /// Register a command with its prefix
    pub fn register(&mut self, prefix: &str, handler: CommandHandler) {
        self.commands.push((prefix.to_string(), handler));
        self.commands.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Execute a command, returning NotACommand if no match found
    pub fn execute(&self, input: &str, ctx: &mut CommandContext) -> CommandResult {
        for (prefix, handler) in &self.commands {
            if let Some(rest) = input.strip_prefix(prefix.as_str()) {
                if rest.is_empty() || rest.starts_with(' ') {
                    return handler(rest.trim(), ctx);
                }
            }
        }
        CommandResult::NotACommand
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a fully populated command registry with all built-in commands
pub fn create_registry() -> CommandRegistry {
    let mut registry = CommandRegistry::new();

    // Audio commands
    registry.register("play", audio::cmd_play);
    registry.register("stop", audio::cmd_stop);
    registry.register("cancel", audio::cmd_cancel);
    registry.register("status", audio::cmd_status);

    // General commands
    registry.register("help", general::cmd_help);
    registry.register("quit", general::cmd_quit);
    registry.register("exit", general::cmd_quit);
    registry.register("watch", general::cmd_watch);
    registry.register("unwatch", general::cmd_unwatch);
    registry.register("json", general::cmd_json);

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullOutput, PlaybackEngine};
    use crate::config::EngineConfig;

    pub(crate) fn context() -> CommandContext {
        let engine =
            PlaybackEngine::new(Arc::new(NullOutput::new()), EngineConfig::default()).unwrap();
        CommandContext::new(Arc::new(Session::new(engine)))
    }

    #[test]
    fn test_prefix_matching() {
        let registry = create_registry();
        let mut ctx = context();

        assert_eq!(registry.execute("quit", &mut ctx), CommandResult::Exit);
        assert_eq!(registry.execute("exit", &mut ctx), CommandResult::Exit);
        assert_eq!(
            registry.execute("watch beat.strand", &mut ctx),
            CommandResult::Watch("beat.strand".to_string())
        );
        // A pattern that happens to start with a command word
        assert_eq!(
            registry.execute("stopwatch", &mut ctx),
            CommandResult::NotACommand
        );
        assert_eq!(
            registry.execute("bd sn hh", &mut ctx),
            CommandResult::NotACommand
        );
    }

    #[test]
    fn test_watch_and_unwatch_are_distinct() {
        let registry = create_registry();
        let mut ctx = context();

        assert_eq!(
            registry.execute("unwatch beat.strand", &mut ctx),
            CommandResult::Unwatch("beat.strand".to_string())
        );
        assert_eq!(
            registry.execute("watch ./beat.strand", &mut ctx),
            CommandResult::Watch("./beat.strand".to_string())
        );
        assert!(matches!(
            registry.execute("unwatch", &mut ctx),
            CommandResult::Error(_)
        ));
        assert_eq!(
            registry.execute("unwatched", &mut ctx),
            CommandResult::NotACommand
        );
    }
}
