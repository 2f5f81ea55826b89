//! REPL (Read-Eval-Print Loop) for Strand patterns
//!
//! Each input line is either a command or one pattern. Watched files are
//! re-evaluated whenever they are saved; a new revision cancels whatever
//! the previous revision still had pending.

use crate::audio::RequestId;
use crate::commands::{create_registry, CommandContext, CommandRegistry, CommandResult};
use crate::repl::watcher::FileWatcher;
use crate::session::{Session, Submission};
use anyhow::Result;
use colored::*;
use crossbeam_channel::{unbounded, Receiver, Sender};
use notify::{Event, EventKind};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use tracing::debug;

pub mod watcher;

/// Types of events the REPL loop handles
enum ReplEvent {
    Input(Result<String, ReadlineError>),
}

/// Interactive REPL over one session
pub struct Repl {
    registry: CommandRegistry,
    ctx: CommandContext,
    /// Last request started by each watched file, keyed by canonical path
    file_requests: HashMap<PathBuf, RequestId>,

    // Event channels
    tx_input: Sender<ReplEvent>,
    rx_input: Receiver<ReplEvent>,
    tx_watcher: Sender<notify::Result<Event>>,
    rx_watcher: Receiver<notify::Result<Event>>,

    // File watcher
    watcher: Option<FileWatcher>,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(session: Arc<Session>) -> Result<Self> {
        let (tx_input, rx_input) = unbounded();
        let (tx_watcher, rx_watcher) = unbounded();

        Ok(Repl {
            registry: create_registry(),
            ctx: CommandContext::new(session),
            file_requests: HashMap::new(),
            tx_input,
            rx_input,
            tx_watcher,
            rx_watcher,
            watcher: None,
        })
    }

    /// Start watching `path`, evaluating its current contents first
    pub fn watch(&mut self, path: &Path) -> Result<()> {
        if self.watcher.is_none() {
            self.watcher = Some(FileWatcher::new(self.tx_watcher.clone())?);
        }
        let Some(w) = &mut self.watcher else {
            return Ok(());
        };
        let path = w.watch(path)?;
        println!(
            "{} Watching {} for changes...",
            "👀".bright_cyan(),
            path.display().to_string().bright_green()
        );
        self.reload(&path);
        Ok(())
    }

    /// Stop watching `path` and cancel whatever it still has pending
    pub fn unwatch(&mut self, path: &Path) -> Result<()> {
        let path = match &mut self.watcher {
            Some(w) => w.unwatch(path)?,
            None => watcher::canonical(path)?,
        };
        if let Some(request) = self.file_requests.remove(&path) {
            self.ctx.session.engine().cancel(request);
        }
        println!(
            "{} Stopped watching {}",
            "👋".bright_cyan(),
            path.display().to_string().bright_green()
        );
        Ok(())
    }

    /// Start the REPL loop
    pub fn run(&mut self) -> Result<()> {
        println!(
            "{} {}",
            "🎵".bright_yellow(),
            "Strand live-coding patterns".bright_cyan().bold()
        );
        println!(
            "Type patterns like: {}, {}, {}",
            "bd sn hh".cyan(),
            "bd ~ sn ~".cyan(),
            "d1 $ sound \"bd sn\" bpm 90".cyan()
        );
        println!(
            "Type '{}' for more information, '{}' or {} to exit.\n",
            "help".bright_green(),
            "quit".bright_red(),
            "Ctrl+C".bright_red()
        );

        let mut editor = DefaultEditor::new()
            .map_err(|e| anyhow::anyhow!("Failed to initialize line editor: {}", e))?;
        let tx_input = self.tx_input.clone();

        thread::spawn(move || loop {
            let prompt = format!("{} ", "strand>".bright_magenta().bold());
            match editor.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim().to_string();
                    if !line.is_empty() {
                        let _ = editor.add_history_entry(&line);
                    }
                    if tx_input.send(ReplEvent::Input(Ok(line))).is_err() {
                        break;
                    }
                }
                Err(err) => {
                    let _ = tx_input.send(ReplEvent::Input(Err(err)));
                    break;
                }
            }
        });

        loop {
            crossbeam_channel::select! {
                recv(self.rx_input) -> msg => match msg {
                    Ok(ReplEvent::Input(Ok(line))) => {
                        if !self.handle_line(&line) {
                            break;
                        }
                    }
                    Ok(ReplEvent::Input(Err(ReadlineError::Interrupted)))
                    | Ok(ReplEvent::Input(Err(ReadlineError::Eof))) => {
                        println!("{} 🎵", "Goodbye!".bright_cyan());
                        break;
                    }
                    Ok(ReplEvent::Input(Err(err))) => {
                        println!(
                            "{} {}",
                            "Error reading input:".bright_red().bold(),
                            err.to_string().red()
                        );
                        break;
                    }
                    Err(_) => break, // Channel closed
                },

                recv(self.rx_watcher) -> msg => match msg {
                    Ok(Ok(event)) => {
                        if matches!(event.kind, EventKind::Modify(_) | EventKind::Create(_)) {
                            for path in event.paths {
                                self.reload(&path);
                            }
                        }
                    }
                    Ok(Err(e)) => println!("{} Watch error: {}", "Error:".red(), e),
                    Err(_) => break, // Channel closed
                }
            }
        }

        self.ctx.session.engine().stop_all();
        Ok(())
    }

    /// Handle one input line; returns false when the REPL should exit
    fn handle_line(&mut self, line: &str) -> bool {
        if line.is_empty() {
            return true;
        }

        match self.registry.execute(line, &mut self.ctx) {
            CommandResult::Success => {}
            CommandResult::Message(msg) => println!("{}", msg),
            CommandResult::Exit => {
                println!("{} 🎵", "Goodbye!".bright_cyan());
                return false;
            }
            CommandResult::Error(e) => {
                println!("{} {}", "Error:".bright_red().bold(), e.red());
            }
            CommandResult::Watch(path) => {
                if let Err(e) = self.watch(Path::new(&path)) {
                    println!("{} Failed to watch {}: {}", "Error:".red(), path, e);
                }
            }
            CommandResult::Unwatch(path) => {
                if let Err(e) = self.unwatch(Path::new(&path)) {
                    println!("{} Failed to unwatch {}: {}", "Error:".red(), path, e);
                }
            }
            CommandResult::NotACommand => {
                let submission = self.ctx.submit(line);
                println!("{}", format_submission(&submission, self.ctx.json_output));
            }
        }
        true
    }

    /// Re-evaluate a watched file, replacing its previous revision.
    /// `path` must be canonical.
    fn reload(&mut self, path: &Path) {
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                println!("{} Failed to read {}: {}", "Error:".red(), path.display(), e);
                return;
            }
        };

        if let Some(w) = &mut self.watcher {
            if !w.is_new_revision(path, &contents) {
                debug!("{} unchanged, skipping", path.display());
                return;
            }
        }

        println!(
            "{} File changed: {}",
            "⚡".bright_yellow(),
            path.display()
        );
        if let Some(previous) = self.file_requests.remove(path) {
            self.ctx.session.engine().cancel(previous);
        }

        let submission = self.ctx.submit(&contents);
        if let Some(request) = submission.request {
            self.file_requests.insert(path.to_path_buf(), request);
        }
        println!("{}", format_submission(&submission, self.ctx.json_output));
    }
}

/// Render a submission for the terminal
pub fn format_submission(submission: &Submission, json: bool) -> String {
    let result = &submission.result;
    if json {
        return result.to_json();
    }

    if result.success {
        let request = submission
            .request
            .map(|id| format!(" [request {}]", id))
            .unwrap_or_default();
        format!("{} {}{}", "✓".bright_green(), result.message, request)
    } else {
        format!(
            "{} {}",
            "Error:".bright_red().bold(),
            result.error.as_deref().unwrap_or(&result.message).red()
        )
    }
}

/// Convenience function to start the REPL
pub fn start(session: Arc<Session>, watch: Option<&Path>) -> Result<()> {
    let mut repl = Repl::new(session)?;
    if let Some(path) = watch {
        repl.watch(path)?;
    }
    repl.run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{NullOutput, PlaybackEngine};
    use crate::config::EngineConfig;
    use std::time::Duration;
    use strand_core::evaluate;

    fn repl() -> Repl {
        let engine =
            PlaybackEngine::new(Arc::new(NullOutput::new()), EngineConfig::default()).unwrap();
        Repl::new(Arc::new(Session::new(engine))).unwrap()
    }

    #[test]
    fn test_one_file_two_spellings_is_one_watch() {
        let path = std::env::temp_dir().join(format!("strand-repl-{}.strand", std::process::id()));
        let dotted = path.parent().unwrap().join(".").join(path.file_name().unwrap());
        // The snare sits 2.6 s out, so each revision stays pending
        std::fs::write(&path, "\"bd ~ ~ ~ ~ ~ ~ sn\" bpm 20").unwrap();

        let mut repl = repl();
        repl.watch(&path).unwrap();
        let key = watcher::canonical(&path).unwrap();
        let first = repl.file_requests[&key];

        std::fs::write(&path, "\"hh ~ ~ ~ ~ ~ ~ sn\" bpm 20").unwrap();
        repl.watch(&dotted).unwrap();
        assert_eq!(repl.file_requests.len(), 1);
        assert_ne!(repl.file_requests[&key], first);

        assert!(repl.handle_line(&format!("unwatch {}", dotted.display())));
        assert!(repl.file_requests.is_empty());

        let engine = repl.ctx.session.engine();
        engine.stop_all();
        assert!(engine.wait_until_idle(Duration::from_secs(2)));
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_format_success() {
        colored::control::set_override(false);
        let submission = Submission {
            result: evaluate("bd sn"),
            request: Some(7),
        };
        assert_eq!(
            format_submission(&submission, false),
            "✓ Successfully evaluated pattern 'unnamed' with 2 events [request 7]"
        );
    }

    #[test]
    fn test_format_failure() {
        colored::control::set_override(false);
        let submission = Submission {
            result: evaluate(""),
            request: None,
        };
        assert_eq!(
            format_submission(&submission, false),
            "Error: Parse error: empty pattern"
        );
    }

    #[test]
    fn test_format_json() {
        let submission = Submission {
            result: evaluate("bd"),
            request: None,
        };
        let value: serde_json::Value =
            serde_json::from_str(&format_submission(&submission, true)).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["events"][0]["instrument"], "kick");
    }
}
