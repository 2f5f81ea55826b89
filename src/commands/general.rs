//! General REPL commands (help, quit, watch, unwatch, json)

use crate::commands::{CommandContext, CommandResult};
use colored::*;

/// Handle `help` command
pub fn cmd_help(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    print_help();
    CommandResult::Success
}

/// Handle `quit` or `exit` command
pub fn cmd_quit(_args: &str, _ctx: &mut CommandContext) -> CommandResult {
    CommandResult::Exit
}

/// Handle `watch <file>` command
pub fn cmd_watch(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: watch <file>".to_string());
    }
    CommandResult::Watch(args.to_string())
}

/// Handle `unwatch <file>` command
pub fn cmd_unwatch(args: &str, _ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: unwatch <file>".to_string());
    }
    CommandResult::Unwatch(args.to_string())
}

/// Handle `json [on|off]` command
pub fn cmd_json(args: &str, ctx: &mut CommandContext) -> CommandResult {
    match args {
        "" => CommandResult::Message(format!(
            "JSON output is {}",
            if ctx.json_output { "on" } else { "off" }
        )),
        "on" => {
            ctx.json_output = true;
            CommandResult::Message("JSON output on".bright_green().to_string())
        }
        "off" => {
            ctx.json_output = false;
            CommandResult::Message("JSON output off".bright_green().to_string())
        }
        _ => CommandResult::Error("Usage: json [on|off]".to_string()),
    }
}

/// Print help information
fn print_help() {
    println!("{}", "Strand Pattern Help".bold());
    println!("{}", "===================".bold());
    println!();
    println!("{}", "Patterns:".green());
    println!("  {}                 - Play a sequence", "bd sn hh".cyan());
    println!("  {}             - Rests keep their step", "bd ~ sn ~".cyan());
    println!("  {}     - Quoted body with a tempo", "\"bd sn\" bpm 90".cyan());
    println!(
        "  {} - Named pattern",
        "d1 $ sound \"bd sn hh\" bpm 140".cyan()
    );
    println!("  {}       - Synth notes (c4..e5)", "c4 e4 g4 c5".cyan());
    println!();
    println!("{}", "Instruments:".green());
    println!("  {} / {}   - Kick", "bd".cyan(), "kick".cyan());
    println!("  {} / {}  - Snare", "sn".cyan(), "snare".cyan());
    println!("  {} / {} - Closed hi-hat", "hh".cyan(), "hihat".cyan());
    println!(
        "  {}, {}, {}  - Recognised but not synthesized",
        "oh".cyan(),
        "cp".cyan(),
        "cy".cyan()
    );
    println!();
    println!("{}", "Audio Commands:".green());
    println!("  {}  - Play one sound now", "play <token>".cyan());
    println!("  {}          - Stop everything", "stop".cyan());
    println!("  {}   - Cancel a pending request", "cancel <id>".cyan());
    println!("  {}        - Show engine status", "status".cyan());
    println!();
    println!("{}", "Other Commands:".green());
    println!("  {}   - Re-evaluate a file on save", "watch <file>".cyan());
    println!("  {} - Stop watching a file", "unwatch <file>".cyan());
    println!("  {}  - Toggle JSON results", "json [on|off]".cyan());
    println!("  {}          - Show this help", "help".bright_green());
    println!("  {}          - Exit the REPL", "quit".bright_red());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context;

    #[test]
    fn test_json_toggle() {
        let mut ctx = context();
        assert!(!ctx.json_output);

        cmd_json("on", &mut ctx);
        assert!(ctx.json_output);
        cmd_json("off", &mut ctx);
        assert!(!ctx.json_output);

        assert!(matches!(cmd_json("maybe", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_watch_requires_path() {
        let mut ctx = context();
        assert!(matches!(cmd_watch("", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_unwatch("", &mut ctx), CommandResult::Error(_)));
        assert_eq!(
            cmd_unwatch("beat.strand", &mut ctx),
            CommandResult::Unwatch("beat.strand".to_string())
        );
    }
}
