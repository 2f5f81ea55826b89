//! Audio-related commands

use crate::audio::RequestId;
use crate::commands::{CommandContext, CommandResult};
use colored::*;
use strand_core::classify;

/// Handle `play <token>`: play one sound immediately
pub fn cmd_play(args: &str, ctx: &mut CommandContext) -> CommandResult {
    if args.is_empty() {
        return CommandResult::Error("Usage: play <token>".to_string());
    }

    let instrument = classify(args);
    match ctx.session.engine().play(instrument, Some(args)) {
        Ok(handle) => CommandResult::Message(
            format!("Playing {} ({})", instrument, handle)
                .bright_green()
                .to_string(),
        ),
        Err(e) => CommandResult::Error(e.to_string()),
    }
}

/// Handle `stop`: drop pending events and silence all voices
pub fn cmd_stop(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    ctx.session.engine().stop_all();
    CommandResult::Message("Stopped".bright_yellow().to_string())
}

/// Handle `cancel <id>`
pub fn cmd_cancel(args: &str, ctx: &mut CommandContext) -> CommandResult {
    match args.parse::<RequestId>() {
        Ok(request) => {
            ctx.session.engine().cancel(request);
            CommandResult::Message(format!("Cancelled pending events of request {}", request))
        }
        Err(_) => CommandResult::Error("Usage: cancel <request id>".to_string()),
    }
}

/// Handle `status`
pub fn cmd_status(_args: &str, ctx: &mut CommandContext) -> CommandResult {
    let engine = ctx.session.engine();
    let config = engine.config();

    let mut output = format!(
        "Output: {}\nTempo range: {}-{} bpm\nGrace period: {:.2}s\nPending events: {}\nActive voices: {}",
        engine.output_name(),
        config.tempo_range.min_bpm,
        config.tempo_range.max_bpm,
        config.grace_period.as_secs_f64(),
        engine.pending_events(),
        engine.active_voices()
    );
    for (handle, voice) in engine.voices() {
        output.push_str(&format!(
            "\n  {}: {} {} ({:.2}s)",
            handle,
            voice.instrument,
            voice.note.as_deref().unwrap_or(""),
            voice.started.elapsed().as_secs_f64()
        ));
    }
    CommandResult::Message(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::context;

    #[test]
    fn test_play_supported_token() {
        let mut ctx = context();
        assert!(matches!(cmd_play("bd", &mut ctx), CommandResult::Message(_)));
        assert_eq!(ctx.session.engine().active_voices(), 1);
    }

    #[test]
    fn test_play_unsupported_token() {
        let mut ctx = context();
        match cmd_play("cp", &mut ctx) {
            CommandResult::Error(e) => assert!(e.contains("clap")),
            other => panic!("expected error, got {:?}", other),
        }
        assert!(matches!(cmd_play("", &mut ctx), CommandResult::Error(_)));
    }

    #[test]
    fn test_cancel_requires_id() {
        let mut ctx = context();
        assert!(matches!(cmd_cancel("abc", &mut ctx), CommandResult::Error(_)));
        assert!(matches!(cmd_cancel("3", &mut ctx), CommandResult::Message(_)));
    }

    #[test]
    fn test_status_reports_counts() {
        let mut ctx = context();
        match cmd_status("", &mut ctx) {
            CommandResult::Message(msg) => {
                assert!(msg.contains("Output: null"));
                assert!(msg.contains("20-400 bpm"));
                assert!(msg.contains("Active voices: 0"));
            }
            other => panic!("expected message, got {:?}", other),
        }
    }
}
