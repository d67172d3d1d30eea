//! The interactive creation loop.
//!
//! A simple line-oriented protocol:
//! - Anything you type is submitted as a response to the current prompt
//! - Lines starting with `#` are commands (status, save, history, quit)

use chargen_core::persist::{character_save_path, SavedCharacter};
use chargen_core::{
    Attribute, CreationSession, DialogueDocument, SessionConfig, SessionError, StatTable,
    SubmitOutcome,
};
use std::io::{self, BufRead, Write};
use std::sync::Arc;

/// Run the creation dialogue until it finishes or the player quits.
pub async fn run(
    config: SessionConfig,
    document: Arc<DialogueDocument>,
    stats: Arc<StatTable>,
) -> Result<(), SessionError> {
    let mut session = CreationSession::new(config, document, stats).await?;

    println!("=== Character Creator ===");
    println!();
    println!("Commands:");
    println!("  #quit         - Leave without finishing");
    println!("  #status       - Show the character so far");
    println!("  #save <name>  - Save the character to a named slot");
    println!("  #history      - Show the conversation so far");
    println!("  #help         - Show this help");
    println!();

    // The opening prompt is already in the history.
    if let Some(entry) = session.history().entries.first() {
        println!("{}: {}", entry.speaker, entry.text);
    }

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        if line.trim_start().starts_with('#') {
            if handle_command(&session, line.trim()).await {
                break;
            }
            stdout.flush().ok();
            continue;
        }

        match session.submit(&line).await? {
            SubmitOutcome::Advanced { prompt, stats_skipped } => {
                if let Some(skipped) = stats_skipped {
                    println!("[NOTE] Stats not applied: {skipped}");
                }
                println!("{}: {}", prompt.speaker, prompt.text);
            }
            SubmitOutcome::Finished { stats_skipped } => {
                if let Some(skipped) = stats_skipped {
                    println!("[NOTE] Stats not applied: {skipped}");
                }
                println!();
                println!("Character creation complete.");
                print_status(&session);
                break;
            }
            SubmitOutcome::Rejected { reply }
            | SubmitOutcome::TriggerFailed { reply, .. }
            | SubmitOutcome::EmptyInput { reply } => {
                println!("{}: {}", reply.speaker, reply.text);
            }
        }
        stdout.flush().ok();
    }

    Ok(())
}

/// Handle a `#` command. Returns true when the loop should exit.
async fn handle_command(session: &CreationSession, line: &str) -> bool {
    let parts: Vec<&str> = line[1..].split_whitespace().collect();
    match parts.first().copied() {
        Some("quit") | Some("exit") => {
            println!("Goodbye!");
            return true;
        }
        Some("status") => {
            print_status(session);
        }
        Some("save") => {
            if let Some(name) = parts.get(1) {
                let saved = SavedCharacter::new(session.character().clone());
                let path = character_save_path(&session.config().data_dir, name);
                match saved.save_json(&path).await {
                    Ok(()) => println!("[SAVED] Character saved to {}", path.display()),
                    Err(e) => println!("[ERROR] Save failed: {e}"),
                }
            } else {
                println!("[ERROR] Usage: #save <name>");
            }
        }
        Some("history") => {
            for entry in session.history().iter() {
                println!("[{}] {}: {}", entry.timestamp, entry.speaker, entry.text);
            }
        }
        Some("help") => {
            println!("[HELP]");
            println!("  #quit         - Leave without finishing");
            println!("  #status       - Show the character so far");
            println!("  #save <name>  - Save the character to a named slot");
            println!("  #history      - Show the conversation so far");
            println!("  (anything else answers the current prompt)");
        }
        _ => {
            println!("[ERROR] Unknown command. Type #help for help.");
        }
    }
    false
}

fn print_status(session: &CreationSession) {
    let record = session.character();
    println!("[STATUS]");
    println!("  {}", record.summary());
    println!("  Attractiveness: {}", record.attractiveness);
    for attribute in Attribute::all() {
        println!(
            "  {}: {}",
            attribute.abbreviation(),
            record.attributes.get(attribute)
        );
    }
}
