//! Character creator terminal front end.
//!
//! A line-oriented interface over the dialogue engine: prompts are
//! printed as `Speaker: text`, anything you type is submitted as a
//! response, and lines starting with `#` are commands.
//!
//! ```bash
//! chargen                                   # built-in creation script
//! chargen --dialogue my.json --gamedata stats.json --data-dir ./saves
//! ```

mod repl;

use chargen_core::{sample_document, DialogueDocument, SessionConfig, StatTable};
use std::sync::Arc;

/// Parsed command line options.
struct Options {
    dialogue_path: Option<String>,
    gamedata_path: Option<String>,
    data_dir: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let options = parse_options(&args);

    let document = match &options.dialogue_path {
        Some(path) => DialogueDocument::load(path).await.map_err(|e| {
            eprintln!("Failed to load dialogue document {path}: {e}");
            e
        })?,
        None => sample_document(),
    };

    let stats = match &options.gamedata_path {
        Some(path) => StatTable::load(path).await.map_err(|e| {
            eprintln!("Failed to load stat table {path}: {e}");
            e
        })?,
        None => StatTable::builtin().clone(),
    };

    let config = SessionConfig::new(&options.data_dir);
    repl::run(config, Arc::new(document), Arc::new(stats))
        .await
        .map_err(Into::into)
}

/// Parse command line options, falling back to defaults.
fn parse_options(args: &[String]) -> Options {
    let mut options = Options {
        dialogue_path: None,
        gamedata_path: None,
        data_dir: "chargen-data".to_string(),
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--dialogue" => {
                if let Some(path) = args.get(i + 1) {
                    options.dialogue_path = Some(path.clone());
                    i += 1;
                }
            }
            "--gamedata" => {
                if let Some(path) = args.get(i + 1) {
                    options.gamedata_path = Some(path.clone());
                    i += 1;
                }
            }
            "--data-dir" => {
                if let Some(path) = args.get(i + 1) {
                    options.data_dir = path.clone();
                    i += 1;
                }
            }
            _ => {}
        }
        i += 1;
    }

    options
}

fn print_help() {
    println!("chargen - dialogue-driven character creator");
    println!();
    println!("USAGE:");
    println!("  chargen [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help            Show this help message");
    println!("  --dialogue <PATH>     Dialogue document JSON (default: built-in script)");
    println!("  --gamedata <PATH>     Stat table JSON (default: built-in table)");
    println!("  --data-dir <PATH>     Autosave directory (default: chargen-data)");
    println!();
    println!("RACES:");
    println!("  human, elf, dwarf, orc, gnome, tiefling");
    println!();
    println!("CLASSES:");
    println!("  warrior, mage, rogue, bard, cleric, ranger");
    println!();
    println!("EXAMPLES:");
    println!("  chargen                                   # built-in creation script");
    println!("  chargen --data-dir ./saves                # keep autosaves elsewhere");
    println!("  chargen --dialogue intro.json --gamedata stats.json");
}
