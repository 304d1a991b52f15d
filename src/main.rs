//! Bilingual autocorrect - an interactive console front end for the typing engine.
//!
//! # Overview
//!
//! Stands in for the keyboard: every line typed at the prompt is split into
//! words, each word is corrected in the context of the previous one and then
//! committed, so the engine learns from the session exactly as it would from
//! a real text field.
//!
//! ```text
//! > helo world
//!   helo -> hello
//! > :predict w i
//!   want, will, would
//! > :swipe h:120 g:20 e:110 l:140 o:100
//!   hello
//! ```
//!
//! # Commands
//!
//! - `:mode fr|en|both`: restrict the active lexicons
//! - `:predict <prefix> [previous]`: ranked completions
//! - `:swipe <letter:dwell>...`: resolve a tokenized swipe path
//! - `:reject <source> <corrected>`: record an undo of a correction
//! - `:toggle`: enable or disable suggestions
//! - `:flush`: persist learned state now
//! - `:q`: quit

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::warn;

use bilingual_autocorrect::{AssetPaths, Config, LanguageMode, SwipeTypingSession, TypingEngine};

#[derive(Parser, Debug)]
#[command(name = "bilingual-autocorrect")]
#[command(about = "French/English autocorrect, prediction and swipe resolution")]
#[command(version)]
struct Args {
    /// Start with suggestions disabled
    #[arg(long)]
    disabled: bool,

    /// Active languages: fr, en or both
    #[arg(short, long)]
    mode: Option<String>,

    /// French unigram asset (`[rank] word [frequency]` per line)
    #[arg(long)]
    french_unigrams: Option<PathBuf>,

    /// French bigram asset (`previous current frequency` per line)
    #[arg(long)]
    french_bigrams: Option<PathBuf>,

    /// English unigram asset
    #[arg(long)]
    english_unigrams: Option<PathBuf>,

    /// English bigram asset
    #[arg(long)]
    english_bigrams: Option<PathBuf>,

    /// Directory for learned tables (defaults to the platform data dir)
    #[arg(long)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Correct a single word
    Correct {
        word: String,
        #[arg(short, long)]
        previous: Option<String>,
    },
    /// Predict completions for a prefix
    Predict {
        #[arg(default_value = "")]
        prefix: String,
        #[arg(short, long)]
        previous: Option<String>,
    },
    /// Resolve a swipe path given as `letter:dwell` tokens
    Swipe { tokens: Vec<String> },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let args = Args::parse();
    let mut config = Config::load()?;

    if args.disabled {
        config.enabled_by_default = false;
    }
    if let Some(mode) = &args.mode {
        config.language_mode =
            LanguageMode::parse(mode).ok_or_else(|| format!("unknown language mode: {mode}"))?;
    }
    if args.state_dir.is_some() {
        config.state_dir = args.state_dir.clone();
    }

    // Persist defaults so users get a concrete config file on first run.
    if let Err(err) = config.save() {
        warn!("Failed to persist config defaults: {err}");
    }

    let engine = Arc::new(TypingEngine::from_config(&config));
    let paths = AssetPaths {
        french_unigrams: args.french_unigrams.clone(),
        french_bigrams: args.french_bigrams.clone(),
        english_unigrams: args.english_unigrams.clone(),
        english_bigrams: args.english_bigrams.clone(),
    };
    if paths.french_unigrams.is_some() || paths.english_unigrams.is_some() {
        // One-shot commands need the assets before answering.
        let loader = engine.load_assets_in_background(paths);
        if args.command.is_some() && loader.join().is_err() {
            warn!("asset loader panicked, keeping embedded dictionaries");
        }
    }

    match args.command {
        Some(Command::Correct { word, previous }) => {
            match engine.correct(&word, previous.as_deref()) {
                Some(corrected) => println!("{corrected}"),
                None => println!("{word}"),
            }
        }
        Some(Command::Predict { prefix, previous }) => {
            println!("{}", engine.predict_words(&prefix, previous.as_deref()).join(", "));
        }
        Some(Command::Swipe { tokens }) => {
            let session = parse_swipe(&tokens)?;
            match engine.resolve_swipe_path(&session) {
                Some(word) => println!("{word}"),
                None => println!("(no match)"),
            }
        }
        None => repl(&engine)?,
    }

    engine.flush()?;
    Ok(())
}

fn repl(engine: &TypingEngine) -> io::Result<()> {
    println!("Bilingual autocorrect - type text, :q to quit");
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break; // EOF
        }
        let line = input.trim();
        if line == ":q" {
            break;
        }

        match line.strip_prefix(':') {
            Some(command) => run_command(engine, command),
            None => type_line(engine, line),
        }
    }
    Ok(())
}

/// The word new input is corrected against: whatever the engine last
/// committed in this sentence, typed or swiped.
fn previous_word(engine: &TypingEngine) -> Option<String> {
    engine.sentence().last().cloned()
}

fn type_line(engine: &TypingEngine, line: &str) {
    for token in line.split_whitespace() {
        let word = token.trim_matches(|c: char| !c.is_alphabetic() && c != '\'');
        if word.is_empty() {
            continue;
        }
        let committed = match engine.correct(word, previous_word(engine).as_deref()) {
            Some(corrected) => {
                println!("  {word} -> {corrected}");
                token.replacen(word, &corrected, 1)
            }
            None => token.to_string(),
        };
        engine.commit_word(&committed);
    }
}

fn run_command(engine: &TypingEngine, command: &str) {
    let previous = previous_word(engine);
    let previous = previous.as_deref();
    let mut parts = command.split_whitespace();
    match parts.next() {
        Some("mode") => match parts.next().and_then(LanguageMode::parse) {
            Some(mode) => {
                engine.set_mode(mode);
                println!("  mode: {mode:?}");
            }
            None => println!("  usage: :mode fr|en|both"),
        },
        Some("predict") => {
            let prefix = parts.next().unwrap_or_default();
            let context = parts.next().or(previous);
            println!("  {}", engine.predict_words(prefix, context).join(", "));
        }
        Some("swipe") => {
            let tokens: Vec<String> = parts.map(str::to_string).collect();
            match parse_swipe(&tokens) {
                Ok(session) => match engine.resolve_swipe_path(&session) {
                    Some(word) => {
                        println!("  {word}");
                        engine.commit_swipe(&word);
                    }
                    None => println!("  (no match)"),
                },
                Err(err) => println!("  {err}"),
            }
        }
        Some("reject") => match (parts.next(), parts.next()) {
            (Some(source), Some(corrected)) => {
                engine.reject_correction(source, corrected);
                println!("  rejected {source} -> {corrected}");
            }
            _ => println!("  usage: :reject <source> <corrected>"),
        },
        Some("toggle") => {
            let enabled = engine.toggle_enabled();
            println!("  {}", if enabled { "enabled" } else { "disabled" });
        }
        Some("flush") => match engine.flush() {
            Ok(()) => println!("  flushed"),
            Err(err) => println!("  flush failed: {err}"),
        },
        _ => println!("  commands: :mode :predict :swipe :reject :toggle :flush :q"),
    }
}

/// Parse `letter:dwell` tokens (dwell in ms, default 100).
fn parse_swipe(tokens: &[String]) -> Result<SwipeTypingSession, String> {
    let mut pairs = Vec::with_capacity(tokens.len());
    for token in tokens {
        let (letter, dwell) = token.split_once(':').unwrap_or((token.as_str(), "100"));
        let mut chars = letter.chars();
        let (Some(letter), None) = (chars.next(), chars.next()) else {
            return Err(format!("bad swipe token: {token}"));
        };
        let dwell: u64 = dwell
            .parse()
            .map_err(|_| format!("bad dwell time in token: {token}"))?;
        pairs.push((letter, dwell));
    }
    Ok(SwipeTypingSession::from_tokens(pairs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahash::AHashMap;
    use bilingual_autocorrect::{DictionarySnapshot, Language, LanguageAssets, MemoryStore};

    fn engine() -> TypingEngine {
        let words = |entries: &[(&str, u64)]| -> AHashMap<String, u64> {
            entries.iter().map(|(w, f)| (w.to_string(), *f)).collect()
        };
        let snapshot = DictionarySnapshot::new(
            LanguageAssets::from_maps(Language::French, &words(&[("bonjour", 500)]), &[]),
            LanguageAssets::from_maps(
                Language::English,
                &words(&[("hello", 1000), ("help", 800), ("world", 700)]),
                &[],
            ),
        );
        TypingEngine::new(&Config::default(), snapshot, Box::new(MemoryStore::new()))
    }

    #[test]
    fn test_parse_swipe_tokens() {
        let tokens: Vec<String> = ["h:120", "e", "l:140"].iter().map(|t| t.to_string()).collect();
        let session = parse_swipe(&tokens).unwrap();
        assert_eq!(session.len(), 3);
        assert!(parse_swipe(&["hx:10".to_string()]).is_err());
        assert!(parse_swipe(&["h:soon".to_string()]).is_err());
    }

    #[test]
    fn test_swiped_word_becomes_previous_word() {
        let engine = engine();
        type_line(&engine, "helo");
        assert_eq!(previous_word(&engine).as_deref(), Some("hello"));

        run_command(&engine, "swipe h:120 g:20 e:110 r:10 k:15 l:140 o:100");
        assert_eq!(engine.sentence(), vec!["hello", "hello"]);

        type_line(&engine, "wrld");
        assert_eq!(previous_word(&engine).as_deref(), Some("world"));
    }
}
