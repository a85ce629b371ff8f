//! Interactive survey exploration.

use crate::render::{distribution_batch, print_batch, structure_batch, OutputFormat};
use anyhow::Result;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::path::PathBuf;
use survey_core::{Analyzer, Question, Session, DEFAULT_TOP_N};

/// Questions listed by `structure` without an explicit limit.
pub const DEFAULT_STRUCTURE_LIMIT: usize = 20;

/// One parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Structure { limit: usize },
    Search { keyword: String },
    SearchOptions { question: String, keyword: String },
    Subset { question: String, option: String },
    Dist { question: String, top_n: usize },
    DistSubset { question: String, top_n: usize },
    ClearSubset,
}

impl ReplCommand {
    /// Parse a non-empty input line.
    ///
    /// Returns a usage message when arguments are missing or malformed.
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (name, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(n, r)| (n, r.trim()));

        match name {
            "help" => Ok(ReplCommand::Help),
            "exit" | "quit" => Ok(ReplCommand::Exit),
            "clear-subset" => Ok(ReplCommand::ClearSubset),
            "structure" => {
                let limit = match rest.split_whitespace().next() {
                    Some(n) => n
                        .parse()
                        .map_err(|_| "Usage: structure [limit]".to_string())?,
                    None => DEFAULT_STRUCTURE_LIMIT,
                };
                Ok(ReplCommand::Structure { limit })
            }
            "search" => {
                if rest.is_empty() {
                    return Err("Usage: search <keyword>".to_string());
                }
                Ok(ReplCommand::Search {
                    keyword: rest.to_string(),
                })
            }
            "search-options" => {
                let (question, keyword) = split_pair(rest)
                    .ok_or_else(|| "Usage: search-options <question> <keyword>".to_string())?;
                Ok(ReplCommand::SearchOptions { question, keyword })
            }
            "subset" => {
                let (question, option) = split_pair(rest)
                    .ok_or_else(|| "Usage: subset <question> <option>".to_string())?;
                Ok(ReplCommand::Subset { question, option })
            }
            "dist" | "dist-subset" => {
                let usage = format!("Usage: {name} <question> [top_n]");
                let mut parts = rest.split_whitespace();
                let question = parts.next().ok_or_else(|| usage.clone())?.to_string();
                let top_n = match parts.next() {
                    Some(n) => n.parse().map_err(|_| usage)?,
                    None => DEFAULT_TOP_N,
                };
                if name == "dist" {
                    Ok(ReplCommand::Dist { question, top_n })
                } else {
                    Ok(ReplCommand::DistSubset { question, top_n })
                }
            }
            _ => Err(format!(
                "Unknown command: {line}. Type 'help' for available commands."
            )),
        }
    }
}

/// First word, then the rest of the line (which may contain spaces).
fn split_pair(rest: &str) -> Option<(String, String)> {
    let (first, second) = rest.split_once(char::is_whitespace)?;
    let second = second.trim();
    if second.is_empty() {
        return None;
    }
    Some((first.to_string(), second.to_string()))
}

/// Execute one command against the session. Returns `false` to leave the loop.
pub fn execute(
    session: &mut Session<'_>,
    command: ReplCommand,
    format: OutputFormat,
) -> Result<bool> {
    let analyzer = session.analyzer();
    match command {
        ReplCommand::Exit => return Ok(false),
        ReplCommand::Help => print_help(),
        ReplCommand::Structure { limit } => {
            let questions: Vec<&Question> = analyzer.questions().take(limit).collect();
            print_batch(&structure_batch(&questions)?, format)?;
        }
        ReplCommand::Search { keyword } => {
            let questions = analyzer.search_questions(&keyword)?;
            if questions.is_empty() {
                println!("  No matching questions found.");
            }
            for q in questions {
                println!("  - {}", q.id);
            }
        }
        ReplCommand::SearchOptions { question, keyword } => {
            let options = analyzer.search_options(&question, Some(&keyword))?;
            if options.is_empty() {
                println!("  No matching options found.");
            }
            for option in options {
                println!("  - {option}");
            }
        }
        ReplCommand::Subset { question, option } => {
            let subset = session.create_subset(&question, &option)?;
            println!("Subset created: {} respondents", subset.len());
        }
        ReplCommand::Dist { question, top_n } => {
            let dist = session.distribution(&question, Some(top_n), false)?;
            print_batch(&distribution_batch(&dist, format)?, format)?;
        }
        ReplCommand::DistSubset { question, top_n } => {
            let dist = session.distribution(&question, Some(top_n), true)?;
            print_batch(&distribution_batch(&dist, format)?, format)?;
        }
        ReplCommand::ClearSubset => {
            session.clear_subset();
            println!("Subset cleared.");
        }
    }
    Ok(true)
}

/// Run the REPL.
pub fn run_repl(analyzer: &Analyzer, format: OutputFormat) -> Result<()> {
    println!(
        "\n{} {} - Interactive Mode",
        "survey-explorer".cyan().bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!(
        "{} respondents, {} questions",
        analyzer.response_count(),
        analyzer.catalog().len()
    );
    println!(
        "Type {} for available commands, {} to quit\n",
        "help".yellow(),
        "exit".yellow()
    );

    let mut rl = DefaultEditor::new()?;
    let history_path = dirs_history_path();

    // Load history if available
    if let Some(ref path) = history_path {
        let _ = rl.load_history(path);
    }

    let mut session = Session::new(analyzer);

    loop {
        let prompt = "survey> ".green().bold().to_string();

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();

                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                match ReplCommand::parse(line) {
                    Ok(command) => match execute(&mut session, command, format) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => println!("{} {e}", "Error:".red().bold()),
                    },
                    Err(usage) => println!("{}", usage.yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("\nUse 'exit' to quit.");
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("{} {e}", "Error:".red().bold());
                break;
            }
        }
    }

    println!("\nGoodbye!");

    // Save history
    if let Some(ref path) = history_path {
        let _ = rl.save_history(path);
    }

    Ok(())
}

/// Get the history file path.
fn dirs_history_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|mut p| {
        p.push("survey-explorer");
        let _ = std::fs::create_dir_all(&p);
        p.push("history.txt");
        p
    })
}

/// Print REPL help.
fn print_help() {
    const COMMANDS: [(&str, &str); 9] = [
        ("help", "Show available commands"),
        ("structure [limit]", "Display survey structure"),
        ("search <keyword>", "Search questions"),
        ("search-options <question> <keyword>", "Search options in a question"),
        ("subset <question> <option>", "Create and save subset"),
        ("dist <question> [top_n]", "Show distribution"),
        ("dist-subset <question> [top_n]", "Show distribution for saved subset"),
        ("clear-subset", "Clear saved subset"),
        ("exit", "Exit REPL"),
    ];

    println!("\n{}", "Available commands:".cyan().bold());
    for (command, description) in COMMANDS {
        println!("  {:<38} - {description}", command.yellow());
    }
}
