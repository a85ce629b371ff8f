//! # survey-cli
//!
//! Command-line interface for exploring developer survey results.

mod render;
mod repl;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use render::{
    distribution_batch, format_percentage, print_batch, print_json, structure_batch, OutputFormat,
};
use std::path::PathBuf;
use survey_core::{
    Analyzer, AnalyzerOptions, Distribution, InferenceOptions, LoadOptions, MultiChoiceMatch,
    Question, SubsetOptions, TypeSourceKind, DEFAULT_ID_COLUMN, DEFAULT_SCHEMA_SHEET, DEFAULT_TOP_N,
};
use tracing_subscriber::EnvFilter;

/// survey - explore developer survey results
#[derive(Parser)]
#[command(name = "survey")]
#[command(author, version, about = "Developer survey explorer", long_about = None)]
struct Cli {
    /// Path to the survey workbook (.xlsx) or CSV export
    #[arg(long, env = "SO_DATA_PATH", global = true, value_name = "FILE")]
    data_path: Option<PathBuf>,

    /// Sheet holding the raw responses (default: "raw data", then the first sheet)
    #[arg(long, global = true)]
    sheet: Option<String>,

    /// Sheet declaring question types
    #[arg(long, global = true, default_value = DEFAULT_SCHEMA_SHEET)]
    schema_sheet: String,

    /// Where question types come from
    #[arg(long, value_enum, global = true, default_value = "auto")]
    type_source: TypeSourceArg,

    /// Respondent id column excluded from inferred questions
    #[arg(long, global = true, default_value = DEFAULT_ID_COLUMN)]
    id_column: String,

    /// Non-null answers inspected when inferring multiple choice
    #[arg(long, global = true, default_value_t = 1)]
    sample_size: usize,

    /// Match multiple-choice subsets against whole options instead of substrings
    #[arg(long, global = true)]
    exact_mc_match: bool,

    /// Output format (json, csv, table)
    #[arg(short = 'f', long = "format", global = true, default_value = "table")]
    format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

/// Question type source selectable on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
enum TypeSourceArg {
    /// Use the schema sheet when present
    #[default]
    Auto,
    /// Require the schema sheet
    Schema,
    /// Infer types from the answers
    Inferred,
}

impl From<TypeSourceArg> for TypeSourceKind {
    fn from(arg: TypeSourceArg) -> Self {
        match arg {
            TypeSourceArg::Auto => TypeSourceKind::Auto,
            TypeSourceArg::Schema => TypeSourceKind::Schema,
            TypeSourceArg::Inferred => TypeSourceKind::Inferred,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Show sheets, dimensions and leading column names
    Info,
    /// Display the survey structure (list of questions)
    Structure {
        /// Number of questions to display
        #[arg(short, long, default_value_t = repl::DEFAULT_STRUCTURE_LIMIT)]
        limit: usize,
    },
    /// List all survey questions
    ListQuestions,
    /// Search for questions, or for options with --in-options
    Search {
        keyword: String,
        /// Search in answer options instead of questions
        #[arg(short = 'o', long)]
        in_options: bool,
        /// Question to search options in
        #[arg(short, long)]
        question: Option<String>,
    },
    /// Search for questions by id or text
    SearchQuestions { query: String },
    /// List options for a specific question
    SearchOptions {
        question: String,
        /// Filter options by search term
        #[arg(long)]
        query: Option<String>,
    },
    /// Create a subset of respondents based on an answer
    Subset {
        question: String,
        option: String,
        /// Write the subset rows to a CSV file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Display the distribution of answers for a question
    Distribution {
        question: String,
        /// Number of top options before the rest fold into "Others"
        #[arg(short, long, default_value_t = DEFAULT_TOP_N)]
        top: usize,
        /// Show every option
        #[arg(long, conflicts_with = "top")]
        all: bool,
    },
    /// Distribution for a single-choice question
    DistributionSc { question: String },
    /// Distribution for a multiple-choice question
    DistributionMc { question: String },
    /// Start interactive REPL mode
    Repl,
}

impl Cli {
    fn analyzer_options(&self) -> AnalyzerOptions {
        let multi_choice_match = if self.exact_mc_match {
            MultiChoiceMatch::ExactOption
        } else {
            MultiChoiceMatch::Substring
        };
        let id_column = Some(self.id_column.as_str()).filter(|c| !c.is_empty());

        AnalyzerOptions::default()
            .with_load(
                LoadOptions::default()
                    .with_sheet(self.sheet.as_deref())
                    .with_schema_sheet(&self.schema_sheet)
                    .with_type_source(self.type_source.into()),
            )
            .with_inference(
                InferenceOptions::default()
                    .with_id_column(id_column)
                    .with_sample_size(self.sample_size),
            )
            .with_subset(SubsetOptions::default().with_multi_choice_match(multi_choice_match))
    }

    fn open(&self) -> Result<Analyzer> {
        let path = self
            .data_path
            .as_ref()
            .context("No dataset given. Pass --data-path or set SO_DATA_PATH")?;
        Analyzer::open(path, &self.analyzer_options())
            .with_context(|| format!("Failed to open {}", path.display()))
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
            )
            .with_writer(std::io::stderr)
            .init();
    }

    if let Err(e) = run(&cli) {
        eprintln!("{} {e:#}", "Error:".red().bold());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let analyzer = cli.open()?;
    let format = cli.format;
    tracing::debug!(command = ?cli.command, ?format, "Running command");

    match &cli.command {
        Command::Info => print_info(&analyzer, format),
        Command::Structure { limit } => print_structure(&analyzer, *limit, format),
        Command::ListQuestions => {
            let questions: Vec<&Question> = analyzer.questions().collect();
            print_questions(&questions, format)
        }
        Command::SearchQuestions { query } => {
            let questions = analyzer.search_questions(query)?;
            if questions.is_empty() && format != OutputFormat::Json {
                println!("No questions found matching: {query}");
                return Ok(());
            }
            print_questions(&questions, format)
        }
        Command::SearchOptions { question, query } => {
            let options = analyzer.search_options(question, query.as_deref())?;
            if format == OutputFormat::Json {
                return print_json(&serde_json::json!({
                    "question_id": question,
                    "options": options,
                }));
            }
            println!("Options for question: {question}");
            for option in options {
                println!("- {option}");
            }
            Ok(())
        }
        Command::Search {
            keyword,
            in_options,
            question,
        } => run_search(&analyzer, keyword, *in_options, question.as_deref(), format),
        Command::Subset {
            question,
            option,
            output,
        } => run_subset(&analyzer, question, option, output.as_ref(), format),
        Command::Distribution { question, top, all } => {
            let top_n = if *all { None } else { Some(*top) };
            let dist = analyzer.distribution(question, None, top_n)?;
            if format == OutputFormat::Json {
                return print_json(&dist);
            }
            let q = analyzer.question(question)?;
            if format == OutputFormat::Table {
                println!("\nDistribution for '{}' (full dataset):", q.id);
                println!("Question: {}", q.text);
                println!("Total responses: {}", q.response_count);
                println!("Question type: {}\n", q.question_type);
            }
            print_batch(&distribution_batch(&dist, format)?, format)
        }
        Command::DistributionSc { question } => {
            let dist = analyzer.single_choice_distribution(question, None, None)?;
            print_strict_distribution(analyzer.question(question)?, &dist, format)
        }
        Command::DistributionMc { question } => {
            let dist = analyzer.multiple_choice_distribution(question, None, None)?;
            print_strict_distribution(analyzer.question(question)?, &dist, format)
        }
        Command::Repl => repl::run_repl(&analyzer, format),
    }
}

fn print_info(analyzer: &Analyzer, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Json {
        return print_json(analyzer.sheets());
    }

    println!("\nSurvey Dataset Information:");
    println!("{}", "=".repeat(50));
    for sheet in analyzer.sheets() {
        println!("\nSheet: {}", sheet.name.cyan().bold());
        println!(
            "  Dimensions: {} rows x {} columns",
            sheet.rows,
            sheet.columns.len()
        );
        let preview: Vec<&str> = sheet.columns.iter().take(5).map(String::as_str).collect();
        let more = if sheet.columns.len() > 5 { ", ..." } else { "" };
        println!("  Columns: {}{more}", preview.join(", "));
    }
    println!(
        "\nAnalysing {} respondents across {} questions.",
        analyzer.response_count(),
        analyzer.catalog().len()
    );
    Ok(())
}

fn print_structure(analyzer: &Analyzer, limit: usize, format: OutputFormat) -> Result<()> {
    let total = analyzer.catalog().len();
    let questions: Vec<&Question> = analyzer.questions().take(limit).collect();
    if format == OutputFormat::Json {
        return print_json(&questions);
    }

    if format == OutputFormat::Table {
        println!("\nSurvey Structure ({total} total questions):\n");
    }
    print_batch(&structure_batch(&questions)?, format)?;
    if format == OutputFormat::Table && limit < total {
        println!("\nShowing {limit} of {total} questions. Use --limit to see more.");
    }
    Ok(())
}

fn print_questions(questions: &[&Question], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(questions),
        OutputFormat::Csv => print_batch(&structure_batch(questions)?, format),
        OutputFormat::Table => {
            for q in questions {
                println!("{}", format_question_line(q));
            }
            Ok(())
        }
    }
}

/// `ID (TYPE): text`
fn format_question_line(question: &Question) -> String {
    format!(
        "{} ({}): {}",
        question.id, question.question_type, question.text
    )
}

fn run_search(
    analyzer: &Analyzer,
    keyword: &str,
    in_options: bool,
    question: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    if in_options {
        let question =
            question.context("--question is required when searching in options")?;
        let options = analyzer.search_options(question, Some(keyword))?;
        if format == OutputFormat::Json {
            return print_json(&options);
        }
        println!("\nOptions matching '{keyword}' in question '{question}':");
        if options.is_empty() {
            println!("  No matching options found.");
        }
        for (i, option) in options.iter().enumerate() {
            println!("  {}. {option}", i + 1);
        }
        return Ok(());
    }

    let questions = analyzer.search_questions(keyword)?;
    if format == OutputFormat::Json {
        return print_json(&questions);
    }
    println!("\nQuestions matching '{keyword}':");
    if questions.is_empty() {
        println!("  No matching questions found.");
    }
    for (i, q) in questions.iter().enumerate() {
        println!("  {}. {}", i + 1, q.id);
        println!(
            "     Type: {}, Responses: {}",
            q.question_type, q.response_count
        );
    }
    Ok(())
}

fn run_subset(
    analyzer: &Analyzer,
    question: &str,
    option: &str,
    output: Option<&PathBuf>,
    format: OutputFormat,
) -> Result<()> {
    let subset = analyzer.create_subset(question, option)?;
    let total = analyzer.response_count();

    if let Some(path) = output {
        subset
            .rows()
            .save_as_csv(path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({
            "filter": subset.filter(),
            "respondents": subset.len(),
            "total": total,
            "share": subset.share_of(total),
            "output": output,
        }));
    }

    println!(
        "\nCreated subset: {} respondents ({:.1}% of total)",
        subset.len(),
        subset.share_of(total)
    );
    println!("Filter: {question} = '{option}'");
    if let Some(path) = output {
        println!("Subset saved to {}", path.display());
    }
    Ok(())
}

/// Plain listing used by `distribution-sc` / `distribution-mc`
fn print_strict_distribution(
    question: &Question,
    dist: &Distribution,
    format: OutputFormat,
) -> Result<()> {
    match format {
        OutputFormat::Json => print_json(dist),
        OutputFormat::Csv => print_batch(&distribution_batch(dist, format)?, format),
        OutputFormat::Table => {
            println!("{}", format_strict_distribution(question, dist));
            Ok(())
        }
    }
}

fn format_strict_distribution(question: &Question, dist: &Distribution) -> String {
    let mut lines = vec![
        format!("Distribution for: {}", question.id),
        format!("Question: {}", question.text),
        "\nOptions:".to_string(),
    ];
    for entry in dist.entries() {
        lines.push(format!(
            "- {}: {}",
            entry.option,
            format_percentage(entry.percentage)
        ));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use survey_core::{compute_distribution, ColumnStats, QuestionType};
    use survey_sheet::{Book, Sheet};
    use tempfile::tempdir;

    // ========================================================================
    // CLI argument parsing tests
    // ========================================================================

    #[test]
    fn test_cli_parse_structure() {
        let cli = Cli::parse_from(["survey", "--data-path", "s.xlsx", "structure", "-l", "5"]);
        assert_eq!(cli.data_path, Some(PathBuf::from("s.xlsx")));
        assert_eq!(cli.command, Command::Structure { limit: 5 });

        let cli = Cli::parse_from(["survey", "structure"]);
        assert_eq!(cli.command, Command::Structure { limit: 20 });
    }

    #[test]
    fn test_cli_parse_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "survey",
            "distribution",
            "Q1",
            "--top",
            "3",
            "-f",
            "json",
            "--type-source",
            "inferred",
            "--exact-mc-match",
            "-v",
        ]);
        assert_eq!(
            cli.command,
            Command::Distribution {
                question: "Q1".to_string(),
                top: 3,
                all: false
            }
        );
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.type_source, TypeSourceArg::Inferred);
        assert!(cli.exact_mc_match);
        assert!(cli.verbose);
    }

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::parse_from(["survey", "distribution", "Q1"]);
        assert_eq!(cli.format, OutputFormat::Table);
        assert_eq!(cli.type_source, TypeSourceArg::Auto);
        assert_eq!(cli.schema_sheet, "schema");
        assert_eq!(cli.id_column, "ResponseId");
        assert_eq!(cli.sample_size, 1);
        assert!(matches!(cli.command, Command::Distribution { top: 10, all: false, .. }));
    }

    #[test]
    fn test_cli_parse_all_conflicts_with_top() {
        assert!(
            Cli::try_parse_from(["survey", "distribution", "Q1", "--all", "--top", "2"]).is_err()
        );
        let cli = Cli::parse_from(["survey", "distribution", "Q1", "--all"]);
        assert!(matches!(cli.command, Command::Distribution { all: true, .. }));
    }

    #[test]
    fn test_cli_parse_subset_and_search() {
        let cli = Cli::parse_from(["survey", "subset", "Q1", "Option A", "--output", "out.csv"]);
        assert_eq!(
            cli.command,
            Command::Subset {
                question: "Q1".to_string(),
                option: "Option A".to_string(),
                output: Some(PathBuf::from("out.csv"))
            }
        );

        let cli = Cli::parse_from(["survey", "search", "java", "-o", "-q", "Languages"]);
        assert_eq!(
            cli.command,
            Command::Search {
                keyword: "java".to_string(),
                in_options: true,
                question: Some("Languages".to_string())
            }
        );

        let cli = Cli::parse_from(["survey", "search-options", "Q2", "--query", "x"]);
        assert!(matches!(cli.command, Command::SearchOptions { query: Some(_), .. }));
    }

    #[test]
    fn test_cli_parse_strict_distributions() {
        let cli = Cli::parse_from(["survey", "distribution-sc", "Q1"]);
        assert_eq!(
            cli.command,
            Command::DistributionSc {
                question: "Q1".to_string()
            }
        );
        let cli = Cli::parse_from(["survey", "distribution-mc", "Q2"]);
        assert!(matches!(cli.command, Command::DistributionMc { .. }));
    }

    #[test]
    fn test_analyzer_options_from_flags() {
        let cli = Cli::parse_from([
            "survey",
            "repl",
            "--sheet",
            "Responses",
            "--id-column",
            "",
            "--sample-size",
            "5",
            "--exact-mc-match",
        ]);
        let options = cli.analyzer_options();
        assert_eq!(options.load.sheet.as_deref(), Some("Responses"));
        assert_eq!(options.inference.id_column, None);
        assert_eq!(options.inference.sample_size, 5);
        assert_eq!(
            options.subset.multi_choice_match,
            MultiChoiceMatch::ExactOption
        );
    }

    // ========================================================================
    // Output formatting tests
    // ========================================================================

    fn question(id: &str, text: &str, question_type: QuestionType) -> Question {
        Question::new(id, text, question_type, &ColumnStats::default())
    }

    #[test]
    fn test_format_question_line() {
        let q = question("Q1", "Test question 1?", QuestionType::SingleChoice);
        assert_eq!(format_question_line(&q), "Q1 (SC): Test question 1?");
    }

    #[test]
    fn test_format_strict_distribution() {
        let table = Sheet::from_data(
            vec!["Q1"],
            vec![vec!["Option A"], vec!["Option B"], vec!["Option A"], vec!["Option C"]],
        )
        .unwrap();
        let q = question("Q1", "Test question 1?", QuestionType::SingleChoice);
        let dist = compute_distribution(&table, &q, None).unwrap();

        let text = format_strict_distribution(&q, &dist);
        assert!(text.starts_with("Distribution for: Q1\nQuestion: Test question 1?"));
        assert!(text.contains("- Option A: 50.00%"));
        assert!(text.contains("- Option C: 25.00%"));
    }

    // ========================================================================
    // Integration tests
    // ========================================================================

    fn write_workbook(dir: &std::path::Path) -> PathBuf {
        let path = dir.join("survey.xlsx");
        let mut book = Book::new();
        book.add_sheet(
            "schema",
            Sheet::from_data(
                vec!["column", "question_text", "type"],
                vec![
                    vec!["Q1", "Test question 1?", "SC"],
                    vec!["Q2", "Test multiple-choice question?", "MC"],
                ],
            )
            .unwrap(),
        )
        .unwrap();
        book.add_sheet(
            "raw data",
            Sheet::from_data(
                vec!["ResponseId", "Q1", "Q2"],
                vec![
                    vec!["1", "Option A", "Option X;Option Y"],
                    vec!["2", "Option B", "Option Z"],
                    vec!["3", "Option A", "Option X"],
                    vec!["4", "Option C", "Option Y;Option Z"],
                ],
            )
            .unwrap(),
        )
        .unwrap();
        book.save_as_xlsx(&path).unwrap();
        path
    }

    #[test]
    fn test_run_subset_writes_csv() {
        let dir = tempdir().unwrap();
        let data = write_workbook(dir.path());
        let out = dir.path().join("subset.csv");

        let cli = Cli::parse_from([
            "survey",
            "--data-path",
            data.to_str().unwrap(),
            "subset",
            "Q1",
            "Option A",
            "--output",
            out.to_str().unwrap(),
        ]);
        run(&cli).unwrap();

        let written = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines[0], "ResponseId,Q1,Q2");
        assert_eq!(lines[1], "1,Option A,Option X;Option Y");
        assert_eq!(lines[2], "3,Option A,Option X");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_run_strict_distribution_type_mismatch() {
        let dir = tempdir().unwrap();
        let data = write_workbook(dir.path());
        let data = data.to_str().unwrap();

        let ok = Cli::parse_from(["survey", "--data-path", data, "distribution-mc", "Q2"]);
        assert!(run(&ok).is_ok());

        let mismatch = Cli::parse_from(["survey", "--data-path", data, "distribution-sc", "Q2"]);
        let err = run(&mismatch).unwrap_err();
        assert!(err.to_string().contains("Type mismatch"));
    }

    #[test]
    fn test_run_missing_data_path() {
        let cli = Cli {
            data_path: None,
            ..Cli::parse_from(["survey", "info"])
        };
        assert!(run(&cli).is_err());
    }
}
