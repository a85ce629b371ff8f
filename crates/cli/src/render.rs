//! Rendering of engine results as tables, CSV or JSON.

use anyhow::Result;
use arrow::array::{ArrayRef, Float64Array, RecordBatch, StringArray, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::util::pretty::pretty_format_batches;
use std::io::Write;
use std::sync::Arc;
use survey_core::{Distribution, Question};

/// Longest question id shown in the structure table.
pub const MAX_LABEL_WIDTH: usize = 80;

/// Label shown for a distribution with no answers.
pub const NO_RESPONSES_LABEL: &str = "No responses";

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Pretty table output (default)
    #[default]
    Table,
}

/// Format a percentage with two decimals.
pub fn format_percentage(percentage: f64) -> String {
    format!("{percentage:.2}%")
}

/// Cut a label to `max` characters, marking the cut with `...`.
pub fn truncate_label(label: &str, max: usize) -> String {
    if label.chars().count() > max {
        let head: String = label.chars().take(max).collect();
        format!("{head}...")
    } else {
        label.to_string()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Build the Question / Type / Unique Values / Responses table.
pub fn structure_batch(questions: &[&Question]) -> Result<RecordBatch> {
    let schema = Schema::new(vec![
        Field::new("Question", DataType::Utf8, false),
        Field::new("Type", DataType::Utf8, false),
        Field::new("Unique Values", DataType::UInt64, false),
        Field::new("Responses", DataType::UInt64, false),
    ]);

    let ids: Vec<String> = questions
        .iter()
        .map(|q| truncate_label(&q.id, MAX_LABEL_WIDTH))
        .collect();
    let types: Vec<&str> = questions.iter().map(|q| q.question_type.code()).collect();
    let unique: Vec<u64> = questions.iter().map(|q| q.unique_value_count as u64).collect();
    let responses: Vec<u64> = questions.iter().map(|q| q.response_count as u64).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(ids)),
        Arc::new(StringArray::from(types)),
        Arc::new(UInt64Array::from(unique)),
        Arc::new(UInt64Array::from(responses)),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Build the Option / Percentage table.
///
/// Tables show `50.00%` text; CSV keeps a numeric column rounded to two
/// decimals. An empty distribution renders as a single "No responses" row.
pub fn distribution_batch(dist: &Distribution, format: OutputFormat) -> Result<RecordBatch> {
    let (options, percentages): (Vec<&str>, Vec<f64>) = if dist.is_empty() {
        (vec![NO_RESPONSES_LABEL], vec![0.0])
    } else {
        dist.entries()
            .iter()
            .map(|e| (e.option.as_str(), e.percentage))
            .unzip()
    };

    let percentage_column: (DataType, ArrayRef) = match format {
        OutputFormat::Csv => (
            DataType::Float64,
            Arc::new(Float64Array::from(
                percentages.into_iter().map(round2).collect::<Vec<_>>(),
            )),
        ),
        OutputFormat::Table | OutputFormat::Json => (
            DataType::Utf8,
            Arc::new(StringArray::from(
                percentages
                    .into_iter()
                    .map(format_percentage)
                    .collect::<Vec<_>>(),
            )),
        ),
    };

    let schema = Schema::new(vec![
        Field::new("Option", DataType::Utf8, false),
        Field::new("Percentage", percentage_column.0, false),
    ]);
    let columns: Vec<ArrayRef> = vec![Arc::new(StringArray::from(options)), percentage_column.1];
    Ok(RecordBatch::try_new(Arc::new(schema), columns)?)
}

/// Write a batch as CSV with a header row.
pub fn write_batch_csv<W: Write>(batch: &RecordBatch, writer: W) -> Result<()> {
    let mut csv_writer = arrow::csv::WriterBuilder::new()
        .with_header(true)
        .build(writer);
    csv_writer.write(batch)?;
    Ok(())
}

/// Print a batch as a pretty table or CSV.
pub fn print_batch(batch: &RecordBatch, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Csv => write_batch_csv(batch, std::io::stdout().lock()),
        OutputFormat::Table | OutputFormat::Json => {
            let formatted = pretty_format_batches(std::slice::from_ref(batch))?;
            println!("{formatted}");
            Ok(())
        }
    }
}

/// Print any serializable value as pretty JSON.
pub fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::Array;
    use survey_core::{compute_distribution, ColumnStats, QuestionType};
    use survey_sheet::Sheet;

    fn question(id: &str, question_type: QuestionType) -> Question {
        Question::new(
            id,
            id,
            question_type,
            &ColumnStats {
                response_count: 4,
                unique_value_count: 3,
            },
        )
    }

    fn q1_distribution(top_n: Option<usize>) -> Distribution {
        let table = Sheet::from_data(
            vec!["Q1"],
            vec![vec!["Option A"], vec!["Option B"], vec!["Option A"], vec!["Option C"]],
        )
        .unwrap();
        compute_distribution(&table, &question("Q1", QuestionType::SingleChoice), top_n).unwrap()
    }

    // ===== formatting helpers =====

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(50.0), "50.00%");
        assert_eq!(format_percentage(200.0 / 3.0), "66.67%");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("Q1", MAX_LABEL_WIDTH), "Q1");
        let long = "x".repeat(85);
        let cut = truncate_label(&long, MAX_LABEL_WIDTH);
        assert_eq!(cut.len(), 83);
        assert!(cut.ends_with("..."));
        assert_eq!(truncate_label(&"y".repeat(80), MAX_LABEL_WIDTH).len(), 80);
    }

    // ===== batches =====

    #[test]
    fn test_structure_batch() {
        let q1 = question("Q1", QuestionType::SingleChoice);
        let q2 = question("Q2", QuestionType::MultipleChoice);
        let batch = structure_batch(&[&q1, &q2]).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.schema().field(2).name(), "Unique Values");
        let types = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(types.value(1), "MC");

        let rendered = pretty_format_batches(&[batch]).unwrap().to_string();
        assert!(rendered.contains("Unique Values"));
        assert!(rendered.contains("Q2"));
    }

    #[test]
    fn test_distribution_batch_table() {
        let batch = distribution_batch(&q1_distribution(Some(1)), OutputFormat::Table).unwrap();
        let options = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        let percentages = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options.value(0), "Option A");
        assert_eq!(options.value(1), "Others");
        assert_eq!(percentages.value(0), "50.00%");
        assert_eq!(percentages.value(1), "50.00%");
    }

    #[test]
    fn test_distribution_batch_csv() {
        let batch = distribution_batch(&q1_distribution(None), OutputFormat::Csv).unwrap();
        let mut out = Vec::new();
        write_batch_csv(&batch, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Option,Percentage");
        assert!(lines[1].starts_with("Option A,50"));
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn test_empty_distribution_shows_no_responses() {
        let table = Sheet::from_data(vec!["Q1"], Vec::<Vec<&str>>::new()).unwrap();
        let dist =
            compute_distribution(&table, &question("Q1", QuestionType::SingleChoice), Some(10))
                .unwrap();
        let batch = distribution_batch(&dist, OutputFormat::Table).unwrap();
        let options = batch
            .column(0)
            .as_any()
            .downcast_ref::<StringArray>()
            .unwrap();
        assert_eq!(batch.num_rows(), 1);
        assert_eq!(options.value(0), NO_RESPONSES_LABEL);
    }
}
