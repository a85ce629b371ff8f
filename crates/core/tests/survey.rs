use std::path::{Path, PathBuf};
use survey_core::{
    Analyzer, AnalyzerOptions, InferenceOptions, LoadOptions, QuestionType, Session, SurveyError,
    TypeSourceKind, OTHERS_LABEL,
};
use survey_sheet::{Book, CellValue, Sheet};
use tempfile::{tempdir, TempDir};

const EPS: f64 = 1e-9;

fn write_schema_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("survey_results.xlsx");
    let mut book = Book::new();
    book.add_sheet(
        "schema",
        Sheet::from_data(
            vec!["column", "question_text", "type"],
            vec![
                vec!["Q1", "Test question 1?", "SC"],
                vec!["Q2", "Test multiple-choice question?", "MC"],
                vec!["Q3", "Another test question?", "SC"],
            ],
        )
        .unwrap(),
    )
    .unwrap();
    book.add_sheet(
        "raw data",
        Sheet::from_data(
            vec!["ResponseId", "Q1", "Q2", "Q3"],
            vec![
                vec![
                    CellValue::Int(1),
                    "Option A".into(),
                    "Option X;Option Y".into(),
                    "Yes".into(),
                ],
                vec![CellValue::Int(2), "Option B".into(), "Option Z".into(), "No".into()],
                vec![CellValue::Int(3), "Option A".into(), "Option X".into(), "Yes".into()],
                vec![
                    CellValue::Int(4),
                    "Option C".into(),
                    "Option Y;Option Z".into(),
                    "Yes".into(),
                ],
            ],
        )
        .unwrap(),
    )
    .unwrap();
    book.save_as_xlsx(&path).unwrap();
    path
}

fn write_inferred_workbook(dir: &Path) -> PathBuf {
    let path = dir.join("responses.xlsx");
    let sheet = Sheet::from_data(
        vec!["ResponseId", "Country", "Languages", "YearsCode", "EmptyColumn"],
        vec![
            vec![
                CellValue::Int(1),
                "USA".into(),
                "Python;JavaScript".into(),
                CellValue::Int(5),
                CellValue::Null,
            ],
            vec![
                CellValue::Int(2),
                "UK".into(),
                "Python".into(),
                CellValue::Int(3),
                CellValue::Null,
            ],
            vec![
                CellValue::Int(3),
                "Canada".into(),
                "JavaScript;Java".into(),
                CellValue::Int(7),
                CellValue::Null,
            ],
            vec![
                CellValue::Int(4),
                "USA".into(),
                "Python;Java".into(),
                CellValue::Int(2),
                CellValue::Null,
            ],
            vec![
                CellValue::Int(5),
                "UK".into(),
                "JavaScript".into(),
                CellValue::Int(4),
                CellValue::Null,
            ],
        ],
    )
    .unwrap();
    sheet.save_as_xlsx(&path).unwrap();
    path
}

fn schema_analyzer() -> (TempDir, Analyzer) {
    let dir = tempdir().unwrap();
    let path = write_schema_workbook(dir.path());
    let analyzer = Analyzer::open(&path, &AnalyzerOptions::default()).unwrap();
    (dir, analyzer)
}

fn inferred_analyzer() -> (TempDir, Analyzer) {
    let dir = tempdir().unwrap();
    let path = write_inferred_workbook(dir.path());
    let analyzer = Analyzer::open(&path, &AnalyzerOptions::default()).unwrap();
    (dir, analyzer)
}

// ===== Schema-driven workbook =====

#[test]
fn test_schema_catalog() {
    let (_dir, analyzer) = schema_analyzer();

    let ids: Vec<&str> = analyzer.questions().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, vec!["Q1", "Q2", "Q3"]);
    assert_eq!(analyzer.question("Q1").unwrap().question_type, QuestionType::SingleChoice);
    assert_eq!(analyzer.question("Q2").unwrap().question_type, QuestionType::MultipleChoice);
    assert_eq!(analyzer.question("Q3").unwrap().text, "Another test question?");
    assert_eq!(analyzer.sheets().len(), 2);
}

#[test]
fn test_schema_single_choice_distribution() {
    let (_dir, analyzer) = schema_analyzer();
    let dist = analyzer.distribution("Q1", None, None).unwrap();

    assert_eq!(dist.entries()[0].option, "Option A");
    assert!((dist.percentage_of("Option A").unwrap() - 50.0).abs() < EPS);
    assert!((dist.percentage_of("Option B").unwrap() - 25.0).abs() < EPS);
    assert!((dist.percentage_of("Option C").unwrap() - 25.0).abs() < EPS);
    assert!((dist.total_percentage() - 100.0).abs() < EPS);
}

#[test]
fn test_schema_multiple_choice_distribution() {
    let (_dir, analyzer) = schema_analyzer();
    let dist = analyzer.distribution("Q2", None, None).unwrap();

    assert_eq!(dist.denominator, 4);
    for option in ["Option X", "Option Y", "Option Z"] {
        assert!((dist.percentage_of(option).unwrap() - 50.0).abs() < EPS);
    }
}

#[test]
fn test_schema_subset_preserves_rows_and_columns() {
    let (_dir, analyzer) = schema_analyzer();
    let subset = analyzer.create_subset("Q1", "Option A").unwrap();

    assert_eq!(subset.len(), 2);
    assert_eq!(subset.rows().columns(), analyzer.table().columns());
    let ids: Vec<String> = subset
        .rows()
        .column("ResponseId")
        .unwrap()
        .map(CellValue::as_str)
        .collect();
    assert_eq!(ids, vec!["1", "3"]);
}

#[test]
fn test_schema_search() {
    let (_dir, analyzer) = schema_analyzer();

    let hits = analyzer.search_questions("multiple").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "Q2");

    assert_eq!(
        analyzer.search_options("Q2", None).unwrap(),
        vec!["Option X", "Option Y", "Option Z"]
    );
}

#[test]
fn test_strict_distribution_type_mismatch() {
    let (_dir, analyzer) = schema_analyzer();
    assert!(analyzer.multiple_choice_distribution("Q2", None, None).is_ok());
    assert!(matches!(
        analyzer.single_choice_distribution("Q2", None, None),
        Err(SurveyError::TypeMismatch { .. })
    ));
}

// ===== Inferred workbook =====

#[test]
fn test_inferred_structure() {
    let (_dir, analyzer) = inferred_analyzer();

    let catalog = analyzer.catalog();
    assert_eq!(catalog.len(), 4);
    assert!(!catalog.contains("ResponseId"));

    let country = analyzer.question("Country").unwrap();
    assert_eq!(country.question_type, QuestionType::SingleChoice);
    assert_eq!(country.unique_value_count, 3);
    assert_eq!(country.response_count, 5);

    assert_eq!(
        analyzer.question("Languages").unwrap().question_type,
        QuestionType::MultipleChoice
    );
    assert_eq!(
        analyzer.question("EmptyColumn").unwrap().question_type,
        QuestionType::Empty
    );
}

#[test]
fn test_inferred_distributions() {
    let (_dir, analyzer) = inferred_analyzer();

    let country = analyzer.distribution("Country", None, None).unwrap();
    assert!((country.percentage_of("USA").unwrap() - 40.0).abs() < EPS);
    assert!((country.percentage_of("UK").unwrap() - 40.0).abs() < EPS);
    assert!((country.percentage_of("Canada").unwrap() - 20.0).abs() < EPS);
    // ties ordered by option
    let order: Vec<&str> = country.entries().iter().map(|e| e.option.as_str()).collect();
    assert_eq!(order, vec!["UK", "USA", "Canada"]);

    let languages = analyzer.distribution("Languages", None, None).unwrap();
    assert!((languages.percentage_of("Python").unwrap() - 60.0).abs() < EPS);
    assert!((languages.percentage_of("JavaScript").unwrap() - 60.0).abs() < EPS);
    assert!((languages.percentage_of("Java").unwrap() - 40.0).abs() < EPS);

    let empty = analyzer.distribution("EmptyColumn", None, Some(10)).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_inferred_top_n() {
    let (_dir, analyzer) = inferred_analyzer();
    let dist = analyzer.distribution("Country", None, Some(2)).unwrap();

    assert_eq!(dist.len(), 3);
    let others = dist.others().unwrap();
    assert_eq!(others.option, OTHERS_LABEL);
    assert!((others.percentage - 20.0).abs() < EPS);
}

#[test]
fn test_inferred_subsets() {
    let (_dir, analyzer) = inferred_analyzer();

    let usa = analyzer.create_subset("Country", "USA").unwrap();
    assert_eq!(usa.len(), 2);

    let python = analyzer.create_subset("Languages", "Python").unwrap();
    assert_eq!(python.len(), 3);

    let dist = analyzer.distribution("Languages", Some(&usa), None).unwrap();
    assert_eq!(dist.denominator, 2);
    assert!((dist.percentage_of("Python").unwrap() - 100.0).abs() < EPS);
}

#[test]
fn test_inferred_search() {
    let (_dir, analyzer) = inferred_analyzer();

    let hits = analyzer.search_questions("year").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, "YearsCode");

    assert_eq!(
        analyzer.search_options("Languages", Some("Java")).unwrap(),
        vec!["Java", "JavaScript"]
    );
    assert_eq!(
        analyzer.search_options("Country", Some("U")).unwrap(),
        vec!["UK", "USA"]
    );
    assert!(matches!(
        analyzer.search_options("Salary", None),
        Err(SurveyError::UnknownQuestion(_))
    ));
}

#[test]
fn test_numeric_answers_match_as_text() {
    let (_dir, analyzer) = inferred_analyzer();
    let subset = analyzer.create_subset("YearsCode", "5").unwrap();
    assert_eq!(subset.len(), 1);
}

// ===== Sessions and options =====

#[test]
fn test_session_flow() {
    let (_dir, analyzer) = inferred_analyzer();
    let mut session = Session::new(&analyzer);

    assert!(matches!(
        session.distribution("Languages", None, true),
        Err(SurveyError::NoActiveSubset)
    ));

    session.create_subset("Country", "UK").unwrap();
    let dist = session.distribution("Languages", None, true).unwrap();
    assert_eq!(dist.denominator, 2);
    assert!((dist.percentage_of("JavaScript").unwrap() - 50.0).abs() < EPS);

    session.clear_subset();
    assert_eq!(session.distribution("Languages", None, false).unwrap().denominator, 5);
}

#[test]
fn test_schema_workbook_inferred_on_request() {
    let dir = tempdir().unwrap();
    let path = write_schema_workbook(dir.path());
    let options = AnalyzerOptions::default()
        .with_load(LoadOptions::default().with_type_source(TypeSourceKind::Inferred))
        .with_inference(InferenceOptions::default());
    let analyzer = Analyzer::open(&path, &options).unwrap();

    assert_eq!(analyzer.question("Q1").unwrap().text, "Q1");
    assert_eq!(
        analyzer.question("Q2").unwrap().question_type,
        QuestionType::MultipleChoice
    );
}

#[test]
fn test_open_missing_file() {
    let result = Analyzer::open("no/such/survey.xlsx", &AnalyzerOptions::default());
    assert!(matches!(result, Err(SurveyError::FileNotFound { .. })));
}
