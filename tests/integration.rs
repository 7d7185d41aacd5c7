//! Integration tests for ChurnForge

use churnforge::{
    clean, encode, evaluate, fit, fit_schema, load_raw_table, split, ColumnRoles, Hyperparameters,
    LogisticModel, PipelineError,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn roles(numeric: &[&str]) -> ColumnRoles {
    ColumnRoles {
        identifier: "customer_id".to_string(),
        label: "churn".to_string(),
        numeric: numeric.iter().map(|c| c.to_string()).collect(),
    }
}

/// Ten customers with one numeric feature x = 0..9 and churn = 1 iff x >= 5.
fn create_separable_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customer_id,x,churn").unwrap();
    for i in 0..10 {
        writeln!(file, "{},{},{}", i + 1, i, u8::from(i >= 5)).unwrap();
    }
    file
}

/// A small telco-style table with a categorical contract column.
fn create_telco_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Customer_ID,Age,Monthly_Charges,Contract,Churn").unwrap();
    writeln!(file, "c01,34,70.5,monthly,0").unwrap();
    writeln!(file, "c02,45,80.0,yearly,0").unwrap();
    writeln!(file, "c03,51,65.2,monthly,1").unwrap();
    writeln!(file, "c04,29,55.0,two_year,0").unwrap();
    writeln!(file, "c05,60,95.9,monthly,1").unwrap();
    writeln!(file, "c06,41,72.3,yearly,1").unwrap();
    writeln!(file, "c07,38,60.1,monthly,0").unwrap();
    writeln!(file, "c08,55,88.8,yearly,1").unwrap();
    writeln!(file, "c09,23,45.0,two_year,0").unwrap();
    writeln!(file, "c10,47,77.7,monthly,1").unwrap();
    file
}

#[test]
fn test_end_to_end_separable_scenario() {
    let file = create_separable_csv();
    let raw = load_raw_table(file.path()).unwrap();
    let (dataset, report) = clean(&raw, &roles(&["x"])).unwrap();
    assert_eq!(report.rows_after_dedup, 10);

    let schema = fit_schema(&dataset);
    assert_eq!(schema.column_names(), vec!["x"]);

    let matrix = encode(&dataset, &schema).unwrap();
    let (train, test) = split(&matrix, 0.3, 42).unwrap();

    // round(10 * 0.3) = 3 rows held out
    assert_eq!(train.n_rows(), 7);
    assert_eq!(test.n_rows(), 3);
    // The seeded permutation is part of the crate's contract: the same
    // (n, test_fraction, seed) picks these rows on every machine
    assert_eq!(test.features.column(0).to_vec(), vec![1.0, 6.0, 2.0]);
    assert_eq!(test.labels.to_vec(), vec![0.0, 1.0, 0.0]);

    let hyperparameters = Hyperparameters {
        max_iterations: 200,
        regularization_strength: 1.0,
    };
    let model = fit(&train, &schema, &hyperparameters).unwrap();
    assert!(model.converged);

    // The data is perfectly separable by x, so the held-out rows must all
    // be classified correctly
    let (metrics, curve) = evaluate(&model, &test).unwrap();
    assert_eq!(metrics.accuracy, 1.0);
    assert_eq!(metrics.precision, 1.0);
    assert_eq!(metrics.recall, 1.0);
    assert_eq!(metrics.f1_score, 1.0);
    assert_eq!(metrics.roc_auc, 1.0);

    let last = curve.points.last().unwrap();
    assert_eq!(
        (last.false_positive_rate, last.true_positive_rate),
        (1.0, 1.0)
    );
}

#[test]
fn test_split_is_deterministic_across_calls() {
    let file = create_telco_csv();
    let raw = load_raw_table(file.path()).unwrap();
    let (dataset, _) = clean(&raw, &roles(&["age", "monthly_charges"])).unwrap();
    let schema = fit_schema(&dataset);
    let matrix = encode(&dataset, &schema).unwrap();

    let (train_a, test_a) = split(&matrix, 0.3, 7).unwrap();
    let (train_b, test_b) = split(&matrix, 0.3, 7).unwrap();
    assert_eq!(train_a, train_b);
    assert_eq!(test_a, test_b);
}

#[test]
fn test_full_telco_pipeline_with_categoricals() {
    let file = create_telco_csv();
    let raw = load_raw_table(file.path()).unwrap();
    let table_roles = roles(&["age", "monthly_charges"]);
    let (dataset, _) = clean(&raw, &table_roles).unwrap();

    let schema = fit_schema(&dataset);
    // "monthly" is the first-seen contract and becomes the baseline
    assert_eq!(
        schema.column_names(),
        vec![
            "age",
            "monthly_charges",
            "contract_yearly",
            "contract_two_year"
        ]
    );

    let matrix = encode(&dataset, &schema).unwrap();
    let (train, test) = split(&matrix, 0.3, 42).unwrap();

    let model = fit(
        &train,
        &schema,
        &Hyperparameters {
            max_iterations: 100,
            regularization_strength: 1.0,
        },
    )
    .unwrap();

    let (metrics, curve) = evaluate(&model, &test).unwrap();

    // Confusion counts must partition the test rows, so accuracy is a
    // well-defined proportion
    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!((0.0..=1.0).contains(&metrics.precision));
    assert!((0.0..=1.0).contains(&metrics.recall));
    assert!((0.0..=1.0).contains(&metrics.f1_score));
    assert!(metrics.roc_auc.is_nan() || (0.0..=1.0).contains(&metrics.roc_auc));

    for w in curve.points.windows(2) {
        assert!(w[1].threshold < w[0].threshold);
        assert!(w[1].false_positive_rate >= w[0].false_positive_rate);
        assert!(w[1].true_positive_rate >= w[0].true_positive_rate);
    }
}

#[test]
fn test_schema_alignment_for_later_inference() {
    let file = create_telco_csv();
    let raw = load_raw_table(file.path()).unwrap();
    let table_roles = roles(&["age", "monthly_charges"]);
    let (dataset, _) = clean(&raw, &table_roles).unwrap();
    let schema = fit_schema(&dataset);

    // New customers with a contract type never seen at fit time
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Customer_ID,Age,Monthly_Charges,Contract,Churn").unwrap();
    writeln!(file, "n01,31,62.0,weekly,0").unwrap();
    writeln!(file, "n02,58,91.0,yearly,1").unwrap();
    let raw = load_raw_table(file.path()).unwrap();
    let (fresh, _) = clean(&raw, &table_roles).unwrap();

    let matrix = encode(&fresh, &schema).unwrap();
    assert_eq!(matrix.features.shape(), &[2, schema.len()]);
    // "weekly" maps to all-zero contract indicators
    assert_eq!(matrix.features.row(0).to_vec(), vec![31.0, 62.0, 0.0, 0.0]);
    assert_eq!(matrix.features.row(1).to_vec(), vec![58.0, 91.0, 1.0, 0.0]);
}

#[test]
fn test_model_artifact_round_trip() {
    let file = create_telco_csv();
    let raw = load_raw_table(file.path()).unwrap();
    let (dataset, _) = clean(&raw, &roles(&["age", "monthly_charges"])).unwrap();
    let schema = fit_schema(&dataset);
    let matrix = encode(&dataset, &schema).unwrap();
    let (train, test) = split(&matrix, 0.3, 42).unwrap();

    let model = fit(
        &train,
        &schema,
        &Hyperparameters {
            max_iterations: 100,
            regularization_strength: 1.0,
        },
    )
    .unwrap();

    let restored = LogisticModel::from_bytes(&model.to_bytes().unwrap()).unwrap();
    assert_eq!(model, restored);
    assert!(restored.check_schema(&schema).is_ok());

    // The restored model scores the held-out rows identically
    let (metrics_a, _) = evaluate(&model, &test).unwrap();
    let (metrics_b, _) = evaluate(&restored, &test).unwrap();
    assert_eq!(metrics_a, metrics_b);
}

#[test]
fn test_restored_model_rejects_foreign_schema() {
    let file = create_telco_csv();
    let raw = load_raw_table(file.path()).unwrap();
    let (dataset, _) = clean(&raw, &roles(&["age", "monthly_charges"])).unwrap();
    let schema = fit_schema(&dataset);
    let matrix = encode(&dataset, &schema).unwrap();
    let (train, _) = split(&matrix, 0.3, 42).unwrap();

    let model = fit(
        &train,
        &schema,
        &Hyperparameters {
            max_iterations: 100,
            regularization_strength: 1.0,
        },
    )
    .unwrap();
    let restored = LogisticModel::from_bytes(&model.to_bytes().unwrap()).unwrap();

    // A schema fit without the categorical column has different columns
    let narrow_roles = roles(&["age", "monthly_charges"]);
    let (narrow, _) = clean(&raw, &narrow_roles).unwrap();
    let mut narrow = narrow;
    let contract_idx = narrow.attribute_index("contract").unwrap();
    narrow.attributes.remove(contract_idx);
    for record in &mut narrow.records {
        record.values.remove(contract_idx);
    }
    let foreign_schema = fit_schema(&narrow);

    let err = restored.check_schema(&foreign_schema).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<PipelineError>(),
        Some(PipelineError::SchemaMismatch(_))
    ));
}

#[test]
fn test_cleaning_reports_row_deltas() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "customer_id,age,monthly_charges,contract,churn").unwrap();
    writeln!(file, "c1,34,70.5,monthly,0").unwrap();
    writeln!(file, "c2,not_a_number,80.0,yearly,1").unwrap();
    writeln!(file, "c3,51,65.2,monthly,maybe").unwrap();
    writeln!(file, "c1,34,70.5,monthly,0").unwrap();
    writeln!(file, "c4,29,55.0,two_year,1").unwrap();

    let raw = load_raw_table(file.path()).unwrap();
    let (dataset, report) = clean(&raw, &roles(&["age", "monthly_charges"])).unwrap();

    assert_eq!(report.rows_loaded, 5);
    assert_eq!(report.rows_after_missing_drop, 3);
    assert_eq!(report.rows_after_dedup, 2);
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.labels(), vec![0, 1]);
}
