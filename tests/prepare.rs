use approx::assert_abs_diff_eq;
use mfccprep::prepare::{prepare, ImputeStrategy, LabelColumn, PrepareOptions};
use mfccprep::types::RawTable;
use mfccprep::PipelineError;
use ndarray::Axis;

const ARTISTS: [&str; 3] = ["zappa", "bach", "miles"];

fn labelled_table(rows: usize) -> RawTable {
    RawTable {
        header: None,
        records: (0..rows)
            .map(|idx| {
                let x = idx as f64;
                vec![
                    format!("{}", x * 1.5),
                    format!("{}", 10.0 - x),
                    format!("{}", (x * 0.7).sin()),
                    ARTISTS[idx % ARTISTS.len()].to_string(),
                ]
            })
            .collect(),
    }
}

#[test]
fn encoding_is_a_bijection_over_sorted_classes() {
    let table = labelled_table(12);
    let prepared = prepare(&table, &PrepareOptions::default()).unwrap();

    assert_eq!(prepared.encoder.classes(), &["bach", "miles", "zappa"]);
    let decoded = prepared
        .encoder
        .inverse_transform(prepared.labels.as_slice().unwrap())
        .unwrap();
    let original: Vec<String> = table.records.iter().map(|r| r[3].clone()).collect();
    assert_eq!(decoded, original);
}

#[test]
fn split_is_deterministic_for_a_seed() {
    let table = labelled_table(20);
    let options = PrepareOptions {
        seed: 11,
        ..PrepareOptions::default()
    };
    let first = prepare(&table, &options).unwrap();
    let second = prepare(&table, &options).unwrap();
    assert_eq!(first.split, second.split);
    assert_eq!(first.x_test(), second.x_test());
    assert_eq!(first.split.test.len(), 4);
    assert_eq!(first.split.train.len(), 16);
}

#[test]
fn scaled_columns_are_centred_with_unit_variance() {
    let prepared = prepare(&labelled_table(15), &PrepareOptions::default()).unwrap();
    for column in prepared.features.axis_iter(Axis(1)) {
        assert_abs_diff_eq!(column.mean().unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(column.std(0.0), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn median_imputation_fills_every_gap() {
    let mut table = labelled_table(6);
    table.records[0][1] = String::new();
    table.records[4][1] = "n/a".into();
    table.records[2][0] = "NaN".into();

    let options = PrepareOptions {
        imputation: ImputeStrategy::Median,
        ..PrepareOptions::default()
    };
    let prepared = prepare(&table, &options).unwrap();
    assert_eq!(prepared.missing_before, 3);
    assert_eq!(prepared.missing_after, 0);
    // column 1 present values: 9, 8, 7, 5
    assert_abs_diff_eq!(prepared.imputer.fill_values()[1], 7.5);
    assert!(prepared.features.iter().all(|v| v.is_finite()));
}

#[test]
fn named_label_column_may_sit_anywhere() {
    let table = RawTable {
        header: Some(vec!["artist".into(), "mean_0".into(), "std_0".into()]),
        records: vec![
            vec!["a".into(), "1".into(), "2".into()],
            vec!["b".into(), "3".into(), "5".into()],
            vec!["a".into(), "5".into(), "1".into()],
            vec!["b".into(), "7".into(), "0".into()],
        ],
    };
    let options = PrepareOptions {
        label_column: LabelColumn::Named("artist".into()),
        test_fraction: 0.25,
        ..PrepareOptions::default()
    };
    let prepared = prepare(&table, &options).unwrap();
    assert_eq!(prepared.feature_names, vec!["mean_0", "std_0"]);
    assert_eq!(prepared.labels.to_vec(), vec![0, 1, 0, 1]);
    assert_eq!(prepared.split.test.len(), 1);
}

#[test]
fn ragged_rows_are_rejected() {
    let mut table = labelled_table(5);
    table.records[3].pop();
    assert!(matches!(
        prepare(&table, &PrepareOptions::default()),
        Err(PipelineError::ShapeMismatch { .. })
    ));
}

#[test]
fn single_row_cannot_be_split() {
    assert!(matches!(
        prepare(&labelled_table(1), &PrepareOptions::default()),
        Err(PipelineError::Split { rows: 1, .. })
    ));
}
