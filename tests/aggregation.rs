use approx::assert_abs_diff_eq;
use mfccprep::aggregation::{aggregate, statistics, Statistic, STATISTIC_COUNT};
use mfccprep::PipelineError;
use ndarray::{array, s, Array1, Array2, Axis};

fn block(features: &Array1<f64>, statistic: Statistic, rows: usize) -> Vec<f64> {
    let idx = Statistic::ALL
        .iter()
        .position(|s| *s == statistic)
        .expect("statistic listed");
    features.slice(s![idx * rows..(idx + 1) * rows]).to_vec()
}

#[test]
fn two_row_example_matches_hand_computation() {
    let matrix = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
    let features = aggregate(&matrix).unwrap();
    assert_eq!(features.len(), 22);

    let mean = block(&features, Statistic::Mean, 2);
    assert_abs_diff_eq!(mean[0], 2.0);
    assert_abs_diff_eq!(mean[1], 5.0);

    let std = block(&features, Statistic::StdDev, 2);
    assert_abs_diff_eq!(std[0], (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(std[1], (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);

    assert_eq!(block(&features, Statistic::Min, 2), vec![1.0, 4.0]);
    assert_eq!(block(&features, Statistic::Max, 2), vec![3.0, 6.0]);
    assert_eq!(block(&features, Statistic::Median, 2), vec![2.0, 5.0]);
    assert_eq!(block(&features, Statistic::Range, 2), vec![2.0, 2.0]);
    assert_eq!(block(&features, Statistic::Iqr, 2), vec![1.0, 1.0]);
    assert_eq!(block(&features, Statistic::Energy, 2), vec![14.0, 77.0]);

    let rms = block(&features, Statistic::Rms, 2);
    assert_abs_diff_eq!(rms[0], (14.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    assert_abs_diff_eq!(rms[1], (77.0_f64 / 3.0).sqrt(), epsilon = 1e-12);

    for value in block(&features, Statistic::Skewness, 2) {
        assert_abs_diff_eq!(value, 0.0, epsilon = 1e-12);
    }
    for value in block(&features, Statistic::Kurtosis, 2) {
        assert_abs_diff_eq!(value, -1.5, epsilon = 1e-12);
    }
}

#[test]
fn chunks_reproduce_per_row_statistics_in_order() {
    let matrix = array![
        [0.3, -1.2, 4.5, 2.2, 0.0],
        [10.0, 9.5, 11.0, 8.0, 12.5],
        [-3.0, -3.0, 1.0, 7.0, -0.5]
    ];
    let rows = matrix.nrows();
    let features = aggregate(&matrix).unwrap();
    assert_eq!(features.len(), STATISTIC_COUNT * rows);

    for (chunk_idx, chunk) in features.exact_chunks(rows).into_iter().enumerate() {
        let statistic = Statistic::ALL[chunk_idx];
        for (row_idx, row) in matrix.axis_iter(Axis(0)).enumerate() {
            let expected = statistic.evaluate(&row.to_vec());
            assert_abs_diff_eq!(chunk[row_idx], expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn column_permutation_leaves_statistics_unchanged() {
    let matrix = array![
        [0.5, 1.5, -2.0, 3.25, 0.0, 7.0],
        [2.0, 2.0, 2.5, -1.0, 4.0, 0.25]
    ];
    let order = [4, 0, 5, 2, 1, 3];
    let permuted = matrix.select(Axis(1), &order);

    let original = aggregate(&matrix).unwrap();
    let shuffled = aggregate(&permuted).unwrap();
    for (a, b) in original.iter().zip(shuffled.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-9);
    }
}

#[test]
fn single_frame_row_is_degenerate_but_defined() {
    let features = aggregate(&array![[3.0]]).unwrap();
    assert_eq!(block(&features, Statistic::StdDev, 1), vec![0.0]);
    assert_eq!(block(&features, Statistic::Range, 1), vec![0.0]);
    assert_eq!(block(&features, Statistic::Iqr, 1), vec![0.0]);
    assert!(block(&features, Statistic::Skewness, 1)[0].is_nan());
    assert!(block(&features, Statistic::Kurtosis, 1)[0].is_nan());
}

#[test]
fn nan_cells_are_omitted_only_from_shape_statistics() {
    let matrix = array![[0.0, f64::NAN, 0.0, 3.0]];
    let features = aggregate(&matrix).unwrap();
    assert!(block(&features, Statistic::Mean, 1)[0].is_nan());
    assert_abs_diff_eq!(
        block(&features, Statistic::Skewness, 1)[0],
        statistics::skewness(&[0.0, 0.0, 3.0]),
        epsilon = 1e-12
    );
}

#[test]
fn empty_time_axis_is_rejected() {
    let matrix = Array2::<f64>::zeros((13, 0));
    assert!(matches!(aggregate(&matrix), Err(PipelineError::EmptyMatrix)));
}
