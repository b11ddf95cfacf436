use outage_cohorts::figures::loess::{loess, CI_95};

#[test]
fn test_reproduces_a_line_exactly() {
    // A local linear fit through noiseless linear data is exact
    let points: Vec<(f64, f64)> = (0..20).map(|i| (i as f64, 2.0 * i as f64 + 1.0)).collect();
    let smoothed = loess(&points, 0.5).unwrap();

    assert_eq!(smoothed.len(), points.len());
    for p in &smoothed {
        assert!((p.fitted - (2.0 * p.x + 1.0)).abs() < 1e-8, "at x={}", p.x);
        assert!(p.std_err < 1e-8);
    }
}

#[test]
fn test_constant_data_fits_constant() {
    let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, 3.5)).collect();
    let smoothed = loess(&points, 0.8).unwrap();
    for p in &smoothed {
        assert!((p.fitted - 3.5).abs() < 1e-9);
    }
}

#[test]
fn test_output_is_sorted_by_x() {
    let points = vec![(3.0, 1.0), (1.0, 2.0), (2.0, 0.5), (0.0, 1.5), (4.0, 2.5)];
    let smoothed = loess(&points, 1.0).unwrap();
    for pair in smoothed.windows(2) {
        assert!(pair[0].x <= pair[1].x);
    }
}

#[test]
fn test_ribbon_brackets_the_fit() {
    let points: Vec<(f64, f64)> = (0..30)
        .map(|i| {
            let x = i as f64;
            // Deterministic wiggle around a trend so residuals are nonzero
            (x, x * 0.5 + if i % 2 == 0 { 1.0 } else { -1.0 })
        })
        .collect();
    let smoothed = loess(&points, 0.7).unwrap();

    let mut saw_positive_width = false;
    for p in &smoothed {
        assert!(p.lower() <= p.fitted);
        assert!(p.fitted <= p.upper());
        assert!((p.upper() - p.fitted - CI_95 * p.std_err).abs() < 1e-12);
        if p.std_err > 0.0 {
            saw_positive_width = true;
        }
    }
    assert!(saw_positive_width);
}

#[test]
fn test_too_few_points_is_an_error() {
    assert!(loess(&[(0.0, 1.0), (1.0, 2.0)], 0.5).is_err());
}

#[test]
fn test_span_must_be_a_fraction() {
    let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, i as f64)).collect();
    assert!(loess(&points, 0.0).is_err());
    assert!(loess(&points, 1.5).is_err());
    assert!(loess(&points, 1.0).is_ok());
}
