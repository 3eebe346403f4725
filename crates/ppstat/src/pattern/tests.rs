use super::*;
use crate::error::Error;
use nalgebra::{vector, Vector2};

fn unit_square() -> Window {
    Window::new(0.0, 1.0, 0.0, 1.0).unwrap()
}

#[test]
fn degenerate_windows_are_rejected() {
    assert!(matches!(
        Window::new(0.0, 0.0, 0.0, 1.0),
        Err(Error::DegenerateWindow { .. })
    ));
    assert!(matches!(
        Window::new(0.0, 1.0, 2.0, 1.0),
        Err(Error::DegenerateWindow { .. })
    ));
    assert!(matches!(
        Window::new(f64::NAN, 1.0, 0.0, 1.0),
        Err(Error::DegenerateWindow { .. })
    ));
    // finite bounds whose extent overflows
    assert!(matches!(
        Window::new(-1e308, 1e308, 0.0, 1.0),
        Err(Error::DegenerateWindow { .. })
    ));
    assert!(matches!(
        Window::new(0.0, 1e200, 0.0, 1e200),
        Err(Error::DegenerateWindow { .. })
    ));
}

#[test]
fn windows_load_through_validation() {
    let w = Window::new(-2.0, 3.0, 1.0, 4.5).unwrap();
    let text = serde_json::to_string(&w).unwrap();
    let back: Window = serde_json::from_str(&text).unwrap();
    assert_eq!(back, w);

    let err = serde_json::from_str::<Window>(r#"{"xmin": 1, "xmax": 0, "ymin": 0, "ymax": 1}"#)
        .unwrap_err();
    assert!(err.to_string().contains("degenerate window"), "{err}");
}

#[test]
fn outside_points_fail_with_invalid_geometry() {
    let w = unit_square();
    let err = Pattern::new(vec![vector![0.5, 0.5], vector![1.5, 0.5]], w).unwrap_err();
    assert!(matches!(err, Error::InvalidGeometry { .. }));
    let err = Pattern::new(vec![vector![f64::INFINITY, 0.5]], w).unwrap_err();
    assert!(matches!(err, Error::InvalidGeometry { .. }));
}

#[test]
fn boundary_points_within_tolerance_are_clamped() {
    let w = unit_square();
    let p = Pattern::new(vec![vector![1.0 + 1e-12, 0.0], vector![0.0, -1e-10]], w).unwrap();
    assert_eq!(p.points()[0], vector![1.0, 0.0]);
    assert_eq!(p.points()[1], vector![0.0, 0.0]);

    // a larger tolerance admits points that the default rejects
    let far = vec![vector![1.001, 0.5]];
    assert!(Pattern::new(far.clone(), w).is_err());
    let cfg = PatternCfg { tolerance: 0.01 };
    assert!(Pattern::with_cfg(far, w, cfg).is_ok());
}

#[test]
fn intensity_is_count_over_area() {
    let w = Window::new(0.0, 10.0, 0.0, 5.0).unwrap();
    let pts: Vec<Vector2<f64>> = (0..25).map(|k| vector![k as f64 * 0.4, 2.0]).collect();
    let p = Pattern::new(pts, w).unwrap();
    assert!((p.intensity().unwrap() - 0.5).abs() < 1e-15);
}

#[test]
fn columns_must_have_equal_length() {
    let w = unit_square();
    let p = Pattern::from_columns(&[0.1, 0.2], &[0.3, 0.4], w).unwrap();
    assert_eq!(p.len(), 2);
    assert!(Pattern::from_columns(&[0.1], &[0.3, 0.4], w).is_err());
}

#[test]
fn boundary_distance_is_min_over_edges() {
    let w = Window::new(0.0, 4.0, 0.0, 2.0).unwrap();
    assert!((w.boundary_distance(vector![1.0, 1.0]) - 1.0).abs() < 1e-15);
    assert!((w.boundary_distance(vector![3.5, 1.0]) - 0.5).abs() < 1e-15);
    assert!((w.boundary_distance(vector![2.0, 1.9]) - 0.1).abs() < 1e-12);
    assert_eq!(w.boundary_distance(vector![0.0, 1.0]), 0.0);
}

#[test]
fn marks_must_match_points() {
    let w = unit_square();
    let p = Pattern::new(vec![vector![0.2, 0.2], vector![0.8, 0.8]], w).unwrap();
    assert!(matches!(
        MarkedPattern::new(p.clone(), vec![1.0]),
        Err(Error::InvalidMarks { .. })
    ));
    assert!(matches!(
        MarkedPattern::new(p.clone(), vec![1.0, f64::NAN]),
        Err(Error::InvalidMarks { .. })
    ));
    let m = MarkedPattern::new(p, vec![1.0, 3.0]).unwrap();
    assert!((m.mean_mark().unwrap() - 2.0).abs() < 1e-15);
}
