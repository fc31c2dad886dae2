//! Integration tests for the qpsvm library
//!
//! These tests verify end-to-end behaviour across the kernel, solver,
//! trainer and persistence modules.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{array, Array1, Array2};
use qpsvm::api::{quick, SVM};
use qpsvm::core::{GammaMode, KernelType, SVMConfig, SVMError, SVMModel};
use qpsvm::kernel::KernelFunction;
use qpsvm::persistence::SerializableModel;
use qpsvm::solver::SolverFailure;
use tempfile::NamedTempFile;

/// Ten points around (1, 1) labelled +1 and ten around (-1, -1) labelled -1
fn two_clusters() -> (Array2<f64>, Array1<f64>) {
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for i in 0..10 {
        let dx = 0.1 * (i % 3) as f64 - 0.1;
        let dy = 0.05 * (i % 4) as f64 - 0.075;
        rows.extend_from_slice(&[1.0 + dx, 1.0 + dy]);
        labels.push(1.0);
        rows.extend_from_slice(&[-1.0 - dy, -1.0 + dx]);
        labels.push(-1.0);
    }
    let x = Array2::from_shape_vec((20, 2), rows).expect("20x2");
    (x, Array1::from(labels))
}

/// The clusters plus one mislabelled point inside each
fn overlapping_clusters() -> (Array2<f64>, Array1<f64>) {
    let (x, y) = two_clusters();
    let mut rows: Vec<f64> = x.iter().copied().collect();
    let mut labels = y.to_vec();
    rows.extend_from_slice(&[0.9, 0.9, -0.9, -0.9]);
    labels.extend_from_slice(&[-1.0, 1.0]);
    let x = Array2::from_shape_vec((22, 2), rows).expect("22x2");
    (x, Array1::from(labels))
}

fn xor() -> (Array2<f64>, Array1<f64>) {
    let x = array![[1.0, 1.0], [-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0]];
    let y = array![1.0, 1.0, -1.0, -1.0];
    (x, y)
}

#[test]
fn test_kernel_symmetry() {
    let (x, _) = two_clusters();
    let config = SVMConfig::default();

    for kernel_type in [KernelType::Linear, KernelType::Rbf] {
        let config = SVMConfig {
            kernel: kernel_type,
            ..config.clone()
        };
        let kernel = KernelFunction::from_config(&config, x.view()).unwrap();
        let gram = kernel.compute(x.view(), x.view()).unwrap();
        assert_eq!(gram.dim(), (20, 20));

        for i in 0..20 {
            for j in 0..20 {
                assert_abs_diff_eq!(gram[[i, j]], gram[[j, i]], epsilon = 1e-12);
            }
            if kernel_type == KernelType::Rbf {
                assert_abs_diff_eq!(gram[[i, i]], 1.0, epsilon = 1e-12);
            }
        }
    }
}

#[test]
fn test_dual_feasibility() {
    let (x, y) = overlapping_clusters();

    for c in [0.5, 1.0, 10.0] {
        let mut svm = SVM::new().with_c(c);
        svm.fit(x.view(), y.view()).unwrap();
        let dual = svm.model().unwrap().dual().expect("trained here").clone();

        assert!(dual.iter().all(|&l| l >= 0.0));
        assert!(dual.iter().all(|&l| l <= c + 1e-9));
        let balance: f64 = dual.iter().zip(y.iter()).map(|(l, y)| l * y).sum();
        assert!(balance.abs() < 1e-4, "sum of y*lambda = {balance}");
    }
}

#[test]
fn test_hard_margin_separability() {
    let (x, y) = two_clusters();
    let mut svm = SVM::new().with_kernel(KernelType::Linear).with_c(0.0);
    svm.fit(x.view(), y.view()).unwrap();

    assert_eq!(svm.predict(x.view()).unwrap(), y);
    let probes = array![[2.0, 2.0], [-2.0, -2.0]];
    assert_eq!(svm.predict(probes.view()).unwrap(), array![1.0, -1.0]);

    // every support vector lies on the margin
    let model = svm.model().unwrap();
    let margins = model.decision_function(model.support_vectors().view()).unwrap();
    for (value, label) in margins.iter().zip(model.support_labels().iter()) {
        assert_abs_diff_eq!(value * label, 1.0, epsilon = 1e-2);
    }
}

#[test]
fn test_linear_equals_polynomial_degree_one() {
    let (x, y) = overlapping_clusters();

    let mut linear = SVM::new().with_c(1.0);
    linear.fit(x.view(), y.view()).unwrap();

    let mut poly = SVM::new()
        .with_kernel(KernelType::Polynomial)
        .with_degree(1)
        .with_coef(0.0)
        .with_c(1.0);
    poly.fit(x.view(), y.view()).unwrap();

    let probes = array![[2.0, 1.5], [-1.0, -3.0], [0.3, 0.8], [-0.5, 0.1]];
    let a = linear.decision_function(probes.view()).unwrap();
    let b = poly.decision_function(probes.view()).unwrap();
    for (a, b) in a.iter().zip(b.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-2);
    }
    assert_eq!(
        linear.predict(probes.view()).unwrap(),
        poly.predict(probes.view()).unwrap()
    );
}

/// Two points per class, far enough apart that tanh saturates
fn four_points() -> (Array2<f64>, Array1<f64>) {
    let x = array![[2.0, 1.0], [1.5, 2.0], [-2.0, -1.0], [-1.0, -2.5]];
    (x, array![1.0, 1.0, -1.0, -1.0])
}

#[test]
fn test_sigmoid_recovers_training_labels() {
    let (x, y) = four_points();
    let cases = [
        (GammaMode::Scale, 1.0),
        (GammaMode::Auto, 1.0),
        (GammaMode::Scale, 0.0),
        (GammaMode::Auto, 0.0),
    ];

    for (gamma, c) in cases {
        let mut svm = SVM::new()
            .with_kernel(KernelType::Sigmoid)
            .with_gamma(gamma)
            .with_c(c);
        svm.fit(x.view(), y.view())
            .unwrap_or_else(|e| panic!("sigmoid gamma={gamma} C={c} failed: {e}"));

        assert_eq!(svm.predict(x.view()).unwrap(), y, "gamma={gamma} C={c}");
        let info = svm.info().unwrap();
        assert!(info.sigma.is_some());
        assert!(info.n_support_vectors >= 2);
    }
}

#[test]
fn test_quadratic_kernel_recovers_training_labels() {
    let (x, y) = two_clusters();
    let mut svm = SVM::new()
        .with_kernel(KernelType::Polynomial)
        .with_degree(2)
        .with_coef(1.0)
        .with_c(1.0);
    svm.fit(x.view(), y.view()).unwrap();

    assert_eq!(svm.predict(x.view()).unwrap(), y);
    let probes = array![[1.5, 1.2], [-1.3, -0.8]];
    assert_eq!(svm.predict(probes.view()).unwrap(), array![1.0, -1.0]);
    assert!(svm.model().unwrap().weights().is_none());
}

#[test]
fn test_single_row_queries_check_width() {
    let (x, y) = four_points();
    for kernel in [KernelType::Linear, KernelType::Rbf] {
        let mut svm = SVM::new()
            .with_kernel(kernel)
            .with_gamma(GammaMode::Auto)
            .with_c(0.0);
        svm.fit(x.view(), y.view()).unwrap();
        let model = svm.model().unwrap();

        let wide = array![1.0, 0.0, 5.0];
        assert!(matches!(
            model.predict_one(wide.view()),
            Err(SVMError::InvalidShape(_))
        ));
        assert!(matches!(
            model.decision_value(wide.view()),
            Err(SVMError::InvalidShape(_))
        ));
        assert_eq!(model.predict_one(array![2.0, 1.0].view()).unwrap().label, 1.0);
    }
}

#[test]
fn test_predict_is_idempotent() {
    let (x, y) = overlapping_clusters();
    let mut svm = SVM::new().with_kernel(KernelType::Rbf).with_c(1.0);
    svm.fit(x.view(), y.view()).unwrap();

    let first = svm.decision_function(x.view()).unwrap();
    let second = svm.decision_function(x.view()).unwrap();
    assert_eq!(first, second);
    assert_eq!(svm.predict(x.view()).unwrap(), svm.predict(x.view()).unwrap());
}

#[test]
fn test_unfitted_guard() {
    let svm = SVM::new();
    let x = array![[1.0, 2.0]];
    assert!(matches!(svm.predict(x.view()), Err(SVMError::UnfittedModel)));
    assert!(matches!(
        svm.decision_function(x.view()),
        Err(SVMError::UnfittedModel)
    ));
    assert!(matches!(svm.info(), Err(SVMError::UnfittedModel)));
}

#[test]
fn test_threshold_never_grows_support_set() {
    let (x, y) = overlapping_clusters();
    let mut previous = usize::MAX;

    for epsilon in [1e-9, 1e-6, 1e-4, 1e-2, 0.5] {
        let mut svm = SVM::new().with_c(1.0).with_epsilon(epsilon);
        svm.fit(x.view(), y.view()).unwrap();
        let n_sv = svm.model().unwrap().n_support_vectors();
        assert!(n_sv <= previous, "epsilon={epsilon} grew the support set");
        assert!(n_sv >= 2);
        previous = n_sv;
    }
}

#[test]
fn test_hard_margin_xor_reports_solver_failure() {
    let (x, y) = xor();
    let mut svm = SVM::new().with_c(0.0).with_max_iterations(10_000);

    let result = svm.fit(x.view(), y.view());
    assert!(matches!(result, Err(SVMError::SolverFailure(_))));
    assert!(!svm.is_fitted());
}

#[test]
fn test_xor_iteration_limit_is_reported() {
    let (x, y) = xor();
    let mut svm = SVM::new().with_max_iterations(50);

    match svm.fit(x.view(), y.view()) {
        Err(SVMError::SolverFailure(SolverFailure::MaxIterations { iterations })) => {
            assert_eq!(iterations, 50)
        }
        Err(SVMError::SolverFailure(_)) => {}
        other => panic!("expected a solver failure, got {other:?}"),
    }
}

#[test]
fn test_rbf_solves_xor() {
    let (x, y) = xor();
    let svm = quick::train_rbf(x.view(), y.view(), 10.0).unwrap();
    assert_eq!(svm.predict(x.view()).unwrap(), y);

    let info = svm.info().unwrap();
    assert_eq!(info.n_support_vectors, 4);
    assert_relative_eq!(info.sigma.expect("rbf sigma"), 4.0);
}

#[test]
fn test_gamma_auto_uses_sample_count() {
    let (x, y) = two_clusters();
    let mut svm = SVM::new()
        .with_kernel(KernelType::Rbf)
        .with_gamma(GammaMode::Auto)
        .with_c(1.0);
    svm.fit(x.view(), y.view()).unwrap();

    assert_eq!(svm.info().unwrap().sigma, Some(20.0));
    assert_eq!(svm.predict(x.view()).unwrap(), y);
}

#[test]
fn test_refit_replaces_model() {
    let (x, y) = two_clusters();
    let mut svm = SVM::new().with_c(1.0);
    svm.fit(x.view(), y.view()).unwrap();

    let flipped = y.mapv(|v| -v);
    svm.fit(x.view(), flipped.view()).unwrap();
    assert_eq!(svm.predict(x.view()).unwrap(), flipped);
}

#[test]
fn test_holdout_accuracy() {
    let (x, y) = two_clusters();
    let config = SVMConfig {
        c: 1.0,
        ..SVMConfig::default()
    };
    let accuracy = quick::holdout_accuracy(x.view(), y.view(), config, 0.3, 42).unwrap();
    assert_eq!(accuracy, 1.0);
}

#[test]
fn test_persistence_roundtrip() {
    let (x, y) = overlapping_clusters();
    let mut svm = SVM::new()
        .with_kernel(KernelType::Polynomial)
        .with_degree(2)
        .with_coef(1.0)
        .with_c(1.0);
    svm.fit(x.view(), y.view()).unwrap();

    let temp_file = NamedTempFile::new().expect("Failed to create temp file");
    SerializableModel::from_trained_model(svm.model().unwrap(), svm.config(), None)
        .save_to_file(temp_file.path())
        .unwrap();

    let loaded = SerializableModel::load_from_file(temp_file.path()).unwrap();
    assert_eq!(loaded.config, *svm.config());
    let restored = loaded.to_trained_model().unwrap();

    assert_eq!(
        restored.n_support_vectors(),
        svm.model().unwrap().n_support_vectors()
    );
    assert_eq!(restored.predict(x.view()).unwrap(), svm.predict(x.view()).unwrap());
    assert!(restored.dual().is_none());
}
