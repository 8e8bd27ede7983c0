use qaoa_core::{RngHandle, TerminationStatus, VariationalOptimizer};
use qaoa_opt::objectives::sphere;
use qaoa_opt::{Cobyla, CobylaConfig};

#[test]
fn sphere_depth_two_respects_the_budget() {
    let optimizer = Cobyla::default();
    let mut rng = RngHandle::from_seed(7);
    let mut seen_depth = Vec::new();
    let result = optimizer
        .optimize(
            &mut |params: &[f64], depth: usize| {
                seen_depth.push(depth);
                assert_eq!(params.len(), 4);
                sphere(params)
            },
            2,
            &mut rng,
        )
        .unwrap();
    assert_eq!(result.x.len(), 4);
    assert!(result.nfev <= 30);
    assert_eq!(seen_depth.len(), result.nfev);
    assert!(seen_depth.iter().all(|&depth| depth == 2));
    assert!(result.fun < 5e-2, "fun = {}", result.fun);
}

#[test]
fn sphere_converges_with_a_larger_budget() {
    let optimizer = Cobyla::default().with_maxiter(500);
    let mut rng = RngHandle::from_seed(11);
    let result = optimizer
        .optimize(&mut |params: &[f64], _: usize| sphere(params), 2, &mut rng)
        .unwrap();
    assert_eq!(result.status, TerminationStatus::Converged);
    assert!(result.fun < 1e-8, "fun = {}", result.fun);
    let (x, fun, nfev) = result.into_triple();
    assert!(x.iter().all(|value| value.abs() < 1e-3));
    assert!(fun >= 0.0);
    assert!(nfev <= 500);
}

#[test]
fn starting_point_is_drawn_per_call() {
    let optimizer = Cobyla::default().with_maxiter(5);
    let mut rng = RngHandle::from_seed(3);

    let mut first_lengths = Vec::new();
    optimizer
        .optimize(
            &mut |params: &[f64], _: usize| {
                first_lengths.push(params.len());
                sphere(params)
            },
            1,
            &mut rng,
        )
        .unwrap();
    let mut second_lengths = Vec::new();
    let result = optimizer
        .optimize(
            &mut |params: &[f64], _: usize| {
                second_lengths.push(params.len());
                sphere(params)
            },
            3,
            &mut rng,
        )
        .unwrap();

    assert!(first_lengths.iter().all(|&len| len == 2));
    assert!(second_lengths.iter().all(|&len| len == 6));
    assert_eq!(result.x.len(), 6);
    assert_eq!(optimizer.config().initial_point, None);
}

#[test]
fn random_starts_lie_in_the_unit_interval() {
    let optimizer = Cobyla::default();
    let mut rng = RngHandle::from_seed(99);
    let start = optimizer.starting_point(4, &mut rng).unwrap();
    assert_eq!(start.len(), 8);
    assert!(start.iter().all(|value| (0.0..1.0).contains(value)));

    let again = optimizer
        .starting_point(4, &mut RngHandle::from_seed(99))
        .unwrap();
    assert_eq!(start, again);
}

#[test]
fn configured_start_is_used_verbatim() {
    let start = vec![0.25, -0.5];
    let optimizer = Cobyla::default().with_initial_point(start.clone());
    let mut points = Vec::new();
    optimizer
        .optimize(
            &mut |params: &[f64], _: usize| {
                points.push(params.to_vec());
                sphere(params)
            },
            1,
            &mut RngHandle::from_seed(0),
        )
        .unwrap();
    assert_eq!(points[0], start);
    assert_eq!(points[1], vec![1.25, -0.5]);
}

#[test]
fn configured_start_with_wrong_length_fails() {
    let optimizer = Cobyla::default().with_initial_point(vec![0.1, 0.2, 0.3]);
    let err = optimizer
        .optimize(
            &mut |params: &[f64], _: usize| sphere(params),
            2,
            &mut RngHandle::from_seed(0),
        )
        .unwrap_err();
    assert_eq!(err.code(), "dimension-mismatch");
    assert_eq!(err.info().context["expected"], "4");
}

#[test]
fn builder_matches_config() {
    let built = Cobyla::default()
        .with_maxiter(100)
        .with_disp(true)
        .with_rhobeg(0.5)
        .with_tol(None);
    let configured = Cobyla::new(CobylaConfig {
        maxiter: 100,
        disp: true,
        rhobeg: 0.5,
        tol: None,
        ..CobylaConfig::default()
    });
    assert_eq!(built, configured);
}

#[test]
fn depth_zero_evaluates_once() {
    let result = Cobyla::default()
        .optimize(
            &mut |params: &[f64], _: usize| {
                assert!(params.is_empty());
                1.5
            },
            0,
            &mut RngHandle::from_seed(0),
        )
        .unwrap();
    assert_eq!(result.nfev, 1);
    assert_eq!(result.fun, 1.5);
}

#[test]
fn optimizer_is_usable_as_a_trait_object() {
    let optimizers: Vec<Box<dyn VariationalOptimizer>> = vec![
        Box::new(Cobyla::default()),
        Box::new(Cobyla::default().with_maxiter(60)),
    ];
    let mut rng = RngHandle::from_seed(5);
    for optimizer in &optimizers {
        let result = optimizer
            .optimize(&mut |params: &[f64], _: usize| sphere(params), 1, &mut rng)
            .unwrap();
        assert_eq!(result.x.len(), 2);
    }
}

#[test]
fn fixed_start_converges_within_default_budget() {
    let optimizer = Cobyla::default().with_initial_point(vec![0.5, 0.3, 0.8, 0.1]);
    let run = || {
        optimizer
            .optimize(
                &mut |params: &[f64], _: usize| sphere(params),
                2,
                &mut RngHandle::from_seed(0),
            )
            .unwrap()
    };
    let first = run();
    let second = run();
    assert!(first.nfev <= 30);
    assert!(first.fun < 1e-2, "fun = {}", first.fun);
    assert!(first.fun < sphere(&[0.5, 0.3, 0.8, 0.1]));
    assert_eq!(first, second);
}
