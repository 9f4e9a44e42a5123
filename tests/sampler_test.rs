// tests/sampler_test.rs
use approx::assert_relative_eq;
use euler_sde::models::{BrownianMotion, Gbm, OuProcess};
use euler_sde::output::summary_statistics;
use euler_sde::{sample, RandomType, SampleConfig, SdeError};
use ndarray::{array, s, Array2, Array3, ArrayView2, Axis};

fn config(time_step: f64, num_samples: usize, seed: u64) -> SampleConfig {
    SampleConfig {
        time_step,
        num_samples,
        seed: Some(seed),
        ..Default::default()
    }
}

#[test]
fn test_output_shape_matches_request() {
    let process = BrownianMotion::standard(3).unwrap();
    let paths = sample(&process, &[0.1, 0.35, 0.9, 2.0], &config(0.2, 7, 1)).unwrap();
    assert_eq!(paths.dim(), (7, 4, 3));
}

#[test]
fn test_deterministic_ou_decays_exponentially() {
    let process = OuProcess::new(1, 1.0, 0.0, 0.0);
    let cfg = SampleConfig {
        time_step: 0.001,
        num_samples: 2,
        initial_state: Some(vec![1.0]),
        seed: Some(0),
        ..Default::default()
    };
    let times = [0.25, 0.5, 1.0];

    let paths = sample(&process, &times, &cfg).unwrap();

    for (k, &t) in times.iter().enumerate() {
        let exact = process.exact_mean(1.0, t);
        for i in 0..2 {
            assert!(
                (paths[[i, k, 0]] - exact).abs() < 1e-3,
                "t={} got {} expected {}",
                t,
                paths[[i, k, 0]],
                exact
            );
        }
    }
}

#[test]
fn test_brownian_terminal_variance() {
    let process = BrownianMotion::standard(1).unwrap();
    let paths = sample(&process, &[1.0], &config(1.0, 100_000, 42)).unwrap();

    let summary = summary_statistics(&paths).unwrap();
    println!(
        "\nBrownian X_1: mean {:.5}, variance {:.5}",
        summary.means[[0, 0]],
        summary.variances[[0, 0]]
    );
    assert!(summary.means[[0, 0]].abs() < 0.02);
    assert!((summary.variances[[0, 0]] - 1.0).abs() < 0.02);
}

#[test]
fn test_correlated_brownian_covariance() {
    let vol = array![[1.0, 0.0], [0.6, 0.8]];
    let process = BrownianMotion::new(vol).unwrap();
    let paths = sample(&process, &[0.5, 2.0], &config(0.25, 50_000, 9)).unwrap();

    let terminal = paths.index_axis(Axis(1), 1).to_owned();
    let expected = process.covariance(2.0);
    let n = terminal.nrows() as f64;
    let cov = terminal.t().dot(&terminal) / n;

    for j in 0..2 {
        for k in 0..2 {
            assert!(
                (cov[[j, k]] - expected[[j, k]]).abs() < 0.08,
                "cov[{},{}] = {} expected {}",
                j,
                k,
                cov[[j, k]],
                expected[[j, k]]
            );
        }
    }
}

#[test]
fn test_time_zero_returns_initial_state() {
    let process = Gbm::new(2, 0.1, 0.3);
    let cfg = SampleConfig {
        time_step: 0.1,
        num_samples: 4,
        initial_state: Some(vec![1.0, 2.0]),
        seed: Some(3),
        ..Default::default()
    };

    let paths = sample(&process, &[0.0, 1.0], &cfg).unwrap();
    assert_eq!(paths.dim(), (4, 2, 2));
    for i in 0..4 {
        assert_eq!(paths[[i, 0, 0]], 1.0);
        assert_eq!(paths[[i, 0, 1]], 2.0);
    }
}

#[test]
fn test_only_time_zero_for_both_drivers() {
    let process = Gbm::new(1, 0.1, 0.3);
    for watch_params in [None, Some(vec![Gbm::SIGMA])] {
        let cfg = SampleConfig {
            time_step: 0.1,
            num_samples: 3,
            initial_state: Some(vec![5.0]),
            seed: Some(3),
            watch_params,
            ..Default::default()
        };
        let paths = sample(&process, &[0.0], &cfg).unwrap();
        assert_eq!(paths, Array3::from_elem((3, 1, 1), 5.0));
    }
}

#[test]
fn test_requested_times_on_uniform_grid() {
    let process = BrownianMotion::standard(1).unwrap();
    let paths = sample(&process, &[0.25, 0.5, 0.75, 1.0], &config(0.25, 10, 4)).unwrap();
    assert_eq!(paths.dim(), (10, 4, 1));
}

#[test]
fn test_time_step_larger_than_horizon() {
    let process = Gbm::new(1, 0.05, 0.2);
    let cfg = SampleConfig {
        initial_state: Some(vec![1.0]),
        ..config(10.0, 8, 12)
    };
    let paths = sample(&process, &[0.5, 2.0], &cfg).unwrap();
    assert_eq!(paths.dim(), (8, 2, 1));
    assert!(paths.iter().all(|x| x.is_finite()));
}

#[test]
fn test_tiny_time_step_near_origin() {
    let process = BrownianMotion::standard(1).unwrap();
    for watch_params in [None, Some(vec![])] {
        let cfg = SampleConfig {
            watch_params,
            ..config(1e-20, 4, 6)
        };
        let paths = sample(&process, &[1e-19], &cfg).unwrap();
        assert_eq!(paths.dim(), (4, 1, 1));
        assert!(paths.iter().all(|x| x.is_finite()));
    }
}

#[test]
fn test_bulk_and_sensitivity_drivers_agree() {
    let process = OuProcess::new(2, 0.7, 0.3, 0.4);
    let times = [0.2, 0.45, 1.0];

    for precompute in [true, false] {
        let bulk_cfg = SampleConfig {
            time_step: 0.1,
            num_samples: 16,
            initial_state: Some(vec![1.0, -1.0]),
            seed: Some(2024),
            precompute_normal_draws: precompute,
            ..Default::default()
        };
        let sens_cfg = SampleConfig {
            watch_params: Some(vec![]),
            ..bulk_cfg.clone()
        };

        let bulk = sample(&process, &times, &bulk_cfg).unwrap();
        let sens = sample(&process, &times, &sens_cfg).unwrap();

        assert_eq!(bulk.dim(), sens.dim());
        for (a, b) in bulk.iter().zip(sens.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_drivers_agree_on_single_time() {
    let process = Gbm::new(1, 0.05, 0.25);
    let bulk_cfg = SampleConfig {
        time_step: 0.05,
        num_samples: 8,
        initial_state: Some(vec![100.0]),
        random_type: RandomType::Sobol,
        ..Default::default()
    };
    let sens_cfg = SampleConfig {
        watch_params: Some(vec![Gbm::MU]),
        ..bulk_cfg.clone()
    };

    let bulk = sample(&process, &[0.7], &bulk_cfg).unwrap();
    let sens = sample(&process, &[0.7], &sens_cfg).unwrap();
    assert_eq!(sens.dim(), (8, 1, 1));
    for (a, b) in bulk.iter().zip(sens.iter()) {
        assert_relative_eq!(*a, *b, epsilon = 1e-10);
    }
}

#[test]
fn test_reproducible_random_types() {
    let process = BrownianMotion::standard(2).unwrap();
    for random_type in [
        RandomType::Pseudo,
        RandomType::Stateless,
        RandomType::StatelessAntithetic,
        RandomType::Sobol,
        RandomType::Halton,
        RandomType::HaltonRandomized,
    ] {
        let cfg = SampleConfig {
            random_type,
            ..config(0.1, 6, 99)
        };
        let first = sample(&process, &[0.3, 1.0], &cfg).unwrap();
        let second = sample(&process, &[0.3, 1.0], &cfg).unwrap();
        assert_eq!(first, second, "{:?} not reproducible", random_type);
    }
}

#[test]
fn test_low_discrepancy_without_seed_is_deterministic() {
    let process = BrownianMotion::standard(1).unwrap();
    for random_type in [RandomType::Sobol, RandomType::Halton] {
        let cfg = SampleConfig {
            time_step: 0.2,
            num_samples: 16,
            random_type,
            ..Default::default()
        };
        let first = sample(&process, &[1.0], &cfg).unwrap();
        let second = sample(&process, &[1.0], &cfg).unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn test_skip_shifts_sobol_points() {
    let process = BrownianMotion::standard(1).unwrap();
    let base = SampleConfig {
        time_step: 0.5,
        num_samples: 8,
        random_type: RandomType::Sobol,
        ..Default::default()
    };
    let skipped = SampleConfig {
        skip: 8,
        ..base.clone()
    };

    let a = sample(&process, &[1.0], &base).unwrap();
    let b = sample(&process, &[1.0], &skipped).unwrap();
    assert_ne!(a, b);
}

#[test]
fn test_low_discrepancy_on_non_uniform_times() {
    let process = BrownianMotion::standard(1).unwrap();
    let times = [0.3, 1.0];

    for random_type in [
        RandomType::Sobol,
        RandomType::Halton,
        RandomType::HaltonRandomized,
    ] {
        let cfg = SampleConfig {
            time_step: 0.25,
            num_samples: 4096,
            random_type,
            seed: Some(17),
            ..Default::default()
        };
        let paths = sample(&process, &times, &cfg).unwrap();
        let summary = summary_statistics(&paths).unwrap();

        for (k, &t) in times.iter().enumerate() {
            let mean = summary.means[[k, 0]];
            let var = summary.variances[[k, 0]];
            println!("{:?} t={}: mean {:.4}, var {:.4}", random_type, t, mean, var);
            assert!(mean.abs() < 0.05, "{:?} mean {} at t={}", random_type, mean, t);
            assert!((var - t).abs() < 0.05, "{:?} var {} at t={}", random_type, var, t);
        }
    }
}

#[test]
fn test_antithetic_paths_cancel() {
    let process = BrownianMotion::standard(2).unwrap();
    for (random_type, precompute) in [
        (RandomType::PseudoAntithetic, false),
        (RandomType::PseudoAntithetic, true),
        (RandomType::StatelessAntithetic, true),
    ] {
        let cfg = SampleConfig {
            random_type,
            precompute_normal_draws: precompute,
            ..config(0.1, 10, 5)
        };
        let paths = sample(&process, &[0.5, 1.0], &cfg).unwrap();

        let head = paths.slice(s![..5, .., ..]);
        let tail = paths.slice(s![5.., .., ..]);
        for (a, b) in head.iter().zip(tail.iter()) {
            assert_relative_eq!(*a, -*b, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let process = Gbm::new(1, 0.05, 0.2);

    assert!(matches!(
        sample(&process, &[], &config(0.1, 1, 0)),
        Err(SdeError::DegenerateGrid { .. })
    ));
    assert!(matches!(
        sample(&process, &[1.0], &config(0.0, 1, 0)),
        Err(SdeError::DegenerateGrid { .. })
    ));
    assert!(matches!(
        sample(&process, &[1.0, 0.5], &config(0.1, 1, 0)),
        Err(SdeError::InvalidParameters { .. })
    ));
    assert!(matches!(
        sample(&process, &[-1.0, 0.5], &config(0.1, 1, 0)),
        Err(SdeError::InvalidParameters { .. })
    ));

    let stateless = SampleConfig {
        time_step: 0.1,
        random_type: RandomType::Stateless,
        ..Default::default()
    };
    assert!(matches!(
        sample(&process, &[1.0], &stateless),
        Err(SdeError::RandomGeneration { .. })
    ));

    let odd_antithetic = SampleConfig {
        random_type: RandomType::PseudoAntithetic,
        ..config(0.1, 3, 0)
    };
    assert!(matches!(
        sample(&process, &[1.0], &odd_antithetic),
        Err(SdeError::RandomGeneration { .. })
    ));

    let wrong_state = SampleConfig {
        initial_state: Some(vec![1.0, 2.0]),
        ..config(0.1, 1, 0)
    };
    assert!(matches!(
        sample(&process, &[1.0], &wrong_state),
        Err(SdeError::InvalidConfiguration { .. })
    ));

    let bad_watch = SampleConfig {
        watch_params: Some(vec![5]),
        ..config(0.1, 1, 0)
    };
    assert!(matches!(
        sample(&process, &[1.0], &bad_watch),
        Err(SdeError::InvalidConfiguration { .. })
    ));
}

/// Drift with one column too many.
struct MisshapedDrift;

impl euler_sde::ItoProcess for MisshapedDrift {
    fn dim(&self) -> usize {
        1
    }

    fn drift<S: euler_sde::Scalar>(&self, _t: f64, state: ArrayView2<'_, S>, _params: &[S]) -> Array2<S> {
        Array2::from_elem((state.nrows(), 2), S::zero())
    }

    fn volatility<S: euler_sde::Scalar>(
        &self,
        _t: f64,
        state: ArrayView2<'_, S>,
        _params: &[S],
    ) -> Array3<S> {
        Array3::from_elem((state.nrows(), 1, 1), S::from_f64(1.0))
    }
}

#[test]
fn test_misshaped_drift_is_reported() {
    for watch_params in [None, Some(vec![])] {
        let cfg = SampleConfig {
            watch_params,
            ..config(0.1, 2, 0)
        };
        match sample(&MisshapedDrift, &[1.0], &cfg) {
            Err(SdeError::ShapeMismatch {
                operation,
                expected,
                actual,
            }) => {
                assert_eq!(operation, "drift");
                assert_eq!(expected, vec![2, 1]);
                assert_eq!(actual, vec![2, 2]);
            }
            other => panic!("expected ShapeMismatch, got {:?}", other),
        }
    }
}
