// demos/demo.rs
use euler_sde::math_utils::{norm_cdf, Timer};
use euler_sde::models::{BrownianMotion, Gbm, OuProcess};
use euler_sde::output;
use euler_sde::{sample, RandomType, SampleConfig};
use ndarray::array;
use std::fs;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("Running euler-sde Sampling Demo\n");
    let times = [0.1, 0.25, 0.5, 1.0];

    // --- Ornstein-Uhlenbeck under different random sources ---
    println!("--- Ornstein-Uhlenbeck X_0 = 1, theta = 2, mu = 0.5, sigma = 0.3 ---");
    let ou = OuProcess::new(1, 2.0, 0.5, 0.3);
    for random_type in [
        RandomType::Pseudo,
        RandomType::PseudoAntithetic,
        RandomType::Stateless,
        RandomType::Sobol,
        RandomType::HaltonRandomized,
    ] {
        let config = SampleConfig {
            time_step: 0.01,
            num_samples: 20_000,
            initial_state: Some(vec![1.0]),
            random_type,
            seed: Some(12345),
            ..Default::default()
        };

        let mut timer = Timer::new();
        timer.start();
        let paths = sample(&ou, &times, &config)?;
        let elapsed = timer.elapsed_ms();

        if let Some(summary) = output::summary_statistics(&paths) {
            let last = times.len() - 1;
            println!(
                "{:<18} mean {:.5} (exact {:.5})  var {:.5} (exact {:.5})  {:.1} ms",
                format!("{:?}", random_type),
                summary.means[[last, 0]],
                ou.exact_mean(1.0, 1.0),
                summary.variances[[last, 0]],
                ou.exact_variance(1.0),
                elapsed
            );
        }
    }

    // --- Geometric Brownian motion on the Euler grid ---
    println!("\n--- GBM X_0 = 100, mu = 0.05, sigma = 0.2 ---");
    let gbm = Gbm::new(1, 0.05, 0.2);
    let config = SampleConfig {
        time_step: 1.0 / 252.0,
        num_samples: 50_000,
        initial_state: Some(vec![100.0]),
        random_type: RandomType::PseudoAntithetic,
        seed: Some(12345),
        ..Default::default()
    };
    let paths = sample(&gbm, &times, &config)?;
    fs::create_dir_all("results")?;
    if let Some(summary) = output::summary_statistics(&paths) {
        for (k, &t) in times.iter().enumerate() {
            println!(
                "t = {:<5} E[X_t] = {:.4} (exact {:.4})",
                t,
                summary.means[[k, 0]],
                gbm.expected_value(100.0, t)
            );
        }
        output::write_summary_to_csv("results/gbm_summary.csv", &times, &summary)?;
        println!("Summary written to results/gbm_summary.csv");
    }

    // P(X_1 > X_0) = N((mu - sigma^2 / 2) / sigma) under the exact log-normal law
    let last = times.len() - 1;
    let above = paths
        .index_axis(ndarray::Axis(1), last)
        .iter()
        .filter(|&&x| x > 100.0)
        .count() as f64
        / paths.dim().0 as f64;
    println!(
        "P(X_1 > 100) = {:.4} (log-normal {:.4})",
        above,
        norm_cdf((gbm.mu - 0.5 * gbm.sigma * gbm.sigma) / gbm.sigma)
    );

    // --- Correlated 2-D Brownian motion ---
    println!("\n--- Correlated Brownian motion, rho = 0.6 ---");
    let brownian = BrownianMotion::new(array![[1.0, 0.0], [0.6, 0.8]])?;
    let config = SampleConfig {
        time_step: 0.05,
        num_samples: 20_000,
        random_type: RandomType::Sobol,
        ..Default::default()
    };
    let paths = sample(&brownian, &[1.0], &config)?;
    let terminal = paths.index_axis(ndarray::Axis(1), 0).to_owned();
    let cov = terminal.t().dot(&terminal) / terminal.nrows() as f64;
    println!("Sample covariance at t = 1:\n{:.4}", cov);
    println!("Exact covariance:\n{:.4}", brownian.covariance(1.0));

    // --- Export a few paths ---
    let few = SampleConfig {
        num_samples: 5,
        ..config
    };
    let paths = sample(&brownian, &times, &few)?;
    output::write_paths_to_csv("results/brownian_paths.csv", &times, &paths)?;
    println!("\nPaths written to results/brownian_paths.csv");

    Ok(())
}
