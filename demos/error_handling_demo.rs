// demos/error_handling_demo.rs
use euler_sde::models::{BrownianMotion, Gbm};
use euler_sde::{sample, RandomType, SampleConfig, SdeError};
use ndarray::array;

fn report(label: &str, result: Result<ndarray::Array3<f64>, SdeError>) {
    match result {
        Ok(paths) => println!("   Unexpected success with shape {:?}", paths.dim()),
        Err(e) => println!("   ✓ {}: {}", label, e),
    }
}

fn main() {
    println!("Error Handling Demo for euler-sde");
    println!("=================================\n");

    let gbm = Gbm::new(1, 0.05, 0.2);
    let base = SampleConfig {
        time_step: 0.1,
        num_samples: 4,
        initial_state: Some(vec![100.0]),
        seed: Some(1),
        ..Default::default()
    };

    println!("1. Empty observation times...");
    report("Caught error", sample(&gbm, &[], &base));

    println!("\n2. Non-increasing observation times...");
    report("Caught error", sample(&gbm, &[0.5, 0.5, 1.0], &base));

    println!("\n3. Zero time step...");
    let config = SampleConfig {
        time_step: 0.0,
        ..base.clone()
    };
    report("Caught error", sample(&gbm, &[1.0], &config));

    println!("\n4. Stateless draws without a seed...");
    let config = SampleConfig {
        random_type: RandomType::Stateless,
        seed: None,
        ..base.clone()
    };
    report("Caught error", sample(&gbm, &[1.0], &config));

    println!("\n5. Antithetic draws with an odd sample count...");
    let config = SampleConfig {
        random_type: RandomType::PseudoAntithetic,
        num_samples: 5,
        ..base.clone()
    };
    report("Caught error", sample(&gbm, &[1.0], &config));

    println!("\n6. Initial state of the wrong dimension...");
    let config = SampleConfig {
        initial_state: Some(vec![1.0, 2.0]),
        ..base.clone()
    };
    report("Caught error", sample(&gbm, &[1.0], &config));

    println!("\n7. Watching a parameter the process does not have...");
    let config = SampleConfig {
        watch_params: Some(vec![7]),
        ..base.clone()
    };
    report("Caught error", sample(&gbm, &[1.0], &config));

    println!("\n8. Non-square Brownian volatility...");
    match BrownianMotion::new(array![[1.0, 0.0]]) {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n9. Malformed TOML configuration...");
    match SampleConfig::from_toml_str("num_samples = -3") {
        Ok(_) => println!("   Unexpected: Should have failed!"),
        Err(e) => println!("   ✓ Caught error: {}", e),
    }

    println!("\n10. Valid configuration still works...");
    match sample(&gbm, &[0.5, 1.0], &base) {
        Ok(paths) => println!("   ✓ Sampled paths with shape {:?}", paths.dim()),
        Err(e) => println!("   Unexpected error: {}", e),
    }
}
