// scripts/benchmark.rs
use euler_sde::math_utils::Timer;
use euler_sde::models::{Gbm, OuProcess};
use euler_sde::output::summary_statistics;
use euler_sde::{sample, sample_with_sensitivities, RandomType, SampleConfig, SdeResult};
use std::env;
use std::fs::File;
use std::io::{self, Write};
use std::process::Command;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct SystemInfo {
    os: String,
    cpu_cores: usize,
    rust_version: String,
    rustc_flags: String,
    rayon_threads: usize,
}

impl SystemInfo {
    fn gather() -> Self {
        let rust_version = Command::new("rustc")
            .arg("--version")
            .output()
            .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_string())
            .unwrap_or_else(|_| "Unknown Rust version".to_string());

        Self {
            os: env::consts::OS.to_string(),
            cpu_cores: num_cpus::get(),
            rust_version,
            rustc_flags: env::var("RUSTFLAGS").unwrap_or_else(|_| "default".to_string()),
            rayon_threads: rayon::current_num_threads(),
        }
    }
}

#[derive(Debug)]
struct BenchmarkResult {
    name: String,
    samples: usize,
    steps: usize,
    time_ms: f64,
    throughput_steps_per_sec: f64,
    terminal_mean: f64,
    reference_mean: f64,
}

impl BenchmarkResult {
    fn relative_error(&self) -> f64 {
        (self.terminal_mean - self.reference_mean).abs() / self.reference_mean.abs()
    }
}

const TIME_STEP: f64 = 0.01;
const HORIZON: f64 = 1.0;

fn timed_run(
    name: String,
    config: &SampleConfig,
    reference_mean: f64,
    run: impl Fn(&SampleConfig) -> SdeResult<ndarray::Array3<f64>>,
) -> SdeResult<BenchmarkResult> {
    let steps = (HORIZON / TIME_STEP).round() as usize;
    let mut timer = Timer::new();
    timer.start();
    let paths = run(config)?;
    let time_ms = timer.elapsed_ms();

    let terminal_mean = summary_statistics(&paths)
        .map(|summary| summary.means[[paths.dim().1 - 1, 0]])
        .unwrap_or(f64::NAN);

    Ok(BenchmarkResult {
        name,
        samples: config.num_samples,
        steps,
        time_ms,
        throughput_steps_per_sec: (config.num_samples * steps) as f64 / (time_ms / 1000.0),
        terminal_mean,
        reference_mean,
    })
}

fn run_sampler_benchmarks() -> SdeResult<Vec<BenchmarkResult>> {
    let mut results = Vec::new();
    let gbm = Gbm::new(1, 0.05, 0.2);
    let reference = gbm.expected_value(100.0, HORIZON);

    for &num_samples in &[10_000, 100_000] {
        println!("Running sampler benchmarks with {} samples...", num_samples);

        for random_type in [
            RandomType::Pseudo,
            RandomType::PseudoAntithetic,
            RandomType::Stateless,
            RandomType::Sobol,
            RandomType::HaltonRandomized,
        ] {
            let config = SampleConfig {
                time_step: TIME_STEP,
                num_samples,
                initial_state: Some(vec![100.0]),
                random_type,
                seed: Some(42),
                ..Default::default()
            };
            results.push(timed_run(
                format!("GBM {:?}", random_type),
                &config,
                reference,
                |cfg| sample(&gbm, &[0.5, HORIZON], cfg),
            )?);
        }

        let lazy = SampleConfig {
            time_step: TIME_STEP,
            num_samples,
            initial_state: Some(vec![100.0]),
            seed: Some(42),
            precompute_normal_draws: false,
            ..Default::default()
        };
        results.push(timed_run(
            "GBM Pseudo (lazy draws)".to_string(),
            &lazy,
            reference,
            |cfg| sample(&gbm, &[0.5, HORIZON], cfg),
        )?);

        let watched = SampleConfig {
            watch_params: Some(vec![Gbm::MU, Gbm::SIGMA]),
            ..lazy.clone()
        };
        results.push(timed_run(
            "GBM sensitivities (mu, sigma)".to_string(),
            &watched,
            reference,
            |cfg| sample_with_sensitivities(&gbm, &[0.5, HORIZON], cfg).map(|s| s.paths),
        )?);
    }

    let ou = OuProcess::new(1, 1.5, 0.8, 0.3);
    let config = SampleConfig {
        time_step: TIME_STEP,
        num_samples: 100_000,
        initial_state: Some(vec![0.0]),
        random_type: RandomType::Sobol,
        ..Default::default()
    };
    results.push(timed_run(
        "OU Sobol".to_string(),
        &config,
        ou.exact_mean(0.0, HORIZON),
        |cfg| sample(&ou, &[0.25, 0.5, HORIZON], cfg),
    )?);

    Ok(results)
}

fn write_results_to_csv(
    results: &[BenchmarkResult],
    system_info: &SystemInfo,
    filename: &str,
) -> io::Result<()> {
    let mut file = File::create(filename)?;

    writeln!(file, "# System Information")?;
    writeln!(file, "# OS: {}", system_info.os)?;
    writeln!(file, "# CPU Cores: {}", system_info.cpu_cores)?;
    writeln!(file, "# Rust Version: {}", system_info.rust_version)?;
    writeln!(file, "# RUSTFLAGS: {}", system_info.rustc_flags)?;
    writeln!(file, "# Rayon Threads: {}", system_info.rayon_threads)?;
    writeln!(
        file,
        "# Benchmark Date: {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    )?;
    writeln!(file, "#")?;

    writeln!(
        file,
        "Benchmark,Samples,Steps,Time_ms,Throughput_steps_per_sec,Terminal_Mean,Reference_Mean,Relative_Error"
    )?;
    for result in results {
        writeln!(
            file,
            "{},{},{},{:.2},{:.0},{:.6},{:.6},{:.6}",
            result.name,
            result.samples,
            result.steps,
            result.time_ms,
            result.throughput_steps_per_sec,
            result.terminal_mean,
            result.reference_mean,
            result.relative_error()
        )?;
    }

    println!("Results written to {}", filename);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("euler-sde Sampler Benchmark Suite");
    println!("=================================\n");

    let system_info = SystemInfo::gather();
    println!("System Information:");
    println!("  OS: {}", system_info.os);
    println!("  CPU Cores: {}", system_info.cpu_cores);
    println!("  Rust Version: {}", system_info.rust_version);
    println!("  RUSTFLAGS: {}", system_info.rustc_flags);
    println!("  Rayon Threads: {}", system_info.rayon_threads);
    println!();

    let results = run_sampler_benchmarks()?;

    println!("\n{:=<96}", "");
    println!("BENCHMARK RESULTS");
    println!("{:=<96}", "");
    println!(
        "{:<32} {:>8} {:>12} {:>16} {:>10} {:>10} {:>10}",
        "Benchmark", "Samples", "Time (ms)", "Steps/sec", "Mean", "Reference", "Rel Error"
    );
    println!("{:-<96}", "");
    for result in &results {
        println!(
            "{:<32} {:>8} {:>12.2} {:>16.0} {:>10.4} {:>10.4} {:>9.3}%",
            result.name,
            result.samples,
            result.time_ms,
            result.throughput_steps_per_sec,
            result.terminal_mean,
            result.reference_mean,
            result.relative_error() * 100.0
        );
    }
    println!("{:=<96}", "");

    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let filename = format!("benchmark_results_{}.csv", timestamp);
    write_results_to_csv(&results, &system_info, &filename)?;

    println!("\nTo reproduce these results:");
    println!("1. Use Rust version: {}", system_info.rust_version);
    println!("2. Set RUSTFLAGS: {}", system_info.rustc_flags);
    println!("3. Run: cargo run --bin benchmark --release");
    Ok(())
}
