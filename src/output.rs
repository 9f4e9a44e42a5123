// src/output.rs
use ndarray::{Array2, Array3, Axis};
use std::fs::File;
use std::io::{self, BufWriter, Write};

/// Writes sampled paths as long-format CSV, one row per
/// `(path, time, component)`.
pub fn write_paths_to_csv(filename: &str, times: &[f64], paths: &Array3<f64>) -> io::Result<()> {
    let (num_samples, num_times, dim) = paths.dim();
    if times.len() != num_times {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} times for {} observation slots", times.len(), num_times),
        ));
    }

    let mut file = BufWriter::new(File::create(filename)?);
    writeln!(file, "path_id,time,component,value")?;
    for i in 0..num_samples {
        for (k, t) in times.iter().enumerate() {
            for c in 0..dim {
                writeln!(file, "{},{},{},{}", i, t, c, paths[[i, k, c]])?;
            }
        }
    }
    file.flush()
}

/// Cross-sectional moments of sampled paths, each `[num_times, dim]`.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSummary {
    pub means: Array2<f64>,
    pub variances: Array2<f64>,
}

/// Per-time mean and (population) variance of every component across
/// samples. `None` when there are no samples.
pub fn summary_statistics(paths: &Array3<f64>) -> Option<PathSummary> {
    let means = paths.mean_axis(Axis(0))?;
    let variances = paths.var_axis(Axis(0), 0.0);
    Some(PathSummary { means, variances })
}

pub fn write_summary_to_csv(filename: &str, times: &[f64], summary: &PathSummary) -> io::Result<()> {
    let mut file = File::create(filename)?;
    writeln!(file, "time,component,mean,variance")?;
    for ((k, c), mean) in summary.means.indexed_iter() {
        let t = times.get(k).copied().unwrap_or(f64::NAN);
        writeln!(file, "{},{},{},{}", t, c, mean, summary.variances[[k, c]])?;
    }
    Ok(())
}
