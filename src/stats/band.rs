use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayView1, Axis};
use ordered_float::OrderedFloat;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

pub const INNER_LEVEL: f64 = 68.0;
pub const OUTER_LEVEL: f64 = 95.0;

const Z_INNER: f64 = 0.994_457_883_209_753;
const Z_OUTER: f64 = 1.959_963_984_540_054;

pub const DEFAULT_BOOTSTRAP_SAMPLES: usize = 1000;
pub const DEFAULT_BOOTSTRAP_SEED: u64 = 0b1110110001110101011000111101;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BandMethod {
    // Percentile bootstrap; runs are resampled with replacement, jointly over all bins.
    Bootstrap { samples: usize, seed: u64 },
    Normal,
}

impl Default for BandMethod {
    fn default() -> Self {
        BandMethod::Bootstrap {
            samples: DEFAULT_BOOTSTRAP_SAMPLES,
            seed: DEFAULT_BOOTSTRAP_SEED,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Band {
    pub level: f64,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GroupBands {
    pub mean: Vec<f64>,
    pub inner: Band,
    pub outer: Band,
}

impl GroupBands {
    pub fn n_bins(&self) -> usize {
        self.mean.len()
    }

    pub fn y_range(&self) -> (f64, f64) {
        self.outer
            .lower
            .iter()
            .chain(self.outer.upper.iter())
            .chain(self.mean.iter())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            })
    }
}

pub fn estimate_bands(values: &Array2<f64>, method: BandMethod) -> Result<GroupBands> {
    let (n_runs, n_bins) = values.dim();
    if n_runs == 0 || n_bins == 0 {
        return Err(Error::Render(format!(
            "cannot draw bands over {} runs and {} bins",
            n_runs, n_bins
        )));
    }
    let mean = values
        .mean_axis(Axis(0))
        .ok_or_else(|| Error::Render("no runs to average".into()))?;

    let (inner, outer) = match method {
        BandMethod::Normal => normal_bands(values, &mean),
        BandMethod::Bootstrap { samples, seed } => {
            if samples == 0 {
                return Err(Error::Configuration(
                    "bootstrap needs at least one resample".into(),
                ));
            }
            bootstrap_bands(values, samples, seed)
        }
    };
    Ok(GroupBands {
        mean: mean.to_vec(),
        inner,
        outer,
    })
}

fn normal_bands(values: &Array2<f64>, mean: &Array1<f64>) -> (Band, Band) {
    let n_runs = values.nrows();
    let sem: Vec<f64> = if n_runs < 2 {
        vec![0.0; values.ncols()]
    } else {
        values
            .std_axis(Axis(0), 1.0)
            .iter()
            .map(|sd| sd / (n_runs as f64).sqrt())
            .collect()
    };
    let band = |level: f64, z: f64| Band {
        level,
        lower: mean.iter().zip(&sem).map(|(m, s)| m - z * s).collect(),
        upper: mean.iter().zip(&sem).map(|(m, s)| m + z * s).collect(),
    };
    (band(INNER_LEVEL, Z_INNER), band(OUTER_LEVEL, Z_OUTER))
}

fn bootstrap_bands(values: &Array2<f64>, samples: usize, seed: u64) -> (Band, Band) {
    let (n_runs, n_bins) = values.dim();
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut boot_means = Array2::<f64>::zeros((samples, n_bins));
    let mut picks = vec![0usize; n_runs];
    for mut row in boot_means.axis_iter_mut(Axis(0)) {
        picks.iter_mut().for_each(|p| *p = rng.gen_range(0..n_runs));
        for &run in &picks {
            row += &values.row(run);
        }
        row /= n_runs as f64;
    }

    let mut inner = Band::empty(INNER_LEVEL, n_bins);
    let mut outer = Band::empty(OUTER_LEVEL, n_bins);
    for column in boot_means.axis_iter(Axis(1)) {
        let sorted = sorted_values(column);
        for band in [&mut inner, &mut outer] {
            let tail = (100.0 - band.level) / 2.0;
            band.lower.push(percentile(&sorted, tail));
            band.upper.push(percentile(&sorted, 100.0 - tail));
        }
    }
    (inner, outer)
}

impl Band {
    fn empty(level: f64, capacity: usize) -> Self {
        Band {
            level,
            lower: Vec::with_capacity(capacity),
            upper: Vec::with_capacity(capacity),
        }
    }
}

fn sorted_values(values: ArrayView1<f64>) -> Vec<f64> {
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by_key(|v| OrderedFloat(*v));
    sorted
}

// Linearly interpolated percentile of already sorted data, `q` in [0, 100].
pub(crate) fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    let pos = (q / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}
