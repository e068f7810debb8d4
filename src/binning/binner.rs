use crate::binning::table::{LengthPolicy, ResultTable};
use crate::env::loader::{load_run, HeaderMode};
use crate::env::scan::scan_dir_for_runs;
use crate::error::{Error, Result};
use ndarray::{s, Array2, ArrayView1, Axis};
use std::path::{Path, PathBuf};

pub const REPORT_EVERY_N: usize = 100;

#[derive(Debug, Clone)]
pub struct BinnerConfig {
    buckets: usize,
    length_policy: LengthPolicy,
    header: HeaderMode,
}

impl BinnerConfig {
    pub fn new() -> Self {
        BinnerConfig {
            buckets: REPORT_EVERY_N,
            length_policy: LengthPolicy::Strict,
            header: HeaderMode::Auto,
        }
    }

    // `0` means no averaging.
    pub fn set_buckets(&mut self, buckets: usize) {
        self.buckets = buckets;
    }
    pub fn set_length_policy(&mut self, length_policy: LengthPolicy) {
        self.length_policy = length_policy;
    }
    pub fn set_header(&mut self, header: HeaderMode) {
        self.header = header;
    }

    pub fn bucket_width(&self) -> usize {
        self.buckets.max(1)
    }
    pub fn length_policy(&self) -> LengthPolicy {
        self.length_policy
    }
    pub fn header(&self) -> HeaderMode {
        self.header
    }
}

impl Default for BinnerConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct BinnedResult {
    prefix: String,
    values: Array2<f64>,
    bucket_width: usize,
    sources: Vec<PathBuf>,
}

impl BinnedResult {
    pub fn from_array(prefix: &str, values: Array2<f64>, bucket_width: usize) -> Self {
        BinnedResult {
            prefix: prefix.to_string(),
            values,
            bucket_width,
            sources: Vec::new(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }
    pub fn bucket_width(&self) -> usize {
        self.bucket_width
    }
    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
    pub fn n_runs(&self) -> usize {
        self.values.nrows()
    }
    pub fn n_bins(&self) -> usize {
        self.values.ncols()
    }
    pub fn shape(&self) -> (usize, usize) {
        (self.n_runs(), self.n_bins())
    }
    pub fn run(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.values.row(idx)
    }

    pub fn take_runs(&self, n_runs: usize) -> BinnedResult {
        let n_runs = n_runs.min(self.n_runs());
        BinnedResult {
            prefix: self.prefix.clone(),
            values: self.values.slice(s![..n_runs, ..]).to_owned(),
            bucket_width: self.bucket_width,
            sources: self.sources.iter().take(n_runs).cloned().collect(),
        }
    }
}

pub fn num_bins(n_rows: usize, bucket_width: usize) -> usize {
    (n_rows + bucket_width - 1) / bucket_width
}

// The last bucket may be shorter. Returns a runs × bins array.
pub fn bin_table(table: &ResultTable, bucket_width: usize) -> Result<Array2<f64>> {
    let bucket_width = bucket_width.max(1);
    let n_rows = table.n_rows();
    let n_bins = num_bins(n_rows, bucket_width);
    if n_bins == 0 {
        return Err(Error::Configuration(format!(
            "bucket width {} produces no bins over {} rows",
            bucket_width, n_rows
        )));
    }

    let raw = table.values();
    let mut binned = Array2::zeros((table.n_runs(), n_bins));
    for bin_idx in 0..n_bins {
        let start = bin_idx * bucket_width;
        let end = (start + bucket_width).min(n_rows);
        let means = raw
            .slice(s![start..end, ..])
            .mean_axis(Axis(0))
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "bin {} (rows {}..{}) is empty with bucket width {}",
                    bin_idx, start, end, bucket_width
                ))
            })?;
        binned.column_mut(bin_idx).assign(&means);
    }
    tracing::debug!(n_rows, bucket_width, n_bins, runs = table.n_runs(), "binned table");
    Ok(binned)
}

pub struct Binner<'a> {
    config: &'a BinnerConfig,
}

impl<'a> Binner<'a> {
    pub fn new(config: &'a BinnerConfig) -> Self {
        Binner { config }
    }

    pub fn load_table(&self, directory: &Path, prefix: &str) -> Result<ResultTable> {
        let paths = scan_dir_for_runs(directory, prefix)?;
        let runs = paths
            .into_iter()
            .map(|path| {
                let values = load_run(&path, self.config.header())?;
                Ok((path, values))
            })
            .collect::<Result<Vec<_>>>()?;
        ResultTable::from_runs(runs, self.config.length_policy())
    }

    pub fn bin(&self, directory: &Path, prefix: &str) -> Result<BinnedResult> {
        let table = self.load_table(directory, prefix)?;
        let bucket_width = self.config.bucket_width();
        let values = bin_table(&table, bucket_width)?;
        tracing::info!(
            prefix,
            runs = values.nrows(),
            bins = values.ncols(),
            bucket_width,
            "binned group"
        );
        Ok(BinnedResult {
            prefix: prefix.to_string(),
            values,
            bucket_width,
            sources: table.sources().to_vec(),
        })
    }
}

pub fn bin(directory: &Path, prefix: &str, buckets: usize) -> Result<BinnedResult> {
    let mut config = BinnerConfig::new();
    config.set_buckets(buckets);
    Binner::new(&config).bin(directory, prefix)
}
