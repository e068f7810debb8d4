use crate::error::{Error, Result};
use itertools::{Itertools, MinMaxResult};
use ndarray::{Array2, ArrayView1};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LengthPolicy {
    #[default]
    Strict,
    Truncate,
}

#[derive(Debug, Clone)]
pub struct ResultTable {
    values: Array2<f64>,
    sources: Vec<PathBuf>,
}

impl ResultTable {
    pub fn from_runs(runs: Vec<(PathBuf, Vec<f64>)>, policy: LengthPolicy) -> Result<Self> {
        let lens: Vec<usize> = runs.iter().map(|(_, run)| run.len()).collect();
        let (shortest, longest) = match lens.iter().position_minmax() {
            MinMaxResult::NoElements => {
                return Err(Error::ShapeMismatch("result table needs at least one run".into()))
            }
            MinMaxResult::OneElement(idx) => (idx, idx),
            MinMaxResult::MinMax(min, max) => (min, max),
        };

        if lens[shortest] != lens[longest] {
            match policy {
                LengthPolicy::Strict => {
                    return Err(Error::ShapeMismatch(format!(
                        "{} has {} rows but {} has {}",
                        runs[longest].0.display(),
                        lens[longest],
                        runs[shortest].0.display(),
                        lens[shortest]
                    )))
                }
                LengthPolicy::Truncate => {
                    tracing::warn!(
                        shortest = lens[shortest],
                        longest = lens[longest],
                        file = %runs[shortest].0.display(),
                        "truncating runs to the shortest length"
                    );
                }
            }
        }

        let n_rows = lens[shortest];
        let mut values = Array2::zeros((n_rows, runs.len()));
        let mut sources = Vec::with_capacity(runs.len());
        for (col, (path, run)) in runs.into_iter().enumerate() {
            values
                .column_mut(col)
                .iter_mut()
                .zip(run.into_iter())
                .for_each(|(dst, v)| *dst = v);
            sources.push(path);
        }
        Ok(ResultTable { values, sources })
    }

    pub fn from_array(values: Array2<f64>) -> Self {
        let sources = (0..values.ncols())
            .map(|i| PathBuf::from(format!("run{}", i)))
            .collect();
        ResultTable { values, sources }
    }

    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_runs(&self) -> usize {
        self.values.ncols()
    }

    pub fn run(&self, idx: usize) -> ArrayView1<'_, f64> {
        self.values.column(idx)
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn sources(&self) -> &[PathBuf] {
        &self.sources
    }
}
