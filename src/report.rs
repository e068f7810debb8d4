use crate::binning::binner::BinnedResult;
use crate::stats::band::GroupBands;
use ndarray::Array2;
use serde::Serialize;

#[derive(Serialize, Debug)]
pub struct GroupReport {
    pub prefix: String,
    pub files: Vec<String>,
    pub runs: usize,
    pub bins: usize,
    pub bucket_width: usize,
    pub binned: Array2<f64>,
    #[serde(flatten)]
    pub bands: GroupBands,
}

impl GroupReport {
    pub fn new(binned: &BinnedResult, bands: GroupBands) -> Self {
        GroupReport {
            prefix: binned.prefix().to_string(),
            files: binned
                .sources()
                .iter()
                .map(|p| p.to_string_lossy().to_string())
                .collect(),
            runs: binned.n_runs(),
            bins: binned.n_bins(),
            bucket_width: binned.bucket_width(),
            binned: binned.values().clone(),
            bands,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::GroupReport;
    use crate::binning::binner::BinnedResult;
    use crate::stats::band::{estimate_bands, BandMethod};
    use ndarray::array;

    #[test]
    fn test_report_json() {
        let binned = BinnedResult::from_array("g", array![[1.0, 3.0], [3.0, 5.0]], 4);
        let bands = estimate_bands(binned.values(), BandMethod::Normal).unwrap();
        let report = GroupReport::new(&binned, bands);
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["prefix"], "g");
        assert_eq!(value["runs"], 2);
        assert_eq!(value["bins"], 2);
        assert_eq!(value["bucket_width"], 4);
        assert_eq!(value["mean"], serde_json::json!([2.0, 4.0]));
        assert_eq!(value["inner"]["level"], 68.0);
        assert!(value["binned"].is_object());
    }
}
