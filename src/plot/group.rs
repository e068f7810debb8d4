use crate::binning::binner::BinnedResult;
use crate::error::{Error, Result};
use crate::plot::draw::{render, Trace};
use crate::plot::style::{PlotConfig, GROUP_COLOR};
use crate::stats::band::{estimate_bands, GroupBands};
use std::path::Path;

pub fn group_title(prefix: &str) -> String {
    format!("{} -- Average Binned Return", prefix)
}

pub fn plot_group(
    binned: &BinnedResult,
    title_prefix: &str,
    output_path: &Path,
    config: &PlotConfig,
) -> Result<GroupBands> {
    if binned.n_runs() == 0 || binned.n_bins() == 0 {
        return Err(Error::Render(format!(
            "group '{}' has {} runs and {} bins",
            binned.prefix(),
            binned.n_runs(),
            binned.n_bins()
        )));
    }
    let bands = estimate_bands(binned.values(), config.band_method())?;
    let trace = Trace {
        label: None,
        color: GROUP_COLOR,
        bands: &bands,
    };
    render(output_path, config, &group_title(title_prefix), &[trace])?;
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::{group_title, plot_group};
    use crate::binning::binner::BinnedResult;
    use crate::error::Error;
    use crate::plot::style::PlotConfig;
    use ndarray::{array, Array2};
    use std::fs;

    #[test]
    fn test_group_title() {
        assert_eq!(group_title("sarsa_nep_434"), "sarsa_nep_434 -- Average Binned Return");
    }

    #[test]
    fn test_empty_group_fails_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g_groupfig.png");
        for values in [Array2::zeros((0, 3)), Array2::zeros((2, 0))] {
            let binned = BinnedResult::from_array("g", values, 1);
            let err = plot_group(&binned, "g", &path, &PlotConfig::new()).unwrap_err();
            assert!(matches!(err, Error::Render(_)));
            assert!(!path.exists());
        }
    }

    fn plain_config() -> PlotConfig {
        let mut config = PlotConfig::new();
        config.set_dpi(40);
        config.set_show_text(false);
        config
    }

    #[test]
    fn test_plain_group_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g_groupfig.png");
        let binned = BinnedResult::from_array("g", array![[1.0, 2.0, 3.0], [2.0, 2.5, 4.0]], 2);
        plot_group(&binned, "g", &path, &plain_config()).unwrap();
        let data = fs::read(&path).unwrap();
        assert!(data.len() > 8);
        assert_eq!(&data[1..4], b"PNG");
    }

    #[test]
    fn test_single_bin_draws_marker_and_bars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g_groupfig.svg");
        let binned = BinnedResult::from_array("g", array![[1.0], [3.0]], 100);
        let bands = plot_group(&binned, "g", &path, &plain_config()).unwrap();
        assert_eq!(bands.mean, vec![2.0]);
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<circle"), "{}", text);
        assert!(text.matches("<line").count() >= 2, "{}", text);
    }

    #[test]
    fn test_degenerate_fig_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g_groupfig.png");
        let binned = BinnedResult::from_array("g", array![[1.0, 2.0]], 1);
        let mut config = plain_config();
        for (w, h) in [(0.0, 5.0), (-3.0, 5.0)] {
            config.set_fig_size(w, h);
            let err = plot_group(&binned, "g", &path, &config).unwrap_err();
            assert!(matches!(err, Error::Configuration(_)), "{}", err);
            assert!(!path.exists());
        }
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_plot_group_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g_groupfig.png");
        fs::write(&path, b"stale").unwrap();
        let binned = BinnedResult::from_array("g", array![[1.0, 2.0, 3.0], [2.0, 2.5, 4.0]], 2);
        let mut config = PlotConfig::new();
        config.set_dpi(40);
        let bands = plot_group(&binned, "g", &path, &config).unwrap();
        assert_eq!(bands.mean, vec![1.5, 2.25, 3.5]);
        let data = fs::read(&path).unwrap();
        assert!(data.len() > 5);
        assert_eq!(&data[1..4], b"PNG");
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_plot_group_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("g_groupfig.svg");
        let binned = BinnedResult::from_array("g", array![[1.0], [3.0]], 1);
        plot_group(&binned, "g", &path, &PlotConfig::new()).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("<svg"));
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("g_groupfig.png");
        let binned = BinnedResult::from_array("g", array![[1.0, 2.0]], 1);
        let err = plot_group(&binned, "g", &path, &PlotConfig::new()).unwrap_err();
        assert!(matches!(err, Error::IoWrite { .. }), "{}", err);
    }
}
