use crate::binning::binner::BinnedResult;
use crate::error::{Error, Result};
use crate::plot::draw::{render, Trace};
use crate::plot::style::PlotConfig;
use crate::stats::band::{estimate_bands, GroupBands};
use ndarray::{Array3, Axis};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct GroupComparisonInput {
    groups: Vec<BinnedResult>,
    keys: Vec<String>,
    min_length: usize,
}

impl GroupComparisonInput {
    pub fn new(groups: Vec<BinnedResult>) -> Self {
        let keys = groups.iter().map(|g| g.prefix().to_string()).collect();
        Self::with_keys(groups, keys)
    }

    pub fn with_keys(groups: Vec<BinnedResult>, keys: Vec<String>) -> Self {
        let min_length = groups.iter().map(BinnedResult::n_runs).min().unwrap_or(0);
        GroupComparisonInput {
            groups,
            keys,
            min_length,
        }
    }

    pub fn groups(&self) -> &[BinnedResult] {
        &self.groups
    }
    pub fn keys(&self) -> &[String] {
        &self.keys
    }
    pub fn min_length(&self) -> usize {
        self.min_length
    }

    fn check_shapes(&self) -> Result<(usize, usize)> {
        let first = self
            .groups
            .first()
            .ok_or_else(|| Error::Render("no groups to compare".into()))?;
        if self.keys.len() != self.groups.len() {
            return Err(Error::Configuration(format!(
                "{} labels given for {} groups",
                self.keys.len(),
                self.groups.len()
            )));
        }
        let shape = first.shape();
        for (key, group) in self.keys.iter().zip(&self.groups) {
            if group.shape() != shape {
                return Err(Error::ShapeMismatch(format!(
                    "group '{}' is {} runs x {} bins but '{}' is {} runs x {} bins",
                    key,
                    group.n_runs(),
                    group.n_bins(),
                    self.keys[0],
                    shape.0,
                    shape.1
                )));
            }
        }
        Ok(shape)
    }

    pub fn stack(&self) -> Result<Array3<f64>> {
        self.check_shapes()?;
        let views: Vec<_> = self.groups.iter().map(|g| g.values().view()).collect();
        ndarray::stack(Axis(2), &views).map_err(|e| Error::ShapeMismatch(e.to_string()))
    }
}

pub fn comparison_title(min_length: usize) -> String {
    format!("Average Return by Group, N={}", min_length)
}

pub fn plot_comparison(
    input: &GroupComparisonInput,
    output_path: &Path,
    config: &PlotConfig,
) -> Result<Vec<GroupBands>> {
    let stacked = input.stack()?;
    let bands = stacked
        .axis_iter(Axis(2))
        .map(|group| estimate_bands(&group.to_owned(), config.band_method()))
        .collect::<Result<Vec<_>>>()?;

    let traces: Vec<Trace> = bands
        .iter()
        .zip(input.keys())
        .enumerate()
        .map(|(idx, (bands, key))| Trace {
            label: Some(key.as_str()),
            color: config.color(idx),
            bands,
        })
        .collect();
    render(output_path, config, &comparison_title(input.min_length()), &traces)?;
    Ok(bands)
}

#[cfg(test)]
mod tests {
    use super::{comparison_title, plot_comparison, GroupComparisonInput};
    use crate::binning::binner::BinnedResult;
    use crate::error::Error;
    use crate::plot::style::PlotConfig;
    use ndarray::array;
    use std::fs;

    fn group(prefix: &str, offset: f64) -> BinnedResult {
        BinnedResult::from_array(
            prefix,
            array![[1.0, 2.0, 3.0], [2.0, 3.0, 4.0]].mapv(|v| v + offset),
            10,
        )
    }

    #[test]
    fn test_stack_layout() {
        let input = GroupComparisonInput::new(vec![group("a", 0.0), group("b", 10.0)]);
        assert_eq!(input.keys(), &["a".to_string(), "b".to_string()]);
        assert_eq!(input.min_length(), 2);
        let stacked = input.stack().unwrap();
        assert_eq!(stacked.dim(), (2, 3, 2));
        assert_eq!(stacked[(1, 2, 0)], 4.0);
        assert_eq!(stacked[(1, 2, 1)], 14.0);
    }

    #[test]
    fn test_shape_mismatch_before_render() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_comparison.png");
        let short = BinnedResult::from_array("c", array![[1.0, 2.0]], 10);
        let input = GroupComparisonInput::new(vec![group("a", 0.0), short]);
        assert_eq!(input.min_length(), 1);
        let err = plot_comparison(&input, &path, &PlotConfig::new()).unwrap_err();
        match err {
            Error::ShapeMismatch(msg) => assert!(msg.contains("'c'"), "{}", msg),
            e => panic!("unexpected error {}", e),
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_empty_and_mislabelled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_comparison.png");
        let empty = GroupComparisonInput::new(Vec::new());
        assert!(matches!(
            plot_comparison(&empty, &path, &PlotConfig::new()),
            Err(Error::Render(_))
        ));
        let mislabelled = GroupComparisonInput::with_keys(vec![group("a", 0.0)], Vec::new());
        assert!(matches!(mislabelled.stack(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_groups_from_files() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("sarsa_1.csv", "1\n2\n3\n4\n"),
            ("sarsa_2.csv", "3\n4\n5\n6\n"),
            ("qlearn_1.csv", "0\n0\n1\n1\n"),
            ("qlearn_2.csv", "2\n2\n3\n3\n"),
        ] {
            fs::write(dir.path().join(name), body).unwrap();
        }
        let groups = ["sarsa", "qlearn"]
            .iter()
            .map(|prefix| crate::bin(dir.path(), prefix, 2).unwrap())
            .collect();
        let input = GroupComparisonInput::new(groups);
        let stacked = input.stack().unwrap();
        assert_eq!(stacked.dim(), (2, 2, 2));
        assert_eq!(stacked[(0, 1, 0)], 3.5);
        assert_eq!(stacked[(1, 0, 1)], 2.0);
    }

    #[test]
    fn test_comparison_title() {
        assert_eq!(comparison_title(5), "Average Return by Group, N=5");
    }

    #[test]
    fn test_plain_comparison_writes_svg() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_comparison.svg");
        let input = GroupComparisonInput::new(vec![group("a", 0.0), group("b", 1.0)]);
        let mut config = PlotConfig::new();
        config.set_show_text(false);
        plot_comparison(&input, &path, &config).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.matches("<polygon").count() >= 4, "{}", text);
        assert!(text.matches("<polyline").count() >= 2, "{}", text);
    }

    #[test]
    #[ignore = "needs a system sans-serif font"]
    fn test_plot_comparison_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("group_comparison.png");
        let input = GroupComparisonInput::new(vec![group("a", 0.0), group("b", 1.0)]);
        let mut config = PlotConfig::new();
        config.set_dpi(40);
        let bands = plot_comparison(&input, &path, &config).unwrap();
        assert_eq!(bands.len(), 2);
        assert_eq!(bands[1].mean, vec![2.5, 3.5, 4.5]);
        assert!(fs::metadata(&path).unwrap().len() > 0);
    }
}
