pub mod binning;
pub mod env;
pub mod error;
pub mod plot;
pub mod report;
pub mod stats;

pub use binning::binner::{bin, BinnedResult, Binner, BinnerConfig};
pub use error::{Error, Result};
pub use plot::comparison::{plot_comparison, GroupComparisonInput};
pub use plot::group::plot_group;
pub use plot::style::PlotConfig;
