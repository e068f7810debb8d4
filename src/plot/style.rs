use crate::error::{Error, Result};
use crate::stats::band::BandMethod;
use plotters::style::RGBColor;
use std::path::{Path, PathBuf};

pub const GROUP_COLOR: RGBColor = RGBColor(191, 0, 191);

pub const DEFAULT_PALETTE: [RGBColor; 10] = [
    RGBColor(76, 114, 176),
    RGBColor(221, 132, 82),
    RGBColor(85, 168, 104),
    RGBColor(196, 78, 82),
    RGBColor(129, 114, 179),
    RGBColor(147, 120, 96),
    RGBColor(218, 139, 195),
    RGBColor(140, 140, 140),
    RGBColor(204, 185, 116),
    RGBColor(100, 181, 205),
];

pub fn group_figure_path(directory: &Path, prefix: &str) -> PathBuf {
    directory.join(format!("{}_groupfig.png", prefix))
}

pub fn comparison_figure_path(directory: &Path) -> PathBuf {
    directory.join("group_comparison.png")
}

#[derive(Debug, Clone)]
pub struct PlotConfig {
    fig_size: (f64, f64),
    dpi: u32,
    font_size: u32,
    band_method: BandMethod,
    palette: Vec<RGBColor>,
    show_text: bool,
}

impl PlotConfig {
    pub fn new() -> Self {
        PlotConfig {
            fig_size: (12.0, 5.0),
            dpi: 100,
            font_size: 18,
            band_method: BandMethod::default(),
            palette: DEFAULT_PALETTE.to_vec(),
            show_text: true,
        }
    }

    pub fn set_fig_size(&mut self, width: f64, height: f64) {
        self.fig_size = (width, height);
    }
    pub fn set_dpi(&mut self, dpi: u32) {
        self.dpi = dpi;
    }
    pub fn set_font_size(&mut self, font_size: u32) {
        self.font_size = font_size;
    }
    pub fn set_band_method(&mut self, band_method: BandMethod) {
        self.band_method = band_method;
    }
    pub fn set_palette(&mut self, palette: Vec<RGBColor>) {
        self.palette = palette;
    }

    // Without text no font is needed: no title, axis labels or legend.
    pub fn set_show_text(&mut self, show_text: bool) {
        self.show_text = show_text;
    }

    pub fn show_text(&self) -> bool {
        self.show_text
    }
    pub fn fig_size(&self) -> (f64, f64) {
        self.fig_size
    }
    pub fn font_size(&self) -> u32 {
        self.font_size
    }
    pub fn band_method(&self) -> BandMethod {
        self.band_method
    }

    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        let (w, h) = self.fig_size;
        let dpi = f64::from(self.dpi);
        let to_pixels = |inches: f64| {
            let pixels = (inches * dpi).round();
            if pixels.is_finite() && pixels >= 1.0 && pixels <= f64::from(u32::MAX) {
                Ok(pixels as u32)
            } else {
                Err(Error::Configuration(format!(
                    "fig_size {}x{} in at {} dpi does not give a drawable image",
                    w, h, self.dpi
                )))
            }
        };
        Ok((to_pixels(w)?, to_pixels(h)?))
    }

    pub fn color(&self, idx: usize) -> RGBColor {
        if self.palette.is_empty() {
            DEFAULT_PALETTE[idx % DEFAULT_PALETTE.len()]
        } else {
            self.palette[idx % self.palette.len()]
        }
    }
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self::new()
    }
}
