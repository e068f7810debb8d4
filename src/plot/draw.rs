use crate::error::{Error, Result};
use crate::plot::style::PlotConfig;
use crate::stats::band::{Band, GroupBands};
use plotters::coord::ranged1d::{IntoSegmentedCoord, SegmentValue};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::fs;
use std::path::Path;

pub(crate) struct Trace<'a> {
    pub label: Option<&'a str>,
    pub color: RGBColor,
    pub bands: &'a GroupBands,
}

fn render_err<E: std::error::Error + Send + Sync>(err: DrawingAreaErrorKind<E>) -> Error {
    Error::Render(err.to_string())
}

fn write_err<E: std::error::Error + Send + Sync>(path: &Path, err: DrawingAreaErrorKind<E>) -> Error {
    Error::IoWrite {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

pub(crate) fn render(path: &Path, config: &PlotConfig, title: &str, traces: &[Trace]) -> Result<()> {
    let n_bins = traces.first().map(|t| t.bands.n_bins()).unwrap_or(0);
    if n_bins == 0 || traces.iter().any(|t| t.bands.n_bins() != n_bins) {
        return Err(Error::Render(format!("nothing to draw for '{}'", title)));
    }

    let size = config.pixel_size()?;
    let is_svg = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("svg"))
        .unwrap_or(false);
    let result = if is_svg {
        let root = SVGBackend::new(path, size).into_drawing_area();
        draw_chart(&root, config, title, traces)
            .and_then(|_| root.present().map_err(|e| write_err(path, e)))
    } else {
        let root = BitMapBackend::new(path, size).into_drawing_area();
        draw_chart(&root, config, title, traces)
            .and_then(|_| root.present().map_err(|e| write_err(path, e)))
    };

    match result {
        Ok(()) => {
            tracing::info!(path = %path.display(), traces = traces.len(), "wrote figure");
            Ok(())
        }
        Err(err) => {
            // The bitmap backend flushes on drop, so a failed draw can leave a partial image.
            let _ = fs::remove_file(path);
            Err(err)
        }
    }
}

fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    config: &PlotConfig,
    title: &str,
    traces: &[Trace],
) -> Result<()> {
    let font = ("sans-serif", f64::from(config.font_size()));
    let n_bins = traces[0].bands.n_bins();
    let (y_lo, y_hi) = traces
        .iter()
        .map(|t| t.bands.y_range())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (l, h)| {
            (lo.min(l), hi.max(h))
        });
    let pad = if y_hi > y_lo {
        (y_hi - y_lo) * 0.05
    } else {
        (y_hi.abs() * 0.05).max(0.5)
    };

    root.fill(&WHITE).map_err(render_err)?;
    let mut builder = ChartBuilder::on(root);
    builder.margin(10);
    if config.show_text() {
        builder
            .caption(title, font)
            .x_label_area_size(config.font_size() * 3)
            .y_label_area_size(config.font_size() * 4);
    }
    let mut chart = builder
        .build_cartesian_2d((0usize..n_bins).into_segmented(), (y_lo - pad)..(y_hi + pad))
        .map_err(render_err)?;

    if config.show_text() {
        chart
            .configure_mesh()
            .x_desc("Bin")
            .y_desc("Average Return")
            .x_labels(n_bins.min(12))
            .label_style(font)
            .axis_desc_style(font)
            .draw()
            .map_err(render_err)?;
    }

    for trace in traces {
        let color = trace.color;
        for (band, width) in [(&trace.bands.outer, 2), (&trace.bands.inner, 5)] {
            if n_bins == 1 {
                chart
                    .draw_series(std::iter::once(ErrorBar::new_vertical(
                        SegmentValue::CenterOf(0),
                        band.lower[0],
                        trace.bands.mean[0],
                        band.upper[0],
                        color.mix(0.4).stroke_width(width),
                        12,
                    )))
                    .map_err(render_err)?;
            } else {
                let outline = band_outline(band)
                    .into_iter()
                    .map(|(bin, y)| (SegmentValue::CenterOf(bin), y))
                    .collect::<Vec<_>>();
                chart
                    .draw_series(std::iter::once(Polygon::new(outline, color.mix(0.2).filled())))
                    .map_err(render_err)?;
            }
        }

        let mean = trace
            .bands
            .mean
            .iter()
            .enumerate()
            .map(|(bin, &y)| (SegmentValue::CenterOf(bin), y));
        let series = if n_bins == 1 {
            chart
                .draw_series(mean.map(|point| Circle::new(point, 5, color.filled())))
                .map_err(render_err)?
        } else {
            chart
                .draw_series(LineSeries::new(mean, ShapeStyle::from(&color).stroke_width(2)))
                .map_err(render_err)?
        };
        if let Some(label) = trace.label {
            series
                .label(label)
                .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
        }
    }

    if config.show_text() && traces.iter().any(|t| t.label.is_some()) {
        chart
            .configure_series_labels()
            .label_font(font)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;
    }
    Ok(())
}

// Closed outline of a band: upper edge left to right, then lower edge back.
fn band_outline(band: &Band) -> Vec<(usize, f64)> {
    band.upper
        .iter()
        .copied()
        .enumerate()
        .chain(band.lower.iter().copied().enumerate().rev())
        .collect()
}
