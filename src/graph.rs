use crate::budget::{Budget, BudgetClass};
use crate::curve::CurvePoint;
use crate::error::{Error, Result};
use crate::fonts;
use crate::format::dollars;
use log::warn;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::PathBuf;

const BACKGROUND: RGBColor = RGBColor(0xf4, 0xf4, 0xf4);
const LABEL_COLOR: RGBColor = RGBColor(0x22, 0x22, 0x22);

/// Configuration options for the creaming-curve chart
#[derive(Clone, Debug)]
pub struct GraphOptions {
    /// Title displayed at the top of the graph
    pub title: String,

    /// Label for the X-axis
    pub x_label: String,

    /// Label for the Y-axis
    pub y_label: String,

    /// Width of the graph in pixels
    pub width: u32,

    /// Height of the graph in pixels
    pub height: u32,

    /// Radius of each project marker in pixels
    pub point_size: i32,

    /// Draw text (caption, axis labels, legend, point annotations).
    /// Turned off automatically when the host has no usable fonts.
    pub labels: bool,

    /// TrueType file for chart text; system fonts are searched when unset
    pub font_path: Option<PathBuf>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            title: "Cumulative Cost vs. Cumulative Savings".to_string(),
            x_label: "Cumulative Cost ($ K)".to_string(),
            y_label: "Cumulative Savings ($ K)".to_string(),
            width: 1200,
            height: 600,
            point_size: 8,
            labels: true,
            font_path: None,
        }
    }
}

struct Group {
    class: BudgetClass,
    color: RGBColor,
    legend: &'static str,
}

const GROUPS: [Group; 3] = [
    Group {
        class: BudgetClass::WithinBudget,
        color: GREEN,
        legend: "Projects within Budget",
    },
    Group {
        class: BudgetClass::OutsideBudget,
        color: RED,
        legend: "Projects outside Budget",
    },
    Group {
        class: BudgetClass::Unpartitioned,
        color: BLUE,
        legend: "Projects",
    },
];

fn chart_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> Error {
    Error::Chart(e.to_string())
}

/// Draws the creaming curve onto a caller-supplied drawing area.
///
/// Points are plotted at (cumulative cost, cumulative savings) and colored by
/// `classes`, which must be in the same order as `points`. Points with a
/// non-finite coordinate are skipped. With a budget set, a dashed vertical
/// line marks the threshold.
pub fn draw_curve<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    points: &[CurvePoint],
    classes: &[BudgetClass],
    budget: Budget,
    options: &GraphOptions,
) -> Result<()> {
    root.fill(&BACKGROUND).map_err(chart_err)?;

    let visible: Vec<(&CurvePoint, BudgetClass)> = points
        .iter()
        .zip(classes.iter().copied())
        .filter(|(p, _)| p.cumulative_cost.is_finite() && p.cumulative_savings.is_finite())
        .collect();

    let xs = visible.iter().map(|(p, _)| p.cumulative_cost);
    let x_range = padded_range(xs.chain(budget.is_set().then(|| budget.amount())));
    let y_range = padded_range(visible.iter().map(|(p, _)| p.cumulative_savings));
    let (y_lo, y_hi) = (y_range.start, y_range.end);

    let mut builder = ChartBuilder::on(root);
    builder.margin(20);
    if options.labels {
        builder
            .caption(&options.title, ("sans-serif", 28).into_font())
            .x_label_area_size(50)
            .y_label_area_size(70);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_err)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(RGBAColor(128, 128, 128, 0.2));
        if options.labels {
            mesh.x_desc(&options.x_label).y_desc(&options.y_label);
        } else {
            mesh.x_labels(0).y_labels(0);
        }
        mesh.draw().map_err(chart_err)?;
    }

    for group in &GROUPS {
        let coords: Vec<(f64, f64)> = visible
            .iter()
            .filter(|(_, class)| *class == group.class)
            .map(|(p, _)| (p.cumulative_cost, p.cumulative_savings))
            .collect();
        if coords.is_empty() {
            continue;
        }

        let color = group.color;
        let size = options.point_size;
        let anno = chart
            .draw_series(coords.into_iter().map(|c| {
                EmptyElement::at(c)
                    + Circle::new((0, 0), size, color.mix(0.8).filled())
                    + Circle::new((0, 0), size, BLACK.stroke_width(1))
            }))
            .map_err(chart_err)?;
        if options.labels {
            anno.label(group.legend)
                .legend(move |(x, y)| Circle::new((x, y), 5, color.filled()));
        }
    }

    if budget.is_set() {
        let x = budget.amount();
        let dash = (y_hi - y_lo) / 40.0;
        let segments = (0..40)
            .step_by(2)
            .map(|i| y_lo + dash * i as f64)
            .map(|start| PathElement::new(vec![(x, start), (x, start + dash)], RED.stroke_width(2)));
        let anno = chart.draw_series(segments).map_err(chart_err)?;
        if options.labels {
            anno.label(format!("Budget: {} K", dollars(x)))
                .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED.stroke_width(2)));
        }
    }

    if options.labels {
        let style = ("sans-serif", 12)
            .into_font()
            .transform(FontTransform::Rotate270)
            .color(&LABEL_COLOR);
        chart
            .draw_series(visible.iter().map(|(p, _)| {
                EmptyElement::at((p.cumulative_cost, p.cumulative_savings))
                    + Text::new(
                        format!("{}  ({})", p.name, dollars(p.cumulative_cost)),
                        (-6, -14),
                        style.clone(),
                    )
            }))
            .map_err(chart_err)?;

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE)
            .border_style(BLACK)
            .draw()
            .map_err(chart_err)?;
    }

    Ok(())
}

// Data range with 5% headroom; never empty, always includes zero.
fn padded_range(values: impl Iterator<Item = f64>) -> std::ops::Range<f64> {
    let (lo, hi) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let span = if hi > lo { hi - lo } else { 1.0 };
    (lo - span * 0.05)..(hi + span * 0.05)
}

/// Renders the chart to PNG bytes.
///
/// Draws into an in-memory RGB buffer and encodes it with the `image` crate.
/// If no font can be registered, or text drawing fails anyway, the chart is
/// drawn without any text rather than failing the whole request.
///
/// # Examples
/// ```no_run
/// use creaming::budget::Budget;
/// use creaming::graph::{GraphOptions, render_png};
///
/// let png = render_png(&[], &[], Budget::default(), &GraphOptions::default()).unwrap();
/// assert!(png.starts_with(b"\x89PNG"));
/// ```
pub fn render_png(
    points: &[CurvePoint],
    classes: &[BudgetClass],
    budget: Budget,
    options: &GraphOptions,
) -> Result<Vec<u8>> {
    let plain = || GraphOptions {
        labels: false,
        ..options.clone()
    };
    if options.labels && fonts::ensure_registered(options.font_path.as_deref()).is_none() {
        return render_png_with(points, classes, budget, &plain());
    }

    match render_png_with(points, classes, budget, options) {
        Err(Error::Chart(msg)) if options.labels => {
            warn!("chart text rendering failed ({}); drawing without labels", msg);
            render_png_with(points, classes, budget, &plain())
        }
        other => other,
    }
}

fn render_png_with(
    points: &[CurvePoint],
    classes: &[BudgetClass],
    budget: Budget,
    options: &GraphOptions,
) -> Result<Vec<u8>> {
    use image::ImageEncoder;
    use image::codecs::png::PngEncoder;

    let (width, height) = (options.width, options.height);
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, (width, height)).into_drawing_area();
        draw_curve(&root, points, classes, budget, options)?;
        root.present().map_err(chart_err)?;
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png).write_image(&pixels, width, height, image::ColorType::Rgb8)?;
    Ok(png)
}
