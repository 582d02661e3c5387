//! Terminal visualization using braille graphics
//!
//! Box-drawn block diagrams for series chains, a braille R(t) curve, and
//! horizontal bars for Markov steady-state probabilities.

use drawille::Canvas;

use crate::cli::helpers::truncate_str;
use crate::core::system::SeriesSummary;
use crate::entities::component::ComponentType;

/// Default canvas size for the reliability curve
pub const CURVE_WIDTH: u32 = 120;
pub const CURVE_HEIGHT: u32 = 40;

/// Width of the probability bars in characters
pub const BAR_WIDTH: usize = 40;

/// Render the series chain as a row of boxes
///
/// # Example Output
/// ```text
/// ┌──────────────────────────────────────────┐
/// │  Pump skid                               │
/// │                                          │
/// │  ┌──────┐     ┌──────┐     ┌──────┐      │
/// │  │Motor │─────│Pumps │─────│Valves│      │
/// │  │  λ   │     │  ∥   │     │ k/n  │      │
/// │  └──────┘     └──────┘     └──────┘      │
/// └──────────────────────────────────────────┘
/// ```
pub fn render_series_chain(title: &str, blocks: &[(&str, ComponentType)]) -> String {
    if blocks.is_empty() {
        return "  (no components)".to_string();
    }

    // Each block is 8 wide plus a 5-wide connector
    let count = blocks.len();
    let content_width = std::cmp::max(count * 13, title.chars().count() + 2);
    let border_width = content_width + 4;

    let pad = |mut line: String| {
        let used = line.chars().count();
        if used < border_width + 1 {
            line.push_str(&" ".repeat(border_width + 1 - used));
        }
        line.push('│');
        line
    };

    let mut lines = vec![format!("┌{}┐", "─".repeat(border_width))];
    lines.push(pad(format!("│  {}", title)));
    lines.push(pad("│".to_string()));

    let mut top = String::from("│  ");
    let mut name_line = String::from("│  ");
    let mut kind_line = String::from("│  ");
    let mut bottom = String::from("│  ");
    for (i, (name, kind)) in blocks.iter().enumerate() {
        let last = i == count - 1;
        top.push_str("┌──────┐");
        name_line.push_str(&format!("│{:<6}│", truncate_str(name, 6)));
        kind_line.push_str(&format!("│{:^6}│", type_glyph(*kind)));
        bottom.push_str("└──────┘");
        let gap = if last { "     " } else { "─────" };
        top.push_str("     ");
        name_line.push_str(gap);
        kind_line.push_str("     ");
        bottom.push_str("     ");
    }
    lines.push(pad(top));
    lines.push(pad(name_line));
    lines.push(pad(kind_line));
    lines.push(pad(bottom));
    lines.push(format!("└{}┘", "─".repeat(border_width)));

    lines.join("\n")
}

fn type_glyph(kind: ComponentType) -> &'static str {
    match kind {
        ComponentType::Simple => "λ",
        ComponentType::Series => "─n─",
        ComponentType::Parallel => "∥",
        ComponentType::KOfN => "k/n",
        ComponentType::Maintained => "PM",
    }
}

/// Render R(t) = e^(-λt) from 0 to the last sample time as a braille curve
pub fn render_reliability_curve(summary: &SeriesSummary, width: u32, height: u32) -> String {
    let t_max = summary
        .reliability
        .iter()
        .map(|p| p.time)
        .fold(0.0_f64, f64::max);
    if t_max <= 0.0 {
        return "  (no sample times)".to_string();
    }

    let mut canvas = Canvas::new(width, height);

    // Axes
    for y in 0..height {
        canvas.set(0, y);
    }
    for x in 0..width {
        canvas.set(x, height - 1);
    }

    let plot_h = (height - 1) as f64;
    for x in 0..width {
        let t = t_max * x as f64 / (width - 1).max(1) as f64;
        let r = summary.reliability_at(t);
        let y = plot_h - r * plot_h;
        canvas.set(x, y.round().clamp(0.0, plot_h) as u32);
    }

    // Sample points as small crosses
    for point in &summary.reliability {
        let px = (point.time / t_max * (width - 1) as f64).round() as u32;
        let py = (plot_h - point.reliability * plot_h).round().clamp(0.0, plot_h) as u32;
        canvas.set(px, py);
        canvas.set(px.saturating_sub(1), py);
        canvas.set((px + 1).min(width - 1), py);
        canvas.set(px, py.saturating_sub(1));
        canvas.set(px, (py + 1).min(height - 1));
    }

    let mut output = String::new();
    output.push_str("R(t) = e^(-λt):\n");
    output.push_str(&canvas.frame());
    output.push_str(&format!(
        "\n  t: 0 .. {} h   R(t_max) = {:.4}",
        t_max,
        summary.reliability_at(t_max)
    ));
    output
}

/// Render one bar per state showing its steady-state probability
///
/// ```text
///   Operational  ████████░░░░░░░░░░░░  0.4000
///   Failed       ████████████░░░░░░░░  0.6000
/// ```
pub fn render_state_bars(labels: &[String], probabilities: &[f64]) -> String {
    let label_width = labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .min(20);

    labels
        .iter()
        .zip(probabilities)
        .map(|(label, p)| {
            let filled = (p.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
            format!(
                "  {:<width$}  {}{}  {:.4}",
                truncate_str(label, 20),
                "█".repeat(filled),
                "░".repeat(BAR_WIDTH - filled),
                p,
                width = label_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
