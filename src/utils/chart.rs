use std::path::Path;

use log::info;
use plotters::prelude::*;

use crate::analyzers::extensions::{display_name, ExtensionCount};
use crate::utils::file_ops::ensure_parent_directory;
use crate::{MediaError, Result};

const SIZE: (u32, u32) = (1000, 600);

fn chart_error(e: impl std::fmt::Display) -> MediaError {
    MediaError::Chart(e.to_string())
}

/// Render a bar chart of extension counts to a PNG file.
pub fn render_extension_chart(counts: &[ExtensionCount], output_path: impl AsRef<Path>) -> Result<()> {
    let output_path = output_path.as_ref();
    if counts.is_empty() {
        return Err(MediaError::Chart("no extensions to plot".into()));
    }
    ensure_parent_directory(output_path)?;

    let labels: Vec<String> = counts
        .iter()
        .map(|c| display_name(&c.extension).to_string())
        .collect();
    let bars = counts.len() as u32;
    let max_count = counts.iter().map(|c| c.count).max().unwrap_or(0) as u32;

    let root = BitMapBackend::new(output_path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Extension distribution", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..bars).into_segmented(), 0u32..max_count + 1)
        .map_err(chart_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("Extension")
        .y_desc("Count")
        .x_labels(labels.len())
        .x_label_formatter(&|value| match value {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        })
        .draw()
        .map_err(chart_error)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BLUE.mix(0.8).filled())
                .margin(10)
                .data(counts.iter().enumerate().map(|(i, c)| (i as u32, c.count as u32))),
        )
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;
    info!("Chart written: {} ({} extensions)", output_path.display(), bars);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refuses_to_plot_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.png");

        let result = render_extension_chart(&[], &path);

        assert!(matches!(result, Err(MediaError::Chart(_))));
        assert!(!path.exists());
    }
}
