//! Confusion matrix heatmap

use crate::error::Result;
use crate::training::ConfusionMatrix;
use plotly::common::{ColorScale, ColorScalePalette};
use plotly::layout::{Annotation, Axis, Layout};
use plotly::{HeatMap, Plot};
use std::path::Path;
use tracing::info;

/// Display names for labels 0 and 1
pub const CLASS_NAMES: [&str; 2] = ["No Failure", "Failure"];

/// Build a 2x2 heatmap of `cm`.
///
/// Columns are the predicted label, rows the actual label, with "No Failure"
/// in the top-left cell. Cells are annotated with counts, or with row
/// rates to two decimals when `normalize` is set.
pub fn confusion_matrix_plot(cm: &ConfusionMatrix, title: &str, normalize: bool) -> Plot {
    let values: [[f64; 2]; 2] = if normalize {
        cm.normalized()
    } else {
        let m = cm.matrix;
        [
            [m[0][0] as f64, m[0][1] as f64],
            [m[1][0] as f64, m[1][1] as f64],
        ]
    };

    let cell_text = |actual: usize, predicted: usize| -> String {
        if normalize {
            format!("{:.2}", values[actual][predicted])
        } else {
            cm.matrix[actual][predicted].to_string()
        }
    };

    // Plotly draws the first y category at the bottom
    let x: Vec<&str> = CLASS_NAMES.to_vec();
    let y: Vec<&str> = vec![CLASS_NAMES[1], CLASS_NAMES[0]];
    let z: Vec<Vec<f64>> = vec![values[1].to_vec(), values[0].to_vec()];

    let trace = HeatMap::new(x, y, z)
        .color_scale(ColorScale::Palette(ColorScalePalette::Blues))
        .show_scale(true);

    let annotations: Vec<Annotation> = (0..2)
        .flat_map(|actual| (0..2).map(move |predicted| (actual, predicted)))
        .map(|(actual, predicted)| {
            Annotation::new()
                .x(CLASS_NAMES[predicted])
                .y(CLASS_NAMES[actual])
                .text(cell_text(actual, predicted))
                .show_arrow(false)
        })
        .collect();

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title("Predicted Label"))
        .y_axis(Axis::new().title("Actual Label"))
        .annotations(annotations);

    let mut plot = Plot::new();
    plot.add_trace(trace);
    plot.set_layout(layout);
    plot
}

/// Render the count heatmap of `cm` to a standalone HTML file
pub fn write_confusion_matrix_html(
    cm: &ConfusionMatrix,
    title: &str,
    path: impl AsRef<Path>,
) -> Result<()> {
    let plot = confusion_matrix_plot(cm, title, false);
    std::fs::write(path.as_ref(), plot.to_html())?;
    info!("Wrote confusion matrix plot to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> ConfusionMatrix {
        ConfusionMatrix {
            matrix: [[50, 3], [2, 7]],
        }
    }

    #[test]
    fn test_plot_labels_and_counts() {
        let json = confusion_matrix_plot(&sample(), "Confusion Matrix", false).to_json();

        assert!(json.contains("Predicted Label"));
        assert!(json.contains("Actual Label"));
        assert!(json.contains("No Failure"));
        assert!(json.contains("\"text\":\"50\""));
    }

    #[test]
    fn test_normalized_annotations() {
        let json = confusion_matrix_plot(&sample(), "Normalized", true).to_json();
        // 7 / 9 of actual failures predicted correctly
        assert!(json.contains("\"text\":\"0.78\""));
    }

    #[test]
    fn test_write_html() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("cm.html");

        write_confusion_matrix_html(&sample(), "Confusion Matrix", &path).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("Predicted Label"));
    }
}
