//! Visualization module: evaluation plots rendered with plotly.

pub mod confusion;
pub use confusion::{confusion_matrix_plot, write_confusion_matrix_html, CLASS_NAMES};
