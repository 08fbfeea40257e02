//! Utility functions and types

pub mod data_loader;

pub use data_loader::{
    array2_to_frame, column_names, columns_to_array2, frame_to_array2, load_csv,
    series_to_labels, DataLoader,
};
