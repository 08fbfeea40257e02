//! Data preprocessing module
//!
//! Stages applied to the raw equipment table before training:
//! - Cleaning (extension point)
//! - Identifier column removal
//! - Target binarization
//! - Stratified train/test split
//! - One-hot encoding of categoricals, fitted on train
//! - Standard scaling, fitted on train

mod cleaning;
mod columns;
mod encoder;
mod scaler;
mod split;
mod target;

pub use cleaning::clean;
pub use columns::drop_columns;
pub use encoder::{fit_encode, Encoder};
pub use scaler::{fit_scale, Scaler, ScalerType};
pub use split::{stratified_split, SplitData};
pub use target::binarize_target;
