//! Target label binarization

use crate::error::{MaintenanceError, Result};
use polars::prelude::*;

/// Collapse the multi-class failure label into {0, 1}.
///
/// `negative_label` maps to 0; every other value, nulls included, maps to 1.
/// The column keeps its name and becomes `Int64`. Must run on the full table
/// before the train/test split so both partitions share the same labels.
pub fn binarize_target(df: &DataFrame, target_col: &str, negative_label: &str) -> Result<DataFrame> {
    let column = df
        .column(target_col)
        .map_err(|_| MaintenanceError::FeatureNotFound(target_col.to_string()))?;

    let as_str = column.as_materialized_series().cast(&DataType::String)?;
    let labels: Vec<i64> = as_str
        .str()?
        .into_iter()
        .map(|v| if v == Some(negative_label) { 0 } else { 1 })
        .collect();

    let mut result = df.clone();
    result.with_column(Series::new(target_col.into(), labels))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binarize_counts() {
        let df = df!(
            "Failure Type" => &[
                "No Failure",
                "Power Failure",
                "No Failure",
                "Tool Wear Failure",
                "Heat Dissipation Failure",
            ],
        )
        .unwrap();

        let out = binarize_target(&df, "Failure Type", "No Failure").unwrap();
        let y = out.column("Failure Type").unwrap().i64().unwrap();

        assert!(y.into_iter().all(|v| matches!(v, Some(0) | Some(1))));
        assert_eq!(y.into_iter().filter(|v| *v == Some(1)).count(), 3);
        // Input untouched
        assert_eq!(df.column("Failure Type").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn test_missing_target_column() {
        let df = df!("a" => &[1, 2]).unwrap();
        let err = binarize_target(&df, "Failure Type", "No Failure").unwrap_err();
        assert!(matches!(err, MaintenanceError::FeatureNotFound(_)));
    }
}
