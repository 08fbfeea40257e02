//! Column removal

use crate::error::Result;
use polars::prelude::*;

/// Drop the named columns from a table.
///
/// Names that are not present are ignored, so the operation is idempotent.
/// The input frame is left untouched.
pub fn drop_columns<S: AsRef<str>>(df: &DataFrame, cols: &[S]) -> Result<DataFrame> {
    let keep: Vec<PlSmallStr> = df
        .get_column_names()
        .into_iter()
        .filter(|name| !cols.iter().any(|c| c.as_ref() == name.as_str()))
        .cloned()
        .collect();

    if keep.len() == df.width() {
        return Ok(df.clone());
    }

    Ok(df.select(keep)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_df() -> DataFrame {
        df!(
            "UDI" => &[1i64, 2, 3],
            "Product ID" => &["M14860", "L47181", "L47182"],
            "Torque [Nm]" => &[42.8, 46.3, 49.4],
        )
        .unwrap()
    }

    #[test]
    fn test_drop_present_columns() {
        let df = sample_df();
        let result = drop_columns(&df, &["UDI", "Product ID"]).unwrap();

        assert_eq!(result.width(), 1);
        assert!(result.column("Torque [Nm]").is_ok());
        // Input unchanged
        assert_eq!(df.width(), 3);
    }

    #[test]
    fn test_missing_columns_are_ignored() {
        let df = sample_df();
        let result = drop_columns(&df, &["not_a_column"]).unwrap();
        assert_eq!(result.width(), 3);
    }

    #[test]
    fn test_drop_is_idempotent() {
        let df = sample_df();
        let once = drop_columns(&df, &["UDI"]).unwrap();
        let twice = drop_columns(&once, &["UDI"]).unwrap();
        assert!(once.equals(&twice));
    }
}
