//! Table cleaning hook

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Clean a raw table before any other stage runs.
///
/// This is the extension point for deduplication and missing-value handling.
/// It currently passes the table through unchanged; downstream stages must not
/// rely on it for correctness.
pub fn clean(df: &DataFrame) -> Result<DataFrame> {
    debug!(rows = df.height(), cols = df.width(), "cleaning pass (identity)");
    Ok(df.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_is_identity() {
        let df = df!("a" => &[1.0, 2.0], "b" => &["x", "y"]).unwrap();
        let cleaned = clean(&df).unwrap();
        assert!(cleaned.equals(&df));
    }
}
