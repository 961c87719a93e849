//! Output format value object

use serde::{Deserialize, Serialize};

/// How a pipeline run is rendered for the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Every stage with contributors, failures and warnings
    Full,
    /// Only the final consensus value (default)
    #[default]
    Final,
    /// The whole pipeline report as JSON
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_final() {
        assert_eq!(OutputFormat::default(), OutputFormat::Final);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&OutputFormat::Full).unwrap(), "\"full\"");
        let format: OutputFormat = serde_json::from_str("\"json\"").unwrap();
        assert_eq!(format, OutputFormat::Json);
    }
}
