//! Pipeline stages

use serde::{Deserialize, Serialize};

/// Stage of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Domain knowledge relevant to the payload
    Knowledge,
    /// What the payload's data actually shows
    Data,
    /// Conclusions drawn from the two previous stages
    Reasoning,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 3] = [Stage::Knowledge, Stage::Data, Stage::Reasoning];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Knowledge => "knowledge",
            Stage::Data => "data",
            Stage::Reasoning => "reasoning",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stage::Knowledge => "Knowledge",
            Stage::Data => "Data",
            Stage::Reasoning => "Reasoning",
        }
    }

    /// 1-based position in the pipeline
    pub fn number(&self) -> usize {
        match self {
            Stage::Knowledge => 1,
            Stage::Data => 2,
            Stage::Reasoning => 3,
        }
    }

    pub fn next(&self) -> Option<Stage> {
        match self {
            Stage::Knowledge => Some(Stage::Data),
            Stage::Data => Some(Stage::Reasoning),
            Stage::Reasoning => None,
        }
    }

    pub fn is_final(&self) -> bool {
        self.next().is_none()
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order() {
        assert_eq!(Stage::Knowledge.next(), Some(Stage::Data));
        assert_eq!(Stage::Data.next(), Some(Stage::Reasoning));
        assert!(Stage::Reasoning.is_final());
        assert_eq!(Stage::ALL.map(|s| s.number()), [1, 2, 3]);
    }

    #[test]
    fn test_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Stage::Data).unwrap(), r#""data""#);
    }
}
