//! Configuration for the arbitrage pipeline

use crate::analysis::HedgeRatioChoice;
use serde::{Deserialize, Serialize};

/// Default p-value threshold for the cointegration gate
pub const DEFAULT_SIGNIFICANCE: f64 = 0.05;
/// Default number of spread rows shown in the report
pub const DEFAULT_TAIL_ROWS: usize = 5;
/// Default |Z| at which a spread signal fires
pub const DEFAULT_ENTRY_Z: f64 = 2.0;

/// Tunables for one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    /// Pair is cointegrated when p-value < significance
    #[serde(default = "default_significance")]
    pub significance: f64,

    /// Rows of the spread table shown in the report
    #[serde(default = "default_tail_rows")]
    pub tail_rows: usize,

    /// Z-score threshold for the per-row spread signal
    #[serde(default = "default_entry_z")]
    pub entry_z: f64,

    #[serde(default, with = "hedge_ratio_serde")]
    pub hedge_ratio: HedgeRatioChoice,
}

fn default_significance() -> f64 {
    DEFAULT_SIGNIFICANCE
}
fn default_tail_rows() -> usize {
    DEFAULT_TAIL_ROWS
}
fn default_entry_z() -> f64 {
    DEFAULT_ENTRY_Z
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            significance: DEFAULT_SIGNIFICANCE,
            tail_rows: DEFAULT_TAIL_ROWS,
            entry_z: DEFAULT_ENTRY_Z,
            hedge_ratio: HedgeRatioChoice::default(),
        }
    }
}

/// `HedgeRatioChoice` travels as its command-line spelling.
mod hedge_ratio_serde {
    use crate::analysis::HedgeRatioChoice;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(choice: &HedgeRatioChoice, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(match choice {
            HedgeRatioChoice::PerRow => "per-row",
            HedgeRatioChoice::Mean => "mean",
            HedgeRatioChoice::Regression => "regression",
        })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<HedgeRatioChoice, D::Error> {
        let raw = String::deserialize(d)?;
        raw.parse().map_err(de::Error::custom)
    }
}
