use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CoreError;

/// Semantic axis vocabulary. Layers always carry Y and X as their last two axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AxisName {
    C,
    T,
    Z,
    Y,
    X,
}

impl AxisName {
    pub const CANONICAL: [AxisName; 5] = [
        AxisName::C,
        AxisName::T,
        AxisName::Z,
        AxisName::Y,
        AxisName::X,
    ];

    /// Channel and time axes have no physical extent; their scale is pinned to 1.
    pub fn has_pinned_scale(self) -> bool {
        matches!(self, AxisName::C | AxisName::T)
    }

    /// Right-aligned default names for a layer of the given rank (rank 3 -> Z, Y, X).
    pub fn defaults_for_rank(rank: usize) -> Vec<AxisName> {
        let skip = Self::CANONICAL.len().saturating_sub(rank);
        Self::CANONICAL.iter().skip(skip).copied().collect()
    }
}

impl fmt::Display for AxisName {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AxisName::C => "C",
            AxisName::T => "T",
            AxisName::Z => "Z",
            AxisName::Y => "Y",
            AxisName::X => "X",
        };
        formatter.write_str(name)
    }
}

impl FromStr for AxisName {
    type Err = CoreError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "C" => Ok(AxisName::C),
            "T" => Ok(AxisName::T),
            "Z" => Ok(AxisName::Z),
            "Y" => Ok(AxisName::Y),
            "X" => Ok(AxisName::X),
            other => Err(CoreError::InvalidMetadata(format!(
                "unknown axis name `{other}`"
            ))),
        }
    }
}

/// One entry of an addressed region: a fixed index or a free (whole) axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisIndex {
    Fixed(usize),
    Free,
}

impl AxisIndex {
    pub fn fixed(self) -> Option<usize> {
        match self {
            AxisIndex::Fixed(index) => Some(index),
            AxisIndex::Free => None,
        }
    }
}
