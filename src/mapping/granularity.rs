use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How many trailing axes a copy carries over: a 2D slice, a 3D volume or a
/// 4D series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Slice,
    Volume,
    Series,
}

impl Granularity {
    pub const ALL: [Granularity; 3] = [Granularity::Slice, Granularity::Volume, Granularity::Series];

    pub fn axes(self) -> usize {
        match self {
            Granularity::Slice => 2,
            Granularity::Volume => 3,
            Granularity::Series => 4,
        }
    }

    /// Granularities that fit both layers, smallest first.
    pub fn available(source_rank: usize, target_rank: usize) -> Vec<Granularity> {
        let rank = source_rank.min(target_rank);
        Self::ALL
            .iter()
            .copied()
            .filter(|granularity| granularity.axes() <= rank)
            .collect()
    }

    /// Volume when both layers have at least three axes, otherwise slice.
    pub fn default_for(source_rank: usize, target_rank: usize) -> Option<Granularity> {
        let available = Self::available(source_rank, target_rank);
        if available.contains(&Granularity::Volume) {
            Some(Granularity::Volume)
        } else {
            available.first().copied()
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Granularity::Slice => "slice",
            Granularity::Volume => "volume",
            Granularity::Series => "series",
        };
        formatter.write_str(name)
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "slice" | "2d" => Ok(Granularity::Slice),
            "volume" | "3d" => Ok(Granularity::Volume),
            "series" | "4d" => Ok(Granularity::Series),
            other => Err(format!("unknown granularity `{other}`")),
        }
    }
}
