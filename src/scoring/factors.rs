use anyhow::{bail, Result};

/// A set of 1-based ranks, written as "<N", "<=N", ">N", ">=N", "N-M" or "N".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankRange {
    Below(u32),
    AtMost(u32),
    Above(u32),
    AtLeast(u32),
    Exactly(u32),
    Between(u32, u32), // inclusive
}

impl RankRange {
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let range = if let Some(val) = s.strip_prefix(">=") {
            RankRange::AtLeast(val.trim().parse()?)
        } else if let Some(val) = s.strip_prefix("<=") {
            RankRange::AtMost(val.trim().parse()?)
        } else if let Some(val) = s.strip_prefix('>') {
            RankRange::Above(val.trim().parse()?)
        } else if let Some(val) = s.strip_prefix('<') {
            RankRange::Below(val.trim().parse()?)
        } else if let Some((low, high)) = s.split_once('-') {
            let low: u32 = low.trim().parse()?;
            let high: u32 = high.trim().parse()?;
            if low > high {
                bail!("Empty rank range: {}", s);
            }
            RankRange::Between(low, high)
        } else {
            RankRange::Exactly(s.parse()?)
        };
        Ok(range)
    }

    pub fn contains(&self, rank: u32) -> bool {
        match *self {
            RankRange::Below(n) => rank < n,
            RankRange::AtMost(n) => rank <= n,
            RankRange::Above(n) => rank > n,
            RankRange::AtLeast(n) => rank >= n,
            RankRange::Exactly(n) => rank == n,
            RankRange::Between(low, high) => rank >= low && rank <= high,
        }
    }
}

/// Points for a rank from an ordered bucket list. First match wins; a rank no
/// bucket covers scores zero.
pub fn points_for_rank(buckets: &[(RankRange, u32)], rank: u32) -> u32 {
    buckets
        .iter()
        .find(|(range, _)| range.contains(rank))
        .map(|(_, points)| *points)
        .unwrap_or(0)
}

/// Points for a finishing position from a positional table (index 0 = P1)
pub fn points_for_position(table: &[u32], position: u32) -> u32 {
    position
        .checked_sub(1)
        .and_then(|i| table.get(i as usize))
        .copied()
        .unwrap_or(0)
}
