//! Rank-based tier buckets.

use std::fmt;

/// A fixed-size rank bucket, numbered from the highest volume downward.
///
/// Ordering is numeric on the tier number, so `Tier 2` sorts before `Tier 10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tier {
    number: usize,
    size: usize,
}

impl Tier {
    /// Tier of a zero-based rank. `size` must be non-zero.
    pub fn from_rank(rank: usize, size: usize) -> Self {
        Self {
            number: rank / size + 1,
            size,
        }
    }

    /// First rank (1-based) covered by this tier.
    pub fn first_rank(&self) -> usize {
        (self.number - 1) * self.size + 1
    }

    /// Last rank (1-based) covered by this tier.
    pub fn last_rank(&self) -> usize {
        self.number * self.size
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tier {} (Top {}-{})",
            self.number,
            self.first_rank(),
            self.last_rank()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_tier_covers_ranks_zero_to_nine() {
        for rank in 0..10 {
            assert_eq!(Tier::from_rank(rank, 10).label(), "Tier 1 (Top 1-10)");
        }
        assert_eq!(Tier::from_rank(10, 10).label(), "Tier 2 (Top 11-20)");
        assert_eq!(Tier::from_rank(19, 10).label(), "Tier 2 (Top 11-20)");
        assert_eq!(Tier::from_rank(20, 10).label(), "Tier 3 (Top 21-30)");
    }

    #[test]
    fn test_boundary_switches_exactly_once() {
        let tiers: Vec<Tier> = (0..40).map(|rank| Tier::from_rank(rank, 10)).collect();
        let switches = tiers.windows(2).filter(|w| w[0] != w[1]).count();
        assert_eq!(switches, 3);
        assert_ne!(tiers[9], tiers[10]);
    }

    #[test]
    fn test_bounds_are_contiguous() {
        let mut expected_first = 1;
        for number in 1..=5 {
            let tier = Tier::from_rank((number - 1) * 7, 7);
            assert!(tier.label().starts_with(&format!("Tier {number} ")));
            assert_eq!(tier.first_rank(), expected_first);
            assert_eq!(tier.last_rank() - tier.first_rank() + 1, 7);
            expected_first = tier.last_rank() + 1;
        }
    }

    #[test]
    fn test_numeric_ordering() {
        let mut tiers = vec![
            Tier::from_rank(95, 10),
            Tier::from_rank(15, 10),
            Tier::from_rank(0, 10),
        ];
        tiers.sort();
        let labels: Vec<String> = tiers.iter().map(Tier::label).collect();
        assert_eq!(
            labels,
            vec!["Tier 1 (Top 1-10)", "Tier 2 (Top 11-20)", "Tier 10 (Top 91-100)"]
        );
    }
}
