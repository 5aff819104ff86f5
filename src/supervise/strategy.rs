//! Restart strategies and fan-out resolution.
//!
//! The strategy selects which siblings are stopped and restarted together
//! when one child needs restarting. Entries outside the fan-out set are
//! left untouched and keep running.

/// Supervisor-level restart fan-out policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartStrategy {
    /// Only the failing child is restarted.
    OneForOne,
    /// All live children are stopped and restarted, in start order.
    OneForAll,
    /// The failing child and every child started after it are stopped and
    /// restarted, in start order.
    RestForOne,
}

impl RestartStrategy {
    /// Resolves the fan-out set.
    ///
    /// `failing` is the start-order position of the failing entry; `live`
    /// holds the positions of all entries that currently have an instance,
    /// in ascending start order (the failing entry included). The returned
    /// positions are in start order.
    pub(crate) fn affected(self, failing: u64, live: &[u64]) -> Vec<u64> {
        match self {
            RestartStrategy::OneForOne => vec![failing],
            RestartStrategy::OneForAll => live.to_vec(),
            RestartStrategy::RestForOne => {
                live.iter().copied().filter(|&p| p >= failing).collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIVE: [u64; 4] = [0, 1, 2, 3];

    #[test]
    fn one_for_one_targets_only_the_failing_entry() {
        assert_eq!(RestartStrategy::OneForOne.affected(2, &LIVE), vec![2]);
    }

    #[test]
    fn one_for_all_targets_every_live_entry() {
        assert_eq!(
            RestartStrategy::OneForAll.affected(2, &LIVE),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn rest_for_one_targets_failing_and_later_entries() {
        assert_eq!(RestartStrategy::RestForOne.affected(2, &LIVE), vec![2, 3]);
        assert_eq!(
            RestartStrategy::RestForOne.affected(0, &LIVE),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn fan_out_skips_removed_positions() {
        // Position 1 was removed earlier (e.g. a Temporary child).
        let live = [0, 2, 3];
        assert_eq!(RestartStrategy::OneForAll.affected(2, &live), vec![0, 2, 3]);
        assert_eq!(RestartStrategy::RestForOne.affected(2, &live), vec![2, 3]);
    }
}
