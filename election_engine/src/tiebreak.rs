use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of the coin tosses that settle ties.
pub trait TieBreaker {
    /// Picks one participant of an `n`-way tie, as an index in `0..n`.
    fn resolve_tie(&mut self, n: usize) -> usize;
}

/// Draws from a generator reseeded from the clock at every call.
///
/// Outcomes are not reproducible across runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClockTieBreaker;

impl TieBreaker for ClockTieBreaker {
    fn resolve_tie(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        let mut rng = StdRng::seed_from_u64(seed);
        let res = rng.gen_range(0..n);
        debug!("ClockTieBreaker: {}-way tie resolved to {}", n, res);
        res
    }
}

/// Draws from a single generator seeded once. The same seed replays the same tosses.
#[derive(Debug, Clone)]
pub struct SeededTieBreaker {
    rng: StdRng,
}

impl SeededTieBreaker {
    pub fn new(seed: u64) -> SeededTieBreaker {
        SeededTieBreaker {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl TieBreaker for SeededTieBreaker {
    fn resolve_tie(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        let res = self.rng.gen_range(0..n);
        debug!("SeededTieBreaker: {}-way tie resolved to {}", n, res);
        res
    }
}

/// Replays a fixed list of outcomes, then falls back to the first participant.
///
/// Each scripted value is reduced modulo `n`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedTieBreaker {
    outcomes: VecDeque<usize>,
    pub calls: Vec<usize>,
}

impl ScriptedTieBreaker {
    pub fn new(outcomes: &[usize]) -> ScriptedTieBreaker {
        ScriptedTieBreaker {
            outcomes: outcomes.iter().cloned().collect(),
            calls: Vec::new(),
        }
    }
}

impl TieBreaker for ScriptedTieBreaker {
    fn resolve_tie(&mut self, n: usize) -> usize {
        self.calls.push(n);
        if n <= 1 {
            return 0;
        }
        self.outcomes.pop_front().map(|x| x % n).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn draws_stay_in_range() {
        let mut clock = ClockTieBreaker;
        let mut seeded = SeededTieBreaker::new(17);
        for n in 1..20 {
            assert!(clock.resolve_tie(n) < n);
            assert!(seeded.resolve_tie(n) < n);
        }
    }

    #[test]
    fn single_participant_always_wins() {
        assert_eq!(ClockTieBreaker.resolve_tie(1), 0);
        assert_eq!(SeededTieBreaker::new(3).resolve_tie(1), 0);
        assert_eq!(ScriptedTieBreaker::new(&[5]).resolve_tie(1), 0);
    }

    #[test]
    fn same_seed_same_outcomes() {
        let mut a = SeededTieBreaker::new(2022);
        let mut b = SeededTieBreaker::new(2022);
        let xs: Vec<usize> = (0..50).map(|_| a.resolve_tie(7)).collect();
        let ys: Vec<usize> = (0..50).map(|_| b.resolve_tie(7)).collect();
        assert_eq!(xs, ys);
    }

    #[test]
    fn scripted_replays_then_defaults() {
        let mut s = ScriptedTieBreaker::new(&[2, 5]);
        assert_eq!(s.resolve_tie(3), 2);
        assert_eq!(s.resolve_tie(3), 2);
        assert_eq!(s.resolve_tie(4), 0);
        assert_eq!(s.calls, vec![3, 3, 4]);
    }
}
