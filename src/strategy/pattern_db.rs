//! Pattern Database & Miner
//!
//! Maps a symbol-sequence key ("TXTXT") to a pattern entry. The last symbol
//! of every pattern is the outcome it predicts; the preceding symbols are the
//! prefix matched against recent history.
//!
//! The database starts with hand-tuned seed templates and grows online:
//! after every append the miner scans each window length and start position
//! and inserts any subsequence that already occurred more than twice earlier
//! in history. Inserted entries are never recomputed.
//!
//! With a capacity configured, mined entries that the miner has not seen
//! again for the longest time are evicted first. Seeds are pinned.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::domain::{encode, Outcome};

/// Number of seed templates
pub const SEED_COUNT: usize = 10;

/// Mined entries need strictly more earlier occurrences than this
pub const MIN_OCCURRENCES: usize = 2;

/// Upper bound on mined strength
pub const MAX_MINED_STRENGTH: f64 = 0.9;

/// Mined strength = probability x this factor (before the cap)
pub const STRENGTH_FACTOR: f64 = 1.2;

/// Seed templates: (pattern, probability, strength)
const SEEDS: [(&str, f64, f64); SEED_COUNT] = [
    // alternating
    ("TXTXT", 0.70, 0.80),
    ("XTXTX", 0.70, 0.80),
    // 2-1-2
    ("TTXTT", 0.65, 0.70),
    ("XXTXX", 0.65, 0.70),
    // 3-1
    ("TTTXT", 0.60, 0.62),
    ("XXXTX", 0.60, 0.62),
    // 4-1
    ("TTTTXT", 0.58, 0.60),
    ("XXXXTX", 0.58, 0.60),
    // 2-2
    ("TTXXT", 0.63, 0.66),
    ("XXTTX", 0.63, 0.66),
];

/// Where an entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternOrigin {
    Seed,
    Mined,
}

/// One learned or seeded pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternEntry {
    /// Full pattern; the last symbol is the predicted outcome
    pub pattern: Vec<Outcome>,
    /// Observed probability in [0, 1]
    pub probability: f64,
    /// Strength in [0, 1]
    pub strength: f64,
    pub origin: PatternOrigin,
    /// Append generation at which the miner last saw this key
    pub last_validated: u64,
}

impl PatternEntry {
    /// Symbols that must match the tail of history
    pub fn prefix(&self) -> &[Outcome] {
        &self.pattern[..self.pattern.len().saturating_sub(1)]
    }

    /// Outcome predicted when the prefix matches
    pub fn predicts(&self) -> Option<Outcome> {
        self.pattern.last().copied()
    }

    /// True when the prefix equals the tail of `recent`
    pub fn matches_tail(&self, recent: &[Outcome]) -> bool {
        let prefix = self.prefix();
        !prefix.is_empty() && recent.ends_with(prefix)
    }
}

/// Pattern store keyed by encoded symbol sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDatabase {
    entries: BTreeMap<String, PatternEntry>,
    min_len: usize,
    max_len: usize,
    capacity: Option<usize>,
}

impl Default for PatternDatabase {
    fn default() -> Self {
        Self::new(3, 8, None)
    }
}

fn parse_symbols(key: &str) -> Vec<Outcome> {
    key.chars()
        .map(|c| if c == 'T' { Outcome::Tai } else { Outcome::Xiu })
        .collect()
}

impl PatternDatabase {
    /// Create a database holding the seed templates
    pub fn new(min_len: usize, max_len: usize, capacity: Option<usize>) -> Self {
        let entries = SEEDS
            .iter()
            .map(|&(key, probability, strength)| {
                (
                    key.to_string(),
                    PatternEntry {
                        pattern: parse_symbols(key),
                        probability,
                        strength,
                        origin: PatternOrigin::Seed,
                        last_validated: 0,
                    },
                )
            })
            .collect();

        Self {
            entries,
            min_len,
            max_len,
            capacity,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mined_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.origin == PatternOrigin::Mined)
            .count()
    }

    pub fn get(&self, key: &str) -> Option<&PatternEntry> {
        self.entries.get(key)
    }

    pub fn contains(&self, pattern: &[Outcome]) -> bool {
        self.entries.contains_key(&encode(pattern))
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &PatternEntry)> {
        self.entries.iter()
    }

    /// Entries whose prefix matches the tail of `recent`
    pub fn matching<'a>(&'a self, recent: &'a [Outcome]) -> impl Iterator<Item = &'a PatternEntry> + 'a {
        self.entries.values().filter(move |e| e.matches_tail(recent))
    }

    /// Scan history and insert newly recurring subsequences.
    ///
    /// Returns the number of entries inserted.
    pub fn mine(&mut self, history: &[Outcome], generation: u64) -> usize {
        let n = history.len();
        let mut inserted = 0;

        for window in self.min_len..=self.max_len {
            if n <= window {
                continue;
            }
            for start in 0..=(n - window) {
                let candidate = &history[start..start + window];
                let key = encode(candidate);

                if let Some(entry) = self.entries.get_mut(&key) {
                    entry.last_validated = generation;
                    continue;
                }

                let count = (0..start)
                    .filter(|&j| &history[j..j + window] == candidate)
                    .count();
                if count <= MIN_OCCURRENCES {
                    continue;
                }

                let probability = (count as f64 / (n - window) as f64).min(1.0);
                let strength = (probability * STRENGTH_FACTOR).min(MAX_MINED_STRENGTH);
                debug!(
                    "Mined pattern {} (count={}, probability={:.3}, strength={:.3})",
                    key, count, probability, strength
                );
                self.entries.insert(
                    key,
                    PatternEntry {
                        pattern: candidate.to_vec(),
                        probability,
                        strength,
                        origin: PatternOrigin::Mined,
                        last_validated: generation,
                    },
                );
                inserted += 1;
            }
        }

        if inserted > 0 {
            self.evict_over_capacity();
        }
        inserted
    }

    /// Drop least-recently-validated mined entries until within capacity
    fn evict_over_capacity(&mut self) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.entries.len() > capacity {
            let oldest = self
                .entries
                .iter()
                .filter(|(_, e)| e.origin == PatternOrigin::Mined)
                .min_by_key(|(_, e)| e.last_validated)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(key) => {
                    debug!("Evicting stale pattern {}", key);
                    self.entries.remove(&key);
                }
                None => break,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Outcome::{Tai, Xiu};

    fn parse(s: &str) -> Vec<Outcome> {
        parse_symbols(s)
    }

    #[test]
    fn test_seeds_present_and_valid() {
        let db = PatternDatabase::default();
        assert_eq!(db.len(), SEED_COUNT);
        assert_eq!(db.mined_count(), 0);
        for (key, entry) in db.iter() {
            assert_eq!(encode(&entry.pattern), *key);
            assert!((3..=8).contains(&entry.pattern.len()));
            assert!((0.0..=1.0).contains(&entry.probability));
            assert!((0.0..=1.0).contains(&entry.strength));
        }
    }

    #[test]
    fn test_prefix_and_prediction() {
        let db = PatternDatabase::default();
        let entry = db.get("TXTXT").unwrap();
        assert_eq!(entry.prefix(), &[Tai, Xiu, Tai, Xiu][..]);
        assert_eq!(entry.predicts(), Some(Tai));
        assert!(entry.matches_tail(&parse("XXTXTX")));
        assert!(!entry.matches_tail(&parse("TXT")));
    }

    #[test]
    fn test_miner_requires_more_than_two_earlier_occurrences() {
        let mut db = PatternDatabase::new(3, 3, None);
        // "TTX" starts at 0, 3, 6: only two earlier occurrences for the third
        let history = parse("TTXTTXTTX");
        db.mine(&history, 1);
        assert!(!db.contains(&parse("TTX")));

        // Fourth occurrence has three earlier ones
        let history = parse("TTXTTXTTXTTX");
        db.mine(&history, 2);
        let entry = db.get("TTX").unwrap();
        assert_eq!(entry.origin, PatternOrigin::Mined);
        // count 3 / (12 - 3)
        assert!((entry.probability - 3.0 / 9.0).abs() < 1e-9);
        assert!((entry.strength - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_mined_entries_never_recomputed() {
        let mut db = PatternDatabase::new(3, 3, None);
        let mut history = parse("TTXTTXTTXTTX");
        db.mine(&history, 1);
        let before = db.get("TTX").unwrap().probability;

        history.extend(parse("TTXTTX"));
        db.mine(&history, 2);
        let after = db.get("TTX").unwrap();
        assert_eq!(after.probability, before);
        assert_eq!(after.last_validated, 2);
    }

    #[test]
    fn test_probabilities_stay_in_unit_range() {
        let mut db = PatternDatabase::default();
        let history: Vec<Outcome> = (0..200)
            .map(|i| if (i * 7 + i / 3) % 5 < 2 { Tai } else { Xiu })
            .collect();
        db.mine(&history, 1);
        assert!(db.mined_count() > 0);
        for (_, entry) in db.iter() {
            assert!((0.0..=1.0).contains(&entry.probability));
            assert!(entry.strength <= 1.0);
        }
    }

    #[test]
    fn test_capacity_evicts_mined_but_keeps_seeds() {
        let mut db = PatternDatabase::new(3, 8, Some(SEED_COUNT + 2));
        let history: Vec<Outcome> = (0..120)
            .map(|i| if (i * i + 3 * i) % 7 < 3 { Tai } else { Xiu })
            .collect();
        db.mine(&history, 1);
        assert!(db.len() <= SEED_COUNT + 2);
        for (key, _, _) in SEEDS.iter() {
            assert!(db.get(key).is_some());
        }
    }

    #[test]
    fn test_matching_returns_seed_for_alternation() {
        let db = PatternDatabase::default();
        let recent = parse("TXTX");
        let predictions: Vec<Outcome> = db.matching(&recent).filter_map(|e| e.predicts()).collect();
        assert!(predictions.contains(&Tai));
    }
}
