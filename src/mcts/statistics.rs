//! Statistics tables learned across the playouts of one decision.
//!
//! - [`MoveStatistics`]: average outcome per move, independent of context
//!   (Move-Average Sampling Technique, MAST)
//! - [`NGramTable`]: average outcome per short move sequence, stored as a trie
//!   keyed backward from the most recent move (N-gram Selection Technique, NST)
//!
//! Both tables are created empty at the start of a decision and dropped when it
//! returns.

use std::collections::HashMap;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

use crate::game::game_state::{accumulate, Player, Utilities};

/// Longest move sequence tracked by the n-gram table by default.
pub const DEFAULT_MAX_GRAM_LENGTH: usize = 3;

/// Visit count and per-player score sums of one table entry.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsEntry {
    pub visit_count: u32,
    pub score_sums: Utilities,
}

impl StatsEntry {
    /// Entry seeded with one observation.
    pub fn new(utilities: &[f64]) -> Self {
        Self {
            visit_count: 1,
            score_sums: utilities.to_vec(),
        }
    }

    pub fn record(&mut self, utilities: &[f64]) {
        self.visit_count += 1;
        accumulate(&mut self.score_sums, utilities);
    }

    /// Average utility observed for `player`.
    pub fn mean(&self, player: Player) -> f64 {
        self.score_sums[player] / f64::from(self.visit_count)
    }
}

/// Per-move average outcome table.
#[derive(Debug, Clone)]
pub struct MoveStatistics<M> {
    entries: HashMap<M, StatsEntry>,
}

impl<M: Clone + Eq + Hash> Default for MoveStatistics<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Clone + Eq + Hash> MoveStatistics<M> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, mv: &M) -> Option<&StatsEntry> {
        self.entries.get(mv)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records one occurrence of `mv` in a playout that ended with `utilities`.
    pub fn record(&mut self, mv: &M, utilities: &[f64]) {
        match self.entries.get_mut(mv) {
            Some(entry) => entry.record(utilities),
            None => {
                self.entries.insert(mv.clone(), StatsEntry::new(utilities));
            }
        }
    }

    /// Records every move of a playout history.
    pub fn update_from_history(&mut self, history: &[M], utilities: &[f64]) {
        for mv in history {
            self.record(mv, utilities);
        }
    }

    /// Average utility of `mv` for `mover`, if the entry has at least
    /// `min_visits` visits.
    pub fn score(&self, mv: &M, mover: Player, min_visits: u32) -> Option<f64> {
        self.entries
            .get(mv)
            .filter(|entry| entry.visit_count >= min_visits)
            .map(|entry| entry.mean(mover))
    }
}

/// Index of an entry inside an [`NGramTable`].
pub type GramId = usize;

/// One n-gram: the statistics of a move sequence plus links to the entries of
/// the same sequence extended one move further into the past.
#[derive(Debug, Clone)]
pub struct GramEntry<M> {
    pub stats: StatsEntry,
    /// Preceding move → entry of the sequence `[preceding, ..this sequence]`
    preceding: HashMap<M, GramId>,
    length: usize,
}

impl<M: Eq + Hash> GramEntry<M> {
    fn new(utilities: &[f64], length: usize) -> Self {
        Self {
            stats: StatsEntry::new(utilities),
            preceding: HashMap::new(),
            length,
        }
    }

    /// Number of moves in this entry's sequence.
    pub fn length(&self) -> usize {
        self.length
    }

    /// Entry for this sequence preceded by `mv`, if one was recorded.
    pub fn preceded_by(&self, mv: &M) -> Option<GramId> {
        self.preceding.get(mv).copied()
    }
}

/// Arena-indexed trie of move sequences up to `max_length` moves long.
#[derive(Debug, Clone)]
pub struct NGramTable<M> {
    max_length: usize,
    entries: Vec<GramEntry<M>>,
    unigrams: HashMap<M, GramId>,
}

impl<M: Clone + Eq + Hash> NGramTable<M> {
    pub fn new(max_length: usize) -> Self {
        Self {
            max_length: max_length.max(1),
            entries: Vec::new(),
            unigrams: HashMap::new(),
        }
    }

    /// Total number of entries of every length.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: GramId) -> &GramEntry<M> {
        &self.entries[id]
    }

    pub fn entries(&self) -> impl Iterator<Item = &GramEntry<M>> + '_ {
        self.entries.iter()
    }

    /// Statistics of a sequence given oldest move first, if recorded.
    pub fn lookup(&self, sequence: &[M]) -> Option<&StatsEntry> {
        let (last, earlier) = sequence.split_last()?;
        let mut id = *self.unigrams.get(last)?;
        for mv in earlier.iter().rev() {
            id = self.entries[id].preceded_by(mv)?;
        }
        Some(&self.entries[id].stats)
    }

    /// Records the 1..=`max_length` move suffixes ending at every position of
    /// a playout history.
    pub fn update_from_history(&mut self, history: &[M], utilities: &[f64]) {
        for end in 1..=history.len() {
            self.record_suffixes(&history[..end], utilities);
        }
    }

    /// Records every suffix of `sequence` up to `max_length` moves long.
    pub fn record_suffixes(&mut self, sequence: &[M], utilities: &[f64]) {
        let Some((last, earlier)) = sequence.split_last() else {
            return;
        };

        let mut id = match self.unigrams.get(last) {
            Some(&id) => {
                self.entries[id].stats.record(utilities);
                id
            }
            None => {
                let id = self.push_entry(utilities, 1);
                self.unigrams.insert(last.clone(), id);
                id
            }
        };

        for (offset, mv) in earlier.iter().rev().enumerate() {
            let length = offset + 2;
            if length > self.max_length {
                break;
            }
            id = match self.entries[id].preceded_by(mv) {
                Some(next) => {
                    self.entries[next].stats.record(utilities);
                    next
                }
                None => {
                    let next = self.push_entry(utilities, length);
                    self.entries[id].preceding.insert(mv.clone(), next);
                    next
                }
            };
        }
    }

    /// Score of playing `mv` after `history` (oldest first) for `mover`.
    ///
    /// Averages the mover's mean over the 1-gram of `mv` and every longer
    /// suffix chain entry with at least `min_visits` visits, stopping at the
    /// first missing or under-visited link. `None` if `mv` was never recorded.
    pub fn score(&self, mv: &M, history: &[M], mover: Player, min_visits: u32) -> Option<f64> {
        let mut id = *self.unigrams.get(mv)?;
        let mut total = self.entries[id].stats.mean(mover);
        let mut terms = 1.0;

        for preceding in history.iter().rev().take(self.max_length - 1) {
            match self.entries[id].preceded_by(preceding) {
                Some(next) if self.entries[next].stats.visit_count >= min_visits => {
                    total += self.entries[next].stats.mean(mover);
                    terms += 1.0;
                    id = next;
                }
                _ => break,
            }
        }

        Some(total / terms)
    }

    fn push_entry(&mut self, utilities: &[f64], length: usize) -> GramId {
        self.entries.push(GramEntry::new(utilities, length));
        self.entries.len() - 1
    }
}

/// Which statistics table a decision maintains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryTable {
    /// No table; guided move choices fall back to "unseen" for every move.
    #[default]
    None,
    /// Per-move averages (MAST).
    MoveAverage,
    /// Move-sequence averages up to `max_length` moves (NST).
    NGram { max_length: usize },
}

/// Live table of one decision, as selected by [`HistoryTable`].
#[derive(Debug, Clone)]
pub enum HistoryTables<M> {
    Disabled,
    MoveAverage(MoveStatistics<M>),
    NGram(NGramTable<M>),
}

impl<M: Clone + Eq + Hash> HistoryTables<M> {
    pub fn new(kind: HistoryTable) -> Self {
        match kind {
            HistoryTable::None => Self::Disabled,
            HistoryTable::MoveAverage => Self::MoveAverage(MoveStatistics::new()),
            HistoryTable::NGram { max_length } => Self::NGram(NGramTable::new(max_length)),
        }
    }

    /// Table score of `mv` played after `history` by `mover`, `None` when the
    /// table has no trusted entry for it.
    pub fn score(&self, mv: &M, history: &[M], mover: Player, min_visits: u32) -> Option<f64> {
        match self {
            Self::Disabled => None,
            Self::MoveAverage(table) => table.score(mv, mover, min_visits),
            Self::NGram(table) => table.score(mv, history, mover, min_visits),
        }
    }

    /// Feeds one playout into the table.
    pub fn update(&mut self, history: &[M], utilities: &[f64]) {
        match self {
            Self::Disabled => {}
            Self::MoveAverage(table) => table.update_from_history(history, utilities),
            Self::NGram(table) => table.update_from_history(history, utilities),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Disabled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WIN: [f64; 3] = [0.0, 1.0, -1.0];
    const LOSS: [f64; 3] = [0.0, -1.0, 1.0];

    #[test]
    fn test_move_statistics_seed_and_accumulate() {
        let mut table = MoveStatistics::new();
        table.record(&'a', &WIN);

        let entry = table.get(&'a').unwrap();
        assert_eq!(entry.visit_count, 1);
        assert_eq!(entry.score_sums, WIN.to_vec());

        table.record(&'a', &LOSS);
        let entry = table.get(&'a').unwrap();
        assert_eq!(entry.visit_count, 2);
        assert_eq!(entry.score_sums, vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_move_statistics_counts_every_occurrence() {
        let mut table = MoveStatistics::new();
        table.update_from_history(&['a', 'b', 'a'], &WIN);

        assert_eq!(table.get(&'a').unwrap().visit_count, 2);
        assert_eq!(table.get(&'b').unwrap().visit_count, 1);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_move_statistics_score_threshold() {
        let mut table = MoveStatistics::new();
        table.update_from_history(&['a'], &WIN);

        assert_eq!(table.score(&'a', 1, 0), Some(1.0));
        assert_eq!(table.score(&'a', 2, 0), Some(-1.0));
        assert_eq!(table.score(&'a', 1, 2), None);
        assert_eq!(table.score(&'z', 1, 0), None);
    }

    #[test]
    fn test_ngram_records_suffixes_up_to_max_length() {
        let mut table = NGramTable::new(3);
        table.update_from_history(&['a', 'b', 'c', 'd'], &WIN);

        assert_eq!(table.lookup(&['a']).unwrap().visit_count, 1);
        assert_eq!(table.lookup(&['a', 'b']).unwrap().visit_count, 1);
        assert_eq!(table.lookup(&['b', 'c', 'd']).unwrap().visit_count, 1);
        assert!(table.lookup(&['a', 'b', 'c', 'd']).is_none());
        assert!(table.lookup(&['a', 'c']).is_none());

        // 4 unigrams, 3 bigrams, 2 trigrams.
        assert_eq!(table.len(), 9);
        assert!(table.entries().all(|entry| entry.length() <= 3));
    }

    #[test]
    fn test_ngram_links_through_trie() {
        let mut table = NGramTable::new(3);
        table.record_suffixes(&['x', 'y'], &LOSS);

        let unigram = table.unigrams[&'y'];
        let bigram = table.entry(unigram).preceded_by(&'x').unwrap();
        assert_eq!(table.entry(bigram).length(), 2);
        assert_eq!(table.entry(bigram).stats.mean(2), 1.0);
    }

    #[test]
    fn test_unigram_visits_dominate_longer_grams() {
        let mut table = NGramTable::new(3);
        table.update_from_history(&['a', 'b', 'a', 'b', 'a'], &WIN);
        table.update_from_history(&['b', 'a', 'a'], &LOSS);
        table.update_from_history(&['a', 'b'], &WIN);

        for (unigram, &id) in &table.unigrams {
            let unigram_visits = table.entry(id).stats.visit_count;
            for first in ['a', 'b'] {
                for second in ['a', 'b'] {
                    if let Some(entry) = table.lookup(&[first, *unigram]) {
                        assert!(unigram_visits >= entry.visit_count);
                    }
                    if let Some(entry) = table.lookup(&[first, second, *unigram]) {
                        assert!(unigram_visits >= entry.visit_count);
                    }
                }
            }
        }
    }

    #[test]
    fn test_ngram_score_averages_trusted_chain() {
        let mut table = NGramTable::new(3);
        // 'a' after 'x' wins for player 1, 'a' elsewhere loses.
        for _ in 0..3 {
            table.record_suffixes(&['x', 'a'], &WIN);
        }
        table.record_suffixes(&['a'], &LOSS);

        // Unigram mean: (3 - 1) / 4 = 0.5, bigram mean: 1.0.
        let with_context = table.score(&'a', &['x'], 1, 0).unwrap();
        assert!((with_context - 0.75).abs() < 1e-12);

        // Bigram under the visit threshold is ignored.
        let untrusted = table.score(&'a', &['x'], 1, 7).unwrap();
        assert!((untrusted - 0.5).abs() < 1e-12);

        // Unknown context falls back to the unigram alone.
        let other = table.score(&'a', &['y'], 1, 0).unwrap();
        assert!((other - 0.5).abs() < 1e-12);

        assert!(table.score(&'q', &[], 1, 0).is_none());
    }

    #[test]
    fn test_history_tables_dispatch() {
        let mut disabled: HistoryTables<char> = HistoryTables::new(HistoryTable::None);
        disabled.update(&['a'], &WIN);
        assert!(!disabled.is_enabled());
        assert!(disabled.score(&'a', &[], 1, 0).is_none());

        let mut mast = HistoryTables::new(HistoryTable::MoveAverage);
        mast.update(&['a'], &WIN);
        assert_eq!(mast.score(&'a', &[], 1, 0), Some(1.0));

        let mut nst = HistoryTables::new(HistoryTable::NGram { max_length: 2 });
        nst.update(&['a', 'b'], &LOSS);
        assert_eq!(nst.score(&'b', &['a'], 2, 0), Some(1.0));
    }
}
