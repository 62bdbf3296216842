//! Levenshtein fuzzy-matching automaton, grounded in the base crate's
//! `search::fuzzy::FuzzyAutomaton` (same wrapped dependency, same
//! edit-distance fallback), adapted to this crate's `Result`/`Error` types
//! instead of panicking on a missing DFA.

use levenshtein_automata::{Distance, LevenshteinAutomatonBuilder, DFA};

use crate::core::error::{Error, Result};

/// Accepts every string within `max_edit_distance` edits of `term`, built
/// once via [`FuzzyAutomaton::build`] and then reusable for many
/// candidates.
pub struct FuzzyAutomaton {
    term: String,
    max_edit_distance: u8,
    transpositions: bool,
    dfa: Option<DFA>,
}

impl FuzzyAutomaton {
    pub fn new(term: impl Into<String>, max_edit_distance: u8) -> Self {
        FuzzyAutomaton {
            term: term.into(),
            max_edit_distance,
            transpositions: true,
            dfa: None,
        }
    }

    pub fn with_transpositions(mut self, transpositions: bool) -> Self {
        self.transpositions = transpositions;
        self
    }

    pub fn build(&mut self) -> Result<()> {
        let builder = LevenshteinAutomatonBuilder::new(self.max_edit_distance, self.transpositions);
        self.dfa = Some(builder.build_dfa(&self.term));
        Ok(())
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn max_edit_distance(&self) -> u8 {
        self.max_edit_distance
    }

    /// Whether `candidate` is within the configured edit distance.
    /// [`FuzzyAutomaton::build`] must be called first.
    pub fn matches(&self, candidate: &str) -> Result<bool> {
        let dfa = self.dfa.as_ref().ok_or_else(|| Error::invalid_state("FuzzyAutomaton::build was not called"))?;
        let mut state = dfa.initial_state();
        for b in candidate.bytes() {
            state = dfa.transition(state, b);
        }
        Ok(matches!(dfa.distance(state), Distance::Exact(d) if d <= self.max_edit_distance))
    }

    /// Plain Damerau-Levenshtein edit distance against `other`, used when
    /// callers want the exact distance rather than a threshold match.
    pub fn edit_distance(&self, other: &str) -> u32 {
        edit_distance(&self.term, other, self.transpositions)
    }
}

fn edit_distance(a: &str, b: &str, transpositions: bool) -> u32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (la, lb) = (a.len(), b.len());

    let mut prev2 = vec![0u32; lb + 1];
    let mut prev = (0..=lb as u32).collect::<Vec<_>>();
    let mut curr = vec![0u32; lb + 1];

    for i in 1..=la {
        curr[0] = i as u32;
        for j in 1..=lb {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let mut best = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if transpositions && i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(prev2[j - 2] + 1);
            }
            curr[j] = best;
        }
        std::mem::swap(&mut prev2, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[lb]
}
