//! Mutable finite-state automaton over Unicode code-point intervals:
//! construction, the standard language combinators, determinization,
//! minimization, and the supporting introspection used by both.
//!
//! States live in a single arena (`Vec<State>`) owned by the `Automaton`
//! that created them, addressed by index rather than by reference, so the
//! graph can be cyclic without requiring a GC or `Rc`/`Weak` bookkeeping —
//! the base crate has no equivalent structure; this module's shape follows
//! the arena-of-records style the base crate already uses for
//! `storage::layout::StorageLayout`'s path table, generalized to a graph.

mod fuzzy;

pub use fuzzy::FuzzyAutomaton;

use std::collections::{HashMap, HashSet, VecDeque};

/// Unicode scalar values top out at 21 bits; surrogate handling is a
/// caller concern.
pub const MAX_CODE_POINT: u32 = 0x10FFFF;

/// A labelled edge over a contiguous range of code points `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub min: u32,
    pub max: u32,
    pub dest: usize,
}

#[derive(Debug, Clone, Default)]
pub struct State {
    pub accept: bool,
    pub transitions: Vec<Transition>,
}

/// Root `State` index plus arena; `singleton` is a representation
/// optimization for an automaton recognizing exactly one string — the
/// explicit graph is left empty until a mutating op calls
/// [`Automaton::expand_singleton`].
#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<State>,
    initial: usize,
    deterministic: bool,
    singleton: Option<String>,
}

impl Automaton {
    /// The language containing no strings at all.
    pub fn empty() -> Self {
        Automaton {
            states: vec![State::default()],
            initial: 0,
            deterministic: true,
            singleton: None,
        }
    }

    /// The language containing exactly the empty string.
    pub fn empty_string() -> Self {
        let mut a = Automaton::empty();
        a.states[0].accept = true;
        a
    }

    /// The language containing exactly `s`, represented inline until
    /// expanded.
    pub fn singleton(s: impl Into<String>) -> Self {
        Automaton {
            states: vec![State::default()],
            initial: 0,
            deterministic: true,
            singleton: Some(s.into()),
        }
    }

    /// The language of single characters in `[min, max]`.
    pub fn char_range(min: char, max: char) -> Self {
        let mut states = vec![State::default(), State { accept: true, transitions: Vec::new() }];
        states[0].transitions.push(Transition { min: min as u32, max: max as u32, dest: 1 });
        Automaton { states, initial: 0, deterministic: true, singleton: None }
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn initial(&self) -> usize {
        self.initial
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn is_accept(&self, state: usize) -> bool {
        self.states[state].accept
    }

    pub fn transitions(&self, state: usize) -> &[Transition] {
        &self.states[state].transitions
    }

    pub fn singleton_str(&self) -> Option<&str> {
        self.singleton.as_deref()
    }

    /// Materializes a `singleton` automaton into an explicit linear chain
    /// of states, one per character. A no-op if already expanded.
    pub fn expand_singleton(&mut self) {
        let Some(s) = self.singleton.take() else { return };
        let chars: Vec<char> = s.chars().collect();
        let mut states = Vec::with_capacity(chars.len() + 1);
        for _ in 0..=chars.len() {
            states.push(State::default());
        }
        for (i, ch) in chars.iter().enumerate() {
            states[i].transitions.push(Transition { min: *ch as u32, max: *ch as u32, dest: i + 1 });
        }
        states[chars.len()].accept = true;
        self.states = states;
        self.initial = 0;
        self.deterministic = true;
    }

    /// Runs the automaton over `input`, following the first matching
    /// transition at each step. Correct for deterministic automata (the
    /// usual case after [`Automaton::determinize`]); on a non-deterministic
    /// graph it decides membership along one arbitrary path only.
    pub fn accepts(&self, input: &str) -> bool {
        if let Some(s) = &self.singleton {
            return s == input;
        }
        let mut state = self.initial;
        'chars: for ch in input.chars() {
            let cp = ch as u32;
            for t in &self.states[state].transitions {
                if t.min <= cp && cp <= t.max {
                    state = t.dest;
                    continue 'chars;
                }
            }
            return false;
        }
        self.states[state].accept
    }

    // ---- combinators -----------------------------------------------------

    pub fn concatenate(a: &Automaton, b: &Automaton) -> Automaton {
        let mut a = a.clone();
        a.expand_singleton();
        let mut b = b.clone();
        b.expand_singleton();

        let offset = a.states.len();
        let mut states = a.states;
        for mut s in b.states {
            for t in s.transitions.iter_mut() {
                t.dest += offset;
            }
            states.push(s);
        }

        let b_initial = b.initial + offset;
        let b_initial_transitions = states[b_initial].transitions.clone();
        let b_initial_accept = states[b_initial].accept;
        for i in 0..offset {
            if states[i].accept {
                states[i].accept = b_initial_accept;
                states[i].transitions.extend(b_initial_transitions.clone());
            }
        }

        Automaton { states, initial: a.initial, deterministic: false, singleton: None }
    }

    pub fn union(parts: &[Automaton]) -> Automaton {
        if parts.is_empty() {
            return Automaton::empty();
        }
        let mut states = vec![State::default()];
        let mut initials = Vec::with_capacity(parts.len());

        for part in parts {
            let mut p = part.clone();
            p.expand_singleton();
            let offset = states.len();
            for mut s in p.states {
                for t in s.transitions.iter_mut() {
                    t.dest += offset;
                }
                states.push(s);
            }
            initials.push(offset + p.initial);
        }

        let mut accept = false;
        let mut transitions = Vec::new();
        for &i in &initials {
            accept |= states[i].accept;
            transitions.extend(states[i].transitions.clone());
        }
        states[0].accept = accept;
        states[0].transitions = transitions;

        Automaton { states, initial: 0, deterministic: false, singleton: None }
    }

    pub fn intersection(a: &Automaton, b: &Automaton) -> Automaton {
        let mut a = a.clone();
        a.determinize();
        let mut b = b.clone();
        b.determinize();

        let mut states: Vec<State> = Vec::new();
        let mut index: HashMap<(usize, usize), usize> = HashMap::new();
        let mut worklist: VecDeque<(usize, usize)> = VecDeque::new();

        let start = (a.initial, b.initial);
        index.insert(start, 0);
        states.push(State::default());
        worklist.push_back(start);

        while let Some((sa, sb)) = worklist.pop_front() {
            let id = index[&(sa, sb)];
            let accept = a.states[sa].accept && b.states[sb].accept;
            let mut transitions = Vec::new();
            for ta in &a.states[sa].transitions {
                for tb in &b.states[sb].transitions {
                    let lo = ta.min.max(tb.min);
                    let hi = ta.max.min(tb.max);
                    if lo <= hi {
                        let key = (ta.dest, tb.dest);
                        let dest_id = *index.entry(key).or_insert_with(|| {
                            states.push(State::default());
                            worklist.push_back(key);
                            states.len() - 1
                        });
                        transitions.push(Transition { min: lo, max: hi, dest: dest_id });
                    }
                }
            }
            states[id].accept = accept;
            states[id].transitions = transitions;
        }

        Automaton { states, initial: 0, deterministic: true, singleton: None }
    }

    pub fn complement(a: &Automaton) -> Automaton {
        let mut a = a.clone();
        a.determinize();
        a.totalize();
        for s in a.states.iter_mut() {
            s.accept = !s.accept;
        }
        a.deterministic = true;
        a
    }

    pub fn minus(a: &Automaton, b: &Automaton) -> Automaton {
        Automaton::intersection(a, &Automaton::complement(b))
    }

    pub fn optional(a: &Automaton) -> Automaton {
        Automaton::union(&[a.clone(), Automaton::empty_string()])
    }

    /// Kleene star: zero or more repetitions of `a`.
    pub fn repeat(a: &Automaton) -> Automaton {
        let mut a = a.clone();
        a.expand_singleton();

        let offset = 1;
        let mut states = vec![State { accept: true, transitions: Vec::new() }];
        for mut s in a.states {
            for t in s.transitions.iter_mut() {
                t.dest += offset;
            }
            states.push(s);
        }

        let initial_transitions = states[a.initial + offset].transitions.clone();
        states[0].transitions = initial_transitions.clone();
        for (i, s) in states.iter_mut().enumerate().skip(offset) {
            let _ = i;
            if s.accept {
                s.transitions.extend(initial_transitions.clone());
            }
        }

        Automaton { states, initial: 0, deterministic: false, singleton: None }
    }

    /// At least `min` repetitions of `a`.
    pub fn repeat_min(a: &Automaton, min: usize) -> Automaton {
        if min == 0 {
            return Automaton::repeat(a);
        }
        let mut result = a.clone();
        for _ in 1..min {
            result = Automaton::concatenate(&result, a);
        }
        Automaton::concatenate(&result, &Automaton::repeat(a))
    }

    /// Between `min` and `max` (inclusive) repetitions of `a`.
    pub fn repeat_min_max(a: &Automaton, min: usize, max: usize) -> Automaton {
        if min > max {
            return Automaton::empty();
        }
        let mut base: Option<Automaton> = None;
        for _ in 0..min {
            base = Some(match base {
                None => a.clone(),
                Some(r) => Automaton::concatenate(&r, a),
            });
        }
        let mut result = base.unwrap_or_else(Automaton::empty_string);
        for _ in min..max {
            result = Automaton::concatenate(&result, &Automaton::optional(a));
        }
        result
    }

    // ---- predicates --------------------------------------------------

    pub fn is_empty(&self) -> bool {
        if self.singleton.is_some() {
            return false;
        }
        let mut seen = HashSet::new();
        let mut stack = vec![self.initial];
        while let Some(s) = stack.pop() {
            if !seen.insert(s) {
                continue;
            }
            if self.states[s].accept {
                return false;
            }
            for t in &self.states[s].transitions {
                stack.push(t.dest);
            }
        }
        true
    }

    pub fn is_empty_string(&self) -> bool {
        if let Some(s) = &self.singleton {
            return s.is_empty();
        }
        Automaton::same_language(self, &Automaton::empty_string())
    }

    pub fn is_total(&self) -> bool {
        let mut b = self.clone();
        b.determinize();
        b.totalize();
        let mut seen = HashSet::new();
        let mut stack = vec![b.initial];
        while let Some(s) = stack.pop() {
            if !seen.insert(s) {
                continue;
            }
            if !b.states[s].accept {
                return false;
            }
            for t in &b.states[s].transitions {
                stack.push(t.dest);
            }
        }
        true
    }

    pub fn is_finite(&self) -> bool {
        let mut b = self.clone();
        b.expand_singleton();
        b.remove_dead_transitions();
        !b.has_cycle_from_initial()
    }

    fn has_cycle_from_initial(&self) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Color {
            White,
            Gray,
            Black,
        }
        fn dfs(s: usize, a: &Automaton, color: &mut [Color]) -> bool {
            color[s] = Color::Gray;
            for t in &a.states[s].transitions {
                match color[t.dest] {
                    Color::Gray => return true,
                    Color::White => {
                        if dfs(t.dest, a, color) {
                            return true;
                        }
                    }
                    Color::Black => {}
                }
            }
            color[s] = Color::Black;
            false
        }
        let mut color = vec![Color::White; self.states.len()];
        dfs(self.initial, self, &mut color)
    }

    pub fn subset_of(a: &Automaton, b: &Automaton) -> bool {
        Automaton::minus(a, b).is_empty()
    }

    pub fn same_language(a: &Automaton, b: &Automaton) -> bool {
        Automaton::subset_of(a, b) && Automaton::subset_of(b, a)
    }

    // ---- normalizations ------------------------------------------------

    /// Subset construction with ordered boundary points, merging
    /// sub-intervals that map to the same target set.
    pub fn determinize(&mut self) {
        self.expand_singleton();
        if self.deterministic {
            return;
        }

        let points = self.start_points();
        let mut new_states: Vec<State> = vec![State::default()];
        let mut subset_of_state: Vec<Vec<usize>> = vec![vec![self.initial]];
        let mut index: HashMap<Vec<usize>, usize> = HashMap::new();
        index.insert(vec![self.initial], 0);
        let mut worklist = vec![0usize];

        while let Some(id) = worklist.pop() {
            let subset = subset_of_state[id].clone();
            let accept = subset.iter().any(|&s| self.states[s].accept);
            new_states[id].accept = accept;

            for i in 0..points.len() {
                let range_min = points[i];
                let mut dest_set: Vec<usize> = Vec::new();
                for &s in &subset {
                    for t in &self.states[s].transitions {
                        if t.min <= range_min && range_min <= t.max && !dest_set.contains(&t.dest) {
                            dest_set.push(t.dest);
                        }
                    }
                }
                if dest_set.is_empty() {
                    continue;
                }
                dest_set.sort_unstable();

                let dest_id = if let Some(&existing) = index.get(&dest_set) {
                    existing
                } else {
                    let id2 = new_states.len();
                    new_states.push(State::default());
                    subset_of_state.push(dest_set.clone());
                    index.insert(dest_set.clone(), id2);
                    worklist.push(id2);
                    id2
                };

                let range_max = if i + 1 < points.len() { points[i + 1] - 1 } else { MAX_CODE_POINT };
                new_states[id].transitions.push(Transition { min: range_min, max: range_max, dest: dest_id });
            }
        }

        self.states = new_states;
        self.initial = 0;
        self.deterministic = true;
        self.reduce();
    }

    /// Sorts each state's transitions by `(min, max, target)` and fuses
    /// adjacent/overlapping intervals sharing a destination.
    pub fn reduce(&mut self) {
        self.expand_singleton();
        for s in self.states.iter_mut() {
            if s.transitions.is_empty() {
                continue;
            }
            s.transitions.sort_by_key(|t| (t.min, t.max, t.dest));
            let mut merged: Vec<Transition> = Vec::with_capacity(s.transitions.len());
            for &t in &s.transitions {
                if let Some(last) = merged.last_mut() {
                    if last.dest == t.dest && t.min <= last.max.saturating_add(1) {
                        last.max = last.max.max(t.max);
                        continue;
                    }
                }
                merged.push(t);
            }
            s.transitions = merged;
        }
    }

    /// Drops transitions into states that can never reach an accept state.
    pub fn remove_dead_transitions(&mut self) {
        self.expand_singleton();
        let live = self.states_that_can_reach_accept();
        for s in self.states.iter_mut() {
            s.transitions.retain(|t| live.contains(&t.dest));
        }
    }

    fn states_that_can_reach_accept(&self) -> HashSet<usize> {
        let mut reach: HashSet<usize> =
            self.states.iter().enumerate().filter(|(_, s)| s.accept).map(|(i, _)| i).collect();
        let mut changed = true;
        while changed {
            changed = false;
            for (i, s) in self.states.iter().enumerate() {
                if reach.contains(&i) {
                    continue;
                }
                if s.transitions.iter().any(|t| reach.contains(&t.dest)) {
                    reach.insert(i);
                    changed = true;
                }
            }
        }
        reach
    }

    /// Completes the transition function (every state has an outgoing
    /// transition covering every code point) by adding a non-accepting
    /// sink state, required before [`Automaton::complement`].
    pub fn totalize(&mut self) {
        self.expand_singleton();
        let dead = self.states.len();
        self.states.push(State::default());
        self.states[dead].transitions.push(Transition { min: 0, max: MAX_CODE_POINT, dest: dead });

        for i in 0..dead {
            let mut transitions = self.states[i].transitions.clone();
            transitions.sort_by_key(|t| t.min);
            let mut gaps = Vec::new();
            let mut next_min: u32 = 0;
            for t in &transitions {
                if t.min > next_min {
                    gaps.push(Transition { min: next_min, max: t.min - 1, dest: dead });
                }
                next_min = if t.max == MAX_CODE_POINT { MAX_CODE_POINT.saturating_add(1) } else { t.max + 1 };
            }
            if next_min <= MAX_CODE_POINT {
                gaps.push(Transition { min: next_min, max: MAX_CODE_POINT, dest: dead });
            }
            self.states[i].transitions.extend(gaps);
        }
    }

    /// Partition-refinement minimization (Moore's algorithm): iteratively
    /// splits blocks until every state in a block has, for every boundary
    /// code point, a transition landing in the same block. Prefers
    /// correctness and a readable fixed point over Hopcroft's optimal
    /// `O(n log n)` worklist scheduling.
    pub fn minimize(&mut self) {
        self.determinize();
        self.totalize();

        let points = self.start_points();
        let n = self.states.len();
        let mut block_of = vec![0usize; n];
        for i in 0..n {
            block_of[i] = if self.states[i].accept { 1 } else { 0 };
        }
        let mut num_blocks = if self.states.iter().any(|s| s.accept) && self.states.iter().any(|s| !s.accept) {
            2
        } else {
            1
        };

        loop {
            let mut groups: HashMap<(usize, Vec<usize>), Vec<usize>> = HashMap::new();
            for s in 0..n {
                let mut signature = Vec::with_capacity(points.len());
                for &p in &points {
                    let dest_block = self.states[s]
                        .transitions
                        .iter()
                        .find(|t| t.min <= p && p <= t.max)
                        .map(|t| block_of[t.dest])
                        .unwrap_or(usize::MAX);
                    signature.push(dest_block);
                }
                groups.entry((block_of[s], signature)).or_default().push(s);
            }

            if groups.len() == num_blocks {
                break;
            }

            let mut new_block_of = vec![0usize; n];
            for (new_id, (_, members)) in groups.into_iter().enumerate() {
                for s in members {
                    new_block_of[s] = new_id;
                }
            }
            num_blocks = new_block_of.iter().copied().max().map_or(0, |m| m + 1);
            block_of = new_block_of;
        }

        let mut rep = vec![usize::MAX; num_blocks];
        for s in 0..n {
            if rep[block_of[s]] == usize::MAX {
                rep[block_of[s]] = s;
            }
        }

        let mut new_states = Vec::with_capacity(num_blocks);
        for &r in &rep {
            let accept = self.states[r].accept;
            let transitions = self.states[r]
                .transitions
                .iter()
                .map(|t| Transition { min: t.min, max: t.max, dest: block_of[t.dest] })
                .collect();
            new_states.push(State { accept, transitions });
        }

        self.states = new_states;
        self.initial = block_of[self.initial];
        self.deterministic = true;
        self.reduce();
        self.remove_dead_transitions();
        self.prune_unreachable();
    }

    fn prune_unreachable(&mut self) {
        let mut seen = vec![false; self.states.len()];
        let mut stack = vec![self.initial];
        while let Some(s) = stack.pop() {
            if seen[s] {
                continue;
            }
            seen[s] = true;
            for t in &self.states[s].transitions {
                stack.push(t.dest);
            }
        }

        let keep: Vec<usize> = (0..self.states.len()).filter(|&i| seen[i]).collect();
        let mut remap = vec![usize::MAX; self.states.len()];
        for (new_idx, &old_idx) in keep.iter().enumerate() {
            remap[old_idx] = new_idx;
        }

        let mut new_states = Vec::with_capacity(keep.len());
        for &old_idx in &keep {
            let mut s = self.states[old_idx].clone();
            for t in s.transitions.iter_mut() {
                t.dest = remap[t.dest];
            }
            new_states.push(s);
        }

        self.initial = remap[self.initial];
        self.states = new_states;
    }

    // ---- introspection ---------------------------------------------------

    /// States reachable from the initial state, in BFS order; doubles as
    /// a dense renumbering (`numbered_states()[k]` is the `k`-th state).
    pub fn numbered_states(&self) -> Vec<usize> {
        let mut seen = vec![false; self.states.len()];
        let mut order = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(self.initial);
        seen[self.initial] = true;
        while let Some(s) = queue.pop_front() {
            order.push(s);
            for t in &self.states[s].transitions {
                if !seen[t.dest] {
                    seen[t.dest] = true;
                    queue.push_back(t.dest);
                }
            }
        }
        order
    }

    pub fn sorted_transitions(&self) -> Vec<Vec<Transition>> {
        self.numbered_states()
            .into_iter()
            .map(|s| {
                let mut ts = self.states[s].transitions.clone();
                ts.sort_by_key(|t| (t.min, t.max, t.dest));
                ts
            })
            .collect()
    }

    /// Ordered boundary code points at which the set of matching
    /// transitions can change, used by [`Automaton::determinize`] and
    /// [`Automaton::minimize`]. Assumes the singleton form has already
    /// been expanded.
    pub fn start_points(&self) -> Vec<u32> {
        let mut points: std::collections::BTreeSet<u32> = std::collections::BTreeSet::new();
        for s in &self.states {
            for t in &s.transitions {
                points.insert(t.min);
                if t.max < MAX_CODE_POINT {
                    points.insert(t.max + 1);
                }
            }
        }
        if points.is_empty() {
            points.insert(0);
        }
        points.into_iter().collect()
    }
}
