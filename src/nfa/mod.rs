// Nondeterministic finite automaton over byte symbols.
//
// The automaton is loaded once per run from a .vtf definition file (see
// vtf.rs), is immutable afterwards, and answers membership queries by
// subset simulation over the transition relation. Symbols are the payload
// bytes themselves, so the alphabet is 0..=255.

pub mod vtf;

use std::fmt;
use std::fs;
use std::path::Path;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::DiffError;

/// Dense state identifier; names are interned in load order.
pub type StateId = u32;

/// A byte-alphabet NFA: interned state names, initial and final state sets,
/// and a transition relation keyed by (state, symbol).
#[derive(Debug, Clone)]
pub struct Nfa {
    names: Vec<String>,
    initial: FxHashSet<StateId>,
    finals: FxHashSet<StateId>,
    transitions: FxHashMap<(StateId, u8), Vec<StateId>>,
}

impl Nfa {
    /// Load an automaton from a .vtf definition file.
    pub fn load(path: &Path) -> Result<Self, DiffError> {
        let text = fs::read_to_string(path).map_err(|e| DiffError::Automaton {
            path: path.display().to_string(),
            source: e,
        })?;
        vtf::parse(&text).map_err(|e| DiffError::Vtf {
            path: path.display().to_string(),
            line: e.line,
            detail: e.detail,
        })
    }

    /// Membership test by subset simulation: step the set of reachable
    /// states through the word and accept iff it ends up intersecting the
    /// final set.
    pub fn accepts(&self, word: &[u8]) -> bool {
        let mut current = self.initial.clone();
        for &symbol in word {
            let mut next = FxHashSet::default();
            for &state in &current {
                if let Some(targets) = self.transitions.get(&(state, symbol)) {
                    next.extend(targets.iter().copied());
                }
            }
            if next.is_empty() {
                return false;
            }
            current = next;
        }
        current.iter().any(|s| self.finals.contains(s))
    }

    pub fn state_count(&self) -> usize {
        self.names.len()
    }

    pub fn transition_count(&self) -> usize {
        self.transitions.values().map(Vec::len).sum()
    }

    fn name(&self, id: StateId) -> &str {
        &self.names[id as usize]
    }
}

/// Renders the automaton back in .vtf form (used by `--dump-automata`).
impl fmt::Display for Nfa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "@NFA")?;
        let mut initial: Vec<_> = self.initial.iter().map(|&s| self.name(s)).collect();
        initial.sort_unstable();
        writeln!(f, "%Initial {}", initial.join(" "))?;
        let mut finals: Vec<_> = self.finals.iter().map(|&s| self.name(s)).collect();
        finals.sort_unstable();
        writeln!(f, "%Final {}", finals.join(" "))?;

        let mut rules: Vec<(&str, u8, &str)> = Vec::new();
        for (&(src, symbol), targets) in &self.transitions {
            for &dst in targets {
                rules.push((self.name(src), symbol, self.name(dst)));
            }
        }
        rules.sort_unstable();
        for (src, symbol, dst) in rules {
            writeln!(f, "{src} {symbol} {dst}")?;
        }
        Ok(())
    }
}
