// Parser for the .vtf automaton section format.
//
// Grammar, one item per line:
//   @NFA                  opens the automaton section (must come first)
//   %Initial q0 q1 ...    initial state set
//   %Final qF ...         final state set
//   src symbol dst        one transition; symbol is a decimal byte value
// `#` starts a comment; blank lines are ignored; unknown `%` keys (such as
// `%States`) are skipped. State names are arbitrary tokens, interned in
// order of first appearance.

use rustc_hash::{FxHashMap, FxHashSet};

use super::{Nfa, StateId};

/// A parse failure with the 1-based line it occurred on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub detail: String,
}

impl ParseError {
    fn new(line: usize, detail: impl Into<String>) -> Self {
        Self {
            line,
            detail: detail.into(),
        }
    }
}

fn intern(name: &str, names: &mut Vec<String>, ids: &mut FxHashMap<String, StateId>) -> StateId {
    if let Some(&id) = ids.get(name) {
        return id;
    }
    let id = names.len() as StateId;
    names.push(name.to_string());
    ids.insert(name.to_string(), id);
    id
}

/// Parse a complete .vtf document into an [`Nfa`].
pub fn parse(text: &str) -> Result<Nfa, ParseError> {
    let mut names: Vec<String> = Vec::new();
    let mut ids: FxHashMap<String, StateId> = FxHashMap::default();
    let mut initial: FxHashSet<StateId> = FxHashSet::default();
    let mut finals: FxHashSet<StateId> = FxHashSet::default();
    let mut transitions: FxHashMap<(StateId, u8), Vec<StateId>> = FxHashMap::default();
    let mut in_section = false;

    for (idx, raw) in text.lines().enumerate() {
        let lineno = idx + 1;
        let line = match raw.find('#') {
            Some(pos) => &raw[..pos],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if let Some(section) = line.strip_prefix('@') {
            if in_section {
                return Err(ParseError::new(lineno, "multiple sections in one file"));
            }
            if section != "NFA" {
                return Err(ParseError::new(
                    lineno,
                    format!("unsupported section type '@{section}'"),
                ));
            }
            in_section = true;
            continue;
        }

        if !in_section {
            return Err(ParseError::new(lineno, "expected '@NFA' section header"));
        }

        if let Some(rest) = line.strip_prefix('%') {
            let mut tokens = rest.split_whitespace();
            let key = tokens
                .next()
                .ok_or_else(|| ParseError::new(lineno, "empty '%' line"))?;
            match key {
                "Initial" => {
                    for tok in tokens {
                        let id = intern(tok, &mut names, &mut ids);
                        initial.insert(id);
                    }
                }
                "Final" => {
                    for tok in tokens {
                        let id = intern(tok, &mut names, &mut ids);
                        finals.insert(id);
                    }
                }
                // %States and other metadata keys carry no information we need.
                _ => {}
            }
            continue;
        }

        // Transition: src symbol dst.
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() != 3 {
            return Err(ParseError::new(
                lineno,
                format!("expected 'src symbol dst', got {} token(s)", tokens.len()),
            ));
        }
        let symbol: u8 = tokens[1].parse().map_err(|_| {
            ParseError::new(
                lineno,
                format!("symbol '{}' is not a byte value (0..=255)", tokens[1]),
            )
        })?;
        let src = intern(tokens[0], &mut names, &mut ids);
        let dst = intern(tokens[2], &mut names, &mut ids);
        transitions.entry((src, symbol)).or_default().push(dst);
    }

    if !in_section {
        return Err(ParseError::new(1, "missing '@NFA' section header"));
    }

    Ok(Nfa {
        names,
        initial,
        finals,
        transitions,
    })
}
