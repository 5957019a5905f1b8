use std::collections::{HashMap, HashSet};

/// Inverted index from lowercase words to the content lines containing them.
#[derive(Debug, Default, Clone)]
pub struct SearchIndex {
    /// Word (lowercase) -> Vec<(note_index, line_number)>, line numbers 1-indexed
    terms: HashMap<String, Vec<(usize, usize)>>,
}

/// Tokenize: split on non-alphanumeric, keep words with 1-50 chars
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| (1..=50).contains(&w.chars().count()))
        .map(str::to_lowercase)
}

impl SearchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    pub fn index_note(&mut self, note_idx: usize, body: &str) {
        for (i, line) in body.lines().enumerate() {
            for word in tokens(line) {
                let postings = self.terms.entry(word).or_default();
                if postings.last() != Some(&(note_idx, i + 1)) {
                    postings.push((note_idx, i + 1));
                }
            }
        }
    }

    /// Remove entries for a specific note before re-indexing it
    pub fn remove_note(&mut self, note_idx: usize) {
        for positions in self.terms.values_mut() {
            positions.retain(|(idx, _)| *idx != note_idx);
        }
        self.terms.retain(|_, positions| !positions.is_empty());
    }

    pub fn update_note(&mut self, note_idx: usize, body: &str) {
        self.remove_note(note_idx);
        self.index_note(note_idx, body);
    }

    /// Lines holding, for every term of `query`, some word containing it.
    /// Returns `None` when the query has no indexable terms, in which case
    /// callers fall back to scanning.
    pub fn candidates(&self, query: &str) -> Option<Vec<(usize, usize)>> {
        let mut result: Option<HashSet<(usize, usize)>> = None;
        for term in tokens(query) {
            let lines: HashSet<(usize, usize)> = self
                .terms
                .iter()
                .filter(|(word, _)| word.contains(term.as_str()))
                .flat_map(|(_, positions)| positions.iter().copied())
                .collect();
            result = Some(match result {
                Some(acc) => acc.intersection(&lines).copied().collect(),
                None => lines,
            });
        }
        result.map(|set| set.into_iter().collect())
    }
}
