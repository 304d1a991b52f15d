//! Arena-indexed frequency trie.
//!
//! Nodes live in one `Vec`; each node keeps its children as a small array of
//! `(char, index)` pairs sorted by character. Every node has exactly one
//! parent, so the structure is acyclic and owned entirely by the arena.

#[derive(Debug, Clone, Default)]
struct Node {
    children: Vec<(char, u32)>,
    /// Non-zero only on terminal nodes.
    frequency: u64,
}

impl Node {
    fn child(&self, c: char) -> Option<u32> {
        self.children
            .binary_search_by(|(key, _)| key.cmp(&c))
            .ok()
            .map(|pos| self.children[pos].1)
    }
}

/// Word → frequency map backed by a prefix tree.
#[derive(Debug, Clone)]
pub struct FrequencyTrie {
    nodes: Vec<Node>,
    words: usize,
}

impl Default for FrequencyTrie {
    fn default() -> Self {
        Self::new()
    }
}

impl FrequencyTrie {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::default()],
            words: 0,
        }
    }

    /// Insert `word` with `frequency`, keeping the maximum frequency seen.
    ///
    /// Blank words and non-positive frequencies are ignored.
    pub fn insert(&mut self, word: &str, frequency: i64) {
        if word.trim().is_empty() || frequency <= 0 {
            return;
        }

        let mut node_idx = 0usize;
        for c in word.chars() {
            node_idx = match self.nodes[node_idx]
                .children
                .binary_search_by(|(key, _)| key.cmp(&c))
            {
                Ok(pos) => self.nodes[node_idx].children[pos].1 as usize,
                Err(pos) => {
                    let new_idx = self.nodes.len();
                    self.nodes.push(Node::default());
                    self.nodes[node_idx].children.insert(pos, (c, new_idx as u32));
                    new_idx
                }
            };
        }

        let node = &mut self.nodes[node_idx];
        if node.frequency == 0 {
            self.words += 1;
        }
        node.frequency = node.frequency.max(frequency as u64);
    }

    /// Frequency of `word`, present only for terminal entries.
    pub fn frequency(&self, word: &str) -> Option<u64> {
        let node = self.walk(word)?;
        let frequency = self.nodes[node].frequency;
        (frequency > 0).then_some(frequency)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.frequency(word).is_some()
    }

    /// Up to `limit` words starting with `prefix`, ranked by descending
    /// frequency, then ascending length, then lexicographically.
    pub fn completions(&self, prefix: &str, limit: usize) -> Vec<(String, u64)> {
        let Some(start) = self.walk(prefix) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        let mut stack = vec![(start, prefix.to_string())];
        while let Some((idx, word)) = stack.pop() {
            let node = &self.nodes[idx];
            if node.frequency > 0 {
                found.push((word.clone(), node.frequency));
            }
            for &(c, child) in node.children.iter().rev() {
                let mut next = word.clone();
                next.push(c);
                stack.push((child as usize, next));
            }
        }

        found.sort_by(|a, b| {
            b.1.cmp(&a.1)
                .then_with(|| a.0.chars().count().cmp(&b.0.chars().count()))
                .then_with(|| a.0.cmp(&b.0))
        });
        found.truncate(limit);
        found
    }

    pub fn word_count(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    fn walk(&self, key: &str) -> Option<usize> {
        let mut node_idx = 0usize;
        for c in key.chars() {
            node_idx = self.nodes[node_idx].child(c)? as usize;
        }
        Some(node_idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_max_frequency() {
        let mut trie = FrequencyTrie::new();
        trie.insert("x", 5);
        trie.insert("x", 3);
        trie.insert("x", 9);
        assert_eq!(trie.frequency("x"), Some(9));
        assert_eq!(trie.word_count(), 1);
    }

    #[test]
    fn test_rejects_blank_and_non_positive() {
        let mut trie = FrequencyTrie::new();
        trie.insert("", 10);
        trie.insert("   ", 10);
        trie.insert("zero", 0);
        trie.insert("neg", -4);
        assert!(trie.is_empty());
        assert_eq!(trie.frequency("zero"), None);
    }

    #[test]
    fn test_non_terminal_prefix_is_absent() {
        let mut trie = FrequencyTrie::new();
        trie.insert("hello", 100);
        assert_eq!(trie.frequency("hell"), None);
        assert_eq!(trie.completions("hell", 5), vec![("hello".to_string(), 100)]);
        assert!(trie.completions("hex", 5).is_empty());
        assert_eq!(trie.frequency("hello"), Some(100));
    }

    #[test]
    fn test_completions_ranked() {
        let mut trie = FrequencyTrie::new();
        trie.insert("we", 9000);
        trie.insert("with", 8000);
        trie.insert("was", 7800);
        trie.insert("wax", 7800);
        trie.insert("hello", 10);
        let words: Vec<String> = trie
            .completions("w", 3)
            .into_iter()
            .map(|(w, _)| w)
            .collect();
        assert_eq!(words, vec!["we", "with", "was"]);
        assert!(trie.completions("z", 3).is_empty());
    }

    #[test]
    fn test_unicode_paths() {
        let mut trie = FrequencyTrie::new();
        trie.insert("été", 40);
        trie.insert("étude", 20);
        assert_eq!(trie.frequency("été"), Some(40));
        assert_eq!(trie.completions("ét", 5).len(), 2);
    }
}
