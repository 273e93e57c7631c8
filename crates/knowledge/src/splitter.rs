//! Recursive character text splitting.
//!
//! Tries paragraph, line, word and finally character boundaries, merging
//! adjacent pieces into chunks of at most `chunk_size` characters where
//! consecutive chunks share up to `chunk_overlap` characters.

use std::collections::VecDeque;

const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size.saturating_sub(1)),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        self.split_with(text, SEPARATORS)
    }

    fn split_with(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let idx = separators
            .iter()
            .position(|s| s.is_empty() || text.contains(s))
            .unwrap_or(separators.len().saturating_sub(1));
        let separator = separators.get(idx).copied().unwrap_or("");
        let remaining = separators.get(idx + 1..).unwrap_or(&[]);

        let pieces: Vec<&str> = if separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(separator).filter(|p| !p.is_empty()).collect()
        };

        let mut chunks = Vec::new();
        let mut pending: Vec<&str> = Vec::new();

        for piece in pieces {
            if char_len(piece) < self.chunk_size {
                pending.push(piece);
                continue;
            }
            if !pending.is_empty() {
                chunks.extend(self.merge(&pending, separator));
                pending.clear();
            }
            if remaining.is_empty() {
                chunks.push(piece.to_string());
            } else {
                chunks.extend(self.split_with(piece, remaining));
            }
        }
        if !pending.is_empty() {
            chunks.extend(self.merge(&pending, separator));
        }
        chunks
    }

    fn merge(&self, pieces: &[&str], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let joined_len = |window: &VecDeque<&str>| -> usize {
            window.iter().map(|p| char_len(p)).sum::<usize>()
                + sep_len * window.len().saturating_sub(1)
        };

        let mut docs = Vec::new();
        let mut window: VecDeque<&str> = VecDeque::new();
        let mut total = 0;

        for &piece in pieces {
            let len = char_len(piece);
            let added = if window.is_empty() { len } else { len + sep_len };

            if total + added > self.chunk_size && !window.is_empty() {
                push_doc(&mut docs, &window, separator);
                while !window.is_empty()
                    && (total > self.chunk_overlap || total + len + sep_len > self.chunk_size)
                {
                    window.pop_front();
                    total = joined_len(&window);
                }
            }

            window.push_back(piece);
            total = joined_len(&window);
        }

        if !window.is_empty() {
            push_doc(&mut docs, &window, separator);
        }
        docs
    }
}

fn push_doc(docs: &mut Vec<String>, window: &VecDeque<&str>, separator: &str) {
    let doc = window
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    if !doc.is_empty() {
        docs.push(doc);
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
