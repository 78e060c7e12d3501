// ============================================================
// Layer 4 - Character & Label Tokenizers
// ============================================================
// Two small vocabularies, both fitted on the TRAINING split only:
//
// CharTokenizer (inputs)
//   - every distinct character gets a positive index
//   - most frequent character → 1, next → 2, ...
//     (ties keep first-seen order)
//   - 0 is padding
//   - characters never seen in training → vocab_len + 1 (OOV)
//   - '\t' and '\n' are filtered before counting and encoding
//   So n_tokens = vocab_len + 2 covers padding, vocab and OOV.
//
// LabelEncoder (outputs)
//   - every distinct label gets a zero-based class index,
//     again ordered by descending frequency
//   - labels are kept verbatim so index → name round-trips
//   - unseen labels return None; the caller applies the
//     UnknownLabelPolicy
//
// Padding is on the LEFT and truncation keeps the LAST len_max
// tokens, so the recurrent layer always finishes on the end of
// the sequence.

use std::collections::{BTreeMap, HashMap};

/// Characters stripped before fitting and encoding.
const FILTERED: [char; 2] = ['\t', '\n'];

/// Index reserved for padding.
pub const PAD_INDEX: u32 = 0;

/// Rank items by descending count, first occurrence breaking ties.
fn rank_by_frequency<T, I>(items: I) -> Vec<T>
where
    T: Clone + Eq + std::hash::Hash,
    I: IntoIterator<Item = T>,
{
    // item → (count, first position)
    let mut seen: HashMap<T, (usize, usize)> = HashMap::new();
    for (pos, item) in items.into_iter().enumerate() {
        seen.entry(item).or_insert((0, pos)).0 += 1;
    }

    let mut ranked: Vec<(T, (usize, usize))> = seen.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().map(|(item, _)| item).collect()
}

// ─── CharTokenizer ────────────────────────────────────────────────────────────
#[derive(Debug, Clone)]
pub struct CharTokenizer {
    index: HashMap<char, u32>,
}

impl CharTokenizer {
    /// Build the vocabulary from the training strings.
    pub fn fit<'a>(texts: impl IntoIterator<Item = &'a str>) -> Self {
        let chars = texts
            .into_iter()
            .flat_map(str::chars)
            .filter(|c| !FILTERED.contains(c));

        let index = rank_by_frequency(chars)
            .into_iter()
            .enumerate()
            .map(|(i, c)| (c, i as u32 + 1))
            .collect();

        Self { index }
    }

    pub fn vocab_len(&self) -> usize {
        self.index.len()
    }

    /// Index used for characters outside the training vocabulary.
    pub fn oov_index(&self) -> u32 {
        self.vocab_len() as u32 + 1
    }

    /// Embedding table size: padding + vocabulary + OOV.
    pub fn n_tokens(&self) -> usize {
        self.vocab_len() + 2
    }

    /// Unpadded token sequence for one string.
    pub fn encode(&self, text: &str) -> Vec<u32> {
        let oov = self.oov_index();
        text.chars()
            .filter(|c| !FILTERED.contains(c))
            .map(|c| self.index.get(&c).copied().unwrap_or(oov))
            .collect()
    }

    /// Encode and pad/truncate to exactly `len_max` tokens.
    pub fn encode_padded(&self, text: &str, len_max: usize) -> Vec<u32> {
        pad_pre(self.encode(text), len_max)
    }
}

/// Left-pad with PAD_INDEX, or drop leading tokens, to reach `len_max`.
pub fn pad_pre(tokens: Vec<u32>, len_max: usize) -> Vec<u32> {
    if tokens.len() >= len_max {
        tokens[tokens.len() - len_max..].to_vec()
    } else {
        let mut out = vec![PAD_INDEX; len_max - tokens.len()];
        out.extend(tokens);
        out
    }
}

// ─── LabelEncoder ─────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Default)]
pub struct LabelEncoder {
    word_index: BTreeMap<String, usize>,
    index_word: BTreeMap<usize, String>,
}

impl LabelEncoder {
    pub fn fit<'a>(labels: impl IntoIterator<Item = &'a str>) -> Self {
        let mut enc = Self::default();
        for (i, label) in rank_by_frequency(labels).into_iter().enumerate() {
            enc.word_index.insert(label.to_string(), i);
            enc.index_word.insert(i, label.to_string());
        }
        enc
    }

    pub fn n_classes(&self) -> usize {
        self.word_index.len()
    }

    pub fn encode(&self, label: &str) -> Option<usize> {
        self.word_index.get(label).copied()
    }

    pub fn into_maps(self) -> (BTreeMap<usize, String>, BTreeMap<String, usize>) {
        (self.index_word, self.word_index)
    }
}
