use std::{collections::HashMap, hash::Hash};

/// Precision, recall and F1 of a candidate token sequence against one reference.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct OverlapScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

fn token_counts<T: Eq + Hash>(tokens: &[T]) -> HashMap<&T, usize> {
    let mut counts = HashMap::with_capacity(tokens.len());
    for token in tokens {
        *counts.entry(token).or_insert(0) += 1;
    }
    counts
}

fn shared_count<T: Eq + Hash>(candidate: &HashMap<&T, usize>, reference: &HashMap<&T, usize>) -> usize {
    candidate
        .iter()
        .map(|(token, count)| reference.get(*token).map_or(0, |other| (*count).min(*other)))
        .sum()
}

fn scores_from_overlap(overlap: usize, candidate_len: usize, reference_len: usize) -> OverlapScores {
    if overlap == 0 {
        return OverlapScores::default();
    }
    let precision = overlap as f64 / candidate_len as f64;
    let recall = overlap as f64 / reference_len as f64;
    let f1 = (2.0 * precision * recall) / (precision + recall);
    OverlapScores {
        precision,
        recall,
        f1,
    }
}

/// Multiset overlap scores. Token order is ignored and duplicates count, so
/// `["a", "a"]` against `["a"]` shares one token. A zero overlap yields the
/// all-zero sentinel.
pub fn precision_recall_f1<T: Eq + Hash>(candidate: &[T], reference: &[T]) -> OverlapScores {
    let overlap = shared_count(&token_counts(candidate), &token_counts(reference));
    scores_from_overlap(overlap, candidate.len(), reference.len())
}

pub fn recall<T: Eq + Hash>(candidate: &[T], reference: &[T]) -> f64 {
    precision_recall_f1(candidate, reference).recall
}

pub fn f1_score<T: Eq + Hash>(candidate: &[T], reference: &[T]) -> f64 {
    precision_recall_f1(candidate, reference).f1
}

/// Best `metric` value of `candidate` across all references, or `None` when
/// there is nothing to compare against.
pub fn max_over_references<T, R, F>(metric: F, candidate: &[T], references: &[R]) -> Option<f64>
where
    R: AsRef<[T]>,
    F: Fn(&[T], &[T]) -> f64,
{
    references
        .iter()
        .map(|reference| metric(candidate, reference.as_ref()))
        .reduce(f64::max)
}

/// Token counts of one gold answer, computed once per sample.
#[derive(Debug, Clone)]
pub struct ReferenceProfile<'a, T> {
    counts: HashMap<&'a T, usize>,
    len: usize,
}

impl<'a, T: Eq + Hash> ReferenceProfile<'a, T> {
    pub fn new(tokens: &'a [T]) -> Self {
        Self {
            counts: token_counts(tokens),
            len: tokens.len(),
        }
    }

    fn count(&self, token: &T) -> usize {
        self.counts.get(token).copied().unwrap_or(0)
    }
}

/// F1 of a span that only ever shrinks from the right.
///
/// The span miner evaluates `tokens[start..=end]` for a fixed `start` and a
/// descending `end`. Rebuilding the multisets for every step is quadratic in
/// the paragraph length, so the overlap with each reference is kept up to
/// date as the last token is dropped. Scores are bit-identical to
/// [`f1_score`] on the same span.
#[derive(Debug)]
pub struct SuffixScorer<'a, T> {
    span: &'a [T],
    counts: HashMap<&'a T, usize>,
    references: &'a [ReferenceProfile<'a, T>],
    overlaps: Vec<usize>,
}

impl<'a, T: Eq + Hash> SuffixScorer<'a, T> {
    pub fn new(span: &'a [T], references: &'a [ReferenceProfile<'a, T>]) -> Self {
        let counts = token_counts(span);
        let overlaps = references
            .iter()
            .map(|reference| shared_count(&counts, &reference.counts))
            .collect();
        Self {
            span,
            counts,
            references,
            overlaps,
        }
    }

    pub fn span(&self) -> &'a [T] {
        self.span
    }

    /// Max F1 over the references for the current span.
    pub fn best_f1(&self) -> Option<f64> {
        self.references
            .iter()
            .zip(&self.overlaps)
            .map(|(reference, overlap)| scores_from_overlap(*overlap, self.span.len(), reference.len).f1)
            .reduce(f64::max)
    }

    /// Drop the last token of the span. Returns the removed token.
    pub fn pop_back(&mut self) -> Option<&'a T> {
        let (token, rest) = self.span.split_last()?;
        self.span = rest;
        if let Some(count) = self.counts.get_mut(token) {
            for (reference, overlap) in self.references.iter().zip(self.overlaps.iter_mut()) {
                if *count <= reference.count(token) {
                    *overlap = overlap.saturating_sub(1);
                }
            }
            *count = count.saturating_sub(1);
        }
        Some(token)
    }
}
