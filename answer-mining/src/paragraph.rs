use std::hash::Hash;

use crate::scoring::{max_over_references, recall};

/// Length floor used when ranking paragraphs against the gold answers. Any
/// paragraph shorter than this can take over a tie, so a document whose
/// paragraphs all score zero resolves to its shortest paragraph.
pub const ANSWER_LENGTH_FLOOR: usize = 999_999;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParagraphMatch {
    pub index: usize,
    pub score: f64,
}

/// Running best over paragraphs visited in index order.
///
/// A paragraph replaces the current best when it scores strictly higher, or
/// scores the same and is strictly shorter. The starting length decides
/// whether zero-score paragraphs can ever win.
#[derive(Debug, Clone, Copy)]
struct RunningBest {
    index: Option<usize>,
    score: f64,
    length: usize,
}

impl RunningBest {
    const fn new(length: usize) -> Self {
        Self {
            index: None,
            score: 0.0,
            length,
        }
    }

    fn offer(&mut self, index: usize, score: f64, length: usize) {
        if score > self.score || (score == self.score && length < self.length) {
            self.index = Some(index);
            self.score = score;
            self.length = length;
        }
    }
}

/// Pick the paragraph sharing tokens with the question.
///
/// Each question token is scored on its own, which makes a paragraph score
/// `1.0` as soon as it contains any question token. With the length floor at
/// zero the first matching paragraph wins unless a later matching paragraph
/// is strictly shorter; when nothing matches the first paragraph is returned.
pub fn select_relevant_paragraph<T, P>(paragraphs: &[P], question: &[T]) -> ParagraphMatch
where
    T: Eq + Hash,
    P: AsRef<[T]>,
{
    let single_tokens: Vec<&[T]> = question.chunks(1).collect();
    let mut best = RunningBest::new(0);
    for (index, paragraph) in paragraphs.iter().enumerate() {
        let paragraph = paragraph.as_ref();
        let score = max_over_references(recall, paragraph, &single_tokens).unwrap_or(0.0);
        best.offer(index, score, paragraph.len());
    }
    ParagraphMatch {
        index: best.index.unwrap_or(0),
        score: best.score,
    }
}

/// Pick the paragraph with the highest recall against any gold answer.
///
/// Returns `None` when there are no answers to compare against, or when no
/// paragraph gets past the running best.
pub fn select_answer_paragraph<T, P, A>(paragraphs: &[P], answers: &[A]) -> Option<usize>
where
    T: Eq + Hash,
    P: AsRef<[T]>,
    A: AsRef<[T]>,
{
    let mut best = RunningBest::new(ANSWER_LENGTH_FLOOR);
    for (index, paragraph) in paragraphs.iter().enumerate() {
        let paragraph = paragraph.as_ref();
        let Some(score) = max_over_references(recall, paragraph, answers) else {
            continue;
        };
        best.offer(index, score, paragraph.len());
    }
    best.index
}
