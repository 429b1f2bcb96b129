use std::collections::HashSet;

use common::{error::AppError, utils::config::DEFAULT_SPAN_WINDOW};
use tracing::debug;

use crate::{
    paragraph::{select_answer_paragraph, select_relevant_paragraph},
    sample::{Document, MinedAnswer, Sample},
    scoring::{ReferenceProfile, SuffixScorer},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MinerConfig {
    /// Only this many leading tokens of a paragraph are searched for spans.
    pub span_window: usize,
    /// Rank paragraphs against the question when a sample has no gold answers.
    pub question_fallback: bool,
}

impl Default for MinerConfig {
    fn default() -> Self {
        Self {
            span_window: DEFAULT_SPAN_WINDOW,
            question_fallback: false,
        }
    }
}

/// Annotate one sample with its most related paragraphs and the best span.
///
/// Samples without gold answers or without selected documents come back with
/// empty answer lists. A selected document without paragraphs cannot be
/// searched and fails the sample.
pub fn mine_answer(mut sample: Sample, config: &MinerConfig) -> Result<Sample, AppError> {
    annotate_paragraphs(&mut sample, config);
    let best = find_best_span(
        &sample.documents,
        sample.answer_token_sets(),
        config.span_window,
    )?;
    if best.is_none() {
        debug!(
            documents = sample.documents.len(),
            answers = sample.answer_token_sets().len(),
            "no overlapping span found"
        );
    }
    sample.set_answer(best);
    Ok(sample)
}

fn annotate_paragraphs(sample: &mut Sample, config: &MinerConfig) {
    let Sample {
        documents,
        segmented_question,
        segmented_answers,
        ..
    } = sample;
    let answers = segmented_answers.as_deref().unwrap_or_default();
    let question = segmented_question.as_deref().unwrap_or_default();
    for document in documents.iter_mut() {
        let selected = if !answers.is_empty() {
            select_answer_paragraph::<String, _, _>(&document.segmented_paragraphs, answers)
        } else if config.question_fallback {
            Some(select_relevant_paragraph(&document.segmented_paragraphs, question).index)
        } else {
            None
        };
        document.most_related_para = Some(selected.unwrap_or(0));
    }
}

/// Search the most related paragraph of every selected document for the span
/// with the highest F1 against any gold answer.
///
/// A span must start on a token that occurs in some answer. For each start the
/// end moves from the last window token backwards, and the first zero score
/// stops that start. Only a strictly higher score replaces the best so far,
/// so earlier documents, earlier starts and longer spans win ties.
pub fn find_best_span(
    documents: &[Document],
    answers: &[Vec<String>],
    window: usize,
) -> Result<Option<MinedAnswer>, AppError> {
    let answer_tokens: HashSet<&String> = answers.iter().flatten().collect();
    let profiles: Vec<ReferenceProfile<'_, String>> = answers
        .iter()
        .map(|answer| ReferenceProfile::new(answer.as_slice()))
        .collect();

    let mut best: Option<MinedAnswer> = None;
    let mut best_score = 0.0;
    for (doc_idx, document) in documents.iter().enumerate() {
        if !document.is_selected {
            continue;
        }
        let paragraph = document
            .segmented_paragraphs
            .get(document.resolved_para())
            .ok_or(AppError::EmptyDocument { document: doc_idx })?;
        let tokens = paragraph.get(..window).unwrap_or(paragraph.as_slice());

        for (start, token) in tokens.iter().enumerate() {
            if !answer_tokens.contains(token) {
                continue;
            }
            let Some(suffix) = tokens.get(start..) else {
                continue;
            };
            let mut scorer = SuffixScorer::new(suffix, &profiles);
            while let Some(score) = scorer.best_f1() {
                if score == 0.0 {
                    break;
                }
                if score > best_score {
                    let span = scorer.span();
                    best_score = score;
                    best = Some(MinedAnswer {
                        document: doc_idx,
                        span: [start, start + span.len() - 1],
                        score,
                        text: span.concat(),
                    });
                }
                if scorer.pop_back().is_none() || scorer.span().is_empty() {
                    break;
                }
            }
        }
    }
    Ok(best)
}
