pub mod paragraph;
pub mod sample;
pub mod scoring;
pub mod span;

pub use paragraph::{select_answer_paragraph, select_relevant_paragraph, ParagraphMatch};
pub use sample::{Document, MinedAnswer, Sample};
pub use scoring::{
    f1_score, max_over_references, precision_recall_f1, recall, OverlapScores, ReferenceProfile,
    SuffixScorer,
};
pub use span::{find_best_span, mine_answer, MinerConfig};
