//! Serde model of one DuReader record.
//!
//! Only the fields the miner reads or writes are typed; everything else in a
//! record is kept in `extra` and written back untouched. On output the typed
//! fields come first in declaration order, followed by the `extra` fields in
//! their input order, so keys such as `question_id` move after
//! `match_scores`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub segmented_paragraphs: Vec<Vec<String>>,
    pub is_selected: bool,
    /// Index of the paragraph most related to the gold answers. Serialized as
    /// `-1` while undetermined.
    #[serde(default, with = "paragraph_index")]
    pub most_related_para: Option<usize>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Document {
    pub fn new(paragraphs: Vec<Vec<String>>, is_selected: bool) -> Self {
        Self {
            segmented_paragraphs: paragraphs,
            is_selected,
            most_related_para: None,
            extra: Map::new(),
        }
    }

    /// Most related paragraph index, falling back to the first paragraph.
    pub fn resolved_para(&self) -> usize {
        self.most_related_para.unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub documents: Vec<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmented_question: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segmented_answers: Option<Vec<Vec<String>>>,
    #[serde(default)]
    pub answer_docs: Vec<usize>,
    #[serde(default)]
    pub answer_spans: Vec<[usize; 2]>,
    #[serde(default)]
    pub fake_answers: Vec<String>,
    #[serde(default)]
    pub match_scores: Vec<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sample {
    pub fn new(
        question: Vec<String>,
        answers: Vec<Vec<String>>,
        documents: Vec<Document>,
    ) -> Self {
        Self {
            documents,
            segmented_question: Some(question),
            segmented_answers: Some(answers),
            answer_docs: Vec::new(),
            answer_spans: Vec::new(),
            fake_answers: Vec::new(),
            match_scores: Vec::new(),
            extra: Map::new(),
        }
    }

    pub fn answer_token_sets(&self) -> &[Vec<String>] {
        self.segmented_answers.as_deref().unwrap_or_default()
    }

    /// Replace the annotation lists with at most one mined answer.
    pub fn set_answer(&mut self, answer: Option<MinedAnswer>) {
        self.answer_docs.clear();
        self.answer_spans.clear();
        self.fake_answers.clear();
        self.match_scores.clear();
        if let Some(answer) = answer {
            self.answer_docs.push(answer.document);
            self.answer_spans.push(answer.span);
            self.fake_answers.push(answer.text);
            self.match_scores.push(answer.score);
        }
    }
}

/// Best span found for a sample.
#[derive(Debug, Clone, PartialEq)]
pub struct MinedAnswer {
    pub document: usize,
    /// Inclusive `[start, end]` token offsets into the most related paragraph.
    pub span: [usize; 2],
    pub score: f64,
    pub text: String,
}

mod paragraph_index {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<usize>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(index) => serializer.serialize_u64(*index as u64),
            None => serializer.serialize_i64(-1),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
        let raw = Option::<i64>::deserialize(deserializer)?;
        Ok(raw.and_then(|index| usize::try_from(index).ok()))
    }
}
