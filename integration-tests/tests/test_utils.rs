use std::{
    fs,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

use answer_mining::Sample;
use anyhow::Result;
use preprocess::{args::open_append, run_preprocess, PipelineSettings, PreprocessSummary};
use serde_json::json;
use tempfile::TempDir;

/// One segmented sample whose second document holds `answer` in its last paragraph.
pub fn sample_line(id: usize, answer: &str) -> String {
    json!({
        "question_id": id,
        "question_type": "DESCRIPTION",
        "segmented_question": ["什么", "是", answer],
        "segmented_answers": [[answer]],
        "documents": [
            {
                "title": "无关",
                "is_selected": false,
                "segmented_paragraphs": [["天气", "很", "好"]]
            },
            {
                "title": "相关",
                "is_selected": true,
                "segmented_paragraphs": [
                    ["开头", "介绍"],
                    ["这里", "说", answer, "的", "事"]
                ]
            }
        ]
    })
    .to_string()
}

/// Writes `lines` to `input.json` inside a fresh temporary directory.
pub fn write_corpus(lines: &[String]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let input = dir.path().join("input.json");
    fs::write(&input, lines.join("\n")).expect("Failed to write corpus");
    (dir, input)
}

/// Runs the pipeline from one file into another the way the binary does.
pub async fn preprocess_file(
    input: &Path,
    output: &Path,
    settings: &PipelineSettings,
) -> Result<PreprocessSummary> {
    let reader = BufReader::new(fs::File::open(input)?);
    let writer = BufWriter::new(open_append(output)?);
    run_preprocess(reader, writer, settings, std::future::pending()).await
}

/// Parses every line of the output file back into a sample.
pub fn read_output(path: &Path) -> Vec<Sample> {
    fs::read_to_string(path)
        .expect("Failed to read output")
        .lines()
        .map(|line| serde_json::from_str(line).expect("Output line is not a sample"))
        .collect()
}

/// `question_id` of every sample in the output file, in file order.
pub fn output_ids(path: &Path) -> Vec<u64> {
    read_output(path)
        .iter()
        .map(|sample| sample.extra["question_id"].as_u64().expect("question id"))
        .collect()
}
