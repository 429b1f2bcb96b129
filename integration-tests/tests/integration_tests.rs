use std::{collections::BTreeSet, fs};

use common::utils::config::get_config_from;
use preprocess::{args::Config, settings::resolve_settings, PipelineSettings};
use serde_json::json;

mod test_utils;
use test_utils::*;

/// End-to-end tests running the preprocessing pipeline against files on disk.

#[tokio::test]
async fn test_file_corpus_is_annotated() {
    let (dir, input) = write_corpus(&[sample_line(1, "长城")]);
    let output = dir.path().join("nested").join("out.json");

    let summary = preprocess_file(&input, &output, &PipelineSettings::new(1))
        .await
        .expect("Preprocessing failed");
    assert_eq!(summary.written, 1);

    let records = read_output(&output);
    assert_eq!(records.len(), 1);
    let sample = &records[0];
    assert_eq!(sample.answer_docs, vec![1]);
    assert_eq!(sample.answer_spans, vec![[2, 2]]);
    assert_eq!(sample.fake_answers, vec!["长城".to_string()]);
    assert_eq!(sample.match_scores, vec![1.0]);
    assert_eq!(sample.documents[0].most_related_para, Some(0));
    assert_eq!(sample.documents[1].most_related_para, Some(1));

    // Fields the miner does not know about pass through untouched.
    assert_eq!(sample.extra["question_id"], json!(1));
    assert_eq!(sample.extra["question_type"], json!("DESCRIPTION"));
    assert_eq!(sample.documents[0].extra["title"], json!("无关"));
}

#[tokio::test]
async fn test_output_is_appended_across_runs() {
    let (dir, input) = write_corpus(&[sample_line(1, "黄河"), sample_line(2, "长江")]);
    let output = dir.path().join("out.json");

    for _ in 0..2 {
        preprocess_file(&input, &output, &PipelineSettings::new(1))
            .await
            .expect("Preprocessing failed");
    }

    let ids: Vec<u64> = output_ids(&output);
    assert_eq!(ids, vec![1, 2, 1, 2]);
}

#[tokio::test]
async fn test_malformed_line_is_skipped_in_file_corpus() {
    let lines = vec![
        sample_line(1, "泰山"),
        "{not json".to_string(),
        sample_line(3, "华山"),
    ];
    let (dir, input) = write_corpus(&lines);
    let output = dir.path().join("out.json");

    let summary = preprocess_file(&input, &output, &PipelineSettings::new(2))
        .await
        .expect("Preprocessing failed");
    assert_eq!(summary.parsed, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert_eq!(summary.skipped[0].line, 2);

    let ids: BTreeSet<u64> = output_ids(&output).into_iter().collect();
    assert_eq!(ids, BTreeSet::from([1, 3]));
}

#[tokio::test]
async fn test_single_worker_keeps_input_order() {
    let lines: Vec<String> = (0..30).map(|id| sample_line(id, "答案")).collect();
    let (dir, input) = write_corpus(&lines);
    let output = dir.path().join("out.json");

    preprocess_file(&input, &output, &PipelineSettings::new(1))
        .await
        .expect("Preprocessing failed");

    let ids: Vec<u64> = output_ids(&output);
    assert_eq!(ids, (0..30).collect::<Vec<u64>>());
}

#[tokio::test]
async fn test_unanswerable_sample_gets_empty_annotations() {
    let line = json!({
        "question_id": 5,
        "segmented_question": ["问题"],
        "segmented_answers": [],
        "documents": [
            {"is_selected": true, "segmented_paragraphs": [["一", "段"], ["问题", "在此"]]}
        ]
    })
    .to_string();
    let (dir, input) = write_corpus(&[line]);
    let output = dir.path().join("out.json");

    preprocess_file(&input, &output, &PipelineSettings::new(1))
        .await
        .expect("Preprocessing failed");

    let sample = &read_output(&output)[0];
    assert!(sample.answer_docs.is_empty());
    assert!(sample.answer_spans.is_empty());
    assert!(sample.fake_answers.is_empty());
    assert!(sample.match_scores.is_empty());
    assert_eq!(sample.documents[0].most_related_para, Some(0));

    // The empty lists are written out rather than omitted.
    let raw = fs::read_to_string(&output).expect("Failed to read output");
    for key in ["answer_docs", "answer_spans", "fake_answers", "match_scores"] {
        assert!(raw.contains(&format!("\"{key}\":[]")), "missing empty {key}");
    }
}

#[tokio::test]
async fn test_settings_file_drives_the_run() {
    let (dir, input) = write_corpus(&[sample_line(9, "长城")]);
    let settings_path = dir.path().join("preprocess.toml");
    fs::write(
        &settings_path,
        "span_window = 3\nmax_workers = 2\nprogress = false\n",
    )
    .expect("Failed to write settings");

    let file_config = get_config_from(&settings_path).expect("Failed to load settings");
    let cli = Config {
        input: input.clone(),
        output: dir.path().join("out.json"),
        max_workers: None,
        ordered: false,
        span_window: None,
        question_fallback: false,
        no_progress: false,
        config: Some(settings_path),
    };
    let settings = resolve_settings(&cli, &file_config).expect("Failed to resolve settings");
    assert_eq!(settings.workers, 2);
    assert_eq!(settings.miner.span_window, 3);
    assert!(!settings.progress);

    // The answer token sits at position 2 of its paragraph, inside a 3-token window.
    preprocess_file(&input, &cli.output, &settings)
        .await
        .expect("Preprocessing failed");
    let sample = &read_output(&cli.output)[0];
    assert_eq!(sample.fake_answers, vec!["长城".to_string()]);
}
