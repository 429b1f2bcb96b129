//! Line-level input decoding and output encoding.

use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use answer_mining::Sample;
use common::error::AppError;
use serde::Serialize;
use tracing::warn;

/// A decoded input record together with where it came from.
#[derive(Debug)]
pub struct ParsedRecord {
    /// Position among the successfully parsed records.
    pub seq: usize,
    /// 1-based line number in the input.
    pub line: usize,
    pub raw: String,
    pub sample: Sample,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    pub line: usize,
    pub error: String,
}

/// Decode every non-blank line of `reader`. Lines that are not valid JSON
/// samples are logged and returned as skipped instead of failing the read.
pub fn read_records<R: BufRead>(reader: R) -> Result<(Vec<ParsedRecord>, Vec<SkippedRecord>)> {
    let mut records = Vec::new();
    let mut skipped = Vec::new();
    for (line_idx, line) in reader.split(b'\n').enumerate() {
        let line_no = line_idx + 1;
        let line = line.with_context(|| format!("reading input line {line_no}"))?;
        let trimmed = line.trim_ascii();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_slice::<Sample>(trimmed) {
            Ok(sample) => records.push(ParsedRecord {
                seq: records.len(),
                line: line_no,
                raw: String::from_utf8_lossy(trimmed).into_owned(),
                sample,
            }),
            Err(err) => {
                warn!(
                    line = line_no,
                    error = %err,
                    "Failed to decode JSON record, skipping it"
                );
                skipped.push(SkippedRecord {
                    line: line_no,
                    error: err.to_string(),
                });
            }
        }
    }
    Ok((records, skipped))
}

/// Append one annotated sample as a JSON line. Non-ASCII text is written as is.
pub fn write_record<W: Write + ?Sized>(output: &mut W, sample: &Sample) -> Result<(), AppError> {
    serde_json::to_writer(&mut *output, sample)?;
    output.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::io::Cursor;

    fn valid_line(question: &str) -> String {
        json!({
            "question": question,
            "segmented_answers": [["a"]],
            "documents": [{"is_selected": true, "segmented_paragraphs": [["a", "b"]]}]
        })
        .to_string()
    }

    #[test]
    fn malformed_lines_are_skipped_with_their_line_number() {
        let input = format!("{}\n{{not json\n{}\n", valid_line("一"), valid_line("三"));
        let (records, skipped) = read_records(Cursor::new(input)).expect("read");

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].line, 1);
        assert_eq!(records[1].line, 3);
        assert_eq!(records[1].seq, 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 2);
    }

    #[test]
    fn blank_lines_and_missing_fields() {
        let input = format!(
            "\n   \n{}\r\n{}\n",
            valid_line("q"),
            json!({"segmented_answers": [["a"]]})
        );
        let (records, skipped) = read_records(Cursor::new(input)).expect("read");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].line, 3);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 4);
        assert!(skipped[0].error.contains("documents"));
    }

    #[test]
    fn invalid_utf8_is_a_skipped_record() {
        let mut input = valid_line("q").into_bytes();
        input.extend_from_slice(b"\n\xff\xfe\n");
        let (records, skipped) = read_records(Cursor::new(input)).expect("read");
        assert_eq!(records.len(), 1);
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].line, 2);
    }

    #[test]
    fn written_records_keep_non_ascii_text() {
        let (records, _) = read_records(Cursor::new(valid_line("上海迪士尼"))).expect("read");
        let mut out = Vec::new();
        write_record(&mut out, &records[0].sample).expect("write");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.ends_with('\n'));
        assert!(text.contains("上海迪士尼"));
        let value: Value = serde_json::from_str(text.trim_end()).expect("json");
        assert_eq!(value["question"], json!("上海迪士尼"));
    }
}
