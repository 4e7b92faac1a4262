//! Tool command envelope
//!
//! Each tool page of the suite speaks one JSON command; all of them bottom
//! out in the same transformer. The report carries the five-state request
//! status as a returned value, never as shared mutable state.

use crate::error::TransformError;
use crate::lopdf_engine::LopdfEngine;
use crate::selection::PageSelection;
use crate::transform::{OutputBundle, Packaging, TransformMode, TransformRequest, Transformer};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// One tool invocation, tagged the way the UI pages emit it.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ToolCommand {
    /// Extract the selected pages into one document.
    Extract { file: Vec<u8>, ranges: String },
    /// Split the selected pages into per-page documents, zipped.
    Split { file: Vec<u8>, ranges: String },
    /// Remove the selected pages, keeping the rest.
    Delete { file: Vec<u8>, ranges: String },
    /// Rebuild the document with pages in the given zero-based order.
    Reorder { file: Vec<u8>, order: Vec<u32> },
}

/// Lifecycle tag of one request, returned with its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Idle,
    Loading,
    Processing,
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    /// Pages in the source document.
    pub page_count: u32,
    /// Pages named by the effective selection.
    pub pages_selected: u32,
}

/// Terminal report of one tool run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub status: RequestStatus,
    /// Base64-encoded output bytes (a document, or a zip for Split).
    pub data: Option<String>,
    /// Suggested download filename.
    pub filename: Option<String>,
    pub error: Option<String>,
    pub metrics: Option<RunMetrics>,
}

/// Run one tool command to completion.
pub fn run(command: ToolCommand) -> RunReport {
    match execute(command) {
        Ok((bytes, filename, metrics)) => RunReport {
            status: RequestStatus::Success,
            data: Some(BASE64.encode(&bytes)),
            filename: Some(filename.to_string()),
            error: None,
            metrics: Some(metrics),
        },
        Err(e) => RunReport {
            status: RequestStatus::Error,
            data: None,
            filename: None,
            error: Some(e.to_string()),
            metrics: None,
        },
    }
}

/// Run a JSON-encoded tool command and return a JSON report. This is the
/// envelope worker-style callers speak; typed callers use [`run`].
pub fn run_json(json: &str) -> String {
    let report = match serde_json::from_str::<ToolCommand>(json) {
        Ok(command) => run(command),
        Err(e) => RunReport {
            status: RequestStatus::Error,
            data: None,
            filename: None,
            error: Some(format!("Invalid command: {}", e)),
            metrics: None,
        },
    };

    serde_json::to_string(&report).unwrap_or_else(|e| {
        format!(
            r#"{{"status":"error","error":"report serialization failed: {}"}}"#,
            e
        )
    })
}

enum SelectionSpec {
    Ranges(String),
    RangesComplement(String),
    Order(Vec<u32>),
}

fn execute(command: ToolCommand) -> Result<(Vec<u8>, &'static str, RunMetrics), TransformError> {
    let transformer = Transformer::new(LopdfEngine);

    let (file, mode, packaging, filename, spec) = match command {
        ToolCommand::Extract { file, ranges } => (
            file,
            TransformMode::Combined,
            Packaging::None,
            "extracted.pdf",
            SelectionSpec::Ranges(ranges),
        ),
        ToolCommand::Split { file, ranges } => (
            file,
            TransformMode::Separate,
            Packaging::Archive,
            "split_pages.zip",
            SelectionSpec::Ranges(ranges),
        ),
        ToolCommand::Delete { file, ranges } => (
            file,
            TransformMode::Combined,
            Packaging::None,
            "remaining.pdf",
            SelectionSpec::RangesComplement(ranges),
        ),
        ToolCommand::Reorder { file, order } => (
            file,
            TransformMode::Combined,
            Packaging::None,
            "reordered.pdf",
            SelectionSpec::Order(order),
        ),
    };

    let source = transformer.engine().load(&file)?;
    let page_count = transformer.engine().page_count(&source);

    let selection = match spec {
        SelectionSpec::Ranges(ranges) => PageSelection::parse(&ranges, page_count)?,
        SelectionSpec::RangesComplement(ranges) => {
            PageSelection::parse(&ranges, page_count)?.complement(page_count)?
        }
        SelectionSpec::Order(order) => PageSelection::from_order(&order, page_count)?,
    };
    let pages_selected = selection.len() as u32;

    let bundle = transformer.transform(TransformRequest {
        source,
        selection,
        mode,
        packaging,
    })?;

    let bytes = match bundle {
        OutputBundle::Single(bytes) | OutputBundle::Archive(bytes) => bytes,
        OutputBundle::Documents(_) => {
            // Tool commands always deliver one downloadable artifact
            return Err(TransformError::Packaging(
                "separate outputs require archive packaging".into(),
            ));
        }
    };

    let metrics = RunMetrics {
        input_size_bytes: file.len(),
        output_size_bytes: bytes.len(),
        page_count,
        pages_selected,
    };

    Ok((bytes, filename, metrics))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{content::Content, content::Operation, Dictionary, Document, Object, Stream};
    use std::io::Cursor;
    use zip::ZipArchive;

    fn build_test_pdf(num_pages: u32) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let mut kids = Vec::new();
        for i in 0..num_pages {
            let content = Content {
                operations: vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Td", vec![Object::Integer(72), Object::Integer(720)]),
                    Operation::new(
                        "Tj",
                        vec![Object::String(
                            format!("Sheet {}", i + 1).into_bytes(),
                            lopdf::StringFormat::Literal,
                        )],
                    ),
                    Operation::new("ET", vec![]),
                ],
            };
            let content_id =
                doc.add_object(Stream::new(Dictionary::new(), content.encode().unwrap()));

            let page = Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Page".to_vec())),
                ("Parent", Object::Reference(pages_id)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(595),
                        Object::Integer(842),
                    ]),
                ),
                ("Contents", Object::Reference(content_id)),
            ]);
            kids.push(Object::Reference(doc.add_object(page)));
        }

        let pages = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Count", Object::Integer(num_pages as i64)),
            ("Kids", Object::Array(kids)),
        ]);
        doc.objects.insert(pages_id, Object::Dictionary(pages));

        let catalog = Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(pages_id)),
        ]);
        let catalog_id = doc.add_object(catalog);
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn decode(report: &RunReport) -> Vec<u8> {
        BASE64.decode(report.data.as_ref().unwrap()).unwrap()
    }

    #[test]
    fn test_command_deserializes_extract() {
        let json = r#"{"type":"Extract","file":[],"ranges":"1-3"}"#;
        let cmd: ToolCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, ToolCommand::Extract { .. }));
    }

    #[test]
    fn test_command_deserializes_reorder() {
        let json = r#"{"type":"Reorder","file":[],"order":[2,0,1]}"#;
        let cmd: ToolCommand = serde_json::from_str(json).unwrap();
        assert!(matches!(cmd, ToolCommand::Reorder { .. }));
    }

    #[test]
    fn test_extract_reports_success_with_document() {
        let report = run(ToolCommand::Extract {
            file: build_test_pdf(5),
            ranges: "2-4".into(),
        });

        assert_eq!(report.status, RequestStatus::Success);
        assert_eq!(report.filename.as_deref(), Some("extracted.pdf"));
        assert!(report.error.is_none());

        let bytes = decode(&report);
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 3);

        let metrics = report.metrics.unwrap();
        assert_eq!(metrics.page_count, 5);
        assert_eq!(metrics.pages_selected, 3);
        assert_eq!(metrics.output_size_bytes, bytes.len());
    }

    #[test]
    fn test_split_reports_zip_with_named_entries() {
        let report = run(ToolCommand::Split {
            file: build_test_pdf(5),
            ranges: "1, 3".into(),
        });

        assert_eq!(report.status, RequestStatus::Success);
        assert_eq!(report.filename.as_deref(), Some("split_pages.zip"));

        let mut zip = ZipArchive::new(Cursor::new(decode(&report))).unwrap();
        let names: Vec<String> = (0..zip.len())
            .map(|i| zip.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["Page_1.pdf", "Page_3.pdf"]);
    }

    #[test]
    fn test_delete_keeps_complement() {
        let report = run(ToolCommand::Delete {
            file: build_test_pdf(4),
            ranges: "2".into(),
        });

        assert_eq!(report.status, RequestStatus::Success);
        let doc = Document::load_mem(&decode(&report)).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_delete_all_pages_is_rejected() {
        let report = run(ToolCommand::Delete {
            file: build_test_pdf(3),
            ranges: "1-3".into(),
        });

        assert_eq!(report.status, RequestStatus::Error);
        assert!(report.data.is_none());
        assert!(report.error.unwrap().contains("cannot delete all pages"));
    }

    #[test]
    fn test_reorder_keeps_page_count() {
        let report = run(ToolCommand::Reorder {
            file: build_test_pdf(3),
            order: vec![2, 0, 1],
        });

        assert_eq!(report.status, RequestStatus::Success);
        let doc = Document::load_mem(&decode(&report)).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_unreadable_file_reports_error() {
        let report = run(ToolCommand::Extract {
            file: b"not a pdf".to_vec(),
            ranges: "1".into(),
        });

        assert_eq!(report.status, RequestStatus::Error);
        assert!(report.error.is_some());
        assert!(report.metrics.is_none());
    }

    #[test]
    fn test_empty_selection_reports_error() {
        let report = run(ToolCommand::Extract {
            file: build_test_pdf(3),
            ranges: "9".into(),
        });

        assert_eq!(report.status, RequestStatus::Error);
        assert!(report
            .error
            .unwrap()
            .contains("no valid pages"));
    }

    #[test]
    fn test_run_json_round_trip() {
        let command = serde_json::json!({
            "type": "Extract",
            "file": build_test_pdf(3),
            "ranges": "1-2",
        });

        let report: serde_json::Value =
            serde_json::from_str(&run_json(&command.to_string())).unwrap();
        assert_eq!(report["status"], "success");
        assert_eq!(report["filename"], "extracted.pdf");
        assert!(report["data"].is_string());
    }

    #[test]
    fn test_run_json_rejects_malformed_envelope() {
        let report: serde_json::Value =
            serde_json::from_str(&run_json("{\"type\":\"Nope\"}")).unwrap();
        assert_eq!(report["status"], "error");
        assert!(report["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid command"));
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&RequestStatus::Processing).unwrap(),
            "\"processing\""
        );
    }
}
