//! End-to-end pipeline tests using stub service clients.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use reportqa::config::Config;
use reportqa::embedding::{EmbeddingClient, EmbeddingServiceError};
use reportqa::generation::{ChatClient, ChatRequest, ChatTurn, GenerationError};
use reportqa::metrics::OperationKind;
use reportqa::processing::{DocumentProcessor, ProcessingError};
use tempfile::TempDir;

/// Deterministic embedding stub: folds bytes into a fixed-length vector.
struct StubEmbeddingClient {
    dimension: usize,
}

impl StubEmbeddingClient {
    fn encode(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; self.dimension];
        for (idx, byte) in text.bytes().enumerate() {
            embedding[idx % self.dimension] += f32::from(byte) / 255.0;
        }
        let norm = embedding.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }
        embedding
    }
}

#[async_trait]
impl EmbeddingClient for StubEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        Ok(texts.iter().map(|text| self.encode(text)).collect())
    }
}

/// Embedding stub that always fails, simulating a rejected credential.
struct FailingEmbeddingClient;

#[async_trait]
impl EmbeddingClient for FailingEmbeddingClient {
    async fn generate_embeddings(
        &self,
        _texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingServiceError> {
        Err(EmbeddingServiceError::MalformedResponse(
            "credential rejected".to_string(),
        ))
    }
}

/// Chat stub that records every request it receives.
struct RecordingChatClient {
    requests: Arc<Mutex<Vec<ChatRequest>>>,
    canned_answer: String,
}

#[async_trait]
impl ChatClient for RecordingChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<String, GenerationError> {
        self.requests
            .lock()
            .expect("request log poisoned")
            .push(request.clone());
        Ok(self.canned_answer.clone())
    }
}

fn test_config() -> Config {
    let mut config = Config::new("test-key");
    config.chunk_size = 120;
    config.chunk_overlap = 20;
    config.retrieval_top_k = 3;
    config
}

fn processor_with_stubs(requests: Arc<Mutex<Vec<ChatRequest>>>) -> DocumentProcessor {
    DocumentProcessor::with_clients(
        test_config(),
        Box::new(StubEmbeddingClient { dimension: 16 }),
        Box::new(RecordingChatClient {
            requests,
            canned_answer: "Total revenue was $10M.".to_string(),
        }),
    )
}

/// Write a minimal DOCX fixture with the given paragraphs.
fn write_docx(dir: &Path, name: &str, paragraphs: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).expect("create fixture");
    let mut archive = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();

    let mut body = String::new();
    for paragraph in paragraphs {
        body.push_str(&format!("<w:p><w:r><w:t>{paragraph}</w:t></w:r></w:p>"));
    }
    let xml = format!("<w:document><w:body>{body}</w:body></w:document>");

    archive
        .start_file("word/document.xml", options)
        .expect("start document part");
    archive.write_all(xml.as_bytes()).expect("write xml");
    archive.finish().expect("finish archive");
    path
}

#[tokio::test]
async fn processes_docx_and_answers_questions() {
    let dir = TempDir::new().expect("tempdir");
    let filler = "The company reported steady growth across all regions during the year. ";
    let report = format!(
        "Total revenue for the fiscal year was $10M, up 12% from the prior year. {}",
        filler.repeat(8)
    );
    let path = write_docx(dir.path(), "annual-report.docx", &[&report]);

    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut processor = processor_with_stubs(requests.clone());

    let index = processor
        .process_document(&path)
        .await
        .expect("pipeline should succeed");
    assert!(!index.is_empty());

    let answer = processor
        .answer(&index, "What was total revenue?", &[])
        .await
        .expect("answer should succeed");
    assert_eq!(answer.text, "Total revenue was $10M.");
    assert!(!answer.sources.is_empty());
    assert!(answer.sources.len() <= 3);

    let summary = processor.performance_summary();
    assert_eq!(summary.total_operations, 4);
    assert_eq!(summary.operations[&OperationKind::DocumentLoading].count, 1);
    assert_eq!(
        summary.operations[&OperationKind::DocumentSplitting].count,
        1
    );
    assert_eq!(summary.operations[&OperationKind::IndexCreation].count, 1);
    assert_eq!(summary.operations[&OperationKind::QueryProcessing].count, 1);
}

#[tokio::test]
async fn second_question_carries_exactly_one_prior_turn() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_docx(
        dir.path(),
        "report.docx",
        &["Total revenue was $10M this year, compared to $8.9M last year."],
    );

    let requests = Arc::new(Mutex::new(Vec::new()));
    let mut processor = processor_with_stubs(requests.clone());
    let index = processor.process_document(&path).await.expect("pipeline");

    let first_question = "What was total revenue?";
    let first = processor
        .answer(&index, first_question, &[])
        .await
        .expect("first answer");

    let history = vec![ChatTurn {
        question: first_question.to_string(),
        answer: first.text.clone(),
    }];
    processor
        .answer(&index, "How did it compare to last year?", &history)
        .await
        .expect("second answer");

    let seen = requests.lock().expect("request log poisoned");
    assert_eq!(seen.len(), 2);
    assert!(seen[0].history.is_empty());
    assert_eq!(seen[1].history.len(), 1);
    assert_eq!(seen[1].history[0].question, first_question);
    assert_eq!(seen[1].history[0].answer, first.text);
    assert_eq!(seen[1].question, "How did it compare to last year?");
}

#[tokio::test]
async fn unsupported_extension_fails_without_perf_entry() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("report.txt");
    std::fs::write(&path, "plain text").expect("write fixture");

    let mut processor = processor_with_stubs(Arc::new(Mutex::new(Vec::new())));
    let error = processor.load_document(&path).unwrap_err();
    assert!(matches!(error, ProcessingError::UnsupportedFormat(_)));
    assert!(processor.performance_log().is_empty());
}

#[tokio::test]
async fn embedding_failure_aborts_indexing_and_keeps_earlier_entries() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_docx(dir.path(), "report.docx", &["Some report body text."]);

    let mut processor = DocumentProcessor::with_clients(
        test_config(),
        Box::new(FailingEmbeddingClient),
        Box::new(RecordingChatClient {
            requests: Arc::new(Mutex::new(Vec::new())),
            canned_answer: String::new(),
        }),
    );

    let error = processor.process_document(&path).await.unwrap_err();
    assert!(matches!(error, ProcessingError::Embedding(_)));

    // Loading and splitting completed, so exactly those two entries remain.
    let kinds: Vec<OperationKind> = processor
        .performance_log()
        .entries()
        .iter()
        .map(|entry| entry.operation.kind())
        .collect();
    assert_eq!(
        kinds,
        vec![
            OperationKind::DocumentLoading,
            OperationKind::DocumentSplitting
        ]
    );
}

#[tokio::test]
async fn reprocessing_identical_input_yields_identical_chunk_count() {
    let dir = TempDir::new().expect("tempdir");
    let body = "Quarterly results exceeded expectations in every segment. ".repeat(12);
    let path = write_docx(dir.path(), "report.docx", &[&body]);

    let mut first = processor_with_stubs(Arc::new(Mutex::new(Vec::new())));
    let mut second = processor_with_stubs(Arc::new(Mutex::new(Vec::new())));

    let index_a = first.process_document(&path).await.expect("first run");
    let index_b = second.process_document(&path).await.expect("second run");
    assert_eq!(index_a.len(), index_b.len());
}
