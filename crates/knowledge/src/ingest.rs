//! Directory ingestion: load, split, embed, index.

use crate::config::KnowledgeConfig;
use crate::index::{Document, KnowledgeBase};
use crate::splitter::TextSplitter;
use researchbot_common::{ResearchError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of indexing a directory.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub files_indexed: usize,
    pub files_skipped: usize,
    pub chunks_indexed: usize,
}

/// Index every file in `directory` whose name ends with one of
/// `extensions`. Unreadable files are logged and skipped; a missing
/// directory yields an empty report.
pub async fn index_directory(
    knowledge: &KnowledgeBase,
    directory: &Path,
    extensions: &[String],
    config: &KnowledgeConfig,
) -> Result<IngestReport> {
    if extensions.is_empty() {
        return Err(ResearchError::Ingestion(
            "at least one file extension is required".into(),
        ));
    }

    let mut report = IngestReport::default();

    let files = match matching_files(directory, extensions).await {
        Ok(files) => files,
        Err(e) => {
            warn!(directory = %directory.display(), error = %e, "Cannot read documents directory");
            return Ok(report);
        }
    };

    let splitter = TextSplitter::new(config.chunk_size, config.chunk_overlap);
    let mut documents = Vec::new();

    for path in files {
        match tokio::fs::read_to_string(&path).await {
            Ok(text) => {
                let source = path.display().to_string();
                let chunks = splitter.split(&text);
                for (i, chunk) in chunks.into_iter().enumerate() {
                    let mut doc = Document::new(chunk, source.clone());
                    doc.metadata.insert("chunk".to_string(), i.to_string());
                    documents.push(doc);
                }
                report.files_indexed += 1;
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Error loading document, skipping");
                report.files_skipped += 1;
            }
        }
    }

    if documents.is_empty() {
        info!(directory = %directory.display(), "No documents found");
        return Ok(report);
    }

    report.chunks_indexed = knowledge.add_documents(documents).await?;
    info!(
        directory = %directory.display(),
        files = report.files_indexed,
        skipped = report.files_skipped,
        chunks = report.chunks_indexed,
        "Indexed directory"
    );
    Ok(report)
}

async fn matching_files(directory: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(directory).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_file = entry
            .file_type()
            .await
            .map(|t| t.is_file())
            .unwrap_or(false);
        let name = entry.file_name().to_string_lossy().to_string();
        if is_file && extensions.iter().any(|ext| name.ends_with(ext.as_str())) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}
