//! Corpus snapshot files.
//!
//! Only the corpus is written. The index is always rebuilt from it, so a
//! snapshot can never be paired with a mismatched normalizer.

use crate::document::{Corpus, Document};
use crate::error::SnapshotError;
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use time::format_description::well_known::Rfc3339;
use walkdir::WalkDir;

#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotRecord {
    /// Hex SHA-1 of the document url.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub crawled_at: String,
    #[serde(flatten)]
    pub document: Document,
}

impl SnapshotRecord {
    pub fn new(document: Document, crawled_at: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(document.url.as_bytes());
        Self { id: format!("{:x}", hasher.finalize()), crawled_at: crawled_at.to_string(), document }
    }
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> SnapshotError + '_ {
    move |source| SnapshotError::Io { path: path.display().to_string(), source }
}

/// Write one JSON record per line, in corpus order.
pub fn write_jsonl(path: &Path, corpus: &Corpus) -> Result<(), SnapshotError> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(io_err(path))?;
    }
    let crawled_at = time::OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default();
    let mut out = BufWriter::new(File::create(path).map_err(io_err(path))?);
    for doc in corpus.iter() {
        let rec = SnapshotRecord::new(doc.clone(), &crawled_at);
        serde_json::to_writer(&mut out, &rec)
            .map_err(|source| SnapshotError::Json { path: path.display().to_string(), line: 0, source })?;
        out.write_all(b"\n").map_err(io_err(path))?;
    }
    out.flush().map_err(io_err(path))?;
    tracing::info!(path = %path.display(), docs = corpus.len(), "wrote corpus snapshot");
    Ok(())
}

/// Read a `.jsonl` or `.json` file, or every such file under a directory (sorted by path).
pub fn read_corpus(input: &Path) -> Result<Corpus, SnapshotError> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() && matches!(p.extension().and_then(|s| s.to_str()), Some("json" | "jsonl")) {
                files.push(p.to_path_buf());
            }
        }
    } else {
        files.push(input.to_path_buf());
    }

    let mut documents = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut documents)?;
        } else {
            read_json(&file, &mut documents)?;
        }
    }
    tracing::info!(input = %input.display(), docs = documents.len(), "loaded corpus snapshot");
    Ok(Corpus::new(documents))
}

fn read_jsonl(file: &Path, documents: &mut Vec<Document>) -> Result<(), SnapshotError> {
    let reader = BufReader::new(File::open(file).map_err(io_err(file))?);
    for (n, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err(file))?;
        if line.trim().is_empty() { continue; }
        let rec: SnapshotRecord = serde_json::from_str(&line)
            .map_err(|source| SnapshotError::Json { path: file.display().to_string(), line: n + 1, source })?;
        documents.push(rec.document);
    }
    Ok(())
}

fn read_json(file: &Path, documents: &mut Vec<Document>) -> Result<(), SnapshotError> {
    let reader = BufReader::new(File::open(file).map_err(io_err(file))?);
    let json_err = |source| SnapshotError::Json { path: file.display().to_string(), line: 0, source };
    let json: serde_json::Value = serde_json::from_reader(reader).map_err(json_err)?;
    // A single object is one document; anything else must be an array of them.
    if json.is_object() {
        documents.push(serde_json::from_value(json).map_err(json_err)?);
    } else {
        documents.extend(serde_json::from_value::<Vec<Document>>(json).map_err(json_err)?);
    }
    Ok(())
}
