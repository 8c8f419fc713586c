//! Document loading and chunking.
//!
//! [`DocumentLoader`] reads raw documents from a file or a flat directory
//! of files: plain text as one document per file, and PDFs (with the `pdf`
//! feature) as one document per page with page-number provenance.
//! [`TextChunker`] splits them into fixed-size chunks with exact character
//! overlap, which is the unit of retrieval.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::info;

use crate::document::{Chunk, Document};
use crate::error::{CragError, Result};

/// Loads raw documents from the filesystem.
#[derive(Debug, Clone, Default)]
pub struct DocumentLoader;

impl DocumentLoader {
    /// Create a new loader.
    pub fn new() -> Self {
        Self
    }

    /// Load documents from a file, or from every file in a flat directory
    /// (subdirectories are skipped). Directory entries are read in
    /// lexicographic order so repeated loads produce identical output.
    ///
    /// Plain-text files yield one document each. PDF files yield one
    /// document per page, each carrying a `page` metadata field; PDF
    /// support requires the `pdf` feature.
    ///
    /// # Errors
    ///
    /// Returns [`CragError::NotFound`] if the path does not exist, and
    /// [`CragError::Persist`] if a file cannot be read.
    pub fn load(&self, path: &Path) -> Result<Vec<Document>> {
        if !path.exists() {
            return Err(CragError::NotFound { path: path.to_path_buf() });
        }

        let documents = if path.is_dir() {
            let mut files: Vec<_> = fs::read_dir(path)
                .map_err(|e| persist_err(path, &e))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file())
                .collect();
            files.sort();

            let mut documents = Vec::with_capacity(files.len());
            for file in &files {
                documents.extend(read_documents(file)?);
            }
            documents
        } else {
            read_documents(path)?
        };

        info!(path = %path.display(), count = documents.len(), "loaded documents");
        Ok(documents)
    }
}

fn read_documents(path: &Path) -> Result<Vec<Document>> {
    if is_pdf(path) {
        return read_pdf(path);
    }

    let text = fs::read_to_string(path).map_err(|e| persist_err(path, &e))?;

    let mut metadata = HashMap::new();
    metadata.insert("source".to_string(), path.display().to_string());

    Ok(vec![Document {
        id: document_id(path),
        text,
        metadata,
        source_uri: Some(path.display().to_string()),
    }])
}

fn is_pdf(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn document_id(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(feature = "pdf")]
fn read_pdf(path: &Path) -> Result<Vec<Document>> {
    let pages = pdf_extract::extract_text_by_pages(path).map_err(|e| persist_err(path, &e))?;
    Ok(pages_to_documents(path, pages))
}

#[cfg(not(feature = "pdf"))]
fn read_pdf(path: &Path) -> Result<Vec<Document>> {
    Err(CragError::Persist {
        path: path.to_path_buf(),
        message: "PDF ingestion requires the `pdf` feature".to_string(),
    })
}

/// Map per-page text into one [`Document`] per page.
///
/// Page numbers are 1-based and recorded both in the document ID and in a
/// `page` metadata field, so chunks inherit their page provenance.
#[cfg_attr(not(feature = "pdf"), allow(dead_code))]
fn pages_to_documents(path: &Path, pages: Vec<String>) -> Vec<Document> {
    let stem = document_id(path);
    pages
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let page = i + 1;
            let mut metadata = HashMap::new();
            metadata.insert("source".to_string(), path.display().to_string());
            metadata.insert("page".to_string(), page.to_string());

            Document {
                id: format!("{stem}_p{page}"),
                text,
                metadata,
                source_uri: Some(path.display().to_string()),
            }
        })
        .collect()
}

fn persist_err(path: &Path, err: &dyn std::fmt::Display) -> CragError {
    CragError::Persist { path: path.to_path_buf(), message: err.to_string() }
}

/// Splits documents into fixed-size chunks by character count with exact overlap.
///
/// Consecutive chunks from the same document share exactly `chunk_overlap`
/// characters, except across document boundaries. Splitting operates on
/// character indices, not bytes, so multi-byte text never splits inside a
/// code point. Chunk IDs are generated as `{document_id}_{chunk_index}` and
/// each chunk inherits the parent document's metadata plus a `chunk_index`
/// field.
///
/// Splitting is deterministic for identical input and parameters.
#[derive(Debug, Clone)]
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Create a new `TextChunker`.
    ///
    /// Both parameters must be positive with `chunk_overlap < chunk_size`;
    /// [`PipelineConfig`](crate::PipelineConfig) validates this at build
    /// time and direct construction debug-asserts it.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of characters per chunk
    /// * `chunk_overlap` — number of overlapping characters between consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        debug_assert!(
            chunk_overlap > 0 && chunk_overlap < chunk_size,
            "chunk_overlap must be positive and less than chunk_size"
        );
        Self { chunk_size, chunk_overlap }
    }

    /// Split a sequence of documents into chunks, preserving document order.
    pub fn split(&self, documents: &[Document]) -> Vec<Chunk> {
        documents.iter().flat_map(|doc| self.split_document(doc)).collect()
    }

    /// Split a single document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text.
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        if document.text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = document.text.chars().collect();
        let mut chunks = Vec::new();
        let mut start = 0;
        let mut chunk_index = 0;

        while start < chars.len() {
            let end = (start + self.chunk_size).min(chars.len());
            let text: String = chars[start..end].iter().collect();

            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), chunk_index.to_string());

            chunks.push(Chunk {
                id: format!("{}_{chunk_index}", document.id),
                text,
                metadata,
                document_id: document.id.clone(),
            });

            chunk_index += 1;
            if end == chars.len() {
                break;
            }
            let step = self.chunk_size.saturating_sub(self.chunk_overlap);
            if step == 0 {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn doc(text: &str) -> Document {
        Document {
            id: "doc".to_string(),
            text: text.to_string(),
            metadata: HashMap::new(),
            source_uri: None,
        }
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = TextChunker::new(10, 2);
        assert!(chunker.split_document(&doc("")).is_empty());
    }

    #[test]
    fn short_document_yields_single_chunk() {
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.split_document(&doc("hello"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello");
        assert_eq!(chunks[0].id, "doc_0");
    }

    #[test]
    fn final_chunk_is_not_a_suffix_of_its_predecessor() {
        // 10 chars, size 8, overlap 4: the second chunk must end the document,
        // not leave a degenerate tail chunk behind.
        let chunker = TextChunker::new(8, 4);
        let chunks = chunker.split_document(&doc("0123456789"));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "01234567");
        assert_eq!(chunks[1].text, "456789");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "chunk_overlap")]
    fn zero_overlap_chunker_is_rejected() {
        let _ = TextChunker::new(10, 0);
    }

    #[test]
    fn pdf_pages_become_documents_with_page_provenance() {
        let pages = vec!["first page text".to_string(), "second page text".to_string()];
        let documents = pages_to_documents("books/stats.pdf".as_ref(), pages);

        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].id, "stats_p1");
        assert_eq!(documents[0].metadata.get("page"), Some(&"1".to_string()));
        assert_eq!(documents[1].id, "stats_p2");
        assert_eq!(documents[1].metadata.get("page"), Some(&"2".to_string()));
        assert_eq!(documents[1].text, "second page text");
        assert_eq!(documents[0].source_uri.as_deref(), Some("books/stats.pdf"));
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let chunker = TextChunker::new(4, 1);
        let chunks = chunker.split_document(&doc("αβγδεζηθ"));
        assert_eq!(chunks[0].text.chars().count(), 4);
        for window in chunks.windows(2) {
            let tail: String = window[0].text.chars().rev().take(1).collect();
            let head: String = window[1].text.chars().take(1).collect();
            assert_eq!(tail, head);
        }
    }
}
