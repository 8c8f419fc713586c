//! Chunking determinism and overlap properties, plus document loading.

use std::collections::HashMap;
use std::fs;

use crag::{CragError, Document, DocumentLoader, TextChunker};
use proptest::prelude::*;

fn doc(text: &str) -> Document {
    Document {
        id: "doc".to_string(),
        text: text.to_string(),
        metadata: HashMap::new(),
        source_uri: None,
    }
}

/// Generate (chunk_size, chunk_overlap) pairs with 0 < overlap < size.
fn arb_chunk_params() -> impl Strategy<Value = (usize, usize)> {
    (2usize..60).prop_flat_map(|size| (Just(size), 1..size))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// For fixed parameters and identical input, `split` produces the same
    /// ordered chunk sequence on every call.
    #[test]
    fn chunking_is_deterministic(
        text in "[a-zδλπ ]{0,200}",
        (size, overlap) in arb_chunk_params(),
    ) {
        let chunker = TextChunker::new(size, overlap);
        let first = chunker.split_document(&doc(&text));
        let second = chunker.split_document(&doc(&text));
        prop_assert_eq!(first, second);
    }

    /// The last `chunk_overlap` characters of every non-final chunk equal the
    /// first `chunk_overlap` characters of the chunk that follows it.
    #[test]
    fn consecutive_chunks_share_exactly_the_overlap(
        text in "[a-zδλπ ]{1,200}",
        (size, overlap) in arb_chunk_params(),
    ) {
        let chunker = TextChunker::new(size, overlap);
        let chunks = chunker.split_document(&doc(&text));

        for window in chunks.windows(2) {
            let prev: Vec<char> = window[0].text.chars().collect();
            let next: Vec<char> = window[1].text.chars().collect();
            prop_assert!(prev.len() >= overlap);
            prop_assert!(next.len() >= overlap);
            prop_assert_eq!(&prev[prev.len() - overlap..], &next[..overlap]);
        }
    }

    /// Dropping each chunk's leading overlap reassembles the original text,
    /// so chunks cover the document without gaps or duplication.
    #[test]
    fn chunks_reassemble_the_document(
        text in "[a-zδλπ ]{1,200}",
        (size, overlap) in arb_chunk_params(),
    ) {
        let chunker = TextChunker::new(size, overlap);
        let chunks = chunker.split_document(&doc(&text));

        let mut reassembled = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                reassembled.push_str(&chunk.text);
            } else {
                reassembled.extend(chunk.text.chars().skip(overlap));
            }
        }
        prop_assert_eq!(reassembled, text);
    }

    /// Every chunk is at most `chunk_size` characters and carries its
    /// provenance back-reference.
    #[test]
    fn chunks_respect_size_and_provenance(
        text in "[a-z ]{1,200}",
        (size, overlap) in arb_chunk_params(),
    ) {
        let chunker = TextChunker::new(size, overlap);
        let chunks = chunker.split_document(&doc(&text));

        prop_assert!(!chunks.is_empty());
        for (i, chunk) in chunks.iter().enumerate() {
            prop_assert!(chunk.text.chars().count() <= size);
            prop_assert_eq!(&chunk.document_id, "doc");
            prop_assert_eq!(chunk.metadata.get("chunk_index"), Some(&i.to_string()));
        }
    }
}

#[test]
fn loader_reads_a_single_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    fs::write(&path, "variance measures spread").unwrap();

    let documents = DocumentLoader::new().load(&path).unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, "notes");
    assert_eq!(documents[0].text, "variance measures spread");
}

#[test]
fn loader_reads_a_directory_in_lexicographic_order() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.txt"), "second").unwrap();
    fs::write(dir.path().join("a.txt"), "first").unwrap();

    let documents = DocumentLoader::new().load(dir.path()).unwrap();
    assert_eq!(documents.len(), 2);
    assert_eq!(documents[0].text, "first");
    assert_eq!(documents[1].text, "second");
}

#[test]
fn loader_fails_with_not_found_on_missing_path() {
    let result = DocumentLoader::new().load("does/not/exist.txt".as_ref());
    assert!(matches!(result, Err(CragError::NotFound { .. })));
}

#[test]
#[cfg(not(feature = "pdf"))]
fn loader_reports_pdf_files_as_unsupported_without_the_feature() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.pdf");
    fs::write(&path, b"%PDF-1.4").unwrap();

    let result = DocumentLoader::new().load(&path);
    match result {
        Err(CragError::Persist { message, .. }) => assert!(message.contains("pdf")),
        other => panic!("expected a persist error, got {other:?}"),
    }
}
