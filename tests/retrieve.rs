//! Integration tests for the query path.
//! Tests: absent-index handling, configured k, ranking, score order.

mod common;

use common::{StubEmbedder, sample_text, test_config, write_file};
use corpus_core::{
    Corpus, CorpusError, EmbeddingIdentity, Fragment, FragmentMetadata, Ingestor, Retriever,
};
use tempfile::TempDir;

#[test]
fn opening_without_an_index_is_no_index_available() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let provider = StubEmbedder::new(common::DIM);

    let err = Retriever::open(&config, &provider).unwrap_err();
    match err {
        CorpusError::NoIndexAvailable { path } => assert_eq!(path, config.store_dir),
        other => panic!("expected NoIndexAvailable, got {other:?}"),
    }
}

#[test]
fn empty_index_returns_zero_results_not_an_error() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let provider = StubEmbedder::new(common::DIM);

    // a store can exist with nothing in it; that is not the absent state
    let identity = EmbeddingIdentity::new("stub-embedder", common::DIM as u32);
    Corpus::new(identity).persist(&config.store_dir).unwrap();

    let retriever = Retriever::open(&config, &provider).unwrap();
    let hits = retriever.retrieve("anything at all").unwrap();
    assert!(hits.is_empty());
}

#[test]
fn retrieve_honors_the_configured_k() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let provider = StubEmbedder::new(common::DIM);
    let file = write_file(dir.path(), "notes.txt", &sample_text("harvest"));

    let mut ingestor = Ingestor::open(&config, &provider).unwrap();
    let report = ingestor.ingest_path(&file).unwrap();
    assert!(report.added > 3);

    let retriever = Retriever::open(&config, &provider).unwrap();
    assert_eq!(retriever.k(), config.retrieve_k);
    let hits = retriever.retrieve("what is this note about?").unwrap();
    assert_eq!(hits.len(), config.retrieve_k);
}

#[test]
fn small_index_returns_everything_it_has() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir).with_retrieve_k(10);
    let provider = StubEmbedder::new(common::DIM);

    let mut ingestor = Ingestor::open(&config, &provider).unwrap();
    ingestor
        .ingest_batch(vec![
            Fragment::new("only one", FragmentMetadata::new("/docs/a.txt")),
            Fragment::new("and another", FragmentMetadata::new("/docs/b.txt")),
        ])
        .unwrap();

    let retriever = Retriever::open(&config, &provider).unwrap();
    let hits = retriever.retrieve("anything").unwrap();
    assert_eq!(hits.len(), 2);
}

#[test]
fn exact_text_query_ranks_its_fragment_first() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let provider = StubEmbedder::new(common::DIM);

    let mut ingestor = Ingestor::open(&config, &provider).unwrap();
    ingestor
        .ingest_batch(vec![
            Fragment::new(
                "the mitochondria is the powerhouse of the cell",
                FragmentMetadata::new("/docs/bio.txt"),
            ),
            Fragment::new(
                "rust ownership prevents data races at compile time",
                FragmentMetadata::new("/docs/rust.txt"),
            ),
            Fragment::new(
                "sourdough needs a lively starter and patience",
                FragmentMetadata::new("/docs/bread.txt"),
            ),
        ])
        .unwrap();

    let retriever = Retriever::open(&config, &provider).unwrap();
    let hits = retriever
        .retrieve_scored("rust ownership prevents data races at compile time")
        .unwrap();
    assert_eq!(
        hits[0].fragment.text,
        "rust ownership prevents data races at compile time"
    );
    // identical text embeds identically; unit vectors dot to 1
    assert!((hits[0].score - 1.0).abs() < 1e-5);
}

#[test]
fn scores_come_back_descending() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let provider = StubEmbedder::new(common::DIM);
    let file = write_file(dir.path(), "notes.txt", &sample_text("orchards"));

    Ingestor::open(&config, &provider)
        .unwrap()
        .ingest_path(&file)
        .unwrap();

    let retriever = Retriever::open(&config, &provider).unwrap();
    let hits = retriever.retrieve_scored("orchards").unwrap();
    assert!(!hits.is_empty());
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn retrieved_fragments_carry_their_source_metadata() {
    let dir = TempDir::new().unwrap();
    let config = test_config(&dir);
    let provider = StubEmbedder::new(common::DIM);
    let file = write_file(dir.path(), "notes.txt", &sample_text("metadata"));

    Ingestor::open(&config, &provider)
        .unwrap()
        .ingest_path(&file)
        .unwrap();

    let retriever = Retriever::open(&config, &provider).unwrap();
    let hits = retriever.retrieve("metadata").unwrap();
    for fragment in &hits {
        assert_eq!(
            fragment.metadata.source.file_name().unwrap(),
            "notes.txt"
        );
        assert!(fragment.metadata.source.is_absolute());
    }
}
