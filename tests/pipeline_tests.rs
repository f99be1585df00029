//! Library-level pipeline tests against on-disk artifacts.

use std::collections::HashSet;

use dealmatch::fixtures;
use dealmatch::pipeline::{ModelBundle, PipelineError, QueryOutcome};
use dealmatch::scoring::{MockScorer, Reranker};
use dealmatch::{CatalogError, MissingCriterion};

#[test]
fn test_initialize_then_query() {
    let dir = tempfile::tempdir().unwrap();
    let sources = fixtures::write_artifacts(dir.path()).unwrap();
    let bundle = ModelBundle::initialize(&sources).unwrap();

    for query in [
        "3 bed in AZ under 350k",
        "4 bed in texas max $400,000",
        "2 bed tampa fl <= 150k",
    ] {
        let hits = bundle.retrieve(query, 3).unwrap();
        assert_eq!(hits.len(), 3);
        assert!(hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));

        let retrieved: HashSet<usize> = hits.iter().map(|h| h.index).collect();
        let reranked = bundle.rerank(query, 3, 2).unwrap();
        assert_eq!(reranked.len(), 2);
        assert!(reranked.iter().all(|c| retrieved.contains(&c.index)));
    }
}

#[test]
fn test_state_query_retrieves_matching_deal_first() {
    let dir = tempfile::tempdir().unwrap();
    let sources = fixtures::write_artifacts(dir.path()).unwrap();
    let bundle = ModelBundle::initialize(&sources).unwrap();

    let hits = bundle.retrieve("duplex in texas, 4 bed under 400k tx", 3).unwrap();
    assert_eq!(hits[0].index, fixtures::DALLAS);
}

#[test]
fn test_end_to_end_three_deal_catalog() {
    let bundle = ModelBundle::from_parts(
        fixtures::sample_catalog(),
        fixtures::sample_retriever(),
        Reranker::new(
            MockScorer::keyed_on(fixtures::rerank_id("dallas")),
            fixtures::rerank_vocab(),
        )
        .unwrap(),
    )
    .unwrap();

    let QueryOutcome::Ranked { deals } = bundle.handle_query("3 bed in AZ under 350k", 3, 2).unwrap()
    else {
        panic!("expected ranked deals");
    };

    assert_eq!(deals.len(), 2);
    assert_eq!(deals[0].deal.city, "Dallas");
    assert_eq!(deals[1].deal.city, "Phoenix");
    assert!(deals[0].rerank_score > deals[1].rerank_score);
    assert!(deals[0].retrieval_sim.abs() < 1e-5);
    assert!((deals[1].retrieval_sim - 1.0).abs() < 1e-5);
}

#[test]
fn test_clarification_skips_retrieval() {
    let scorer = MockScorer::constant([0.0, 0.0, 0.0, 1.0]);
    let bundle = ModelBundle::from_parts(
        fixtures::sample_catalog(),
        fixtures::sample_retriever(),
        Reranker::new(scorer.clone(), fixtures::rerank_vocab()).unwrap(),
    )
    .unwrap();

    let outcome = bundle.handle_query("something in florida", 50, 5).unwrap();
    assert_eq!(
        outcome,
        QueryOutcome::Clarification {
            missing: vec![MissingCriterion::Bedrooms, MissingCriterion::MaxPrice],
        }
    );
    assert!(scorer.batches().is_empty());
}

#[test]
fn test_malformed_catalog_aborts_load() {
    let dir = tempfile::tempdir().unwrap();
    let sources = fixtures::write_artifacts(dir.path()).unwrap();
    std::fs::write(
        &sources.catalog,
        "property_id,deal_type\n1,Wholesale\n",
    )
    .unwrap();

    let err = ModelBundle::initialize(&sources).unwrap_err();
    assert!(matches!(err, PipelineError::Catalog(CatalogError::Csv(_))));
}
