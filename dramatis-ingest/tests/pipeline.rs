//! Pipeline tests against the deterministic mock source.
//!
//! These live as integration tests (not a `#[cfg(test)]` module inside
//! the crate) because `mock-source` depends on `dramatis-ingest`: a
//! unit-test build would compile a second copy of the crate and its
//! trait impls would not unify with the one `mock-source` links.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use dramatis_ingest::{MemorySink, Pipeline};
use dramatis_shared::{CastTier, EpisodeKey};
use mock_source::MockSource;

fn pipeline_with(source: MockSource) -> (Pipeline, Arc<MemorySink>) {
    let source = Arc::new(source);
    let sink = Arc::new(MemorySink::new());
    let pipeline = Pipeline::new(source.clone(), source, sink.clone());
    (pipeline, sink)
}

#[tokio::test]
async fn test_full_run_matches_corpus() {
    let (pipeline, sink) = pipeline_with(MockSource::new());
    let report = pipeline.run().await.unwrap();

    assert!(!report.interrupted);
    assert_eq!(report.discover.attempted, 26);
    assert_eq!(report.discover.failed, 0);
    assert_eq!(report.cast.succeeded, mock_source::CAST_COUNT);
    assert_eq!(report.seasons.succeeded, 1);
    assert_eq!(report.scripts.succeeded, mock_source::EPISODE_COUNT);
    assert_eq!(report.scripts.failed, 0);
    assert_eq!(report.resolve.succeeded, mock_source::EPISODE_COUNT);

    assert_eq!(report.resolution.mentions, mock_source::MENTION_COUNT);
    assert_eq!(report.resolution.resolved, mock_source::RESOLVED_COUNT);
    assert_eq!(report.resolution.unmatched, mock_source::UNMATCHED_COUNT);

    assert_eq!(sink.cast().await.len(), mock_source::CAST_COUNT);
    assert_eq!(sink.episodes().await.len(), mock_source::EPISODE_COUNT);
    assert_eq!(sink.seasons().await.len(), 2);
}

#[tokio::test]
async fn test_popularity_ranking_is_deterministic() {
    let (pipeline, sink) = pipeline_with(MockSource::new());
    pipeline.run().await.unwrap();

    let cast = sink.cast().await;
    // Sorted by rank; the most cross-referenced page ranks first.
    assert_eq!(cast[0].rank, 1);
    assert_eq!(cast[0].member.path, mock_source::JERRY);
    assert_eq!(cast[1].member.path, mock_source::GEORGE);

    // Ties in share break by path ascending.
    let frank = cast
        .iter()
        .find(|r| r.member.path == mock_source::FRANK)
        .unwrap();
    let newman = cast
        .iter()
        .find(|r| r.member.path == mock_source::NEWMAN)
        .unwrap();
    assert!(frank.rank < newman.rank);
}

#[tokio::test]
async fn test_rosters_and_lines_are_keyed_naturally() {
    let (pipeline, sink) = pipeline_with(MockSource::new());
    pipeline.run().await.unwrap();

    let episodes = sink.episodes().await;
    let stake_out = episodes
        .iter()
        .find(|e| e.key == EpisodeKey::new(1, 1))
        .unwrap();
    assert_eq!(stake_out.title, "The Stake Out");
    assert_eq!(stake_out.cast.len(), 4);

    let lines = sink.lines().await;
    // A joined credit yields one resolved line per member.
    let joint: Vec<_> = lines
        .iter()
        .filter(|l| l.key.season == 1 && l.key.episode == 1 && l.key.line == 3)
        .collect();
    assert_eq!(joint.len(), 2);
}

#[tokio::test]
async fn test_derived_tiers() {
    let (pipeline, _sink) = pipeline_with(MockSource::new());
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.tiers[mock_source::JERRY], CastTier::Main);
    assert_eq!(report.tiers[mock_source::GEORGE], CastTier::Main);
    assert_eq!(report.tiers[mock_source::ELAINE], CastTier::Side);
    assert_eq!(report.tiers[mock_source::JACKIE], CastTier::Guest);
}

#[tokio::test]
async fn test_poisoned_episode_is_isolated() {
    let (pipeline, sink) =
        pipeline_with(MockSource::new().with_failing_script("The Robbery"));
    let report = pipeline.run().await.unwrap();

    assert_eq!(report.scripts.attempted, mock_source::EPISODE_COUNT);
    assert_eq!(report.scripts.succeeded, mock_source::EPISODE_COUNT - 1);
    assert_eq!(report.scripts.failed, 1);
    assert_eq!(report.scripts.failures[0].key, "s01e02");

    // Siblings are unaffected; the failed episode is absent with an
    // explicit marker rather than silently dropped.
    assert_eq!(sink.episodes().await.len(), mock_source::EPISODE_COUNT - 1);
    assert!(sink
        .episodes()
        .await
        .iter()
        .all(|e| e.key != EpisodeKey::new(1, 2)));
}

#[tokio::test]
async fn test_shutdown_skips_later_stages() {
    let (pipeline, sink) = pipeline_with(MockSource::new());
    pipeline.shutdown();

    let report = pipeline.run().await.unwrap();
    assert!(report.interrupted);
    // The first stage still ran to completion.
    assert_eq!(report.discover.attempted, 26);
    assert_eq!(report.rank.attempted, 0);
    assert!(sink.episodes().await.is_empty());
}

#[tokio::test]
async fn test_progress_ticks_for_every_work_item() {
    use std::sync::atomic::AtomicUsize;

    let source = Arc::new(MockSource::new());
    let sink = Arc::new(MemorySink::new());
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = ticks.clone();

    let pipeline = Pipeline::new(source.clone(), source, sink)
        .with_progress(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
    pipeline.run().await.unwrap();

    // 26 letters + per-path ranking + per-path cast + 1 season
    // listing + per-episode scripts.
    let expected =
        26 + 2 * mock_source::CAST_COUNT + 1 + mock_source::EPISODE_COUNT;
    assert_eq!(ticks.load(Ordering::SeqCst), expected);
}
