// tests/integration/concurrency.rs
//! Concurrency ceiling, cancellation and consumer disconnects.

use super::common::*;
use notion_source::*;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn page_request(max_concurrent: usize) -> ReadRequest {
    ReadRequest::new([ObjectKind::Page]).with_tuning(ReadTuning {
        page_size: Some(4),
        max_concurrent: Some(max_concurrent),
        max_depth: None,
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn enrichments_never_exceed_the_ceiling() {
    let repo = Arc::new(
        MockRepository::new()
            .with_pages(pages(1..13), 4)
            .with_detail_delay(Duration::from_millis(20)),
    );
    let source = NotionSource::new(repo.clone(), SourceConfig::default());

    let items = drain(source.read(CancellationToken::new(), page_request(3)).unwrap()).await;

    assert_eq!(items.len(), 12);
    assert_eq!(repo.detail_calls(), 12);
    assert!(repo.peak_in_flight() <= 3, "peak was {}", repo.peak_in_flight());
    assert!(repo.peak_in_flight() > 1, "enrichments never overlapped");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn a_ceiling_of_one_serializes_enrichments() {
    let repo = Arc::new(
        MockRepository::new()
            .with_pages(pages(1..7), 3)
            .with_detail_delay(Duration::from_millis(5)),
    );
    let source = NotionSource::new(repo.clone(), SourceConfig::default());

    let items = drain(source.read(CancellationToken::new(), page_request(1)).unwrap()).await;

    assert_eq!(items.len(), 6);
    assert_eq!(repo.peak_in_flight(), 1);
}

#[tokio::test]
async fn cancellation_stops_new_work_and_closes_the_channel() {
    let repo = Arc::new(
        MockRepository::new()
            .with_pages(pages(1..21), 4)
            .with_detail_delay(Duration::from_millis(50)),
    );
    let source = NotionSource::new(repo.clone(), SourceConfig::default());
    let cancel = CancellationToken::new();

    let mut items = source.read(cancel.clone(), page_request(2)).unwrap();
    let first = tokio::time::timeout(Duration::from_secs(5), items.recv())
        .await
        .expect("no item before the timeout");
    assert!(first.is_some());

    cancel.cancel();
    let calls_at_cancel = repo.detail_calls();

    let rest = drain(items).await;
    assert!(rest.len() < 19);
    assert_eq!(repo.detail_calls(), calls_at_cancel);
    assert!(calls_at_cancel < 20);
    assert!(source.metrics().end_time.is_some());
}

#[tokio::test]
async fn cancelling_before_the_first_poll_reads_nothing() {
    let repo = Arc::new(MockRepository::new().with_pages(pages(1..5), 4));
    let source = NotionSource::new(repo.clone(), SourceConfig::default());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let items = drain(source.read(cancel, page_request(2)).unwrap()).await;

    assert!(items.is_empty());
    assert_eq!(repo.detail_calls(), 0);
    assert_eq!(source.metrics().objects_read, 0);
}

#[tokio::test]
async fn dropping_the_receiver_stops_the_read() {
    let repo = Arc::new(
        MockRepository::new()
            .with_pages(pages(1..41), 10)
            .with_detail_delay(Duration::from_millis(10)),
    );
    let source = NotionSource::new(repo.clone(), SourceConfig::default());
    let cancel = CancellationToken::new();

    let mut items = source.read(cancel.clone(), page_request(2)).unwrap();
    assert!(items.recv().await.is_some());
    drop(items);

    tokio::time::timeout(Duration::from_secs(5), async {
        while source.metrics().end_time.is_none() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("read kept running after the receiver was dropped");

    assert!(repo.detail_calls() < 40);
    assert!(source.metrics().objects_read < 40);
    // the caller's token is not cancelled by a disconnect
    assert!(!cancel.is_cancelled());
}
