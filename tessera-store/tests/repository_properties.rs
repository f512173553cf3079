//! Write-path guarantees of the in-memory repository.
//!
//! Covers optimistic concurrency, duplicate detection across every scope,
//! linking, corrections, and stream deletion.

use anyhow::Result;
use chrono::Duration;
use tessera_domain::{ExpectedVersion, Record, Specification, Stream};
use tessera_store::{EventRepository, InMemoryRepository, StoreError};
use tessera_testkit::{init_tracing, record, record_with, seed_stream, stream};

async fn snapshot(repo: &InMemoryRepository, stream: &Stream) -> Result<(Vec<Record>, Vec<Record>)> {
    let global = repo.read(&Specification::global()).await?.into_records()?;
    let stream = repo.read(&Specification::new(stream.clone())).await?.into_records()?;
    Ok((global, stream))
}

#[tokio::test]
async fn test_append_then_read_last_returns_same_record() -> Result<()> {
    init_tracing();
    let repo = InMemoryRepository::new();
    let orders = stream("Order$1");
    let placed = record_with("OrderPlaced", serde_json::json!({ "sku": "A-1", "qty": 2 }))
        .with_metadata(&b"{\"correlation_id\":\"c-1\"}"[..]);

    repo.append_to_stream(vec![placed.clone()], &orders, ExpectedVersion::None).await?;

    let last = repo
        .read(&Specification::new(orders).read_last())
        .await?
        .into_record()?
        .expect("stream has a record");
    assert_eq!(last.event_id, placed.event_id);
    assert_eq!(last.event_type, placed.event_type);
    assert_eq!(last.data, placed.data);
    assert_eq!(last.metadata, placed.metadata);
    Ok(())
}

#[tokio::test]
async fn test_version_conflict_leaves_state_unchanged() -> Result<()> {
    let repo = InMemoryRepository::new();
    let orders = stream("Order$1");
    seed_stream(&repo, &orders, &["A", "B", "C"]).await?;
    let before = snapshot(&repo, &orders).await?;

    for expected in [ExpectedVersion::None, ExpectedVersion::Exact(0), ExpectedVersion::Exact(5)] {
        let result = repo.append_to_stream(vec![record("D"), record("E")], &orders, expected).await;
        match result {
            Err(StoreError::WrongExpectedEventVersion { actual, .. }) => assert_eq!(actual, 2),
            other => panic!("expected version conflict, got {:?}", other),
        }
    }

    assert_eq!(snapshot(&repo, &orders).await?, before);
    Ok(())
}

#[tokio::test]
async fn test_link_version_conflict() -> Result<()> {
    let repo = InMemoryRepository::new();
    let seeded = seed_stream(&repo, &stream("Order$1"), &["A"]).await?;
    let customer = stream("Customer$9");
    seed_stream(&repo, &customer, &["Registered"]).await?;

    let result = repo
        .link_to_stream(vec![seeded[0].event_id], &customer, ExpectedVersion::None)
        .await;
    assert!(result.unwrap_err().is_conflict());
    assert_eq!(repo.streams_of(seeded[0].event_id).await?, vec![stream("Order$1")]);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_in_same_batch() -> Result<()> {
    let repo = InMemoryRepository::new();
    let first = record("A");
    let again = record("B").with_event_id(first.event_id);

    let result = repo
        .append_to_stream(vec![first.clone(), again], &stream("Order$1"), ExpectedVersion::None)
        .await;

    assert!(result.unwrap_err().is_duplicate());
    assert!(!repo.has_event(first.event_id).await?);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_in_same_stream_across_calls() -> Result<()> {
    let repo = InMemoryRepository::new();
    let orders = stream("Order$1");
    let placed = record("OrderPlaced");
    repo.append_to_stream(vec![placed.clone()], &orders, ExpectedVersion::None).await?;

    let fresh = record("Fresh");
    let result = repo
        .append_to_stream(vec![fresh.clone(), placed], &orders, ExpectedVersion::Exact(0))
        .await;

    assert!(result.unwrap_err().is_duplicate());
    assert!(!repo.has_event(fresh.event_id).await?);
    assert_eq!(repo.count(&Specification::new(orders)).await?, 1);
    Ok(())
}

#[tokio::test]
async fn test_duplicate_across_streams_via_global_log() -> Result<()> {
    let repo = InMemoryRepository::new();
    let placed = record("OrderPlaced");
    repo.append_to_stream(vec![placed.clone()], &stream("Order$1"), ExpectedVersion::None)
        .await?;

    let copy = record("OrderPlaced").with_event_id(placed.event_id);
    let result = repo
        .append_to_stream(vec![copy], &stream("Order$2"), ExpectedVersion::None)
        .await;

    match result {
        Err(StoreError::EventDuplicatedInStream { event_id, stream }) => {
            assert_eq!(event_id, placed.event_id);
            assert_eq!(stream, "Order$2");
        },
        other => panic!("expected duplicate, got {:?}", other),
    }
    assert_eq!(repo.count(&Specification::new(stream("Order$2"))).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_streams_of_reports_appends_and_links() -> Result<()> {
    let repo = InMemoryRepository::new();
    let seeded = seed_stream(&repo, &stream("Order$1"), &["OrderPlaced", "OrderPaid"]).await?;
    let paid = seeded[1].event_id;

    repo.link_to_stream(vec![paid], &stream("Payments"), ExpectedVersion::Any).await?;
    repo.link_to_stream(vec![paid], &stream("Customer$9"), ExpectedVersion::Auto).await?;

    assert_eq!(
        repo.streams_of(paid).await?,
        vec![stream("Customer$9"), stream("Order$1"), stream("Payments")]
    );
    assert_eq!(repo.streams_of(seeded[0].event_id).await?, vec![stream("Order$1")]);
    assert!(repo.streams_of(uuid::Uuid::now_v7()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_linked_records_share_global_entry() -> Result<()> {
    let repo = InMemoryRepository::new();
    let seeded = seed_stream(&repo, &stream("Order$1"), &["A", "B"]).await?;

    repo.link_to_stream(
        seeded.iter().map(|r| r.event_id).collect(),
        &stream("Audit"),
        ExpectedVersion::None,
    )
    .await?;

    assert_eq!(repo.count(&Specification::global()).await?, 2);
    let linked = repo.read(&Specification::new(stream("Audit"))).await?.into_records()?;
    assert_eq!(linked, seeded);
    Ok(())
}

#[tokio::test]
async fn test_link_batch_with_unknown_id_links_nothing() -> Result<()> {
    let repo = InMemoryRepository::new();
    let seeded = seed_stream(&repo, &stream("Order$1"), &["A"]).await?;
    let missing = uuid::Uuid::now_v7();

    let result = repo
        .link_to_stream(vec![seeded[0].event_id, missing], &stream("Audit"), ExpectedVersion::Any)
        .await;

    assert!(matches!(result, Err(StoreError::EventNotFound(id)) if id == missing));
    assert_eq!(repo.count(&Specification::new(stream("Audit"))).await?, 0);
    Ok(())
}

#[tokio::test]
async fn test_update_preserves_timestamp_everywhere() -> Result<()> {
    let repo = InMemoryRepository::new();
    let orders = stream("Order$1");
    let seeded = seed_stream(&repo, &orders, &["OrderPlaced", "OrderPaid"]).await?;
    let paid = &seeded[1];
    repo.link_to_stream(vec![paid.event_id], &stream("Payments"), ExpectedVersion::Any).await?;

    let corrected = record_with("OrderPaidCorrected", serde_json::json!({ "amount": 100 }))
        .with_event_id(paid.event_id)
        .with_metadata(&b"{\"reason\":\"typo\"}"[..])
        .with_valid_at(paid.valid_at - Duration::hours(6));
    repo.update_messages(vec![corrected.clone()]).await?;

    let global = repo.read(&Specification::global().with_ids([paid.event_id])).await?.into_records()?;
    let in_orders = repo.read(&Specification::new(orders).read_last()).await?.into_record()?;
    let in_payments = repo.read(&Specification::new(stream("Payments")).read_first()).await?.into_record()?;

    for stored in global.into_iter().chain(in_orders).chain(in_payments) {
        assert_eq!(stored.event_type, corrected.event_type);
        assert_eq!(stored.data, corrected.data);
        assert_eq!(stored.metadata, corrected.metadata);
        assert_eq!(stored.valid_at, corrected.valid_at);
        assert_eq!(stored.timestamp, paid.timestamp);
    }

    // Untouched neighbour
    let first = repo.read(&Specification::global().read_first()).await?.into_record()?;
    assert_eq!(first, Some(seeded[0].clone()));
    Ok(())
}

#[tokio::test]
async fn test_delete_stream_only_drops_index_entry() -> Result<()> {
    let repo = InMemoryRepository::new();
    let orders = stream("Order$1");
    let seeded = seed_stream(&repo, &orders, &["A", "B"]).await?;
    repo.link_to_stream(vec![seeded[0].event_id], &stream("Audit"), ExpectedVersion::Any).await?;

    repo.delete_stream(&orders).await?;

    assert!(repo.last_stream_event(&orders).await?.is_none());
    assert_eq!(repo.count(&Specification::global()).await?, 2);
    assert!(repo.has_event(seeded[1].event_id).await?);
    assert_eq!(repo.streams_of(seeded[0].event_id).await?, vec![stream("Audit")]);
    assert!(repo.streams_of(seeded[1].event_id).await?.is_empty());

    // Ids stay reserved in the global log
    let result = repo
        .append_to_stream(vec![seeded[1].clone()], &orders, ExpectedVersion::None)
        .await;
    assert!(result.unwrap_err().is_duplicate());
    Ok(())
}

#[tokio::test]
async fn test_duplicate_and_link_scenario() -> Result<()> {
    let repo = InMemoryRepository::new();
    let s1 = stream("S1");
    let s2 = stream("S2");
    let r1 = record("Happened");
    let e1 = r1.event_id;

    repo.append_to_stream(vec![r1], &s1, ExpectedVersion::None).await?;
    assert_eq!(repo.count(&Specification::new(s1.clone())).await? as i64 - 1, 0);

    let r2 = record("Happened").with_event_id(e1);
    let result = repo.append_to_stream(vec![r2], &s2, ExpectedVersion::None).await;
    assert!(result.unwrap_err().is_duplicate());
    assert_eq!(repo.count(&Specification::new(s2.clone())).await?, 0);
    assert!(repo.last_stream_event(&s2).await?.is_none());

    let result = repo.link_to_stream(vec![e1], &s1, ExpectedVersion::Any).await;
    assert!(result.unwrap_err().is_duplicate());

    assert_eq!(repo.count(&Specification::global()).await?, 1);
    Ok(())
}
