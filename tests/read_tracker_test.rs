mod common;

use chrono::{Duration, Utc};
use common::{test_context, STAFF, STUDENT};
use lectern::domain::{AnnouncementDraft, AnnouncementPriority, DisplayType};

async fn create_announcement(ctx: &lectern::service::ServiceContext) -> anyhow::Result<i64> {
    let announcement = ctx.announcement_service.create(AnnouncementDraft {
        title: "Reading week".to_string(),
        content: "No lectures next week".to_string(),
        priority: AnnouncementPriority::Important,
        start_date: Utc::now() - Duration::hours(1),
        end_date: None,
        display_type: DisplayType::ShowOnce,
    }, Some(STAFF)).await?;
    Ok(announcement.id)
}

#[tokio::test]
async fn test_mark_read_is_idempotent() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let id = create_announcement(&ctx).await?;
    let tracker = &ctx.read_tracker;

    assert!(!tracker.has_read(id, STUDENT).await?);

    tracker.mark_read(id, STUDENT).await?;
    let first = tracker.find(id, STUDENT).await?.expect("read record");

    tracker.mark_read(id, STUDENT).await?;
    let second = tracker.find(id, STUDENT).await?.expect("read record");

    assert!(tracker.has_read(id, STUDENT).await?);
    assert_eq!(tracker.read_count(id).await?, 1);
    assert_eq!(first.id, second.id);
    assert_eq!(first.read_date, second.read_date);

    Ok(())
}

#[tokio::test]
async fn test_concurrent_mark_read_keeps_one_record() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let id = create_announcement(&ctx).await?;
    let tracker = ctx.read_tracker.clone();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.mark_read(id, STUDENT).await })
        })
        .collect();

    for handle in handles {
        handle.await??;
    }

    assert_eq!(tracker.read_count(id).await?, 1);
    assert!(tracker.has_read(id, STUDENT).await?);

    Ok(())
}

#[tokio::test]
async fn test_reads_are_tracked_per_user() -> anyhow::Result<()> {
    let ctx = test_context().await?;
    let id = create_announcement(&ctx).await?;
    let tracker = &ctx.read_tracker;

    tracker.mark_read(id, STUDENT).await?;

    assert!(tracker.has_read(id, STUDENT).await?);
    assert!(!tracker.has_read(id, STAFF).await?);
    assert_eq!(tracker.read_count(id).await?, 1);

    let record = tracker.find(id, STUDENT).await?.expect("read record");
    assert_eq!(record.announcement_id, id);
    assert_eq!(record.user_id, STUDENT);

    Ok(())
}
