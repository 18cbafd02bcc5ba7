//! Participation admission against a real database

mod helpers;

use assert_matches::assert_matches;
use helpers::*;
use serial_test::serial;
use ExploreWithMe::models::{RequestDecision, RequestStatus, RequestStatusUpdate};
use ExploreWithMe::EwmError;

#[tokio::test]
#[serial]
async fn test_unlimited_event_confirms_immediately() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let guest = insert_user(&db.pool, "Guest").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(&db.pool, owner, category, EventFixture::default()).await;

    let request = services.request_service.apply(guest, event).await.unwrap();
    assert_eq!(request.status, RequestStatus::Confirmed);
    assert_eq!(db.confirmed_requests(event).await, 1);
}

#[tokio::test]
#[serial]
async fn test_moderated_event_keeps_request_pending() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let guest = insert_user(&db.pool, "Guest").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 5, ..Default::default() },
    )
    .await;

    let request = services.request_service.apply(guest, event).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(db.confirmed_requests(event).await, 0);
}

#[tokio::test]
#[serial]
async fn test_apply_rejections() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let guest = insert_user(&db.pool, "Guest").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(&db.pool, owner, category, EventFixture::default()).await;
    let pending = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { state: "PENDING", ..Default::default() },
    )
    .await;

    services.request_service.apply(guest, event).await.unwrap();
    assert_matches!(services.request_service.apply(guest, event).await, Err(EwmError::Conflict(_)));
    assert_matches!(services.request_service.apply(owner, event).await, Err(EwmError::Conflict(_)));
    assert_matches!(services.request_service.apply(guest, pending).await, Err(EwmError::Conflict(_)));
    assert_matches!(services.request_service.apply(guest, 9999).await, Err(EwmError::NotFound(_)));
    assert_matches!(services.request_service.apply(9999, event).await, Err(EwmError::NotFound(_)));
}

#[tokio::test]
#[serial]
async fn test_full_event_rejects_new_requests() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let first = insert_user(&db.pool, "First").await;
    let second = insert_user(&db.pool, "Second").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 1, request_moderation: false, ..Default::default() },
    )
    .await;

    services.request_service.apply(first, event).await.unwrap();
    assert_matches!(services.request_service.apply(second, event).await, Err(EwmError::Conflict(_)));
    assert_eq!(db.confirmed_requests(event).await, 1);
}

#[tokio::test]
#[serial]
async fn test_concurrent_applies_for_last_seat() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let first = insert_user(&db.pool, "First").await;
    let second = insert_user(&db.pool, "Second").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 1, request_moderation: false, ..Default::default() },
    )
    .await;

    let (a, b) = futures::join!(
        services.request_service.apply(first, event),
        services.request_service.apply(second, event),
    );

    assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
    let loser = if a.is_ok() { b } else { a };
    assert_matches!(loser, Err(EwmError::Conflict(_)));
    assert_eq!(db.confirmed_requests(event).await, 1);
}

#[tokio::test]
#[serial]
async fn test_cancel_confirmed_releases_seat() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let guest = insert_user(&db.pool, "Guest").await;
    let stranger = insert_user(&db.pool, "Stranger").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 3, request_moderation: false, ..Default::default() },
    )
    .await;

    let request = services.request_service.apply(guest, event).await.unwrap();
    assert_eq!(db.confirmed_requests(event).await, 1);

    assert_matches!(
        services.request_service.cancel(stranger, request.id).await,
        Err(EwmError::NotFound(_))
    );

    let canceled = services.request_service.cancel(guest, request.id).await.unwrap();
    assert_eq!(canceled.status, RequestStatus::Canceled);
    assert_eq!(db.confirmed_requests(event).await, 0);

    // A second cancel changes nothing
    let again = services.request_service.cancel(guest, request.id).await.unwrap();
    assert_eq!(again.status, RequestStatus::Canceled);
    assert_eq!(db.confirmed_requests(event).await, 0);

    // A canceled request frees the pair for a new application
    let reapplied = services.request_service.apply(guest, event).await.unwrap();
    assert_eq!(reapplied.status, RequestStatus::Confirmed);
}

#[tokio::test]
#[serial]
async fn test_cancel_pending_leaves_counter() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let guest = insert_user(&db.pool, "Guest").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 3, ..Default::default() },
    )
    .await;

    let request = services.request_service.apply(guest, event).await.unwrap();
    services.request_service.cancel(guest, request.id).await.unwrap();
    assert_eq!(db.confirmed_requests(event).await, 0);
}

#[tokio::test]
#[serial]
async fn test_bulk_decide_partial_admission() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let early = insert_user(&db.pool, "Early").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 3, ..Default::default() },
    )
    .await;
    insert_request(&db.pool, event, early, "CONFIRMED").await;
    sqlx::query("UPDATE events SET confirmed_requests = 1 WHERE id = $1")
        .bind(event)
        .execute(&db.pool)
        .await
        .unwrap();

    let mut ids = Vec::new();
    for name in ["Ann", "Ben", "Cid"] {
        let user = insert_user(&db.pool, name).await;
        ids.push(services.request_service.apply(user, event).await.unwrap().id);
    }
    // Caller order wins, not id order
    let order = vec![ids[2], ids[0], ids[1]];

    let result = services.request_service
        .bulk_decide(owner, event, RequestStatusUpdate { request_ids: order.clone(), status: RequestDecision::Confirmed })
        .await
        .unwrap();

    let confirmed: Vec<i64> = result.confirmed_requests.iter().map(|r| r.id).collect();
    let rejected: Vec<i64> = result.rejected_requests.iter().map(|r| r.id).collect();
    assert_eq!(confirmed, vec![order[0], order[1]]);
    assert_eq!(rejected, vec![order[2]]);
    assert_eq!(db.confirmed_requests(event).await, 3);
    assert_eq!(db.count_requests(event, "REJECTED").await, 1);

    // No seats left
    assert_matches!(
        services.request_service
            .bulk_decide(owner, event, RequestStatusUpdate { request_ids: vec![ids[0]], status: RequestDecision::Rejected })
            .await,
        Err(EwmError::Conflict(_))
    );
}

#[tokio::test]
#[serial]
async fn test_bulk_decide_preconditions() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let guest = insert_user(&db.pool, "Guest").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 2, ..Default::default() },
    )
    .await;
    let request = services.request_service.apply(guest, event).await.unwrap();

    let update = |ids: Vec<i64>| RequestStatusUpdate { request_ids: ids, status: RequestDecision::Confirmed };

    assert_matches!(
        services.request_service.bulk_decide(guest, event, update(vec![request.id])).await,
        Err(EwmError::Conflict(_))
    );
    assert_matches!(
        services.request_service.bulk_decide(owner, event, update(vec![request.id, 424242])).await,
        Err(EwmError::NotFound(_))
    );

    let result = services.request_service
        .bulk_decide(owner, event, RequestStatusUpdate { request_ids: vec![request.id], status: RequestDecision::Rejected })
        .await
        .unwrap();
    assert!(result.confirmed_requests.is_empty());
    assert_eq!(result.rejected_requests.len(), 1);
    assert_eq!(db.confirmed_requests(event).await, 0);

    // Nothing pending anymore
    assert_matches!(
        services.request_service.bulk_decide(owner, event, update(vec![request.id])).await,
        Err(EwmError::Conflict(_))
    );
}

#[tokio::test]
#[serial]
async fn test_bulk_decide_leaves_settled_requests() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let settled_user = insert_user(&db.pool, "Settled").await;
    let waiting_user = insert_user(&db.pool, "Waiting").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(
        &db.pool,
        owner,
        category,
        EventFixture { participant_limit: 2, ..Default::default() },
    )
    .await;
    let settled = insert_request(&db.pool, event, settled_user, "REJECTED").await;
    let waiting = insert_request(&db.pool, event, waiting_user, "PENDING").await;

    let result = services.request_service
        .bulk_decide(owner, event, RequestStatusUpdate { request_ids: vec![settled, waiting], status: RequestDecision::Confirmed })
        .await
        .unwrap();

    let confirmed: Vec<i64> = result.confirmed_requests.iter().map(|r| r.id).collect();
    assert_eq!(confirmed, vec![waiting]);
    assert!(result.rejected_requests.is_empty());
    assert_eq!(db.confirmed_requests(event).await, 1);
    assert_eq!(db.count_requests(event, "REJECTED").await, 1);
    assert_eq!(db.count_requests(event, "CONFIRMED").await, 1);
}

#[tokio::test]
#[serial]
async fn test_request_views() {
    let db = TestDatabase::connect().await;
    let services = services(&db, None);

    let owner = insert_user(&db.pool, "Owner").await;
    let guest = insert_user(&db.pool, "Guest").await;
    let category = insert_category(&db.pool, "Dance").await;
    let event = insert_event(&db.pool, owner, category, EventFixture::default()).await;
    services.request_service.apply(guest, event).await.unwrap();

    assert_eq!(services.request_service.list_user_requests(guest).await.unwrap().len(), 1);
    assert_eq!(services.request_service.list_event_requests(owner, event).await.unwrap().len(), 1);
    assert_matches!(
        services.request_service.list_event_requests(guest, event).await,
        Err(EwmError::NotFound(_))
    );
}
