use chrono::NaiveDate;
use std::sync::Arc;

use eventrec_domain::shared::UserId;
use eventrec_infrastructure::recorder::EventRecorder;

mod test_helpers;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(d: NaiveDate, hour: u32) -> chrono::DateTime<chrono::Utc> {
    d.and_hms_opt(hour, 0, 0).unwrap().and_utc()
}

#[tokio::test]
async fn e2e_consecutive_days_build_a_streak() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = EventRecorder::new(Arc::new(pool));
    let user_id = UserId::new();

    for d in [day(2023, 7, 1), day(2023, 7, 2), day(2023, 7, 3)] {
        recorder
            .add_event_at(&user_id, Some("workout"), at(d, 9), d)
            .await
            .expect("add event");
    }

    let stats = recorder.get_statistics(&user_id).await.expect("stats");
    assert_eq!(stats.total_events, 3);
    assert_eq!(stats.total_distinct_days, 3);
    assert_eq!(stats.max_consecutive_days, 3);
    assert_eq!(stats.current_consecutive_days, 3);
}

#[tokio::test]
async fn e2e_deleting_middle_day_splits_the_streak() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = EventRecorder::new(Arc::new(pool));
    let user_id = UserId::new();

    let mut events = Vec::new();
    for d in [day(2023, 7, 1), day(2023, 7, 2), day(2023, 7, 3)] {
        let event = recorder
            .add_event_at(&user_id, None, at(d, 9), d)
            .await
            .expect("add event");
        events.push(event);
    }

    recorder
        .delete_event(&user_id, events[1].id())
        .await
        .expect("delete middle day");

    let stats = recorder.get_statistics(&user_id).await.expect("stats");
    // the lifetime counter keeps counting creations
    assert_eq!(stats.total_events, 3);
    assert_eq!(stats.total_distinct_days, 2);
    assert_eq!(stats.max_consecutive_days, 1);
    assert_eq!(stats.current_consecutive_days, 1);

    let listed = recorder.list_all_events(&user_id).await.expect("list");
    let days: Vec<NaiveDate> = listed.iter().map(|e| e.day()).collect();
    assert_eq!(days, vec![day(2023, 7, 3), day(2023, 7, 1)]);
}

#[tokio::test]
async fn e2e_day_stays_active_while_another_event_survives() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = EventRecorder::new(Arc::new(pool));
    let user_id = UserId::new();

    let d = day(2023, 7, 5);
    let first = recorder
        .add_event_at(&user_id, Some("run"), at(d, 8), d)
        .await
        .expect("add first");
    recorder
        .add_event_at(&user_id, Some("swim"), at(d, 18), d)
        .await
        .expect("add second");

    recorder
        .delete_event(&user_id, first.id())
        .await
        .expect("delete first");

    let stats = recorder.get_statistics(&user_id).await.expect("stats");
    assert_eq!(stats.total_events, 2);
    assert_eq!(stats.total_distinct_days, 1);
    assert_eq!(stats.max_consecutive_days, 1);
}

#[tokio::test]
async fn e2e_gap_then_new_run_tracks_current_vs_max() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = EventRecorder::new(Arc::new(pool));
    let user_id = UserId::new();

    for d in [
        day(2023, 7, 1),
        day(2023, 7, 2),
        day(2023, 7, 3),
        // gap
        day(2023, 7, 10),
        day(2023, 7, 11),
    ] {
        recorder
            .add_event_at(&user_id, None, at(d, 9), d)
            .await
            .expect("add event");
    }

    let stats = recorder.get_statistics(&user_id).await.expect("stats");
    assert_eq!(stats.total_events, 5);
    assert_eq!(stats.total_distinct_days, 5);
    assert_eq!(stats.max_consecutive_days, 3);
    assert_eq!(stats.current_consecutive_days, 2);
}

#[tokio::test]
async fn e2e_unknown_user_has_zero_statistics() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = EventRecorder::new(Arc::new(pool));

    let stats = recorder
        .get_statistics(&UserId::new())
        .await
        .expect("stats");
    assert_eq!(stats.total_events, 0);
    assert_eq!(stats.total_distinct_days, 0);
    assert_eq!(stats.max_consecutive_days, 0);
    assert_eq!(stats.current_consecutive_days, 0);
}

#[tokio::test]
async fn e2e_users_do_not_share_streaks() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = EventRecorder::new(Arc::new(pool));
    let alice = UserId::new();
    let bob = UserId::new();

    let d = day(2023, 7, 1);
    recorder
        .add_event_at(&alice, None, at(d, 9), d)
        .await
        .expect("add for alice");

    let alice_stats = recorder.get_statistics(&alice).await.expect("stats");
    let bob_stats = recorder.get_statistics(&bob).await.expect("stats");
    assert_eq!(alice_stats.total_events, 1);
    assert_eq!(bob_stats.total_events, 0);
    assert!(recorder.list_all_events(&bob).await.expect("list").is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn e2e_concurrent_mutations_for_one_user_serialize() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = Arc::new(EventRecorder::new(Arc::new(pool)));
    let user_id = UserId::new();

    // two events per day across July 1-4, all racing for the same aggregate
    let mut handles = Vec::new();
    for i in 0..8u32 {
        let recorder = recorder.clone();
        let user_id = user_id.clone();
        handles.push(tokio::spawn(async move {
            let d = day(2023, 7, 1 + i % 4);
            recorder.add_event_at(&user_id, None, at(d, 6 + i), d).await
        }));
    }
    let mut events = Vec::new();
    for handle in handles {
        events.push(handle.await.expect("join").expect("add event"));
    }

    let stats = recorder.get_statistics(&user_id).await.expect("stats");
    assert_eq!(stats.total_events, 8);
    assert_eq!(stats.total_distinct_days, 4);
    assert_eq!(stats.max_consecutive_days, 4);

    // race the deletes too: both events of July 2, one of July 3
    let mut doomed: Vec<i64> = events
        .iter()
        .filter(|e| e.day() == day(2023, 7, 2))
        .map(|e| e.id())
        .collect();
    let on_day_3 = events
        .iter()
        .find(|e| e.day() == day(2023, 7, 3))
        .expect("event on July 3");
    doomed.push(on_day_3.id());

    let mut handles = Vec::new();
    for event_id in doomed {
        let recorder = recorder.clone();
        let user_id = user_id.clone();
        handles.push(tokio::spawn(async move {
            recorder.delete_event(&user_id, event_id).await
        }));
    }
    for handle in handles {
        handle.await.expect("join").expect("delete event");
    }

    // July 2 went inactive, July 3 kept its second event
    let stats = recorder.get_statistics(&user_id).await.expect("stats");
    assert_eq!(stats.total_events, 8);
    assert_eq!(stats.total_distinct_days, 3);
    assert_eq!(stats.max_consecutive_days, 2);
    assert_eq!(stats.current_consecutive_days, 2);
}

#[tokio::test]
async fn e2e_concurrent_users_keep_independent_streaks() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = Arc::new(EventRecorder::new(Arc::new(pool)));
    let alice = UserId::new();
    let bob = UserId::new();

    let run = |user: UserId| {
        let recorder = recorder.clone();
        async move {
            for d in [day(2023, 7, 1), day(2023, 7, 2), day(2023, 7, 3)] {
                recorder
                    .add_event_at(&user, None, at(d, 9), d)
                    .await
                    .expect("add event");
            }
        }
    };

    tokio::join!(run(alice.clone()), run(bob.clone()));

    for user in [&alice, &bob] {
        let stats = recorder.get_statistics(user).await.expect("stats");
        assert_eq!(stats.total_events, 3);
        assert_eq!(stats.max_consecutive_days, 3);
    }
}

#[tokio::test]
async fn e2e_list_events_honors_range() {
    let pool = test_helpers::setup_in_memory_db().await;
    let recorder = EventRecorder::new(Arc::new(pool));
    let user_id = UserId::new();

    for d in [day(2023, 7, 1), day(2023, 7, 5), day(2023, 7, 9)] {
        recorder
            .add_event_at(&user_id, None, at(d, 9), d)
            .await
            .expect("add event");
    }

    let ranged = recorder
        .list_events(&user_id, day(2023, 7, 2), day(2023, 7, 8))
        .await
        .expect("list range");
    assert_eq!(ranged.len(), 1);
    assert_eq!(ranged[0].day(), day(2023, 7, 5));
}
