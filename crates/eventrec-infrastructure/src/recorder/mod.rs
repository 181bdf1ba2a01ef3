//! Application service tying the event store and the streak aggregate
//! together. Every mutation runs as one transaction: the event row and the
//! rewritten aggregate row land together or not at all. There is no rebuild
//! path for the aggregate, so a partial write would corrupt the statistics
//! permanently.

use chrono::{DateTime, Local, NaiveDate, Utc};
use log::{info, warn};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::Mutex as AsyncMutex;

use crate::persistence::repositories::{SqliteEventRepository, SqliteStreakAggregateRepository};
use crate::persistence::SqliteUnitOfWork;
use eventrec_domain::event::{EventRecord, EventRepository};
use eventrec_domain::shared::transaction::{TransactionContext, UnitOfWork};
use eventrec_domain::shared::{DomainError, UserId};
use eventrec_domain::streak::{StreakAggregate, StreakAggregateRepository, StreakStatistics};

pub struct EventRecorder {
    events: SqliteEventRepository,
    streaks: SqliteStreakAggregateRepository,
    uow: SqliteUnitOfWork,
    // One async mutex per user: the load-compute-store cycle on the
    // aggregate row must not interleave for the same user. Different users
    // never contend.
    user_locks: StdMutex<HashMap<UserId, Arc<AsyncMutex<()>>>>,
}

impl EventRecorder {
    pub fn new(pool: Arc<SqlitePool>) -> Self {
        Self {
            events: SqliteEventRepository::new(pool.clone()),
            streaks: SqliteStreakAggregateRepository::new(pool.clone()),
            uow: SqliteUnitOfWork::new(pool),
            user_locks: StdMutex::new(HashMap::new()),
        }
    }

    /// Record an event happening right now: UTC instant, local calendar day.
    pub async fn add_event(
        &self,
        user_id: &UserId,
        name: Option<&str>,
    ) -> Result<EventRecord, DomainError> {
        let timestamp = Utc::now();
        let day = Local::now().date_naive();
        self.add_event_at(user_id, name, timestamp, day).await
    }

    /// Record an event on an explicit day. The aggregate is created lazily
    /// on the user's first event.
    pub async fn add_event_at(
        &self,
        user_id: &UserId,
        name: Option<&str>,
        timestamp: DateTime<Utc>,
        day: NaiveDate,
    ) -> Result<EventRecord, DomainError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let result = self.create_event_tx(user_id, name, timestamp, day).await;
        match &result {
            Ok(event) => info!(
                "[recorder] add_event user_id={} event_id={} day={}",
                user_id,
                event.id(),
                day
            ),
            Err(err) => warn!(
                "[recorder] add_event failed user_id={} day={} err={}",
                user_id,
                day,
                err.format_with_code()
            ),
        }
        result
    }

    /// Soft-delete an event. When it was the last surviving event of its
    /// day, the day is removed from the streak segments in the same
    /// transaction. The lifetime event counter is left untouched.
    pub async fn delete_event(&self, user_id: &UserId, event_id: i64) -> Result<(), DomainError> {
        let lock = self.user_lock(user_id);
        let _guard = lock.lock().await;

        let result = self.delete_event_tx(user_id, event_id).await;
        match &result {
            Ok(()) => info!(
                "[recorder] delete_event user_id={} event_id={}",
                user_id, event_id
            ),
            Err(err) => warn!(
                "[recorder] delete_event failed user_id={} event_id={} err={}",
                user_id,
                event_id,
                err.format_with_code()
            ),
        }
        result
    }

    /// Statistics read straight off the aggregate row; a user without a row
    /// has all-zero statistics.
    pub async fn get_statistics(&self, user_id: &UserId) -> Result<StreakStatistics, DomainError> {
        let aggregate = self.streaks.find_by_user_id(user_id).await?;
        Ok(aggregate
            .map(|a| a.statistics())
            .unwrap_or_else(StreakStatistics::empty))
    }

    /// Surviving events in `[from_day, to_day]`, most recent first.
    pub async fn list_events(
        &self,
        user_id: &UserId,
        from_day: NaiveDate,
        to_day: NaiveDate,
    ) -> Result<Vec<EventRecord>, DomainError> {
        self.events.list_in_range(user_id, from_day, to_day).await
    }

    /// All surviving events for a user, most recent first.
    pub async fn list_all_events(&self, user_id: &UserId) -> Result<Vec<EventRecord>, DomainError> {
        self.events.list_all(user_id).await
    }

    async fn create_event_tx(
        &self,
        user_id: &UserId,
        name: Option<&str>,
        timestamp: DateTime<Utc>,
        day: NaiveDate,
    ) -> Result<EventRecord, DomainError> {
        let mut tx = self.uow.begin().await?;

        let mut aggregate = self
            .streaks
            .find_by_user_id_in_tx(&mut tx, user_id)
            .await?
            .unwrap_or_else(|| StreakAggregate::new(user_id.clone()));

        let event = self
            .events
            .insert_in_tx(&mut tx, user_id, name, timestamp, day)
            .await?;

        aggregate.record_event_on(day);
        self.streaks.upsert_in_tx(&mut tx, &aggregate).await?;

        tx.commit().await?;

        Ok(event)
    }

    async fn delete_event_tx(&self, user_id: &UserId, event_id: i64) -> Result<(), DomainError> {
        let mut tx = self.uow.begin().await?;

        let event = self
            .events
            .find_by_id_in_tx(&mut tx, user_id, event_id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("Event {} not found", event_id)))?;
        if event.is_deleted() {
            return Err(DomainError::NotFound(format!(
                "Event {} is already deleted",
                event_id
            )));
        }

        self.events
            .mark_deleted_in_tx(&mut tx, user_id, event_id)
            .await?;

        let remaining = self
            .events
            .count_other_active_on_day_in_tx(&mut tx, user_id, event.day(), event_id)
            .await?;

        if remaining == 0 {
            let mut aggregate = self
                .streaks
                .find_by_user_id_in_tx(&mut tx, user_id)
                .await?
                .ok_or_else(|| {
                    DomainError::InvariantViolation(format!(
                        "No streak aggregate for user {} with live events",
                        user_id
                    ))
                })?;

            aggregate.remove_day(event.day())?;
            self.streaks.upsert_in_tx(&mut tx, &aggregate).await?;
        }

        tx.commit().await?;

        Ok(())
    }

    fn user_lock(&self, user_id: &UserId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.user_locks.lock().expect("user lock map poisoned");
        locks
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }
}
