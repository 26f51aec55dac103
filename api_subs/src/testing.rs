//! In-memory stores for handler and service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use common::error::{AppError, Res};
use db::{
    dtos::subscription::{CostFilter, SubscriptionFilter},
    models::subscription::Subscription,
    store::SubscriptionStore,
};
use uuid::Uuid;

#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<Subscription>>,
}

impl MemoryStore {
    pub fn with(rows: Vec<Subscription>) -> Self {
        Self {
            rows: Mutex::new(rows),
        }
    }

    fn not_found() -> AppError {
        AppError::NotFound("subscription not found".to_string())
    }
}

#[async_trait]
impl SubscriptionStore for MemoryStore {
    async fn insert(&self, subscription: &Subscription) -> Res<Subscription> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|row| row.id == subscription.id) {
            return Err(AppError::Conflict(
                "subscription with this ID already exists".to_string(),
            ));
        }
        rows.push(subscription.clone());
        Ok(subscription.clone())
    }

    async fn get(&self, id: Uuid) -> Res<Subscription> {
        let rows = self.rows.lock().unwrap();
        rows.iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or_else(Self::not_found)
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Res<Vec<Subscription>> {
        let rows = self.rows.lock().unwrap();
        let mut matching: Vec<Subscription> = rows
            .iter()
            .filter(|s| filter.user_id.is_none_or(|id| s.user_id == id))
            .filter(|s| {
                filter
                    .service_name
                    .as_ref()
                    .is_none_or(|name| &s.service_name == name)
            })
            .filter(|s| filter.min_price.is_none_or(|min| s.price >= min))
            .filter(|s| filter.max_price.is_none_or(|max| s.price <= max))
            .filter(|s| filter.start_date.is_none_or(|start| s.start_date >= start))
            .filter(|s| {
                filter
                    .end_date
                    .is_none_or(|end| s.end_date.is_some_and(|e| e <= end))
            })
            .filter(|s| {
                filter
                    .has_end_date
                    .is_none_or(|has| s.end_date.is_some() == has)
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(a.id.cmp(&b.id)));
        Ok(matching
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn update(&self, subscription: &Subscription) -> Res<Subscription> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|row| row.id == subscription.id)
            .ok_or_else(Self::not_found)?;
        *row = Subscription {
            user_id: row.user_id,
            ..subscription.clone()
        };
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Res<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|row| row.id != id);
        if rows.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }

    async fn list_for_cost_calculation(&self, filter: &CostFilter) -> Res<Vec<Subscription>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|s| s.user_id == filter.user_id)
            .filter(|s| {
                filter
                    .service_name
                    .as_ref()
                    .is_none_or(|name| &s.service_name == name)
            })
            .filter(|s| s.start_date <= filter.period_end)
            .filter(|s| s.end_date.is_none_or(|end| end >= filter.period_start))
            .cloned()
            .collect())
    }
}

/// Every call fails the way an unreachable database does.
pub struct FailingStore;

#[async_trait]
impl SubscriptionStore for FailingStore {
    async fn insert(&self, _: &Subscription) -> Res<Subscription> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn get(&self, _: Uuid) -> Res<Subscription> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn list(&self, _: &SubscriptionFilter) -> Res<Vec<Subscription>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn update(&self, _: &Subscription) -> Res<Subscription> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn delete(&self, _: Uuid) -> Res<()> {
        Err(sqlx::Error::PoolTimedOut.into())
    }

    async fn list_for_cost_calculation(&self, _: &CostFilter) -> Res<Vec<Subscription>> {
        Err(sqlx::Error::PoolTimedOut.into())
    }
}
