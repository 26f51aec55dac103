use std::sync::Arc;

use async_trait::async_trait;
use common::error::Res;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    dtos::subscription::{CostFilter, SubscriptionFilter},
    models::subscription::Subscription,
    subscription,
};

/// Persistence operations the API layer needs for subscriptions.
///
/// Every storage failure comes back as `AppError::Database`; lookups that
/// miss come back as `AppError::NotFound`.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    async fn insert(&self, subscription: &Subscription) -> Res<Subscription>;

    async fn get(&self, id: Uuid) -> Res<Subscription>;

    async fn list(&self, filter: &SubscriptionFilter) -> Res<Vec<Subscription>>;

    /// Rewrites the mutable fields of the subscription with the same id.
    async fn update(&self, subscription: &Subscription) -> Res<Subscription>;

    async fn delete(&self, id: Uuid) -> Res<()>;

    /// Must return at least every subscription of `filter.user_id` (and
    /// service, when given) with `start_date <= period_end` and either no
    /// `end_date` or `end_date >= period_start`. Returning more is harmless,
    /// returning less under-counts the cost.
    async fn list_for_cost_calculation(&self, filter: &CostFilter) -> Res<Vec<Subscription>>;
}

/// `SubscriptionStore` backed by the Postgres pool.
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn insert(&self, data: &Subscription) -> Res<Subscription> {
        subscription::insert_subscription(&*self.pool, data).await
    }

    async fn get(&self, id: Uuid) -> Res<Subscription> {
        subscription::get_subscription_by_id(&*self.pool, id).await
    }

    async fn list(&self, filter: &SubscriptionFilter) -> Res<Vec<Subscription>> {
        subscription::get_subscriptions(&*self.pool, filter).await
    }

    async fn update(&self, data: &Subscription) -> Res<Subscription> {
        subscription::update_subscription(&*self.pool, data).await
    }

    async fn delete(&self, id: Uuid) -> Res<()> {
        subscription::delete_subscription(&*self.pool, id).await
    }

    async fn list_for_cost_calculation(&self, filter: &CostFilter) -> Res<Vec<Subscription>> {
        subscription::get_subscriptions_for_cost(&*self.pool, filter).await
    }
}
