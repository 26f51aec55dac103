use common::error::Res;
use db::{
    dtos::subscription::{SubscriptionCreateRequest, SubscriptionFilter, SubscriptionUpdateRequest},
    models::subscription::Subscription,
    store::SubscriptionStore,
};
use uuid::Uuid;

/// Stores a new subscription under a freshly generated id.
pub async fn create_subscription(
    store: &dyn SubscriptionStore,
    req: SubscriptionCreateRequest,
) -> Res<Subscription> {
    let subscription = Subscription {
        id: Uuid::new_v4(),
        user_id: req.user_id,
        service_name: req.service_name,
        price: req.price,
        start_date: req.start_date,
        end_date: req.end_date,
    };

    let created = store.insert(&subscription).await?;
    log::debug!(
        "Created subscription {} ({}) for user {}",
        created.id,
        created.service_name,
        created.user_id
    );
    Ok(created)
}

pub async fn get_subscription(store: &dyn SubscriptionStore, id: Uuid) -> Res<Subscription> {
    store.get(id).await
}

pub async fn get_subscriptions(
    store: &dyn SubscriptionStore,
    filter: &SubscriptionFilter,
) -> Res<Vec<Subscription>> {
    let subscriptions = store.list(filter).await?;
    log::debug!(
        "Listed {} subscriptions (limit {}, offset {})",
        subscriptions.len(),
        filter.limit,
        filter.offset
    );
    Ok(subscriptions)
}

/// Replaces the mutable fields of an existing subscription.
/// The owner recorded at creation is kept.
pub async fn update_subscription(
    store: &dyn SubscriptionStore,
    id: Uuid,
    req: SubscriptionUpdateRequest,
) -> Res<Subscription> {
    let existing = store.get(id).await?;

    let updated = store
        .update(&Subscription {
            id: existing.id,
            user_id: existing.user_id,
            service_name: req.service_name,
            price: req.price,
            start_date: req.start_date,
            end_date: req.end_date,
        })
        .await?;
    log::debug!("Updated subscription {}", updated.id);
    Ok(updated)
}

pub async fn delete_subscription(store: &dyn SubscriptionStore, id: Uuid) -> Res<()> {
    store.delete(id).await?;
    log::debug!("Deleted subscription {}", id);
    Ok(())
}
