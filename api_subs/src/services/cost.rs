//! Subscription cost over a period of months.
//!
//! A subscription is charged its full `price` for every calendar month it is
//! active. Both ends are inclusive on either side: a subscription running
//! `01-2025..=03-2025` is billed three times, and a period `02-2025..=02-2025`
//! covers exactly one month. Open-ended subscriptions stay active until the
//! end of whatever period is asked about.

use common::{error::Res, month::Month};
use db::{
    dtos::subscription::CostFilter, models::subscription::Subscription, store::SubscriptionStore,
};

/// Months of `subscription` that fall within `period_start..=period_end`.
///
/// Returns `None` when the subscription is not active in any month of the
/// period.
pub fn billed_range(
    subscription: &Subscription,
    period_start: Month,
    period_end: Month,
) -> Option<(Month, Month)> {
    let effective_end = match subscription.end_date {
        Some(end) if end < period_end => end,
        _ => period_end,
    };

    let start = subscription.start_date.max(period_start);
    let end = effective_end.min(period_end);

    (start <= end).then_some((start, end))
}

/// Total amount charged by `subscriptions` within `period_start..=period_end`.
///
/// Pure and independent of the input order. Subscriptions outside the period
/// contribute nothing, so callers may pass a superset of the relevant ones.
/// A reversed period costs zero. A negative price, which storage never
/// produces, is billed as zero and the sum saturates at `u64::MAX`.
pub fn calculate_cost(subscriptions: &[Subscription], period_start: Month, period_end: Month) -> u64 {
    if period_end < period_start {
        return 0;
    }

    subscriptions
        .iter()
        .filter_map(|sub| {
            let (start, end) = billed_range(sub, period_start, period_end)?;
            let price = u64::try_from(sub.price).unwrap_or(0);
            Some(price.saturating_mul(Month::months_between(start, end)))
        })
        .fold(0_u64, u64::saturating_add)
}

/// Loads the candidate subscriptions for `filter` and prices them.
pub async fn total_cost(store: &dyn SubscriptionStore, filter: &CostFilter) -> Res<u64> {
    let subscriptions = store.list_for_cost_calculation(filter).await?;
    let total = calculate_cost(&subscriptions, filter.period_start, filter.period_end);

    log::debug!(
        "Cost for user {} over {}..={}: {} ({} candidate subscriptions)",
        filter.user_id,
        filter.period_start,
        filter.period_end,
        total,
        subscriptions.len()
    );
    Ok(total)
}
