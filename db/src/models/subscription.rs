use common::month::Month;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub service_name: String,
    /// Charged once per active calendar month.
    pub price: i32,
    /// First billed month.
    pub start_date: Month,
    /// Last billed month, inclusive. `None` while the subscription is open-ended.
    pub end_date: Option<Month>,
}
