use common::month::Month;
use db::models::subscription::Subscription;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /subscriptions`. Identifiers and months arrive as strings
/// and are checked by the validator.
#[derive(Debug, Deserialize)]
pub struct CreateSubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub user_id: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

/// Body of `PUT /subscriptions/{id}`. The owner cannot be changed.
#[derive(Debug, Deserialize)]
pub struct UpdateSubscriptionRequest {
    pub service_name: String,
    pub price: i64,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListSubscriptionsRequest {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub has_end_date: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CostRequest {
    pub user_id: Option<String>,
    pub service_name: Option<String>,
    pub period_start: Option<String>,
    pub period_end: Option<String>,
}

#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionResponse {
    pub id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub user_id: Uuid,
    pub start_date: Month,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<Month>,
}

impl From<Subscription> for SubscriptionResponse {
    fn from(sub: Subscription) -> Self {
        Self {
            id: sub.id,
            service_name: sub.service_name,
            price: sub.price,
            user_id: sub.user_id,
            start_date: sub.start_date,
            end_date: sub.end_date,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CostResponse {
    pub total_cost: u64,
}
