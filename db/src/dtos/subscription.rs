use common::month::Month;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionCreateRequest {
    pub user_id: Uuid,
    pub service_name: String,
    pub price: i32,
    pub start_date: Month,
    pub end_date: Option<Month>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionUpdateRequest {
    pub service_name: String,
    pub price: i32,
    pub start_date: Month,
    pub end_date: Option<Month>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubscriptionFilter {
    pub user_id: Option<Uuid>,
    pub service_name: Option<String>,
    pub min_price: Option<i32>,
    pub max_price: Option<i32>,
    pub start_date: Option<Month>,
    pub end_date: Option<Month>,
    pub has_end_date: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// Candidate selection for a cost calculation. `period_start..=period_end`
/// is an inclusive range of months.
#[derive(Debug, Clone, PartialEq)]
pub struct CostFilter {
    pub user_id: Uuid,
    pub service_name: Option<String>,
    pub period_start: Month,
    pub period_end: Month,
}
