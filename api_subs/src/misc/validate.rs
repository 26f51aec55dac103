use common::{
    error::{AppError, Res},
    month::{MONTH_FORMAT, Month},
};
use db::dtos::subscription::{
    CostFilter, SubscriptionCreateRequest, SubscriptionFilter, SubscriptionUpdateRequest,
};
use uuid::Uuid;

use crate::dtos::sub::{
    CostRequest, CreateSubscriptionRequest, ListSubscriptionsRequest, UpdateSubscriptionRequest,
};

pub const MAX_SERVICE_NAME_LEN: usize = 100;

/// Turns raw request DTOs into checked, typed values.
///
/// Every rejection is an `AppError::BadRequest` carrying a message meant for
/// the API client.
#[derive(Debug, Clone)]
pub struct Validator {
    default_page_size: i64,
    max_page_size: i64,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(10, 100)
    }
}

impl Validator {
    pub fn new(default_page_size: i64, max_page_size: i64) -> Self {
        let default_page_size = default_page_size.max(1);
        Self {
            default_page_size,
            max_page_size: max_page_size.max(default_page_size),
        }
    }

    pub fn subscription_id(&self, raw: &str) -> Res<Uuid> {
        Uuid::parse_str(raw.trim())
            .map_err(|_| bad_request("invalid subscription ID format".to_string()))
    }

    pub fn create_request(&self, req: CreateSubscriptionRequest) -> Res<SubscriptionCreateRequest> {
        let user_id = Uuid::parse_str(req.user_id.trim())
            .map_err(|_| bad_request("invalid user ID format".to_string()))?;
        let service_name = service_name(req.service_name)?;
        let price = price(req.price)?;
        let start_date = required_month(Some(req.start_date), "start_date")?;
        let end_date = optional_month(req.end_date, "end_date")?;
        check_active_range(start_date, end_date)?;

        Ok(SubscriptionCreateRequest {
            user_id,
            service_name,
            price,
            start_date,
            end_date,
        })
    }

    pub fn update_request(&self, req: UpdateSubscriptionRequest) -> Res<SubscriptionUpdateRequest> {
        let service_name = service_name(req.service_name)?;
        let price = price(req.price)?;
        let start_date = required_month(Some(req.start_date), "start_date")?;
        let end_date = optional_month(req.end_date, "end_date")?;
        check_active_range(start_date, end_date)?;

        Ok(SubscriptionUpdateRequest {
            service_name,
            price,
            start_date,
            end_date,
        })
    }

    pub fn list_filter(&self, req: ListSubscriptionsRequest) -> Res<SubscriptionFilter> {
        let user_id = match non_blank(req.user_id) {
            Some(raw) => Some(
                Uuid::parse_str(&raw)
                    .map_err(|_| bad_request("invalid user_id format".to_string()))?,
            ),
            None => None,
        };

        let min_price = non_negative(req.min_price, "min_price")?;
        let max_price = non_negative(req.max_price, "max_price")?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(bad_request(
                    "min_price cannot be greater than max_price".to_string(),
                ));
            }
        }

        let has_end_date = match non_blank(req.has_end_date).as_deref() {
            None => None,
            Some("1") | Some("true") => Some(true),
            Some("0") | Some("false") => Some(false),
            Some(_) => {
                return Err(bad_request(
                    "has_end_date must be one of 1, 0, true, false".to_string(),
                ));
            }
        };

        let limit = match non_blank(req.limit) {
            None => self.default_page_size,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|limit| (1..=self.max_page_size).contains(limit))
                .ok_or_else(|| {
                    bad_request(format!(
                        "limit must be between 1 and {}",
                        self.max_page_size
                    ))
                })?,
        };

        let offset = match non_blank(req.offset) {
            None => 0,
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|offset| *offset >= 0)
                .ok_or_else(|| bad_request("offset must be a non-negative integer".to_string()))?,
        };

        Ok(SubscriptionFilter {
            user_id,
            service_name: optional_service_name(req.service_name)?,
            min_price,
            max_price,
            start_date: optional_month(req.start_date, "start_date")?,
            end_date: optional_month(req.end_date, "end_date")?,
            has_end_date,
            limit,
            offset,
        })
    }

    pub fn cost_filter(&self, req: CostRequest) -> Res<CostFilter> {
        let user_id = non_blank(req.user_id)
            .and_then(|raw| Uuid::parse_str(&raw).ok())
            .ok_or_else(|| bad_request("invalid or missing user_id".to_string()))?;
        let period_start = required_month(req.period_start, "period_start")?;
        let period_end = required_month(req.period_end, "period_end")?;
        if period_end < period_start {
            return Err(bad_request(
                "period_end must not precede period_start".to_string(),
            ));
        }

        Ok(CostFilter {
            user_id,
            service_name: optional_service_name(req.service_name)?,
            period_start,
            period_end,
        })
    }
}

fn bad_request(message: String) -> AppError {
    AppError::BadRequest(message)
}

/// Treats empty query values (`?user_id=`) as absent.
fn non_blank(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn service_name(raw: String) -> Res<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(bad_request("service_name is required".to_string()));
    }
    if name.chars().count() > MAX_SERVICE_NAME_LEN {
        return Err(bad_request(format!(
            "service_name must be at most {} characters",
            MAX_SERVICE_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn optional_service_name(raw: Option<String>) -> Res<Option<String>> {
    non_blank(raw).map(service_name).transpose()
}

fn price(raw: i64) -> Res<i32> {
    i32::try_from(raw)
        .ok()
        .filter(|price| *price >= 0)
        .ok_or_else(|| {
            bad_request(format!(
                "price must be an integer between 0 and {}",
                i32::MAX
            ))
        })
}

fn non_negative(raw: Option<String>, field: &str) -> Res<Option<i32>> {
    non_blank(raw)
        .map(|raw| {
            raw.parse::<i32>()
                .ok()
                .filter(|value| *value >= 0)
                .ok_or_else(|| bad_request(format!("{} must be a non-negative integer", field)))
        })
        .transpose()
}

fn required_month(raw: Option<String>, field: &str) -> Res<Month> {
    optional_month(raw, field)?.ok_or_else(|| {
        bad_request(format!(
            "invalid or missing {}, use {} format",
            field, MONTH_FORMAT
        ))
    })
}

fn optional_month(raw: Option<String>, field: &str) -> Res<Option<Month>> {
    non_blank(raw)
        .map(|raw| {
            raw.parse::<Month>().map_err(|_| {
                bad_request(format!("invalid {} format, use {}", field, MONTH_FORMAT))
            })
        })
        .transpose()
}

fn check_active_range(start_date: Month, end_date: Option<Month>) -> Res<()> {
    match end_date {
        Some(end) if end < start_date => Err(bad_request(
            "end_date must not precede start_date".to_string(),
        )),
        _ => Ok(()),
    }
}
