use actix_web::{Responder, delete, get, post, put, web};
use common::{error::Res, http::Success};
use db::store::SubscriptionStore;

use crate::{
    dtos::sub::{
        CostRequest, CostResponse, CreateSubscriptionRequest, ListSubscriptionsRequest,
        SubscriptionResponse, UpdateSubscriptionRequest,
    },
    misc::validate::Validator,
    services,
};

/// Creates a subscription.
///
/// Responds `201 Created` with the stored record, including its generated id.
#[post("")]
pub async fn post_subscription(
    store: web::Data<dyn SubscriptionStore>,
    validator: web::Data<Validator>,
    req: web::Json<CreateSubscriptionRequest>,
) -> Res<impl Responder> {
    let data = validator.create_request(req.into_inner())?;
    let subscription = services::sub::create_subscription(store.get_ref(), data).await?;
    Success::created(SubscriptionResponse::from(subscription))
}

/// Lists subscriptions, newest start month first.
///
/// Accepts `user_id`, `service_name`, `min_price`, `max_price`, `start_date`,
/// `end_date`, `has_end_date`, `limit` and `offset` query parameters.
#[get("")]
pub async fn get_subscriptions(
    store: web::Data<dyn SubscriptionStore>,
    validator: web::Data<Validator>,
    query: web::Query<ListSubscriptionsRequest>,
) -> Res<impl Responder> {
    let filter = validator.list_filter(query.into_inner())?;
    let subscriptions = services::sub::get_subscriptions(store.get_ref(), &filter).await?;
    Success::ok(
        subscriptions
            .into_iter()
            .map(SubscriptionResponse::from)
            .collect::<Vec<_>>(),
    )
}

/// Total cost of a user's subscriptions over `period_start..=period_end`,
/// optionally narrowed to one service.
#[get("/cost")]
pub async fn get_cost(
    store: web::Data<dyn SubscriptionStore>,
    validator: web::Data<Validator>,
    query: web::Query<CostRequest>,
) -> Res<impl Responder> {
    let filter = validator.cost_filter(query.into_inner())?;
    let total_cost = services::cost::total_cost(store.get_ref(), &filter).await?;
    Success::ok(CostResponse { total_cost })
}

#[get("/{id}")]
pub async fn get_subscription(
    store: web::Data<dyn SubscriptionStore>,
    validator: web::Data<Validator>,
    id: web::Path<String>,
) -> Res<impl Responder> {
    let id = validator.subscription_id(&id)?;
    let subscription = services::sub::get_subscription(store.get_ref(), id).await?;
    Success::ok(SubscriptionResponse::from(subscription))
}

/// Replaces a subscription's service, price and active months.
#[put("/{id}")]
pub async fn put_subscription(
    store: web::Data<dyn SubscriptionStore>,
    validator: web::Data<Validator>,
    id: web::Path<String>,
    req: web::Json<UpdateSubscriptionRequest>,
) -> Res<impl Responder> {
    let id = validator.subscription_id(&id)?;
    let data = validator.update_request(req.into_inner())?;
    let subscription = services::sub::update_subscription(store.get_ref(), id, data).await?;
    Success::ok(SubscriptionResponse::from(subscription))
}

#[delete("/{id}")]
pub async fn delete_subscription(
    store: web::Data<dyn SubscriptionStore>,
    validator: web::Data<Validator>,
    id: web::Path<String>,
) -> Res<impl Responder> {
    let id = validator.subscription_id(&id)?;
    services::sub::delete_subscription(store.get_ref(), id).await?;
    Success::no_content()
}
