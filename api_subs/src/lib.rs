use actix_web::web::{self};
use common::error::AppError;

pub mod routes {
    pub mod sub;
}

mod services {
    pub(crate) mod cost;
    pub(crate) mod sub;
}

pub mod dtos {
    pub mod sub;
}

pub mod misc {
    pub mod validate;
}

#[cfg(test)]
mod testing;

pub use misc::validate::Validator;
pub use services::cost::{billed_range, calculate_cost};

/// `/subscriptions` routes. `/cost` is registered ahead of `/{id}` so it is
/// never read as an id.
pub fn mount_subs() -> actix_web::Scope {
    web::scope("/subscriptions")
        .service(routes::sub::post_subscription)
        .service(routes::sub::get_subscriptions)
        .service(routes::sub::get_cost)
        .service(routes::sub::get_subscription)
        .service(routes::sub::put_subscription)
        .service(routes::sub::delete_subscription)
}

/// Answers unreadable JSON bodies with `400 {"error": ...}`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| AppError::BadRequest(format!("invalid request body: {}", err)).into())
}

/// Answers unreadable query strings with `400 {"error": ...}`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::BadRequest(format!("invalid query parameters: {}", err)).into()
    })
}
