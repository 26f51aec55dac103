use std::{rc::Rc, time::Instant};

use actix_web::{
    Error, HttpResponse,
    body::{self, BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    error::ErrorInternalServerError,
    http::header::{HeaderName, HeaderValue},
};
use colored::Colorize;
use futures::future::{LocalBoxFuture, Ready, ready};
use log::{debug, info};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub struct LoggerMiddleware {
    console_logging_enabled: bool,
}

impl LoggerMiddleware {
    pub fn new(console_logging_enabled: bool) -> Self {
        Self {
            console_logging_enabled,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for LoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = LoggerMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(LoggerMiddlewareService {
            service: Rc::new(service),
            console_logging_enabled: self.console_logging_enabled,
        }))
    }
}

pub struct LoggerMiddlewareService<S> {
    service: Rc<S>,
    console_logging_enabled: bool,
}

impl<S, B> Service<ServiceRequest> for LoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let query_string = req.query_string().to_string();

        // Keep the caller's id when it sent one
        let request_id = req
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let request_id_value = HeaderValue::from_str(&request_id).ok();
        if let Some(value) = &request_id_value {
            req.headers_mut()
                .insert(HeaderName::from_static(REQUEST_ID_HEADER), value.clone());
        }

        let console_logging_enabled = self.console_logging_enabled;
        let srv = Rc::clone(&self.service);

        Box::pin(async move {
            let res = srv.call(req).await?;
            let status = res.status();
            let status_code = status.as_u16();

            // Error bodies are read out for the debug log, so the response is rebuilt
            let mut res = if status_code >= 400 {
                let (req, res) = res.into_parts();
                let headers = res.headers().clone();
                let bytes = body::to_bytes(res.into_body()).await.map_err(|err| {
                    let err: Box<dyn std::error::Error> = err.into();
                    ErrorInternalServerError(err.to_string())
                })?;

                if console_logging_enabled {
                    debug!(
                        "  Response [{}]: {}",
                        request_id,
                        String::from_utf8_lossy(&bytes).bright_yellow()
                    );
                }

                let mut new_res = HttpResponse::build(status);
                for (key, value) in headers.iter() {
                    new_res.insert_header((key.clone(), value.clone()));
                }
                ServiceResponse::new(req, new_res.body(bytes))
            } else {
                res.map_into_boxed_body()
            };

            if let Some(value) = request_id_value {
                res.headers_mut()
                    .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
            }

            if console_logging_enabled {
                let colored_status = match status_code {
                    200..=299 => status_code.to_string().green(),
                    300..=399 => status_code.to_string().yellow(),
                    400..=499 => status_code.to_string().bright_red(),
                    _ => status_code.to_string().red(),
                };

                let colored_method = match method.as_str() {
                    "GET" => method.blue(),
                    "POST" => method.yellow(),
                    "PUT" => method.purple(),
                    "DELETE" => method.red(),
                    _ => method.normal(),
                };

                info!(
                    "[{}] {} {} {} request_id={} params={}",
                    colored_status,
                    colored_method,
                    path.bright_white(),
                    format!("({}ms)", started.elapsed().as_millis()).bright_black(),
                    request_id.bright_blue(),
                    query_string.bright_cyan(),
                );
            }

            Ok(res)
        })
    }
}
