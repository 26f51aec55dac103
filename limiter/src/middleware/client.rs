use actix_web::{
    Error,
    body::{BoxBody, MessageBody},
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use common::error::AppError;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::{
    future::Future,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    pin::Pin,
    rc::Rc,
    sync::Arc,
};

/// Stored buckets beyond which idle ones are dropped.
const PRUNE_THRESHOLD: usize = 10_000;

/// Token bucket per client IP address.
#[derive(Clone)]
pub struct ClientRateLimiter {
    limiter: Arc<DefaultKeyedRateLimiter<IpAddr>>,
    trust_proxy_headers: bool,
    prune_threshold: usize,
}

impl ClientRateLimiter {
    /// With `trust_proxy_headers` the client address comes from `Forwarded` /
    /// `X-Forwarded-For`; only enable it behind a proxy that overwrites them.
    pub fn new(permits_per_sec: NonZeroU32, trust_proxy_headers: bool) -> Self {
        let limiter = Arc::new(RateLimiter::keyed(Quota::per_second(permits_per_sec)));
        Self {
            limiter,
            trust_proxy_headers,
            prune_threshold: PRUNE_THRESHOLD,
        }
    }

    pub fn with_prune_threshold(mut self, prune_threshold: usize) -> Self {
        self.prune_threshold = prune_threshold;
        self
    }

    fn check(&self, client: IpAddr) -> bool {
        if self.limiter.len() > self.prune_threshold {
            self.limiter.retain_recent();
            self.limiter.shrink_to_fit();
            log::debug!("Pruned rate limiter, {} buckets left", self.limiter.len());
        }
        self.limiter.check_key(&client).is_ok()
    }
}

impl<S, B> Transform<S, ServiceRequest> for ClientRateLimiter
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Transform = ClientRateLimiterService<S>;
    type InitError = ();
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(ClientRateLimiterService {
            service: Rc::new(service),
            limiter: self.clone(),
        }))
    }
}

pub struct ClientRateLimiterService<S> {
    service: Rc<S>,
    limiter: ClientRateLimiter,
}

impl<S, B> Service<ServiceRequest> for ClientRateLimiterService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let srv = Rc::clone(&self.service);
        let client = client_ip(&req, self.limiter.trust_proxy_headers);
        let allowed = self.limiter.check(client);

        Box::pin(async move {
            if allowed {
                srv.call(req).await.map(|res| res.map_into_boxed_body())
            } else {
                log::warn!("Rate limit exceeded for {}", client);
                Ok(req.error_response(AppError::TooManyRequests(
                    "rate limit exceeded, please try again later".to_string(),
                )))
            }
        })
    }
}

/// Peer address of the connection, or the proxy-reported client address
/// when proxy headers are trusted. Requests with no usable address share
/// one bucket.
fn client_ip(req: &ServiceRequest, trust_proxy_headers: bool) -> IpAddr {
    let forwarded = if trust_proxy_headers {
        req.connection_info().realip_remote_addr().and_then(|addr| {
            addr.parse::<IpAddr>()
                .ok()
                .or_else(|| addr.parse::<SocketAddr>().ok().map(|sock| sock.ip()))
        })
    } else {
        None
    };

    forwarded
        .or_else(|| req.peer_addr().map(|sock| sock.ip()))
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use actix_web::{App, http::StatusCode, rt::time::sleep, test, web};

    use super::*;

    fn one_per_second() -> ClientRateLimiter {
        ClientRateLimiter::new(NonZeroU32::MIN, false)
    }

    fn from_peer(peer: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri("/")
            .peer_addr(format!("{peer}:5000").parse().unwrap())
    }

    #[actix_web::test]
    async fn rejects_requests_over_the_quota() {
        let app = test::init_service(
            App::new()
                .wrap(one_per_second())
                .route("/", web::get().to(|| async { "ok" })),
        )
        .await;

        let req = test::TestRequest::get().uri("/").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = test::read_body(resp).await;
        assert!(String::from_utf8_lossy(&body).contains("error"));
    }

    #[actix_web::test]
    async fn clients_have_separate_buckets() {
        let app = test::init_service(
            App::new()
                .wrap(one_per_second())
                .route("/", web::get().to(|| async { "ok" })),
        )
        .await;

        for peer in ["10.0.0.1", "10.0.0.2"] {
            let req = from_peer(peer).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }

        let req = from_peer("10.0.0.1").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn forwarded_headers_do_not_open_new_buckets() {
        let limiter = one_per_second();
        let app = test::init_service(
            App::new()
                .wrap(limiter.clone())
                .route("/", web::get().to(|| async { "ok" })),
        )
        .await;

        let mut statuses = Vec::new();
        for i in 1..=5 {
            let req = from_peer("192.0.2.4")
                .insert_header(("x-forwarded-for", format!("198.51.100.{i}")))
                .to_request();
            statuses.push(test::call_service(&app, req).await.status());
        }

        assert_eq!(statuses[0], StatusCode::OK);
        assert!(statuses[1..].iter().all(|s| *s == StatusCode::TOO_MANY_REQUESTS));
        assert_eq!(limiter.limiter.len(), 1);
    }

    #[actix_web::test]
    async fn trusted_proxy_headers_name_the_client() {
        let req = from_peer("192.0.2.4")
            .insert_header(("x-forwarded-for", "203.0.113.9"))
            .to_srv_request();
        assert_eq!(client_ip(&req, true), "203.0.113.9".parse::<IpAddr>().unwrap());
        assert_eq!(client_ip(&req, false), "192.0.2.4".parse::<IpAddr>().unwrap());

        let req = from_peer("192.0.2.4").to_srv_request();
        assert_eq!(client_ip(&req, true), "192.0.2.4".parse::<IpAddr>().unwrap());
    }

    #[actix_web::test]
    async fn idle_buckets_are_pruned() {
        let limiter = ClientRateLimiter::new(NonZeroU32::new(1_000).unwrap(), false)
            .with_prune_threshold(4);
        let app = test::init_service(
            App::new()
                .wrap(limiter.clone())
                .route("/", web::get().to(|| async { "ok" })),
        )
        .await;

        for i in 1..=5 {
            let req = from_peer(&format!("10.0.0.{i}")).to_request();
            assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        }
        assert_eq!(limiter.limiter.len(), 5);

        // one cell refills in 1ms at this quota
        sleep(Duration::from_millis(50)).await;

        let req = from_peer("10.0.0.6").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert_eq!(limiter.limiter.len(), 1);
    }
}
