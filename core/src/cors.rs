use actix_cors::Cors;
use actix_web::http::header::{self, HeaderName};

/// `*` allows any origin without credentials; anything else is a single
/// allowed origin that may send credentials.
pub fn middleware(origin: &str) -> Cors {
    let cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::ACCEPT,
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-csrf-token"),
        ])
        .expose_headers(vec![header::LINK, HeaderName::from_static("x-request-id")])
        .max_age(300);

    if origin == "*" {
        cors.allow_any_origin()
    } else {
        cors.allowed_origin(origin).supports_credentials()
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, http::Method, test, web};

    use super::*;

    async fn preflight(
        allowed: &str,
        origin: &str,
    ) -> actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody> {
        let app = test::init_service(
            App::new()
                .wrap(middleware(allowed))
                .route("/subscriptions", web::get().to(|| async { "[]" })),
        )
        .await;

        let req = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/subscriptions")
            .insert_header((header::ORIGIN, origin))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "GET"))
            .to_request();
        test::call_service(&app, req).await
    }

    #[actix_web::test]
    async fn wildcard_accepts_any_origin() {
        let resp = preflight("*", "https://example.com").await;
        assert!(resp.status().is_success());
        assert!(
            resp.headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        );
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_MAX_AGE).unwrap(),
            "300"
        );
        assert!(
            !resp
                .headers()
                .contains_key(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
        );
    }

    #[actix_web::test]
    async fn explicit_origin_supports_credentials() {
        let resp = preflight("https://app.example.com", "https://app.example.com").await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://app.example.com"
        );
        assert_eq!(
            resp.headers()
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
    }
}
