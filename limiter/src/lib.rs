use std::num::NonZeroU32;

use middleware::client::ClientRateLimiter;

pub mod middleware {
    pub mod client;
}

/// Per-client throttling. Build it once and clone it into every worker so
/// all workers share the same buckets.
pub fn client_middleware(
    permits_per_second: NonZeroU32,
    trust_proxy_headers: bool,
) -> ClientRateLimiter {
    ClientRateLimiter::new(permits_per_second, trust_proxy_headers)
}
