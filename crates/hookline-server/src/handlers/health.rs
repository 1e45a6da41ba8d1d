//! `GET /healthz`: liveness probe, no authentication.

pub async fn handler() -> &'static str { "ok" }
