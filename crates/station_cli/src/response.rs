//! HTTP-style response envelope for station lookups.
//!
//! # Responsibility
//! - Map a lookup outcome to a status code and JSON body.
//! - Keep raw store error text out of caller-visible output.
//!
//! # Invariants
//! - `200` carries a JSON array, empty when nothing matched.
//! - `400` is only produced by input validation; `500` by data access.

use serde::Serialize;
use serde_json::{json, Value};
use station_core::{StationQueryService, StationRepository};

/// Route served by an HTTP front-end proxying this lookup.
pub const LOOKUP_ROUTE: &str = "GET /stations/{country}";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResponse {
    pub route: &'static str,
    pub status: u16,
    pub body: Value,
}

impl LookupResponse {
    fn error(status: u16, kind: &str) -> Self {
        Self {
            route: LOOKUP_ROUTE,
            status,
            body: json!({ "error": kind }),
        }
    }

    /// Process exit code for this response.
    pub fn exit_code(&self) -> u8 {
        match self.status {
            200 => 0,
            400 => 2,
            _ => 1,
        }
    }
}

/// Runs one lookup and renders its outcome.
pub fn lookup<R: StationRepository>(
    service: &StationQueryService<R>,
    raw_country: &str,
) -> LookupResponse {
    match service.find_by_country(raw_country) {
        Ok(stations) => match serde_json::to_value(&stations) {
            Ok(body) => LookupResponse {
                route: LOOKUP_ROUTE,
                status: 200,
                body,
            },
            Err(_) => LookupResponse::error(500, "serialization_failed"),
        },
        Err(err) => {
            let kind = err.kind();
            LookupResponse::error(kind.status_code(), kind.as_str())
        }
    }
}
