use chrono::{DateTime, SecondsFormat, Utc};

/// Time the request entered the server.
///
/// Stamped by [`crate::middleware::stamp_request_time`] on every request.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RequestTime(DateTime<Utc>);

impl RequestTime {
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// RFC 3339 with millisecond precision, e.g. `2024-01-01T10:00:00.000Z`.
    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
