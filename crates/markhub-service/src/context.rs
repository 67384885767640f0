//! Request context carrying the acting user.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Context for the current request.
///
/// MarkHub identifies collaborators by a plain user string supplied by
/// the client; the context is threaded through service calls so every
/// mutation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting user's identifier.
    pub user: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context, defaulting empty users to
    /// `"anonymous"`.
    pub fn new(user: impl Into<String>) -> Self {
        let user = user.into();
        Self {
            user: if user.trim().is_empty() {
                "anonymous".to_string()
            } else {
                user
            },
            request_time: Utc::now(),
        }
    }

    /// An anonymous context.
    pub fn anonymous() -> Self {
        Self::new("anonymous")
    }
}
