//! HTTP request handlers, grouped by domain.

pub mod annotation;
pub mod audit;
pub mod edit;
pub mod export;
pub mod file;
pub mod health;
pub mod reset;
pub mod version;

use markhub_service::RequestContext;

/// Build a request context from an optional acting-user field.
pub(crate) fn context_for(user: Option<String>) -> RequestContext {
    RequestContext::new(user.unwrap_or_default())
}
