//! # Allowance API
//!
//! Typed client for the family allowance backend: parents manage children,
//! allowances and deductions; children build shopping lists, submit them for
//! approval and verify purchases.
//!
//! Authenticated calls run through [`auth_gateway::AuthenticatedRequestGateway`],
//! with [`Session`] as its token store and logout notifier and
//! [`BackendTokenRefresher`] as its refresher. Responses are classified into a
//! parsed body or an [`HttpFailure`] and surfaced as [`ApiError`].
//!
//! ```rust,ignore
//! let session = Arc::new(Session::new());
//! let client = AllowanceClient::new(&ClientConfig::load(None)?, session)?;
//! client.login_child("kid@example.com", "secret").await?;
//! let lists = client.my_lists(ListBucket::Active).await?;
//! ```

mod client;
mod config;
mod endpoints;
mod error;
mod models;
mod refresher;
mod response;
mod session;
mod validation;

#[cfg(test)]
mod tests;

pub use client::{AllowanceClient, ListBucket};
pub use config::{
    ClientConfig, DEFAULT_API_BASE_URL, DEFAULT_LOG_LEVEL, DEFAULT_REFRESH_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS,
};
pub use endpoints::Endpoints;
pub use error::{ApiError, ApiResult};
pub use models::{
    AuthResponse, Child, CreateChildRequest, ListStatus, ListType, MeProfile,
    RegisterParentRequest, Role, ShoppingList, ShoppingListItem, UpdateProfileRequest,
    VerifyItemResponse,
};
pub use refresher::BackendTokenRefresher;
pub use response::{classify, generic_message, HttpFailure, ResponseBody};
pub use session::{Session, SessionState, SessionStateCallback, SessionUser};
pub use validation::MIN_IMAGE_BASE64_LEN;
