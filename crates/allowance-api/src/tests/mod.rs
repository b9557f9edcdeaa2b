//! Client tests against a scripted in-process backend.
//!
//! - `harness.rs`    - MockBackend transport and client builder
//! - `auth.rs`       - Login, registration and logout
//! - `refresh.rs`    - Expired access tokens, refresh and the error taxonomy
//! - `operations.rs` - Children, profile and shopping-list calls

mod operations;
mod refresh;
