//! # umbra_services - Backend Interface
//!
//! Types and URL construction for the site's backend:
//!
//! - **Models**: catalogue listing, create, update and delete
//! - **Auth**: login and registration forms, bearer tokens, current user
//! - **Config**: backend base URL from `UMBRA_API_URL`
//!
//! [`BackendApi`] is the seam a host implements with its HTTP client.

pub mod api;
pub mod auth;
pub mod endpoints;
pub mod error;
pub mod model;

pub use api::BackendApi;
pub use auth::{
    AuthResponse, AuthSession, AuthUser, BearerToken, LoginCredentials, RegisterData, User,
    UserProfileResponse,
};
pub use endpoints::{Endpoints, SiteConfig, DEFAULT_API_URL, ENV_API_URL};
pub use error::{ApiError, ApiResult};
pub use model::{
    Model, ModelConfig, ModelDraft, ModelMetrics, ModelStatus, ModelsResponse, PageMeta,
    PageRequest,
};

/// Prelude
pub mod prelude {
    pub use crate::api::BackendApi;
    pub use crate::auth::{AuthSession, BearerToken, LoginCredentials, RegisterData};
    pub use crate::endpoints::{Endpoints, SiteConfig};
    pub use crate::error::{ApiError, ApiResult};
    pub use crate::model::{Model, ModelDraft, ModelStatus, ModelsResponse, PageRequest};
}
