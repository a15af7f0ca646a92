//! Backend operations
//!
//! The site ships no HTTP client. Hosts implement [`BackendApi`] over
//! whatever transport they have, using [`Endpoints`](crate::Endpoints) for
//! URLs and [`ApiError::from_response`](crate::ApiError::from_response) for
//! non-success answers.

use crate::auth::{AuthResponse, BearerToken, LoginCredentials, RegisterData, User};
use crate::error::ApiResult;
use crate::model::{Model, ModelDraft, ModelsResponse, PageRequest};

/// Model catalogue and authentication backend
#[async_trait::async_trait]
pub trait BackendApi: Send + Sync {
    /// `GET /api/v1/models?limit&page`
    async fn fetch_models(&self, page: PageRequest) -> ApiResult<ModelsResponse>;

    /// `POST /api/v1/models`
    async fn create_model(&self, draft: &ModelDraft, token: Option<&BearerToken>) -> ApiResult<Model>;

    /// `PATCH /api/v1/models/{id}`
    async fn update_model(
        &self,
        id: &str,
        draft: &ModelDraft,
        token: Option<&BearerToken>,
    ) -> ApiResult<Model>;

    /// `DELETE /api/v1/models/{id}`
    async fn delete_model(&self, id: &str, token: Option<&BearerToken>) -> ApiResult<()>;

    /// `POST /api/v1/auth/login` (form data)
    async fn login(&self, credentials: &LoginCredentials) -> ApiResult<AuthResponse>;

    /// `POST /api/v1/auth/register` (form data)
    async fn register(&self, data: &RegisterData) -> ApiResult<AuthResponse>;

    /// `GET /api/v1/auth/me`
    async fn fetch_profile(&self, token: &BearerToken) -> ApiResult<User>;

    /// Fetch every page of the catalogue, `limit` items at a time
    async fn fetch_all_models(&self, limit: u32) -> ApiResult<Vec<Model>> {
        let mut models = Vec::new();
        let mut page = PageRequest::new(limit.max(1), 1);

        loop {
            let response = self.fetch_models(page).await?;
            let received = response.data.len();
            models.extend(response.data);

            let more = match response.meta {
                Some(meta) => meta.has_next(),
                None => received as u32 >= page.limit,
            };
            if !more || received == 0 {
                break;
            }
            page.page += 1;
        }

        log::debug!("Fetched {} model(s) in {} page(s)", models.len(), page.page);
        Ok(models)
    }
}
