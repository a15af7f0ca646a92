//! Backend location and URL construction

use url::Url;

use crate::error::{ApiError, ApiResult};
use crate::model::PageRequest;

/// Environment variable holding the backend base URL
pub const ENV_API_URL: &str = "UMBRA_API_URL";

/// Backend used when nothing is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000";

/// Where the site talks to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteConfig {
    api_url: Url,
}

impl SiteConfig {
    /// Use `api_url` as the backend base URL
    pub fn new(api_url: &str) -> ApiResult<Self> {
        let api_url = Url::parse(api_url)
            .map_err(|e| ApiError::InvalidBaseUrl(format!("{}: {}", api_url, e)))?;

        if api_url.cannot_be_a_base() || !matches!(api_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(api_url.to_string()));
        }

        Ok(Self { api_url })
    }

    /// Read `UMBRA_API_URL`, falling back to the local backend
    pub fn from_env() -> ApiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source
    pub fn from_lookup<F>(lookup: F) -> ApiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        match lookup(ENV_API_URL).filter(|value| !value.trim().is_empty()) {
            Some(value) => {
                let config = Self::new(value.trim())?;
                log::info!("API URL from env: {}", config.api_url);
                Ok(config)
            }
            None => Self::new(DEFAULT_API_URL),
        }
    }

    /// Backend base URL
    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    /// URL builder for this backend
    pub fn endpoints(&self) -> Endpoints {
        Endpoints {
            base: self.api_url.clone(),
        }
    }
}

/// Builds request URLs under `{base}/api/v1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// `GET` model listing
    pub fn models(&self, page: PageRequest) -> Url {
        let mut url = self.path(&["models"]);
        url.query_pairs_mut()
            .append_pair("limit", &page.limit.to_string())
            .append_pair("page", &page.page.to_string());
        url
    }

    /// `POST` new model
    pub fn create_model(&self) -> Url {
        self.path(&["models"])
    }

    /// `PATCH` / `DELETE` one model
    pub fn model(&self, id: &str) -> Url {
        self.path(&["models", id])
    }

    /// `POST` login form
    pub fn login(&self) -> Url {
        self.path(&["auth", "login"])
    }

    /// `POST` registration form
    pub fn register(&self) -> Url {
        self.path(&["auth", "register"])
    }

    /// `GET` current user
    pub fn profile(&self) -> Url {
        self.path(&["auth", "me"])
    }

    fn path(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        url.set_query(None);
        url.set_fragment(None);
        // Base URLs are checked in SiteConfig::new, so segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "v1"]).extend(segments);
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn endpoints(base: &str) -> Endpoints {
        SiteConfig::new(base).unwrap().endpoints()
    }

    #[test]
    fn test_default_backend() {
        let config = SiteConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.api_url().as_str(), "http://127.0.0.1:8000/");
        assert_eq!(config, SiteConfig::new(DEFAULT_API_URL).unwrap());
    }

    #[test]
    fn test_env_override() {
        let config =
            SiteConfig::from_lookup(|key| (key == ENV_API_URL).then(|| "https://api.umbra.dev".into()))
                .unwrap();
        assert_eq!(config.api_url().host_str(), Some("api.umbra.dev"));

        let blank = SiteConfig::from_lookup(|_| Some("  ".into())).unwrap();
        assert_eq!(blank.api_url().as_str(), "http://127.0.0.1:8000/");
    }

    #[test]
    fn test_invalid_base() {
        assert!(matches!(SiteConfig::new("not a url"), Err(ApiError::InvalidBaseUrl(_))));
        assert!(matches!(SiteConfig::new("mailto:a@b.c"), Err(ApiError::InvalidBaseUrl(_))));
        assert!(matches!(SiteConfig::new("ftp://host"), Err(ApiError::InvalidBaseUrl(_))));
    }

    #[test]
    fn test_model_urls() {
        let e = endpoints("http://127.0.0.1:8000");
        assert_eq!(
            e.models(PageRequest::default()).as_str(),
            "http://127.0.0.1:8000/api/v1/models?limit=10&page=1"
        );
        assert_eq!(e.create_model().as_str(), "http://127.0.0.1:8000/api/v1/models");
        assert_eq!(e.model("m-1").as_str(), "http://127.0.0.1:8000/api/v1/models/m-1");
    }

    #[test]
    fn test_auth_urls() {
        let e = endpoints("http://127.0.0.1:8000");
        assert_eq!(e.login().path(), "/api/v1/auth/login");
        assert_eq!(e.register().path(), "/api/v1/auth/register");
        assert_eq!(e.profile().path(), "/api/v1/auth/me");
    }

    #[test]
    fn test_base_with_prefix() {
        let e = endpoints("https://example.com/backend/?debug=1");
        assert_eq!(e.login().as_str(), "https://example.com/backend/api/v1/auth/login");
    }

    #[test]
    fn test_model_id_is_escaped() {
        let e = endpoints("http://localhost:8000");
        assert_eq!(e.model("a/b c").path(), "/api/v1/models/a%2Fb%20c");
    }
}
