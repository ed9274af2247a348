//! Application state shared across handlers.

use std::sync::Arc;

use shelf_db::Database;

use crate::auth::{Credentials, JwtManager};
use crate::error::ApiError;
use crate::services::{CartService, CatalogService, IdentityService, TagService};

/// Application state shared across all handlers. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    db: Database,
    jwt: JwtManager,
    credentials: Credentials,
}

impl AppState {
    pub fn new(db: Database, jwt: JwtManager) -> Result<Self, ApiError> {
        Ok(Self {
            inner: Arc::new(AppStateInner {
                db,
                jwt,
                credentials: Credentials::new()?,
            }),
        })
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn jwt(&self) -> &JwtManager {
        &self.inner.jwt
    }

    pub fn credentials(&self) -> &Credentials {
        &self.inner.credentials
    }

    pub fn identity(&self) -> IdentityService {
        IdentityService::new(self.clone())
    }

    pub fn tags(&self) -> TagService {
        TagService::new(self.clone())
    }

    pub fn catalog(&self) -> CatalogService {
        CatalogService::new(self.clone())
    }

    pub fn cart(&self) -> CartService {
        CartService::new(self.clone())
    }
}
