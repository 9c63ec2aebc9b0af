use std::sync::Arc;

use tracing::info;

use crate::auth::{jwt::TokenService, repo::UserStore};
use crate::config::AppConfig;
use crate::courses::repo::CourseStore;
use crate::db::PgStore;
use crate::memory::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub tokens: Arc<TokenService>,
    pub users: Arc<dyn UserStore>,
    pub courses: Arc<dyn CourseStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        if config.uses_memory_store() {
            info!("using in-memory store; data is lost on restart");
            let store = Arc::new(MemoryStore::new());
            return Ok(Self::from_parts(config, store.clone(), store));
        }

        let store = Arc::new(PgStore::connect(&config.database_url).await?);
        store.migrate().await?;
        Ok(Self::from_parts(config, store.clone(), store))
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        users: Arc<dyn UserStore>,
        courses: Arc<dyn CourseStore>,
    ) -> Self {
        let tokens = Arc::new(TokenService::new(&config.jwt));
        Self {
            config,
            tokens,
            users,
            courses,
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        Self::fake_with(Arc::new(MemoryStore::new()))
    }

    /// Like [`AppState::fake`], but the caller keeps a handle on the store.
    #[cfg(test)]
    pub fn fake_with(store: Arc<MemoryStore>) -> Self {
        use crate::config::JwtConfig;
        use jsonwebtoken::Algorithm;

        let config = Arc::new(AppConfig {
            database_url: "memory://".into(),
            jwt: JwtConfig {
                secret: "test-secret".into(),
                algorithm: Algorithm::HS256,
                ttl_minutes: crate::config::DEFAULT_TTL_MINUTES,
            },
            cors_origins: vec!["http://localhost:3000".into()],
        });
        Self::from_parts(config, store.clone(), store)
    }
}
