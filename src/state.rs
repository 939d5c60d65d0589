use std::sync::Arc;

use crate::auth::jwt::TokenCodec;
use crate::config::AppConfig;
use crate::mail::{LogMailer, Mailer};
use crate::store::{self, Store};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub config: Arc<AppConfig>,
    pub tokens: TokenCodec,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let store = store::connect(&config).await?;
        let mailer = Arc::new(LogMailer::new(config.frontend_url.clone())) as Arc<dyn Mailer>;
        Self::from_parts(store, config, mailer)
    }

    pub fn from_parts(
        store: Arc<dyn Store>,
        config: AppConfig,
        mailer: Arc<dyn Mailer>,
    ) -> anyhow::Result<Self> {
        let tokens = TokenCodec::new(&config.jwt)?;
        Ok(Self {
            store,
            config: Arc::new(config),
            tokens,
            mailer,
        })
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        let config = AppConfig::for_tests();
        let mailer = Arc::new(LogMailer::new(config.frontend_url.clone())) as Arc<dyn Mailer>;
        let store = Arc::new(store::MemoryStore::new()) as Arc<dyn Store>;
        Self::from_parts(store, config, mailer).expect("test config is valid")
    }
}
