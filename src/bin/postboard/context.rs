use std::sync::Arc;

use thiserror::Error;

use postboard::application::error::AppError;
use postboard::application::posts::PostsService;
use postboard::cache::{CacheConfig, QueryStore};
use postboard::config::{LoadError, Settings};
use postboard::domain::posts::UserId;
use postboard::infra::error::InfraError;
use postboard::infra::http::HttpClient;
use postboard::presentation::OutputFormat;
use postboard::presentation::views::RenderError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything a command needs: the service over a fresh query store and the
/// display preferences. One context lives for one process.
pub struct Ctx {
    pub service: PostsService<HttpClient>,
    pub format: OutputFormat,
    pub post_limit: usize,
    pub user_id: UserId,
}

impl Ctx {
    pub fn new(settings: &Settings, json: bool) -> Result<Self, CliError> {
        let client = HttpClient::from_settings(&settings.api)?;
        let store = QueryStore::new(&CacheConfig::from(&settings.cache));
        Ok(Self {
            service: PostsService::new(Arc::new(client), Arc::new(store)),
            format: OutputFormat::from_json_flag(json),
            post_limit: settings.display.post_limit.get(),
            user_id: settings.api.user_id,
        })
    }
}
