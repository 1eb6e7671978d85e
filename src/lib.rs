pub mod config;
pub mod store;
pub mod structs;
pub mod utils;

use std::sync::Arc;

use libaes::Cipher;

use crate::config::Config;
use crate::utils::app_error::AppError;

/// Everything an operation needs besides its arguments.
pub struct AppState<S: ?Sized> {
    pub store: Arc<S>,
    pub cipher: Arc<Cipher>,
    pub config: Arc<Config>,
}

impl<S: ?Sized> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            cipher: Arc::clone(&self.cipher),
            config: Arc::clone(&self.config),
        }
    }
}

impl<S> AppState<S> {
    pub fn new(store: S, config: Config) -> Result<Self, AppError> {
        Self::from_shared(Arc::new(store), config)
    }
}

impl<S: ?Sized> AppState<S> {
    pub fn from_shared(store: Arc<S>, config: Config) -> Result<Self, AppError> {
        let key = config.secret_key_bytes()?;
        Ok(Self {
            store,
            cipher: Arc::new(Cipher::new_256(&key)),
            config: Arc::new(config),
        })
    }
}
