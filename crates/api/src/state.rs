use std::sync::Arc;

use invoicify_core::{Autosaver, InvoiceService, TokenKeys};

use crate::config::AppConfig;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    service: InvoiceService,
    autosaver: Autosaver,
    tokens: TokenKeys,
    config: AppConfig,
}

impl AppState {
    pub fn new(service: InvoiceService, config: AppConfig) -> Self {
        let autosaver = Autosaver::new(service.clone(), config.autosave_debounce);
        let tokens = TokenKeys::from_secret(config.jwt_secret.as_bytes());
        Self {
            inner: Arc::new(InnerState {
                service,
                autosaver,
                tokens,
                config,
            }),
        }
    }

    pub fn service(&self) -> &InvoiceService {
        &self.inner.service
    }

    pub fn autosaver(&self) -> &Autosaver {
        &self.inner.autosaver
    }

    pub fn tokens(&self) -> &TokenKeys {
        &self.inner.tokens
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }
}
