// Bearer token supply

use async_trait::async_trait;

/// Yields the access token attached to every request (None = anonymous)
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn token(&self) -> Option<String>;
}

/// Fixed token, e.g. from configuration
#[derive(Debug, Clone, Default)]
pub struct StaticTokenProvider {
    token: Option<String>,
}

impl StaticTokenProvider {
    pub fn new(token: Option<String>) -> Self {
        // Blank tokens are treated as absent
        let token = token.filter(|t| !t.trim().is_empty());
        Self { token }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn token(&self) -> Option<String> {
        self.token.clone()
    }
}
