use envconfig::Envconfig;

#[derive(Envconfig, Debug, Clone)]
pub struct TokenClientSettings {
    #[envconfig(from = "MSHARD_TOKEN_TIMEOUT_MS", default = "10000")]
    pub timeout_ms: u64,
    #[envconfig(from = "MSHARD_USER_AGENT", default = "mshard/0.1.0")]
    pub user_agent: String,
}

impl Default for TokenClientSettings {
    fn default() -> Self {
        Self {
            timeout_ms: 10_000,
            user_agent: "mshard/0.1.0".to_string(),
        }
    }
}
