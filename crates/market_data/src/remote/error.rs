use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP 429: Too Many Requests")]
    RateLimited,

    #[error("HTTP 418: IP has been auto-banned")]
    IpBanned,

    #[error("unexpected HTTP status: {0}")]
    Status(reqwest::StatusCode),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl FetchError {
    /// Both 429 and 418 mean "back off before asking again".
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Self::RateLimited | Self::IpBanned)
    }
}
