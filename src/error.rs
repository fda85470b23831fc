use thiserror::Error;

pub type Result<T> = std::result::Result<T, BenchError>;

#[derive(Debug, Error)]
pub enum BenchError {
    #[error("invalid target url: {0}")]
    InvalidUrl(String),

    #[error("unsupported url scheme: {0}")]
    UnsupportedScheme(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http exchange failed: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("could not build request: {0}")]
    Request(#[from] http::Error),

    #[error("no protocols configured")]
    NoProtocols,
}
