pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    General(String),
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid store URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("invalid multiscales metadata: {0}")]
    InvalidMultiscales(String),
    #[error("invalid channel metadata: {0}")]
    ChannelMetadata(String),
    #[error("not a zarr store: {0}")]
    NotAStore(String),
    #[error(transparent)]
    ArrayCreate(#[from] zarrs::array::ArrayCreateError),
    #[error(transparent)]
    Wrapped(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    pub fn general(message: impl Into<String>) -> Self {
        Self::General(message.into())
    }

    pub fn wrap(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Wrapped(Box::new(error))
    }

    pub(crate) fn multiscales(message: impl Into<String>) -> Self {
        Self::InvalidMultiscales(message.into())
    }

    pub(crate) fn channel(message: impl Into<String>) -> Self {
        Self::ChannelMetadata(message.into())
    }
}
