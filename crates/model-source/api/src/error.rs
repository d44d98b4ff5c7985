use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ModelSourceError {
    #[error("model name is empty")]
    EmptyModelName,
    #[error("invalid model source uri {uri:?}: {reason}")]
    InvalidUri { uri: String, reason: &'static str },
    #[error("no model source provider accepts the model: {name}")]
    Unsupported { name: String },
    #[error("unsupported model source protocol: {protocol:?}")]
    UnsupportedProtocol { protocol: String },
}

pub type Result<T, E = ModelSourceError> = ::core::result::Result<T, E>;
