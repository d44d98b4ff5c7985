use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::secret::CredentialSecret;

/// Storage backends a model source URI may point at.
#[derive(
    Copy,
    Clone,
    Debug,
    Display,
    EnumString,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[strum(ascii_case_insensitive)]
pub enum ModelSourceProtocol {
    /// Google Cloud Storage.
    #[serde(rename = "GCS")]
    #[strum(to_string = "GCS", serialize = "GS")]
    Gcs,
    /// Alibaba Cloud Object Storage Service.
    #[serde(rename = "OSS")]
    #[strum(to_string = "OSS")]
    Oss,
    /// Amazon S3 and S3-compatible stores.
    #[serde(rename = "S3")]
    #[strum(to_string = "S3")]
    S3,
    /// Models pulled by the Ollama runtime itself.
    #[serde(rename = "OLLAMA")]
    #[strum(to_string = "OLLAMA")]
    Ollama,
    /// Models already present on the node filesystem.
    #[serde(rename = "HOST")]
    #[strum(to_string = "HOST")]
    Host,
}

impl ModelSourceProtocol {
    pub const fn is_object_store(&self) -> bool {
        match self {
            Self::Gcs | Self::Oss | Self::S3 => true,
            Self::Ollama | Self::Host => false,
        }
    }

    /// Returns the credential secret the serving runtime and the loader
    /// read from, if the protocol needs any.
    pub const fn credential_secret(&self) -> Option<CredentialSecret> {
        match self {
            Self::Gcs | Self::S3 => Some(CredentialSecret::AWS),
            Self::Oss => Some(CredentialSecret::OSS),
            Self::Ollama | Self::Host => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_case_insensitive() {
        assert_eq!("oss".parse(), Ok(ModelSourceProtocol::Oss));
        assert_eq!("S3".parse(), Ok(ModelSourceProtocol::S3));
        assert_eq!("gs".parse(), Ok(ModelSourceProtocol::Gcs));
        assert_eq!("Gcs".parse(), Ok(ModelSourceProtocol::Gcs));
        assert_eq!("ollama".parse(), Ok(ModelSourceProtocol::Ollama));
        assert_eq!("host".parse(), Ok(ModelSourceProtocol::Host));
        assert!("ftp".parse::<ModelSourceProtocol>().is_err());
    }

    #[test]
    fn display_is_canonical() {
        assert_eq!(ModelSourceProtocol::Gcs.to_string(), "GCS");
        assert_eq!(ModelSourceProtocol::Oss.to_string(), "OSS");
        assert_eq!(ModelSourceProtocol::Ollama.to_string(), "OLLAMA");
    }

    #[test]
    fn s3_and_gcs_share_credentials() {
        assert_eq!(
            ModelSourceProtocol::S3.credential_secret(),
            ModelSourceProtocol::Gcs.credential_secret(),
        );
        assert_ne!(
            ModelSourceProtocol::S3.credential_secret(),
            ModelSourceProtocol::Oss.credential_secret(),
        );
        assert_eq!(ModelSourceProtocol::Host.credential_secret(), None);
        assert_eq!(ModelSourceProtocol::Ollama.credential_secret(), None);
    }
}
