use k8s_openapi::api::core::v1::{EnvVar, EnvVarSource, Secret, SecretKeySelector};

use crate::consts;

/// A pair of credential keys stored in one well-known secret.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CredentialSecret {
    pub secret_name: &'static str,
    pub access_key_id: &'static str,
    pub access_key_secret: &'static str,
}

impl CredentialSecret {
    /// Shared by S3 and GCS.
    pub const AWS: Self = Self {
        secret_name: consts::AWS_ACCESS_SECRET_NAME,
        access_key_id: consts::AWS_ACCESS_KEY_ID,
        access_key_secret: consts::AWS_ACCESS_KEY_SECRET,
    };

    pub const OSS: Self = Self {
        secret_name: consts::OSS_ACCESS_SECRET_NAME,
        access_key_id: consts::OSS_ACCESS_KEY_ID,
        access_key_secret: consts::OSS_ACCESS_KEY_SECRET,
    };

    pub const fn key_refs(&self) -> [SecretKeyRef<'static>; 2] {
        [
            SecretKeyRef {
                secret_name: self.secret_name,
                key: self.access_key_id,
            },
            SecretKeyRef {
                secret_name: self.secret_name,
                key: self.access_key_secret,
            },
        ]
    }
}

/// A reference to a single key of a secret, exported as an environment
/// variable of the same name.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct SecretKeyRef<'a> {
    pub secret_name: &'a str,
    pub key: &'a str,
}

impl<'a> SecretKeyRef<'a> {
    /// Declares the reference as optional: if the secret or the key does
    /// not exist, the variable resolves to an empty value instead of
    /// blocking the pod admission.
    pub fn to_env_var(&self) -> EnvVar {
        EnvVar {
            name: self.key.into(),
            value: None,
            value_from: Some(EnvVarSource {
                secret_key_ref: Some(SecretKeySelector {
                    key: self.key.into(),
                    name: Some(self.secret_name.into()),
                    optional: Some(true),
                }),
                ..Default::default()
            }),
        }
    }

    /// Resolves the reference the same way the kubelet does for an optional
    /// secret key.
    pub fn resolve(&self, secret: Option<&Secret>) -> SecretKeyRefValue {
        let secret = match secret {
            Some(secret) if secret.metadata.name.as_deref() == Some(self.secret_name) => secret,
            _ => return SecretKeyRefValue::Absent,
        };

        if let Some(value) = secret
            .string_data
            .as_ref()
            .and_then(|data| data.get(self.key))
        {
            return SecretKeyRefValue::Present(value.clone());
        }

        match secret.data.as_ref().and_then(|data| data.get(self.key)) {
            Some(value) => match String::from_utf8(value.0.clone()) {
                Ok(value) => SecretKeyRefValue::Present(value),
                Err(error) => SecretKeyRefValue::Malformed(format!(
                    "key {key:?} of secret {name:?} is not UTF-8: {error}",
                    key = self.key,
                    name = self.secret_name,
                )),
            },
            None => SecretKeyRefValue::Absent,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SecretKeyRefValue {
    Present(String),
    /// Tolerated; the variable is exported with an empty value.
    Absent,
    Malformed(String),
}

#[cfg(test)]
mod tests {
    use k8s_openapi::{apimachinery::pkg::apis::meta::v1::ObjectMeta, ByteString};
    use maplit::btreemap;

    use super::*;

    fn make_secret(name: &str, key: &str, value: Vec<u8>) -> Secret {
        Secret {
            metadata: ObjectMeta {
                name: Some(name.into()),
                ..Default::default()
            },
            data: Some(btreemap! {
                key.into() => ByteString(value),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn env_var_is_optional_secret_ref() {
        let [id, secret] = CredentialSecret::OSS.key_refs();
        let env = id.to_env_var();

        assert_eq!(env.name, consts::OSS_ACCESS_KEY_ID);
        assert_eq!(env.value, None);

        let selector = env
            .value_from
            .and_then(|source| source.secret_key_ref)
            .expect("secret key ref");
        assert_eq!(selector.name.as_deref(), Some(consts::OSS_ACCESS_SECRET_NAME));
        assert_eq!(selector.key, consts::OSS_ACCESS_KEY_ID);
        assert_eq!(selector.optional, Some(true));

        assert_eq!(secret.to_env_var().name, consts::OSS_ACCESS_KEY_SECRET);
    }

    #[test]
    fn env_var_serializes_as_pod_spec() {
        let [id, _] = CredentialSecret::AWS.key_refs();
        let value = ::serde_json::to_value(id.to_env_var()).expect("serialize");

        assert_eq!(
            value,
            ::serde_json::json!({
                "name": "AWS_ACCESS_KEY_ID",
                "valueFrom": {
                    "secretKeyRef": {
                        "key": "AWS_ACCESS_KEY_ID",
                        "name": "aws-access-secret",
                        "optional": true,
                    },
                },
            }),
        );
    }

    #[test]
    fn resolve_present() {
        let [id, _] = CredentialSecret::AWS.key_refs();
        let secret = make_secret(consts::AWS_ACCESS_SECRET_NAME, id.key, b"AKIA".to_vec());

        assert_eq!(
            id.resolve(Some(&secret)),
            SecretKeyRefValue::Present("AKIA".into()),
        );
    }

    #[test]
    fn resolve_absent_is_empty() {
        let [id, secret_key] = CredentialSecret::AWS.key_refs();
        let secret = make_secret(consts::AWS_ACCESS_SECRET_NAME, id.key, b"AKIA".to_vec());

        assert_eq!(id.resolve(None), SecretKeyRefValue::Absent);
        assert_eq!(secret_key.resolve(Some(&secret)), SecretKeyRefValue::Absent);
    }

    #[test]
    fn resolve_other_secret_is_absent() {
        let [id, _] = CredentialSecret::AWS.key_refs();
        let secret = make_secret(consts::OSS_ACCESS_SECRET_NAME, id.key, b"AKIA".to_vec());

        assert_eq!(id.resolve(Some(&secret)), SecretKeyRefValue::Absent);
    }

    #[test]
    fn resolve_malformed() {
        let [id, _] = CredentialSecret::OSS.key_refs();
        let secret = make_secret(consts::OSS_ACCESS_SECRET_NAME, id.key, vec![0xff, 0xfe]);

        assert!(matches!(
            id.resolve(Some(&secret)),
            SecretKeyRefValue::Malformed(_),
        ));
    }
}
