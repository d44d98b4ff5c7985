use k8s_openapi::api::core::v1::{Container, PodTemplateSpec, Secret};
use model_source_api::secret::{SecretKeyRef, SecretKeyRefValue};
use tracing::{debug, warn};

/// How a secret-backed variable of a container will resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct CredentialPreview {
    pub(crate) container: String,
    pub(crate) name: String,
    pub(crate) secret_name: String,
    pub(crate) value: SecretKeyRefValue,
}

/// Resolves every secret-backed variable of the template against the given
/// secrets, as the kubelet would.
pub(crate) fn preview(template: &PodTemplateSpec, secrets: &[Secret]) -> Vec<CredentialPreview> {
    let pod = match template.spec.as_ref() {
        Some(pod) => pod,
        None => return Vec::default(),
    };

    pod.init_containers
        .iter()
        .flatten()
        .chain(&pod.containers)
        .flat_map(|container| preview_container(container, secrets))
        .collect()
}

fn preview_container<'a>(
    container: &'a Container,
    secrets: &'a [Secret],
) -> impl 'a + Iterator<Item = CredentialPreview> {
    container.env.iter().flatten().filter_map(move |env| {
        let selector = env.value_from.as_ref()?.secret_key_ref.as_ref()?;
        let key_ref = SecretKeyRef {
            secret_name: selector.name.as_deref().unwrap_or_default(),
            key: &selector.key,
        };

        let secret = secrets
            .iter()
            .find(|secret| secret.metadata.name.as_deref() == Some(key_ref.secret_name));

        Some(CredentialPreview {
            container: container.name.clone(),
            name: env.name.clone(),
            secret_name: key_ref.secret_name.into(),
            value: key_ref.resolve(secret),
        })
    })
}

pub(crate) fn report(previews: &[CredentialPreview]) {
    for CredentialPreview {
        container,
        name,
        secret_name,
        value,
    } in previews
    {
        match value {
            SecretKeyRefValue::Present(_) => {
                debug!(%container, %name, secret = %secret_name, "credential is resolved")
            }
            SecretKeyRefValue::Absent => {
                warn!(%container, %name, secret = %secret_name, "credential will be empty")
            }
            SecretKeyRefValue::Malformed(reason) => {
                warn!(%container, %name, secret = %secret_name, "credential is malformed: {reason}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use k8s_openapi::{
        api::core::v1::PodSpec, apimachinery::pkg::apis::meta::v1::ObjectMeta, ByteString,
    };
    use model_source_api::{consts, provider::ModelSourceProvider};
    use model_source_provider::UriProvider;

    use super::*;

    #[test]
    fn preview_loader_credentials() {
        let mut template = PodTemplateSpec {
            metadata: None,
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: consts::MODEL_RUNNER_CONTAINER_NAME.into(),
                    ..Default::default()
                }],
                ..Default::default()
            }),
        };

        let provider =
            UriProvider::try_new("opt-125m", "s3://bucket/opt-125m").expect("provider");
        provider.inject_model_loader(&mut template, 0);

        let secret = Secret {
            metadata: ObjectMeta {
                name: Some(consts::AWS_ACCESS_SECRET_NAME.into()),
                ..Default::default()
            },
            data: Some(
                [(
                    consts::AWS_ACCESS_KEY_ID.to_string(),
                    ByteString(b"AKIA".to_vec()),
                )]
                .into(),
            ),
            ..Default::default()
        };

        let previews = preview(&template, &[secret]);
        let values: Vec<_> = previews
            .iter()
            .map(|preview| (preview.name.as_str(), &preview.value))
            .collect();

        assert_eq!(
            values,
            [
                (
                    consts::AWS_ACCESS_KEY_ID,
                    &SecretKeyRefValue::Present("AKIA".into()),
                ),
                (consts::AWS_ACCESS_KEY_SECRET, &SecretKeyRefValue::Absent),
            ],
        );
        assert!(previews
            .iter()
            .all(|preview| preview.container == consts::MODEL_LOADER_CONTAINER_NAME));
    }

    #[test]
    fn preview_without_spec() {
        assert!(preview(&PodTemplateSpec::default(), &[]).is_empty());
    }
}
