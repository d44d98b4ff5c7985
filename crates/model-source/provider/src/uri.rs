use std::str::FromStr;

use k8s_openapi::api::core::v1::{
    Container, EmptyDirVolumeSource, EnvVar, HostPathVolumeSource, PodTemplateSpec, Volume,
    VolumeMount,
};
use model_source_api::{
    consts,
    error::{ModelSourceError, Result},
    protocol::ModelSourceProtocol,
    provider::{DynModelSourceProvider, ModelSourceProvider, ModelSourceProviderBuilder},
    secret::SecretKeyRef,
    spec::ModelSourceSpec,
};
use tracing::{debug, warn};

use crate::{
    args::ModelLoaderArgs,
    template::{self, ModelTemplate},
};

/// A parsed model source URI.
///
/// | protocol | form |
/// |---|---|
/// | GCS | `gs://<bucket>/<path>` |
/// | OSS | `oss://<bucket>.<endpoint>/<path>` |
/// | S3 | `s3://<bucket>/<path>` |
/// | OLLAMA | `ollama://<tag>` |
/// | HOST | `host://<absolute path>` |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelUri {
    pub protocol: ModelSourceProtocol,
    pub bucket: Option<String>,
    pub endpoint: Option<String>,
    /// The host path, the object key or the Ollama tag, depending on the protocol.
    pub model_path: String,
}

impl FromStr for ModelUri {
    type Err = ModelSourceError;

    fn from_str(uri: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| ModelSourceError::InvalidUri {
            uri: uri.into(),
            reason,
        };

        let (scheme, address) = uri
            .split_once("://")
            .ok_or_else(|| invalid("missing \"://\""))?;
        let protocol: ModelSourceProtocol =
            scheme
                .parse()
                .map_err(|_| ModelSourceError::UnsupportedProtocol {
                    protocol: scheme.into(),
                })?;

        let split_bucket = || match address.split_once('/') {
            Some((bucket, path)) if !bucket.is_empty() => Ok((bucket.to_string(), path)),
            Some(_) => Err(invalid("empty bucket")),
            None => Err(invalid("missing model path")),
        };

        let (bucket, endpoint, model_path) = match protocol {
            ModelSourceProtocol::Oss => {
                let (authority, path) = split_bucket()?;
                match authority.split_once('.') {
                    Some((bucket, endpoint)) if !bucket.is_empty() && !endpoint.is_empty() => (
                        Some(bucket.to_string()),
                        Some(endpoint.to_string()),
                        path,
                    ),
                    _ => return Err(invalid("expected <bucket>.<endpoint>")),
                }
            }
            ModelSourceProtocol::Gcs | ModelSourceProtocol::S3 => {
                let (bucket, path) = split_bucket()?;
                (Some(bucket), None, path)
            }
            ModelSourceProtocol::Ollama | ModelSourceProtocol::Host => (None, None, address),
        };

        if model_path.is_empty() {
            return Err(invalid("empty model path"));
        }

        Ok(Self {
            protocol,
            bucket,
            endpoint,
            model_path: model_path.into(),
        })
    }
}

/// Loads a model from a URI-described location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UriProvider {
    model_name: String,
    source: ModelUri,
    uri: String,
    loader_image: String,
}

impl UriProvider {
    pub fn try_new(model_name: impl Into<String>, uri: impl Into<String>) -> Result<Self> {
        let model_name = model_name.into();
        let uri = uri.into();
        let source: ModelUri = uri.parse()?;

        if model_name.is_empty() && source.protocol != ModelSourceProtocol::Ollama {
            return Err(ModelSourceError::EmptyModelName);
        }

        Ok(Self {
            model_name,
            source,
            uri,
            loader_image: ModelLoaderArgs::default_loader_image(),
        })
    }

    pub fn with_loader_image(mut self, loader_image: impl Into<String>) -> Self {
        self.loader_image = loader_image.into();
        self
    }

    pub const fn protocol(&self) -> ModelSourceProtocol {
        self.source.protocol
    }

    fn inject_host_path(&self, template: &mut PodTemplateSpec, index: usize) {
        let mut template = ModelTemplate::new(template);
        let name = indexed_name(consts::MODEL_HOST_VOLUME_NAME, index);
        let path = &self.source.model_path;

        template.volumes().push(Volume {
            name: name.clone(),
            host_path: Some(HostPathVolumeSource {
                path: path.clone(),
                type_: None,
            }),
            ..Default::default()
        });

        let mut mounted = 0usize;
        for container in template.model_runners() {
            template::volume_mounts(container).push(VolumeMount {
                name: name.clone(),
                mount_path: path.clone(),
                read_only: Some(true),
                ..Default::default()
            });
            mounted += 1;
        }

        if mounted == 0 {
            warn!(
                model = %self.model_name(),
                "no {container} container to mount the host path",
                container = consts::MODEL_RUNNER_CONTAINER_NAME,
            );
        }
        debug!(model = %self.model_name(), volume = %name, %path, "mounted a host path");
    }

    fn inject_object_store_loader(&self, template: &mut PodTemplateSpec, index: usize) {
        let mut template = ModelTemplate::new(template);
        let name = indexed_name(consts::MODEL_LOADER_CONTAINER_NAME, index);

        // Propagate the runner's context (e.g. proxies) to the loader.
        // Loader variables replace propagated ones, runner credentials are kept.
        let loader_env = self.loader_env();
        let mut env: Vec<_> = template
            .model_runner_env()
            .into_iter()
            .filter(|var| !loader_env.iter().any(|defined| defined.name == var.name))
            .collect();
        env.extend(loader_env);
        template::push_env_if_absent(&mut env, self.credential_env());

        template.init_containers().push(Container {
            name: name.clone(),
            image: Some(self.loader_image.clone()),
            env: Some(env),
            volume_mounts: Some(vec![VolumeMount {
                name: consts::MODEL_VOLUME_NAME.into(),
                mount_path: consts::CONTAINER_MODEL_PATH.into(),
                ..Default::default()
            }]),
            ..Default::default()
        });

        // The shared volume is created once, whatever the number of models
        let shared = template
            .volume(consts::MODEL_VOLUME_NAME)
            .map(|volume| volume.empty_dir.is_some());
        match shared {
            Some(true) => (),
            Some(false) => warn!(
                model = %self.model_name(),
                "volume {volume} is not an emptyDir",
                volume = consts::MODEL_VOLUME_NAME,
            ),
            None => template.volumes().push(Volume {
                name: consts::MODEL_VOLUME_NAME.into(),
                empty_dir: Some(EmptyDirVolumeSource::default()),
                ..Default::default()
            }),
        }
        for container in template.model_runners() {
            let mounts = template::volume_mounts(container);
            if !mounts
                .iter()
                .any(|mount| mount.mount_path == consts::CONTAINER_MODEL_PATH)
            {
                mounts.push(VolumeMount {
                    name: consts::MODEL_VOLUME_NAME.into(),
                    mount_path: consts::CONTAINER_MODEL_PATH.into(),
                    read_only: Some(true),
                    ..Default::default()
                });
            }
        }

        debug!(
            model = %self.model_name(),
            protocol = %self.protocol(),
            container = %name,
            "injected a model loader",
        );
    }

    fn loader_env(&self) -> Vec<EnvVar> {
        let plain = |name: &str, value: &str| EnvVar {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        };

        let mut env = vec![
            plain(
                consts::env::MODEL_SOURCE_TYPE,
                consts::MODEL_SOURCE_MODEL_OBJ_STORE,
            ),
            plain(consts::env::PROVIDER, &self.protocol().to_string()),
        ];
        if let Some(endpoint) = self.source.endpoint.as_deref() {
            env.push(plain(consts::env::ENDPOINT, endpoint));
        }
        env.push(plain(
            consts::env::BUCKET,
            self.source.bucket.as_deref().unwrap_or_default(),
        ));
        env.push(plain(consts::env::MODEL_PATH, &self.source.model_path));
        env
    }

    fn credential_env(&self) -> Vec<EnvVar> {
        self.protocol()
            .credential_secret()
            .map(|secret| {
                secret
                    .key_refs()
                    .iter()
                    .map(SecretKeyRef::to_env_var)
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ModelSourceProvider for UriProvider {
    fn model_name(&self) -> &str {
        match self.source.protocol {
            // the model path stores the ollama model tag
            ModelSourceProtocol::Ollama => &self.source.model_path,
            _ => &self.model_name,
        }
    }

    fn model_path(&self, skip_model_loader: bool) -> String {
        if self.source.protocol == ModelSourceProtocol::Host {
            return self.source.model_path.clone();
        }
        if skip_model_loader {
            return self.uri.clone();
        }

        let filename = self
            .source
            .model_path
            .rsplit('/')
            .next()
            .unwrap_or_default();
        if filename.contains(".gguf") {
            format!("{}{filename}", consts::CONTAINER_MODEL_PATH)
        } else {
            format!("{}models--{filename}", consts::CONTAINER_MODEL_PATH)
        }
    }

    fn inject_model_loader(&self, template: &mut PodTemplateSpec, index: usize) {
        let protocol = self.protocol();
        if protocol == ModelSourceProtocol::Host {
            self.inject_host_path(template, index)
        } else if protocol.is_object_store() {
            self.inject_object_store_loader(template, index)
        }
        // OLLAMA models are pulled by the runtime itself
    }

    fn inject_model_env_vars(&self, template: &mut PodTemplateSpec) {
        let secret = match self.source.protocol.credential_secret() {
            Some(secret) => secret,
            None => return,
        };

        let mut template = ModelTemplate::new(template);
        for container in template.model_runners() {
            let count =
                template::push_env_if_absent(template::env(container), self.credential_env());
            if count > 0 {
                debug!(
                    model = %self.model_name(),
                    secret = %secret.secret_name,
                    count,
                    "injected credential env vars",
                );
            }
        }
    }

    fn is_node_local(&self) -> bool {
        self.source.protocol == ModelSourceProtocol::Host
    }
}

fn indexed_name(name: &str, index: usize) -> String {
    match index {
        0 => name.into(),
        index => format!("{name}-{index}"),
    }
}

/// Builds a [`UriProvider`] for every spec that carries a URI.
#[derive(Clone, Debug, Default)]
pub struct UriProviderBuilder {
    args: ModelLoaderArgs,
}

impl UriProviderBuilder {
    pub const fn new(args: ModelLoaderArgs) -> Self {
        Self { args }
    }
}

impl ModelSourceProviderBuilder for UriProviderBuilder {
    fn try_build(&self, spec: &ModelSourceSpec) -> Result<Option<DynModelSourceProvider>> {
        match spec.uri.as_deref() {
            Some(uri) => UriProvider::try_new(&spec.name, uri)
                .map(|provider| provider.with_loader_image(&self.args.loader_image))
                .map(|provider| Some(Box::new(provider) as DynModelSourceProvider)),
            None => Ok(None),
        }
    }
}
