use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec, Volume, VolumeMount};
use model_source_api::consts::MODEL_RUNNER_CONTAINER_NAME;

/// Append-only accessors over a workload template.
pub(crate) struct ModelTemplate<'a> {
    template: &'a mut PodTemplateSpec,
}

impl<'a> ModelTemplate<'a> {
    pub(crate) fn new(template: &'a mut PodTemplateSpec) -> Self {
        Self { template }
    }

    fn pod(&mut self) -> &mut PodSpec {
        self.template.spec.get_or_insert_with(Default::default)
    }

    pub(crate) fn init_containers(&mut self) -> &mut Vec<Container> {
        self.pod()
            .init_containers
            .get_or_insert_with(Default::default)
    }

    pub(crate) fn volumes(&mut self) -> &mut Vec<Volume> {
        self.pod().volumes.get_or_insert_with(Default::default)
    }

    pub(crate) fn volume(&self, name: &str) -> Option<&Volume> {
        self.template
            .spec
            .as_ref()
            .and_then(|pod| pod.volumes.as_ref())
            .and_then(|volumes| volumes.iter().find(|volume| volume.name == name))
    }

    pub(crate) fn model_runners(&mut self) -> impl Iterator<Item = &mut Container> {
        self.pod()
            .containers
            .iter_mut()
            .filter(|container| container.name == MODEL_RUNNER_CONTAINER_NAME)
    }

    /// Returns the environment of the model runner, falling back to the
    /// first container when none is named so.
    pub(crate) fn model_runner_env(&self) -> Vec<EnvVar> {
        let containers = match self.template.spec.as_ref() {
            Some(pod) => &pod.containers,
            None => return Vec::default(),
        };

        containers
            .iter()
            .find(|container| container.name == MODEL_RUNNER_CONTAINER_NAME)
            .or_else(|| containers.first())
            .and_then(|container| container.env.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn env(container: &mut Container) -> &mut Vec<EnvVar> {
    container.env.get_or_insert_with(Default::default)
}

pub(crate) fn volume_mounts(container: &mut Container) -> &mut Vec<VolumeMount> {
    container.volume_mounts.get_or_insert_with(Default::default)
}

/// Appends each variable whose name is not defined yet.
///
/// Existing definitions win, so user-supplied overrides are kept intact.
pub(crate) fn push_env_if_absent(
    env: &mut Vec<EnvVar>,
    vars: impl IntoIterator<Item = EnvVar>,
) -> usize {
    let mut count = 0;
    for var in vars {
        if !env.iter().any(|defined| defined.name == var.name) {
            env.push(var);
            count += 1;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_env(name: &str, value: &str) -> EnvVar {
        EnvVar {
            name: name.into(),
            value: Some(value.into()),
            value_from: None,
        }
    }

    fn make_template(containers: Vec<Container>) -> PodTemplateSpec {
        PodTemplateSpec {
            metadata: None,
            spec: Some(PodSpec {
                containers,
                ..Default::default()
            }),
        }
    }

    #[test]
    fn push_env_keeps_existing() {
        let mut env = vec![make_env("A", "user")];
        let count = push_env_if_absent(
            &mut env,
            vec![make_env("A", "ours"), make_env("B", "ours")],
        );

        assert_eq!(count, 1);
        assert_eq!(env, vec![make_env("A", "user"), make_env("B", "ours")]);
    }

    #[test]
    fn model_runner_env_prefers_named_container() {
        let mut template = make_template(vec![
            Container {
                name: "sidecar".into(),
                env: Some(vec![make_env("SIDECAR", "1")]),
                ..Default::default()
            },
            Container {
                name: MODEL_RUNNER_CONTAINER_NAME.into(),
                env: Some(vec![make_env("HTTP_PROXY", "http://proxy:3128")]),
                ..Default::default()
            },
        ]);

        let template = ModelTemplate::new(&mut template);
        assert_eq!(
            template.model_runner_env(),
            vec![make_env("HTTP_PROXY", "http://proxy:3128")],
        );
    }

    #[test]
    fn model_runner_env_falls_back_to_first_container() {
        let mut template = make_template(vec![Container {
            name: "server".into(),
            env: Some(vec![make_env("HTTP_PROXY", "http://proxy:3128")]),
            ..Default::default()
        }]);

        let template = ModelTemplate::new(&mut template);
        assert_eq!(
            template.model_runner_env(),
            vec![make_env("HTTP_PROXY", "http://proxy:3128")],
        );
    }

    #[test]
    fn accessors_create_missing_spec() {
        let mut template = PodTemplateSpec::default();
        {
            let mut template = ModelTemplate::new(&mut template);
            assert!(template.model_runner_env().is_empty());
            assert_eq!(template.volume("model-volume"), None);
            template.volumes().push(Volume {
                name: "model-volume".into(),
                ..Default::default()
            });
            assert!(template.volume("model-volume").is_some());
        }
        assert!(template.spec.is_some());
    }
}
