use k8s_openapi::api::core::v1::PodTemplateSpec;
use model_source_api::{
    error::{ModelSourceError, Result},
    provider::{
        DynModelSourceProvider, DynModelSourceProviderBuilder, ModelSourceProvider,
        ModelSourceProviderBuilder,
    },
    spec::{ModelSourceOutput, ModelSourceSpec},
};
use tracing::{info, instrument, Level};

use crate::{args::ModelLoaderArgs, uri::UriProviderBuilder};

pub struct ModelSourceSession {
    builders: Vec<DynModelSourceProviderBuilder>,
}

impl Default for ModelSourceSession {
    fn default() -> Self {
        Self::new(ModelLoaderArgs::default())
    }
}

impl ModelSourceSession {
    pub fn new(args: ModelLoaderArgs) -> Self {
        Self {
            builders: vec![Box::new(UriProviderBuilder::new(args))],
        }
    }

    pub fn add_builder<B>(&mut self, builder: B)
    where
        B: 'static + ModelSourceProviderBuilder + Send + Sync,
    {
        self.builders.push(Box::new(builder))
    }

    pub fn load_provider(&self, spec: &ModelSourceSpec) -> Result<DynModelSourceProvider> {
        self.builders
            .iter()
            .find_map(|builder| builder.try_build(spec).transpose())
            .transpose()?
            .ok_or_else(|| ModelSourceError::Unsupported {
                name: spec.name.clone(),
            })
    }

    /// Makes all the given models available to the template.
    ///
    /// The template is left untouched if any of the models is invalid.
    #[instrument(level = Level::INFO, skip_all, err(Display))]
    pub fn inject(
        &self,
        specs: &[ModelSourceSpec],
        template: &mut PodTemplateSpec,
        skip_model_loader: bool,
    ) -> Result<Vec<ModelSourceOutput>> {
        let providers = specs
            .iter()
            .map(|spec| self.load_provider(spec))
            .collect::<Result<Vec<_>>>()?;

        Ok(providers
            .iter()
            .enumerate()
            .map(|(index, provider)| {
                if skip_model_loader {
                    provider.inject_model_env_vars(template);
                }
                if !skip_model_loader || provider.is_node_local() {
                    provider.inject_model_loader(template, index);
                }

                let output = ModelSourceOutput {
                    model_name: provider.model_name().into(),
                    model_path: provider.model_path(skip_model_loader),
                };
                info!(
                    model = %output.model_name,
                    path = %output.model_path,
                    "resolved a model source",
                );
                output
            })
            .collect())
    }
}
