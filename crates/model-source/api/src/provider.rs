use k8s_openapi::api::core::v1::PodTemplateSpec;

use crate::{error::Result, spec::ModelSourceSpec};

/// Makes a model available to the serving process of a workload.
pub trait ModelSourceProvider {
    /// The identity of the model as the serving runtime knows it.
    fn model_name(&self) -> &str;

    /// The path the serving process should load the model from.
    ///
    /// When `skip_model_loader` is set, no local copy is staged and the
    /// runtime is expected to fetch the model by itself.
    fn model_path(&self, skip_model_loader: bool) -> String;

    /// Mutates the template so that the model is in place before the model
    /// runner starts.
    ///
    /// `index` tells multiple models of the same workload apart
    /// (e.g. a main model and its draft model).
    fn inject_model_loader(&self, template: &mut PodTemplateSpec, index: usize);

    /// Wires the credentials the serving runtime needs to fetch the model
    /// by itself. Calling it more than once is a no-op.
    fn inject_model_env_vars(&self, template: &mut PodTemplateSpec);

    /// Whether the model already lives on the node and only needs a mount.
    ///
    /// Such models are injected with [`Self::inject_model_loader`] even
    /// when the runtime fetches the other models by itself.
    fn is_node_local(&self) -> bool {
        false
    }
}

pub type DynModelSourceProvider = Box<dyn ModelSourceProvider + Send + Sync>;

pub trait ModelSourceProviderBuilder {
    /// Returns `Ok(None)` if the spec belongs to another kind of provider.
    fn try_build(&self, spec: &ModelSourceSpec) -> Result<Option<DynModelSourceProvider>>;
}

pub type DynModelSourceProviderBuilder = Box<dyn ModelSourceProviderBuilder + Send + Sync>;
