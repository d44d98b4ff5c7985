use clap::Parser;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Parser)]
#[clap(rename_all = "kebab-case")]
#[serde(rename_all = "camelCase")]
pub struct ModelLoaderArgs {
    /// Set the container image of the model loader
    #[arg(
        long,
        env = "MODEL_LOADER_IMAGE",
        value_name = "IMAGE",
        default_value_t = ModelLoaderArgs::default_loader_image(),
    )]
    #[serde(default = "ModelLoaderArgs::default_loader_image")]
    pub loader_image: String,
}

impl Default for ModelLoaderArgs {
    fn default() -> Self {
        Self {
            loader_image: Self::default_loader_image(),
        }
    }
}

impl ModelLoaderArgs {
    pub fn default_loader_image() -> String {
        "inftyai/model-loader:v0.0.10".into()
    }
}
