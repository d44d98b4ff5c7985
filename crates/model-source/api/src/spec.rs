use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A declarative model source, as written by the user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelSourceSpec {
    /// The name of the model resource.
    pub name: String,

    /// A fully-qualified source URI, e.g. `oss://bucket.endpoint/path/to/model`.
    ///
    /// Left empty when the model is served from another kind of source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
}

/// Where the serving process finds a model once the template is applied.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModelSourceOutput {
    pub model_name: String,
    pub model_path: String,
}
