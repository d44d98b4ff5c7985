pub mod error;
pub mod protocol;
pub mod provider;
pub mod secret;
pub mod spec;

pub mod consts {
    /// The directory where staged model files are made visible to the model runner.
    pub const CONTAINER_MODEL_PATH: &str = "/workspace/models/";

    pub const MODEL_LOADER_CONTAINER_NAME: &str = "model-loader";
    pub const MODEL_RUNNER_CONTAINER_NAME: &str = "model-runner";
    /// The emptyDir volume shared by every object-store loader and the model runner.
    pub const MODEL_VOLUME_NAME: &str = "model-volume";
    /// Suffixed by the model index when non-zero.
    pub const MODEL_HOST_VOLUME_NAME: &str = "model-volume-host";

    pub const MODEL_SOURCE_MODEL_OBJ_STORE: &str = "objstore";

    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_ACCESS_KEY_SECRET: &str = "AWS_SECRET_ACCESS_KEY";
    pub const AWS_ACCESS_SECRET_NAME: &str = "aws-access-secret";

    pub const OSS_ACCESS_KEY_ID: &str = "OSS_ACCESS_KEY_ID";
    pub const OSS_ACCESS_KEY_SECRET: &str = "OSS_ACCESS_KEY_SECRET";
    pub const OSS_ACCESS_SECRET_NAME: &str = "oss-access-secret";

    pub mod env {
        pub const BUCKET: &str = "BUCKET";
        pub const ENDPOINT: &str = "ENDPOINT";
        pub const MODEL_PATH: &str = "MODEL_PATH";
        pub const MODEL_SOURCE_TYPE: &str = "MODEL_SOURCE_TYPE";
        pub const PROVIDER: &str = "PROVIDER";
    }
}
