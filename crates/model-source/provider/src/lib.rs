mod args;
mod session;
mod template;
mod uri;

pub use self::{
    args::ModelLoaderArgs,
    session::ModelSourceSession,
    uri::{ModelUri, UriProvider, UriProviderBuilder},
};
