mod credentials;
mod manifest;
mod tracer;

use std::{env, path::PathBuf, process::exit};

use anyhow::{anyhow, Result};
use clap::{value_parser, ArgAction, Parser, Subcommand};
use k8s_openapi::api::core::v1::{PodTemplateSpec, Secret};
use model_source_api::{provider::ModelSourceProvider, spec::ModelSourceSpec};
use model_source_provider::{ModelLoaderArgs, ModelSourceSession};
use tracing::{error, info};

use crate::manifest::OutputFormat;

fn main() {
    match Args::parse().run() {
        Ok(()) => (),
        Err(error) => {
            error!("{error:#}");
            exit(1)
        }
    }
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(flatten)]
    common: ArgsCommon,

    #[command(subcommand)]
    command: Commands,
}

impl Args {
    fn run(self) -> Result<()> {
        self.common.run()?;
        self.command.run()
    }
}

#[derive(Parser)]
struct ArgsCommon {
    /// Turn debugging information on
    #[arg(short, long, action = ArgAction::Count)]
    #[arg(value_parser = value_parser!(u8).range(..=3))]
    debug: u8,
}

impl ArgsCommon {
    fn run(self) -> Result<()> {
        self.init_tracer();
        Ok(())
    }

    fn init_tracer(&self) {
        const KEY: &str = "RUST_LOG";

        let debug_level = match self.debug {
            0 => "WARN",
            1 => "INFO",
            2 => "DEBUG",
            3 => "TRACE",
            level => unreachable!("too high debug level: {level}"),
        };
        if self.debug > 0 || env::var_os(KEY).is_none() {
            env::set_var(KEY, debug_level);
        }
        tracer::init_once();
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Make the models available to a pod template
    Inject(CommandInject),
    /// Print the path the model runner should load a model from
    Path(CommandPath),
}

impl Commands {
    fn run(self) -> Result<()> {
        match self {
            Self::Inject(command) => command.run(),
            Self::Path(command) => command.run(),
        }
    }
}

#[derive(Parser)]
struct CommandInject {
    #[command(flatten)]
    loader: ModelLoaderArgs,

    /// Set a model source, repeated for additional (e.g. draft) models
    #[arg(
        short,
        long = "model",
        value_name = "NAME=URI",
        value_parser = parse_model,
        required = true,
    )]
    models: Vec<ModelSourceSpec>,

    /// Set the output format
    #[arg(short, long, value_name = "FORMAT", default_value_t = OutputFormat::default())]
    output: OutputFormat,

    /// Set secret manifests to preview the credentials with
    #[arg(long = "secret", value_name = "FILE")]
    secrets: Vec<PathBuf>,

    /// Let the serving runtime fetch the models by itself
    #[arg(long)]
    skip_model_loader: bool,

    /// Set a pod template manifest (YAML or JSON)
    #[arg(short, long, env = "MODEL_SOURCE_TEMPLATE", value_name = "FILE")]
    template: PathBuf,
}

impl CommandInject {
    fn run(self) -> Result<()> {
        let Self {
            loader,
            models,
            output,
            secrets,
            skip_model_loader,
            template: template_path,
        } = self;

        let mut template: PodTemplateSpec = manifest::read(&template_path)?;
        let session = ModelSourceSession::new(loader);
        let outputs = session.inject(&models, &mut template, skip_model_loader)?;

        if !secrets.is_empty() {
            let secrets = secrets
                .iter()
                .map(|path| manifest::read::<Secret>(path))
                .collect::<Result<Vec<_>>>()?;
            credentials::report(&credentials::preview(&template, &secrets));
        }

        info!(
            template = %template_path.display(),
            models = outputs.len(),
            "injected model sources",
        );
        print!("{}", manifest::dump(&template, output)?);
        Ok(())
    }
}

#[derive(Parser)]
struct CommandPath {
    /// Set a model source
    #[arg(short, long, value_name = "NAME=URI", value_parser = parse_model)]
    model: ModelSourceSpec,

    /// Let the serving runtime fetch the model by itself
    #[arg(long)]
    skip_model_loader: bool,
}

impl CommandPath {
    fn run(self) -> Result<()> {
        let Self {
            model,
            skip_model_loader,
        } = self;

        let provider = ModelSourceSession::default().load_provider(&model)?;
        println!("{}", provider.model_path(skip_model_loader));
        Ok(())
    }
}

fn parse_model(s: &str) -> Result<ModelSourceSpec> {
    let (name, uri) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid NAME=URI: no `=` found in `{s}`"))?;

    Ok(ModelSourceSpec {
        name: name.into(),
        uri: Some(uri.into()),
    })
}
