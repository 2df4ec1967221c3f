/// Print a container's tables as JSON
///
/// Run with: cargo run --example inspect -- path/to/Asset.uasset [options.toml]
use anyhow::{bail, Context};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use uasset_rs::{Container, ContainerOptions};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let mut args = std::env::args().skip(1);
    let Some(path) = args.next() else {
        bail!("usage: inspect <file.uasset|file.uexp> [options.toml]");
    };

    let options = match args.next() {
        Some(config) => ContainerOptions::load(&config)
            .with_context(|| format!("loading options from {}", config))?,
        None => ContainerOptions::default().with_verbose(true),
    };

    let container =
        Container::open(&path, options).with_context(|| format!("opening {}", path))?;

    println!("{}", container.to_json()?);
    Ok(())
}
