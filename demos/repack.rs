/// Swap the body of a container's primary export and save the result
///
/// Run with: cargo run --example repack -- Asset.uasset new_body.bin out/Asset.uasset
use anyhow::{bail, Context};
use tracing::Level;
use tracing_subscriber::EnvFilter;
use uasset_rs::{Container, ContainerOptions};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [input, body, output] = args.as_slice() else {
        bail!("usage: repack <input.uasset> <body.bin> <output.uasset>");
    };

    let mut container = Container::open(input, ContainerOptions::default())
        .with_context(|| format!("opening {}", input))?;

    let index = container
        .exports()
        .iter()
        .position(|export| !export.ignore)
        .context("no primary export")?;
    let name = container.exports()[index].name.clone();

    let body = std::fs::read(body).with_context(|| format!("reading {}", body))?;
    println!(
        "Replacing {} ({}) with {} bytes",
        name,
        container.asset_kind(),
        body.len()
    );
    container.replace_payload(index, body)?;

    container
        .save(output)
        .with_context(|| format!("saving {}", output))?;
    println!("Saved {}", output);
    Ok(())
}
