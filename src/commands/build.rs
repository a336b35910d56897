use crate::{build::Builder, config::Config};

use super::{BuildArgs, resolve_path};

pub async fn run(args: &BuildArgs) -> Result<(), anyhow::Error> {
    let root = resolve_path(&args.path)?;

    let mut config = Config::discover(&root)?;
    config.verbose = args.verbose;
    let output = root.join(config.output_dir());

    let builder = Builder::new(root, config);
    let report = builder.build().await?;

    println!(
        "Built site to {} ({} pages, {} static files)",
        output.display(),
        report.pages,
        report.assets
    );

    Ok(())
}
