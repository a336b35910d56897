use std::net::SocketAddr;

use axum::Router;
use tower_http::services::ServeDir;

use crate::{build::Builder, config::Config};

use super::{ServeArgs, resolve_path};

pub async fn run(args: &ServeArgs) -> Result<(), anyhow::Error> {
    let root = resolve_path(&args.path)?;

    let mut config = Config::discover(&root)?;
    config.verbose = args.verbose;
    let output = root.join(config.output_dir());

    println!("Building site...");
    let builder = Builder::new(root, config);
    let report = builder.build().await?;
    println!("Built {} pages, {} static files", report.pages, report.assets);

    // Serve the output tree with the pretty-URL convention: directory
    // requests fall through to their index.html.
    let serve_dir = ServeDir::new(&output).append_index_html_on_directories(true);
    let app = Router::new().fallback_service(serve_dir);

    let addr: SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;

    let display_host = if args.bind == "0.0.0.0" {
        "localhost"
    } else {
        &args.bind
    };
    let url = format!("http://{}:{}", display_host, args.port);

    println!("\nServing site at {url}");
    println!("Press Ctrl+C to stop\n");

    if args.open
        && let Err(e) = open::that(&url)
    {
        eprintln!("Failed to open browser: {e}");
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
