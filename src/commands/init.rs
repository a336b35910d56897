use crate::build::paths::{ROUTES_DIR, STATIC_DIR, TEMPLATES_DIR};
use crate::config::{CONFIG_NAMES, Config};

use super::{InitArgs, resolve_path};

const EXAMPLE_POST: &str = "---\ndate: 2022-12-15\ntitle: First Post\n---\ncontent\n";

const EXAMPLE_BASE: &str = "<!DOCTYPE html>\n<html>\n  <body>\n    <main>{{ Content }}</main>\n  </body>\n</html>\n";

const EXAMPLE_INDEX: &str = "{% for post in Posts %}\n<article>\n  <a href=\"{{ post.Link }}\">{{ post.Title }}</a>\n</article>\n{% endfor %}\n";

pub async fn run(args: &InitArgs) -> Result<(), anyhow::Error> {
    let path = resolve_path(&args.path)?;

    if !path.exists() {
        tokio::fs::create_dir_all(&path).await?;
        println!("Created directory {}", path.display());
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!(
            "path leads to a file, expected directory: {}",
            path.display()
        ));
    }

    let config_path = path.join(CONFIG_NAMES[0]);
    if config_path.exists() {
        return Err(anyhow::anyhow!(
            "configuration already exists in this directory: {}",
            config_path.display()
        ));
    }

    let config_text = serde_yaml::to_string(&Config::default())?;
    tokio::fs::write(&config_path, config_text).await?;
    println!("Created config file {}", config_path.display());

    for dir in [ROUTES_DIR, TEMPLATES_DIR, STATIC_DIR] {
        tokio::fs::create_dir_all(path.join(dir)).await?;
    }

    if args.example {
        tokio::fs::create_dir_all(path.join(ROUTES_DIR).join("posts")).await?;
        tokio::fs::write(
            path.join(ROUTES_DIR).join("posts/first-post.md"),
            EXAMPLE_POST,
        )
        .await?;
        tokio::fs::write(path.join(TEMPLATES_DIR).join("base.tmpl"), EXAMPLE_BASE).await?;
        tokio::fs::write(path.join(ROUTES_DIR).join("index.tmpl"), EXAMPLE_INDEX).await?;
        println!("Created example content");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_init_skeleton() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            path: dir.path().to_path_buf(),
            example: false,
        };

        run(&args).await.unwrap();

        assert!(dir.path().join("sable.yaml").is_file());
        assert!(dir.path().join("routes").is_dir());
        assert!(dir.path().join("templates").is_dir());
        assert!(dir.path().join("static").is_dir());
    }

    #[tokio::test]
    async fn test_init_refuses_existing_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sable.yaml"), "").unwrap();

        let args = InitArgs {
            path: dir.path().to_path_buf(),
            example: false,
        };

        assert!(run(&args).await.is_err());
    }

    #[tokio::test]
    async fn test_init_example_builds() {
        let dir = tempfile::tempdir().unwrap();
        let args = InitArgs {
            path: dir.path().to_path_buf(),
            example: true,
        };

        run(&args).await.unwrap();

        let root = dir.path().canonicalize().unwrap();
        let config = crate::config::Config::discover(&root).unwrap();
        let builder = crate::build::Builder::new(root.clone(), config);
        builder.build().await.unwrap();

        let index = std::fs::read_to_string(root.join("build/index.html")).unwrap();
        assert!(index.contains("/posts/first-post/index.html"));
        assert!(index.contains("First Post"));
    }
}
