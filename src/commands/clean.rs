use crate::config::Config;

use super::{CleanArgs, resolve_path};

pub async fn run(args: &CleanArgs) -> Result<(), anyhow::Error> {
    let root = resolve_path(&args.path)?;

    let config = Config::discover(&root)?;
    let output = root.join(config.output_dir());

    if !output.exists() {
        return Ok(());
    }

    // With nothing to preserve the whole output tree goes at once.
    if config.preserve.is_empty() {
        if args.dry_run {
            println!("Would delete {}", output.display());
        } else {
            tokio::fs::remove_dir_all(&output).await?;
            println!("Deleted {}", output.display());
        }

        return Ok(());
    }

    let mut entries = tokio::fs::read_dir(&output).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        if config.preserve.iter().any(|kept| name == kept.as_str()) {
            continue;
        }

        let path = entry.path();
        if args.dry_run {
            println!("Would delete {}", path.display());
            continue;
        }

        if entry.file_type().await?.is_dir() {
            tokio::fs::remove_dir_all(&path).await?;
        } else {
            tokio::fs::remove_file(&path).await?;
        }
        println!("Deleted {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_clean_removes_output() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sable.yaml"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("build/posts")).unwrap();
        std::fs::write(dir.path().join("build/index.html"), "").unwrap();

        let args = CleanArgs {
            path: dir.path().to_path_buf(),
            dry_run: false,
        };
        run(&args).await.unwrap();

        assert!(!dir.path().join("build").exists());
    }

    #[tokio::test]
    async fn test_clean_honors_preserve() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sable.yaml"), "preserve:\n  - CNAME\n").unwrap();
        std::fs::create_dir_all(dir.path().join("build/posts")).unwrap();
        std::fs::write(dir.path().join("build/index.html"), "").unwrap();
        std::fs::write(dir.path().join("build/CNAME"), "example.com\n").unwrap();

        let args = CleanArgs {
            path: dir.path().to_path_buf(),
            dry_run: false,
        };
        run(&args).await.unwrap();

        assert!(dir.path().join("build/CNAME").is_file());
        assert!(!dir.path().join("build/index.html").exists());
        assert!(!dir.path().join("build/posts").exists());
    }

    #[tokio::test]
    async fn test_clean_dry_run_deletes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sable.yaml"), "").unwrap();
        std::fs::create_dir_all(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build/index.html"), "").unwrap();

        let args = CleanArgs {
            path: dir.path().to_path_buf(),
            dry_run: true,
        };
        run(&args).await.unwrap();

        assert!(dir.path().join("build/index.html").is_file());
    }
}
