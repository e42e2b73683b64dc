//! Scaffold reelsite input files in a project.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command in the current directory.
pub async fn run(yes: bool) -> Result<()> {
    tracing::info!("Initializing reelsite...");

    let written = scaffold(Path::new("."), yes)?;
    if written == 0 {
        tracing::warn!("Nothing written, input files already exist. Use --yes to overwrite.");
        return Ok(());
    }

    tracing::info!("Initialization complete!");
    tracing::info!("Edit data/videos.json, then run 'reelsite build'.");

    Ok(())
}

/// Write the starter files under `root`. Existing files are kept unless
/// `overwrite` is set. Returns the number of files written.
pub fn scaffold(root: &Path, overwrite: bool) -> Result<usize> {
    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).context("Failed to create data directory")?;
    fs::create_dir_all(root.join("images")).context("Failed to create images directory")?;

    let files = [
        ("data/site.json", DEFAULT_SITE),
        ("data/videos.json", DEFAULT_VIDEOS),
        ("robots.txt", DEFAULT_ROBOTS),
    ];

    let mut written = 0;
    for (name, content) in files {
        let path = root.join(name);
        if path.exists() && !overwrite {
            tracing::debug!("Keeping existing {}", name);
            continue;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", name))?;
        tracing::info!("Created {}", name);
        written += 1;
    }

    Ok(written)
}

const DEFAULT_SITE: &str = r#"{
  "name": "My Channel",
  "description": "Every upload from My Channel in one place.",
  "logo": "images/logo.png",
  "base_url": "https://example.com",
  "enabled": true,
  "social": {
    "youtube": "https://www.youtube.com/@mychannel"
  },
  "channel": {
    "title": "My Channel",
    "handle": "@mychannel",
    "subscriberCount": 0
  },
  "static_files": [],
  "generate_sitemap": true
}
"#;

const DEFAULT_VIDEOS: &str = r#"[
  {
    "id": "dQw4w9WgXcQ",
    "title": "My first upload",
    "description": "Welcome to the channel!\nMore at https://example.com",
    "tags": ["intro", "welcome"],
    "category": "People & Blogs",
    "upload_date": "2024-01-01T12:00:00Z",
    "view_count": 0,
    "like_count": 0,
    "comment_count": 0,
    "duration_seconds": 212
  }
]
"#;

const DEFAULT_ROBOTS: &str = "User-agent: *\nAllow: /\n";
