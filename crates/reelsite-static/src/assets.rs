//! Asset pipeline: the built-in stylesheet and script, plus copying of
//! user-provided static files.

use std::fs;
use std::io;
use std::path::{Component, Path};

use walkdir::WalkDir;

/// Files copied verbatim from the source root when present.
pub const PASSTHROUGH_FILES: &[&str] = &["robots.txt", "sitemap.xml", "ads.txt", "favicon.ico", "CNAME"];

/// Directories copied recursively from the source root when present.
pub const ASSET_DIRS: &[&str] = &["images", "assets"];

/// Asset pipeline utilities.
pub struct AssetPipeline;

impl AssetPipeline {
    /// Generate the site stylesheet.
    pub fn generate_css() -> String {
        DEFAULT_CSS.to_string()
    }

    /// Generate the home page script (category filter and search).
    pub fn generate_js() -> String {
        DEFAULT_JS.to_string()
    }

    /// Minify CSS using lightningcss.
    pub fn minify_css(css: &str) -> Result<String, String> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        let stylesheet = StyleSheet::parse(css, ParserOptions::default())
            .map_err(|e| format!("CSS parse error: {}", e))?;

        let minified = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..Default::default()
            })
            .map_err(|e| format!("CSS minify error: {}", e))?;

        Ok(minified.code)
    }
}

/// Copy a single file. Returns `Ok(false)` if the source does not exist.
pub fn copy_file_if_present(src: &Path, dst: &Path) -> io::Result<bool> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent)?;
    }

    match fs::copy(src, dst) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Recursively copy a directory. Returns the number of files copied, or
/// `None` if the source does not exist. A source that exists but is not a
/// directory, or cannot be inspected, is an error.
pub fn copy_dir_if_present(src: &Path, dst: &Path) -> io::Result<Option<usize>> {
    let metadata = match fs::metadata(src) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    if !metadata.is_dir() {
        return Err(io::Error::other(format!(
            "{} is not a directory",
            src.display()
        )));
    }

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(io::Error::other)?;
        let relative = entry.path().strip_prefix(src).map_err(io::Error::other)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    Ok(Some(copied))
}

/// True if `name` is a plain relative path that stays inside its root.
pub fn is_contained(name: &str) -> bool {
    let path = Path::new(name);
    !name.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

const DEFAULT_CSS: &str = r#"/* reelsite theme */

:root {
  color-scheme: dark;
  --background: #0f0f0f;
  --surface: #161616;
  --border: #222;
  --foreground: #fff;
  --muted: #aaa;
  --accent: #3ea6ff;
  --radius: 12px;
}

* {
  box-sizing: border-box;
}

html,
body {
  overflow-x: hidden;
}

body {
  margin: 0;
  font-family: ui-sans-serif, system-ui, -apple-system, "Segoe UI", Roboto, Arial, sans-serif;
  background: var(--background);
  color: var(--foreground);
  -webkit-text-size-adjust: 100%;
}

img,
iframe {
  display: block;
}

a {
  color: var(--accent);
}

/* Header */
.site-header {
  position: relative;
  display: flex;
  align-items: center;
  gap: 12px;
  padding: 10px 12px;
  border-bottom: 1px solid var(--border);
}

.brand {
  display: flex;
  align-items: center;
  gap: 8px;
  color: var(--foreground);
  font-weight: 700;
  text-decoration: none;
  z-index: 2;
}

.site-title,
.page-title {
  position: absolute;
  left: 50%;
  transform: translateX(-50%);
  margin: 0;
  font-size: clamp(1rem, 2.2vw, 1.35rem);
  font-weight: 800;
  text-align: center;
}

main {
  max-width: 1200px;
  margin: 0 auto;
  padding: 16px;
}

/* Home page */
.channel {
  margin-bottom: 16px;
  color: var(--muted);
}

.toolbar {
  position: sticky;
  top: 0;
  z-index: 20;
  display: flex;
  flex-wrap: wrap;
  gap: 8px;
  padding: 10px 0;
  background: var(--background);
}

.filters {
  display: flex;
  gap: 8px;
  overflow-x: auto;
}

.filters button {
  flex: 0 0 auto;
  padding: 8px 12px;
  border: 1px solid var(--border);
  border-radius: 999px;
  background: var(--surface);
  color: var(--muted);
  cursor: pointer;
  white-space: nowrap;
}

.filters button.active {
  border-color: var(--accent);
  color: var(--foreground);
}

.search {
  flex: 1 1 240px;
  padding: 8px 12px;
  border: 1px solid var(--border);
  border-radius: 999px;
  background: var(--surface);
  color: var(--foreground);
}

.video-grid {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(260px, 1fr));
  gap: 16px;
  padding: 0;
  list-style: none;
}

.video-card a {
  position: relative;
  display: block;
  color: var(--foreground);
  text-decoration: none;
}

.video-card img {
  width: 100%;
  height: auto;
  aspect-ratio: 16 / 9;
  object-fit: cover;
  border-radius: var(--radius);
}

.video-card h2 {
  margin: 8px 0 4px;
  font-size: 1rem;
}

.duration {
  position: absolute;
  top: 8px;
  right: 8px;
  padding: 2px 6px;
  border-radius: 4px;
  background: rgba(0, 0, 0, 0.8);
  font-size: 0.75rem;
}

.meta,
.stats,
.dates {
  margin: 0;
  color: var(--muted);
  font-size: 0.875rem;
}

/* Video page */
.player {
  position: relative;
  aspect-ratio: 16 / 9;
  margin-bottom: 12px;
}

.player iframe {
  width: 100%;
  height: 100%;
  border: 0;
  border-radius: var(--radius);
}

.description {
  margin: 16px 0;
  padding: 12px;
  border-radius: var(--radius);
  background: var(--surface);
  line-height: 1.5;
  overflow-wrap: anywhere;
}

.tags {
  display: flex;
  flex-wrap: wrap;
  gap: 6px;
  padding: 0;
  list-style: none;
}

.tags li {
  padding: 4px 10px;
  border-radius: 999px;
  background: var(--surface);
  color: var(--muted);
  font-size: 0.8rem;
}

.button {
  display: inline-block;
  margin-top: 8px;
  padding: 10px 16px;
  border-radius: 999px;
  background: var(--accent);
  color: #000;
  font-weight: 700;
  text-decoration: none;
}

.related ul {
  display: grid;
  grid-template-columns: repeat(auto-fill, minmax(200px, 1fr));
  gap: 12px;
  padding: 0;
  list-style: none;
}

.related a {
  color: var(--foreground);
  text-decoration: none;
}

.related img {
  width: 100%;
  height: auto;
  border-radius: 8px;
}

.site-footer {
  padding: 24px 12px;
  border-top: 1px solid var(--border);
  color: var(--muted);
  text-align: center;
}

.social {
  display: flex;
  justify-content: center;
  gap: 12px;
}

@media (max-width: 560px) {
  .site-header {
    flex-direction: column;
    align-items: flex-start;
  }

  .site-title,
  .page-title {
    position: static;
    width: 100%;
    transform: none;
  }
}
"#;

const DEFAULT_JS: &str = r#"// reelsite home page: category filter and title search
(function() {
  'use strict';

  const cards = Array.from(document.querySelectorAll('.video-card'));
  const buttons = Array.from(document.querySelectorAll('.filters button'));
  const search = document.querySelector('.search');
  let category = '';

  function apply() {
    const query = search ? search.value.trim().toLowerCase() : '';
    cards.forEach(card => {
      const matchesCategory = !category || card.dataset.category === category;
      const matchesQuery = !query || (card.dataset.title || '').includes(query);
      card.hidden = !(matchesCategory && matchesQuery);
    });
  }

  buttons.forEach(button => {
    button.addEventListener('click', () => {
      buttons.forEach(b => b.classList.remove('active'));
      button.classList.add('active');
      category = button.dataset.category || '';
      apply();
    });
  });

  if (search) {
    search.addEventListener('input', apply);
  }
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn generates_css() {
        let css = AssetPipeline::generate_css();
        assert!(css.contains(":root"));
        assert!(css.contains(".video-grid"));
    }

    #[test]
    fn generates_js() {
        let js = AssetPipeline::generate_js();
        assert!(js.contains("addEventListener"));
        assert!(js.contains("dataset.category"));
    }

    #[test]
    fn minifies_css() {
        let css = r#"
.button {
    background-color: blue;
    padding: 10px;
}
        "#;

        let minified = AssetPipeline::minify_css(css).unwrap();

        assert!(!minified.contains('\n'));
        assert!(minified.contains(".button"));
    }

    #[test]
    fn default_css_minifies() {
        let minified = AssetPipeline::minify_css(&AssetPipeline::generate_css()).unwrap();
        assert!(minified.len() < AssetPipeline::generate_css().len());
    }

    #[test]
    fn copies_directories_recursively() {
        let temp = tempdir().unwrap();
        let src = temp.path().join("images");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("logo.png"), b"png").unwrap();
        fs::write(src.join("nested/thumb.jpg"), b"jpg").unwrap();

        let dst = temp.path().join("out/images");
        let copied = copy_dir_if_present(&src, &dst).unwrap();

        assert_eq!(copied, Some(2));
        assert!(dst.join("nested/thumb.jpg").exists());
    }

    #[test]
    fn missing_sources_are_reported_not_errors() {
        let temp = tempdir().unwrap();

        let dir = copy_dir_if_present(&temp.path().join("nope"), &temp.path().join("out")).unwrap();
        let file = copy_file_if_present(
            &temp.path().join("robots.txt"),
            &temp.path().join("out/robots.txt"),
        )
        .unwrap();

        assert_eq!(dir, None);
        assert!(!file);
    }

    #[test]
    fn file_in_place_of_directory_is_an_error() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("images"), b"not a dir").unwrap();

        let result = copy_dir_if_present(&temp.path().join("images"), &temp.path().join("out"));

        assert!(result.is_err());
    }

    #[test]
    fn directory_in_place_of_file_is_an_error() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("robots.txt")).unwrap();

        let result = copy_file_if_present(
            &temp.path().join("robots.txt"),
            &temp.path().join("out/robots.txt"),
        );

        assert!(result.is_err());
    }

    #[test]
    fn rejects_escaping_paths() {
        assert!(is_contained("robots.txt"));
        assert!(is_contained("google123.html"));
        assert!(is_contained("well-known/token.txt"));
        assert!(!is_contained("../secret"));
        assert!(!is_contained("/etc/passwd"));
        assert!(!is_contained(""));
    }
}
