//! Static site builder.
//!
//! One build is a single pass: load inputs, normalize, then clear the output
//! directory and write everything again. There is no incremental mode and no
//! cleanup of a half-written output after a failure.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::{DateTime, Datelike, SecondsFormat, Utc};
use rayon::prelude::*;
use serde::Serialize;

use reelsite_data::text::{escape_html, parse_datetime, sanitize_slug};
use reelsite_data::{
    load_config, normalize_videos, read_video_list, resolve_base_url, select_videos, ChannelInfo,
    ConfigError, LoadError, NormalizedVideo, SiteConfig, VIDEOS_DIR,
};

use crate::assets::{
    copy_dir_if_present, copy_file_if_present, is_contained, AssetPipeline, ASSET_DIRS,
    PASSTHROUGH_FILES,
};
use crate::schema;
use crate::templates::{
    IndexPage, PlaceholderPage, SiteView, TemplateEngine, VideoPage, INDEX_TEMPLATE,
    PLACEHOLDER_TEMPLATE, VIDEO_TEMPLATE,
};

/// Manifest written to the output root.
pub const MANIFEST_FILE: &str = "meta.json";

/// Flattened video list written to the output root.
pub const VIDEO_LIST_FILE: &str = "videos.json";

/// Video id to slug map written to the output root.
pub const SLUG_MAP_FILE: &str = "slugs.json";

const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Configuration for building a microsite.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Video list (JSON array)
    pub data_file: PathBuf,

    /// Site configuration (JSON object, optional)
    pub config_file: PathBuf,

    /// Root holding `images/`, `assets/` and passthrough files
    pub source_dir: PathBuf,

    /// Output directory, cleared on every build
    pub output_dir: PathBuf,

    /// Directory of template overrides
    pub templates_dir: Option<PathBuf>,

    /// Environment values consulted for the base URL
    pub env: HashMap<String, String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("data/videos.json"),
            config_file: PathBuf::from("data/site.json"),
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("dist"),
            templates_dir: None,
            env: HashMap::new(),
        }
    }
}

/// Result of a build operation.
#[derive(Debug)]
pub struct BuildResult {
    /// Whether the full site was published
    pub enabled: bool,

    /// Number of HTML pages written
    pub pages: usize,

    /// Number of videos published
    pub videos: usize,

    /// Total build time in milliseconds
    pub duration_ms: u64,

    /// Output directory
    pub output_dir: PathBuf,
}

/// Errors that can occur during build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Refusing to clear output directory {0}: it contains build inputs")]
    UnsafeOutput(String),

    #[error("Slug '{slug}' is produced by both {first} and {second}")]
    SlugCollision {
        slug: String,
        first: String,
        second: String,
    },

    #[error("Failed to render template {template}: {message}")]
    TemplateError { template: String, message: String },

    #[error("Failed to copy {path}: {message}")]
    CopyError { path: String, message: String },

    #[error("Failed to write {path}: {message}")]
    WriteError { path: String, message: String },
}

/// Summary of a finished build, written as `meta.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub enabled: bool,
    pub name: String,
    pub slug: String,
    pub generated_at: String,
    pub video_count: usize,
    pub channel: ChannelInfo,
    /// Slug to video id
    pub slugs: BTreeMap<String, String>,
}

/// One entry of `videos.json`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoSummary<'a> {
    id: &'a str,
    slug: &'a str,
    title: &'a str,
    description: &'a str,
    category: &'a str,
    tags: &'a [String],
    upload_date: Option<&'a str>,
    last_edited_date: Option<&'a str>,
    view_count: u64,
    like_count: u64,
    comment_count: u64,
    duration_seconds: u64,
    duration: &'a str,
    url: &'a str,
    thumbnail_url: &'a str,
}

impl<'a> From<&'a NormalizedVideo> for VideoSummary<'a> {
    fn from(v: &'a NormalizedVideo) -> Self {
        Self {
            id: &v.id,
            slug: &v.slug,
            title: &v.title,
            description: &v.short_description,
            category: &v.category,
            tags: &v.tags,
            upload_date: v.upload_date.as_deref(),
            last_edited_date: v.last_edited_date.as_deref(),
            view_count: v.view_count,
            like_count: v.like_count,
            comment_count: v.comment_count,
            duration_seconds: v.duration_seconds,
            duration: &v.duration,
            url: &v.url,
            thumbnail_url: &v.thumbnail_url,
        }
    }
}

/// Static site builder.
pub struct StaticBuilder {
    config: BuildConfig,
    templates: TemplateEngine,
}

impl StaticBuilder {
    /// Create a new static builder.
    pub fn new(config: BuildConfig) -> Self {
        let templates = TemplateEngine::with_overrides(config.templates_dir.clone());
        Self { config, templates }
    }

    /// Build the microsite.
    pub async fn build(&self) -> Result<BuildResult, BuildError> {
        self.build_at(Utc::now())
    }

    /// Build the microsite with a fixed generation time.
    pub fn build_at(&self, now: DateTime<Utc>) -> Result<BuildResult, BuildError> {
        let start = Instant::now();

        // Inputs are validated before the output directory is touched.
        let site = load_config(&self.config.config_file)?;
        let records = read_video_list(&self.config.data_file)?;
        let base_url = resolve_base_url(&site, |key| self.config.env.get(key).cloned());
        let view = SiteView::new(&site, &base_url);

        self.check_output_dir()?;

        if !site.enabled {
            tracing::info!("Site is disabled, writing placeholder only");
            self.clean_output()?;
            self.write_placeholder(&site, &view, now)?;

            return Ok(BuildResult {
                enabled: false,
                pages: 1,
                videos: 0,
                duration_ms: start.elapsed().as_millis() as u64,
                output_dir: self.config.output_dir.clone(),
            });
        }

        let records = select_videos(records, &site.removed)?;
        tracing::info!("Publishing {} videos", records.len());

        let videos = normalize_videos(&records, &base_url, now);
        check_slugs(&videos, site.strict_slugs)?;

        // Pages are independent; render in parallel, write in order.
        let rendered: Vec<(PathBuf, String)> = videos
            .par_iter()
            .map(|video| self.render_video(video, &site, &view, &base_url, now))
            .collect::<Result<_, _>>()?;
        let index_html = self.render_index(&videos, &site, &view, &base_url, now)?;

        self.clean_output()?;
        self.generate_assets(&site)?;
        self.copy_static_files(&site)?;
        if site.generate_sitemap {
            self.generate_sitemap(&videos, &base_url, now)?;
        }

        self.write_file(&self.config.output_dir.join("index.html"), &index_html)?;
        for (path, html) in &rendered {
            tracing::debug!("Writing {}", path.display());
            self.write_file(path, html)?;
        }

        self.write_manifests(&site, &videos, now)?;

        Ok(BuildResult {
            enabled: true,
            pages: rendered.len() + 1,
            videos: videos.len(),
            duration_ms: start.elapsed().as_millis() as u64,
            output_dir: self.config.output_dir.clone(),
        })
    }

    /// Refuse to clear an output directory that holds the build's own inputs.
    fn check_output_dir(&self) -> Result<(), BuildError> {
        let Ok(output) = self.config.output_dir.canonicalize() else {
            return Ok(());
        };

        let inputs = [
            Some(&self.config.source_dir),
            Some(&self.config.data_file),
            Some(&self.config.config_file),
            self.config.templates_dir.as_ref(),
        ];

        for input in inputs.into_iter().flatten() {
            if let Ok(input) = input.canonicalize() {
                if input.starts_with(&output) {
                    return Err(BuildError::UnsafeOutput(output.display().to_string()));
                }
            }
        }

        Ok(())
    }

    /// Remove and recreate the output directory.
    fn clean_output(&self) -> Result<(), BuildError> {
        let out = &self.config.output_dir;

        if out.exists() {
            fs::remove_dir_all(out).map_err(|e| write_error(out, e))?;
        }
        fs::create_dir_all(out).map_err(|e| write_error(out, e))?;

        Ok(())
    }

    fn render_index(
        &self,
        videos: &[NormalizedVideo],
        site: &SiteConfig,
        view: &SiteView,
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Result<String, BuildError> {
        let mut categories: Vec<String> = Vec::new();
        for video in videos {
            if !categories.contains(&video.html.category) {
                categories.push(video.html.category.clone());
            }
        }

        let page = IndexPage {
            site: view,
            videos,
            categories,
            video_count: videos.len(),
            year: now.year(),
            generator_version: GENERATOR_VERSION,
            web_page_schema: schema::web_page(site, base_url),
            item_list_schema: schema::item_list(videos),
        };

        self.render(INDEX_TEMPLATE, &page)
    }

    fn render_video(
        &self,
        video: &NormalizedVideo,
        site: &SiteConfig,
        view: &SiteView,
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Result<(PathBuf, String), BuildError> {
        let page = VideoPage {
            site: view,
            video,
            year: now.year(),
            generator_version: GENERATOR_VERSION,
            site_schema: schema::organization_graph(site, base_url),
            video_schema: schema::video_object(video, site, base_url),
            breadcrumb_schema: schema::breadcrumb_list(video, base_url),
            faq_schema: schema::faq_page(),
        };

        let html = self.render(VIDEO_TEMPLATE, &page)?;
        Ok((self.config.output_dir.join(&video.path), html))
    }

    fn render<S: Serialize>(&self, template: &str, context: &S) -> Result<String, BuildError> {
        self.templates
            .render_page(template, context)
            .map_err(|e| BuildError::TemplateError {
                template: template.to_string(),
                message: format!("{e:#}"),
            })
    }

    /// Placeholder page plus a disabled manifest. Nothing else is written.
    fn write_placeholder(
        &self,
        site: &SiteConfig,
        view: &SiteView,
        now: DateTime<Utc>,
    ) -> Result<(), BuildError> {
        let html = self.render(
            PLACEHOLDER_TEMPLATE,
            &PlaceholderPage {
                site: view,
                year: now.year(),
            },
        )?;
        self.write_file(&self.config.output_dir.join("index.html"), &html)?;

        let manifest = build_manifest(site, false, &[], now);
        self.write_json(&self.config.output_dir.join(MANIFEST_FILE), &manifest)
    }

    /// Write the generated stylesheet and script under `assets/`.
    fn generate_assets(&self, site: &SiteConfig) -> Result<(), BuildError> {
        let assets_dir = self.config.output_dir.join("assets");

        let css = AssetPipeline::generate_css();
        let css = if site.minify {
            AssetPipeline::minify_css(&css).unwrap_or_else(|e| {
                tracing::warn!("Stylesheet minification failed: {}", e);
                css
            })
        } else {
            css
        };

        self.write_file(&assets_dir.join("reelsite.css"), &css)?;
        self.write_file(&assets_dir.join("reelsite.js"), &AssetPipeline::generate_js())
    }

    /// Copy asset directories and passthrough files from the source root.
    ///
    /// Missing sources are logged and skipped; any other I/O error fails the
    /// build.
    fn copy_static_files(&self, site: &SiteConfig) -> Result<(), BuildError> {
        let src = &self.config.source_dir;
        let out = &self.config.output_dir;

        for dir in ASSET_DIRS {
            match copy_dir_if_present(&src.join(dir), &out.join(dir)) {
                Ok(Some(count)) => tracing::info!("Copied {} files from {}/", count, dir),
                Ok(None) => tracing::warn!("Asset directory not found: {}", src.join(dir).display()),
                Err(e) => return Err(copy_error(&src.join(dir), e)),
            }
        }

        let extra = site.static_files.iter().map(String::as_str);
        for name in PASSTHROUGH_FILES.iter().copied().chain(extra) {
            if !is_contained(name) {
                tracing::warn!("Skipping static file outside the source root: {}", name);
                continue;
            }

            let from = src.join(name);
            match copy_file_if_present(&from, &out.join(name)) {
                Ok(true) => tracing::debug!("Copied {}", name),
                Ok(false) => tracing::warn!("Static file not found: {}", from.display()),
                Err(e) => return Err(copy_error(&from, e)),
            }
        }

        Ok(())
    }

    /// Write a sitemap covering the home page and every video page.
    fn generate_sitemap(
        &self,
        videos: &[NormalizedVideo],
        base_url: &str,
        now: DateTime<Utc>,
    ) -> Result<(), BuildError> {
        let sitemap = sitemap_xml(videos, base_url, now);
        self.write_file(&self.config.output_dir.join("sitemap.xml"), &sitemap)
    }

    /// Write `meta.json`, `videos.json` and `slugs.json`.
    fn write_manifests(
        &self,
        site: &SiteConfig,
        videos: &[NormalizedVideo],
        now: DateTime<Utc>,
    ) -> Result<(), BuildError> {
        let out = &self.config.output_dir;

        let manifest = build_manifest(site, true, videos, now);
        self.write_json(&out.join(MANIFEST_FILE), &manifest)?;

        let list: Vec<VideoSummary> = videos.iter().map(VideoSummary::from).collect();
        self.write_json(&out.join(VIDEO_LIST_FILE), &list)?;

        let slugs: BTreeMap<&str, &str> = videos
            .iter()
            .map(|v| (v.id.as_str(), v.slug.as_str()))
            .collect();
        self.write_json(&out.join(SLUG_MAP_FILE), &slugs)
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), BuildError> {
        let json = serde_json::to_string_pretty(value).map_err(|e| BuildError::WriteError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        self.write_file(path, &json)
    }

    fn write_file(&self, path: &Path, content: &str) -> Result<(), BuildError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| write_error(parent, e))?;
        }
        fs::write(path, content).map_err(|e| write_error(path, e))
    }
}

/// Build the manifest for a finished build.
pub fn build_manifest(
    site: &SiteConfig,
    enabled: bool,
    videos: &[NormalizedVideo],
    now: DateTime<Utc>,
) -> BuildManifest {
    let mut channel = site.channel.clone();
    channel.title = Some(site.channel_title().to_string());
    channel.handle = site.channel_handle().map(str::to_string);

    BuildManifest {
        enabled,
        name: site.name().to_string(),
        slug: sanitize_slug(site.name()),
        generated_at: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        video_count: videos.len(),
        channel,
        slugs: videos
            .iter()
            .map(|v| (v.slug.clone(), v.id.clone()))
            .collect(),
    }
}

/// Render `sitemap.xml`. Every `<loc>` is XML-escaped.
pub fn sitemap_xml(videos: &[NormalizedVideo], base_url: &str, now: DateTime<Utc>) -> String {
    let today = now.format("%Y-%m-%d").to_string();

    let mut urls = vec![sitemap_url(&format!("{base_url}/"), &today, "daily", "1.0")];

    for video in videos {
        let lastmod = video
            .last_edited_date
            .as_deref()
            .and_then(parse_datetime)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| today.clone());
        urls.push(sitemap_url(&video.url, &lastmod, "weekly", "0.8"));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
{}
</urlset>"#,
        urls.join("\n")
    )
}

fn sitemap_url(loc: &str, lastmod: &str, changefreq: &str, priority: &str) -> String {
    format!(
        "  <url><loc>{}</loc><lastmod>{}</lastmod><changefreq>{}</changefreq><priority>{}</priority></url>",
        escape_html(loc),
        lastmod,
        changefreq,
        priority
    )
}

/// Detect videos sharing a slug.
///
/// Colliding pages overwrite each other (the later video in sort order
/// wins). That is only logged unless `strict` is set.
fn check_slugs(videos: &[NormalizedVideo], strict: bool) -> Result<(), BuildError> {
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for video in videos {
        if let Some(first) = seen.insert(&video.slug, &video.id) {
            if strict {
                return Err(BuildError::SlugCollision {
                    slug: video.slug.clone(),
                    first: first.to_string(),
                    second: video.id.clone(),
                });
            }
            tracing::warn!(
                "Slug '{}' is shared by {} and {}; {}/{}.html will hold {}",
                video.slug,
                first,
                video.id,
                VIDEOS_DIR,
                video.slug,
                video.id
            );
        }
    }

    Ok(())
}

fn write_error(path: &Path, e: std::io::Error) -> BuildError {
    BuildError::WriteError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

fn copy_error(path: &Path, e: std::io::Error) -> BuildError {
    BuildError::CopyError {
        path: path.display().to_string(),
        message: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::{tempdir, TempDir};

    struct Fixture {
        temp: TempDir,
        config: BuildConfig,
    }

    impl Fixture {
        fn new(videos: &str, site: Option<&str>) -> Self {
            let temp = tempdir().unwrap();
            let data = temp.path().join("data");
            fs::create_dir_all(&data).unwrap();
            fs::write(data.join("videos.json"), videos).unwrap();
            if let Some(site) = site {
                fs::write(data.join("site.json"), site).unwrap();
            }

            let config = BuildConfig {
                data_file: data.join("videos.json"),
                config_file: data.join("site.json"),
                source_dir: temp.path().join("site"),
                output_dir: temp.path().join("dist"),
                ..Default::default()
            };

            Self { temp, config }
        }

        fn out(&self) -> PathBuf {
            self.config.output_dir.clone()
        }

        fn html_files(&self, dir: &Path) -> usize {
            fs::read_dir(dir)
                .unwrap()
                .filter_map(|e| e.ok())
                .filter(|e| e.path().extension().is_some_and(|x| x == "html"))
                .count()
        }

        fn read_json(&self, name: &str) -> serde_json::Value {
            let content = fs::read_to_string(self.out().join(name)).unwrap();
            serde_json::from_str(&content).unwrap()
        }
    }

    fn videos_json(n: usize) -> String {
        let items: Vec<String> = (0..n)
            .map(|i| {
                format!(
                    r#"{{ "id": "vid{i}", "title": "Video number {i}", "description": "About {i}", "upload_date": "2024-01-{:02}", "view_count": {} }}"#,
                    i % 28 + 1,
                    i * 100
                )
            })
            .collect();
        format!("[{}]", items.join(","))
    }

    #[tokio::test]
    async fn builds_enabled_site() {
        let fx = Fixture::new(&videos_json(3), None);

        let result = StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        assert!(result.enabled);
        assert_eq!(result.pages, 4);
        assert_eq!(result.videos, 3);
        assert!(fx.out().join("index.html").exists());
        assert_eq!(fx.html_files(&fx.out().join(VIDEOS_DIR)), 3);

        let meta = fx.read_json(MANIFEST_FILE);
        assert_eq!(meta["enabled"], true);
        assert_eq!(meta["videoCount"], 3);
        assert_eq!(meta["name"], "My Channel");
        assert_eq!(meta["slug"], "my-channel");
        assert_eq!(meta["slugs"].as_object().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn slug_map_matches_written_files() {
        let fx = Fixture::new(&videos_json(5), None);

        StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        let slugs = fx.read_json(SLUG_MAP_FILE);
        let slugs = slugs.as_object().unwrap();
        assert_eq!(slugs.len(), 5);

        for i in 0..5 {
            let slug = slugs[&format!("vid{i}")].as_str().unwrap();
            assert!(fx
                .out()
                .join(VIDEOS_DIR)
                .join(format!("{slug}.html"))
                .exists());
        }

        let list = fx.read_json(VIDEO_LIST_FILE);
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 5);
        assert_eq!(list[0]["id"], "vid4");
        assert_eq!(list[0]["viewCount"], 400);
    }

    #[tokio::test]
    async fn disabled_site_writes_placeholder_only() {
        let fx = Fixture::new(&videos_json(4), Some(r#"{ "enabled": false, "name": "Paused" }"#));
        fs::create_dir_all(fx.temp.path().join("site/images")).unwrap();
        fs::write(fx.temp.path().join("site/robots.txt"), "User-agent: *").unwrap();

        let result = StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        assert!(!result.enabled);
        assert_eq!(result.pages, 1);
        assert_eq!(fx.html_files(&fx.out()), 1);
        assert!(!fx.out().join(VIDEOS_DIR).exists());
        assert!(!fx.out().join("images").exists());
        assert!(!fx.out().join("robots.txt").exists());
        assert!(!fx.out().join(VIDEO_LIST_FILE).exists());

        let meta = fx.read_json(MANIFEST_FILE);
        assert_eq!(meta["enabled"], false);
        assert_eq!(meta["name"], "Paused");
        assert_eq!(meta["videoCount"], 0);

        let html = fs::read_to_string(fx.out().join("index.html")).unwrap();
        assert!(html.contains("Paused"));
    }

    #[tokio::test]
    async fn disabled_site_ignores_unpublishable_records() {
        let lists = [
            r#"[{ "title": "no id yet" }]"#,
            r#"[{ "id": "a", "deleted": true }]"#,
            r#"[{ "id": "a", "deleted": null, "title": 42 }]"#,
        ];

        for videos in lists {
            let fx = Fixture::new(videos, Some(r#"{ "enabled": false }"#));

            let result = StaticBuilder::new(fx.config.clone()).build().await.unwrap();

            assert!(!result.enabled);
            assert_eq!(fx.html_files(&fx.out()), 1);
            assert_eq!(fx.read_json(MANIFEST_FILE)["enabled"], false);
        }
    }

    #[tokio::test]
    async fn disabled_site_still_requires_a_non_empty_list() {
        let fx = Fixture::new("[]", Some(r#"{ "enabled": false }"#));

        let result = StaticBuilder::new(fx.config.clone()).build().await;

        assert!(matches!(result, Err(BuildError::Load(LoadError::Empty(_)))));
        assert!(!fx.out().exists());
    }

    #[tokio::test]
    async fn enabled_site_needs_a_publishable_video() {
        let fx = Fixture::new(r#"[{ "id": "a", "deleted": true }]"#, None);

        let result = StaticBuilder::new(fx.config.clone()).build().await;

        assert!(matches!(
            result,
            Err(BuildError::Load(LoadError::NothingToPublish))
        ));
        assert!(!fx.out().exists());
    }

    #[tokio::test]
    async fn removed_ids_are_not_published() {
        let fx = Fixture::new(&videos_json(3), Some(r#"{ "removed": ["vid1"] }"#));

        let result = StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        assert_eq!(result.videos, 2);
        assert_eq!(fx.html_files(&fx.out().join(VIDEOS_DIR)), 2);
        let slugs = fx.read_json(SLUG_MAP_FILE);
        assert!(slugs.get("vid1").is_none());
    }

    #[tokio::test]
    async fn ids_differing_in_case_get_separate_pages() {
        let videos = r#"[
  { "id": "dQw4w9WgXcQ", "title": "Rain" },
  { "id": "dqw4w9wgxcq", "title": "Rain" }
]"#;
        let fx = Fixture::new(videos, Some(r#"{ "strict_slugs": true }"#));

        StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        assert_eq!(fx.html_files(&fx.out().join(VIDEOS_DIR)), 2);
        assert_eq!(fx.read_json(MANIFEST_FILE)["slugs"].as_object().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn uncopyable_static_file_fails_the_build() {
        let fx = Fixture::new(&videos_json(1), Some(r#"{ "static_files": ["verify"] }"#));
        fs::create_dir_all(fx.temp.path().join("site/verify")).unwrap();

        let result = StaticBuilder::new(fx.config.clone()).build().await;

        assert!(matches!(result, Err(BuildError::CopyError { .. })));
    }

    #[tokio::test]
    async fn file_in_place_of_asset_directory_fails_the_build() {
        let fx = Fixture::new(&videos_json(1), None);
        fs::create_dir_all(fx.temp.path().join("site")).unwrap();
        fs::write(fx.temp.path().join("site/images"), "not a directory").unwrap();

        let result = StaticBuilder::new(fx.config.clone()).build().await;

        assert!(matches!(result, Err(BuildError::CopyError { .. })));
    }

    #[test]
    fn sitemap_escapes_every_location() {
        let sitemap = sitemap_xml(&[], "https://site.example/?a=1&b=2", Utc::now());

        assert!(sitemap.contains("<loc>https://site.example/?a=1&amp;b=2/</loc>"));
        assert!(!sitemap.contains("&b=2"));
    }

    #[tokio::test]
    async fn empty_video_list_fails_before_output() {
        let fx = Fixture::new("[]", None);
        fs::create_dir_all(fx.out()).unwrap();
        fs::write(fx.out().join("old.html"), "stale").unwrap();

        let result = StaticBuilder::new(fx.config.clone()).build().await;

        assert!(matches!(result, Err(BuildError::Load(LoadError::Empty(_)))));
        assert!(fx.out().join("old.html").exists());
    }

    #[tokio::test]
    async fn clears_previous_output() {
        let fx = Fixture::new(&videos_json(1), None);
        fs::create_dir_all(fx.out().join(VIDEOS_DIR)).unwrap();
        fs::write(fx.out().join(VIDEOS_DIR).join("stale.html"), "old").unwrap();

        StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        assert!(!fx.out().join(VIDEOS_DIR).join("stale.html").exists());
        assert_eq!(fx.html_files(&fx.out().join(VIDEOS_DIR)), 1);
    }

    #[tokio::test]
    async fn copies_assets_and_passthrough_files() {
        let fx = Fixture::new(
            &videos_json(1),
            Some(r#"{ "static_files": ["google123.html", "../escape.txt"] }"#),
        );
        let src = fx.temp.path().join("site");
        fs::create_dir_all(src.join("images")).unwrap();
        fs::write(src.join("images/logo.png"), b"png").unwrap();
        fs::write(src.join("robots.txt"), "User-agent: *").unwrap();
        fs::write(src.join("google123.html"), "google-site-verification").unwrap();

        StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        let out = fx.out();
        assert!(out.join("images/logo.png").exists());
        assert!(out.join("robots.txt").exists());
        assert!(out.join("google123.html").exists());
        assert!(out.join("assets/reelsite.css").exists());
        assert!(out.join("assets/reelsite.js").exists());
        assert!(!out.join("sitemap.xml").exists());
        assert!(!fx.temp.path().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn generates_sitemap_when_configured() {
        let fx = Fixture::new(&videos_json(2), Some(r#"{ "generate_sitemap": true }"#));
        let mut config = fx.config.clone();
        config
            .env
            .insert("SITE_BASE_URL".to_string(), "https://mayhem.example/".to_string());

        StaticBuilder::new(config).build().await.unwrap();

        let sitemap = fs::read_to_string(fx.out().join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://mayhem.example/</loc>"));
        assert!(sitemap.contains("https://mayhem.example/videos/video-number-0-vid0.html"));
        assert!(sitemap.contains("<lastmod>2024-01-01</lastmod>"));
    }

    #[tokio::test]
    async fn duplicate_slugs_overwrite_by_default() {
        let videos = r#"[
  { "id": "same", "title": "Twin" },
  { "id": "same", "title": "Twin" }
]"#;
        let fx = Fixture::new(videos, None);

        let result = StaticBuilder::new(fx.config.clone()).build().await.unwrap();

        assert_eq!(result.videos, 2);
        assert_eq!(fx.html_files(&fx.out().join(VIDEOS_DIR)), 1);
        assert_eq!(fx.read_json(SLUG_MAP_FILE).as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn strict_slugs_reject_collisions_before_output() {
        let videos = r#"[
  { "id": "same", "title": "Twin" },
  { "id": "same", "title": "Twin" }
]"#;
        let fx = Fixture::new(videos, Some(r#"{ "strict_slugs": true }"#));

        let result = StaticBuilder::new(fx.config.clone()).build().await;

        assert!(matches!(result, Err(BuildError::SlugCollision { .. })));
        assert!(!fx.out().exists());
    }

    #[tokio::test]
    async fn refuses_to_clear_inputs() {
        let fx = Fixture::new(&videos_json(1), None);
        let mut config = fx.config.clone();
        config.output_dir = fx.temp.path().join("data");

        let result = StaticBuilder::new(config).build().await;

        assert!(matches!(result, Err(BuildError::UnsafeOutput(_))));
        assert!(fx.temp.path().join("data/videos.json").exists());
    }

    #[test]
    fn manifest_uses_camel_case() {
        let manifest = build_manifest(&SiteConfig::default(), true, &[], Utc::now());
        let json = serde_json::to_value(&manifest).unwrap();

        assert!(json.get("generatedAt").is_some());
        assert!(json.get("videoCount").is_some());
        assert_eq!(json["channel"]["title"], "My Channel");
    }
}
