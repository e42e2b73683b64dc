//! Template engine for rendering microsite pages.
//!
//! Autoescaping is off. Every string handed to a template must already be
//! escaped; the normalizer does that for video fields and [`SiteView`] does
//! it for configuration values.

use std::path::PathBuf;

use minijinja::{AutoEscape, Environment, Error, ErrorKind, Value};
use reelsite_data::text::{escape_html, format_count};
use reelsite_data::{NormalizedVideo, SiteConfig};
use serde::Serialize;

/// Template names.
pub const INDEX_TEMPLATE: &str = "index.html";
pub const VIDEO_TEMPLATE: &str = "video.html";
pub const PLACEHOLDER_TEMPLATE: &str = "disabled.html";

/// A social link in the footer.
#[derive(Debug, Clone, Serialize)]
pub struct SocialLink {
    /// Network name
    pub name: String,
    /// Profile URL
    pub url: String,
}

/// Channel details as shown on pages.
#[derive(Debug, Clone, Serialize)]
pub struct ChannelView {
    pub title: String,
    pub handle: Option<String>,
    pub url: Option<String>,
    /// Formatted subscriber count, `None` when unknown
    pub subscribers: Option<String>,
}

/// Site-wide values, escaped for templates.
#[derive(Debug, Clone, Serialize)]
pub struct SiteView {
    pub name: String,
    pub description: String,
    /// URL prefix for site links, always ends in `/`
    pub root: String,
    pub logo_url: String,
    pub social: Vec<SocialLink>,
    pub channel: ChannelView,
}

impl SiteView {
    /// Build the escaped view of the site configuration.
    pub fn new(config: &SiteConfig, base_url: &str) -> Self {
        let root = format!("{base_url}/");

        let logo = config.logo();
        let logo_url = if logo.starts_with("http://") || logo.starts_with("https://") {
            logo.to_string()
        } else {
            format!("{root}{}", logo.trim_start_matches('/'))
        };

        let social = config
            .social
            .iter()
            .filter(|(_, url)| !url.trim().is_empty())
            .map(|(name, url)| SocialLink {
                name: escape_html(name),
                url: escape_html(url.trim()),
            })
            .collect();

        let handle = config.channel_handle();
        let channel_url = config
            .channel
            .url
            .clone()
            .filter(|u| !u.trim().is_empty())
            .or_else(|| handle.map(|h| format!("https://www.youtube.com/@{h}")));

        Self {
            name: escape_html(config.name()),
            description: escape_html(&config.description()),
            root: escape_html(&root),
            logo_url: escape_html(&logo_url),
            social,
            channel: ChannelView {
                title: escape_html(config.channel_title()),
                handle: handle.map(escape_html),
                url: channel_url.as_deref().map(escape_html),
                subscribers: config.channel.subscriber_count.map(format_count),
            },
        }
    }
}

/// Context for the home page.
#[derive(Debug, Serialize)]
pub struct IndexPage<'a> {
    pub site: &'a SiteView,
    pub videos: &'a [NormalizedVideo],
    /// Escaped category names, in first-seen order
    pub categories: Vec<String>,
    pub video_count: usize,
    pub year: i32,
    pub generator_version: &'static str,
    pub web_page_schema: serde_json::Value,
    pub item_list_schema: serde_json::Value,
}

/// Context for a single video page.
#[derive(Debug, Serialize)]
pub struct VideoPage<'a> {
    pub site: &'a SiteView,
    pub video: &'a NormalizedVideo,
    pub year: i32,
    pub generator_version: &'static str,
    pub site_schema: serde_json::Value,
    pub video_schema: serde_json::Value,
    pub breadcrumb_schema: serde_json::Value,
    pub faq_schema: serde_json::Value,
}

/// Context for the disabled-site placeholder.
#[derive(Debug, Serialize)]
pub struct PlaceholderPage<'a> {
    pub site: &'a SiteView,
    pub year: i32,
}

/// Template engine using minijinja.
pub struct TemplateEngine {
    env: Environment<'static>,
}

impl TemplateEngine {
    /// Create a template engine with the built-in templates.
    pub fn new() -> Self {
        Self::with_overrides(None)
    }

    /// Create a template engine that prefers templates found in `dir`.
    ///
    /// Any template missing from `dir` falls back to the built-in one.
    pub fn with_overrides(dir: Option<PathBuf>) -> Self {
        let mut env = Environment::new();

        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.add_filter("jsonld", jsonld);

        let overrides = dir.map(minijinja::path_loader);
        env.set_loader(move |name| {
            if let Some(loader) = &overrides {
                if let Some(source) = loader(name)? {
                    return Ok(Some(source));
                }
            }
            Ok(builtin_template(name).map(str::to_string))
        });

        Self { env }
    }

    /// Render a page using the specified template.
    pub fn render_page<S: Serialize>(&self, template: &str, context: &S) -> Result<String, Error> {
        let tmpl = self.env.get_template(template)?;
        tmpl.render(context)
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize a value as JSON for an inline `<script type="application/ld+json">`.
///
/// `</` is written as `<\/` so string content cannot close the script element.
fn jsonld(value: Value) -> Result<Value, Error> {
    let json = serde_json::to_string(&value).map_err(|e| {
        Error::new(ErrorKind::InvalidOperation, "value cannot be serialized to JSON")
            .with_source(e)
    })?;
    Ok(Value::from_safe_string(json.replace("</", "<\\/")))
}

fn builtin_template(name: &str) -> Option<&'static str> {
    match name {
        "base.html" => Some(BASE_TEMPLATE),
        INDEX_TEMPLATE => Some(INDEX_PAGE_TEMPLATE),
        VIDEO_TEMPLATE => Some(VIDEO_PAGE_TEMPLATE),
        PLACEHOLDER_TEMPLATE => Some(DISABLED_TEMPLATE),
        _ => None,
    }
}

const BASE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{% block title %}{{ site.name }}{% endblock %}</title>
  <meta name="description" content="{% block description %}{{ site.description }}{% endblock %}">
  <meta name="generator" content="reelsite {{ generator_version }}">
  <link rel="canonical" href="{% block canonical %}{{ site.root }}{% endblock %}">
  <link rel="icon" href="{{ site.root }}favicon.ico">
  <link rel="stylesheet" href="{{ site.root }}assets/reelsite.css">
  {% block head %}{% endblock %}
</head>
<body>
  <header class="site-header">
    <a class="brand" href="{{ site.root }}">
      <img src="{{ site.logo_url }}" alt="" width="28" height="28">
      <span>{{ site.name }}</span>
    </a>
    {% block header %}{% endblock %}
  </header>
  <main>
    {% block content %}{% endblock %}
  </main>
  <footer class="site-footer">
    {% if site.social %}
    <nav class="social">
      {% for link in site.social %}<a href="{{ link.url }}" target="_blank" rel="noopener">{{ link.name }}</a>
      {% endfor %}
    </nav>
    {% endif %}
    <p>&copy; {{ year }} {{ site.name }}</p>
  </footer>
  {% block scripts %}{% endblock %}
</body>
</html>"##;

const INDEX_PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block head %}
  <meta property="og:type" content="website">
  <meta property="og:title" content="{{ site.name }}">
  <meta property="og:description" content="{{ site.description }}">
  <meta property="og:url" content="{{ site.root }}">
  <meta property="og:image" content="{{ site.logo_url }}">
  <script type="application/ld+json">{{ web_page_schema | jsonld }}</script>
  <script type="application/ld+json">{{ item_list_schema | jsonld }}</script>
{% endblock %}

{% block header %}<h1 class="site-title">{{ site.name }}</h1>{% endblock %}

{% block content %}
<section class="channel">
  <p class="channel-description">{{ site.description }}</p>
  <p class="channel-stats">
    {% if site.channel.subscribers %}{{ site.channel.subscribers }} subscribers{% else %}Subscriber count hidden{% endif %}
    &middot; {{ video_count }} videos
  </p>
  {% if site.channel.url %}<a class="button" href="{{ site.channel.url }}" target="_blank" rel="noopener">Visit channel</a>{% endif %}
</section>

<div class="toolbar">
  {% if categories | length > 1 %}
  <nav class="filters">
    <button type="button" class="active" data-category="">All</button>
    {% for category in categories %}<button type="button" data-category="{{ category }}">{{ category }}</button>
    {% endfor %}
  </nav>
  {% endif %}
  <input class="search" type="search" placeholder="Search videos" aria-label="Search videos">
</div>

<ul class="video-grid">
{% for video in videos %}
  <li class="video-card" data-category="{{ video.html.category }}" data-title="{{ video.html.title | lower }}">
    <a href="{{ site.root }}{{ video.path }}">
      <img loading="lazy" src="{{ video.html.thumbnail_url }}" alt="{{ video.html.title }}" width="480" height="360">
      <span class="duration">{{ video.duration }}</span>
      <h2>{{ video.html.title }}</h2>
    </a>
    <p class="meta">{{ video.html.views }} views{% if video.html.uploaded %} &middot; {{ video.html.uploaded }}{% endif %}</p>
  </li>
{% endfor %}
</ul>
{% endblock %}

{% block scripts %}<script src="{{ site.root }}assets/reelsite.js" defer></script>{% endblock %}"##;

const VIDEO_PAGE_TEMPLATE: &str = r##"{% extends "base.html" %}

{% block title %}{{ video.html.title }} | {{ site.name }}{% endblock %}
{% block description %}{{ video.html.short_description }}{% endblock %}
{% block canonical %}{{ video.html.url }}{% endblock %}

{% block head %}
  <meta property="og:type" content="video.other">
  <meta property="og:title" content="{{ video.html.title }}">
  <meta property="og:site_name" content="{{ site.name }}">
  <meta property="og:description" content="{{ video.html.short_description }}">
  <meta property="og:url" content="{{ video.html.url }}">
  <meta property="og:image" content="{{ video.html.thumbnail_url }}">
  <meta name="twitter:card" content="summary_large_image">
  <meta name="twitter:title" content="{{ video.html.title }}">
  <meta name="twitter:image" content="{{ video.html.thumbnail_url }}">
  <script type="application/ld+json">{{ site_schema | jsonld }}</script>
  <script type="application/ld+json">{{ video_schema | jsonld }}</script>
  <script type="application/ld+json">{{ breadcrumb_schema | jsonld }}</script>
  <script type="application/ld+json">{{ faq_schema | jsonld }}</script>
{% endblock %}

{% block header %}<h1 class="page-title">{{ video.html.title }}</h1>{% endblock %}

{% block content %}
<article class="video">
  <div class="player">
    <iframe src="{{ video.html.embed_url }}" title="{{ video.html.title }}" loading="lazy"
      allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture"
      allowfullscreen></iframe>
  </div>
  <p class="stats">
    {{ video.html.views }} views &middot; {{ video.html.likes }} likes &middot;
    {{ video.html.comments }} comments &middot; {{ video.duration }}
  </p>
  {% if video.html.uploaded %}
  <p class="dates">Uploaded {{ video.html.uploaded }}{% if video.html.edited and video.html.edited != video.html.uploaded %} &middot; Updated {{ video.html.edited }}{% endif %}</p>
  {% endif %}
  <p class="channel">
    {{ site.channel.title }}{% if site.channel.handle %} (@{{ site.channel.handle }}){% endif %}
    &middot; {% if site.channel.subscribers %}{{ site.channel.subscribers }} subscribers{% else %}subscriber count unavailable{% endif %}
  </p>
  <div class="description">{{ video.html.description }}</div>
  {% if video.html.tags %}
  <ul class="tags">
    {% for tag in video.html.tags %}<li>{{ tag }}</li>
    {% endfor %}
  </ul>
  {% endif %}
  <a class="button" href="{{ video.html.watch_url }}" target="_blank" rel="noopener">Watch on YouTube</a>
</article>

{% if video.related %}
<aside class="related">
  <h2>More videos</h2>
  <ul>
  {% for item in video.related %}
    <li>
      <a href="{{ site.root }}videos/{{ item.slug }}.html">
        <img loading="lazy" src="{{ item.thumbnail_url }}" alt="" width="160" height="90">
        <span>{{ item.title }}</span>
      </a>
      <small>{{ item.views }} views</small>
    </li>
  {% endfor %}
  </ul>
</aside>
{% endif %}
{% endblock %}"##;

const DISABLED_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <meta name="robots" content="noindex">
  <title>{{ site.name }}</title>
  <style>
    body { margin: 0; min-height: 100vh; display: grid; place-items: center;
      font-family: system-ui, sans-serif; background: #0f0f0f; color: #eee; }
    main { text-align: center; padding: 2rem; }
  </style>
</head>
<body>
  <main>
    <h1>{{ site.name }}</h1>
    <p>This site is currently unavailable. Please check back soon.</p>
    {% if site.channel.url %}<p><a href="{{ site.channel.url }}" style="color:#3ea6ff">Visit the channel</a></p>{% endif %}
  </main>
  <p hidden>&copy; {{ year }}</p>
</body>
</html>"##;
