//! schema.org structured data for the generated pages.
//!
//! Plain `serde_json::Value`s; nothing is validated against the vocabulary.

use reelsite_data::text::iso_duration;
use reelsite_data::{NormalizedVideo, SiteConfig};
use serde_json::{json, Map, Value};

/// The home page ItemList lists at most this many videos.
pub const ITEM_LIST_MAX: usize = 20;

const CONTEXT: &str = "https://schema.org";

fn root_url(base_url: &str) -> String {
    format!("{base_url}/")
}

fn org_id(base_url: &str) -> String {
    format!("{base_url}/#org")
}

fn site_id(base_url: &str) -> String {
    format!("{base_url}/#website")
}

/// Resolve a site-relative path against the base URL.
fn absolute_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        path.to_string()
    } else {
        format!("{base_url}/{}", path.trim_start_matches('/'))
    }
}

/// `ItemList` of the first twenty videos, positions starting at 1.
pub fn item_list(videos: &[NormalizedVideo]) -> Value {
    let items: Vec<Value> = videos
        .iter()
        .take(ITEM_LIST_MAX)
        .enumerate()
        .map(|(i, video)| {
            let name = if video.title.is_empty() {
                &video.slug
            } else {
                &video.title
            };
            json!({
                "@type": "ListItem",
                "position": i + 1,
                "url": video.url,
                "name": name,
            })
        })
        .collect();

    json!({
        "@context": CONTEXT,
        "@type": "ItemList",
        "itemListElement": items,
    })
}

/// `WebPage` describing the home page.
pub fn web_page(config: &SiteConfig, base_url: &str) -> Value {
    json!({
        "@context": CONTEXT,
        "@type": "WebPage",
        "name": config.name(),
        "url": root_url(base_url),
        "description": config.description(),
    })
}

/// Site-wide `@graph` of the creator `Organization` and the `WebSite`.
///
/// `sameAs` lists the social links and the channel URL, without duplicates.
pub fn organization_graph(config: &SiteConfig, base_url: &str) -> Value {
    let mut same_as: Vec<String> = Vec::new();
    let channel_url = config.channel.url.clone().or_else(|| {
        config
            .channel_handle()
            .map(|h| format!("https://www.youtube.com/@{h}"))
    });
    let links = config.social.values().cloned().chain(channel_url);
    for link in links.map(|l| l.trim().to_string()) {
        if !link.is_empty() && !same_as.contains(&link) {
            same_as.push(link);
        }
    }

    json!({
        "@context": CONTEXT,
        "@graph": [
            {
                "@type": "Organization",
                "@id": org_id(base_url),
                "name": config.channel_title(),
                "url": root_url(base_url),
                "logo": {
                    "@type": "ImageObject",
                    "url": absolute_url(base_url, config.logo()),
                },
                "sameAs": same_as,
            },
            {
                "@type": "WebSite",
                "@id": site_id(base_url),
                "url": root_url(base_url),
                "name": config.name(),
                "publisher": { "@id": org_id(base_url) },
                "inLanguage": "en",
            },
        ],
    })
}

/// `BreadcrumbList` from the home page to a video page.
pub fn breadcrumb_list(video: &NormalizedVideo, base_url: &str) -> Value {
    let name = if video.title.is_empty() {
        &video.id
    } else {
        &video.title
    };

    json!({
        "@context": CONTEXT,
        "@type": "BreadcrumbList",
        "@id": format!("{}#breadcrumb", video.url),
        "itemListElement": [
            {
                "@type": "ListItem",
                "position": 1,
                "name": "Home",
                "item": root_url(base_url),
            },
            {
                "@type": "ListItem",
                "position": 2,
                "name": name,
                "item": video.url,
            },
        ],
    })
}

/// `VideoObject` for a single video page.
///
/// `duration` is omitted for zero-length videos and `keywords` when the
/// video has no tags.
pub fn video_object(video: &NormalizedVideo, config: &SiteConfig, base_url: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("@context".into(), json!(CONTEXT));
    schema.insert("@type".into(), json!("VideoObject"));
    schema.insert("@id".into(), json!(format!("{}#video", video.url)));
    schema.insert("name".into(), json!(video.title));
    schema.insert("description".into(), json!(video.short_description));
    schema.insert("thumbnailUrl".into(), json!([video.thumbnail_url]));
    schema.insert("uploadDate".into(), json!(video.upload_iso));
    if let Some(duration) = iso_duration(video.duration_seconds) {
        schema.insert("duration".into(), json!(duration));
    }
    schema.insert("embedUrl".into(), json!(video.embed_url));
    schema.insert("contentUrl".into(), json!(video.watch_url));
    schema.insert("url".into(), json!(video.url));
    schema.insert("genre".into(), json!(video.category));
    if !video.tags.is_empty() {
        schema.insert("keywords".into(), json!(video.tags.join(", ")));
    }
    schema.insert(
        "publisher".into(),
        json!({
            "@type": "Organization",
            "@id": org_id(base_url),
            "name": config.channel_title(),
            "url": root_url(base_url),
        }),
    );
    schema.insert(
        "interactionStatistic".into(),
        json!({
            "@type": "InteractionCounter",
            "interactionType": { "@type": "WatchAction" },
            "userInteractionCount": video.view_count,
        }),
    );
    Value::Object(schema)
}

/// Empty `FAQPage` placeholder.
pub fn faq_page() -> Value {
    json!({
        "@context": CONTEXT,
        "@type": "FAQPage",
        "mainEntity": [],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use reelsite_data::normalize::normalize_video;
    use reelsite_data::VideoRecord;

    fn video(id: &str, title: &str) -> NormalizedVideo {
        let record = VideoRecord {
            id: id.to_string(),
            title: Some(title.to_string()),
            ..Default::default()
        };
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        normalize_video(&record, "https://site.example", now)
    }

    #[test]
    fn item_list_caps_at_twenty() {
        let videos: Vec<NormalizedVideo> = (0..25)
            .map(|i| video(&format!("v{i}"), &format!("Video {i}")))
            .collect();

        let schema = item_list(&videos);
        let items = schema["itemListElement"].as_array().unwrap();

        assert_eq!(items.len(), ITEM_LIST_MAX);
        assert_eq!(items[0]["position"], 1);
        assert_eq!(items[19]["position"], 20);
        assert_eq!(items[0]["name"], "Video 0");
        assert_eq!(
            items[0]["url"],
            "https://site.example/videos/video-0-v0.html"
        );
    }

    #[test]
    fn video_object_omits_empty_fields() {
        let v = video("abc", "Clip");
        let schema = video_object(&v, &SiteConfig::default(), "https://site.example");

        assert_eq!(schema["@type"], "VideoObject");
        assert_eq!(schema["name"], "Clip");
        assert!(schema.get("duration").is_none());
        assert!(schema.get("keywords").is_none());
        assert_eq!(schema["embedUrl"], "https://www.youtube.com/embed/abc");
        assert_eq!(schema["interactionStatistic"]["userInteractionCount"], 0);
    }

    #[test]
    fn video_object_includes_duration_and_keywords() {
        let mut v = video("abc", "Clip");
        v.duration_seconds = 95;
        v.tags = vec!["asmr".to_string(), "rain".to_string()];

        let schema = video_object(&v, &SiteConfig::default(), "");

        assert_eq!(schema["duration"], "PT95S");
        assert_eq!(schema["keywords"], "asmr, rain");
    }

    #[test]
    fn web_page_uses_config_fallbacks() {
        let schema = web_page(&SiteConfig::default(), "https://site.example");

        assert_eq!(schema["name"], "My Channel");
        assert_eq!(schema["url"], "https://site.example/");
    }

    #[test]
    fn organization_graph_links_site_to_org() {
        let mut config = SiteConfig {
            name: Some("Mayhem".to_string()),
            ..Default::default()
        };
        config
            .social
            .insert("x".to_string(), "https://x.com/mayhem".to_string());
        config.channel.handle = Some("@mayhem".to_string());

        let schema = organization_graph(&config, "https://site.example");
        let graph = schema["@graph"].as_array().unwrap();

        assert_eq!(graph.len(), 2);
        assert_eq!(graph[0]["@type"], "Organization");
        assert_eq!(graph[0]["@id"], "https://site.example/#org");
        assert_eq!(graph[0]["logo"]["url"], "https://site.example/images/logo.png");
        assert_eq!(
            graph[0]["sameAs"],
            serde_json::json!(["https://x.com/mayhem", "https://www.youtube.com/@mayhem"])
        );
        assert_eq!(graph[1]["@type"], "WebSite");
        assert_eq!(graph[1]["publisher"]["@id"], "https://site.example/#org");
    }

    #[test]
    fn breadcrumb_runs_home_to_video() {
        let v = video("abc", "Clip");

        let schema = breadcrumb_list(&v, "https://site.example");
        let items = schema["itemListElement"].as_array().unwrap();

        assert_eq!(schema["@id"], "https://site.example/videos/clip-abc.html#breadcrumb");
        assert_eq!(items[0]["item"], "https://site.example/");
        assert_eq!(items[1]["position"], 2);
        assert_eq!(items[1]["name"], "Clip");
        assert_eq!(items[1]["item"], "https://site.example/videos/clip-abc.html");
    }

    #[test]
    fn faq_page_is_empty() {
        let schema = faq_page();

        assert_eq!(schema["@type"], "FAQPage");
        assert_eq!(schema["mainEntity"].as_array().unwrap().len(), 0);
    }
}
