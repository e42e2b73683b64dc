//! Derive render-ready videos from input records.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::text::{
    coerce_count, duration_text, escape_html, format_count, iso_datetime, linkify_description,
    parse_datetime, pretty_date, sanitize_slug, short_description, slugify_title,
};
use crate::video::VideoRecord;

/// Category used when a record has none.
pub const DEFAULT_CATEGORY: &str = "People & Blogs";

/// Number of related videos attached to each page.
pub const RELATED_COUNT: usize = 10;

/// Subdirectory holding one page per video.
pub const VIDEOS_DIR: &str = "videos";

/// A video ready for schema building and rendering.
///
/// Top-level fields are raw values (for JSON output). Everything under
/// `html` is escaped and safe to insert into templates verbatim.
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedVideo {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub description: String,
    pub short_description: String,
    pub tags: Vec<String>,
    pub category: String,
    pub upload_date: Option<String>,
    pub upload_iso: String,
    pub last_edited_date: Option<String>,
    pub duration_seconds: u64,
    pub duration: String,
    pub view_count: u64,
    pub like_count: u64,
    pub comment_count: u64,
    pub channel_title: Option<String>,
    /// Site-relative output path, e.g. `videos/my-video-abc.html`
    pub path: String,
    /// Absolute (or root-relative) page URL
    pub url: String,
    pub thumbnail_url: String,
    pub watch_url: String,
    pub embed_url: String,
    pub html: VideoHtml,
    pub related: Vec<RelatedVideo>,
}

/// Pre-escaped strings for template insertion.
#[derive(Debug, Clone, Serialize)]
pub struct VideoHtml {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub description: String,
    pub category: String,
    pub tags: Vec<String>,
    pub uploaded: Option<String>,
    pub edited: Option<String>,
    pub views: String,
    pub likes: String,
    pub comments: String,
    pub url: String,
    pub thumbnail_url: String,
    pub watch_url: String,
    pub embed_url: String,
}

/// A link to another video on the same site.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RelatedVideo {
    pub id: String,
    pub slug: String,
    pub title: String,
    pub views: String,
    pub thumbnail_url: String,
}

/// Slug for a video page: the title stem plus the id as a suffix.
///
/// The suffix keeps ids that differ only in case apart, see [`id_suffix`].
pub fn video_slug(title: &str, id: &str) -> String {
    let stem = slugify_title(title);
    let suffix = id_suffix(id);
    match (stem.is_empty(), suffix.is_empty()) {
        (_, true) => sanitize_slug(&stem),
        (true, false) => suffix,
        (false, false) => format!("{stem}-{suffix}"),
    }
}

/// Encode a video id as a lowercase, URL-safe slug suffix.
///
/// Ids are case-sensitive, so an uppercase letter is written as `_` plus
/// the lowercase letter and a literal `_` is doubled. `-`, ASCII digits and
/// lowercase letters pass through; anything else becomes `-`. The encoding
/// is injective over `[A-Za-z0-9_-]`.
pub fn id_suffix(id: &str) -> String {
    let mut out = String::with_capacity(id.len() + 4);
    for c in id.trim().chars() {
        match c {
            'A'..='Z' => {
                out.push('_');
                out.push(c.to_ascii_lowercase());
            }
            '_' => out.push_str("__"),
            'a'..='z' | '0'..='9' | '-' => out.push(c),
            _ => out.push('-'),
        }
    }
    out
}

/// Normalize every record, newest upload first.
///
/// Undated videos sort last; ties keep input order. Related videos are
/// attached once the whole list is known.
pub fn normalize_videos(
    records: &[VideoRecord],
    base_url: &str,
    now: DateTime<Utc>,
) -> Vec<NormalizedVideo> {
    let mut dated: Vec<(Option<DateTime<Utc>>, NormalizedVideo)> = records
        .iter()
        .map(|record| {
            let uploaded = record.upload_date.as_deref().and_then(parse_datetime);
            (uploaded, normalize_video(record, base_url, now))
        })
        .collect();

    dated.sort_by(|(a, _), (b, _)| match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut videos: Vec<NormalizedVideo> = dated.into_iter().map(|(_, v)| v).collect();
    attach_related(&mut videos, RELATED_COUNT);
    videos
}

/// Normalize a single record.
pub fn normalize_video(record: &VideoRecord, base_url: &str, now: DateTime<Utc>) -> NormalizedVideo {
    let id = record.id.trim().to_string();
    let title = record.title.as_deref().unwrap_or("").trim().to_string();
    let description = record.description.clone().unwrap_or_default();
    let short = short_description(&description);
    let category = record
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .unwrap_or(DEFAULT_CATEGORY)
        .to_string();
    let tags: Vec<String> = record
        .tags
        .iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();

    let slug = video_slug(&title, &id);
    let path = format!("{VIDEOS_DIR}/{slug}.html");
    let url = format!("{base_url}/{path}");
    let thumbnail_url = format!("https://i.ytimg.com/vi/{id}/hqdefault.jpg");
    let watch_url = format!("https://www.youtube.com/watch?v={id}");
    let embed_url = format!("https://www.youtube.com/embed/{id}");

    let upload_date = record.upload_date.clone().filter(|d| !d.trim().is_empty());
    let last_edited_date = record
        .last_edited_date
        .clone()
        .filter(|d| !d.trim().is_empty())
        .or_else(|| upload_date.clone());

    let view_count = coerce_count(record.view_count);
    let like_count = coerce_count(record.like_count);
    let comment_count = coerce_count(record.comment_count);
    let duration_seconds = coerce_count(record.duration_seconds);

    let html = VideoHtml {
        id: escape_html(&id),
        title: escape_html(if title.is_empty() { &id } else { &title }),
        short_description: escape_html(&short),
        description: linkify_description(&description),
        category: escape_html(&category),
        tags: tags.iter().map(|t| escape_html(t)).collect(),
        uploaded: pretty_date(upload_date.as_deref()).map(|d| escape_html(&d)),
        edited: pretty_date(last_edited_date.as_deref()).map(|d| escape_html(&d)),
        views: format_count(view_count),
        likes: format_count(like_count),
        comments: format_count(comment_count),
        url: escape_html(&url),
        thumbnail_url: escape_html(&thumbnail_url),
        watch_url: escape_html(&watch_url),
        embed_url: escape_html(&embed_url),
    };

    NormalizedVideo {
        upload_iso: iso_datetime(upload_date.as_deref(), now),
        duration: duration_text(duration_seconds as f64),
        id,
        slug,
        title,
        description,
        short_description: short,
        tags,
        category,
        upload_date,
        last_edited_date,
        duration_seconds,
        view_count,
        like_count,
        comment_count,
        channel_title: record.channel_title.clone(),
        path,
        url,
        thumbnail_url,
        watch_url,
        embed_url,
        html,
        related: Vec::new(),
    }
}

/// Attach up to `k` related videos to each video.
pub fn attach_related(videos: &mut [NormalizedVideo], k: usize) {
    let related: Vec<Vec<RelatedVideo>> = videos
        .iter()
        .map(|current| related_videos(videos, current, k))
        .collect();

    for (video, related) in videos.iter_mut().zip(related) {
        video.related = related;
    }
}

/// Score other videos against `current` and return the best `k`.
///
/// Each shared tag is worth 3, a matching category 2, having a date 0.1,
/// and views add up to 1 (saturating at a million). Ties keep list order.
pub fn related_videos(all: &[NormalizedVideo], current: &NormalizedVideo, k: usize) -> Vec<RelatedVideo> {
    let mut scored: Vec<(f64, &NormalizedVideo)> = all
        .iter()
        .filter(|v| v.id != current.id)
        .map(|v| (related_score(current, v), v))
        .collect();

    scored.sort_by(|(a, _), (b, _)| b.partial_cmp(a).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(k)
        .map(|(_, v)| RelatedVideo {
            id: v.html.id.clone(),
            slug: v.slug.clone(),
            title: v.html.title.clone(),
            views: v.html.views.clone(),
            thumbnail_url: v.html.thumbnail_url.clone(),
        })
        .collect()
}

fn related_score(current: &NormalizedVideo, other: &NormalizedVideo) -> f64 {
    let shared = other
        .tags
        .iter()
        .filter(|t| current.tags.contains(t))
        .count();

    let mut score = 3.0 * shared as f64;
    if other.category == current.category {
        score += 2.0;
    }
    if other.last_edited_date.is_some() {
        score += 0.1;
    }
    score + (other.view_count as f64 / 1_000_000.0).min(1.0)
}
