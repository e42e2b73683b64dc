//! Input side of reelsite.
//!
//! Loads the site configuration and video list, and turns raw records into
//! escaped, slugged, render-ready videos.

pub mod config;
pub mod normalize;
pub mod text;
pub mod video;

pub use config::{load_config, resolve_base_url, ChannelInfo, ConfigError, SiteConfig};
pub use normalize::{normalize_videos, NormalizedVideo, RelatedVideo, VideoHtml, VIDEOS_DIR};
pub use video::{load_videos, read_video_list, select_videos, LoadError, VideoRecord};
