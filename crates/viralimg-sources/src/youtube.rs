//! `YouTube` video thumbnail collector.
//!
//! Videos are discovered from the search feed, falling back to the search
//! results page when the feed is unavailable or empty. Each video becomes one
//! candidate whose image references run from the highest thumbnail quality
//! down, so the first one that downloads wins.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use viralimg_core::{extract_youtube_id, CandidateImage, Category, ContentType};

use crate::collector::SourceCollector;
use crate::error::SourceError;
use crate::fetcher::PageFetcher;
use crate::html;

const BASE_URL: &str = "https://www.youtube.com";
const THUMBNAIL_BASE_URL: &str = "https://img.youtube.com";

/// Thumbnail variants, best quality first.
const THUMBNAIL_TIERS: [&str; 3] = ["maxresdefault", "hqdefault", "mqdefault"];

#[derive(Debug, Clone, PartialEq, Eq)]
struct VideoEntry {
    id: String,
    url: String,
    title: String,
    channel: Option<String>,
}

pub struct YouTubeCollector {
    fetcher: Arc<dyn PageFetcher>,
    base_url: String,
    thumbnail_base_url: String,
}

impl YouTubeCollector {
    #[must_use]
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            fetcher,
            base_url: BASE_URL.to_string(),
            thumbnail_base_url: THUMBNAIL_BASE_URL.to_string(),
        }
    }

    #[must_use]
    pub fn with_base_urls(mut self, base_url: &str, thumbnail_base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self.thumbnail_base_url = thumbnail_base_url.trim_end_matches('/').to_string();
        self
    }

    async fn discover_videos(&self, query: &str, limit: usize) -> Vec<VideoEntry> {
        let encoded = utf8_percent_encode(query, NON_ALPHANUMERIC).to_string();

        let feed_url = format!("{}/feeds/videos.xml?search_query={encoded}", self.base_url);
        match self.fetcher.fetch(&feed_url).await {
            Ok(xml) => match parse_search_feed(&xml, limit) {
                Ok(videos) if !videos.is_empty() => return videos,
                Ok(_) => {
                    tracing::debug!(source = "youtube", "search feed returned no videos");
                }
                Err(e) => {
                    tracing::warn!(source = "youtube", error = %e, "search feed parse failed");
                }
            },
            Err(e) => {
                tracing::warn!(source = "youtube", error = %e, "search feed fetch failed");
            }
        }

        // sp=CAMSAhAB: sort by view count, videos only.
        let results_url = format!(
            "{}/results?search_query={encoded}&sp=CAMSAhAB",
            self.base_url
        );
        match self.fetcher.fetch(&results_url).await {
            Ok(page) => parse_results_page(&self.base_url, &page, limit),
            Err(e) => {
                tracing::warn!(source = "youtube", error = %e, "search results fetch failed");
                Vec::new()
            }
        }
    }

    fn thumbnail_urls(&self, video_id: &str) -> Vec<String> {
        THUMBNAIL_TIERS
            .iter()
            .map(|tier| format!("{}/vi/{video_id}/{tier}.jpg", self.thumbnail_base_url))
            .collect()
    }
}

#[async_trait]
impl SourceCollector for YouTubeCollector {
    fn category(&self) -> Category {
        Category::YouTube
    }

    async fn collect(&self, query: &str, requested_count: usize) -> Vec<CandidateImage> {
        if requested_count == 0 {
            return Vec::new();
        }

        let videos = self.discover_videos(query, requested_count).await;
        tracing::debug!(source = "youtube", count = videos.len(), "discovered videos");

        videos
            .into_iter()
            .take(requested_count)
            .map(|video| {
                let mut tiers = self.thumbnail_urls(&video.id).into_iter();
                let primary = tiers.next().unwrap_or_default();
                let mut candidate = CandidateImage::new(Category::YouTube, &video.url, &primary);
                candidate.fallback_image_urls = tiers.collect();
                candidate.title = video.title;
                candidate.description = "Thumbnail from a trending YouTube video".to_string();
                candidate.author = Some(video.channel.unwrap_or_else(|| "YouTube channel".to_string()));
                candidate.content_type = ContentType::Thumbnail;
                candidate
            })
            .collect()
    }
}

fn parse_search_feed(xml: &str, limit: usize) -> Result<Vec<VideoEntry>, SourceError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut in_entry = false;
    let mut in_author = false;
    let mut current_tag = String::new();
    let mut title = String::new();
    let mut video_url = String::new();
    let mut channel = String::new();
    let mut videos = Vec::new();
    let mut seen = HashSet::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                match name {
                    "entry" => {
                        in_entry = true;
                        title.clear();
                        video_url.clear();
                        channel.clear();
                    }
                    "author" if in_entry => in_author = true,
                    "link" if in_entry => {
                        if let Some(href) = watch_link_href(&e) {
                            video_url = href;
                        }
                    }
                    _ => {}
                }
                current_tag = name.to_string();
            }
            Ok(Event::Empty(e)) => {
                if in_entry && e.name().as_ref() == b"link" {
                    if let Some(href) = watch_link_href(&e) {
                        video_url = href;
                    }
                }
            }
            Ok(Event::Text(e)) => {
                if in_entry {
                    let text = e.unescape().unwrap_or_default().into_owned();
                    match current_tag.as_str() {
                        "title" if !in_author => title = text,
                        "name" if in_author => channel = text,
                        _ => {}
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name_buf = e.name().as_ref().to_vec();
                let name = std::str::from_utf8(&name_buf).unwrap_or("");
                match name {
                    "author" => in_author = false,
                    "entry" => {
                        in_entry = false;
                        if let Some(id) = extract_youtube_id(&video_url) {
                            if !title.is_empty() && seen.insert(id.clone()) {
                                videos.push(VideoEntry {
                                    id,
                                    url: video_url.clone(),
                                    title: title.clone(),
                                    channel: (!channel.is_empty()).then(|| channel.clone()),
                                });
                                if videos.len() >= limit {
                                    break;
                                }
                            }
                        }
                    }
                    _ => {}
                }
                current_tag.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SourceError::Xml(e)),
            _ => {}
        }
    }

    Ok(videos)
}

fn watch_link_href(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .filter(|attr| attr.key.as_ref() == b"href")
        .map(|attr| String::from_utf8_lossy(attr.value.as_ref()).to_string())
        .find(|href| href.contains("/watch?v="))
}

fn parse_results_page(base_url: &str, page: &str, limit: usize) -> Vec<VideoEntry> {
    let mut seen = HashSet::new();
    html::find_links(base_url, page, "/watch?v=")
        .into_iter()
        .filter_map(|url| {
            let id = extract_youtube_id(&url)?;
            seen.insert(id.clone()).then(|| VideoEntry {
                title: format!("YouTube video {id}"),
                id,
                url,
                channel: None,
            })
        })
        .take(limit)
        .collect()
}
