//! Video metadata from a proposal's pitch URL: platform detection, id
//! extraction, and the per-platform details fetch.

use crate::connector::services::{vimeo, youtube};
use crate::connector::{ConnectorRegistry, HttpTransport};
use crate::error::AppError;
use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VideoPlatform {
    YouTube,
    Vimeo,
}

impl VideoPlatform {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoPlatform::YouTube => "youtube",
            VideoPlatform::Vimeo => "vimeo",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub platform: VideoPlatform,
    pub video_id: String,
    pub title: Option<String>,
    /// Duration in seconds.
    pub duration: Option<u64>,
    pub thumbnail: Option<String>,
}

pub struct VideoService {
    registry: Arc<ConnectorRegistry>,
    transport: HttpTransport,
}

impl VideoService {
    pub fn new(registry: Arc<ConnectorRegistry>, transport: HttpTransport) -> Self {
        VideoService { registry, transport }
    }

    /// Title, duration, and thumbnail for a YouTube or Vimeo URL.
    pub async fn metadata(&self, url: &str) -> Result<VideoMetadata, AppError> {
        let platform = detect_platform(url)
            .ok_or_else(|| AppError::BadRequest("unsupported video platform".into()))?;
        let video_id = extract_video_id(url)
            .ok_or_else(|| AppError::BadRequest("invalid video URL".into()))?;
        tracing::debug!(platform = platform.as_str(), video_id = %video_id, "fetching video metadata");
        match platform {
            VideoPlatform::YouTube => self.youtube(&video_id).await,
            VideoPlatform::Vimeo => self.vimeo(&video_id).await,
        }
    }

    async fn youtube(&self, video_id: &str) -> Result<VideoMetadata, AppError> {
        let request = youtube::GetVideoDetailsRequest::new(video_id);
        let call = self.registry.resolve(&request)?;
        let data = self.transport.send(call).await?.json()?;
        let video = data
            .get("items")
            .and_then(|items| items.get(0))
            .ok_or(AppError::ExternalService {
                service: "youtube",
                status: None,
                message: "video not found".into(),
            })?;
        Ok(VideoMetadata {
            platform: VideoPlatform::YouTube,
            video_id: video_id.to_string(),
            title: string_at(video, &["snippet", "title"]),
            duration: string_at(video, &["contentDetails", "duration"])
                .as_deref()
                .and_then(parse_iso8601_duration),
            thumbnail: string_at(video, &["snippet", "thumbnails", "default", "url"]),
        })
    }

    async fn vimeo(&self, video_id: &str) -> Result<VideoMetadata, AppError> {
        let request = vimeo::GetVideoDetailsRequest::new(video_id);
        let call = self.registry.resolve(&request)?;
        let data = self.transport.send(call).await?.json()?;
        Ok(VideoMetadata {
            platform: VideoPlatform::Vimeo,
            video_id: video_id.to_string(),
            title: string_at(&data, &["name"]),
            duration: data.get("duration").and_then(Value::as_u64),
            thumbnail: None,
        })
    }
}

pub fn detect_platform(url: &str) -> Option<VideoPlatform> {
    if Regex::new(r"(?:youtube\.com|youtu\.be)").ok()?.is_match(url) {
        return Some(VideoPlatform::YouTube);
    }
    if Regex::new(r"vimeo\.com").ok()?.is_match(url) {
        return Some(VideoPlatform::Vimeo);
    }
    None
}

/// Video id from a YouTube or Vimeo URL, in their various spellings
/// (watch, embed, short link, bare numeric id).
pub fn extract_video_id(url: &str) -> Option<String> {
    let youtube = Regex::new(
        r#"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:[^/]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^"&?/\s]{11})"#,
    )
    .ok()?;
    if let Some(caps) = youtube.captures(url) {
        return Some(caps.get(1)?.as_str().to_string());
    }
    let vimeo = Regex::new(r"(?:https?://)?(?:www\.)?vimeo\.com/(\d+)").ok()?;
    if let Some(caps) = vimeo.captures(url) {
        return Some(caps.get(1)?.as_str().to_string());
    }
    None
}

/// Seconds from an ISO-8601 duration as YouTube reports them (PT#H#M#S).
pub fn parse_iso8601_duration(raw: &str) -> Option<u64> {
    let rest = raw.strip_prefix("PT")?;
    let mut seconds: u64 = 0;
    let mut number = String::new();
    for c in rest.chars() {
        if c.is_ascii_digit() {
            number.push(c);
            continue;
        }
        let n: u64 = number.parse().ok()?;
        number.clear();
        match c {
            'H' => seconds += n * 3600,
            'M' => seconds += n * 60,
            'S' => seconds += n,
            _ => return None,
        }
    }
    if !number.is_empty() {
        return None;
    }
    Some(seconds)
}

fn string_at(data: &Value, path: &[&str]) -> Option<String> {
    let mut cursor = data;
    for step in path {
        cursor = cursor.get(step)?;
    }
    cursor.as_str().map(String::from)
}
