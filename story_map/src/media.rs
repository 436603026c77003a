//! Media references attached to popups and story slides. The engine only
//! resolves where they live; playing them is the renderer's job.

use url::Url;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Media {
    pub image: Option<String>,
    pub audio: Option<String>,
    pub video: Option<String>,
    pub link: Option<String>,
}

impl Media {
    pub fn is_empty(&self) -> bool {
        self.image.is_none() && self.audio.is_none() && self.video.is_none() && self.link.is_none()
    }
}

/// Absolute URLs pass through; bare file names are placed under `prefix`
/// (the exhibit serves local media from `/media/`).
pub fn resolve(prefix: &str, reference: &str) -> String {
    let reference = reference.trim();
    if Url::parse(reference).is_ok() || reference.starts_with('/') {
        return reference.to_string();
    }
    format!("{}/{}", prefix.trim_end_matches('/'), reference)
}

/// Turn a video page link into its embeddable form; YouTube `watch?v=`
/// pages become `/embed/` URLs, anything else is returned unchanged.
pub fn embeddable_video(link: &str) -> String {
    let Ok(url) = Url::parse(link.trim()) else {
        return link.to_string();
    };
    let is_youtube = url
        .host_str()
        .is_some_and(|host| host == "youtube.com" || host.ends_with(".youtube.com"));
    if !is_youtube || url.path() != "/watch" {
        return link.to_string();
    }
    match url.query_pairs().find(|(key, _)| key == "v") {
        Some((_, id)) => format!("https://www.youtube.com/embed/{id}"),
        None => link.to_string(),
    }
}

/// Links are only shown when they parse as http(s) URLs.
pub fn checked_link(link: &str) -> Option<String> {
    let url = Url::parse(link.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}
