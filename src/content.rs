//! Distraction content: remote payloads and video URL handling
//!
//! The platform layer does the actual fetching; this module turns the raw
//! response bodies into `DistractionEvent`s so the parsing rules stay testable
//! off the browser.

use rand::Rng;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{GameError, Result};
use crate::sim::{DistractionEvent, DistractionKind};

/// Base for embeddable video playback
pub const EMBED_BASE: &str = "https://www.youtube.com/embed/";

/// Response of the meme endpoint (only the image url is used)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemeResponse {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
}

/// One entry of `videos.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoEntry {
    pub url: String,
}

/// `videos.json` document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoList {
    pub videos: Vec<VideoEntry>,
}

/// Pull the `v` query value out of a watch URL and build its embed URL
pub fn embed_video_url(source: &str) -> Result<String> {
    let malformed = || GameError::MalformedVideoUrl {
        url: source.to_string(),
    };
    let parsed = Url::parse(source).map_err(|_| malformed())?;
    let id = parsed
        .query_pairs()
        .find(|(k, _)| k == "v")
        .map(|(_, v)| v.into_owned())
        .filter(|v| !v.is_empty())
        .ok_or_else(malformed)?;
    Ok(format!("{EMBED_BASE}{id}"))
}

/// Parse the meme endpoint body into an image distraction
pub fn image_from_meme(body: &str) -> Result<DistractionEvent> {
    let meme: MemeResponse = serde_json::from_str(body)?;
    if meme.url.is_empty() {
        return Err(GameError::remote("meme response has no url"));
    }
    Ok(DistractionEvent {
        kind: DistractionKind::Image,
        source_url: meme.url,
    })
}

/// Parse `videos.json` and pick one video uniformly
pub fn video_from_list<R: Rng + ?Sized>(body: &str, rng: &mut R) -> Result<DistractionEvent> {
    let list: VideoList = serde_json::from_str(body)?;
    if list.videos.is_empty() {
        return Err(GameError::remote("video list is empty"));
    }
    let pick = &list.videos[rng.random_range(0..list.videos.len())];
    Ok(DistractionEvent {
        kind: DistractionKind::Video,
        source_url: embed_video_url(&pick.url)?,
    })
}

/// Path of the artwork shown on a card (catalog index is 0-based, files are 1-based)
pub fn artwork_path(template: &str, image: usize) -> String {
    template.replace("{n}", &(image + 1).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_embed_video_url() {
        assert_eq!(
            embed_video_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap(),
            "https://www.youtube.com/embed/dQw4w9WgXcQ"
        );
        // Other parameters are dropped
        assert_eq!(
            embed_video_url("https://www.youtube.com/watch?list=abc&v=xyz123&t=42").unwrap(),
            "https://www.youtube.com/embed/xyz123"
        );
    }

    #[test]
    fn test_embed_video_url_malformed() {
        for bad in [
            "https://www.youtube.com/watch",
            "https://www.youtube.com/watch?v=",
            "https://youtu.be/dQw4w9WgXcQ",
            "not a url",
        ] {
            assert!(
                matches!(embed_video_url(bad), Err(GameError::MalformedVideoUrl { .. })),
                "{bad} should be malformed"
            );
        }
    }

    #[test]
    fn test_image_from_meme() {
        let body = r#"{"postLink":"https://redd.it/x","title":"lol","url":"https://i.redd.it/a.jpg","nsfw":false}"#;
        let event = image_from_meme(body).unwrap();
        assert_eq!(event.kind, DistractionKind::Image);
        assert_eq!(event.source_url, "https://i.redd.it/a.jpg");
    }

    #[test]
    fn test_bad_payloads_are_fetch_failures() {
        let mut rng = Pcg32::seed_from_u64(1);
        for err in [
            image_from_meme("<html>").unwrap_err(),
            image_from_meme(r#"{"url":""}"#).unwrap_err(),
            video_from_list(r#"{"videos":[]}"#, &mut rng).unwrap_err(),
        ] {
            assert!(matches!(err, GameError::RemoteFetchFailure { .. }));
            assert!(err.is_recoverable());
        }
    }

    #[test]
    fn test_video_from_list() {
        let body = r#"{"videos":[{"url":"https://www.youtube.com/watch?v=one"},{"url":"https://www.youtube.com/watch?v=two"}]}"#;
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..20 {
            let event = video_from_list(body, &mut rng).unwrap();
            assert_eq!(event.kind, DistractionKind::Video);
            assert!(event.source_url == format!("{EMBED_BASE}one") || event.source_url == format!("{EMBED_BASE}two"));
        }
    }

    #[test]
    fn test_video_with_bad_url() {
        let body = r#"{"videos":[{"url":"https://example.com/clip"}]}"#;
        let mut rng = Pcg32::seed_from_u64(3);
        assert!(matches!(
            video_from_list(body, &mut rng),
            Err(GameError::MalformedVideoUrl { .. })
        ));
    }

    #[test]
    fn test_artwork_path() {
        assert_eq!(artwork_path("./assets/Artwork/{n}.jpg", 0), "./assets/Artwork/1.jpg");
        assert_eq!(artwork_path("./assets/Artwork/{n}.jpg", 22), "./assets/Artwork/23.jpg");
    }
}
