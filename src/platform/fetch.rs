//! Remote content fetching via the browser `fetch` API
//!
//! Every failure maps to `GameError::RemoteFetchFailure` (or
//! `MalformedVideoUrl`); callers log it and drop the distraction.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::content::{image_from_meme, video_from_list};
use crate::error::{GameError, Result};
use crate::sim::{DistractionEvent, DistractionKind};

fn js_error(context: &str, err: JsValue) -> GameError {
    GameError::remote(format!("{context}: {err:?}"))
}

/// GET `url` and return the body as text
pub async fn fetch_text(url: &str) -> Result<String> {
    let opts = RequestInit::new();
    opts.set_method("GET");
    opts.set_mode(RequestMode::Cors);

    let request =
        Request::new_with_str_and_init(url, &opts).map_err(|e| js_error("bad request", e))?;
    let window = web_sys::window().ok_or_else(|| GameError::remote("no window"))?;

    let response: Response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| js_error("network error", e))?
        .dyn_into()
        .map_err(|e| js_error("not a response", e))?;

    if !response.ok() {
        return Err(GameError::remote(format!(
            "{url} returned HTTP {}",
            response.status()
        )));
    }

    let text = response.text().map_err(|e| js_error("unreadable body", e))?;
    JsFuture::from(text)
        .await
        .map_err(|e| js_error("unreadable body", e))?
        .as_string()
        .ok_or_else(|| GameError::remote("body is not text"))
}

/// Fetch a random meme image
pub async fn fetch_image_meme(endpoint: &str) -> Result<DistractionEvent> {
    let body = fetch_text(endpoint).await?;
    image_from_meme(&body)
}

/// Fetch the video list and pick one entry
pub async fn fetch_video(list_path: &str, seed: u64) -> Result<DistractionEvent> {
    let body = fetch_text(list_path).await?;
    let mut rng = Pcg32::seed_from_u64(seed);
    video_from_list(&body, &mut rng)
}

/// Turn a requested distraction kind into displayable content
pub async fn realize(
    kind: DistractionKind,
    meme_endpoint: &str,
    video_list_path: &str,
    seed: u64,
) -> Result<DistractionEvent> {
    match kind {
        DistractionKind::Image => fetch_image_meme(meme_endpoint).await,
        DistractionKind::Video => fetch_video(video_list_path, seed).await,
    }
}
