//! DOM rendering for the board, HUD, end screen and distraction modals

use rand::Rng;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement};

use crate::consts::*;
use crate::content::artwork_path;
use crate::error::{GameError, Result};
use crate::sim::{Board, CardFace, DistractionEvent, DistractionKind, GameState, Outcome, Summary};
use crate::{format_moves, format_time};

/// Attribute on `.board` holding the grid dimension
pub const DIMENSION_ATTR: &str = "data-dimension";
/// Attribute on each `.card` holding its board index
pub const INDEX_ATTR: &str = "data-index";

const VIDEO_ALLOW: &str =
    "accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture; web-share";

/// Handles to the static page elements
pub struct BoardView {
    document: Document,
    artwork_template: String,
}

impl BoardView {
    pub fn new(document: Document, artwork_template: String) -> Self {
        Self {
            document,
            artwork_template,
        }
    }

    fn query(&self, selector: &str) -> Option<Element> {
        self.document.query_selector(selector).ok().flatten()
    }

    /// Read and validate the board dimension from the page markup
    pub fn read_dimension(&self) -> Result<u32> {
        let raw = self
            .query(".board")
            .and_then(|board| board.get_attribute(DIMENSION_ATTR))
            .ok_or_else(|| GameError::invalid_dimension("<missing>"))?;
        crate::sim::parse_dimension(&raw)
    }

    /// Replace the board's cards with a freshly dealt board
    pub fn render_board(&self, board: &Board) -> std::result::Result<(), JsValue> {
        let container = self
            .query(".board")
            .ok_or_else(|| JsValue::from_str("no .board element"))?;
        container.set_inner_html("");
        container.set_attribute(
            "style",
            &format!("grid-template-columns: repeat({}, auto)", board.dimension()),
        )?;

        for (index, card) in board.cards().iter().enumerate() {
            let card_el = self.document.create_element("div")?;
            card_el.set_class_name("card");
            card_el.set_attribute(INDEX_ATTR, &index.to_string())?;

            let front = self.document.create_element("div")?;
            front.set_class_name("card-front");

            let back = self.document.create_element("div")?;
            back.set_class_name("card-back");
            let img = self.document.create_element("img")?;
            img.set_attribute("src", &artwork_path(&self.artwork_template, card.image))?;
            img.set_attribute("alt", "Image")?;
            img.set_attribute("style", "width: 100%; height: 100%;")?;
            back.append_child(&img)?;

            card_el.append_child(&front)?;
            card_el.append_child(&back)?;
            container.append_child(&card_el)?;
        }
        Ok(())
    }

    /// Mirror each card's face into its CSS classes
    pub fn sync_cards(&self, board: &Board) {
        let Ok(nodes) = self.document.query_selector_all(".board .card") else {
            return;
        };
        for i in 0..nodes.length() {
            let Some(el) = nodes.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
                continue;
            };
            let Some(card) = board.card(i as usize) else {
                continue;
            };
            let class = match card.face {
                CardFace::FaceDown => "card",
                CardFace::FaceUp => "card flipped",
                CardFace::Matched => "card flipped matched",
            };
            el.set_class_name(class);
        }
    }

    /// Update the move counter and timer
    pub fn update_hud(&self, state: &GameState) {
        if let Some(el) = self.query(".moves") {
            el.set_text_content(Some(&format_moves(state.total_moves)));
        }
        if let Some(el) = self.query(".timer") {
            el.set_text_content(Some(&format_time(state.elapsed_seconds)));
        }
    }

    /// Enable or disable the start button
    pub fn set_start_enabled(&self, enabled: bool) {
        if let Some(button) = self.query("button") {
            let classes = button.class_list();
            let _ = if enabled {
                classes.remove_1("disabled")
            } else {
                classes.add_1("disabled")
            };
        }
    }

    /// Flip the board container over and show the end screen
    pub fn show_summary(&self, summary: &Summary, time_limit_secs: u32) {
        if let Some(container) = self.query(".board-container") {
            let _ = container.class_list().add_1("flipped");
        }
        if let Some(win) = self.query(".win") {
            win.set_inner_html(&summary_html(summary, time_limit_secs));
        }
    }

    /// Undo `show_summary` for a new game
    pub fn reset_end_screen(&self) {
        if let Some(container) = self.query(".board-container") {
            let _ = container.class_list().remove_1("flipped");
        }
        if let Some(win) = self.query(".win") {
            win.set_inner_html("");
        }
    }

    /// Pop up a distraction at a random position. Clicking it dismisses it.
    pub fn show_distraction<R: Rng + ?Sized>(
        &self,
        event: &DistractionEvent,
        rng: &mut R,
    ) -> std::result::Result<(), JsValue> {
        let body_el = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("no body"))?;

        let modal: HtmlElement = self.document.create_element("div")?.dyn_into()?;
        modal.set_class_name("modal");
        let backdrop = self.document.create_element("div")?;
        backdrop.set_class_name("modal-backdrop");

        let (x, y) = self.random_position(rng);
        let style = modal.style();
        style.set_property("left", &format!("{x}px"))?;
        style.set_property("top", &format!("{y}px"))?;

        let header = self.document.create_element("div")?;
        header.set_class_name("modal-header");
        let close = self.document.create_element("span")?;
        close.set_class_name("modal-close");
        close.set_inner_html("&times;");
        header.append_child(&close)?;
        modal.append_child(&header)?;

        let body = self.document.create_element("div")?;
        body.set_class_name("modal-body");
        match event.kind {
            DistractionKind::Image => {
                let frame = self.document.create_element("div")?;
                frame.set_class_name("image-container");
                let image = self.document.create_element("img")?;
                image.set_attribute("src", &event.source_url)?;
                image.set_class_name("distraction-image");
                frame.append_child(&image)?;
                body.append_child(&frame)?;
            }
            DistractionKind::Video => {
                let video = self.document.create_element("iframe")?;
                video.set_attribute("src", &event.source_url)?;
                video.set_attribute("allow", VIDEO_ALLOW)?;
                video.set_attribute("allowfullscreen", "")?;
                video.set_attribute("frameborder", "0")?;
                video.set_class_name("distraction-video");
                body.append_child(&video)?;
            }
        }
        modal.append_child(&body)?;

        let footer = self.document.create_element("div")?;
        footer.set_class_name("modal-footer");
        let close_footer = self.document.create_element("span")?;
        close_footer.set_class_name("distraction-close");
        close_footer.set_text_content(Some("Close"));
        footer.append_child(&close_footer)?;
        modal.append_child(&footer)?;

        {
            let modal_clone = modal.clone();
            let backdrop_clone = backdrop.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                modal_clone.remove();
                backdrop_clone.remove();
            });
            modal.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        body_el.append_child(&backdrop)?;
        body_el.append_child(&modal)?;
        Ok(())
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> (u32, u32) {
        let (width, height) = web_sys::window()
            .map(|w| {
                let dim = |v: std::result::Result<JsValue, JsValue>| {
                    v.ok().and_then(|v| v.as_f64()).unwrap_or(0.0)
                };
                (dim(w.inner_width()), dim(w.inner_height()))
            })
            .unwrap_or((0.0, 0.0));
        let span = |extent: f64, size: f64| ((extent - size).max(0.0)) as u32;
        let x = match span(width, MODAL_WIDTH) {
            0 => 0,
            max => rng.random_range(0..max),
        };
        let y = match span(height, MODAL_HEIGHT) {
            0 => 0,
            max => rng.random_range(0..max),
        };
        (x, y)
    }
}

/// Index of the card a click landed on, if any
pub fn clicked_card(target: &Element) -> Option<usize> {
    let card = if target.class_list().contains("card") {
        target.clone()
    } else {
        target.parent_element()?
    };
    if !card.class_list().contains("card") || card.class_list().contains("flipped") {
        return None;
    }
    card.get_attribute(INDEX_ATTR)?.parse().ok()
}

/// End screen markup
fn summary_html(summary: &Summary, time_limit_secs: u32) -> String {
    match summary.outcome {
        Outcome::Won => format!(
            r#"<span class="win-text">
                You won!<br />
                with <span class="highlight">{}</span> moves<br />
                under <span class="highlight">{}</span> seconds
            </span>"#,
            summary.total_moves, summary.elapsed_seconds
        ),
        Outcome::TimedOut => format!(
            r#"<span class="win-text">
                Game over!<br />
                You reached the time limit of {} seconds.<br />
                with <span class="highlight">{}</span> moves<br />
                under <span class="highlight">{}</span> seconds
            </span>"#,
            time_limit_secs, summary.total_moves, summary.elapsed_seconds
        ),
    }
}
