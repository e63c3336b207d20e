//! DOM HUD
//!
//! Everything textual is plain DOM layered over the canvas: equation, score,
//! feedback, error notice, break countdown and the value labels on targets.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::sim::{Frame, Scene, Session, Sprite};

/// Top-level screens, one visible at a time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Login,
    Difficulty,
    Game,
}

impl Screen {
    fn id(&self) -> &'static str {
        match self {
            Screen::Login => "login",
            Screen::Difficulty => "difficulty",
            Screen::Game => "game",
        }
    }
}

/// Show one screen and hide the others
pub fn show_screen(document: &Document, screen: Screen) {
    for s in [Screen::Login, Screen::Difficulty, Screen::Game] {
        if let Some(el) = document.get_element_by_id(s.id()) {
            set_hidden(&el, s != screen);
        }
    }
}

/// Blocking notice for failures outside the game loop
pub fn alert(message: &str) {
    log::warn!("{}", message);
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// Toggle only the `hidden` class; other classes on the element survive
fn set_hidden(el: &Element, hidden: bool) {
    let _ = el.class_list().toggle_with_force("hidden", hidden);
}

/// Only touch the DOM when the text actually changes
fn set_text(el: &Element, text: &str) {
    if el.text_content().as_deref() != Some(text) {
        el.set_text_content(Some(text));
    }
}

pub struct Hud {
    document: Document,
    equation: Option<Element>,
    score: Option<Element>,
    feedback: Option<Element>,
    notice: Option<Element>,
    break_overlay: Option<Element>,
    break_timer: Option<Element>,
    label_layer: Option<Element>,
    labels: Vec<HtmlElement>,
}

impl Hud {
    pub fn new(document: &Document) -> Self {
        let by_id = |id: &str| document.get_element_by_id(id);
        Self {
            document: document.clone(),
            equation: by_id("equation"),
            score: by_id("score-value"),
            feedback: by_id("feedback"),
            notice: by_id("notice"),
            break_overlay: by_id("break-overlay"),
            break_timer: by_id("break-timer"),
            label_layer: by_id("labels"),
            labels: Vec::new(),
        }
    }

    /// Refresh every HUD element from the session and this frame's scene
    pub fn update(&mut self, session: &Session, frame: &Frame) {
        if let Some(el) = &self.equation {
            set_text(el, session.problem());
        }
        if let Some(el) = &self.score {
            set_text(el, &session.score().to_string());
        }
        if let Some(el) = &self.feedback {
            set_text(el, session.feedback().text());
        }
        if let Some(el) = &self.notice {
            match session.notice() {
                Some(notice) => {
                    set_text(el, &notice.text);
                    set_hidden(el, false);
                }
                None => set_hidden(el, true),
            }
        }

        match &frame.scene {
            Scene::Break { remaining_secs } => {
                if let Some(el) = &self.break_overlay {
                    set_hidden(el, false);
                }
                if let Some(el) = &self.break_timer {
                    set_text(el, &format!("Break: {}s", remaining_secs));
                }
                self.sync_labels(&[]);
            }
            Scene::Play { sprites } => {
                if let Some(el) = &self.break_overlay {
                    set_hidden(el, true);
                }
                self.sync_labels(sprites);
            }
        }
    }

    /// Hide everything the game screen owns (used when leaving a game)
    pub fn clear(&mut self) {
        self.sync_labels(&[]);
        if let Some(el) = &self.break_overlay {
            set_hidden(el, true);
        }
    }

    /// Position one label per sprite, growing the pool as needed
    fn sync_labels(&mut self, sprites: &[Sprite]) {
        let Some(layer) = &self.label_layer else {
            return;
        };

        while self.labels.len() < sprites.len() {
            let Some(label) = self
                .document
                .create_element("span")
                .ok()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            else {
                return;
            };
            let _ = label.set_attribute("class", "target-label");
            let _ = layer.append_child(&label);
            self.labels.push(label);
        }

        for (i, label) in self.labels.iter().enumerate() {
            let style = label.style();
            match sprites.get(i) {
                Some(sprite) => {
                    set_text(label, &sprite.label);
                    let left = sprite.center.x / CANVAS_WIDTH * 100.0;
                    let top = sprite.center.y / CANVAS_HEIGHT * 100.0;
                    let _ = style.set_property("left", &format!("{:.3}%", left));
                    let _ = style.set_property("top", &format!("{:.3}%", top));
                    let _ = style.set_property("opacity", &format!("{:.3}", sprite.alpha));
                    let _ = style.set_property("display", "block");
                }
                None => {
                    let _ = style.set_property("display", "none");
                }
            }
        }
    }
}
