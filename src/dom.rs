//! DOM stage
//!
//! Implements the session's collaborator seams against the page the game is
//! mounted on: the tile grid, the occluding gridlines, the status line and
//! both panels. Only this module and the bootstrap touch the document.

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element};

use crate::game::tile::{CharacterId, ImageRef, face_offset};
use crate::game::CountdownStep;
use crate::next_level_url;
use crate::session::{GridSink, PanelSink, StatusSink};

/// Page element ids the game mounts onto
pub const GAME_ID: &str = "game";
pub const OVERLAY_ID: &str = "gridlines";
pub const STATUS_ID: &str = "status";
pub const GAME_OVER_ID: &str = "game-over-container";
pub const QR_CONTAINER_ID: &str = "qr-container";
pub const QR_ID: &str = "qr";
pub const TEAM_INFO_ID: &str = "team-info";
pub const START_CONTAINER_ID: &str = "start-game-container";
pub const START_BUTTON_ID: &str = "start-game";
pub const COUNTER_ID: &str = "counter";
pub const TITLE_ID: &str = "game-title";

const TITLE_LOGO_SRC: &str = "assets/images/game-name.png";

// QRCode.js, shipped by the page
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_name = QRCode)]
    type QrCode;

    #[wasm_bindgen(constructor, js_class = "QRCode")]
    fn new(target: &Element, text: &str) -> QrCode;
}

/// DOM-backed implementation of the grid, status and panel seams.
///
/// Clones share the same underlying elements, so one build can feed all
/// three collaborator slots of a [`crate::session::Stage`].
#[derive(Clone)]
pub struct DomStage {
    document: Document,
    size: u32,
    cells: Vec<Element>,
    overlay: Element,
    status: Element,
}

impl DomStage {
    /// Build the size x size cell grid under the game and overlay
    /// containers, row-major, with per-cell crop offsets baked in
    pub fn build(document: &Document, size: u32) -> Result<Self, JsValue> {
        let game = require(document, GAME_ID)?;
        let overlay = require(document, OVERLAY_ID)?;
        let status = require(document, STATUS_ID)?;

        let template = format!(
            "grid-template-columns: repeat({size}, 1fr); grid-template-rows: repeat({size}, 1fr)"
        );
        game.set_attribute("style", &template)?;
        overlay.set_attribute("style", &template)?;

        let count = (size * size) as usize;
        let mut cells = Vec::with_capacity(count);
        for index in 0..count {
            let cell = document.create_element("div")?;
            cell.set_id(&(index + 1).to_string());
            cell.set_attribute("style", &cell_style(size, index, None))?;
            game.append_child(&cell)?;

            overlay.append_child(&document.create_element("div")?)?;
            cells.push(cell);
        }

        Ok(Self {
            document: document.clone(),
            size,
            cells,
            overlay,
            status,
        })
    }

    /// The clickable cell elements, in tile order
    pub fn cells(&self) -> &[Element] {
        &self.cells
    }

    fn set_counter_text(&self, text: &str) {
        if let Some(counter) = self.document.get_element_by_id(COUNTER_ID) {
            counter.set_text_content(Some(text));
        }
    }
}

impl GridSink for DomStage {
    fn set_face(&mut self, tile: usize, image: &ImageRef) {
        if let Some(cell) = self.cells.get(tile) {
            let _ = cell.set_attribute("style", &cell_style(self.size, tile, Some(image.as_ref())));
        }
    }

    fn show_overlay(&mut self) {
        let _ = self.overlay.class_list().remove_1("hide");
    }

    fn hide_overlay(&mut self) {
        let _ = self.overlay.class_list().add_1("hide");
    }
}

impl StatusSink for DomStage {
    fn set_progress(&mut self, found: u32, total: u32) {
        self.status
            .set_text_content(Some(&format!("{found}/{total} thieves found")));
    }

    fn reveal_character(&mut self, character: CharacterId) {
        if let Some(indicator) = self
            .document
            .get_element_by_id(&format!("character_{character}"))
        {
            let _ = indicator.class_list().add_1("show");
        }
    }
}

impl PanelSink for DomStage {
    fn show_countdown(&mut self, step: CountdownStep) {
        match step {
            CountdownStep::Count(n) => self.set_counter_text(&n.to_string()),
            CountdownStep::Go => self.set_counter_text("GO!"),
            CountdownStep::Done => {
                if let Some(container) = self.document.get_element_by_id(START_CONTAINER_ID) {
                    let _ = container.set_attribute("style", "display: none");
                }
            }
        }
    }

    fn show_completion(&mut self, next_level: u32) {
        if let Some(panel) = self.document.get_element_by_id(GAME_OVER_ID) {
            let _ = panel.class_list().add_1("show");
        }

        let Some(window) = web_sys::window() else {
            return;
        };
        let location = window.location();
        let (Ok(origin), Ok(pathname)) = (location.origin(), location.pathname()) else {
            return;
        };
        let target = next_level_url(&origin, &pathname, next_level);

        if let Some(qr) = self.document.get_element_by_id(QR_ID) {
            let _ = QrCode::new(&qr, &target);

            // tapping the code also navigates
            let href = target.clone();
            let onclick = Closure::<dyn FnMut()>::new(move || {
                if let Some(window) = web_sys::window() {
                    let _ = window.location().set_href(&href);
                }
            });
            let _ = qr.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref());
            onclick.forget();
        }

        log::info!("next level at {target}");
    }

    fn fade_in_completion(&mut self) {
        for id in [QR_CONTAINER_ID, QR_ID, TEAM_INFO_ID] {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("style", "opacity: 1");
            }
        }
    }
}

/// Preload the title art, swapping it in once the browser has it
pub fn swap_in_title_logo(document: &Document) -> Result<(), JsValue> {
    let logo = document.create_element("img")?;
    let title = document.get_element_by_id(TITLE_ID);

    let loaded = logo.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        if let (Some(title), Some(src)) = (&title, loaded.get_attribute("src")) {
            let _ = title.set_attribute("src", &src);
        }
    });
    logo.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    // setting src after the listener so the swap can't be missed
    logo.set_attribute("src", TITLE_LOGO_SRC)?;
    Ok(())
}

/// Inline style for one cell. The background is scaled to the whole grid
/// and cropped to this cell's slice, so aligned tiles assemble the full
/// picture.
fn cell_style(size: u32, index: usize, image: Option<&str>) -> String {
    let (x, y) = face_offset(size, index);
    let mut style = format!(
        "background-size: {}%; background-position: {x}% {y}%",
        size * 100
    );
    if let Some(src) = image {
        style.push_str(&format!("; background-image: url({src})"));
    }
    style
}

fn require(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing element #{id}")))
}
