//! Tile Heist entry point
//!
//! Handles platform-specific initialization and wires the session to the page.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, MouseEvent};

    use tile_heist::audio::AudioManager;
    use tile_heist::dom::{self, DomStage};
    use tile_heist::{Session, SessionConfig, Settings, Stage, level_from_query};

    /// Everything the event handlers need to reach
    struct App {
        session: Option<Session>,
        settings: Settings,
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Tile Heist starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let level = level_from_query(&window.location().search().unwrap_or_default());
        log::info!("Requested level: {}", level);

        let settings = Settings::load();
        let audio = Rc::new(RefCell::new(AudioManager::new(&settings)));
        let app = Rc::new(RefCell::new(App {
            session: None,
            settings,
        }));

        if let Err(e) = dom::swap_in_title_logo(&document) {
            log::warn!("Title art preload failed: {:?}", e);
        }

        setup_start_button(&document, app.clone(), audio.clone(), level);
        setup_keyboard(app.clone(), audio.clone());

        // Timed steps run off the frame clock
        request_animation_frame(app);

        log::info!("Tile Heist ready");
    }

    /// Build the stage and board for `level` and begin the countdown
    fn start_session(
        app: &Rc<RefCell<App>>,
        audio: &Rc<RefCell<AudioManager>>,
        level: u32,
        now: f64,
    ) {
        let document = web_sys::window().unwrap().document().unwrap();

        // Audio contexts stay suspended until a user gesture
        audio.borrow().resume();

        let seed = js_sys::Date::now() as u64;
        let config = SessionConfig::new(level, seed);
        let plan = config.policy.plan(config.level);

        let stage_dom = match DomStage::build(&document, plan.size) {
            Ok(stage) => stage,
            Err(e) => {
                log::error!("Stage setup failed: {:?}", e);
                return;
            }
        };

        if let Some(counter) = document.get_element_by_id(dom::COUNTER_ID) {
            let _ = counter.set_attribute("style", "display: block");
        }

        let stage = Stage {
            grid: Box::new(stage_dom.clone()),
            status: Box::new(stage_dom.clone()),
            audio: Box::new(audio.clone()),
            panel: Box::new(stage_dom.clone()),
        };

        let mut session = Session::new(config, stage);
        session.start(now);
        app.borrow_mut().session = Some(session);

        setup_cell_handlers(&stage_dom, app);
    }

    fn setup_start_button(
        document: &Document,
        app: Rc<RefCell<App>>,
        audio: Rc<RefCell<AudioManager>>,
        level: u32,
    ) {
        if let Some(btn) = document.get_element_by_id(dom::START_BUTTON_ID) {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if app.borrow().session.is_some() {
                    return;
                }
                // The countdown takes over from here
                if let Some(target) = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                {
                    let _ = target.set_attribute("style", "display: none");
                }
                start_session(&app, &audio, level, event.time_stamp());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No start button found - starting immediately");
            let now = web_sys::window()
                .and_then(|w| w.performance())
                .map(|p| p.now())
                .unwrap_or_default();
            start_session(&app, &audio, level, now);
        }
    }

    fn setup_cell_handlers(stage: &DomStage, app: &Rc<RefCell<App>>) {
        for (index, cell) in stage.cells().iter().enumerate() {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                if let Some(session) = app.borrow_mut().session.as_mut() {
                    session.handle_activation(index, event.time_stamp());
                }
            });
            let _ =
                cell.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>, audio: Rc<RefCell<AudioManager>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            match event.key().as_str() {
                "m" | "M" => {
                    let mut a = app.borrow_mut();
                    a.settings.muted = !a.settings.muted;
                    audio.borrow_mut().set_muted(a.settings.muted);
                    a.settings.save();
                    log::info!("Audio muted: {}", a.settings.muted);
                }
                _ => {}
            }
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(app, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(app: Rc<RefCell<App>>, time: f64) {
        if let Some(session) = app.borrow_mut().session.as_mut() {
            session.tick(time);
        }
        request_animation_frame(app);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use tile_heist::game::{CharacterId, CountdownStep, ImageRef, SoundCue};
    use tile_heist::session::{AudioSink, GridSink, PanelSink, StatusSink};
    use tile_heist::{Session, SessionConfig, Stage};

    /// Prints what the page would show
    struct ConsoleStage;

    impl GridSink for ConsoleStage {
        fn set_face(&mut self, tile: usize, image: &ImageRef) {
            log::debug!("tile {} -> {}", tile, image);
        }
        fn show_overlay(&mut self) {
            log::debug!("overlay shown");
        }
        fn hide_overlay(&mut self) {
            log::debug!("overlay hidden");
        }
    }

    impl StatusSink for ConsoleStage {
        fn set_progress(&mut self, found: u32, total: u32) {
            println!("  {}/{} thieves found", found, total);
        }
        fn reveal_character(&mut self, character: CharacterId) {
            println!("  found character {}", character);
        }
    }

    impl AudioSink for ConsoleStage {
        fn play(&mut self, cue: SoundCue) {
            log::debug!("cue {:?}", cue);
        }
    }

    impl PanelSink for ConsoleStage {
        fn show_countdown(&mut self, step: CountdownStep) {
            log::debug!("countdown {:?}", step);
        }
        fn show_completion(&mut self, next_level: u32) {
            println!("  level complete, next up: {}", next_level);
        }
        fn fade_in_completion(&mut self) {}
    }

    fn console_stage() -> Stage {
        Stage {
            grid: Box::new(ConsoleStage),
            status: Box::new(ConsoleStage),
            audio: Box::new(ConsoleStage),
            panel: Box::new(ConsoleStage),
        }
    }

    /// Align every tile to each character in turn. The last tile always
    /// lands through a real activation, so a board whose starting faces
    /// already agree still gets its match registered.
    fn solve(session: &mut Session, mut now: f64) {
        let tiles = session.board().tile_count();
        let characters = session.board().characters();
        for character in 1..=characters {
            for tile in 0..tiles - 1 {
                while session.board().tile_character(tile) != Some(character) {
                    session.handle_activation(tile, now);
                    now += 16.0;
                }
            }
            loop {
                session.handle_activation(tiles - 1, now);
                now += 16.0;
                if session.board().tile_character(tiles - 1) == Some(character) {
                    break;
                }
            }
            // Let the reveal and restore steps run
            now += 3_000.0;
            session.tick(now);
        }
    }

    /// Drive one full level through the public session API
    pub fn play_level(level: u32) {
        let mut session = Session::new(SessionConfig::new(level, 12345), console_stage());
        session.start(0.0);

        // Run the countdown out
        let now = 4_000.0;
        session.tick(now);

        solve(&mut session, now);

        assert!(
            session.board().is_complete(),
            "Playthrough should finish the level"
        );
        println!("✓ Level playthrough complete!");
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tile Heist (native) starting...");
    log::info!("Native mode is headless - run with `trunk serve` for the web version");

    println!("\nRunning level playthrough...");
    headless::play_level(1);
}
