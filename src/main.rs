//! Memory Match entry point
//!
//! Handles platform-specific initialization and drives the game session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, MouseEvent, PageTransitionEvent};

    use memory_match::Settings;
    use memory_match::platform::{BoardView, dom, realize};
    use memory_match::sim::{GameSession, SessionEvent};

    /// Host polling interval for the session's timers
    const DRIVER_INTERVAL_MS: i32 = 100;

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        settings: Settings,
        view: BoardView,
        last_time: f64,
        interval_handle: Option<i32>,
    }

    impl Game {
        /// Advance the session by wall-clock time since the last call
        fn update(&mut self, now: f64) {
            let dt = if self.last_time > 0.0 {
                (now - self.last_time).max(0.0) as u64
            } else {
                0
            };
            self.last_time = now;
            self.session.advance(dt);
        }

        fn flip(&mut self, index: usize) {
            let result = self.session.flip(index);
            if !result.outcome.accepted() {
                log::debug!("Flip on card {} ignored: {:?}", index, result.outcome);
            }
        }

        fn restart(&mut self) {
            if let Err(e) = self.session.start_or_restart() {
                log::error!("Could not start a new game: {}", e);
            }
        }

        /// React to everything the session reported
        fn process_events(&mut self) {
            let events = self.session.drain_events();
            if events.is_empty() {
                return;
            }
            for event in events {
                match event {
                    SessionEvent::Dealt => {
                        if let Err(e) = self.view.render_board(self.session.board()) {
                            log::error!("Failed to render board: {:?}", e);
                        }
                        self.view.reset_end_screen();
                        self.view.set_start_enabled(true);
                    }
                    SessionEvent::Started => self.view.set_start_enabled(false),
                    SessionEvent::Flipped(_) | SessionEvent::FlippedBack { .. } => {}
                    SessionEvent::Clock { .. } => {}
                    SessionEvent::Distraction(request) => {
                        let seed = PRESENTATION_RNG.with(|rng| rng.borrow_mut().random::<u64>());
                        spawn_distraction(request.kind, &self.settings, seed);
                    }
                    SessionEvent::Finished(summary) => {
                        self.view
                            .show_summary(&summary, self.session.config().time_limit_secs);
                        self.view.set_start_enabled(true);
                    }
                }
            }
            self.view.sync_cards(self.session.board());
            self.view.update_hud(self.session.state());
        }

        /// Back from the back/forward cache: time spent frozen does not count
        fn resume(&mut self, now: f64) {
            self.last_time = now;
        }

        fn teardown(&mut self) {
            self.session.teardown();
            if let (Some(handle), Some(window)) = (self.interval_handle.take(), web_sys::window()) {
                window.clear_interval_with_handle(handle);
            }
        }
    }

    thread_local! {
        /// Presentation-only randomness (modal placement, video picks), kept out of the session
        static PRESENTATION_RNG: RefCell<Pcg32> = RefCell::new(Pcg32::seed_from_u64(js_sys::Date::now() as u64));
    }

    /// Fetch and show one distraction without touching game state
    fn spawn_distraction(
        kind: memory_match::sim::DistractionKind,
        settings: &Settings,
        seed: u64,
    ) {
        let meme_endpoint = settings.meme_endpoint.clone();
        let video_list_path = settings.video_list_path.clone();
        let artwork_path = settings.artwork_path.clone();
        wasm_bindgen_futures::spawn_local(async move {
            match realize(kind, &meme_endpoint, &video_list_path, seed).await {
                Ok(event) => {
                    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                        return;
                    };
                    let view = BoardView::new(document, artwork_path);
                    let shown = PRESENTATION_RNG.with(|rng| view.show_distraction(&event, &mut *rng.borrow_mut()));
                    if let Err(e) = shown {
                        log::warn!("Failed to show distraction: {:?}", e);
                    }
                }
                Err(e) => log::warn!("Dropped {:?} distraction: {}", kind, e),
            }
        });
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Memory Match starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let view = BoardView::new(document.clone(), settings.artwork_path.clone());

        let dimension = match view.read_dimension() {
            Ok(d) => d,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let session = match GameSession::new(settings.session_config(dimension), seed) {
            Ok(s) => s,
            Err(e) => {
                log::error!("{}", e);
                return;
            }
        };
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new(RefCell::new(Game {
            session,
            settings,
            view,
            last_time: js_sys::Date::now(),
            interval_handle: None,
        }));
        game.borrow_mut().process_events();

        setup_click_handler(&document, game.clone());
        setup_driver(&window, game.clone());
        setup_teardown(&window, game);

        log::info!("Memory Match running!");
    }

    fn setup_click_handler(document: &web_sys::Document, game: Rc<RefCell<Game>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let mut g = game.borrow_mut();
            if let Some(index) = dom::clicked_card(&target) {
                g.flip(index);
            } else if target.node_name() == "BUTTON" && !target.class_list().contains("disabled") {
                g.restart();
            } else {
                return;
            }
            g.process_events();
        });
        let _ = document.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_driver(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        let game_clone = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let mut g = game_clone.borrow_mut();
            g.update(js_sys::Date::now());
            g.process_events();
        });
        match window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            DRIVER_INTERVAL_MS,
        ) {
            Ok(handle) => game.borrow_mut().interval_handle = Some(handle),
            Err(e) => log::error!("Failed to start game driver: {:?}", e),
        }
        closure.forget();
    }

    fn setup_teardown(window: &web_sys::Window, game: Rc<RefCell<Game>>) {
        // Page unload. A page kept in the back/forward cache may come back,
        // so only a non-persisted pagehide tears the session down.
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                if event.persisted() {
                    log::info!("Page cached, keeping session");
                    return;
                }
                game.borrow_mut().teardown();
            });
            let _ = window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Restored from the back/forward cache
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PageTransitionEvent| {
                if event.persisted() {
                    game.borrow_mut().resume(js_sys::Date::now());
                    log::info!("Page restored from cache");
                }
            });
            let _ = window.add_event_listener_with_callback("pageshow", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Memory Match (native) starting...");
    log::info!("Native mode runs a scripted game - run with `trunk serve` for the web version");

    match play_scripted_game() {
        Ok(Some(summary)) => println!(
            "✓ Scripted game finished: {:?} with {} moves in {} sec",
            summary.outcome, summary.total_moves, summary.elapsed_seconds
        ),
        Ok(None) => println!("✗ Scripted game did not finish"),
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Play a perfect-memory game headlessly: every pair found on the first try
#[cfg(not(target_arch = "wasm32"))]
fn play_scripted_game() -> memory_match::Result<Option<memory_match::sim::Summary>> {
    use memory_match::Settings;
    use memory_match::consts::DEFAULT_DIMENSION;
    use memory_match::sim::{GameSession, SessionEvent};

    let settings = Settings::load();
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut session = GameSession::new(settings.session_config(DEFAULT_DIMENSION), seed)?;

    for i in 0..session.board().len() {
        if !session.board().cards()[i].is_face_down() {
            continue;
        }
        if let Some(partner) = session.board().partner_of(i) {
            session.flip(i);
            session.flip(partner);
        }
        session.advance(1_500);
    }
    // A scripted game can't lose, but let the clock run out if it somehow did
    session.advance(u64::from(settings.time_limit_secs) * 1000);

    for event in session.drain_events() {
        if let SessionEvent::Distraction(request) = event {
            log::debug!("(headless) skipped {:?} distraction", request.kind);
        }
    }

    Ok(session.summary())
}
