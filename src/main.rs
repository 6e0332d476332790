//! Math Snake entry point
//!
//! Handles platform-specific initialization. In the browser the page owns
//! the tick timer; natively a few autopilot sessions are run headless.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, HtmlSelectElement, KeyboardEvent, MouseEvent};

    use math_snake::highscores::LocalStorageStore;
    use math_snake::platform::input::{direction_for_key, is_arrow_key};
    use math_snake::sim::{GameEvent, Tier};
    use math_snake::{Session, Settings, SpeedPreset};

    /// Game instance holding all state
    struct Game {
        session: Session<LocalStorageStore>,
        settings: Settings,
        /// Handle of the running `setInterval`, if any
        interval_id: Option<i32>,
        /// JS function that runs one tick
        tick_fn: Option<js_sys::Function>,
    }

    type SharedGame = Rc<RefCell<Game>>;

    impl Game {
        /// Cancel the tick timer; no tick runs after this returns
        fn cancel_timer(&mut self) {
            if let (Some(id), Some(window)) = (self.interval_id.take(), web_sys::window()) {
                window.clear_interval_with_handle(id);
            }
        }

        /// (Re)arm the tick timer at the configured rate
        fn schedule(&mut self) {
            self.cancel_timer();
            let (Some(window), Some(tick_fn)) = (web_sys::window(), self.tick_fn.as_ref()) else {
                return;
            };
            let ms = self.settings.tick_interval() as i32;
            match window.set_interval_with_callback_and_timeout_and_arguments_0(tick_fn, ms) {
                Ok(id) => self.interval_id = Some(id),
                Err(err) => log::error!("Failed to schedule ticks: {err:?}"),
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        let settings = Settings::load();
        let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
        let session = Session::new(seed, settings.effective_rules(), LocalStorageStore);
        log::info!(
            "Math Snake ready (seed {seed}, {} speed, {} ms ticks)",
            settings.speed.as_str(),
            settings.tick_interval()
        );

        let game = Rc::new(RefCell::new(Game {
            session,
            settings,
            interval_id: None,
            tick_fn: None,
        }));

        // One long-lived closure drives every tick
        let tick_game = game.clone();
        let closure = Closure::<dyn FnMut()>::new(move || on_tick(&tick_game));
        game.borrow_mut().tick_fn = Some(closure.as_ref().unchecked_ref::<js_sys::Function>().clone());
        closure.forget();

        update_hud(&game.borrow());
        setup_keyboard(game.clone());
        setup_start_button(game.clone());
        setup_speed_preset(game.clone());
        setup_speed_slider(game);
    }

    fn document() -> Option<Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn on_tick(game: &SharedGame) {
        let mut g = game.borrow_mut();
        if let Err(err) = g.session.tick() {
            log::error!("Run aborted: {err}");
        }

        for event in g.session.drain_events() {
            match event {
                GameEvent::TierUp { tier } => apply_theme(tier),
                GameEvent::GameOver { new_high_score, .. } => show_game_over(new_high_score),
                _ => {}
            }
        }

        if !g.session.is_running() {
            g.cancel_timer();
        }
        render(&g);
        update_hud(&g);
    }

    /// Hand the snapshot to the page's canvas renderer
    fn render(g: &Game) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Ok(hook) = js_sys::Reflect::get(&window, &JsValue::from_str("mathSnakeRender")) else {
            return;
        };
        let Some(hook) = hook.dyn_ref::<js_sys::Function>() else {
            return;
        };
        match serde_json::to_string(&g.session.snapshot()) {
            Ok(json) => {
                if let Err(err) = hook.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                    log::warn!("Render hook failed: {err:?}");
                }
            }
            Err(err) => log::warn!("Snapshot serialization failed: {err}"),
        }
    }

    /// Update HUD elements in DOM
    fn update_hud(g: &Game) {
        let Some(document) = document() else {
            return;
        };
        let snap = g.session.snapshot();
        set_text(&document, "score", &snap.score.to_string());
        set_text(&document, "high-score", &snap.high_score.to_string());
        set_text(&document, "tier-badge", snap.tier.as_str());
        set_text(&document, "combo", &snap.combo_streak.to_string());
        set_text(&document, "coins", &snap.loot.coins.to_string());
        set_text(&document, "gems", &snap.loot.gems.to_string());
        if let Some(q) = &snap.question {
            set_text(&document, "question", &q.text);
        }
    }

    fn apply_theme(tier: Tier) {
        let Some(body) = document().and_then(|d| d.body()) else {
            return;
        };
        body.set_class_name(tier.theme_class().unwrap_or(""));
    }

    fn show_game_over(new_high_score: bool) {
        let Some(document) = document() else {
            return;
        };
        let status = if new_high_score {
            "NEW HIGH SCORE!"
        } else {
            "GAME OVER"
        };
        set_text(&document, "game-status", status);
        set_text(&document, "start-btn", "TRY AGAIN");
        if let Some(layer) = document.get_element_by_id("ui-layer") {
            let _ = layer.class_list().remove_1("hidden");
        }
    }

    fn setup_keyboard(game: SharedGame) {
        let Some(document) = document() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let key = event.key();
            if is_arrow_key(&key) {
                event.prevent_default();
            }

            let mut g = game.borrow_mut();
            if key == "Escape" && g.session.is_running() {
                g.session.stop();
                g.cancel_timer();
                show_game_over(false);
                return;
            }
            if let Some(dir) = direction_for_key(&key) {
                g.session.set_intent(dir);
            }
        });
        let _ = document.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_start_button(game: SharedGame) {
        let Some(document) = document() else {
            return;
        };
        let Some(btn) = document.get_element_by_id("start-btn") else {
            return;
        };
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let mut g = game.borrow_mut();
            if let Err(err) = g.session.start_session() {
                log::error!("Could not start session: {err}");
                return;
            }
            apply_theme(Tier::Bronze);
            if let Some(layer) = doc.get_element_by_id("ui-layer") {
                let _ = layer.class_list().add_1("hidden");
            }
            g.schedule();
            render(&g);
            update_hud(&g);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn speed_slider(document: &Document) -> Option<HtmlInputElement> {
        document
            .get_element_by_id("speed-slider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
    }

    fn setup_speed_preset(game: SharedGame) {
        let Some(document) = document() else {
            return;
        };
        let Some(select) = document
            .get_element_by_id("speed-preset")
            .and_then(|el| el.dyn_into::<HtmlSelectElement>().ok())
        else {
            return;
        };
        select.set_value(game.borrow().settings.speed.as_str());

        let input = select.clone();
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(preset) = SpeedPreset::from_str(&input.value()) else {
                log::warn!("Unknown speed preset: {}", input.value());
                return;
            };
            let mut g = game.borrow_mut();
            g.settings.apply_preset(preset);
            g.settings.save();
            if let Some(slider) = speed_slider(&doc) {
                slider.set_value(&g.settings.tick_interval().to_string());
            }
            if g.session.is_running() {
                g.schedule();
            }
            log::info!("Speed preset set to {}", preset.as_str());
        });
        let _ = select.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_speed_slider(game: SharedGame) {
        let Some(document) = document() else {
            return;
        };
        let Some(slider) = speed_slider(&document) else {
            return;
        };
        slider.set_value(&game.borrow().settings.tick_interval().to_string());

        let input = slider.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Ok(ms) = input.value().parse::<u32>() else {
                return;
            };
            let mut g = game.borrow_mut();
            g.settings.set_tick_interval(ms);
            g.settings.save();
            // Takes effect on the next scheduled tick
            if g.session.is_running() {
                g.schedule();
            }
            log::info!("Tick interval set to {} ms", g.settings.tick_interval());
        });
        let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

/// Upper bound on ticks per demo run, in case the autopilot never dies
#[cfg(not(target_arch = "wasm32"))]
const MAX_DEMO_TICKS: u64 = 5_000;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use math_snake::sim::autopilot::steer;
    use math_snake::{MemoryStore, ScoreStore, Session, Settings};

    env_logger::init();
    log::info!("Math Snake (native) starting...");
    log::info!("Native mode runs autopilot demos - build for wasm32 to play in the browser");

    let settings = Settings::load();
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .or(settings.seed)
        .unwrap_or(1);
    let mut session = Session::new(seed, settings.effective_rules(), MemoryStore::new());

    for run in 1..=3 {
        if let Err(err) = session.start_session() {
            log::error!("Demo {run} could not start: {err}");
            return;
        }
        while session.is_running() && session.state().time_ticks < MAX_DEMO_TICKS {
            if let Some(dir) = steer(session.state()) {
                session.set_intent(dir);
            }
            if let Err(err) = session.tick() {
                log::error!("Demo {run} aborted: {err}");
                break;
            }
            for event in session.drain_events() {
                log::debug!("{event:?}");
            }
        }
        session.stop();

        let snap = session.snapshot();
        println!(
            "Demo {run}: score {}, tier {}, coins {}, gems {}, length {}, ticks {}",
            snap.score,
            snap.tier.as_str(),
            snap.loot.coins,
            snap.loot.gems,
            snap.snake.len(),
            snap.time_ticks
        );
    }
    println!("Best score: {}", session.store().read_high_score());
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
