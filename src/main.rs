//! Orbital Swarm entry point
//!
//! Native: headless runner that drives the simulation clock and logs the HUD.
//! Web: requestAnimationFrame loop, spawn button and HUD bindings.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use orbital_swarm::{SimConfig, Simulation, Subscription, TickDriver};

    /// Game instance holding all state
    struct Game {
        sim: Simulation,
        driver: TickDriver,
        frame_handle: Option<i32>,
        hud: Vec<Subscription>,
    }

    thread_local! {
        static GAME: RefCell<Option<Rc<RefCell<Game>>>> = const { RefCell::new(None) };
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Orbital Swarm starting...");

        let mut config = SimConfig::default();
        config.seed = Some(js_sys::Date::now() as u64);
        let sim = match Simulation::new(config) {
            Ok(sim) => sim,
            Err(e) => {
                log::error!("Invalid configuration: {}", e);
                return;
            }
        };
        let driver = TickDriver::from_config(&sim.config().clock);

        let game = Rc::new(RefCell::new(Game {
            sim,
            driver,
            frame_handle: None,
            hud: Vec::new(),
        }));

        bind_hud(&game);
        setup_spawn_button(game.clone());
        setup_auto_pause(game.clone());

        {
            let mut g = game.borrow_mut();
            // A tab opened in the background must not tick until it gains focus
            let focused = web_sys::window()
                .and_then(|w| w.document())
                .map_or(true, |d| d.has_focus().unwrap_or(true));
            g.driver.set_focused(focused);
            g.driver.start();
        }
        GAME.with(|g| *g.borrow_mut() = Some(game.clone()));
        request_animation_frame(game);

        log::info!("Orbital Swarm running!");
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    /// HUD elements follow the resource cells
    fn bind_hud(game: &Rc<RefCell<Game>>) {
        let mut g = game.borrow_mut();
        let resources = g.sim.resources();
        let subs = vec![
            resources
                .stored_energy
                .subscribe(|v| set_text("hud-energy", &format!("{:.2}", v))),
            resources
                .max_stored_energy
                .subscribe(|v| set_text("hud-max-energy", &format!("{:.0}", v))),
            resources
                .power
                .subscribe(|v| set_text("hud-power", &format!("{:.0}", v))),
            resources
                .num_satellites
                .subscribe(|v| set_text("hud-satellites", &v.to_string())),
        ];
        g.hud = subs;
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let handle_game = game.clone();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Ok(handle) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            handle_game.borrow_mut().frame_handle = Some(handle);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame_handle = None;
            if !g.driver.is_running() {
                return;
            }
            let Game { sim, driver, .. } = &mut *g;
            // rAF timestamps are milliseconds
            driver.frame(time / 1000.0, sim);
        }

        request_animation_frame(game);
    }

    fn setup_spawn_button(game: Rc<RefCell<Game>>) {
        let Some(document) = web_sys::window().and_then(|w| w.document()) else {
            return;
        };
        if let Some(btn) = document.get_element_by_id("spawn-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let outcome = game.borrow_mut().sim.request_spawn();
                log::debug!("Spawn request: {:?}", outcome);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Hidden tabs stop getting frames; make sure we don't tick on return either
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let visible =
                    document_clone.visibility_state() == web_sys::VisibilityState::Visible;
                game.borrow_mut().driver.set_focused(visible);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        for (event, focused) in [("focus", true), ("blur", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                game.borrow_mut().driver.set_focused(focused);
            });
            let _ = window.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Current frame for a JS renderer, as JSON
    pub fn snapshot_json() -> String {
        GAME.with(|g| {
            g.borrow()
                .as_ref()
                .and_then(|game| serde_json::to_string(&game.borrow().sim.snapshot()).ok())
                .unwrap_or_else(|| "null".to_string())
        })
    }

    /// Tear down the session: stop the clock and cancel the pending frame
    pub fn stop() {
        GAME.with(|g| {
            if let Some(game) = g.borrow_mut().take() {
                let mut game = game.borrow_mut();
                game.driver.stop();
                if let (Some(handle), Some(window)) = (game.frame_handle.take(), web_sys::window()) {
                    let _ = window.cancel_animation_frame(handle);
                }
                for sub in game.hud.drain(..) {
                    sub.unsubscribe();
                }
                log::info!("Orbital Swarm stopped");
            }
        });
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn snapshot_json() -> String {
    wasm_game::snapshot_json()
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn stop_game() {
    wasm_game::stop();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Orbital Swarm (native) starting...");

    let options = <native::Options as clap::Parser>::parse();

    if let Err(e) = native::run(&options) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;

    use clap::Parser;
    use orbital_swarm::{ConfigError, ConfigPreset, SimConfig, Simulation, TickDriver};

    /// Frame rate of the headless host
    const FRAME_RATE: f64 = 60.0;

    /// Headless runner arguments
    ///
    /// Values here are applied on top of the loaded config file.
    #[derive(Parser, Debug)]
    #[command(name = "orbital-swarm", about = "Orbital Swarm headless simulation")]
    pub struct Options {
        /// JSON config file (defaults are used when omitted)
        pub config_path: Option<PathBuf>,

        /// Config preset (standard, sandbox)
        #[arg(long, default_value = "standard", value_parser = parse_preset)]
        pub preset: ConfigPreset,

        /// Wall-clock seconds of frames to drive
        #[arg(long, default_value_t = 60.0, allow_negative_numbers = true, value_parser = non_negative)]
        pub seconds: f64,

        /// Seconds between spawn requests (0 = never)
        #[arg(long, default_value_t = 1.0, allow_negative_numbers = true, value_parser = non_negative)]
        pub spawn_every: f64,
    }

    fn parse_preset(name: &str) -> Result<ConfigPreset, String> {
        ConfigPreset::from_str(name).ok_or_else(|| format!("unknown preset `{}`", name))
    }

    fn non_negative(value: &str) -> Result<f64, String> {
        match value.parse::<f64>() {
            Ok(n) if n.is_finite() && n >= 0.0 => Ok(n),
            _ => Err(format!("expected a non-negative number, got `{}`", value)),
        }
    }

    pub fn run(options: &Options) -> Result<(), ConfigError> {
        let mut config = match &options.config_path {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        config.apply_preset(options.preset);

        let mut sim = Simulation::new(config)?;
        let mut driver = TickDriver::from_config(&sim.config().clock);

        let resources = sim.resources();
        let hud = [
            resources
                .num_satellites
                .subscribe(|n| log::info!("Satellites: {}", n)),
            resources
                .stored_energy
                .subscribe(|e| log::debug!("Stored energy: {:.4} MWh", e)),
            resources
                .power
                .subscribe(|p| log::debug!("Power: {} MW", p)),
        ];

        let frame_dt = 1.0 / FRAME_RATE;
        let frames = (options.seconds * FRAME_RATE).round() as u64;
        let spawn_interval = if options.spawn_every > 0.0 {
            Some(((options.spawn_every * FRAME_RATE).round() as u64).max(1))
        } else {
            None
        };

        driver.start();
        for frame in 0..frames {
            if spawn_interval.is_some_and(|every| frame % every == 0) {
                let outcome = sim.request_spawn();
                log::debug!("Spawn request: {:?}", outcome);
            }
            driver.frame(frame as f64 * frame_dt, &mut sim);
        }
        driver.stop();

        for sub in &hud {
            sub.unsubscribe();
        }

        let values = sim.resources().values();
        log::info!(
            "Simulated {:.2}s in {} ticks: {} satellites, {} MW, {:.4}/{} MWh stored",
            sim.state().time,
            driver.ticks(),
            values.num_satellites,
            values.power,
            values.stored_energy,
            values.max_stored_energy
        );
        Ok(())
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_parse_defaults() {
            let options = Options::try_parse_from(["orbital-swarm"]).unwrap();
            assert!(options.config_path.is_none());
            assert_eq!(options.preset, ConfigPreset::Standard);
            assert_eq!(options.seconds, 60.0);
            assert_eq!(options.spawn_every, 1.0);
        }

        #[test]
        fn test_parse_flags() {
            let options = Options::try_parse_from([
                "orbital-swarm",
                "cfg.json",
                "--preset",
                "sandbox",
                "--seconds",
                "2.5",
                "--spawn-every",
                "0",
            ])
            .unwrap();
            assert_eq!(options.config_path, Some(PathBuf::from("cfg.json")));
            assert_eq!(options.preset, ConfigPreset::Sandbox);
            assert_eq!(options.seconds, 2.5);
            assert_eq!(options.spawn_every, 0.0);
        }

        #[test]
        fn test_parse_errors() {
            assert!(Options::try_parse_from(["orbital-swarm", "--seconds"]).is_err());
            assert!(Options::try_parse_from(["orbital-swarm", "--seconds", "-1"]).is_err());
            assert!(Options::try_parse_from(["orbital-swarm", "--spawn-every=-0.5"]).is_err());
            assert!(Options::try_parse_from(["orbital-swarm", "--seconds", "soon"]).is_err());
            assert!(Options::try_parse_from(["orbital-swarm", "--preset", "hard"]).is_err());
            assert!(Options::try_parse_from(["orbital-swarm", "--verbose"]).is_err());
        }

        #[test]
        fn test_run_sandbox() {
            let options = Options {
                config_path: None,
                preset: ConfigPreset::Sandbox,
                seconds: 1.0,
                spawn_every: 0.25,
            };
            run(&options).unwrap();
        }
    }
}
