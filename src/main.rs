//! Math Slicer entry point
//!
//! Browser: login, difficulty selection, then the game loop.
//! Native: replays a recorded message trace from stdin.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, HtmlInputElement, MouseEvent, TouchEvent};

    use math_slicer::net::{self, Credential, Endpoints, GameSocket, LinkEvent};
    use math_slicer::protocol::{ClientMessage, Difficulty};
    use math_slicer::renderer::{RenderState, scene_vertices};
    use math_slicer::sim::{Outcome, Session};
    use math_slicer::ui::{self, Hud, Screen};
    use math_slicer::{ClientError, Settings, backing_size, client_to_canvas};

    /// Game instance holding all client state
    struct Game {
        settings: Settings,
        endpoints: Endpoints,
        credential: Option<Credential>,
        session: Option<Session>,
        socket: Option<GameSocket>,
        render_state: Option<RenderState>,
        hud: Hud,
        /// Last pointer position in logical canvas pixels
        pointer: Option<Vec2>,
        /// A create-game request is in flight
        starting: bool,
    }

    impl Game {
        fn new(settings: Settings, hud: Hud) -> Self {
            let endpoints = Endpoints::new(&settings.server_url);
            Self {
                settings,
                endpoints,
                credential: None,
                session: None,
                socket: None,
                render_state: None,
                hud,
                pointer: None,
                starting: false,
            }
        }

        /// Route one transport event into the session
        fn on_link_event(&mut self, event: LinkEvent) {
            let now = now_ms();
            let Some(session) = self.session.as_mut() else {
                return;
            };
            match event {
                LinkEvent::Open => session.link_opened(),
                LinkEvent::Message(text) => match session.receive(&text, now) {
                    Ok(Some(Outcome::Error(err))) => log::warn!("Server reported: {}", err),
                    Ok(Some(outcome)) => log::debug!("Message applied: {:?}", outcome),
                    Ok(None) => {}
                    Err(e) => log::warn!("{}", e),
                },
                LinkEvent::Closed(reason) => {
                    log::info!("WebSocket closed ({})", reason);
                    session.link_lost(&reason);
                }
                LinkEvent::Error(reason) => {
                    log::error!("WebSocket error: {}", reason);
                    session.link_lost(&reason);
                }
            }
        }

        /// Advance, send any slice, render
        fn update(&mut self, time: f64) {
            let Some(session) = self.session.as_mut() else {
                return;
            };
            let frame = session.frame(time, self.pointer);

            if let Some(slice) = &frame.slice {
                if let Some(socket) = &self.socket {
                    let msg = ClientMessage::Slice {
                        value: slice.value.clone(),
                    };
                    if let Err(e) = socket.send(&msg) {
                        log::warn!("Slice not sent: {}", e);
                    }
                }
            }

            if let Some(render_state) = self.render_state.as_mut() {
                let (vertices, clear) = scene_vertices(&frame.scene);
                match render_state.render(&vertices, clear) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }

            self.hud.update(session, &frame);
        }
    }

    /// Milliseconds on the same clock as requestAnimationFrame timestamps
    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Size the canvas backing store to its displayed size
    fn fit_canvas(canvas: &HtmlCanvasElement) -> (u32, u32) {
        let dpr = web_sys::window().map_or(1.0, |w| w.device_pixel_ratio());
        let (width, height) = backing_size(
            canvas.client_width() as f32,
            canvas.client_height() as f32,
            dpr as f32,
        );
        canvas.set_width(width);
        canvas.set_height(height);
        (width, height)
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window()?.document()
    }

    fn input_value(id: &str) -> String {
        document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Math Slicer starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        // The game screen is still hidden here, so this falls back to the
        // logical size; start_game resizes once the canvas is laid out
        let (width, height) = fit_canvas(&canvas);

        let settings = Settings::load();
        if let Some(name) = settings.last_username.as_deref() {
            if let Some(input) = document
                .get_element_by_id("username")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            {
                input.set_value(name);
            }
        }

        let game = Rc::new(RefCell::new(Game::new(settings, Hud::new(&document))));

        match init_renderer(canvas.clone(), width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("WebGPU unavailable, targets will not be drawn: {}", e),
        }

        ui::show_screen(&document, Screen::Login);
        setup_login_form(game.clone());
        setup_difficulty_buttons(game.clone());
        setup_input_handlers(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Math Slicer running!");
    }

    async fn init_renderer(
        canvas: HtmlCanvasElement,
        width: u32,
        height: u32,
    ) -> Result<RenderState, ClientError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
            .map_err(|e| ClientError::Browser(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| ClientError::Browser(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        RenderState::new(surface, &adapter, width, height)
            .await
            .map_err(|e| ClientError::Browser(e.to_string()))
    }

    fn setup_login_form(game: Rc<RefCell<Game>>) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id("login-btn")) else {
            return;
        };

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let username = input_value("username");
                let password = input_value("password");
                let endpoints = game.borrow().endpoints.clone();
                let game = game.clone();

                wasm_bindgen_futures::spawn_local(async move {
                    match net::login(&endpoints, &username, &password).await {
                        Ok(credential) => {
                            {
                                let mut g = game.borrow_mut();
                                g.settings.remember_login(&username, None);
                                g.settings.save();
                                g.credential = Some(credential);
                            }
                            if let Some(document) = document() {
                                ui::show_screen(&document, Screen::Difficulty);
                            }
                        }
                        Err(e) => ui::alert(&e.to_string()),
                    }
                });
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_difficulty_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };
        let preferred = game.borrow().settings.default_difficulty;

        for difficulty in Difficulty::ALL {
            let Some(btn) = document.get_element_by_id(&format!("difficulty-{}", difficulty.as_str()))
            else {
                continue;
            };
            btn.set_text_content(Some(difficulty.label()));
            if difficulty == preferred {
                let _ = btn.class_list().add_1("preferred");
            }

            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                wasm_bindgen_futures::spawn_local(start_game(game.clone(), difficulty));
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Create a game on the server, then open its socket and start the session
    async fn start_game(game: Rc<RefCell<Game>>, difficulty: Difficulty) {
        let (endpoints, credential) = {
            let mut g = game.borrow_mut();
            if g.starting {
                return;
            }
            let Some(credential) = g.credential.clone() else {
                ui::alert("Please log in first");
                return;
            };
            g.starting = true;
            (g.endpoints.clone(), credential)
        };

        let result = net::create_game(&endpoints, difficulty, &credential).await;
        game.borrow_mut().starting = false;
        let game_id = match result {
            Ok(id) => id,
            Err(e) => {
                ui::alert(&e.to_string());
                return;
            }
        };

        if let Some(document) = document() {
            ui::show_screen(&document, Screen::Game);
            if let Some(canvas) = document
                .get_element_by_id("canvas")
                .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
            {
                let (width, height) = fit_canvas(&canvas);
                if let Some(render_state) = game.borrow_mut().render_state.as_mut() {
                    render_state.resize(width, height);
                }
            }
        }

        {
            let mut g = game.borrow_mut();
            g.settings.remember_login(&credential.player_id, Some(difficulty));
            g.settings.save();
            if let Some(old) = g.socket.take() {
                old.close();
            }
            g.hud.clear();
            g.session = Some(Session::new(now_ms()));
            log::info!("Game started, timer initiated");
        }

        let url = endpoints.game_socket(&game_id, &credential.player_id);
        let handler_game = game.clone();
        match GameSocket::connect(&url, move |event| {
            handler_game.borrow_mut().on_link_event(event);
        }) {
            Ok(socket) => game.borrow_mut().socket = Some(socket),
            Err(e) => {
                log::error!("{}", e);
                if let Some(session) = game.borrow_mut().session.as_mut() {
                    session.link_lost(&e.to_string());
                }
            }
        }
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - the pointer slices by passing over targets
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let w = canvas_clone.client_width() as f32;
                let h = canvas_clone.client_height() as f32;
                game.borrow_mut().pointer = Some(client_to_canvas(
                    event.offset_x() as f32,
                    event.offset_y() as f32,
                    w,
                    h,
                ));
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start/move
        for kind in ["touchstart", "touchmove"] {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    let y = touch.client_y() as f32 - rect.top() as f32;
                    let w = canvas_clone.client_width() as f32;
                    let h = canvas_clone.client_height() as f32;
                    game.borrow_mut().pointer = Some(client_to_canvas(x, y, w, h));
                }
            });
            let _ = canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        game.borrow_mut().update(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::io::Read;

    env_logger::init();
    log::info!("Math Slicer (native) starting...");
    log::info!("The playable client is web only - run with `trunk serve`");
    log::info!("Reading a message trace from stdin");

    let mut text = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut text) {
        eprintln!("Failed to read stdin: {e}");
        std::process::exit(1);
    }

    let entries = match math_slicer::replay::parse_trace(&text) {
        Ok(entries) => entries,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    let start = entries.first().map(|e| e.at_ms).unwrap_or(0.0);
    let report = math_slicer::replay::replay(&entries, start);

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to encode report: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
