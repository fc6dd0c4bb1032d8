use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{AddEventListenerOptions, HtmlCanvasElement, KeyboardEvent, TouchEvent};
use yew::prelude::*;

use super::settings_modal::SettingsModal;
use crate::render::{CanvasSurface, draw_input_hud};
use crate::state::settings::{ButtonSize, Settings, SettingsStore};
use crate::state::{
    InputState, LocalStorageStore, MemoryStore, MobileControls, SettingsManager,
};
use crate::util::{
    NavigatorHaptics, context_2d, is_mobile_device, page_config, performance_now, surface_rect,
    touch_points, viewport_width,
};

#[derive(Clone, Copy, Debug)]
enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

impl TouchPhase {
    fn event_name(self) -> &'static str {
        match self {
            TouchPhase::Start => "touchstart",
            TouchPhase::Move => "touchmove",
            TouchPhase::End => "touchend",
            TouchPhase::Cancel => "touchcancel",
        }
    }
}

fn settings_store() -> Box<dyn SettingsStore> {
    let available = web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .is_some();
    if available {
        Box::new(LocalStorageStore)
    } else {
        log::warn!("localStorage unavailable, settings will not persist");
        Box::new(MemoryStore::default())
    }
}

fn touch_listener(
    phase: TouchPhase,
    canvas: HtmlCanvasElement,
    controls: Rc<RefCell<MobileControls>>,
    input: Rc<RefCell<InputState>>,
    passive: bool,
) -> Closure<dyn FnMut(TouchEvent)> {
    Closure::wrap(Box::new(move |e: TouchEvent| {
        let started = performance_now();
        if !passive {
            e.prevent_default();
        }
        let points = touch_points(&e.changed_touches());
        let mut c = controls.borrow_mut();
        let mut inp = input.borrow_mut();
        match phase {
            TouchPhase::Start => c.touch_start(&mut inp, &points, &surface_rect(&canvas), started),
            TouchPhase::Move => {
                c.touch_move(&mut inp, &points, &surface_rect(&canvas), started);
            }
            TouchPhase::End => c.touch_end(&mut inp, &points),
            TouchPhase::Cancel => c.touch_cancel(&mut inp, &points),
        }
        if c.config().performance_logging {
            c.log_slow_handler(phase.event_name(), performance_now() - started);
        }
    }) as Box<dyn FnMut(_)>)
}

#[function_component(App)]
pub fn app() -> Html {
    let game_ref = use_node_ref();
    let overlay_ref = use_node_ref();
    let settings = use_mut_ref(|| SettingsManager::new(settings_store()));
    let input = use_mut_ref(InputState::new);
    let controls = {
        let settings = settings.clone();
        use_mut_ref(move || {
            MobileControls::new(
                page_config(),
                &*settings.borrow(),
                viewport_width(),
                Box::new(NavigatorHaptics),
            )
        })
    };
    // set when the overlay must be wiped before the next frame (layout rebuilt)
    let overlay_stale = use_mut_ref(|| true);
    let open_settings = use_state(|| false);
    let settings_view = use_state(|| settings.borrow().settings().clone());

    // Mount: listeners + RAF loop
    {
        let game_ref = game_ref.clone();
        let overlay_ref = overlay_ref.clone();
        let controls = controls.clone();
        let input = input.clone();
        let overlay_stale = overlay_stale.clone();
        use_effect_with((), move |_| {
            let window = web_sys::window().expect("window");
            let game: HtmlCanvasElement = game_ref.cast::<HtmlCanvasElement>().expect("game canvas");
            let overlay: HtmlCanvasElement =
                overlay_ref.cast::<HtmlCanvasElement>().expect("overlay canvas");
            let cfg = controls.borrow().config().clone();
            for canvas in [&game, &overlay] {
                canvas.set_width(cfg.canvas_width as u32);
                canvas.set_height(cfg.canvas_height as u32);
            }
            let mobile = Rc::new(Cell::new(is_mobile_device(cfg.mobile_breakpoint)));
            log::info!("controls mounted (mobile: {})", mobile.get());

            // Touch
            let opts = AddEventListenerOptions::new();
            opts.set_passive(cfg.passive_listeners);
            let touch_cbs: Vec<(TouchPhase, Closure<dyn FnMut(TouchEvent)>)> =
                [TouchPhase::Start, TouchPhase::Move, TouchPhase::End, TouchPhase::Cancel]
                    .into_iter()
                    .map(|phase| {
                        let cb = touch_listener(
                            phase,
                            overlay.clone(),
                            controls.clone(),
                            input.clone(),
                            cfg.passive_listeners,
                        );
                        (phase, cb)
                    })
                    .collect();
            for (phase, cb) in &touch_cbs {
                if let Err(e) = overlay.add_event_listener_with_callback_and_add_event_listener_options(
                    phase.event_name(),
                    cb.as_ref().unchecked_ref(),
                    &opts,
                ) {
                    log::warn!("failed to register {}: {:?}", phase.event_name(), e);
                }
            }

            // Keyboard
            let keydown_cb = {
                let input = input.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    let key = e.key();
                    if InputState::is_game_key(&key) {
                        e.prevent_default();
                    }
                    input.borrow_mut().key_down(&key);
                }) as Box<dyn FnMut(_)>)
            };
            let keyup_cb = {
                let input = input.clone();
                Closure::wrap(Box::new(move |e: KeyboardEvent| {
                    input.borrow_mut().key_up(&e.key());
                }) as Box<dyn FnMut(_)>)
            };
            let blur_cb = {
                let input = input.clone();
                Closure::wrap(Box::new(move || {
                    input.borrow_mut().blur();
                }) as Box<dyn FnMut()>)
            };
            window
                .add_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref())
                .ok();
            window
                .add_event_listener_with_callback("keyup", keyup_cb.as_ref().unchecked_ref())
                .ok();
            window
                .add_event_listener_with_callback("blur", blur_cb.as_ref().unchecked_ref())
                .ok();

            // Resize: only mobile layouts react to the small-screen breakpoint
            let resize_cb = {
                let controls = controls.clone();
                let mobile = mobile.clone();
                let overlay_stale = overlay_stale.clone();
                let breakpoint = cfg.mobile_breakpoint;
                Closure::wrap(Box::new(move || {
                    mobile.set(is_mobile_device(breakpoint));
                    if !mobile.get() {
                        return;
                    }
                    if controls.borrow_mut().on_resize(viewport_width(), performance_now()) {
                        *overlay_stale.borrow_mut() = true;
                    }
                }) as Box<dyn FnMut()>)
            };
            window
                .add_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref())
                .ok();

            // RAF loop
            let game_ctx = context_2d(&game)
                .map_err(|e| log::warn!("game canvas: {}", e))
                .ok();
            let overlay_ctx = context_2d(&overlay)
                .map_err(|e| log::warn!("overlay canvas: {}", e))
                .ok();
            let mut game_surface = game_ctx.map(CanvasSurface::new);
            let mut overlay_surface = overlay_ctx.clone().map(CanvasSurface::new);
            let raf_id = Rc::new(RefCell::new(None));
            {
                let raf_id_clone = raf_id.clone();
                let window_loop = window.clone();
                let controls = controls.clone();
                let input = input.clone();
                let mobile = mobile.clone();
                let overlay_stale = overlay_stale.clone();
                let mut last = performance_now();
                let closure_cell: Rc<RefCell<Option<Closure<dyn FnMut()>>>> =
                    Rc::new(RefCell::new(None));
                let closure_cell_clone = closure_cell.clone();
                *closure_cell.borrow_mut() = Some(Closure::wrap(Box::new(move || {
                    let now = performance_now();
                    let dt = ((now - last) / 1000.0).clamp(0.0, 0.1);
                    last = now;
                    {
                        let mut c = controls.borrow_mut();
                        if std::mem::take(&mut *overlay_stale.borrow_mut()) {
                            if let Some(ctx) = &overlay_ctx {
                                ctx.clear_rect(0.0, 0.0, cfg.canvas_width, cfg.canvas_height);
                            }
                            c.invalidate();
                        }
                        c.update(dt);
                        if mobile.get() {
                            if let Some(surface) = overlay_surface.as_mut() {
                                c.render(surface);
                            }
                        }
                    }
                    {
                        let mut inp = input.borrow_mut();
                        if let Some(surface) = game_surface.as_mut() {
                            draw_input_hud(surface, &inp, &cfg);
                        }
                        inp.clear_pressed();
                    }
                    if let Some(cb) = closure_cell_clone.borrow().as_ref() {
                        if let Ok(id) = window_loop.request_animation_frame(cb.as_ref().unchecked_ref()) {
                            *raf_id_clone.borrow_mut() = Some(id);
                        }
                    }
                }) as Box<dyn FnMut()>));
                if let Some(cb) = closure_cell.borrow().as_ref() {
                    if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
                        *raf_id.borrow_mut() = Some(id);
                    }
                }
            }

            // Cleanup
            let window_clone = window.clone();
            move || {
                for (phase, cb) in &touch_cbs {
                    let _ = overlay.remove_event_listener_with_callback(
                        phase.event_name(),
                        cb.as_ref().unchecked_ref(),
                    );
                }
                let _ = window_clone
                    .remove_event_listener_with_callback("keydown", keydown_cb.as_ref().unchecked_ref());
                let _ = window_clone
                    .remove_event_listener_with_callback("keyup", keyup_cb.as_ref().unchecked_ref());
                let _ = window_clone
                    .remove_event_listener_with_callback("blur", blur_cb.as_ref().unchecked_ref());
                let _ = window_clone
                    .remove_event_listener_with_callback("resize", resize_cb.as_ref().unchecked_ref());
                if let Some(id) = *raf_id.borrow() {
                    let _ = window_clone.cancel_animation_frame(id);
                }
                controls.borrow_mut().release_all(&mut input.borrow_mut());
                let _keep_alive = (&touch_cbs, &keydown_cb, &keyup_cb, &blur_cb, &resize_cb);
            }
        });
    }

    // Settings changes: persist, then rebuild the layout from the new values
    let update_settings = {
        let settings = settings.clone();
        let controls = controls.clone();
        let overlay_stale = overlay_stale.clone();
        let settings_view = settings_view.clone();
        Callback::from(move |change: Box<dyn FnOnce(&mut SettingsManager)>| {
            let mut manager = settings.borrow_mut();
            change(&mut manager);
            if let Err(e) = manager.save() {
                log::warn!("SettingsManager: unable to save settings: {}", e);
            }
            controls.borrow_mut().apply_settings(&*manager, performance_now());
            *overlay_stale.borrow_mut() = true;
            settings_view.set(manager.settings().clone());
        })
    };
    let on_size = {
        let update = update_settings.clone();
        Callback::from(move |size: ButtonSize| {
            update.emit(Box::new(move |m: &mut SettingsManager| {
                m.set("buttonSize", serde_json::to_value(size).unwrap_or_default());
            }))
        })
    };
    let on_opacity = {
        let update = update_settings.clone();
        Callback::from(move |opacity: f64| {
            update.emit(Box::new(move |m: &mut SettingsManager| {
                m.set("buttonOpacity", opacity.into());
            }))
        })
    };
    let on_toggle_haptic = {
        let update = update_settings.clone();
        let enabled = settings_view.haptic_enabled;
        Callback::from(move |_| {
            update.emit(Box::new(move |m: &mut SettingsManager| {
                m.set("hapticEnabled", (!enabled).into());
            }))
        })
    };
    let on_reset = {
        let update = update_settings.clone();
        Callback::from(move |_| {
            update.emit(Box::new(|m: &mut SettingsManager| m.reset_to_defaults()))
        })
    };
    let open_cb = {
        let open_settings = open_settings.clone();
        Callback::from(move |_| open_settings.set(true))
    };
    let close_cb = {
        let open_settings = open_settings.clone();
        Callback::from(move |_| open_settings.set(false))
    };

    let current: &Settings = &settings_view;
    html! {
        <div style="position:relative; width:100vw; max-width:1280px; margin:0 auto; background:#000;">
            <div style="position:relative; width:100%; aspect-ratio:16 / 9;">
                <canvas ref={game_ref} style="position:absolute; inset:0; width:100%; height:100%; display:block;" />
                <canvas ref={overlay_ref} style="position:absolute; inset:0; width:100%; height:100%; display:block; touch-action:none;" />
            </div>
            <button onclick={open_cb} style="position:absolute; top:12px; right:12px; padding:4px 10px;">{"Settings"}</button>
            <SettingsModal
                show={*open_settings}
                settings={current.clone()}
                on_close={close_cb}
                on_size={on_size}
                on_opacity={on_opacity}
                on_toggle_haptic={on_toggle_haptic}
                on_reset={on_reset}
            />
        </div>
    }
}
