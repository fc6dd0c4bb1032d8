use wasm_bindgen::JsCast;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::state::settings::{ButtonSize, Settings};

#[derive(Properties, PartialEq, Clone)]
pub struct SettingsModalProps {
    pub show: bool,
    pub settings: Settings,
    pub on_close: Callback<()>,
    pub on_size: Callback<ButtonSize>,
    pub on_opacity: Callback<f64>,
    pub on_toggle_haptic: Callback<()>,
    pub on_reset: Callback<()>,
}

fn size_from_value(value: &str) -> Option<ButtonSize> {
    match value {
        "small" => Some(ButtonSize::Small),
        "medium" => Some(ButtonSize::Medium),
        "large" => Some(ButtonSize::Large),
        _ => None,
    }
}

#[function_component]
pub fn SettingsModal(props: &SettingsModalProps) -> Html {
    if !props.show {
        return html! {};
    }

    let close_cb = {
        let cb = props.on_close.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let size_cb = {
        let cb = props.on_size.clone();
        Callback::from(move |e: Event| {
            let Some(select) = e.target().and_then(|t| t.dyn_into::<HtmlSelectElement>().ok()) else {
                return;
            };
            if let Some(size) = size_from_value(&select.value()) {
                cb.emit(size);
            }
        })
    };
    let opacity_cb = {
        let cb = props.on_opacity.clone();
        Callback::from(move |e: InputEvent| {
            let Some(input) = e.target().and_then(|t| t.dyn_into::<HtmlInputElement>().ok()) else {
                return;
            };
            if let Ok(v) = input.value().parse::<f64>() {
                cb.emit(v);
            }
        })
    };
    let haptic_cb = {
        let cb = props.on_toggle_haptic.clone();
        Callback::from(move |_| cb.emit(()))
    };
    let reset_cb = {
        let cb = props.on_reset.clone();
        Callback::from(move |_| {
            let confirmed = web_sys::window()
                .map(|win| {
                    win.confirm_with_message("Reset all touch control settings to defaults?")
                        .unwrap_or(false)
                })
                .unwrap_or(true);
            if confirmed {
                cb.emit(());
            }
        })
    };

    let s = &props.settings;
    let size_value = match s.button_size {
        ButtonSize::Small => "small",
        ButtonSize::Medium => "medium",
        ButtonSize::Large => "large",
    };

    html! {<div style="position:absolute; inset:0; display:flex; align-items:center; justify-content:center; background:rgba(0,0,0,0.55); z-index:50;">
        <div style="background:#161b22; border:1px solid #30363d; border-radius:12px; padding:16px 20px; min-width:300px; max-width:440px; display:flex; flex-direction:column; gap:14px; color:#e6edf3; font-family:monospace;">
            <div style="display:flex; justify-content:space-between; align-items:center;">
                <h3 style="margin:0; font-size:18px;">{"Touch Controls"}</h3>
                <button onclick={close_cb.clone()} style="padding:4px 8px;">{"Close"}</button>
            </div>
            <div style="display:flex; flex-direction:column; gap:10px;">
                <label style="display:flex; align-items:center; gap:8px;">
                    <span style="flex:1;">{"Button Size"}</span>
                    <select onchange={size_cb}>
                        <option value="small" selected={size_value == "small"}>{"Small"}</option>
                        <option value="medium" selected={size_value == "medium"}>{"Medium"}</option>
                        <option value="large" selected={size_value == "large"}>{"Large"}</option>
                    </select>
                </label>
                <label style="display:flex; align-items:center; gap:8px;">
                    <span style="flex:1;">{"Opacity"}</span>
                    <input type="range" min="0.3" max="1" step="0.05" value={s.button_opacity.to_string()} oninput={opacity_cb} />
                    <span style="min-width:40px; text-align:right;">{ format!("{:.0}%", s.button_opacity * 100.0) }</span>
                </label>
                <label style="display:flex; align-items:center; gap:8px; cursor:pointer;">
                    <input type="checkbox" checked={s.haptic_enabled} onclick={haptic_cb} />
                    <span>{"Haptic Feedback"}</span>
                </label>
            </div>
            <div style="display:flex; gap:8px; flex-wrap:wrap;">
                <button onclick={reset_cb} style="background:#f85149; border:1px solid #b62324; color:#fff; flex:1;">{"Reset to Defaults"}</button>
                <button onclick={close_cb} style="flex:0 0 auto;">{"Done"}</button>
            </div>
        </div>
    </div>}
}
