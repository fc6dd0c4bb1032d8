mod components;
mod error;
mod model;
mod render;
mod state;
mod util;

use components::app::App;

fn main() {
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("logger init failed: {}", e).into());
        }
    }
    log::info!("Barrel Blaster controls starting");
    yew::Renderer::<App>::new().render();
}
