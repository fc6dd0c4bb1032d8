pub mod app;
pub mod settings_modal;
