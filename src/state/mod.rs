pub mod animation;
pub mod controls;
pub mod frame;
pub mod input;
pub mod layout;
pub mod settings;
pub mod touch;

pub use controls::{Haptics, MobileControls};
pub use input::InputState;
pub use settings::{LocalStorageStore, MemoryStore, SettingsManager};
pub use touch::{SurfaceRect, TouchPoint};
