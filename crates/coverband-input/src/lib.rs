//! Input side of a chart session: key maps, key events and their sources,
//! held-key tracking, and autoplay.

pub mod autoplay;
pub mod event;
pub mod key_map;
pub mod key_state;
pub mod router;
pub mod scripted;

pub use autoplay::create_autoplay_log;
pub use event::{InputProvider, KeyEvent};
pub use key_map::KeyMap;
pub use key_state::KeyState;
pub use router::KeyRouter;
pub use scripted::ScriptedInput;
