mod dry_input_listener;
mod keyboard_listener;
mod modifier_state;
mod pointer_listener;
mod r#trait;

pub use self::modifier_state::ModifierState;
pub use self::r#trait::{create_input_listeners, InputListenerTrait};
