pub mod keyboard;
pub mod pointer;

pub use keyboard::{Chord, KeyEvent, KeySym, KeyState, Modifier, ModifierSet};
pub use pointer::{Button, ButtonPhase, Point};

/// Событие для виртуальной клавиатуры (проброс несвязанных клавиш)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VirtualKeyEvent {
    pub code: u16,
    pub state: KeyState,
    pub timestamp: std::time::Instant,
}

impl VirtualKeyEvent {
    pub fn new(code: u16, state: KeyState) -> Self {
        Self {
            code,
            state,
            timestamp: std::time::Instant::now(),
        }
    }

    pub fn press(code: u16) -> Self {
        Self::new(code, KeyState::Pressed)
    }

    pub fn release(code: u16) -> Self {
        Self::new(code, KeyState::Released)
    }
}
