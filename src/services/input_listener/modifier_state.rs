use crate::events::ModifierSet;
use crate::mappings::EvdevToKeySym;
use smallvec::SmallVec;

/// Зажатые клавиши-модификаторы.
///
/// Хранятся коды, а не модификаторы: отпускание правого Shift не должно
/// снимать Shift, пока зажат левый.
#[derive(Debug, Default)]
pub struct ModifierState {
    held: SmallVec<[u16; 8]>,
}

impl ModifierState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn to_modifiers(&self) -> ModifierSet {
        self.held
            .iter()
            .filter_map(|code| EvdevToKeySym::modifier(*code))
            .collect()
    }

    /// Возвращает `true`, если клавиша оказалась модификатором
    pub fn update_key(&mut self, code: u16, pressed: bool) -> bool {
        if EvdevToKeySym::modifier(code).is_none() {
            return false;
        }

        if pressed {
            if !self.held.contains(&code) {
                self.held.push(code);
            }
        } else {
            self.held.retain(|held| *held != code);
        }
        true
    }
}
