use crate::bindings::command::Command;
use crate::error::{KeyrouteError, Result};
use crate::events::{Button, Chord, KeySym, ModifierSet};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Что хост должен сообщить о сфокусированном окне в начале перетаскивания
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowAccessor {
    Position,
    Size,
}

/// Действие, выполняемое на каждом шаге перетаскивания
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragAction {
    MoveFloating,
    ResizeFloating,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MouseBinding {
    Drag {
        start: WindowAccessor,
        action: DragAction,
    },
    Click {
        command: Command,
    },
}

/// Таблица привязок: клавиатурные комбинации и кнопки указателя.
///
/// Повторная регистрация той же комбинации отклоняется с
/// `DuplicateBinding`. Сравнение модификаторов - строгое равенство множеств.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    keys: HashMap<Chord, Command>,
    mouse: HashMap<(ModifierSet, Button), MouseBinding>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, chord: Chord, command: Command) -> Result<()> {
        if self.keys.contains_key(&chord) {
            return Err(KeyrouteError::DuplicateBinding {
                chord: chord.to_string(),
            });
        }

        debug!("Привязка {} -> {}", chord, command);
        self.keys.insert(chord, command);
        Ok(())
    }

    pub fn resolve(&self, modifiers: &ModifierSet, key: &KeySym) -> Option<&Command> {
        // Chord владеет данными, поэтому ключ для поиска собирается на месте
        self.keys.get(&Chord::new(modifiers.clone(), key.clone()))
    }

    pub fn register_mouse(
        &mut self,
        modifiers: ModifierSet,
        button: Button,
        binding: MouseBinding,
    ) -> Result<()> {
        let key = (modifiers, button);
        if self.mouse.contains_key(&key) {
            return Err(KeyrouteError::DuplicateBinding {
                chord: format!("{}+{}", key.0, key.1),
            });
        }

        debug!("Привязка кнопки {}+{} -> {:?}", key.0, key.1, binding);
        self.mouse.insert(key, binding);
        Ok(())
    }

    pub fn resolve_mouse(&self, modifiers: &ModifierSet, button: Button) -> Option<&MouseBinding> {
        self.mouse.get(&(modifiers.clone(), button))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn mouse_len(&self) -> usize {
        self.mouse.len()
    }

    /// Все клавиатурные привязки в стабильном порядке (для вывода)
    pub fn sorted_keys(&self) -> Vec<(&Chord, &Command)> {
        let mut entries: Vec<_> = self.keys.iter().collect();
        entries.sort_by_key(|(chord, _)| chord.to_string());
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::command::LayoutOp;
    use crate::events::Modifier;

    fn win() -> ModifierSet {
        ModifierSet::new().with(Modifier::Mod4)
    }

    #[test]
    fn test_resolve_exact_chord() {
        let mut table = BindingTable::new();
        table
            .register(Chord::new(win(), "k"), Command::Layout(LayoutOp::FocusDown))
            .unwrap();

        assert_eq!(
            table.resolve(&win(), &KeySym::new("k")),
            Some(&Command::Layout(LayoutOp::FocusDown))
        );
    }

    #[test]
    fn test_superset_and_subset_are_unbound() {
        let mut table = BindingTable::new();
        table
            .register(Chord::new(win(), "k"), Command::Layout(LayoutOp::FocusDown))
            .unwrap();

        let superset = win().with(Modifier::Shift);
        assert_eq!(table.resolve(&superset, &KeySym::new("k")), None);
        assert_eq!(table.resolve(&ModifierSet::new(), &KeySym::new("k")), None);
    }

    #[test]
    fn test_superset_resolves_when_registered_separately() {
        let mut table = BindingTable::new();
        table
            .register(Chord::new(win(), "k"), Command::Layout(LayoutOp::FocusDown))
            .unwrap();
        table
            .register(
                Chord::new(win().with(Modifier::Control), "k"),
                Command::Layout(LayoutOp::ShuffleDown),
            )
            .unwrap();

        assert_eq!(
            table.resolve(&win().with(Modifier::Control), &KeySym::new("k")),
            Some(&Command::Layout(LayoutOp::ShuffleDown))
        );
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_duplicate_chord_is_rejected() {
        let mut table = BindingTable::new();
        table.register(Chord::new(win(), "r"), Command::spawn("dmenu_run")).unwrap();

        let err = table
            .register(Chord::new(win(), "r"), Command::spawn("rofi"))
            .unwrap_err();

        assert!(matches!(err, KeyrouteError::DuplicateBinding { ref chord } if chord == "mod4+r"));
        // Первая привязка осталась на месте
        assert_eq!(
            table.resolve(&win(), &KeySym::new("r")),
            Some(&Command::spawn("dmenu_run"))
        );
    }

    #[test]
    fn test_mouse_bindings() {
        let mut table = BindingTable::new();
        let drag = MouseBinding::Drag {
            start: WindowAccessor::Position,
            action: DragAction::MoveFloating,
        };
        table.register_mouse(win(), Button::LEFT, drag.clone()).unwrap();

        assert_eq!(table.resolve_mouse(&win(), Button::LEFT), Some(&drag));
        assert_eq!(table.resolve_mouse(&win(), Button::RIGHT), None);
        assert!(table.register_mouse(win(), Button::LEFT, drag).is_err());
        assert_eq!(table.mouse_len(), 1);
    }
}
