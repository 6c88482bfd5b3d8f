use crate::bindings::{BindingTable, Command};
use crate::error::{KeyrouteError, Result};
use crate::events::{Chord, Modifier, ModifierSet};
use std::collections::HashMap;
use tracing::debug;

/// Непрозрачный идентификатор окна хоста
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub u64);

/// Объявление группы (рабочего пространства)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub name: String,
    /// Экран, за которым закреплён банк этой группы
    pub screen: usize,
}

/// Банк групп: алфавит имён с явным номером экрана.
///
/// Для каждой группы регистрируются две комбинации:
/// `modifiers + имя -> group.to_screen(имя, screen)` и
/// `move_modifiers + имя -> window.to_group(имя)`.
#[derive(Debug, Clone)]
pub struct GroupBank {
    pub names: Vec<String>,
    pub screen: usize,
    pub modifiers: ModifierSet,
    pub move_modifiers: ModifierSet,
    pub bind_keys: bool,
}

impl GroupBank {
    pub fn new(names: Vec<String>, screen: usize, modifiers: ModifierSet) -> Self {
        let move_modifiers = modifiers.clone().with(Modifier::Shift);
        Self {
            names,
            screen,
            modifiers,
            move_modifiers,
            bind_keys: true,
        }
    }

    /// Имена из алфавита: каждый символ - отдельная группа, с необязательным префиксом
    pub fn names_from_alphabet(alphabet: &str, prefix: &str) -> Vec<String> {
        alphabet
            .chars()
            .map(|c| format!("{}{}", prefix, c))
            .collect()
    }
}

/// Упорядоченный реестр групп в порядке объявления
#[derive(Debug, Clone, Default)]
pub struct GroupRegistry {
    groups: Vec<GroupSpec>,
    by_name: HashMap<String, usize>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, spec: GroupSpec) -> Result<usize> {
        if spec.name.is_empty() {
            return Err(KeyrouteError::InvalidConfig("пустое имя группы".to_string()));
        }
        if self.by_name.contains_key(&spec.name) {
            return Err(KeyrouteError::DuplicateGroup(spec.name));
        }

        let index = self.groups.len();
        self.by_name.insert(spec.name.clone(), index);
        self.groups.push(spec);
        Ok(index)
    }

    /// Добавить банк и зарегистрировать производные комбинации
    pub fn register_bank(&mut self, bank: &GroupBank, table: &mut BindingTable) -> Result<()> {
        debug!(
            "Банк из {} групп закреплён за экраном #{}",
            bank.names.len(),
            bank.screen
        );

        for name in &bank.names {
            self.add(GroupSpec {
                name: name.clone(),
                screen: bank.screen,
            })?;

            if bank.bind_keys {
                table.register(
                    Chord::new(bank.modifiers.clone(), name.as_str()),
                    Command::to_screen(name.clone(), bank.screen),
                )?;
                table.register(
                    Chord::new(bank.move_modifiers.clone(), name.as_str()),
                    Command::to_group(name.clone()),
                )?;
            }
        }

        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GroupSpec> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::KeySym;

    fn win() -> ModifierSet {
        ModifierSet::new().with(Modifier::Mod4)
    }

    #[test]
    fn test_names_from_alphabet() {
        assert_eq!(
            GroupBank::names_from_alphabet("123", "F"),
            vec!["F1".to_string(), "F2".to_string(), "F3".to_string()]
        );
        assert_eq!(GroupBank::names_from_alphabet("90", "").len(), 2);
    }

    #[test]
    fn test_bank_registers_switch_and_move_chords() {
        let mut registry = GroupRegistry::new();
        let mut table = BindingTable::new();
        let bank = GroupBank::new(GroupBank::names_from_alphabet("1234567890", ""), 0, win());

        registry.register_bank(&bank, &mut table).unwrap();

        assert_eq!(registry.len(), 10);
        assert_eq!(registry.iter().last().map(|g| g.name.as_str()), Some("0"));
        assert_eq!(
            table.resolve(&win(), &KeySym::new("5")),
            Some(&Command::to_screen("5", 0))
        );
        assert_eq!(
            table.resolve(&win().with(Modifier::Shift), &KeySym::new("5")),
            Some(&Command::to_group("5"))
        );
    }

    #[test]
    fn test_second_bank_routes_to_its_screen() {
        let mut registry = GroupRegistry::new();
        let mut table = BindingTable::new();
        registry
            .register_bank(&GroupBank::new(GroupBank::names_from_alphabet("123", ""), 0, win()), &mut table)
            .unwrap();
        registry
            .register_bank(&GroupBank::new(GroupBank::names_from_alphabet("123", "F"), 1, win()), &mut table)
            .unwrap();

        let f3 = registry.iter().find(|g| g.name == "F3").unwrap();
        assert_eq!(f3.screen, 1);
        assert_eq!(
            table.resolve(&win(), &KeySym::new("F3")),
            Some(&Command::to_screen("F3", 1))
        );
    }

    #[test]
    fn test_duplicate_group_name_is_rejected() {
        let mut registry = GroupRegistry::new();
        let mut table = BindingTable::new();
        let bank = GroupBank::new(vec!["a".into()], 0, win());
        registry.register_bank(&bank, &mut table).unwrap();

        let err = registry.register_bank(&bank, &mut table).unwrap_err();
        assert!(matches!(err, KeyrouteError::DuplicateGroup(ref name) if name == "a"));
    }

    #[test]
    fn test_bank_without_keys() {
        let mut registry = GroupRegistry::new();
        let mut table = BindingTable::new();
        let mut bank = GroupBank::new(vec!["web".into()], 0, win());
        bank.bind_keys = false;

        registry.register_bank(&bank, &mut table).unwrap();
        assert!(registry.contains("web"));
        assert!(table.is_empty());
    }
}
