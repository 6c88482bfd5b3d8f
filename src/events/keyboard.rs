use crate::error::{KeyrouteError, Result};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Состояние клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyState {
    Pressed,
    Released,
    Repeat,
}

impl KeyState {
    /// Значение evdev события (0 - отпускание, 1 - нажатие, 2 - автоповтор)
    pub fn from_evdev_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(KeyState::Released),
            1 => Some(KeyState::Pressed),
            2 => Some(KeyState::Repeat),
            _ => None,
        }
    }

    pub fn evdev_value(&self) -> i32 {
        match self {
            KeyState::Released => 0,
            KeyState::Pressed => 1,
            KeyState::Repeat => 2,
        }
    }
}

/// Символьный модификатор в терминах X11
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Modifier {
    Shift,
    Lock,
    Control,
    Mod1,
    Mod2,
    Mod3,
    Mod4,
    Mod5,
}

impl Modifier {
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Shift => "shift",
            Modifier::Lock => "lock",
            Modifier::Control => "control",
            Modifier::Mod1 => "mod1",
            Modifier::Mod2 => "mod2",
            Modifier::Mod3 => "mod3",
            Modifier::Mod4 => "mod4",
            Modifier::Mod5 => "mod5",
        }
    }
}

impl FromStr for Modifier {
    type Err = KeyrouteError;

    fn from_str(s: &str) -> Result<Self> {
        let modifier = match s.trim().to_lowercase().as_str() {
            "shift" => Modifier::Shift,
            "lock" | "capslock" => Modifier::Lock,
            "control" | "ctrl" => Modifier::Control,
            "mod1" | "alt" => Modifier::Mod1,
            "mod2" | "numlock" => Modifier::Mod2,
            "mod3" => Modifier::Mod3,
            "mod4" | "super" | "win" | "logo" => Modifier::Mod4,
            "mod5" | "altgr" => Modifier::Mod5,
            _ => return Err(KeyrouteError::InvalidModifier(s.to_string())),
        };
        Ok(modifier)
    }
}

impl TryFrom<String> for Modifier {
    type Error = KeyrouteError;

    fn try_from(name: String) -> Result<Self> {
        name.parse()
    }
}

impl From<Modifier> for String {
    fn from(modifier: Modifier) -> Self {
        modifier.name().to_string()
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Набор модификаторов: отсортирован и без повторов, сравнивается как множество
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ModifierSet {
    modifiers: SmallVec<[Modifier; 4]>,
}

impl ModifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        self.insert(modifier);
        self
    }

    pub fn insert(&mut self, modifier: Modifier) {
        if let Err(position) = self.modifiers.binary_search(&modifier) {
            self.modifiers.insert(position, modifier);
        }
    }

    pub fn remove(&mut self, modifier: Modifier) {
        if let Ok(position) = self.modifiers.binary_search(&modifier) {
            self.modifiers.remove(position);
        }
    }

    pub fn contains(&self, modifier: Modifier) -> bool {
        self.modifiers.binary_search(&modifier).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = Modifier> + '_ {
        self.modifiers.iter().copied()
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        names
            .iter()
            .map(|name| name.as_ref().parse::<Modifier>())
            .collect()
    }
}

impl FromIterator<Modifier> for ModifierSet {
    fn from_iter<I: IntoIterator<Item = Modifier>>(iter: I) -> Self {
        let mut set = Self::new();
        for modifier in iter {
            set.insert(modifier);
        }
        set
    }
}

impl TryFrom<Vec<String>> for ModifierSet {
    type Error = KeyrouteError;

    fn try_from(names: Vec<String>) -> Result<Self> {
        Self::from_names(&names)
    }
}

impl From<ModifierSet> for Vec<String> {
    fn from(set: ModifierSet) -> Self {
        set.to_vec()
    }
}

impl fmt::Display for ModifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", self.to_vec().join("+"))
        }
    }
}

/// Имя клавиши в стиле X keysym (`k`, `Return`, `F1`, `XF86AudioMute`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySym(String);

impl KeySym {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for KeySym {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for KeySym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Комбинация: набор модификаторов плюс одна немодифицирующая клавиша
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    pub modifiers: ModifierSet,
    pub key: KeySym,
}

impl Chord {
    pub fn new(modifiers: ModifierSet, key: impl Into<KeySym>) -> Self {
        Self {
            modifiers,
            key: key.into(),
        }
    }
}

/// Разбор записи вида `mod4+shift+Return`; последний сегмент всегда клавиша
impl FromStr for Chord {
    type Err = KeyrouteError;

    fn from_str(s: &str) -> Result<Self> {
        let text = s.trim();
        // `+` сама по себе тоже клавиша: `mod4++`
        let (prefix, key) = match text.strip_suffix("++") {
            Some(prefix) => (prefix, "+"),
            None => match text.rsplit_once('+') {
                Some((prefix, key)) => (prefix, key),
                None => ("", text),
            },
        };

        if key.is_empty() {
            return Err(KeyrouteError::InvalidChord(s.to_string()));
        }

        let modifiers = if prefix.is_empty() {
            ModifierSet::new()
        } else {
            prefix
                .split('+')
                .map(|name| {
                    name.parse::<Modifier>()
                        .map_err(|_| KeyrouteError::InvalidChord(s.to_string()))
                })
                .collect::<Result<ModifierSet>>()?
        };

        Ok(Chord::new(modifiers, key))
    }
}

impl fmt::Display for Chord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

/// Физическое нажатие, уже переведённое в keysym
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: KeySym,
    pub state: KeyState,
    pub modifiers: ModifierSet,
    pub timestamp: std::time::Instant,
    pub device_name: String,
}

impl KeyEvent {
    pub fn new(key: KeySym, state: KeyState, modifiers: ModifierSet, device_name: String) -> Self {
        Self {
            key,
            state,
            modifiers,
            timestamp: std::time::Instant::now(),
            device_name,
        }
    }

    pub fn chord(&self) -> Chord {
        Chord::new(self.modifiers.clone(), self.key.clone())
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] {:?} ({})",
            self.chord(),
            self.device_name,
            self.state,
            self.timestamp.elapsed().as_millis()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifier_aliases() {
        assert_eq!("ctrl".parse::<Modifier>().unwrap(), Modifier::Control);
        assert_eq!("Alt".parse::<Modifier>().unwrap(), Modifier::Mod1);
        assert_eq!("super".parse::<Modifier>().unwrap(), Modifier::Mod4);
        assert_eq!("win".parse::<Modifier>().unwrap(), Modifier::Mod4);
        assert!("hyper".parse::<Modifier>().is_err());
    }

    #[test]
    fn test_modifier_set_is_order_independent_and_deduplicated() {
        let a = ModifierSet::from_names(&["shift", "mod4", "shift"]).unwrap();
        let b = ModifierSet::from_names(&["mod4", "shift"]).unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
        assert_eq!(a.to_string(), "shift+mod4");
    }

    #[test]
    fn test_modifier_set_subset_is_not_equal() {
        let win = ModifierSet::new().with(Modifier::Mod4);
        let win_shift = win.clone().with(Modifier::Shift);

        assert_ne!(win, win_shift);
        assert!(win_shift.contains(Modifier::Mod4));
    }

    #[test]
    fn test_chord_parsing() {
        let chord: Chord = "mod4+shift+Return".parse().unwrap();
        assert_eq!(chord.key, KeySym::new("Return"));
        assert!(chord.modifiers.contains(Modifier::Mod4));
        assert!(chord.modifiers.contains(Modifier::Shift));

        let bare: Chord = "XF86AudioMute".parse().unwrap();
        assert!(bare.modifiers.is_empty());

        let plus: Chord = "mod4++".parse().unwrap();
        assert_eq!(plus.key.as_str(), "+");

        assert!("mod4+".parse::<Chord>().is_err());
        assert!("hyper+k".parse::<Chord>().is_err());
    }

    #[test]
    fn test_chord_display() {
        let chord = Chord::new(ModifierSet::new().with(Modifier::Control).with(Modifier::Mod4), "r");
        assert_eq!(chord.to_string(), "control+mod4+r");
        assert_eq!(Chord::new(ModifierSet::new(), "F10").to_string(), "F10");
    }

    #[test]
    fn test_key_state_from_evdev() {
        assert_eq!(KeyState::from_evdev_value(1), Some(KeyState::Pressed));
        assert_eq!(KeyState::from_evdev_value(2), Some(KeyState::Repeat));
        assert_eq!(KeyState::from_evdev_value(7), None);
        assert_eq!(KeyState::Released.evdev_value(), 0);
    }
}
