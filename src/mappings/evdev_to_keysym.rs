use crate::events::{Button, KeySym, Modifier};
use evdev::KeyCode;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

/// Таблица evdev код -> X keysym (символ без учёта Shift)
const KEYSYMS: &[(KeyCode, &str)] = &[
    // Буквенные клавиши
    (KeyCode::KEY_A, "a"),
    (KeyCode::KEY_B, "b"),
    (KeyCode::KEY_C, "c"),
    (KeyCode::KEY_D, "d"),
    (KeyCode::KEY_E, "e"),
    (KeyCode::KEY_F, "f"),
    (KeyCode::KEY_G, "g"),
    (KeyCode::KEY_H, "h"),
    (KeyCode::KEY_I, "i"),
    (KeyCode::KEY_J, "j"),
    (KeyCode::KEY_K, "k"),
    (KeyCode::KEY_L, "l"),
    (KeyCode::KEY_M, "m"),
    (KeyCode::KEY_N, "n"),
    (KeyCode::KEY_O, "o"),
    (KeyCode::KEY_P, "p"),
    (KeyCode::KEY_Q, "q"),
    (KeyCode::KEY_R, "r"),
    (KeyCode::KEY_S, "s"),
    (KeyCode::KEY_T, "t"),
    (KeyCode::KEY_U, "u"),
    (KeyCode::KEY_V, "v"),
    (KeyCode::KEY_W, "w"),
    (KeyCode::KEY_X, "x"),
    (KeyCode::KEY_Y, "y"),
    (KeyCode::KEY_Z, "z"),
    // Цифровые клавиши (верхний ряд)
    (KeyCode::KEY_1, "1"),
    (KeyCode::KEY_2, "2"),
    (KeyCode::KEY_3, "3"),
    (KeyCode::KEY_4, "4"),
    (KeyCode::KEY_5, "5"),
    (KeyCode::KEY_6, "6"),
    (KeyCode::KEY_7, "7"),
    (KeyCode::KEY_8, "8"),
    (KeyCode::KEY_9, "9"),
    (KeyCode::KEY_0, "0"),
    // Специальные клавиши
    (KeyCode::KEY_SPACE, "space"),
    (KeyCode::KEY_ENTER, "Return"),
    (KeyCode::KEY_ESC, "Escape"),
    (KeyCode::KEY_TAB, "Tab"),
    (KeyCode::KEY_BACKSPACE, "BackSpace"),
    (KeyCode::KEY_MINUS, "minus"),
    (KeyCode::KEY_EQUAL, "equal"),
    (KeyCode::KEY_LEFTBRACE, "bracketleft"),
    (KeyCode::KEY_RIGHTBRACE, "bracketright"),
    (KeyCode::KEY_BACKSLASH, "backslash"),
    (KeyCode::KEY_SEMICOLON, "semicolon"),
    (KeyCode::KEY_APOSTROPHE, "apostrophe"),
    (KeyCode::KEY_GRAVE, "grave"),
    (KeyCode::KEY_COMMA, "comma"),
    (KeyCode::KEY_DOT, "period"),
    (KeyCode::KEY_SLASH, "slash"),
    // Навигация
    (KeyCode::KEY_UP, "Up"),
    (KeyCode::KEY_DOWN, "Down"),
    (KeyCode::KEY_LEFT, "Left"),
    (KeyCode::KEY_RIGHT, "Right"),
    (KeyCode::KEY_HOME, "Home"),
    (KeyCode::KEY_END, "End"),
    (KeyCode::KEY_PAGEUP, "Prior"),
    (KeyCode::KEY_PAGEDOWN, "Next"),
    (KeyCode::KEY_INSERT, "Insert"),
    (KeyCode::KEY_DELETE, "Delete"),
    // Системные
    (KeyCode::KEY_SYSRQ, "Print"),
    (KeyCode::KEY_SCROLLLOCK, "Scroll_Lock"),
    (KeyCode::KEY_PAUSE, "Pause"),
    (KeyCode::KEY_MENU, "Menu"),
    // Функциональные клавиши
    (KeyCode::KEY_F1, "F1"),
    (KeyCode::KEY_F2, "F2"),
    (KeyCode::KEY_F3, "F3"),
    (KeyCode::KEY_F4, "F4"),
    (KeyCode::KEY_F5, "F5"),
    (KeyCode::KEY_F6, "F6"),
    (KeyCode::KEY_F7, "F7"),
    (KeyCode::KEY_F8, "F8"),
    (KeyCode::KEY_F9, "F9"),
    (KeyCode::KEY_F10, "F10"),
    (KeyCode::KEY_F11, "F11"),
    (KeyCode::KEY_F12, "F12"),
    // Мультимедиа
    (KeyCode::KEY_MUTE, "XF86AudioMute"),
    (KeyCode::KEY_VOLUMEUP, "XF86AudioRaiseVolume"),
    (KeyCode::KEY_VOLUMEDOWN, "XF86AudioLowerVolume"),
    (KeyCode::KEY_PLAYPAUSE, "XF86AudioPlay"),
    (KeyCode::KEY_NEXTSONG, "XF86AudioNext"),
    (KeyCode::KEY_PREVIOUSSONG, "XF86AudioPrev"),
    (KeyCode::KEY_BRIGHTNESSUP, "XF86MonBrightnessUp"),
    (KeyCode::KEY_BRIGHTNESSDOWN, "XF86MonBrightnessDown"),
];

static CODE_TO_KEYSYM: Lazy<HashMap<u16, &'static str>> = Lazy::new(|| {
    KEYSYMS
        .iter()
        .map(|(code, name)| (code.code(), *name))
        .collect()
});

static KNOWN_KEYSYMS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| KEYSYMS.iter().map(|(_, name)| *name).collect());

/// Преобразование evdev кодов в keysym, модификаторы и кнопки указателя
pub struct EvdevToKeySym;

impl EvdevToKeySym {
    pub fn translate(code: u16) -> Option<KeySym> {
        CODE_TO_KEYSYM.get(&code).map(|name| KeySym::new(*name))
    }

    /// Может ли такой keysym прийти с клавиатуры через evdev
    pub fn is_known(keysym: &KeySym) -> bool {
        KNOWN_KEYSYMS.contains(keysym.as_str())
    }

    /// Модификатор, который выставляет клавиша; Lock и NumLock не отслеживаются
    pub fn modifier(code: u16) -> Option<Modifier> {
        match KeyCode::new(code) {
            KeyCode::KEY_LEFTSHIFT | KeyCode::KEY_RIGHTSHIFT => Some(Modifier::Shift),
            KeyCode::KEY_LEFTCTRL | KeyCode::KEY_RIGHTCTRL => Some(Modifier::Control),
            KeyCode::KEY_LEFTALT => Some(Modifier::Mod1),
            KeyCode::KEY_LEFTMETA | KeyCode::KEY_RIGHTMETA => Some(Modifier::Mod4),
            KeyCode::KEY_RIGHTALT => Some(Modifier::Mod5),
            _ => None,
        }
    }

    pub fn button(code: u16) -> Option<Button> {
        match KeyCode::new(code) {
            KeyCode::BTN_LEFT => Some(Button::LEFT),
            KeyCode::BTN_MIDDLE => Some(Button::MIDDLE),
            KeyCode::BTN_RIGHT => Some(Button::RIGHT),
            KeyCode::BTN_SIDE => Some(Button(8)),
            KeyCode::BTN_EXTRA => Some(Button(9)),
            _ => None,
        }
    }
}
