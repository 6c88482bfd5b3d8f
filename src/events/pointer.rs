use crate::error::{KeyrouteError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Кнопка указателя (нумерация X11: Button1 - левая, Button3 - правая)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Button(pub u8);

impl Button {
    pub const LEFT: Button = Button(1);
    pub const MIDDLE: Button = Button(2);
    pub const RIGHT: Button = Button(3);
}

impl FromStr for Button {
    type Err = KeyrouteError;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix("Button")
            .or_else(|| trimmed.strip_prefix("button"))
            .unwrap_or(trimmed);

        match digits.parse::<u8>() {
            Ok(n) if n >= 1 => Ok(Button(n)),
            _ => Err(KeyrouteError::InvalidConfig(format!(
                "неизвестная кнопка указателя: {}",
                s
            ))),
        }
    }
}

impl TryFrom<String> for Button {
    type Error = KeyrouteError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Button> for String {
    fn from(button: Button) -> Self {
        button.to_string()
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Button{}", self.0)
    }
}

/// Фаза события кнопки
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonPhase {
    Press,
    Release,
    /// Смещение указателя при удерживаемой кнопке
    Motion { dx: i32, dy: i32 },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_parsing() {
        assert_eq!("Button1".parse::<Button>().unwrap(), Button::LEFT);
        assert_eq!("button3".parse::<Button>().unwrap(), Button::RIGHT);
        assert_eq!("2".parse::<Button>().unwrap(), Button::MIDDLE);
        assert!("Button0".parse::<Button>().is_err());
        assert!("wheel".parse::<Button>().is_err());
    }

    #[test]
    fn test_point_offset() {
        let point = Point::new(10, 20).offset(-15, 5);
        assert_eq!(point, Point::new(-5, 25));
        assert_eq!(point.to_string(), "(-5, 25)");
    }
}
