//! Отложенные команды.
//!
//! `Command` - это только описание действия. Создание команды ничего не
//! выполняет; выполняет её исключительно `Dispatcher`, обращаясь к `Host`.

use crate::events::Point;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Layout(LayoutOp),
    Window(WindowOp),
    Group(GroupOp),
    Spawn(SpawnOp),
    System(SystemOp),
}

/// Операции внутри активного лейаута; передаются хосту как есть
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutOp {
    FocusDown,
    FocusUp,
    ShuffleDown,
    ShuffleUp,
    Next,
    Rotate,
    ToggleSplit,
}

impl LayoutOp {
    pub fn verb(&self) -> &'static str {
        match self {
            LayoutOp::FocusDown => "focus_down",
            LayoutOp::FocusUp => "focus_up",
            LayoutOp::ShuffleDown => "shuffle_down",
            LayoutOp::ShuffleUp => "shuffle_up",
            LayoutOp::Next => "next",
            LayoutOp::Rotate => "rotate",
            LayoutOp::ToggleSplit => "toggle_split",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowOp {
    Kill,
    ToggleFullscreen,
    ToggleFloating,
    BringToFront,
    ToGroup(String),
    SetPositionFloating { x: i32, y: i32 },
    SetSizeFloating { width: u32, height: u32 },
}

impl WindowOp {
    pub fn set_position(point: Point) -> Self {
        WindowOp::SetPositionFloating {
            x: point.x,
            y: point.y,
        }
    }

    /// Размер не может быть меньше одного пикселя
    pub fn set_size(point: Point) -> Self {
        WindowOp::SetSizeFloating {
            width: point.x.max(1) as u32,
            height: point.y.max(1) as u32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupOp {
    ToScreen { group: String, screen: usize },
    /// Вернуть на сфокусированный экран предыдущую группу
    ToggleGroup,
    NextLayout,
    PrevLayout,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnOp {
    Command(String),
    /// Открыть строку запуска в баре сфокусированного экрана
    Prompt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SystemOp {
    Restart,
    Shutdown,
}

impl Command {
    pub fn spawn(command_line: impl Into<String>) -> Self {
        Command::Spawn(SpawnOp::Command(command_line.into()))
    }

    pub fn to_screen(group: impl Into<String>, screen: usize) -> Self {
        Command::Group(GroupOp::ToScreen {
            group: group.into(),
            screen,
        })
    }

    pub fn to_group(group: impl Into<String>) -> Self {
        Command::Window(WindowOp::ToGroup(group.into()))
    }

    /// Группа, на которую ссылается команда (для проверки при загрузке)
    pub fn referenced_group(&self) -> Option<&str> {
        match self {
            Command::Window(WindowOp::ToGroup(group)) => Some(group),
            Command::Group(GroupOp::ToScreen { group, .. }) => Some(group),
            _ => None,
        }
    }

    pub fn referenced_screen(&self) -> Option<usize> {
        match self {
            Command::Group(GroupOp::ToScreen { screen, .. }) => Some(*screen),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Layout(op) => write!(f, "layout.{}", op.verb()),
            Command::Window(op) => match op {
                WindowOp::Kill => write!(f, "window.kill"),
                WindowOp::ToggleFullscreen => write!(f, "window.toggle_fullscreen"),
                WindowOp::ToggleFloating => write!(f, "window.toggle_floating"),
                WindowOp::BringToFront => write!(f, "window.bring_to_front"),
                WindowOp::ToGroup(group) => write!(f, "window.to_group({})", group),
                WindowOp::SetPositionFloating { x, y } => {
                    write!(f, "window.set_position_floating({}, {})", x, y)
                }
                WindowOp::SetSizeFloating { width, height } => {
                    write!(f, "window.set_size_floating({}x{})", width, height)
                }
            },
            Command::Group(op) => match op {
                GroupOp::ToScreen { group, screen } => {
                    write!(f, "group.to_screen({}, {})", group, screen)
                }
                GroupOp::ToggleGroup => write!(f, "group.toggle_group"),
                GroupOp::NextLayout => write!(f, "group.next_layout"),
                GroupOp::PrevLayout => write!(f, "group.prev_layout"),
            },
            Command::Spawn(SpawnOp::Command(line)) => write!(f, "spawn({})", line),
            Command::Spawn(SpawnOp::Prompt) => write!(f, "spawn.prompt"),
            Command::System(SystemOp::Restart) => write!(f, "system.restart"),
            Command::System(SystemOp::Shutdown) => write!(f, "system.shutdown"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_referenced_group() {
        assert_eq!(Command::to_group("F3").referenced_group(), Some("F3"));
        assert_eq!(Command::to_screen("5", 0).referenced_group(), Some("5"));
        assert_eq!(Command::to_screen("5", 1).referenced_screen(), Some(1));
        assert_eq!(Command::spawn("urxvt").referenced_group(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Command::Layout(LayoutOp::ShuffleDown).to_string(), "layout.shuffle_down");
        assert_eq!(Command::spawn("amixer set Master 5%+").to_string(), "spawn(amixer set Master 5%+)");
        assert_eq!(Command::to_screen("F1", 1).to_string(), "group.to_screen(F1, 1)");
    }

    #[test]
    fn test_floating_size_is_clamped() {
        assert_eq!(
            WindowOp::set_size(Point::new(-20, 300)),
            WindowOp::SetSizeFloating { width: 1, height: 300 }
        );
    }
}
