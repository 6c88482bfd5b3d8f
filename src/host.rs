//! Граница между ядром и оконным менеджером.
//!
//! Ядро не размещает окна и ничего не рисует: всё это делает хост, а
//! `Dispatcher` только сообщает ему, что нужно сделать.

use crate::bindings::{LayoutOp, WindowAccessor, WindowOp};
use crate::error::Result;
use crate::events::Point;
use crate::workspace::{Layout, WindowHandle};

/// Порог перетаскивания по умолчанию, в пикселях
pub const DEFAULT_DRAG_THRESHOLD: u32 = 4;

pub trait Host {
    /// Операция активного лейаута (фокус, перестановка, поворот...)
    fn layout_action(&mut self, action: LayoutOp) -> Result<()>;

    fn window_action(&mut self, action: &WindowOp) -> Result<()>;

    /// Позиция или размер сфокусированного окна; `None`, если окна нет
    fn window_geometry(&mut self, accessor: WindowAccessor) -> Option<Point>;

    fn focused_window(&mut self) -> Option<WindowHandle>;

    fn switch_group(&mut self, group: &str, screen: usize) -> Result<()>;

    fn cycle_layout(&mut self, group: &str, layout: &Layout) -> Result<()>;

    /// Запустить процесс и сразу вернуться, не дожидаясь его завершения
    fn spawn_process(&mut self, command_line: &str) -> Result<()>;

    fn open_prompt(&mut self, screen: usize) -> Result<()>;

    fn restart(&mut self) -> Result<()>;

    fn shutdown(&mut self) -> Result<()>;

    fn drag_threshold(&self) -> u32 {
        DEFAULT_DRAG_THRESHOLD
    }
}

/// Хост, который просто записывает вызовы. Используется в тестах
#[cfg(test)]
pub mod recording {
    use super::*;
    use crate::error::KeyrouteError;

    #[derive(Debug, Clone, PartialEq)]
    pub enum HostCall {
        LayoutAction(LayoutOp),
        WindowAction(WindowOp),
        WindowGeometry(WindowAccessor),
        FocusedWindow,
        SwitchGroup(String, usize),
        CycleLayout(String, Layout),
        SpawnProcess(String),
        OpenPrompt(usize),
        Restart,
        Shutdown,
    }

    #[derive(Debug, Default)]
    pub struct RecordingHost {
        pub calls: Vec<HostCall>,
        pub geometry: Option<Point>,
        pub focused: Option<WindowHandle>,
        pub fail_spawns: bool,
        pub threshold: Option<u32>,
    }

    impl RecordingHost {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn take_calls(&mut self) -> Vec<HostCall> {
            std::mem::take(&mut self.calls)
        }
    }

    impl Host for RecordingHost {
        fn layout_action(&mut self, action: LayoutOp) -> Result<()> {
            self.calls.push(HostCall::LayoutAction(action));
            Ok(())
        }

        fn window_action(&mut self, action: &WindowOp) -> Result<()> {
            self.calls.push(HostCall::WindowAction(action.clone()));
            Ok(())
        }

        fn window_geometry(&mut self, accessor: WindowAccessor) -> Option<Point> {
            self.calls.push(HostCall::WindowGeometry(accessor));
            self.geometry
        }

        fn focused_window(&mut self) -> Option<WindowHandle> {
            self.calls.push(HostCall::FocusedWindow);
            self.focused
        }

        fn switch_group(&mut self, group: &str, screen: usize) -> Result<()> {
            self.calls.push(HostCall::SwitchGroup(group.to_string(), screen));
            Ok(())
        }

        fn cycle_layout(&mut self, group: &str, layout: &Layout) -> Result<()> {
            self.calls
                .push(HostCall::CycleLayout(group.to_string(), layout.clone()));
            Ok(())
        }

        fn spawn_process(&mut self, command_line: &str) -> Result<()> {
            self.calls.push(HostCall::SpawnProcess(command_line.to_string()));
            if self.fail_spawns {
                return Err(KeyrouteError::SpawnFailure {
                    command: command_line.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            Ok(())
        }

        fn open_prompt(&mut self, screen: usize) -> Result<()> {
            self.calls.push(HostCall::OpenPrompt(screen));
            Ok(())
        }

        fn restart(&mut self) -> Result<()> {
            self.calls.push(HostCall::Restart);
            Ok(())
        }

        fn shutdown(&mut self) -> Result<()> {
            self.calls.push(HostCall::Shutdown);
            Ok(())
        }

        fn drag_threshold(&self) -> u32 {
            self.threshold.unwrap_or(DEFAULT_DRAG_THRESHOLD)
        }
    }
}
