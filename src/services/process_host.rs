use crate::bindings::{LayoutOp, WindowAccessor, WindowOp};
use crate::error::{KeyrouteError, Result};
use crate::events::Point;
use crate::host::Host;
use crate::utils::split_command_line;
use crate::workspace::{Layout, WindowHandle};
use std::io;
use std::process::Stdio;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

/// Запрос к главному циклу, который хост не может выполнить сам
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleRequest {
    Restart,
    Shutdown,
}

/// Хост демона: запускает процессы, а операции над окнами только
/// журналирует, так как окнами управляет внешний оконный менеджер
pub struct ProcessHost {
    lifecycle: UnboundedSender<LifecycleRequest>,
    drag_threshold: u32,
    dry_run: bool,
}

impl ProcessHost {
    pub fn new(
        lifecycle: UnboundedSender<LifecycleRequest>,
        drag_threshold: u32,
        dry_run: bool,
    ) -> Self {
        info!(
            "Инициализация ProcessHost (порог перетаскивания: {}px, dry_run: {})",
            drag_threshold, dry_run
        );
        Self {
            lifecycle,
            drag_threshold,
            dry_run,
        }
    }

    fn request(&self, request: LifecycleRequest) -> Result<()> {
        self.lifecycle.send(request).map_err(|_| {
            KeyrouteError::Internal(format!(
                "главный цикл уже остановлен, запрос {:?} потерян",
                request
            ))
        })
    }

    fn spawn_failure(command_line: &str, source: io::Error) -> KeyrouteError {
        KeyrouteError::SpawnFailure {
            command: command_line.to_string(),
            source,
        }
    }
}

impl Host for ProcessHost {
    fn layout_action(&mut self, action: LayoutOp) -> Result<()> {
        info!("Лейаут: {}", action.verb());
        Ok(())
    }

    fn window_action(&mut self, action: &WindowOp) -> Result<()> {
        info!("Окно: {:?}", action);
        Ok(())
    }

    fn window_geometry(&mut self, accessor: WindowAccessor) -> Option<Point> {
        debug!("Геометрия окна ({:?}) недоступна без оконного менеджера", accessor);
        None
    }

    fn focused_window(&mut self) -> Option<WindowHandle> {
        None
    }

    fn switch_group(&mut self, group: &str, screen: usize) -> Result<()> {
        info!("Группа '{}' показана на экране #{}", group, screen);
        Ok(())
    }

    fn cycle_layout(&mut self, group: &str, layout: &Layout) -> Result<()> {
        info!("Группа '{}': лейаут {}", group, layout);
        Ok(())
    }

    fn spawn_process(&mut self, command_line: &str) -> Result<()> {
        let words = split_command_line(command_line).map_err(|e| {
            Self::spawn_failure(
                command_line,
                io::Error::new(io::ErrorKind::InvalidInput, e.to_string()),
            )
        })?;

        let Some((program, args)) = words.split_first() else {
            return Err(Self::spawn_failure(
                command_line,
                io::Error::new(io::ErrorKind::InvalidInput, "пустая команда"),
            ));
        };

        if self.dry_run {
            info!("[DRY RUN] Запуск: {} {:?}", program, args);
            return Ok(());
        }

        // Дочерний процесс не ждём; tokio сам подберёт его после завершения
        let child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| Self::spawn_failure(command_line, e))?;

        info!("Запущен '{}' (pid {:?})", command_line, child.id());
        Ok(())
    }

    fn open_prompt(&mut self, screen: usize) -> Result<()> {
        info!("Запрос строки запуска на экране #{}", screen);
        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        info!("Запрошен перезапуск");
        self.request(LifecycleRequest::Restart)
    }

    fn shutdown(&mut self) -> Result<()> {
        info!("Запрошено завершение работы");
        self.request(LifecycleRequest::Shutdown)
    }

    fn drag_threshold(&self) -> u32 {
        self.drag_threshold
    }
}
