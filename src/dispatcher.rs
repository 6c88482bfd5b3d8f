//! Диспетчер: сопоставляет входные события с таблицей привязок и выполняет
//! найденные команды через `Host`.
//!
//! Все вызовы идут последовательно из одного потока обработки событий.
//! Если хост многопоточный, он обязан сериализовать обращения к диспетчеру
//! (в демоне это `Arc<Mutex<Dispatcher<_>>>`).

use crate::bindings::{
    Command, DragAction, GroupOp, MouseBinding, SpawnOp, SystemOp, WindowOp,
};
use crate::configuration::Configuration;
use crate::debug_if_enabled;
use crate::error::{KeyrouteError, Result};
use crate::events::{Button, ButtonPhase, KeySym, ModifierSet, Point};
use crate::host::Host;
use crate::workspace::{WindowHandle, WorkspaceState};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Итог обработки входного события
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Handled,
    /// Привязки нет - событие нужно пропустить дальше
    Unbound,
}

/// Состояние жеста указателя между нажатием и отпусканием кнопки
#[derive(Debug, Clone)]
enum PointerState {
    Idle,
    Pending {
        button: Button,
        binding: MouseBinding,
        dx: i32,
        dy: i32,
    },
    Dragging {
        button: Button,
        action: DragAction,
        start: Point,
        dx: i32,
        dy: i32,
    },
    /// Жест начался, но выполнять нечего (нет окна или клик превратился в drag)
    Ignored { button: Button },
}

pub struct Dispatcher<H: Host> {
    configuration: Arc<Configuration>,
    state: WorkspaceState,
    pointer: PointerState,
    host: H,
}

impl<H: Host> Dispatcher<H> {
    pub fn new(configuration: Arc<Configuration>, host: H) -> Self {
        let state = Self::initial_state(&configuration);
        Self {
            configuration,
            state,
            pointer: PointerState::Idle,
            host,
        }
    }

    fn initial_state(configuration: &Configuration) -> WorkspaceState {
        WorkspaceState::new(
            &configuration.groups,
            configuration.layouts.clone(),
            configuration.screen_count(),
        )
    }

    /// Атомарно заменить конфигурацию. Размещение групп строится заново,
    /// а открытые окна остаются в своих группах
    pub fn reload(&mut self, configuration: Arc<Configuration>) {
        info!(
            "Перезагрузка конфигурации: {} привязок",
            configuration.bindings.len()
        );
        let mut state = Self::initial_state(&configuration);
        let lost = state.adopt_windows(&self.state);
        if lost > 0 {
            warn!("После перезагрузки {} окон остались без группы", lost);
        }
        self.state = state;
        self.pointer = PointerState::Idle;
        self.configuration = configuration;
    }

    pub fn on_key_event(&mut self, modifiers: &ModifierSet, key: &KeySym) -> Dispatch {
        let configuration = Arc::clone(&self.configuration);
        let Some(command) = configuration.bindings.resolve(modifiers, key) else {
            debug_if_enabled!("Комбинация {}+{} не привязана", modifiers, key);
            return Dispatch::Unbound;
        };

        debug!("{}+{} -> {}", modifiers, key, command);
        self.run(command);
        Dispatch::Handled
    }

    pub fn on_button_event(
        &mut self,
        modifiers: &ModifierSet,
        button: Button,
        phase: ButtonPhase,
    ) -> Dispatch {
        match phase {
            ButtonPhase::Press => self.on_button_press(modifiers, button),
            ButtonPhase::Motion { dx, dy } => self.on_pointer_motion(button, dx, dy),
            ButtonPhase::Release => self.on_button_release(button),
        }
    }

    pub fn on_window_opened(&mut self, handle: WindowHandle) {
        if let Some(group) = self.state.add_window(handle) {
            debug!("Окно {:?} добавлено в группу '{}'", handle, group);
        }
    }

    pub fn on_window_closed(&mut self, handle: WindowHandle) {
        if self.state.remove_window(handle) {
            debug!("Окно {:?} удалено", handle);
        }
    }

    pub fn state(&self) -> &WorkspaceState {
        &self.state
    }

    pub fn configuration(&self) -> &Arc<Configuration> {
        &self.configuration
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Выполнить команду; ошибки только логируются и состояние таблицы не трогают
    fn run(&mut self, command: &Command) {
        match self.execute(command) {
            Ok(()) => {}
            Err(e @ KeyrouteError::SpawnFailure { .. }) => warn!("{}", e),
            Err(e) => error!("Ошибка выполнения {}: {}", command, e),
        }
    }

    pub fn execute(&mut self, command: &Command) -> Result<()> {
        match command {
            Command::Layout(op) => self.host.layout_action(*op),
            Command::Window(op) => {
                if let WindowOp::ToGroup(group) = op {
                    if let Some(handle) = self.host.focused_window() {
                        self.state.move_window(handle, group)?;
                    }
                }
                self.host.window_action(op)
            }
            Command::Group(op) => self.execute_group_op(op),
            Command::Spawn(SpawnOp::Command(command_line)) => {
                self.host.spawn_process(command_line)
            }
            Command::Spawn(SpawnOp::Prompt) => {
                self.host.open_prompt(self.state.focused_screen())
            }
            Command::System(SystemOp::Restart) => self.host.restart(),
            Command::System(SystemOp::Shutdown) => self.host.shutdown(),
        }
    }

    fn execute_group_op(&mut self, op: &GroupOp) -> Result<()> {
        match op {
            GroupOp::ToScreen { group, screen } => {
                self.state.to_screen(group, *screen)?;
                self.host.switch_group(group, *screen)
            }
            GroupOp::ToggleGroup => {
                let Some(previous) = self.state.previous_group().map(str::to_string) else {
                    debug!("У экрана нет предыдущей группы");
                    return Ok(());
                };
                let screen = self.state.focused_screen();
                self.state.to_screen(&previous, screen)?;
                self.host.switch_group(&previous, screen)
            }
            GroupOp::NextLayout | GroupOp::PrevLayout => {
                let Some(group) = self.state.focused_group_mut() else {
                    debug!("На сфокусированном экране нет группы");
                    return Ok(());
                };
                let layout = if matches!(op, GroupOp::NextLayout) {
                    group.layouts.next().clone()
                } else {
                    group.layouts.prev().clone()
                };
                let name = group.name.clone();
                self.host.cycle_layout(&name, &layout)
            }
        }
    }

    fn on_button_press(&mut self, modifiers: &ModifierSet, button: Button) -> Dispatch {
        if !matches!(self.pointer, PointerState::Idle) {
            debug_if_enabled!("Нажатие {} во время активного жеста пропущено", button);
            return Dispatch::Unbound;
        }

        match self.configuration.bindings.resolve_mouse(modifiers, button) {
            Some(binding) => {
                self.pointer = PointerState::Pending {
                    button,
                    binding: binding.clone(),
                    dx: 0,
                    dy: 0,
                };
                Dispatch::Handled
            }
            None => Dispatch::Unbound,
        }
    }

    fn on_pointer_motion(&mut self, button: Button, dx: i32, dy: i32) -> Dispatch {
        let threshold = self.host.drag_threshold();

        match std::mem::replace(&mut self.pointer, PointerState::Idle) {
            PointerState::Pending {
                button: held,
                binding,
                dx: acc_x,
                dy: acc_y,
            } if held == button => {
                let (acc_x, acc_y) = (acc_x.saturating_add(dx), acc_y.saturating_add(dy));
                if acc_x.unsigned_abs().max(acc_y.unsigned_abs()) <= threshold {
                    self.pointer = PointerState::Pending {
                        button,
                        binding,
                        dx: acc_x,
                        dy: acc_y,
                    };
                    return Dispatch::Handled;
                }

                self.pointer = match binding {
                    MouseBinding::Drag { start, action } => {
                        match self.host.window_geometry(start) {
                            Some(origin) => {
                                debug!("Начало перетаскивания {:?} от {}", action, origin);
                                self.apply_drag(action, origin, acc_x, acc_y);
                                PointerState::Dragging {
                                    button,
                                    action,
                                    start: origin,
                                    dx: acc_x,
                                    dy: acc_y,
                                }
                            }
                            None => PointerState::Ignored { button },
                        }
                    }
                    MouseBinding::Click { .. } => PointerState::Ignored { button },
                };
                Dispatch::Handled
            }
            PointerState::Dragging {
                button: held,
                action,
                start,
                dx: acc_x,
                dy: acc_y,
            } if held == button => {
                let (acc_x, acc_y) = (acc_x.saturating_add(dx), acc_y.saturating_add(dy));
                self.apply_drag(action, start, acc_x, acc_y);
                self.pointer = PointerState::Dragging {
                    button,
                    action,
                    start,
                    dx: acc_x,
                    dy: acc_y,
                };
                Dispatch::Handled
            }
            PointerState::Ignored { button: held } if held == button => {
                self.pointer = PointerState::Ignored { button };
                Dispatch::Handled
            }
            other => {
                self.pointer = other;
                Dispatch::Unbound
            }
        }
    }

    fn on_button_release(&mut self, button: Button) -> Dispatch {
        let held = match &self.pointer {
            PointerState::Idle => return Dispatch::Unbound,
            PointerState::Pending { button, .. }
            | PointerState::Dragging { button, .. }
            | PointerState::Ignored { button } => *button,
        };
        if held != button {
            return Dispatch::Unbound;
        }

        if let PointerState::Pending {
            binding: MouseBinding::Click { command },
            ..
        } = std::mem::replace(&mut self.pointer, PointerState::Idle)
        {
            debug!("Клик {} -> {}", button, command);
            self.run(&command);
        }
        Dispatch::Handled
    }

    fn apply_drag(&mut self, action: DragAction, start: Point, dx: i32, dy: i32) {
        let target = start.offset(dx, dy);
        let op = match action {
            DragAction::MoveFloating => WindowOp::set_position(target),
            DragAction::ResizeFloating => WindowOp::set_size(target),
        };
        if let Err(e) = self.host.window_action(&op) {
            error!("Ошибка перетаскивания: {}", e);
        }
    }
}
