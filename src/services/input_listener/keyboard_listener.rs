use crate::config::Config;
use crate::debug_if_enabled;
use crate::dispatcher::Dispatch;
use crate::error::{KeyrouteError, Result};
use crate::events::{KeyEvent, KeyState, VirtualKeyEvent};
use crate::mappings::EvdevToKeySym;
use crate::services::{SharedDispatcher, VirtualDevice};
use crate::utils::DeviceFinder;
use evdev::{Device, EventStream, EventType, InputEvent};
use parking_lot::RwLock;
use std::collections::HashSet;
use std::io::Error;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::modifier_state::ModifierState;
use super::r#trait::InputListenerTrait;

pub struct RealKeyboardListener {
    dispatcher: SharedDispatcher,
    modifier_state: Arc<RwLock<ModifierState>>,
    stream: EventStream,
    device_name: String,
    /// Есть только при захвате устройства: через неё уходят несвязанные клавиши
    passthrough: Option<VirtualDevice>,
    gate: KeyGate,
}

/// Куда направить событие клавиши
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyRoute {
    /// Нажатие: сначала спросить диспетчер
    Resolve,
    Swallow,
    Passthrough,
}

/// Помнит клавиши, нажатие которых сработало как привязка: их повтор и
/// отпускание тоже не должны дойти до окна
#[derive(Debug, Default)]
struct KeyGate {
    swallowed: HashSet<u16>,
}

impl KeyGate {
    fn route(&mut self, code: u16, state: KeyState) -> KeyRoute {
        match state {
            KeyState::Pressed => KeyRoute::Resolve,
            KeyState::Repeat if self.swallowed.contains(&code) => KeyRoute::Swallow,
            KeyState::Released if self.swallowed.remove(&code) => KeyRoute::Swallow,
            _ => KeyRoute::Passthrough,
        }
    }

    fn record(&mut self, code: u16, outcome: Dispatch) -> KeyRoute {
        match outcome {
            Dispatch::Handled => {
                self.swallowed.insert(code);
                KeyRoute::Swallow
            }
            Dispatch::Unbound => KeyRoute::Passthrough,
        }
    }
}

impl RealKeyboardListener {
    pub fn new(
        config: &Config,
        dispatcher: SharedDispatcher,
        modifier_state: Arc<RwLock<ModifierState>>,
    ) -> Result<Self> {
        info!("Инициализация RealKeyboardListener");

        let device_path = DeviceFinder::find_keyboard_device(&config.input.keyboard_device)?;

        let mut device = Device::open(&device_path).map_err(|e| {
            KeyrouteError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;
        let device_name = device.name().unwrap_or("Unknown").to_string();

        // Без захвата сработавшая привязка дойдёт и до сфокусированного окна
        let passthrough = if config.input.passthrough_unbound {
            if let Err(e) = device.grab() {
                Self::log_grab_error(&device_path, &e);
                return Err(KeyrouteError::Permission(format!(
                    "Не удалось захватить устройство эксклюзивно: {}",
                    e
                )));
            }
            Self::log_grabbed_device(&device);
            let virtual_device = VirtualDevice::new("keyroute passthrough", false)?;
            info!("Несвязанные клавиши пробрасываются через '{}'", virtual_device.name());
            Some(virtual_device)
        } else {
            warn!("Проброс отключен: устройство '{}' читается без захвата", device_name);
            None
        };

        let stream = device.into_event_stream()?;

        Ok(Self {
            dispatcher,
            modifier_state,
            stream,
            device_name,
            passthrough,
            gate: KeyGate::default(),
        })
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("RealKeyboardListener запущен на '{}'", self.device_name);

        loop {
            let event = match self.stream.next_event().await {
                Ok(event) => event,
                Err(e) => {
                    error!("Ошибка чтения событий: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                    continue;
                }
            };

            if let Err(e) = self.handle_event(event) {
                error!("Ошибка обработки события: {}", e);
            }
        }
    }

    fn handle_event(&mut self, event: InputEvent) -> Result<()> {
        if event.event_type() != EventType::KEY {
            return Ok(());
        }

        let code = event.code();
        let Some(state) = KeyState::from_evdev_value(event.value()) else {
            debug!("Неизвестное значение события: {}", event.value());
            return Ok(());
        };

        let is_modifier = self
            .modifier_state
            .write()
            .update_key(code, state != KeyState::Released);
        if is_modifier {
            return self.passthrough(code, state);
        }

        let route = match self.gate.route(code, state) {
            KeyRoute::Resolve => {
                let Some(key) = EvdevToKeySym::translate(code) else {
                    return self.passthrough(code, state);
                };
                let modifiers = self.modifier_state.read().to_modifiers();

                let key_event = KeyEvent::new(key, state, modifiers, self.device_name.clone());
                debug_if_enabled!("Событие клавиши: {}", key_event);

                // Блокировка держится только на время разбора, без await
                let outcome = self
                    .dispatcher
                    .lock()
                    .on_key_event(&key_event.modifiers, &key_event.key);
                self.gate.record(code, outcome)
            }
            route => route,
        };

        match route {
            KeyRoute::Swallow => Ok(()),
            _ => self.passthrough(code, state),
        }
    }

    fn passthrough(&mut self, code: u16, state: KeyState) -> Result<()> {
        match &mut self.passthrough {
            Some(device) => device.send_event(VirtualKeyEvent::new(code, state)),
            None => Ok(()),
        }
    }

    fn log_grabbed_device(device: &Device) {
        info!("Устройство: {}", device.name().unwrap_or("Unknown"));
        info!("Физический путь: {:?}", device.physical_path());
        info!("Устройство захвачено эксклюзивно");
    }

    fn log_grab_error(device_path: &Path, e: &Error) {
        warn!(
            "Не удалось захватить устройство {}: {}",
            device_path.display(),
            e
        );
        warn!("Попробуйте:");
        warn!("1. Добавить пользователя в группу input: sudo usermod -a -G input $USER");
        warn!("2. Убедиться, что устройство не захвачено другой программой");
        warn!("3. Либо выставить input.passthrough_unbound = false");
    }
}

#[async_trait::async_trait]
impl InputListenerTrait for RealKeyboardListener {
    fn name(&self) -> &'static str {
        "KeyboardListener"
    }

    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}

impl Drop for RealKeyboardListener {
    fn drop(&mut self) {
        if self.passthrough.is_none() {
            return;
        }
        info!("Освобождение захваченного устройства");
        if let Err(e) = self.stream.device_mut().ungrab() {
            error!("Не удалось освободить устройство: {}", e);
        }
    }
}
