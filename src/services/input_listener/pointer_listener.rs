use crate::error::{KeyrouteError, Result};
use crate::events::{Button, ButtonPhase, KeyState};
use crate::mappings::EvdevToKeySym;
use crate::services::SharedDispatcher;
use crate::trace_if_enabled;
use evdev::{Device, EventStream, EventType, InputEvent, RelativeAxisCode};
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::modifier_state::ModifierState;
use super::r#trait::InputListenerTrait;

/// Слушатель мыши. Устройство не захватывается: указатель и клики
/// продолжают работать как обычно, мы только наблюдаем
pub struct RealPointerListener {
    dispatcher: SharedDispatcher,
    modifier_state: Arc<RwLock<ModifierState>>,
    stream: EventStream,
    device_name: String,
    held: Option<Button>,
    // Смещение копится до SYN_REPORT, чтобы X и Y пришли одним событием
    pending_dx: i32,
    pending_dy: i32,
}

impl RealPointerListener {
    pub fn new(
        device_path: &Path,
        dispatcher: SharedDispatcher,
        modifier_state: Arc<RwLock<ModifierState>>,
    ) -> Result<Self> {
        info!("Инициализация RealPointerListener ({:?})", device_path);

        let device = Device::open(device_path).map_err(|e| {
            KeyrouteError::DeviceNotFound(format!(
                "Не удалось открыть устройство {:?}: {}",
                device_path, e
            ))
        })?;
        let device_name = device.name().unwrap_or("Unknown").to_string();
        let stream = device.into_event_stream()?;

        Ok(Self {
            dispatcher,
            modifier_state,
            stream,
            device_name,
            held: None,
            pending_dx: 0,
            pending_dy: 0,
        })
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("RealPointerListener запущен на '{}'", self.device_name);

        loop {
            match self.stream.next_event().await {
                Ok(event) => self.handle_event(event),
                Err(e) => {
                    error!("Ошибка чтения событий указателя: {}", e);
                    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
                }
            }
        }
    }

    fn handle_event(&mut self, event: InputEvent) {
        match event.event_type() {
            EventType::KEY => self.handle_button(event.code(), event.value()),
            EventType::RELATIVE => match RelativeAxisCode(event.code()) {
                RelativeAxisCode::REL_X => self.pending_dx += event.value(),
                RelativeAxisCode::REL_Y => self.pending_dy += event.value(),
                _ => {}
            },
            EventType::SYNCHRONIZATION => self.flush_motion(),
            _ => {}
        }
    }

    fn handle_button(&mut self, code: u16, value: i32) {
        let Some(button) = EvdevToKeySym::button(code) else {
            return;
        };

        let phase = match KeyState::from_evdev_value(value) {
            Some(KeyState::Pressed) => {
                self.held = Some(button);
                self.pending_dx = 0;
                self.pending_dy = 0;
                ButtonPhase::Press
            }
            Some(KeyState::Released) => {
                if self.held == Some(button) {
                    self.flush_motion();
                    self.held = None;
                }
                ButtonPhase::Release
            }
            _ => return,
        };

        let modifiers = self.modifier_state.read().to_modifiers();
        debug!("{} {:?} ({})", button, phase, modifiers);
        self.dispatcher
            .lock()
            .on_button_event(&modifiers, button, phase);
    }

    fn flush_motion(&mut self) {
        let (dx, dy) = (self.pending_dx, self.pending_dy);
        self.pending_dx = 0;
        self.pending_dy = 0;

        let Some(button) = self.held else {
            return;
        };
        if dx == 0 && dy == 0 {
            return;
        }

        trace_if_enabled!("Смещение {:+} {:+} с {}", dx, dy, button);
        let modifiers = self.modifier_state.read().to_modifiers();
        self.dispatcher
            .lock()
            .on_button_event(&modifiers, button, ButtonPhase::Motion { dx, dy });
    }
}

#[async_trait::async_trait]
impl InputListenerTrait for RealPointerListener {
    fn name(&self) -> &'static str {
        "PointerListener"
    }

    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}
