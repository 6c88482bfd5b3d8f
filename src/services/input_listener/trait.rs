use crate::config::Config;
use crate::error::Result;
use crate::services::SharedDispatcher;
use crate::utils::DeviceFinder;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

use super::dry_input_listener::DryRunInputListener;
use super::keyboard_listener::RealKeyboardListener;
use super::modifier_state::ModifierState;
use super::pointer_listener::RealPointerListener;

/// Источник событий ввода, работающий в своей задаче tokio
#[async_trait::async_trait]
pub trait InputListenerTrait {
    fn name(&self) -> &'static str;

    async fn run(self: Box<Self>) -> Result<()>;
}

/// Создать слушателей по режиму запуска: в dry-run события читаются из stdin,
/// иначе с клавиатуры и (если настроен) указателя
pub fn create_input_listeners(
    config: &Config,
    dispatcher: SharedDispatcher,
    dry_run: bool,
) -> Result<Vec<Box<dyn InputListenerTrait + Send>>> {
    if dry_run {
        return Ok(vec![Box::new(DryRunInputListener::new(dispatcher))]);
    }

    // Модификаторы общие: Mod4 на клавиатуре + кнопка мыши
    let modifier_state = Arc::new(RwLock::new(ModifierState::new()));

    let mut listeners: Vec<Box<dyn InputListenerTrait + Send>> = vec![Box::new(
        RealKeyboardListener::new(config, dispatcher.clone(), modifier_state.clone())?,
    )];

    let pointer = match DeviceFinder::find_pointer_device(&config.input.pointer_device) {
        Ok(pointer) => pointer,
        // Явно указанное устройство обязано существовать, автопоиск может ничего не найти
        Err(e) if config.input.pointer_device == "auto" => {
            warn!("Указатель не найден: {}", e);
            None
        }
        Err(e) => return Err(e),
    };

    match pointer {
        Some(path) => listeners.push(Box::new(RealPointerListener::new(
            &path,
            dispatcher,
            modifier_state,
        )?)),
        None => info!("Указатель не настроен, привязки кнопок мыши неактивны"),
    }

    Ok(listeners)
}
