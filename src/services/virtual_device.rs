use crate::error::Result;
use crate::events::VirtualKeyEvent;
use crate::keyroute_error;
use tracing::{debug, info};

/// Виртуальная клавиатура uinput, через которую несвязанные клавиши
/// уходят дальше в систему, пока физическое устройство захвачено
pub struct VirtualDevice {
    device: Option<uinput::Device>,
    device_name: String,
}

impl VirtualDevice {
    pub fn new(device_name: &str, dry_run: bool) -> Result<Self> {
        info!("Инициализация VirtualDevice '{}' (dry_run: {})", device_name, dry_run);

        let device = if dry_run {
            None
        } else {
            Some(Self::create_virtual_device(device_name)?)
        };

        Ok(Self {
            device,
            device_name: device_name.to_string(),
        })
    }

    fn create_virtual_device(device_name: &str) -> Result<uinput::Device> {
        info!("Создание виртуального устройства uinput '{}' для проброса клавиш", device_name);

        let virtual_device = uinput::default()?
            .name(device_name)?
            .event(uinput::event::Keyboard::All)?
            .create()
            .map_err(|e| {
                keyroute_error!(
                    internal,
                    "Не удалось создать виртуальное устройство '{}': {}",
                    device_name,
                    e
                )
            })?;

        info!("Виртуальное устройство '{}' создано успешно", device_name);
        Ok(virtual_device)
    }

    pub fn send_event(&mut self, event: VirtualKeyEvent) -> Result<()> {
        let Some(device) = &mut self.device else {
            debug!("[DRY RUN] Виртуальное событие: {:?}", event);
            return Ok(());
        };

        let keycode = i32::from(event.code);

        // EV_KEY = 1
        device.write(1, keycode, event.state.evdev_value()).map_err(|e| {
            keyroute_error!(internal, "Не удалось отправить событие клавиши {}: {}", keycode, e)
        })?;

        device
            .synchronize()
            .map_err(|e| keyroute_error!(internal, "Не удалось синхронизировать события: {}", e))?;

        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.device_name
    }
}

impl Drop for VirtualDevice {
    fn drop(&mut self) {
        if self.device.is_some() {
            info!("Закрытие виртуального устройства '{}'", self.device_name);
        }
    }
}
