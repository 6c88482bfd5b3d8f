use crate::error::{KeyrouteError, Result};
use evdev::{KeyCode, RelativeAxisCode};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Какое устройство ищем
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    Keyboard,
    Pointer,
}

impl DeviceKind {
    fn label(self) -> &'static str {
        match self {
            DeviceKind::Keyboard => "клавиатурное",
            DeviceKind::Pointer => "указательное",
        }
    }

    /// Подсказки в именах /dev/input/by-id
    fn by_id_suffix(self) -> &'static str {
        match self {
            DeviceKind::Keyboard => "event-kbd",
            DeviceKind::Pointer => "event-mouse",
        }
    }
}

pub struct DeviceFinder;

impl DeviceFinder {
    /// Клавиатура обязательна: "auto" или явный путь
    pub fn find_keyboard_device(device_spec: &str) -> Result<PathBuf> {
        match Self::resolve(device_spec, DeviceKind::Keyboard)? {
            Some(path) => Ok(path),
            None => KeyrouteError::device_not_found(
                "Клавиатура отключена в конфигурации, но без неё привязки не работают",
            ),
        }
    }

    /// Указатель необязателен: "none" отключает кнопочные привязки
    pub fn find_pointer_device(device_spec: &str) -> Result<Option<PathBuf>> {
        Self::resolve(device_spec, DeviceKind::Pointer)
    }

    fn resolve(device_spec: &str, kind: DeviceKind) -> Result<Option<PathBuf>> {
        match device_spec {
            "none" => {
                info!("{} устройство отключено", kind.label());
                Ok(None)
            }
            "auto" => Self::auto_find(kind).map(Some),
            path => {
                let path = PathBuf::from(path);
                if path.exists() {
                    info!("Используется указанное устройство: {:?}", path);
                    Ok(Some(path))
                } else {
                    KeyrouteError::device_not_found(format!(
                        "Указанное устройство не найдено: {:?}",
                        path
                    ))
                }
            }
        }
    }

    fn auto_find(kind: DeviceKind) -> Result<PathBuf> {
        info!("Автопоиск: {} устройство...", kind.label());

        if let Some(device) = Self::find_by_id(kind)? {
            info!("Найдено устройство по ID: {:?}", device);
            return Ok(device);
        }

        if let Some(device) = Self::find_by_event_devices(kind)? {
            info!("Найдено устройство среди event устройств: {:?}", device);
            return Ok(device);
        }

        KeyrouteError::device_not_found(format!(
            "Не удалось найти {} устройство. Убедитесь, что пользователь добавлен в группу 'input'",
            kind.label()
        ))
    }

    fn find_by_id(kind: DeviceKind) -> Result<Option<PathBuf>> {
        let by_id_dir = Path::new("/dev/input/by-id");

        if !by_id_dir.exists() {
            debug!("Директория /dev/input/by-id не существует");
            return Ok(None);
        }

        let entries = fs::read_dir(by_id_dir).map_err(|e| {
            KeyrouteError::Permission(format!("Нет доступа к /dev/input/by-id: {}", e))
        })?;

        let mut candidates = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("")
                .to_string();

            if !name.ends_with(kind.by_id_suffix()) {
                continue;
            }
            if !Self::is_device_accessible(&path) {
                warn!("Устройство {:?} недоступно", path);
                continue;
            }
            if Self::matches_kind(&path, kind) {
                debug!("Кандидат: {}", name);
                candidates.push(path);
            }
        }

        // by-id содержит стабильные имена, берём первое по алфавиту
        candidates.sort();
        Ok(candidates.into_iter().next())
    }

    fn find_by_event_devices(kind: DeviceKind) -> Result<Option<PathBuf>> {
        let input_dir = Path::new("/dev/input");

        let entries = fs::read_dir(input_dir)
            .map_err(|e| KeyrouteError::Permission(format!("Нет доступа к /dev/input: {}", e)))?;

        let mut event_devices: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("event"))
            })
            .collect();
        event_devices.sort();

        Ok(event_devices
            .into_iter()
            .find(|path| Self::is_device_accessible(path) && Self::matches_kind(path, kind)))
    }

    fn matches_kind(device_path: &Path, kind: DeviceKind) -> bool {
        let device = match evdev::Device::open(device_path) {
            Ok(device) => device,
            Err(e) => {
                debug!("Не удалось открыть устройство {:?}: {}", device_path, e);
                return false;
            }
        };
        let name = device.name().unwrap_or("Unknown").to_lowercase();

        let matches = match kind {
            DeviceKind::Keyboard => {
                // Мыши с парой мультимедийных клавиш тоже сообщают KEY события
                if name.contains("mouse") || name.contains("touchpad") || name.contains("trackpoint") {
                    false
                } else {
                    device.supported_keys().is_some_and(|keys| {
                        keys.contains(KeyCode::KEY_A)
                            && keys.contains(KeyCode::KEY_SPACE)
                            && keys.contains(KeyCode::KEY_ENTER)
                            && keys.iter().count() > 20
                    })
                }
            }
            DeviceKind::Pointer => {
                let has_buttons = device
                    .supported_keys()
                    .is_some_and(|keys| keys.contains(KeyCode::BTN_LEFT));
                let has_axes = device.supported_relative_axes().is_some_and(|axes| {
                    axes.contains(RelativeAxisCode::REL_X) && axes.contains(RelativeAxisCode::REL_Y)
                });
                has_buttons && has_axes
            }
        };

        debug!(
            "Устройство {:?} ({}) {} как {}",
            device_path,
            name,
            if matches { "подходит" } else { "не подходит" },
            kind.label()
        );
        matches
    }

    fn is_device_accessible(device_path: &Path) -> bool {
        match fs::File::open(device_path) {
            Ok(_) => true,
            Err(e) => {
                debug!("Устройство {:?} недоступно: {}", device_path, e);
                false
            }
        }
    }
}
