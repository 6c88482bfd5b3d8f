use crate::error::{KeyrouteError, Result};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tracing::{info, warn};

/// Проверить доступ к устройствам ввода, а если нужен проброс клавиш, то и к uinput
pub fn check_permissions(needs_uinput: bool) -> Result<()> {
    info!("Проверка прав доступа...");

    check_input_devices_access(Path::new("/dev/input"))?;

    if needs_uinput {
        check_uinput_access(Path::new("/dev/uinput"))?;
    }

    check_not_root();

    info!("Проверка прав доступа завершена успешно");
    Ok(())
}

fn check_input_devices_access(input_dir: &Path) -> Result<()> {
    if !input_dir.exists() {
        return Err(KeyrouteError::Permission(format!(
            "Директория {} не существует",
            input_dir.display()
        )));
    }

    fs::read_dir(input_dir).map_err(|e| {
        KeyrouteError::Permission(format!(
            "Нет доступа к {}: {}. Добавьте пользователя в группу 'input'",
            input_dir.display(),
            e
        ))
    })?;

    info!("Доступ к {} подтвержден", input_dir.display());
    Ok(())
}

fn check_uinput_access(uinput_device: &Path) -> Result<()> {
    if !uinput_device.exists() {
        // Модуль может быть загружен позже, VirtualDevice сам сообщит об ошибке
        warn!(
            "{} не существует, возможно модуль uinput не загружен",
            uinput_device.display()
        );
        return Ok(());
    }

    let mode = fs::metadata(uinput_device)
        .map_err(|e| {
            KeyrouteError::Permission(format!(
                "Не удалось проверить права доступа к {}: {}",
                uinput_device.display(),
                e
            ))
        })?
        .permissions()
        .mode();

    if mode & 0o006 == 0 && mode & 0o060 == 0 {
        return Err(KeyrouteError::Permission(format!(
            "Нет прав доступа к {}. Без него несвязанные клавиши не будут проброшены; \
             добавьте пользователя в группу 'uinput' или отключите input.passthrough_unbound",
            uinput_device.display()
        )));
    }

    info!("Доступ к {} подтвержден", uinput_device.display());
    Ok(())
}

fn check_not_root() {
    match std::env::var("USER") {
        Ok(user) if user == "root" => {
            warn!("Приложение запущено от имени root!");
            warn!("Процессы из привязок spawn тоже будут запущены от root");
            warn!("Рекомендуется: sudo usermod -a -G input,uinput $USER");
        }
        Ok(user) => info!("Приложение запущено от имени пользователя: {}", user),
        Err(_) => warn!("Не удалось определить пользователя"),
    }
}
