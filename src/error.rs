use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyrouteError {
    #[error("Ошибка конфигурации: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Ошибка ввода-вывода: {0}")]
    Io(#[from] std::io::Error),

    #[error("Ошибка uinput: {0}")]
    Uinput(#[from] uinput::Error),

    #[error("Повторная привязка комбинации {chord}")]
    DuplicateBinding { chord: String },

    #[error("Группа '{group}' не объявлена, но на неё ссылается {referrer}")]
    UnknownGroupReference { group: String, referrer: String },

    #[error("Экран #{screen} не существует, но на него ссылается {referrer}")]
    UnknownScreen { screen: usize, referrer: String },

    #[error("Группа '{0}' объявлена повторно")]
    DuplicateGroup(String),

    #[error("Неверная комбинация клавиш: {0}")]
    InvalidChord(String),

    #[error("Неверный модификатор: {0}")]
    InvalidModifier(String),

    #[error("Некорректная конфигурация: {0}")]
    InvalidConfig(String),

    #[error("Не удалось запустить '{command}': {source}")]
    SpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Устройство не найдено: {0}")]
    DeviceNotFound(String),

    #[error("Недостаточно прав доступа: {0}")]
    Permission(String),

    #[error("Внутренняя ошибка: {0}")]
    Internal(String),
}

impl KeyrouteError {
    pub fn device_not_found<T>(msg: impl Into<String>) -> Result<T> {
        Err(KeyrouteError::DeviceNotFound(msg.into()))
    }

    pub fn unknown_group(group: impl Into<String>, referrer: impl Into<String>) -> Self {
        KeyrouteError::UnknownGroupReference {
            group: group.into(),
            referrer: referrer.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, KeyrouteError>;

// Удобные макросы для создания ошибок
#[macro_export]
macro_rules! keyroute_error {
    (device_not_found, $($arg:tt)*) => {
        $crate::error::KeyrouteError::DeviceNotFound(format!($($arg)*))
    };
    (permission, $($arg:tt)*) => {
        $crate::error::KeyrouteError::Permission(format!($($arg)*))
    };
    (invalid_config, $($arg:tt)*) => {
        $crate::error::KeyrouteError::InvalidConfig(format!($($arg)*))
    };
    (internal, $($arg:tt)*) => {
        $crate::error::KeyrouteError::Internal(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_macro() {
        let err = keyroute_error!(invalid_config, "высота бара {} недопустима", 0);
        assert_eq!(
            err.to_string(),
            "Некорректная конфигурация: высота бара 0 недопустима"
        );
    }
}
