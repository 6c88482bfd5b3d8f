use crate::bindings::{Command, DragAction, WindowAccessor};
use crate::events::{Button, KeySym, Modifier, ModifierSet};
use crate::workspace::{GroupBank, Layout, ScreenSpec, WidgetDefaults};
use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Содержимое файла конфигурации в том виде, в каком оно записано.
/// Модель для диспетчера собирается из него в `Configuration::from_config`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub widget_defaults: WidgetDefaults,
    #[serde(default)]
    pub keys: Vec<KeyBindingConfig>,
    #[serde(default)]
    pub groups: Vec<GroupBankConfig>,
    #[serde(default)]
    pub layouts: Vec<Layout>,
    #[serde(default)]
    pub screens: Vec<ScreenSpec>,
    #[serde(default)]
    pub mouse: Vec<MouseBindingConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InputConfig {
    /// Путь к клавиатуре или "auto"
    pub keyboard_device: String,
    /// Путь к мыши, "auto" или "none"
    pub pointer_device: String,
    pub drag_threshold_px: u32,
    /// Пробрасывать несвязанные клавиши в виртуальное устройство
    pub passthrough_unbound: bool,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            keyboard_device: "auto".to_string(),
            pointer_device: "none".to_string(),
            drag_threshold_px: crate::host::DEFAULT_DRAG_THRESHOLD,
            passthrough_unbound: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusOnActivation {
    #[default]
    Focus,
    Smart,
    Urgent,
    Never,
}

impl FocusOnActivation {
    pub fn name(self) -> &'static str {
        match self {
            FocusOnActivation::Focus => "focus",
            FocusOnActivation::Smart => "smart",
            FocusOnActivation::Urgent => "urgent",
            FocusOnActivation::Never => "never",
        }
    }
}

/// Глобальные параметры поведения оконного менеджера
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Основной модификатор для банков групп
    pub modifier: Modifier,
    pub follow_mouse_focus: bool,
    pub bring_front_click: bool,
    pub cursor_warp: bool,
    pub auto_fullscreen: bool,
    pub focus_on_window_activation: FocusOnActivation,
    /// Раскладка для окон, выпавших из тайлинга (диалоги, перетаскиваемые окна)
    pub floating_layout: Layout,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            modifier: Modifier::Mod4,
            follow_mouse_focus: true,
            bring_front_click: false,
            cursor_warp: false,
            auto_fullscreen: true,
            focus_on_window_activation: FocusOnActivation::Focus,
            floating_layout: Layout::Floating,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeyBindingConfig {
    #[serde(default)]
    pub modifiers: ModifierSet,
    pub key: KeySym,
    pub command: Command,
}

/// Банк групп: явный список имён или алфавит с префиксом
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GroupBankConfig {
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub alphabet: Option<String>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub screen: usize,
    #[serde(default)]
    pub modifiers: Option<ModifierSet>,
    #[serde(default)]
    pub move_modifiers: Option<ModifierSet>,
    #[serde(default = "default_true")]
    pub bind_keys: bool,
}

fn default_true() -> bool {
    true
}

impl GroupBankConfig {
    pub fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .names
            .iter()
            .map(|name| format!("{}{}", self.prefix, name))
            .collect();
        if let Some(alphabet) = &self.alphabet {
            names.extend(GroupBank::names_from_alphabet(alphabet, &self.prefix));
        }
        names
    }

    pub fn to_bank(&self, general: &GeneralConfig) -> GroupBank {
        let modifiers = self
            .modifiers
            .clone()
            .unwrap_or_else(|| ModifierSet::new().with(general.modifier));
        let mut bank = GroupBank::new(self.group_names(), self.screen, modifiers);
        if let Some(move_modifiers) = &self.move_modifiers {
            bank.move_modifiers = move_modifiers.clone();
        }
        bank.bind_keys = self.bind_keys;
        bank
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MouseBindingConfig {
    Drag {
        #[serde(default)]
        modifiers: ModifierSet,
        button: Button,
        start: WindowAccessor,
        action: DragAction,
    },
    Click {
        #[serde(default)]
        modifiers: ModifierSet,
        button: Button,
        command: Command,
    },
}

impl Config {
    pub fn load<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        let config_path = config_path.as_ref();

        let figment = Figment::new()
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("KEYROUTE_").split("__"));

        Self::extract(figment)
            .with_context(|| format!("Не удалось загрузить конфигурацию из {:?}", config_path))
    }

    /// Разбор конфигурации из строки TOML, без переменных окружения
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::extract(Figment::from(Toml::string(toml)))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment
            .extract()
            .context("Ошибка разбора конфигурации")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        // Валидация настроек логирования
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Неверный уровень логирования: {}", self.logging.level),
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" => {}
            _ => anyhow::bail!("Неверный формат логирования: {}", self.logging.format),
        }

        if self.input.keyboard_device.is_empty() {
            anyhow::bail!("keyboard_device не может быть пустым");
        }

        if self.input.drag_threshold_px == 0 {
            anyhow::bail!("drag_threshold_px должно быть больше 0");
        }

        for (i, binding) in self.keys.iter().enumerate() {
            if binding.key.as_str().is_empty() {
                anyhow::bail!("Пустая клавиша в привязке #{}", i + 1);
            }
        }

        for (i, bank) in self.groups.iter().enumerate() {
            if bank.names.is_empty() && bank.alphabet.as_deref().map_or(true, str::is_empty) {
                anyhow::bail!("Банк групп #{} не содержит ни одной группы", i + 1);
            }
        }

        Ok(())
    }
}
