//! Экраны, бары и виджеты.
//!
//! Сборка чисто структурная: отрисовка и периодическое обновление виджетов
//! остаются за хостом, здесь хранятся только их параметры. При загрузке
//! проверяется ссылочная целостность: фильтр `visible_groups` индикатора
//! групп может ссылаться только на объявленные группы.

use crate::error::{KeyrouteError, Result};
use crate::workspace::group::GroupRegistry;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenSpec {
    #[serde(default)]
    pub top: Option<Bar>,
    #[serde(default)]
    pub bottom: Option<Bar>,
}

impl ScreenSpec {
    pub fn bars(&self) -> impl Iterator<Item = (&'static str, &Bar)> {
        self.top
            .iter()
            .map(|bar| ("top", bar))
            .chain(self.bottom.iter().map(|bar| ("bottom", bar)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub height: u32,
    #[serde(default)]
    pub widgets: Vec<Widget>,
}

/// Значения по умолчанию для всех виджетов
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetDefaults {
    pub font: String,
    pub fontsize: u32,
    pub padding: u32,
    pub foreground: String,
    pub background: String,
}

impl Default for WidgetDefaults {
    fn default() -> Self {
        Self {
            font: "sans".to_string(),
            fontsize: 12,
            padding: 3,
            foreground: "ffffff".to_string(),
            background: "000000".to_string(),
        }
    }
}

/// Общие параметры оформления; незаданные берутся из `WidgetDefaults`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetStyle {
    pub font: Option<String>,
    pub fontsize: Option<u32>,
    pub padding: Option<u32>,
    pub foreground: Option<String>,
    pub background: Option<String>,
}

impl WidgetStyle {
    pub fn resolve(&self, defaults: &WidgetDefaults) -> WidgetDefaults {
        WidgetDefaults {
            font: self.font.clone().unwrap_or_else(|| defaults.font.clone()),
            fontsize: self.fontsize.unwrap_or(defaults.fontsize),
            padding: self.padding.unwrap_or(defaults.padding),
            foreground: self
                .foreground
                .clone()
                .unwrap_or_else(|| defaults.foreground.clone()),
            background: self
                .background
                .clone()
                .unwrap_or_else(|| defaults.background.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Widget {
    #[serde(flatten)]
    pub kind: WidgetKind,
    #[serde(flatten)]
    pub style: WidgetStyle,
}

impl Widget {
    pub fn new(kind: WidgetKind) -> Self {
        Self {
            kind,
            style: WidgetStyle::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Memory,
    Cpu,
    Network,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStyle {
    #[default]
    Graph,
    Text,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum WidgetKind {
    GroupIndicator {
        #[serde(default = "default_border_width")]
        border_width: u32,
        #[serde(default = "default_true")]
        rounded: bool,
        #[serde(default)]
        this_current_screen_border: Option<String>,
        #[serde(default = "default_true")]
        use_mouse_wheel: bool,
        #[serde(default)]
        disable_drag: bool,
        /// Какие группы показывать; `None` - все
        #[serde(default)]
        visible_groups: Option<Vec<String>>,
    },
    Separator {
        #[serde(default = "default_line_width")]
        line_width: u32,
    },
    TextPrompt {
        #[serde(default)]
        prompt: Option<String>,
    },
    WindowTitle,
    TraySlot {
        #[serde(default = "default_icon_size")]
        icon_size: u32,
    },
    VolumeIndicator {
        #[serde(default)]
        device: Option<String>,
        #[serde(default = "default_channel")]
        channel: String,
        #[serde(default = "default_volume_interval")]
        update_interval: f64,
    },
    ResourceGraph {
        resource: Resource,
        #[serde(default)]
        style: ResourceStyle,
        #[serde(default = "default_line_width")]
        line_width: u32,
        #[serde(default)]
        margin_x: u32,
        #[serde(default)]
        margin_y: u32,
        #[serde(default)]
        border_width: u32,
        #[serde(default, rename = "type")]
        graph_type: Option<String>,
        #[serde(default)]
        graph_color: Option<String>,
        #[serde(default)]
        core: Option<u32>,
        #[serde(default = "default_update_interval")]
        update_interval: f64,
    },
    Clock {
        #[serde(default = "default_clock_format")]
        format: String,
        #[serde(default = "default_update_interval")]
        update_interval: f64,
    },
    BatteryIndicator {
        #[serde(default = "default_battery_interval", alias = "update_delay")]
        update_interval: f64,
    },
}

fn default_true() -> bool {
    true
}

fn default_border_width() -> u32 {
    3
}

fn default_line_width() -> u32 {
    1
}

fn default_icon_size() -> u32 {
    20
}

fn default_channel() -> String {
    "Master".to_string()
}

fn default_volume_interval() -> f64 {
    0.2
}

fn default_update_interval() -> f64 {
    1.0
}

fn default_battery_interval() -> f64 {
    60.0
}

fn default_clock_format() -> String {
    "%H:%M".to_string()
}

impl WidgetKind {
    pub fn name(&self) -> &'static str {
        match self {
            WidgetKind::GroupIndicator { .. } => "group_indicator",
            WidgetKind::Separator { .. } => "separator",
            WidgetKind::TextPrompt { .. } => "text_prompt",
            WidgetKind::WindowTitle => "window_title",
            WidgetKind::TraySlot { .. } => "tray_slot",
            WidgetKind::VolumeIndicator { .. } => "volume_indicator",
            WidgetKind::ResourceGraph { .. } => "resource_graph",
            WidgetKind::Clock { .. } => "clock",
            WidgetKind::BatteryIndicator { .. } => "battery_indicator",
        }
    }

    /// Период обновления, который хост должен соблюдать для этого виджета
    pub fn refresh_interval(&self) -> Option<Duration> {
        let seconds = match self {
            WidgetKind::VolumeIndicator { update_interval, .. }
            | WidgetKind::ResourceGraph { update_interval, .. }
            | WidgetKind::Clock { update_interval, .. }
            | WidgetKind::BatteryIndicator { update_interval } => *update_interval,
            _ => return None,
        };
        Duration::try_from_secs_f64(seconds).ok()
    }
}

/// Проверить экраны: высоты баров, интервалы обновления и ссылки на группы
pub fn validate_screens(screens: &[ScreenSpec], groups: &GroupRegistry) -> Result<()> {
    for (index, screen) in screens.iter().enumerate() {
        for (position, bar) in screen.bars() {
            if bar.height == 0 {
                return Err(KeyrouteError::InvalidConfig(format!(
                    "высота бара {} на экране #{} должна быть больше 0",
                    position, index
                )));
            }

            for widget in &bar.widgets {
                let referrer = || {
                    format!(
                        "виджет {} (экран #{}, бар {})",
                        widget.kind.name(),
                        index,
                        position
                    )
                };

                if let WidgetKind::GroupIndicator {
                    visible_groups: Some(names),
                    ..
                } = &widget.kind
                {
                    if let Some(missing) = names.iter().find(|name| !groups.contains(name)) {
                        return Err(KeyrouteError::unknown_group(missing.clone(), referrer()));
                    }
                }

                let has_interval = matches!(
                    widget.kind,
                    WidgetKind::VolumeIndicator { .. }
                        | WidgetKind::ResourceGraph { .. }
                        | WidgetKind::Clock { .. }
                        | WidgetKind::BatteryIndicator { .. }
                );
                if has_interval && widget.kind.refresh_interval().map_or(true, |d| d.is_zero()) {
                    return Err(KeyrouteError::InvalidConfig(format!(
                        "{}: update_interval должен быть положительным",
                        referrer()
                    )));
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingTable;
    use crate::events::{Modifier, ModifierSet};
    use crate::workspace::group::GroupBank;

    fn registry() -> GroupRegistry {
        let mut registry = GroupRegistry::new();
        let mut table = BindingTable::new();
        registry
            .register_bank(
                &GroupBank::new(
                    GroupBank::names_from_alphabet("123", ""),
                    0,
                    ModifierSet::new().with(Modifier::Mod4),
                ),
                &mut table,
            )
            .unwrap();
        registry
    }

    fn group_box(names: &[&str]) -> Widget {
        Widget::new(WidgetKind::GroupIndicator {
            border_width: 2,
            rounded: false,
            this_current_screen_border: Some("7dbc2b".to_string()),
            use_mouse_wheel: false,
            disable_drag: true,
            visible_groups: Some(names.iter().map(|n| n.to_string()).collect()),
        })
    }

    fn screen_with(widgets: Vec<Widget>) -> ScreenSpec {
        ScreenSpec {
            top: Some(Bar { height: 22, widgets }),
            bottom: None,
        }
    }

    #[test]
    fn test_known_visible_groups_pass() {
        let screens = vec![screen_with(vec![group_box(&["1", "2"])])];
        assert!(validate_screens(&screens, &registry()).is_ok());
    }

    #[test]
    fn test_unknown_visible_group_is_rejected() {
        let screens = vec![screen_with(vec![group_box(&["1", "F1"])])];
        let err = validate_screens(&screens, &registry()).unwrap_err();
        assert!(matches!(
            err,
            KeyrouteError::UnknownGroupReference { ref group, .. } if group == "F1"
        ));
    }

    #[test]
    fn test_zero_height_bar_is_rejected() {
        let screens = vec![ScreenSpec {
            top: None,
            bottom: Some(Bar { height: 0, widgets: vec![] }),
        }];
        assert!(validate_screens(&screens, &registry()).is_err());
    }

    #[test]
    fn test_zero_update_interval_is_rejected() {
        let clock = Widget::new(WidgetKind::Clock {
            format: default_clock_format(),
            update_interval: 0.0,
        });
        assert!(validate_screens(&[screen_with(vec![clock])], &registry()).is_err());
    }

    #[test]
    fn test_refresh_interval() {
        let battery = WidgetKind::BatteryIndicator { update_interval: 5.0 };
        assert_eq!(battery.refresh_interval(), Some(Duration::from_secs(5)));
        assert_eq!(WidgetKind::WindowTitle.refresh_interval(), None);
    }

    #[test]
    fn test_style_falls_back_to_defaults() {
        let defaults = WidgetDefaults {
            font: "xos4 Terminess Powerline".to_string(),
            ..WidgetDefaults::default()
        };
        let style = WidgetStyle {
            fontsize: Some(14),
            ..WidgetStyle::default()
        };

        let resolved = style.resolve(&defaults);
        assert_eq!(resolved.font, "xos4 Terminess Powerline");
        assert_eq!(resolved.fontsize, 14);
    }
}
