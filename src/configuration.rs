use crate::bindings::{BindingTable, Command, MouseBinding};
use crate::config::{Config, GeneralConfig, MouseBindingConfig};
use crate::error::{KeyrouteError, Result};
use crate::events::Chord;
use crate::workspace::screen::validate_screens;
use crate::workspace::{GroupRegistry, Layout, ScreenSpec, WidgetDefaults};
use std::sync::Arc;
use tracing::info;

/// Неизменяемая модель, собранная из файла конфигурации один раз.
///
/// Перезагрузка заменяет её целиком; живое состояние хранится отдельно
/// в `WorkspaceState`.
#[derive(Debug, Clone)]
pub struct Configuration {
    pub bindings: BindingTable,
    pub groups: GroupRegistry,
    pub layouts: Arc<[Layout]>,
    pub screens: Vec<ScreenSpec>,
    pub widget_defaults: WidgetDefaults,
    pub general: GeneralConfig,
}

impl Configuration {
    pub fn from_config(config: &Config) -> Result<Self> {
        let screen_count = config.screens.len().max(1);

        if config.layouts.is_empty() {
            return Err(KeyrouteError::InvalidConfig(
                "нужен хотя бы один лейаут".to_string(),
            ));
        }
        for layout in config.layouts.iter().chain([&config.general.floating_layout]) {
            layout.validate().map_err(KeyrouteError::InvalidConfig)?;
        }

        let mut bindings = BindingTable::new();
        let mut groups = GroupRegistry::new();

        for (i, bank_config) in config.groups.iter().enumerate() {
            if bank_config.screen >= screen_count {
                return Err(KeyrouteError::UnknownScreen {
                    screen: bank_config.screen,
                    referrer: format!("банк групп #{}", i + 1),
                });
            }
            groups.register_bank(&bank_config.to_bank(&config.general), &mut bindings)?;
        }

        for binding in &config.keys {
            let chord = Chord::new(binding.modifiers.clone(), binding.key.clone());
            check_references(&binding.command, &groups, screen_count, || {
                format!("привязка {}", chord)
            })?;
            bindings.register(chord, binding.command.clone())?;
        }

        for mouse in &config.mouse {
            match mouse {
                MouseBindingConfig::Drag {
                    modifiers,
                    button,
                    start,
                    action,
                } => bindings.register_mouse(
                    modifiers.clone(),
                    *button,
                    MouseBinding::Drag {
                        start: *start,
                        action: *action,
                    },
                )?,
                MouseBindingConfig::Click {
                    modifiers,
                    button,
                    command,
                } => {
                    check_references(command, &groups, screen_count, || {
                        format!("привязка {}+{}", modifiers, button)
                    })?;
                    bindings.register_mouse(
                        modifiers.clone(),
                        *button,
                        MouseBinding::Click {
                            command: command.clone(),
                        },
                    )?
                }
            }
        }

        validate_screens(&config.screens, &groups)?;

        let configuration = Self {
            bindings,
            groups,
            layouts: Arc::from(config.layouts.clone()),
            screens: config.screens.clone(),
            widget_defaults: config.widget_defaults.clone(),
            general: config.general.clone(),
        };

        info!(
            "Собрана конфигурация: {} привязок клавиш, {} кнопок, {} групп, {} лейаутов, {} экранов",
            configuration.bindings.len(),
            configuration.bindings.mouse_len(),
            configuration.groups.len(),
            configuration.layouts.len(),
            configuration.screen_count()
        );

        Ok(configuration)
    }

    /// Без объявленных экранов считается, что экран один и без баров
    pub fn screen_count(&self) -> usize {
        self.screens.len().max(1)
    }

    /// Краткое описание для режима проверки
    pub fn summary(&self) -> Vec<String> {
        let mut lines = Vec::new();

        let banks: Vec<String> = self
            .groups
            .iter()
            .map(|g| format!("{}@{}", g.name, g.screen))
            .collect();
        lines.push(format!("Группы: {}", banks.join(" ")));

        let layouts: Vec<String> = self.layouts.iter().map(|l| l.to_string()).collect();
        lines.push(format!(
            "Лейауты: {}; плавающие окна: {}",
            layouts.join(", "),
            self.general.floating_layout
        ));

        let general = &self.general;
        lines.push(format!(
            "Общие: modifier={} follow_mouse_focus={} bring_front_click={} cursor_warp={} auto_fullscreen={} focus_on_window_activation={}",
            general.modifier,
            general.follow_mouse_focus,
            general.bring_front_click,
            general.cursor_warp,
            general.auto_fullscreen,
            general.focus_on_window_activation.name()
        ));

        for (index, screen) in self.screens.iter().enumerate() {
            for (position, bar) in screen.bars() {
                let widgets: Vec<&str> = bar.widgets.iter().map(|w| w.kind.name()).collect();
                lines.push(format!(
                    "Экран #{} {} ({}px): {}",
                    index,
                    position,
                    bar.height,
                    widgets.join(", ")
                ));
            }
        }

        for (chord, command) in self.bindings.sorted_keys() {
            lines.push(format!("{:<28} {}", chord.to_string(), command));
        }

        lines
    }
}

fn check_references(
    command: &Command,
    groups: &GroupRegistry,
    screen_count: usize,
    referrer: impl Fn() -> String,
) -> Result<()> {
    if let Some(group) = command.referenced_group() {
        if !groups.contains(group) {
            return Err(KeyrouteError::unknown_group(group, referrer()));
        }
    }
    if let Some(screen) = command.referenced_screen() {
        if screen >= screen_count {
            return Err(KeyrouteError::UnknownScreen {
                screen,
                referrer: referrer(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{KeySym, Modifier, ModifierSet};

    fn build(toml: &str) -> Result<Configuration> {
        let config = Config::from_toml_str(toml).map_err(KeyrouteError::Config)?;
        Configuration::from_config(&config)
    }

    const BASE: &str = r#"
        [[groups]]
        alphabet = "1234567890"

        [[layouts]]
        strategy = "max"
    "#;

    #[test]
    fn test_builds_group_chords() {
        let configuration = build(BASE).unwrap();
        let win = ModifierSet::new().with(Modifier::Mod4);

        assert_eq!(configuration.groups.len(), 10);
        assert_eq!(configuration.bindings.len(), 20);
        assert_eq!(
            configuration.bindings.resolve(&win, &KeySym::new("0")),
            Some(&Command::to_screen("0", 0))
        );
    }

    #[test]
    fn test_duplicate_chord_fails_load() {
        let toml = format!(
            "{}\n{}",
            BASE,
            r#"
            [[keys]]
            modifiers = ["mod4"]
            key = "5"
            command = { spawn = { command = "urxvt" } }
            "#
        );

        let err = build(&toml).unwrap_err();
        assert!(matches!(err, KeyrouteError::DuplicateBinding { ref chord } if chord == "mod4+5"));
    }

    #[test]
    fn test_duplicate_explicit_keys_fail_load() {
        let toml = format!(
            "{}\n{}",
            BASE,
            r#"
            [[keys]]
            modifiers = ["mod4"]
            key = "Up"
            command = { spawn = { command = "amixer set Master 5%+" } }

            [[keys]]
            modifiers = ["super"]
            key = "Up"
            command = { spawn = { command = "xbacklight -inc 10" } }
            "#
        );

        assert!(matches!(
            build(&toml),
            Err(KeyrouteError::DuplicateBinding { .. })
        ));
    }

    #[test]
    fn test_unknown_group_in_binding_fails_load() {
        let toml = format!(
            "{}\n{}",
            BASE,
            r#"
            [[keys]]
            modifiers = ["mod4", "control"]
            key = "w"
            command = { window = { to_group = "web" } }
            "#
        );

        let err = build(&toml).unwrap_err();
        assert!(matches!(
            err,
            KeyrouteError::UnknownGroupReference { ref group, .. } if group == "web"
        ));
    }

    #[test]
    fn test_unknown_group_in_widget_fails_load() {
        let toml = format!(
            "{}\n{}",
            BASE,
            r#"
            [[screens]]
            [screens.top]
            height = 22
            [[screens.top.widgets]]
            widget = "group_indicator"
            visible_groups = ["1", "F1"]
            "#
        );

        assert!(matches!(
            build(&toml),
            Err(KeyrouteError::UnknownGroupReference { .. })
        ));
    }

    #[test]
    fn test_bank_on_missing_screen_fails_load() {
        let toml = r#"
            [[groups]]
            alphabet = "123"
            screen = 1

            [[layouts]]
            strategy = "max"
        "#;

        assert!(matches!(
            build(toml),
            Err(KeyrouteError::UnknownScreen { screen: 1, .. })
        ));
    }

    #[test]
    fn test_layouts_required() {
        let toml = "[[groups]]\nalphabet = \"12\"";
        assert!(matches!(build(toml), Err(KeyrouteError::InvalidConfig(_))));
    }

    #[test]
    fn test_shipped_config_loads() {
        let configuration = build(include_str!("../keyroute.toml")).unwrap();
        let win = ModifierSet::new().with(Modifier::Mod4);

        assert_eq!(configuration.groups.len(), 19);
        assert_eq!(configuration.screen_count(), 2);
        assert_eq!(configuration.bindings.mouse_len(), 2);
        assert_eq!(
            configuration.bindings.resolve(&win, &KeySym::new("F3")),
            Some(&Command::to_screen("F3", 1))
        );
        assert_eq!(
            configuration.bindings.resolve(&win, &KeySym::new("3")),
            Some(&Command::to_screen("3", 0))
        );
        assert_eq!(
            configuration
                .bindings
                .resolve(&ModifierSet::new(), &KeySym::new("F10")),
            Some(&Command::spawn("slock"))
        );
        assert_eq!(configuration.widget_defaults.font, "xos4 Terminess Powerline");
    }

    #[test]
    fn test_summary_lists_bindings() {
        let configuration = build(BASE).unwrap();
        let summary = configuration.summary();

        assert!(summary[0].starts_with("Группы: 1@0"));
        assert_eq!(summary[1], "Лейауты: max; плавающие окна: floating");
        assert!(summary.iter().any(|line| line.contains("group.to_screen(5, 0)")));
    }

    #[test]
    fn test_summary_lists_general_flags() {
        let toml = format!(
            "{}
{}",
            BASE,
            r#"
            [general]
            cursor_warp = true
            focus_on_window_activation = "smart"
            "#
        );
        let summary = build(&toml).unwrap().summary();

        assert_eq!(
            summary[2],
            "Общие: modifier=mod4 follow_mouse_focus=true bring_front_click=false \
             cursor_warp=true auto_fullscreen=true focus_on_window_activation=smart"
        );
    }

    #[test]
    fn test_floating_layout_is_configurable() {
        let toml = format!(
            "{}
{}",
            BASE,
            r#"
            [general]
            floating_layout = { strategy = "monad_tall", ratio = 0.6 }
            "#
        );
        let configuration = build(&toml).unwrap();
        assert_eq!(
            configuration.general.floating_layout,
            Layout::MonadTall { ratio: 0.6 }
        );

        let broken = format!(
            "{}
{}",
            BASE,
            r#"
            [general]
            floating_layout = { strategy = "matrix", columns = 0 }
            "#
        );
        assert!(matches!(build(&broken), Err(KeyrouteError::InvalidConfig(_))));
    }
}
