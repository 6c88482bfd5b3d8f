use crate::dispatcher::Dispatch;
use crate::error::{KeyrouteError, Result};
use crate::events::{Button, ButtonPhase, Chord, ModifierSet};
use crate::host::Host;
use crate::services::SharedDispatcher;
use crate::workspace::WindowHandle;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use super::r#trait::InputListenerTrait;

/// Строка, введённая в режиме сухого запуска
#[derive(Debug, Clone, PartialEq, Eq)]
enum DryRunAction {
    /// `mod4+shift+Return`
    Key(Chord),
    /// `press mod4+Button1`
    Press(ModifierSet, Button),
    /// `motion 10 -4`
    Motion(i32, i32),
    /// `release`
    Release,
    /// `open 7`
    OpenWindow(WindowHandle),
    /// `close 7`
    CloseWindow(WindowHandle),
}

impl DryRunAction {
    fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }

        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();

        let action = match (head, rest.as_slice()) {
            ("press", [chord]) => {
                let chord: Chord = chord.parse()?;
                DryRunAction::Press(chord.modifiers, chord.key.as_str().parse()?)
            }
            ("motion", [dx, dy]) => DryRunAction::Motion(parse_number(dx)?, parse_number(dy)?),
            ("release", []) => DryRunAction::Release,
            ("open", [id]) => DryRunAction::OpenWindow(WindowHandle(parse_number(id)?)),
            ("close", [id]) => DryRunAction::CloseWindow(WindowHandle(parse_number(id)?)),
            (chord, []) => DryRunAction::Key(chord.parse()?),
            _ => {
                return Err(KeyrouteError::InvalidChord(format!(
                    "не удалось разобрать строку '{}'",
                    line
                )))
            }
        };

        Ok(Some(action))
    }
}

fn parse_number<T: std::str::FromStr>(word: &str) -> Result<T> {
    word.parse()
        .map_err(|_| KeyrouteError::InvalidChord(format!("ожидалось число, получено '{}'", word)))
}

/// Слушатель для режима сухого запуска: комбинации читаются из stdin
/// по одной на строку, устройства не открываются
pub struct DryRunInputListener {
    dispatcher: SharedDispatcher,
    held: Option<(ModifierSet, Button)>,
}

impl DryRunInputListener {
    pub fn new(dispatcher: SharedDispatcher) -> Self {
        info!("Инициализация DryRunInputListener");
        Self {
            dispatcher,
            held: None,
        }
    }

    async fn run_impl(mut self) -> Result<()> {
        info!("[DRY RUN] Вводите комбинации по одной на строку, например: mod4+5");
        info!("[DRY RUN] Мышь: press mod4+Button1 / motion 10 5 / release");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            match DryRunAction::parse(&line) {
                Ok(Some(action)) => self.apply(action),
                Ok(None) => {}
                Err(e) => warn!("[DRY RUN] {}", e),
            }
        }

        self.finish_input()
    }

    /// Конец stdin означает конец сеанса: демон завершается так же,
    /// как по команде system.shutdown
    fn finish_input(&mut self) -> Result<()> {
        info!("[DRY RUN] stdin закрыт, ввод завершён");
        self.dispatcher.lock().host_mut().shutdown()
    }

    fn apply(&mut self, action: DryRunAction) {
        let mut dispatcher = self.dispatcher.lock();

        let outcome = match action {
            DryRunAction::Key(chord) => dispatcher.on_key_event(&chord.modifiers, &chord.key),
            DryRunAction::Press(modifiers, button) => {
                let outcome = dispatcher.on_button_event(&modifiers, button, ButtonPhase::Press);
                self.held = Some((modifiers, button));
                outcome
            }
            DryRunAction::Motion(dx, dy) => match &self.held {
                Some((modifiers, button)) => {
                    dispatcher.on_button_event(modifiers, *button, ButtonPhase::Motion { dx, dy })
                }
                None => {
                    warn!("[DRY RUN] motion без нажатой кнопки");
                    return;
                }
            },
            DryRunAction::Release => match self.held.take() {
                Some((modifiers, button)) => {
                    dispatcher.on_button_event(&modifiers, button, ButtonPhase::Release)
                }
                None => {
                    warn!("[DRY RUN] release без нажатой кнопки");
                    return;
                }
            },
            DryRunAction::OpenWindow(handle) => {
                dispatcher.on_window_opened(handle);
                return;
            }
            DryRunAction::CloseWindow(handle) => {
                dispatcher.on_window_closed(handle);
                return;
            }
        };

        if outcome == Dispatch::Unbound {
            info!("[DRY RUN] Не привязано, событие ушло бы в окно");
        }

        let state = dispatcher.state();
        let screens: Vec<String> = (0..state.screen_count())
            .map(|screen| {
                let group = state.current_group(screen).map_or("-", |g| g.name.as_str());
                format!("#{}={}", screen, group)
            })
            .collect();
        info!(
            "[DRY RUN] Экраны: {} (фокус #{})",
            screens.join(" "),
            state.focused_screen()
        );
    }
}

#[async_trait::async_trait]
impl InputListenerTrait for DryRunInputListener {
    fn name(&self) -> &'static str {
        "DryRunInputListener"
    }

    async fn run(self: Box<Self>) -> Result<()> {
        (*self).run_impl().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::configuration::Configuration;
    use crate::dispatcher::Dispatcher;
    use crate::events::{KeySym, Modifier};
    use crate::services::{LifecycleRequest, ProcessHost};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn listener() -> (DryRunInputListener, mpsc::UnboundedReceiver<LifecycleRequest>) {
        let config = Config::from_toml_str(
            r#"
            [[groups]]
            alphabet = "123"

            [[layouts]]
            strategy = "max"
            "#,
        )
        .unwrap();
        let configuration = Configuration::from_config(&config).unwrap();

        let (tx, rx) = mpsc::unbounded_channel();
        let host = ProcessHost::new(tx, 4, true);
        let dispatcher = Arc::new(Mutex::new(Dispatcher::new(Arc::new(configuration), host)));
        (DryRunInputListener::new(dispatcher), rx)
    }

    #[test]
    fn test_end_of_input_requests_shutdown() {
        let (mut listener, mut rx) = listener();

        listener.finish_input().unwrap();
        assert_eq!(rx.try_recv().unwrap(), LifecycleRequest::Shutdown);
    }

    #[test]
    fn test_applied_chord_switches_group() {
        let (mut listener, _rx) = listener();

        listener.apply(DryRunAction::parse("mod4+3").unwrap().unwrap());

        let dispatcher = listener.dispatcher.lock();
        let group = dispatcher.state().current_group(0).map(|g| g.name.clone());
        assert_eq!(group.as_deref(), Some("3"));
    }

    #[test]
    fn test_release_without_press_is_ignored() {
        let (mut listener, _rx) = listener();

        listener.apply(DryRunAction::Release);
        assert!(listener.held.is_none());
    }

    #[test]
    fn test_parse_chord_line() {
        let action = DryRunAction::parse("mod4+shift+Return").unwrap().unwrap();
        assert_eq!(
            action,
            DryRunAction::Key(Chord::new(
                ModifierSet::new().with(Modifier::Mod4).with(Modifier::Shift),
                KeySym::new("Return")
            ))
        );
    }

    #[test]
    fn test_parse_pointer_lines() {
        assert_eq!(
            DryRunAction::parse("press mod4+Button3").unwrap(),
            Some(DryRunAction::Press(
                ModifierSet::new().with(Modifier::Mod4),
                Button::RIGHT
            ))
        );
        assert_eq!(
            DryRunAction::parse("motion 10 -4").unwrap(),
            Some(DryRunAction::Motion(10, -4))
        );
        assert_eq!(
            DryRunAction::parse("release").unwrap(),
            Some(DryRunAction::Release)
        );
    }

    #[test]
    fn test_parse_window_lines() {
        assert_eq!(
            DryRunAction::parse("open 7").unwrap(),
            Some(DryRunAction::OpenWindow(WindowHandle(7)))
        );
        assert!(DryRunAction::parse("close x").is_err());
    }

    #[test]
    fn test_blank_and_comment_lines_are_skipped() {
        assert_eq!(DryRunAction::parse("   ").unwrap(), None);
        assert_eq!(DryRunAction::parse("# комментарий").unwrap(), None);
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(DryRunAction::parse("motion 1").is_err());
        assert!(DryRunAction::parse("hyper+k").is_err());
    }
}
