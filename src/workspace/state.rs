use crate::error::{KeyrouteError, Result};
use crate::workspace::group::{GroupRegistry, WindowHandle};
use crate::workspace::layout::{Layout, LayoutCycle};
use std::sync::Arc;
use tracing::debug;

/// Живое состояние группы
#[derive(Debug, Clone)]
pub struct GroupState {
    pub name: String,
    pub windows: Vec<WindowHandle>,
    pub visible_on: Option<usize>,
    pub layouts: LayoutCycle,
}

/// Живое состояние экрана. Группы экраном не владеют - хранится только индекс
#[derive(Debug, Clone, Default)]
pub struct ScreenState {
    pub current: Option<usize>,
    pub previous: Option<usize>,
}

/// Изменяемая часть модели: какие группы видны, текущие лейауты, окна.
///
/// Меняется только из `Dispatcher`.
#[derive(Debug, Clone)]
pub struct WorkspaceState {
    groups: Vec<GroupState>,
    screens: Vec<ScreenState>,
    focused_screen: usize,
}

impl WorkspaceState {
    /// Начальное размещение: каждый экран получает первую свободную группу
    /// своего банка, а при её отсутствии - первую свободную вообще
    pub fn new(registry: &GroupRegistry, layouts: Arc<[Layout]>, screen_count: usize) -> Self {
        let mut groups: Vec<GroupState> = registry
            .iter()
            .map(|spec| GroupState {
                name: spec.name.clone(),
                windows: Vec::new(),
                visible_on: None,
                layouts: LayoutCycle::new(layouts.clone()),
            })
            .collect();

        let mut screens = vec![ScreenState::default(); screen_count.max(1)];

        for (screen_index, screen) in screens.iter_mut().enumerate() {
            let home = registry
                .iter()
                .position(|spec| spec.screen == screen_index)
                .filter(|&i| groups[i].visible_on.is_none());
            let fallback = || groups.iter().position(|g| g.visible_on.is_none());

            if let Some(group_index) = home.or_else(fallback) {
                groups[group_index].visible_on = Some(screen_index);
                screen.current = Some(group_index);
            }
        }

        Self {
            groups,
            screens,
            focused_screen: 0,
        }
    }

    /// Показать группу на экране.
    ///
    /// Если группа уже видна на другом экране, тот экран получает группу,
    /// которую показывал целевой. Повторный вызов состояние не меняет.
    pub fn to_screen(&mut self, group: &str, screen: usize) -> Result<()> {
        let group_index = self
            .group_index(group)
            .ok_or_else(|| KeyrouteError::unknown_group(group, "group.to_screen"))?;
        if screen >= self.screens.len() {
            return Err(KeyrouteError::UnknownScreen {
                screen,
                referrer: format!("group.to_screen({})", group),
            });
        }

        self.focused_screen = screen;

        let displaced = self.screens[screen].current;
        if displaced == Some(group_index) {
            return Ok(());
        }

        if let Some(other_screen) = self.groups[group_index].visible_on {
            debug!(
                "Группа '{}' уходит с экрана #{} на #{}",
                group, other_screen, screen
            );
            self.screens[other_screen].current = displaced;
            if let Some(displaced_index) = displaced {
                self.groups[displaced_index].visible_on = Some(other_screen);
            }
        } else if let Some(displaced_index) = displaced {
            self.groups[displaced_index].visible_on = None;
        }

        self.groups[group_index].visible_on = Some(screen);
        let state = &mut self.screens[screen];
        state.previous = displaced;
        state.current = Some(group_index);

        Ok(())
    }

    /// Имя предыдущей группы сфокусированного экрана, если она есть
    pub fn previous_group(&self) -> Option<&str> {
        self.screens[self.focused_screen]
            .previous
            .map(|index| self.groups[index].name.as_str())
    }

    pub fn current_group(&self, screen: usize) -> Option<&GroupState> {
        self.screens
            .get(screen)
            .and_then(|state| state.current)
            .map(|index| &self.groups[index])
    }

    pub fn focused_group(&self) -> Option<&GroupState> {
        self.current_group(self.focused_screen)
    }

    pub fn focused_group_mut(&mut self) -> Option<&mut GroupState> {
        let index = self.screens[self.focused_screen].current?;
        Some(&mut self.groups[index])
    }

    pub fn focused_screen(&self) -> usize {
        self.focused_screen
    }

    pub fn screen_count(&self) -> usize {
        self.screens.len()
    }

    pub fn group(&self, name: &str) -> Option<&GroupState> {
        self.group_index(name).map(|index| &self.groups[index])
    }

    pub fn groups(&self) -> &[GroupState] {
        &self.groups
    }

    /// Новое окно попадает в группу сфокусированного экрана
    pub fn add_window(&mut self, handle: WindowHandle) -> Option<&str> {
        if self.groups.iter().any(|g| g.windows.contains(&handle)) {
            return None;
        }
        let group = self.focused_group_mut()?;
        group.windows.push(handle);
        Some(group.name.as_str())
    }

    pub fn remove_window(&mut self, handle: WindowHandle) -> bool {
        for group in &mut self.groups {
            if let Some(position) = group.windows.iter().position(|&w| w == handle) {
                group.windows.remove(position);
                return true;
            }
        }
        false
    }

    pub fn move_window(&mut self, handle: WindowHandle, target: &str) -> Result<()> {
        let target_index = self
            .group_index(target)
            .ok_or_else(|| KeyrouteError::unknown_group(target, "window.to_group"))?;

        self.remove_window(handle);
        self.groups[target_index].windows.push(handle);
        Ok(())
    }

    /// Перенести окна из состояния до перезагрузки: окна принадлежат хосту
    /// и переживают её. Окно возвращается в группу с тем же именем, а если
    /// такой группы больше нет - в группу сфокусированного экрана.
    /// Возвращает число окон, которым пристанища не нашлось.
    pub fn adopt_windows(&mut self, previous: &WorkspaceState) -> usize {
        let fallback = self.screens[self.focused_screen].current;
        let mut lost = 0;

        for old_group in &previous.groups {
            let same_name = self.group_index(&old_group.name);
            let Some(target) = same_name.or(fallback) else {
                lost += old_group.windows.len();
                continue;
            };
            if same_name.is_none() && !old_group.windows.is_empty() {
                debug!(
                    "Группы '{}' больше нет, её окна уходят в '{}'",
                    old_group.name, self.groups[target].name
                );
            }
            for &handle in &old_group.windows {
                if !self.groups[target].windows.contains(&handle) {
                    self.groups[target].windows.push(handle);
                }
            }
        }

        lost
    }

    fn group_index(&self, name: &str) -> Option<usize> {
        self.groups.iter().position(|g| g.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::BindingTable;
    use crate::events::{Modifier, ModifierSet};
    use crate::workspace::group::GroupBank;

    fn registry(two_banks: bool) -> GroupRegistry {
        let mut registry = GroupRegistry::new();
        let mut table = BindingTable::new();
        let win = ModifierSet::new().with(Modifier::Mod4);
        registry
            .register_bank(
                &GroupBank::new(GroupBank::names_from_alphabet("1234567890", ""), 0, win.clone()),
                &mut table,
            )
            .unwrap();
        if two_banks {
            registry
                .register_bank(
                    &GroupBank::new(GroupBank::names_from_alphabet("123456789", "F"), 1, win),
                    &mut table,
                )
                .unwrap();
        }
        registry
    }

    fn state(two_banks: bool, screens: usize) -> WorkspaceState {
        WorkspaceState::new(
            &registry(two_banks),
            Arc::from(vec![Layout::Max, Layout::Matrix { columns: 4 }]),
            screens,
        )
    }

    fn visible_count(state: &WorkspaceState, group: &str) -> usize {
        (0..state.screen_count())
            .filter(|&s| state.current_group(s).map(|g| g.name.as_str()) == Some(group))
            .count()
    }

    #[test]
    fn test_initial_assignment_follows_banks() {
        let state = state(true, 2);
        assert_eq!(state.current_group(0).unwrap().name, "1");
        assert_eq!(state.current_group(1).unwrap().name, "F1");
    }

    #[test]
    fn test_initial_assignment_without_home_bank() {
        let state = state(false, 2);
        assert_eq!(state.current_group(0).unwrap().name, "1");
        assert_eq!(state.current_group(1).unwrap().name, "2");
    }

    #[test]
    fn test_to_screen_is_idempotent() {
        let mut state = state(false, 1);
        state.to_screen("5", 0).unwrap();
        state.to_screen("5", 0).unwrap();

        assert_eq!(state.current_group(0).unwrap().name, "5");
        assert_eq!(visible_count(&state, "5"), 1);
        assert_eq!(state.previous_group(), Some("1"));
        assert_eq!(state.group("1").unwrap().visible_on, None);
    }

    #[test]
    fn test_group_visible_on_one_screen_only() {
        let mut state = state(true, 2);
        // F1 на экране 1 переносится на экран 0, экран 1 получает группу "1"
        state.to_screen("F1", 0).unwrap();

        assert_eq!(state.current_group(0).unwrap().name, "F1");
        assert_eq!(state.current_group(1).unwrap().name, "1");
        assert_eq!(visible_count(&state, "F1"), 1);
        assert_eq!(state.group("1").unwrap().visible_on, Some(1));
        assert_eq!(state.focused_screen(), 0);
    }

    #[test]
    fn test_to_screen_errors() {
        let mut state = state(false, 1);
        assert!(matches!(
            state.to_screen("nope", 0),
            Err(KeyrouteError::UnknownGroupReference { .. })
        ));
        assert!(matches!(
            state.to_screen("3", 4),
            Err(KeyrouteError::UnknownScreen { screen: 4, .. })
        ));
    }

    #[test]
    fn test_window_membership() {
        let mut state = state(false, 1);
        assert_eq!(state.add_window(WindowHandle(7)), Some("1"));
        assert_eq!(state.add_window(WindowHandle(7)), None);

        state.move_window(WindowHandle(7), "4").unwrap();
        assert!(state.group("1").unwrap().windows.is_empty());
        assert_eq!(state.group("4").unwrap().windows, vec![WindowHandle(7)]);

        assert!(state.remove_window(WindowHandle(7)));
        assert!(!state.remove_window(WindowHandle(7)));
    }

    #[test]
    fn test_adopt_windows_keeps_group_membership() {
        let mut before = state(true, 2);
        before.add_window(WindowHandle(7));
        before.move_window(WindowHandle(8), "F2").unwrap();

        let mut after = state(true, 2);
        assert_eq!(after.adopt_windows(&before), 0);

        assert_eq!(after.group("1").unwrap().windows, vec![WindowHandle(7)]);
        assert_eq!(after.group("F2").unwrap().windows, vec![WindowHandle(8)]);
        assert!(after.remove_window(WindowHandle(7)));
    }

    #[test]
    fn test_adopt_windows_of_removed_group_go_to_focused_group() {
        let mut before = state(true, 2);
        before.move_window(WindowHandle(9), "F5").unwrap();

        // Банка F больше нет, на экране 1 теперь группа "2"
        let mut after = state(false, 2);
        assert_eq!(after.adopt_windows(&before), 0);

        assert_eq!(after.focused_group().unwrap().name, "1");
        assert_eq!(after.group("1").unwrap().windows, vec![WindowHandle(9)]);
    }

    #[test]
    fn test_layout_index_is_per_group() {
        let mut state = state(false, 1);
        state.focused_group_mut().unwrap().layouts.next();
        state.to_screen("2", 0).unwrap();

        assert_eq!(state.focused_group().unwrap().layouts.index(), 0);
        assert_eq!(state.group("1").unwrap().layouts.index(), 1);
    }
}
