pub mod group;
pub mod layout;
pub mod screen;
pub mod state;

pub use group::{GroupBank, GroupRegistry, GroupSpec, WindowHandle};
pub use layout::{Layout, LayoutCycle};
pub use screen::{Bar, ScreenSpec, Widget, WidgetDefaults, WidgetKind};
pub use state::{GroupState, ScreenState, WorkspaceState};
