pub mod command;
pub mod table;

pub use command::{Command, GroupOp, LayoutOp, SpawnOp, SystemOp, WindowOp};
pub use table::{BindingTable, DragAction, MouseBinding, WindowAccessor};
