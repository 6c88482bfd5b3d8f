use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Стратегия раскладки окон. Геометрию считает хост, здесь только выбор
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Layout {
    Max,
    Matrix {
        #[serde(default = "default_stacks", alias = "num_stacks")]
        columns: u32,
    },
    Stack {
        #[serde(default = "default_stacks")]
        num_stacks: u32,
    },
    MonadTall {
        #[serde(default = "default_ratio")]
        ratio: f32,
    },
    Columns {
        #[serde(default = "default_stacks")]
        num_columns: u32,
    },
    TreeTab,
    Floating,
}

fn default_stacks() -> u32 {
    2
}

fn default_ratio() -> f32 {
    0.5
}

impl Layout {
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Max => "max",
            Layout::Matrix { .. } => "matrix",
            Layout::Stack { .. } => "stack",
            Layout::MonadTall { .. } => "monad_tall",
            Layout::Columns { .. } => "columns",
            Layout::TreeTab => "tree_tab",
            Layout::Floating => "floating",
        }
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        match self {
            Layout::Matrix { columns: 0 } => Err("matrix: columns должно быть больше 0".into()),
            Layout::Stack { num_stacks: 0 } => Err("stack: num_stacks должно быть больше 0".into()),
            Layout::Columns { num_columns: 0 } => {
                Err("columns: num_columns должно быть больше 0".into())
            }
            Layout::MonadTall { ratio } if !(0.0..1.0).contains(ratio) || *ratio == 0.0 => {
                Err(format!("monad_tall: ratio {} вне диапазона (0, 1)", ratio))
            }
            _ => Ok(()),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Matrix { columns } => write!(f, "matrix(columns={})", columns),
            Layout::Stack { num_stacks } => write!(f, "stack(num_stacks={})", num_stacks),
            Layout::MonadTall { ratio } => write!(f, "monad_tall(ratio={})", ratio),
            Layout::Columns { num_columns } => write!(f, "columns(num_columns={})", num_columns),
            other => f.write_str(other.name()),
        }
    }
}

/// Циклический список лейаутов группы с указателем на текущий
#[derive(Debug, Clone)]
pub struct LayoutCycle {
    layouts: Arc<[Layout]>,
    index: usize,
}

impl LayoutCycle {
    /// Список не может быть пустым - это проверяется при загрузке конфигурации
    pub fn new(layouts: Arc<[Layout]>) -> Self {
        debug_assert!(!layouts.is_empty());
        Self { layouts, index: 0 }
    }

    pub fn current(&self) -> &Layout {
        &self.layouts[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn next(&mut self) -> &Layout {
        self.index = (self.index + 1) % self.layouts.len();
        self.current()
    }

    pub fn prev(&mut self) -> &Layout {
        self.index = (self.index + self.layouts.len() - 1) % self.layouts.len();
        self.current()
    }
}
