//! Built-in tools for Braid agents

pub mod task_done;
pub mod terminal;

pub use task_done::TaskDoneTool;
pub use terminal::TerminalTool;

use braid_core::tools::base::Tool;
use std::sync::Arc;

/// The default toolset for a standalone agent
pub fn default_toolset() -> Vec<Arc<dyn Tool>> {
    vec![Arc::new(TerminalTool::new()), Arc::new(TaskDoneTool)]
}
