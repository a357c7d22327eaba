use crate::kernel::console::{ConsoleLog, LogCategory};
use crate::kernel::editor::EditorState;
use crate::kernel::preview::PreviewDocument;
use crate::models::{FileTree, ROOT_PATH};

pub const README_NAME: &str = "README.md";

pub const WELCOME_README: &str = "# AI Coding Workspace

Welcome to your AI-powered coding environment!

## How to Use

1. **Enter a prompt** in the command bar at the top
2. **Click \"Run Prompt\"** to generate your project
3. **Edit files** in the editor
4. **Preview** your app in the right panel
5. **Export** your project as a ZIP when done

## Example Prompts

- \"Create a todo app with React\"
- \"Build a weather dashboard\"
- \"Make a simple calculator\"
- \"Create a landing page for a startup\"

Happy coding!
";

pub const INIT_MESSAGE: &str = "AI Coding Workspace initialized. Ready for your prompts!";
pub const RESET_MESSAGE: &str = "Workspace reset. Ready for new prompts!";

#[derive(Debug)]
pub struct WorkspaceState {
    pub tree: FileTree,
    pub editor: EditorState,
    pub console: ConsoleLog,
    pub generating: bool,
    /// Id of the most recent generation request; completions carrying any other id are stale.
    pub request_id: u64,
    pub preview: Option<PreviewDocument>,
}

impl Default for WorkspaceState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkspaceState {
    pub fn new() -> Self {
        Self::seeded(INIT_MESSAGE, 0)
    }

    /// Fresh state that keeps the request counter moving so late completions stay stale.
    pub fn after_reset(previous_request_id: u64) -> Self {
        Self::seeded(RESET_MESSAGE, previous_request_id.saturating_add(1))
    }

    fn seeded(message: &str, request_id: u64) -> Self {
        let mut console = ConsoleLog::new();
        console.append(LogCategory::System, message);
        Self {
            tree: seeded_tree(),
            editor: EditorState::new(),
            console,
            generating: false,
            request_id,
            preview: None,
        }
    }
}

pub fn seeded_tree() -> FileTree {
    let mut tree = FileTree::new();
    if let Err(err) = tree.insert_file(ROOT_PATH, README_NAME, WELCOME_README) {
        tracing::error!(error = %err, "failed to seed workspace readme");
    }
    tree
}
