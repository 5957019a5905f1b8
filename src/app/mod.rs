mod state;

pub use state::{App, DialogState, PromptKind};
