//! View controllers: each owns one slice of the screen and its fetch state.

mod composer;
mod posts;
mod thread_dialog;
mod threads;
mod user_panel;

pub use composer::{Composer, ComposerError, ComposerMode};
pub use posts::{PostFetch, PostList, PostListView};
pub use thread_dialog::ThreadDialog;
pub use threads::ThreadList;
pub use user_panel::{Dialog, PanelError, UserPanel};
