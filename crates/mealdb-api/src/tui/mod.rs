//! Interactive search screen

mod app;
mod input;
mod ui;

pub use app::{run, App, DetailPane, Focus, Toast};
pub use input::TextInput;
