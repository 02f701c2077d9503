pub mod colors;
pub mod editor;
pub mod format;
pub mod logging;
pub mod print;
