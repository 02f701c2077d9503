//! Process plumbing and the form model behind subconf.
//!
//! * [`session`] runs on the host: it launches the editor and folds its
//!   updates back into the live settings.
//! * [`editor`] is the editor's form state, kept free of terminal I/O.
//! * [`protocol`] is the line format shared by both sides.

pub mod editor;
pub mod error;
pub mod protocol;
pub mod session;

pub use error::{Result, SessionError};
