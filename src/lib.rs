//! Flashcards grouped into tabs, studied by weighted random draw.
//!
//! Missed cards gain weight and come back sooner; cards answered correctly
//! fade towards weight one. The whole deck lives in one JSON document that is
//! rewritten after every change and can be exported or imported as a backup.
//!
//! [`session::Session`] is the entry point; the other modules are the pieces
//! it is built from.

pub mod codec;
pub mod error;
pub mod model;
pub mod ops;
pub mod prompt;
pub mod rate;
pub mod select;
pub mod session;
pub mod store;

pub use error::{CardError, Result};
pub use model::{AppState, Card, Tab};
pub use session::{Action, Outcome, Session};
