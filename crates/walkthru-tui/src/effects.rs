//! UI effect types.
//!
//! Effects are commands returned by the reducer that the runtime executes.
//! The reducer only mutates state; anything that reaches outside the process
//! goes through here.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    /// Open a URL in the system browser.
    OpenBrowser { url: String },
}
