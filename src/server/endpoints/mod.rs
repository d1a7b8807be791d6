pub mod actions;

mod do_action;
pub use do_action::*;
