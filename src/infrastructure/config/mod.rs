//! Infrastructure configuration modules.

pub mod economy;
pub mod logging;
pub mod settings;
