//! Command implementations for deploy-cli

pub mod check;
pub mod deploy;

pub use check::run_check;
pub use deploy::run_deploy;
