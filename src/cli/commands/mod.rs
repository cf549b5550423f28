//! CLI command implementations

pub mod cert;
pub mod check;
pub mod completions;
pub mod init;
pub mod status;
pub mod svc;
pub mod utils;
