pub mod commands;
pub mod config;
pub mod core;
pub mod printer;
pub mod test_util;
