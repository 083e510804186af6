pub mod args;
pub mod colour;
pub mod commands;
pub mod config;
pub mod contact;
pub mod page;
pub mod theme;
pub mod vars;
pub mod watch;
