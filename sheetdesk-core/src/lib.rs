pub mod commands;
pub mod debug;
pub mod download;
pub mod engine;
pub mod host;
pub mod io;
pub mod menu;
pub mod queue;
pub mod sheet;
pub mod state;
