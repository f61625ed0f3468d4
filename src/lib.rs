pub mod cigarmd;
pub mod cli;
pub mod commands;
pub mod stats;
pub mod utils;
pub mod writers;
