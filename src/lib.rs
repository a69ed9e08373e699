pub mod cli;
pub mod commands;
pub mod rmaf;
pub mod utils;
