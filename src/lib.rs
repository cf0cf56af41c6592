pub mod cli;
pub mod hobbyhub;
