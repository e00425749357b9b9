pub mod file;
pub mod market;
pub mod stdin;
