pub mod config;
pub mod message;
pub mod source;
pub mod window;
pub mod worker;
