pub mod conf;
pub mod exception;
pub mod json;
pub mod kafka;
pub mod log;
pub mod shutdown;
