pub mod init;
pub mod resolve;
pub mod tasks;
pub mod validate;
