pub mod blog;
pub mod build;
pub mod serve;
pub mod watch;
