pub mod history;
pub mod url;
pub mod watch;
