pub mod options;
pub mod selections;
pub mod suggestion;
