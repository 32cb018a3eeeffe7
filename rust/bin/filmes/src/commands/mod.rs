pub mod catalog;
pub mod context;
pub mod login;
