pub mod fatal;
pub mod form;
