pub mod error;
pub mod expr;
pub mod scope;
pub mod statement;
