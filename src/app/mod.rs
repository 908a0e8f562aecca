pub mod checker;
pub mod errors;
pub mod factory;

pub use checker::TitleChecker;
pub use errors::CheckError;
pub use factory::{AppFactory, CheckerOverrides};
