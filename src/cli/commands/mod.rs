pub mod run;
pub mod worker;

pub use run::*;
pub use worker::*;
