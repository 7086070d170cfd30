pub mod color;
pub mod config;
pub mod coverage;
pub mod detect;
pub mod diff;
pub mod enforce;
pub mod error;
pub mod history;
pub mod locate;
pub mod report;
pub mod resolve;
pub mod suite;
pub mod symbols;

pub use config::Config;
pub use enforce::{EnforcementVerdict, Enforcer, FailureCategory};
pub use error::{Error, ExitCode, Result};
pub use history::{CommitRecord, History};
pub use symbols::{FunctionParser, FunctionSymbol, ParseError, TsFunctionParser};
