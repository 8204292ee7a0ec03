pub mod error;
pub mod runner;
pub mod session_file;

pub use error::{ReplayError, Result};
pub use runner::{EventOutcome, Outcome, ReplayReport, SessionReplayer};
pub use session_file::{SessionFile, SessionFileValidator, ValidationReport};
