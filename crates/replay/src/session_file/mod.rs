pub mod models;
pub mod validator;

pub use models::{ClockData, EntryData, EventData, SessionData, SessionFile};
pub use self::validator::{SessionFileValidator, ValidationReport};

use crate::Result;
use rules::CoefficientTable;
use std::path::Path;
use tracing::info;

pub async fn read_session_file(path: &Path) -> Result<SessionFile> {
    info!("Loading session file from: {}", path.display());
    let json_content = tokio::fs::read_to_string(path).await?;
    Ok(serde_json::from_str(&json_content)?)
}

/// Coefficients from `path`, or the table bundled with the engine.
pub async fn read_coefficients(path: Option<&Path>) -> Result<CoefficientTable> {
    match path {
        Some(path) => {
            info!("Loading coefficients from: {}", path.display());
            let json_content = tokio::fs::read_to_string(path).await?;
            Ok(CoefficientTable::from_json(&json_content)?)
        }
        None => Ok(CoefficientTable::bundled()?),
    }
}
