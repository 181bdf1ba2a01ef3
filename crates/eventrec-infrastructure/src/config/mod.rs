use std::path::PathBuf;

use eventrec_domain::shared::DomainError;

const APP_DIR: &str = "eventrec";
const DATABASE_FILE: &str = "events.sqlite3";

/// Default on-disk location of the event database, under the platform data
/// directory (the original app kept it in the user's documents folder).
pub fn default_database_path() -> Result<PathBuf, DomainError> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        DomainError::StorageUnavailable("No platform data directory available".to_string())
    })?;
    Ok(data_dir.join(APP_DIR).join(DATABASE_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path_ends_with_app_file() {
        let path = default_database_path().unwrap();

        assert!(path.ends_with("eventrec/events.sqlite3"));
    }
}
