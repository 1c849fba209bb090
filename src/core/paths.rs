use crate::error::{Error, Result};
use std::env;
use std::path::PathBuf;

/// Base monthshift config directory (~/.config/monthshift/, %APPDATA%\monthshift on Windows)
pub fn monthshift() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let appdata = env::var("APPDATA").map_err(|_| {
            Error::internal_unexpected(
                "APPDATA environment variable not set on Windows".to_string(),
            )
        })?;
        Ok(PathBuf::from(appdata).join("monthshift"))
    }

    #[cfg(not(windows))]
    {
        let home = env::var("HOME").map_err(|_| {
            Error::internal_unexpected(
                "HOME environment variable not set on Unix-like system".to_string(),
            )
        })?;
        Ok(PathBuf::from(home).join(".config").join("monthshift"))
    }
}

/// Global monthshift.json config file path
pub fn monthshift_json() -> Result<PathBuf> {
    Ok(monthshift()?.join("monthshift.json"))
}
