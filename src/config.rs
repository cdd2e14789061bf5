use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Dosetrack";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the application data directory
/// ~/Dosetrack/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Dosetrack")
}

/// Get the schedule database path
pub fn database_path() -> PathBuf {
    app_data_dir().join("dosetrack.db")
}
