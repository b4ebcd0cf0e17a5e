use std::sync::OnceLock;

use regex::Regex;

use crate::AppError;

const APP_NAME_PATTERN: &str = r"^[A-Za-z0-9][A-Za-z0-9_.+-]+$";

fn app_name_regex() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(APP_NAME_PATTERN).expect("app name pattern must compile"))
}

/// At least two characters, starting alphanumeric.
pub fn is_valid_app_name(name: &str) -> bool {
    app_name_regex().is_match(name)
}

pub fn validate_app_name(name: &str) -> Result<(), AppError> {
    if is_valid_app_name(name) {
        Ok(())
    } else {
        Err(AppError::InvalidName(name.to_string()))
    }
}
