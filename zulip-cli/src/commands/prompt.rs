//! Interactive prompts for parameters missing from the command line.

use std::fmt::Display;
use std::str::FromStr;

use dialoguer::{Confirm, Input, Password};

use zulip_core::error::{ZulipError, ZulipResult};

fn prompt_error(e: dialoguer::Error) -> ZulipError {
    ZulipError::Internal(format!("prompt failed: {e}"))
}

/// A required text value; empty input is rejected.
pub fn text(label: &str, given: Option<String>) -> ZulipResult<String> {
    if let Some(value) = given {
        return Ok(value);
    }
    let value: String = Input::new()
        .with_prompt(label)
        .interact_text()
        .map_err(prompt_error)?;
    if value.trim().is_empty() {
        return Err(ZulipError::InvalidInput(format!("no {} entered", label.to_lowercase())));
    }
    Ok(value)
}

/// A text value that may be left empty.
pub fn text_allow_empty(label: &str, given: Option<String>) -> ZulipResult<String> {
    if let Some(value) = given {
        return Ok(value);
    }
    Input::new()
        .with_prompt(label)
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_error)
}

/// A secret, read without echo.
pub fn secret(label: &str, given: Option<String>) -> ZulipResult<String> {
    if let Some(value) = given {
        return Ok(value);
    }
    Password::new()
        .with_prompt(label)
        .interact()
        .map_err(prompt_error)
}

/// A value parsed from text; the prompt repeats until it parses.
pub fn parsed<T>(label: &str, given: Option<T>) -> ZulipResult<T>
where
    T: Clone + Display + FromStr,
    T::Err: Display,
{
    if let Some(value) = given {
        return Ok(value);
    }
    Input::<T>::new()
        .with_prompt(label)
        .interact_text()
        .map_err(prompt_error)
}

/// A yes/no answer.
pub fn confirm(label: &str, default: bool) -> ZulipResult<bool> {
    Confirm::new()
        .with_prompt(label)
        .default(default)
        .interact()
        .map_err(prompt_error)
}

/// A comma-separated list. With `allow_empty` unset, an empty answer is
/// rejected.
pub fn list(label: &str, given: Vec<String>, allow_empty: bool) -> ZulipResult<Vec<String>> {
    if !given.is_empty() {
        return Ok(given);
    }
    let raw = text_allow_empty(&format!("{label} (comma-separated)"), None)?;
    let items = split_list(&raw);
    if items.is_empty() && !allow_empty {
        return Err(ZulipError::InvalidInput(format!("no {} entered", label.to_lowercase())));
    }
    Ok(items)
}

/// Split a comma-separated answer, dropping blanks.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
