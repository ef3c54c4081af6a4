//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Local::now().year())
}

/// Stock label for a unit count.
///
/// Usage in templates: `{{ product.units_in_stock|stock_label }}`
#[askama::filter_fn]
pub fn stock_label(units: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(match units.to_string().as_str() {
        "0" => "Out of stock".to_string(),
        "1" => "1 unit left".to_string(),
        n => format!("{n} units in stock"),
    })
}
