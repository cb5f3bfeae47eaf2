// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Free-text date parsing.
//!
//! Users type dates as `DD.MM.YYYY`, optionally followed by a time-of-day
//! word. Anything around the date is tolerated: "примерно 25.12.2025 утром"
//! parses the same as "25.12.2025".

use std::sync::LazyLock;

use chrono::{Local, NaiveDate};
use regex::Regex;
use safar_core::SafarError;

use safar_store::models::DATE_FORMAT;

static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2}\.\d{1,2}\.\d{4})").expect("date regex is valid"));

/// Accepted time-of-day words. `днем` is folded into the ё spelling.
const TIME_OF_DAY: [&str; 5] = ["утром", "днём", "днем", "вечером", "ночью"];

/// Extract a date and optional time-of-day token from free text.
pub fn parse_single_date(text: &str) -> Result<(NaiveDate, Option<String>), SafarError> {
    let m = DATE_RE
        .find(text)
        .ok_or_else(|| SafarError::Validation("не найден формат ДД.MM.ГГГГ".to_string()))?;
    let date = NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT)
        .map_err(|e| SafarError::Validation(format!("некорректная дата: {e}")))?;

    let lower = text.to_lowercase();
    let tod = TIME_OF_DAY
        .iter()
        .find(|token| lower.contains(*token))
        .map(|token| {
            if *token == "днем" {
                "днём".to_string()
            } else {
                (*token).to_string()
            }
        });

    Ok((date, tod))
}

/// Extract a check-in / check-out pair from free text. The first two dates
/// found are used, in order.
pub fn parse_date_range(text: &str) -> Result<(NaiveDate, NaiveDate), SafarError> {
    let mut dates = DATE_RE.find_iter(text);
    let (Some(first), Some(second)) = (dates.next(), dates.next()) else {
        return Err(SafarError::Validation(
            "нужно 2 даты: заезд и выезд (DD.MM.YYYY - DD.MM.YYYY)".to_string(),
        ));
    };
    let parse = |m: regex::Match<'_>| {
        NaiveDate::parse_from_str(m.as_str(), DATE_FORMAT)
            .map_err(|e| SafarError::Validation(format!("некорректная дата: {e}")))
    };
    Ok((parse(first)?, parse(second)?))
}

/// Today and later are acceptable trip dates.
pub fn is_future_or_today(date: NaiveDate) -> bool {
    date >= Local::now().date_naive()
}
