// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report rendering seam.

use crate::types::ReportRecord;

/// Renders a titled list of records into a downloadable document.
///
/// Implementations decide the output format; the default renderer emits a
/// plain-text file with one numbered block per record.
pub trait ReportRenderer: Send + Sync {
    /// File extension the renderer produces, without the leading dot.
    fn extension(&self) -> &'static str;

    /// Render `records` under `title` into file bytes.
    fn render(&self, title: &str, records: &[ReportRecord]) -> Vec<u8>;
}
