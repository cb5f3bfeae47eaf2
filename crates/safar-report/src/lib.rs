// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Report rendering for the Safar booking bot.
//!
//! Reports are requested by the admin (`/report_user`, `/report_period`)
//! and delivered back through the channel as a document upload. The
//! renderer is a trait seam so the output format can change without
//! touching the command handlers.

use chrono::Local;
use safar_core::{ReportRecord, ReportRenderer};

/// Plain-text renderer: a title line, a generation timestamp, then one
/// numbered block per record with `label: value` lines.
#[derive(Debug, Default)]
pub struct TextReportRenderer;

impl TextReportRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for TextReportRenderer {
    fn extension(&self) -> &'static str {
        "txt"
    }

    fn render(&self, title: &str, records: &[ReportRecord]) -> Vec<u8> {
        let mut out = String::new();
        out.push_str(title);
        out.push('\n');
        out.push_str(&format!(
            "Сформировано: {}\n",
            Local::now().format("%d.%m.%Y %H:%M")
        ));
        out.push_str(&"=".repeat(40));
        out.push('\n');

        for (index, record) in records.iter().enumerate() {
            out.push('\n');
            out.push_str(&format!("{}.\n", index + 1));
            for (label, value) in &record.fields {
                out.push_str(&format!("  {label}: {value}\n"));
            }
        }

        if records.is_empty() {
            out.push_str("\nЗаписей нет.\n");
        } else {
            out.push_str(&format!("\nВсего записей: {}\n", records.len()));
        }

        out.into_bytes()
    }
}
