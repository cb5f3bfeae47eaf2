// SPDX-FileCopyrightText: 2026 Safar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

mod notifier;
mod report;

pub use notifier::Notifier;
pub use report::ReportRenderer;
