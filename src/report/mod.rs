// ==========================================
// 补贴预算分配引擎 - 报告层
// ==========================================

pub mod text_report;

pub use text_report::{format_amount, TextReportRenderer};
