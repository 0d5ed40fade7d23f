// ==========================================
// 补贴预算分配引擎 - 文本评估报告
// ==========================================
// 章节: 政策配置 / 分配概要 / 影响汇总 / 分计划明细 /
//       前 10 名 / 前 3 名决策说明 / 敏感性分析 / 预算覆盖
// ==========================================

use crate::domain::allocation::AllocationReport;
use crate::domain::record::EligibilityRecord;
use crate::engine::sensitivity::SensitivityRow;

const WIDE_RULE: usize = 70;
const NARROW_RULE: usize = 40;
const TOP_SELECTIONS: usize = 10;
const TOP_JUSTIFICATIONS: usize = 3;

pub struct TextReportRenderer {
    // 无状态渲染器
}

impl TextReportRenderer {
    pub fn new() -> Self {
        Self {}
    }

    /// 渲染完整报告
    ///
    /// # 参数
    /// - report: 分配报告
    /// - pool: 参与评估的全部资格记录（用于需求总额）
    /// - sensitivity: 敏感性分析结果（为空时省略该章节）
    pub fn render(
        &self,
        report: &AllocationReport,
        pool: &[EligibilityRecord],
        sensitivity: &[SensitivityRow],
    ) -> String {
        let mut lines: Vec<String> = Vec::new();

        lines.push("=".repeat(WIDE_RULE));
        lines.push("BUDGET-CONSTRAINED SUBSIDY ALLOCATION REPORT".to_string());
        lines.push("=".repeat(WIDE_RULE));
        lines.push(String::new());

        self.policy_section(&mut lines, report, pool.len());

        if report.selected.is_empty() {
            lines.push(
                "No pairs selected within budget. Try a larger budget or different alpha."
                    .to_string(),
            );
            return lines.join("\n");
        }

        self.summary_section(&mut lines, report);
        self.impact_section(&mut lines, report);
        self.scheme_section(&mut lines, report);
        self.top_selections_section(&mut lines, report);
        self.justification_section(&mut lines, report);
        if !sensitivity.is_empty() {
            self.sensitivity_section(&mut lines, sensitivity);
        }
        self.coverage_section(&mut lines, report, pool);

        lines.push("=".repeat(WIDE_RULE));
        lines.push("END OF REPORT".to_string());
        lines.push("=".repeat(WIDE_RULE));

        lines.join("\n")
    }

    /// 单独渲染敏感性分析表
    pub fn render_sensitivity(&self, rows: &[SensitivityRow]) -> String {
        let mut lines = Vec::new();
        self.sensitivity_section(&mut lines, rows);
        lines.join("\n")
    }

    fn policy_section(&self, lines: &mut Vec<String>, report: &AllocationReport, pool_size: usize) {
        lines.push("1. POLICY CONFIGURATION".to_string());
        lines.push("-".repeat(NARROW_RULE));
        lines.push(format!("  Total Budget               : {}", format_amount(report.budget, 0)));
        lines.push(format!("  Revenue Weight (alpha)     : {:.2}", report.alpha));
        lines.push(format!("  Employment Weight (beta)   : {:.2}", report.beta));
        lines.push(format!("  Distribution Mode          : {}", report.mode));
        lines.push(format!("  Input Entity-Scheme Pairs  : {}", pool_size));
        lines.push(String::new());
    }

    fn summary_section(&self, lines: &mut Vec<String>, report: &AllocationReport) {
        lines.push("2. ALLOCATION SUMMARY".to_string());
        lines.push("-".repeat(NARROW_RULE));
        lines.push(format!("  Pairs Selected             : {}", report.total_selected));
        lines.push(format!("  Unique Entities Funded     : {}", report.unique_entities));
        lines.push(format!("  Budget Used                : {}", format_amount(report.budget_used, 2)));
        lines.push(format!(
            "  Budget Unused              : {}",
            format_amount(report.remaining_budget(), 2)
        ));
        lines.push(format!("  Budget Utilization         : {:.2}%", report.utilization_pct));
        lines.push(String::new());
    }

    fn impact_section(&self, lines: &mut Vec<String>, report: &AllocationReport) {
        lines.push("3. PROJECTED IMPACT".to_string());
        lines.push("-".repeat(NARROW_RULE));
        lines.push(format!(
            "  Total Revenue Gain          : {:>20}",
            format_amount(report.total_revenue_gain, 2)
        ));
        lines.push(format!(
            "  Total New Jobs Created      : {:>20}",
            format_amount(report.total_jobs_created as f64, 0)
        ));
        lines.push(format!(
            "  Total Subsidy Disbursed     : {:>20}",
            format_amount(report.budget_used, 2)
        ));
        lines.push(String::new());
    }

    fn scheme_section(&self, lines: &mut Vec<String>, report: &AllocationReport) {
        lines.push("4. PER-SCHEME SELECTION BREAKDOWN".to_string());
        lines.push("-".repeat(NARROW_RULE));
        lines.push(format!(
            "  {:<40} {:>9} {:>16} {:>6} {:>10}",
            "Scheme", "Selected", "Subsidy", "Jobs", "Avg Score"
        ));
        lines.push(format!("  {}", "-".repeat(85)));
        for row in &report.by_scheme {
            lines.push(format!(
                "  {:<40} {:>9} {:>16} {:>6} {:>10.1}",
                row.key,
                row.count,
                format_amount(row.subsidy_total, 0),
                row.jobs_total,
                row.avg_score
            ));
        }
        lines.push(String::new());
    }

    fn top_selections_section(&self, lines: &mut Vec<String>, report: &AllocationReport) {
        lines.push(format!("5. TOP {} RANKED SELECTIONS", TOP_SELECTIONS));
        lines.push("-".repeat(WIDE_RULE));
        lines.push(format!(
            "  {:>4} {:<12} {:<10} {:>8} {:>14} {:>7} {:>5}",
            "Rank", "Entity", "Scheme", "Score", "Subsidy", "Rev+%", "Jobs"
        ));
        lines.push(format!("  {}", "-".repeat(66)));
        for selected in report.selected.iter().take(TOP_SELECTIONS) {
            lines.push(format!(
                "  {:>4} {:<12} {:<10} {:>8.1} {:>14} {:>6.2}% {:>5}",
                selected.rank,
                selected.record.entity_id,
                selected.record.scheme_id,
                selected.composite_score,
                format_amount(selected.record.subsidy_amount, 0),
                selected.record.revenue_increase_pct,
                selected.record.new_jobs_added
            ));
        }
        lines.push(String::new());
    }

    fn justification_section(&self, lines: &mut Vec<String>, report: &AllocationReport) {
        lines.push(format!(
            "6. DECISION JUSTIFICATION (Top {} Selections)",
            TOP_JUSTIFICATIONS
        ));
        lines.push("-".repeat(WIDE_RULE));
        for selected in report.selected.iter().take(TOP_JUSTIFICATIONS) {
            let scheme = if selected.record.scheme_name.is_empty() {
                &selected.record.scheme_id
            } else {
                &selected.record.scheme_name
            };
            lines.push(format!(
                "  Rank #{}: {} -> {}",
                selected.rank, selected.record.entity_id, scheme
            ));
            lines.push(format!("    {}", selected.justification));
            lines.push(String::new());
        }
    }

    fn sensitivity_section(&self, lines: &mut Vec<String>, rows: &[SensitivityRow]) {
        lines.push("7. POLICY SENSITIVITY ANALYSIS".to_string());
        lines.push("-".repeat(WIDE_RULE));
        lines.push(format!(
            "  {:>6} {:>5} {:>9} {:>16} {:>30} {:>10}",
            "Alpha", "Beta", "Selected", "Budget Used", "Top Scheme", "Avg Score"
        ));
        lines.push(format!("  {}", "-".repeat(81)));
        for row in rows {
            match (&row.top_scheme, row.avg_score) {
                (Some(scheme), Some(avg)) => lines.push(format!(
                    "  {:>6.1} {:>5.1} {:>9} {:>16} {:>30} {:>10.1}",
                    row.alpha,
                    row.beta,
                    row.selected,
                    format_amount(row.budget_used, 0),
                    truncate(scheme, 30),
                    avg
                )),
                _ => lines.push(format!(
                    "  {:>6.1} {:>5.1} {:>9} {:>16} {:>30} {:>10}",
                    row.alpha, row.beta, "-", "-", "-", "-"
                )),
            }
        }
        lines.push(String::new());
    }

    fn coverage_section(
        &self,
        lines: &mut Vec<String>,
        report: &AllocationReport,
        pool: &[EligibilityRecord],
    ) {
        let demand: f64 = pool.iter().map(|r| r.subsidy_amount).sum();

        lines.push("8. BUDGET COVERAGE".to_string());
        lines.push("-".repeat(NARROW_RULE));
        lines.push(format!("  Total eligible pairs evaluated : {}", pool.len()));
        lines.push(format!("  Pairs funded                   : {}", report.total_selected));
        lines.push(format!(
            "  Pairs not funded               : {}",
            pool.len().saturating_sub(report.total_selected)
        ));
        lines.push(format!("  Cost of all eligible pairs     : {}", format_amount(demand, 2)));
        if demand > 0.0 {
            lines.push(format!(
                "  Budget coverage                : {:.1}% of total demand",
                report.budget / demand * 100.0
            ));
        }
        lines.push(String::new());
    }
}

impl Default for TextReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// 千分位金额格式化
pub fn format_amount(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (formatted.as_str(), None),
    };

    let mut grouped = String::with_capacity(formatted.len() + int_part.len() / 3 + 1);
    if value < 0.0 && formatted.chars().any(|c| c != '0' && c != '.') {
        grouped.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if let Some(frac) = frac_part {
        grouped.push('.');
        grouped.push_str(frac);
    }
    grouped
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
