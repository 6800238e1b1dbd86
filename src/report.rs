use std::fmt::Write;

use crate::models::{DailyHealthRecord, TrendSummary};
use crate::score::MAX_SCORE;

pub const EMPTY_HISTORY_MESSAGE: &str = "まだ記録がありません。運動データを保存してみましょう！";
const CHART_WIDTH: u32 = 40;

pub fn summarize(records: &[DailyHealthRecord]) -> Option<TrendSummary> {
    let latest = records.iter().max_by_key(|r| r.date)?.clone();
    // Ties keep the earliest day.
    let best = records
        .iter()
        .fold(None::<&DailyHealthRecord>, |acc, r| match acc {
            Some(best) if best.score >= r.score => Some(best),
            _ => Some(r),
        })?
        .clone();
    let worst = records
        .iter()
        .fold(None::<&DailyHealthRecord>, |acc, r| match acc {
            Some(worst) if worst.score <= r.score => Some(worst),
            _ => Some(r),
        })?
        .clone();

    let total: u64 = records.iter().map(|r| u64::from(r.score)).sum();
    let average_score = total as f64 / records.len() as f64;

    let mut by_date: Vec<&DailyHealthRecord> = records.iter().collect();
    by_date.sort_by_key(|r| r.date);
    let change_from_previous = match by_date.as_slice() {
        [.., previous, last] => Some(i64::from(last.score) - i64::from(previous.score)),
        _ => None,
    };

    Some(TrendSummary {
        days_logged: records.len(),
        average_score,
        best,
        worst,
        latest,
        change_from_previous,
    })
}

/// One line per day: `date score bar`, bar scaled to the maximum score.
pub fn render_chart(records: &[DailyHealthRecord]) -> String {
    if records.is_empty() {
        return format!("{EMPTY_HISTORY_MESSAGE}\n");
    }

    let mut output = String::new();
    for record in records {
        let filled = (record.score.min(MAX_SCORE) * CHART_WIDTH / MAX_SCORE) as usize;
        let _ = writeln!(
            output,
            "{} {:>3}/{} {}",
            record.date,
            record.score,
            MAX_SCORE,
            "#".repeat(filled)
        );
    }
    output
}

pub fn render_history(records: &[DailyHealthRecord]) -> String {
    let Some(summary) = summarize(records) else {
        return format!("{EMPTY_HISTORY_MESSAGE}\n");
    };

    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} days logged, average score {:.1}/{}",
        summary.days_logged, summary.average_score, MAX_SCORE
    );
    let _ = writeln!(
        output,
        "Best {} ({}), worst {} ({}), latest {} ({}{})",
        summary.best.date,
        summary.best.score,
        summary.worst.date,
        summary.worst.score,
        summary.latest.date,
        summary.latest.score,
        change_label(summary.change_from_previous)
    );
    let _ = writeln!(output);
    output.push_str(&render_chart(records));
    output
}

pub fn build_report(records: &[DailyHealthRecord]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Health Score Report");
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");

    let Some(summary) = summarize(records) else {
        let _ = writeln!(output, "{EMPTY_HISTORY_MESSAGE}");
        return output;
    };

    let _ = writeln!(output, "- Days logged: {}", summary.days_logged);
    let _ = writeln!(
        output,
        "- Average score: {:.1}/{}",
        summary.average_score, MAX_SCORE
    );
    let _ = writeln!(
        output,
        "- Best day: {} ({})",
        summary.best.date, summary.best.score
    );
    let _ = writeln!(
        output,
        "- Lowest day: {} ({})",
        summary.worst.date, summary.worst.score
    );
    let _ = writeln!(
        output,
        "- Latest: {} ({}{})",
        summary.latest.date,
        summary.latest.score,
        change_label(summary.change_from_previous)
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Score Trend");
    let _ = writeln!(output, "```");
    output.push_str(&render_chart(records));
    let _ = writeln!(output, "```");

    let _ = writeln!(output);
    let _ = writeln!(output, "## Daily Log");
    let _ = writeln!(output, "| Date | Steps | Active (min) | Distance (km) | Score |");
    let _ = writeln!(output, "| --- | ---: | ---: | ---: | ---: |");
    for record in records {
        let _ = writeln!(
            output,
            "| {} | {} | {} | {:.1} | {} |",
            record.date, record.steps, record.active_minutes, record.distance, record.score
        );
    }

    output
}

fn change_label(change: Option<i64>) -> String {
    match change {
        Some(delta) => format!(", {delta:+} vs previous"),
        None => String::new(),
    }
}
