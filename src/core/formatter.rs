use rust_decimal::{Decimal, RoundingStrategy};

use crate::core::models::workload::UsageSchedule;

/// Returns "$1,037.44". Rounds half away from zero to cents; display only.
pub fn format_money(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let text = format!("{:.2}", rounded.abs());
    let (whole, cents) = text.split_once('.').unwrap_or((text.as_str(), "00"));
    format!("{}${}.{}", sign, group_thousands(whole), cents)
}

/// Returns "$0.148/h". Rates keep their catalog precision.
pub fn format_rate(rate: Decimal) -> String {
    format!("${}/h", rate.normalize())
}

/// Returns "160" or "7.5", trailing zeros stripped, with thousands grouped.
pub fn format_hours(hours: Decimal) -> String {
    let text = hours.normalize().to_string();
    match text.split_once('.') {
        Some((whole, frac)) => format!("{}.{}", group_thousands(whole), frac),
        None => group_thousands(&text),
    }
}

/// Returns "160h (8h/day × 20 days)".
pub fn format_schedule(schedule: &UsageSchedule) -> String {
    let days = schedule.days_per_month();
    format!(
        "{}h ({}h/day × {} day{})",
        format_hours(schedule.monthly_hours()),
        format_hours(schedule.hours_per_day()),
        days,
        if days == 1 { "" } else { "s" }
    )
}

/// Returns "8.3%" of `total`, or "-" when the total is zero.
pub fn format_share(part: Decimal, total: Decimal) -> String {
    if total.is_zero() {
        return "-".to_string();
    }
    let percent = (part / total * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1}%", percent)
}

fn group_thousands(digits: &str) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}{}", sign, grouped)
}
