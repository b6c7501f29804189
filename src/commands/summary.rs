use crate::api::Mode;
use crate::commands::{load_failure_note, no_records_message, open, Out};
use crate::model::Amount;
use crate::view::Summary;
use crate::{Config, Result};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// The width of the longest vehicle bar.
const BAR_WIDTH: u32 = 30;

/// Shows the total for `user`, the breakdown by category with each category's share, and a bar
/// per vehicle.
pub async fn summary(config: Config, mode: Mode, user: &str) -> Result<Out<Summary>> {
    let (_store, session) = open(&config, mode, user).await?;
    let summary = session.summary();

    let mut message = if summary.is_empty() {
        no_records_message(&session)
    } else {
        render(&summary)
    };
    message.push_str(load_failure_note(&session));
    Ok(Out::new(message, summary))
}

fn render(summary: &Summary) -> String {
    let mut lines = vec![format!(
        "Total for '{}': {}",
        summary.user(),
        summary.total().chf()
    )];

    lines.push(String::new());
    lines.push("By category:".to_string());
    for (category, amount) in summary.by_category() {
        let share = summary
            .shares()
            .get(category)
            .copied()
            .unwrap_or_default();
        lines.push(format!(
            "  {:<18} {:>14} {:>6}%",
            category.to_string(),
            amount.chf(),
            share
        ));
    }

    lines.push(String::new());
    lines.push("By vehicle:".to_string());
    let max = summary
        .by_vehicle()
        .values()
        .max()
        .copied()
        .unwrap_or(Amount::ZERO);
    for (vehicle, amount) in summary.by_vehicle() {
        lines.push(format!(
            "  {:<16} {:>14} {}",
            vehicle,
            amount.chf(),
            "#".repeat(bar_len(*amount, max))
        ));
    }
    lines.join("\n")
}

/// Scales `amount` against `max` to a bar of at most `BAR_WIDTH` characters. Non-zero amounts get
/// at least one character.
fn bar_len(amount: Amount, max: Amount) -> usize {
    if max.is_zero() || amount.is_zero() {
        return 0;
    }
    let scaled = (amount.value() * Decimal::from(BAR_WIDTH) / max.value()).round();
    scaled.to_usize().unwrap_or_default().max(1)
}
