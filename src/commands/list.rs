use crate::api::Mode;
use crate::commands::{load_failure_note, no_records_message, open, Out};
use crate::model::Record;
use crate::view;
use crate::{Config, Result};

/// Lists the records of `user`, newest first.
pub async fn list(config: Config, mode: Mode, user: &str) -> Result<Out<Vec<Record>>> {
    let (_store, session) = open(&config, mode, user).await?;
    let rows: Vec<Record> = view::sorted_for_display(&session.filtered())
        .into_iter()
        .cloned()
        .collect();

    let mut message = if rows.is_empty() {
        no_records_message(&session)
    } else {
        let mut lines = vec![format!("{} record(s) for '{user}':", rows.len())];
        lines.extend(rows.iter().map(format_row));
        lines.join("\n")
    };
    message.push_str(load_failure_note(&session));
    Ok(Out::new(message, rows))
}

fn format_row(record: &Record) -> String {
    let line = format!(
        "{}  {:<16} {:<18} {:>14}",
        record.date(),
        record.vehicle(),
        record.category().to_string(),
        record.amount().chf()
    );
    if record.note().is_empty() {
        line
    } else {
        format!("{line}  {}", record.note())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TestSheetState;
    use crate::config::DEFAULT_WORKSHEET;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_list_newest_first() {
        let env = TestEnv::new().await;
        let out = list(env.config(), Mode::Test, "Gast").await.unwrap();
        let rows = out.structure().unwrap();
        assert_eq!(rows.len(), 5);
        assert!(rows.windows(2).all(|w| w[0].date() >= w[1].date()));
        assert_eq!(rows[0].note(), "Geschwindigkeit");
        assert!(out.message().starts_with("5 record(s) for 'Gast'"));
    }

    #[tokio::test]
    async fn test_list_unknown_user() {
        let env = TestEnv::new().await;
        let out = list(env.config(), Mode::Test, "Nobody").await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "There are no records for 'Nobody'");
    }

    #[tokio::test]
    async fn test_list_empty_store() {
        let env = TestEnv::new().await;
        let mut state = TestSheetState::default();
        state
            .worksheets
            .insert(DEFAULT_WORKSHEET.to_string(), Vec::new());
        env.set_state(state);
        let out = list(env.config(), Mode::Test, "Gast").await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert_eq!(out.message(), "There are no records yet");
    }

    #[tokio::test]
    async fn test_list_load_failure_is_not_fatal() {
        let env = TestEnv::new().await;
        env.set_state(TestSheetState::default());
        let out = list(env.config(), Mode::Test, "Gast").await.unwrap();
        assert!(out.structure().unwrap().is_empty());
        assert!(out.message().starts_with("There are no records yet"));
        assert!(out.message().contains("could not be loaded"));
    }
}
