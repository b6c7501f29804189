use crate::api::Mode;
use crate::commands::{load_failure_note, open, Out};
use crate::{Config, Result};

/// Lists the distinct vehicles recorded by anyone, numbered from 1. The numbers are what
/// `vcost add --pick` takes.
pub async fn vehicles(config: Config, mode: Mode, user: &str) -> Result<Out<Vec<String>>> {
    let (_store, session) = open(&config, mode, user).await?;
    let known: Vec<String> = session.known_vehicles().into_iter().collect();

    let mut message = if known.is_empty() {
        "No vehicles have been recorded yet".to_string()
    } else {
        known
            .iter()
            .enumerate()
            .map(|(ix, vehicle)| format!("{:>3}. {vehicle}", ix + 1))
            .collect::<Vec<_>>()
            .join("\n")
    };
    message.push_str(load_failure_note(&session));
    Ok(Out::new(message, known))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_vehicles() {
        let env = TestEnv::new().await;
        let out = vehicles(env.config(), Mode::Test, "Ana").await.unwrap();
        assert_eq!(
            out.structure().unwrap(),
            &vec!["Audi A3", "Golf", "Vespa", "Yaris"]
        );
        assert!(out.message().contains("  2. Golf"));
    }
}
