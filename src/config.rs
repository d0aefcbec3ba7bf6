use anyhow::{bail, Result};
use std::collections::HashSet;

pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";
pub const TARGET_USER_IDS_VAR: &str = "TARGET_USER_IDS";
pub const REPLY_MESSAGE_VAR: &str = "REPLY_MESSAGE";

pub const DEFAULT_REPLY_MESSAGE: &str = "Your message has been received.";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub target_user_ids: HashSet<u64>,
    pub reply_message: String,
    /// Raw `TARGET_USER_IDS` segments that were not valid user IDs
    pub rejected_user_ids: Vec<String>,
}

/// Result of parsing a comma-separated user ID list.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TargetUserIds {
    pub accepted: HashSet<u64>,
    pub rejected: Vec<String>,
}

/// Parse `TARGET_USER_IDS`. Empty segments are skipped silently; anything that
/// is not a plain non-negative integer lands in `rejected`.
pub fn parse_target_user_ids(raw: &str) -> TargetUserIds {
    let mut ids = TargetUserIds::default();

    for segment in raw.split(',') {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let parsed = if segment.bytes().all(|b| b.is_ascii_digit()) {
            segment.parse::<u64>().ok()
        } else {
            None
        };

        match parsed {
            Some(id) => {
                ids.accepted.insert(id);
            }
            None => ids.rejected.push(segment.to_string()),
        }
    }

    ids
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the config from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = match lookup(BOT_TOKEN_VAR) {
            Some(token) if !token.trim().is_empty() => token,
            _ => bail!("{} environment variable is not set", BOT_TOKEN_VAR),
        };

        let targets = parse_target_user_ids(&lookup(TARGET_USER_IDS_VAR).unwrap_or_default());

        let reply_message = lookup(REPLY_MESSAGE_VAR)
            .filter(|msg| !msg.is_empty())
            .unwrap_or_else(|| DEFAULT_REPLY_MESSAGE.to_string());

        Ok(Self {
            bot_token,
            target_user_ids: targets.accepted,
            reply_message,
            rejected_user_ids: targets.rejected,
        })
    }

    pub fn is_target(&self, user_id: u64) -> bool {
        self.target_user_ids.contains(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_parse_mixed_list() {
        let ids = parse_target_user_ids(" 12345, 67890,,abc, 67890");
        assert_eq!(ids.accepted, HashSet::from([12345, 67890]));
        assert_eq!(ids.rejected, vec!["abc".to_string()]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_target_user_ids("").accepted.is_empty());
        assert!(parse_target_user_ids(" , ,").accepted.is_empty());
        assert!(parse_target_user_ids(" , ,").rejected.is_empty());
    }

    #[test]
    fn test_parse_rejects_signed_and_fractional() {
        let ids = parse_target_user_ids("+5, -3, 1.5, 7");
        assert_eq!(ids.accepted, HashSet::from([7]));
        assert_eq!(ids.rejected, vec!["+5", "-3", "1.5"]);
    }

    #[test]
    fn test_parse_rejects_overflow() {
        let ids = parse_target_user_ids("99999999999999999999999");
        assert!(ids.accepted.is_empty());
        assert_eq!(ids.rejected.len(), 1);
    }

    #[test]
    fn test_missing_token_is_error() {
        let err = load(&[(TARGET_USER_IDS_VAR, "1")]).unwrap_err();
        assert!(err.to_string().contains(BOT_TOKEN_VAR));
    }

    #[test]
    fn test_blank_token_is_error() {
        assert!(load(&[(BOT_TOKEN_VAR, "  ")]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = load(&[(BOT_TOKEN_VAR, "123:abc")]).unwrap();
        assert_eq!(config.bot_token, "123:abc");
        assert!(config.target_user_ids.is_empty());
        assert_eq!(config.reply_message, DEFAULT_REPLY_MESSAGE);
    }

    #[test]
    fn test_empty_reply_message_falls_back() {
        let config = load(&[(BOT_TOKEN_VAR, "t"), (REPLY_MESSAGE_VAR, "")]).unwrap();
        assert_eq!(config.reply_message, DEFAULT_REPLY_MESSAGE);
    }

    #[test]
    fn test_reply_message_verbatim() {
        let config = load(&[
            (BOT_TOKEN_VAR, "t"),
            (TARGET_USER_IDS_VAR, "42, x"),
            (REPLY_MESSAGE_VAR, "hello"),
        ])
        .unwrap();
        assert_eq!(config.reply_message, "hello");
        assert!(config.is_target(42));
        assert!(!config.is_target(43));
        assert_eq!(config.rejected_user_ids, vec!["x".to_string()]);
    }
}
