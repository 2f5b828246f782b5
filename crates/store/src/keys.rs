//! Key layout shared with every reader of the aggregates. Changing any of these
//! breaks compatibility with deployed consumers.

pub const ROOMS_KEY: &str = "rooms";
pub const NICKS_KEY: &str = "nicks";
pub const WORDS_KEY: &str = "words";
pub const FAILED_MESSAGES_KEY: &str = "failedMessages";

pub const MESSAGES_PER_SECOND_KEY_PREFIX: &str = "messagesPerSecond";
pub const MESSAGES_PER_SECOND_FIELD: &str = "messagesPerSecond";

/// Per-second buckets disappear on their own after this many seconds.
pub const BUCKET_TTL_SECONDS: i64 = 5;

pub const DEFAULT_NAMESPACE: &str = "chat-stats:";

pub fn messages_per_second_key(seconds: i64) -> String {
    format!("{MESSAGES_PER_SECOND_KEY_PREFIX}:{seconds}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_key_embeds_epoch_seconds() {
        assert_eq!(
            messages_per_second_key(1_700_000_000),
            "messagesPerSecond:1700000000"
        );
    }
}
