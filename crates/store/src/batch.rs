use crate::StorageError;

/// A single store command. Keys are namespace-relative; the store applies its
/// own prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    ZIncrBy {
        key: String,
        member: String,
        delta: i64,
    },
    HSet {
        key: String,
        field: String,
        value: String,
    },
    Expire {
        key: String,
        seconds: i64,
    },
    SAdd {
        key: String,
        member: String,
    },
}

impl Command {
    pub fn key(&self) -> &str {
        match self {
            Command::ZIncrBy { key, .. }
            | Command::HSet { key, .. }
            | Command::Expire { key, .. }
            | Command::SAdd { key, .. } => key,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::ZIncrBy { .. } => "ZINCRBY",
            Command::HSet { .. } => "HSET",
            Command::Expire { .. } => "EXPIRE",
            Command::SAdd { .. } => "SADD",
        }
    }
}

/// Ordered commands submitted together in one round trip.
///
/// A batch is not a transaction: every command reports its own outcome and a
/// failing command does not roll back the others.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    commands: Vec<Command>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zincrby(&mut self, key: &str, member: &str, delta: i64) -> &mut Self {
        self.commands.push(Command::ZIncrBy {
            key: key.to_string(),
            member: member.to_string(),
            delta,
        });
        self
    }

    pub fn hset(&mut self, key: &str, field: &str, value: impl Into<String>) -> &mut Self {
        self.commands.push(Command::HSet {
            key: key.to_string(),
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn expire(&mut self, key: &str, seconds: i64) -> &mut Self {
        self.commands.push(Command::Expire {
            key: key.to_string(),
            seconds,
        });
        self
    }

    pub fn sadd(&mut self, key: &str, member: &str) -> &mut Self {
        self.commands.push(Command::SAdd {
            key: key.to_string(),
            member: member.to_string(),
        });
        self
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }
}

impl IntoIterator for Batch {
    type Item = Command;
    type IntoIter = std::vec::IntoIter<Command>;

    fn into_iter(self) -> Self::IntoIter {
        self.commands.into_iter()
    }
}

/// Per-command outcomes of an executed batch, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    outcomes: Vec<Result<(), String>>,
}

impl BatchReport {
    pub fn new(outcomes: Vec<Result<(), String>>) -> Self {
        Self { outcomes }
    }

    pub fn errors(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err().map(String::as_str))
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(Result::is_ok)
    }

    /// Collapse the report into a single result carrying every sub-error.
    pub fn into_result(self) -> Result<(), StorageError> {
        if self.is_success() {
            return Ok(());
        }
        let errors = self.errors().into_iter().map(str::to_string).collect();
        Err(StorageError::Partial { errors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_keeps_submission_order() {
        let mut batch = Batch::new();
        batch
            .hset("messagesPerSecond:1", "messagesPerSecond", "4")
            .expire("messagesPerSecond:1", 5);

        let names: Vec<_> = batch.commands().iter().map(Command::name).collect();
        assert_eq!(names, vec!["HSET", "EXPIRE"]);
        assert!(batch.commands().iter().all(|c| c.key() == "messagesPerSecond:1"));
    }

    #[test]
    fn report_joins_all_sub_errors() {
        let report = BatchReport::new(vec![
            Ok(()),
            Err("WRONGTYPE first".to_string()),
            Ok(()),
            Err("OOM second".to_string()),
        ]);

        assert!(!report.is_success());
        assert_eq!(report.errors(), vec!["WRONGTYPE first", "OOM second"]);

        let err = report.into_result().unwrap_err();
        assert_eq!(err.to_string(), "WRONGTYPE first\nOOM second");
    }

    #[test]
    fn clean_report_is_ok() {
        let report = BatchReport::new(vec![Ok(()), Ok(())]);
        assert!(report.is_success());
        assert!(report.into_result().is_ok());
    }
}
