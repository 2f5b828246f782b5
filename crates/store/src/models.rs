use serde::{
    Deserialize, Serialize,
    ser::{SerializeMap, Serializer},
};

/// Throughput bucket as exposed to readers, and the payload quarantined when a
/// bucket write fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesPerSecond {
    pub messages_per_second: u64,
}

/// One row of a top-N ranking. Serializes as a single-key object, e.g. `{"rgb": 3}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedEntry {
    pub member: String,
    pub count: u64,
}

impl RankedEntry {
    pub fn new(member: impl Into<String>, count: u64) -> Self {
        Self {
            member: member.into(),
            count,
        }
    }
}

impl Serialize for RankedEntry {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.member, &self.count)?;
        map.end()
    }
}
