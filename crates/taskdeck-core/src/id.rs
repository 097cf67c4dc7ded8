use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use uuid::Uuid;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
        pub struct $name(pub Uuid);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s.trim())?))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, s: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                s.serialize_str(&self.to_string())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(d: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                let s = String::deserialize(d)?;
                legacy_uuid(&s).map(Self).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Namespace for ids saved before they were UUIDs (e.g. millisecond stamps).
const LEGACY_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_8b3d_4c71_9e05_d2a7_b6f4_3c18);

/// Parse a stored id. Non-UUID strings map to a stable v5 UUID so older
/// data keeps its identities across loads.
fn legacy_uuid(raw: &str) -> Result<Uuid, &'static str> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err("empty identifier");
    }
    Ok(Uuid::parse_str(raw).unwrap_or_else(|_| Uuid::new_v5(&LEGACY_NAMESPACE, raw.as_bytes())))
}

uuid_id!(
    /// Identifier of a task.
    TaskId
);

uuid_id!(
    /// Identifier of a subtask, unique within its parent task.
    SubtaskId
);

/// Source of fresh identifiers for tasks and subtasks.
pub trait IdGenerator {
    /// Produce an identifier for a new task.
    fn next_task_id(&mut self) -> TaskId;

    /// Produce an identifier for a new subtask.
    fn next_subtask_id(&mut self) -> SubtaskId;
}

/// Default generator backed by UUID v7.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn next_task_id(&mut self) -> TaskId {
        TaskId(Uuid::now_v7())
    }

    fn next_subtask_id(&mut self) -> SubtaskId {
        SubtaskId(Uuid::now_v7())
    }
}

/// Deterministic generator handing out `1, 2, 3, ...` encoded as UUIDs.
///
/// Task and subtask identifiers share one counter, so no value is ever
/// handed out twice by the same generator.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdGenerator {
    next: u128,
}

impl SequentialIdGenerator {
    /// Start counting after `last`.
    #[must_use]
    pub const fn starting_after(last: u128) -> Self {
        Self { next: last }
    }

    const fn bump(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_task_id(&mut self) -> TaskId {
        TaskId(self.bump())
    }

    fn next_subtask_id(&mut self) -> SubtaskId {
        SubtaskId(self.bump())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_generator_uses_v7() {
        let mut ids = UuidGenerator;
        assert_eq!(ids.next_task_id().0.get_version_num(), 7);
        assert_eq!(ids.next_subtask_id().0.get_version_num(), 7);
    }

    #[test]
    fn uuid_generator_never_repeats() {
        let mut ids = UuidGenerator;
        let a = ids.next_task_id();
        let b = ids.next_task_id();
        assert_ne!(a, b);
    }

    #[test]
    fn sequential_generator_counts_up() {
        let mut ids = SequentialIdGenerator::default();
        assert_eq!(ids.next_task_id().0, Uuid::from_u128(1));
        assert_eq!(ids.next_subtask_id().0, Uuid::from_u128(2));
        assert_eq!(ids.next_task_id().0, Uuid::from_u128(3));

        let mut resumed = SequentialIdGenerator::starting_after(10);
        assert_eq!(resumed.next_task_id().0, Uuid::from_u128(11));
    }

    #[test]
    fn task_id_parses_and_serializes_as_string() {
        let uuid = Uuid::now_v7();
        let parsed: TaskId = format!(" {uuid} ")
            .parse()
            .unwrap_or_else(|err| panic!("must parse task id: {err}"));
        assert_eq!(parsed.0, uuid);

        let json = serde_json::to_string(&parsed).unwrap_or_else(|err| panic!("serialize: {err}"));
        assert_eq!(json, format!("\"{uuid}\""));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert!("not-a-uuid".parse::<SubtaskId>().is_err());
    }

    #[test]
    fn stored_non_uuid_ids_map_to_stable_uuids() {
        let decode = |json: &str| -> SubtaskId {
            serde_json::from_str(json).unwrap_or_else(|err| panic!("decode: {err}"))
        };
        let first = decode("\"1717171717171\"");
        assert_eq!(first, decode("\"1717171717171\""));
        assert_eq!(first.0.get_version_num(), 5);
        assert_ne!(first, decode("\"1717171717172\""));

        let reencoded = serde_json::to_string(&first).unwrap_or_else(|err| panic!("encode: {err}"));
        assert_eq!(decode(&reencoded), first);
        assert!(serde_json::from_str::<TaskId>("\"  \"").is_err());
    }
}
