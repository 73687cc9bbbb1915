//! Strongly-typed identifiers (avoid mixing UUIDs between entities).
//!
//! Every id wraps a UUID v7 so ids are unique, never reused, and sort by
//! creation time.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! typed_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh time-ordered id.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(
    /// Chit fund group identifier.
    GroupId
);

typed_id!(
    /// Member identifier, unique within its group.
    MemberId
);

typed_id!(
    /// Payment record identifier.
    PaymentId
);

typed_id!(
    /// Lottery draw identifier.
    DrawId
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_group_id_debug() {
        let uuid = Uuid::new_v4();
        let group_id = GroupId(uuid);
        assert!(format!("{:?}", group_id).contains(&uuid.to_string()));
    }

    #[test]
    fn test_fresh_ids_are_distinct() {
        let ids: HashSet<MemberId> = (0..1000).map(|_| MemberId::new()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_display_and_parse() {
        let id = PaymentId::new();
        let parsed: PaymentId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
        assert!("not-a-uuid".parse::<DrawId>().is_err());
    }

    #[test]
    fn test_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&GroupId(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}
