/// ID types for catalog entities
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Create an ID from the server's numeric identifier
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Get the raw numeric value
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Album identifier as assigned by the server
    AlbumId
);

numeric_id!(
    /// Song identifier as assigned by the server
    SongId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_whitespace() {
        assert_eq!(" 17 ".parse::<AlbumId>().unwrap(), AlbumId::new(17));
        assert!("abc".parse::<SongId>().is_err());
    }

    #[test]
    fn ids_order_numerically() {
        let mut ids = vec![AlbumId::new(10), AlbumId::new(2), AlbumId::new(33)];
        ids.sort();
        assert_eq!(ids, vec![AlbumId::new(2), AlbumId::new(10), AlbumId::new(33)]);
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&SongId::new(5)).unwrap();
        assert_eq!(json, "5");
    }
}
