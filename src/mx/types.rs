use std::fmt;

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct MxRecord {
    pub preference: u16,
    pub exchange: String,
}

impl MxRecord {
    pub fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }
}

#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MxStatus {
    Records(Vec<MxRecord>),
    NoRecords,
}

/// Classification of a single address lookup.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Liveness {
    Alive,
    Dead,
    /// The local host ran out of sockets / descriptors; says nothing about the domain.
    ResourceExhausted,
}

impl fmt::Display for Liveness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Alive => f.write_str("alive"),
            Self::Dead => f.write_str("dead"),
            Self::ResourceExhausted => f.write_str("resource exhausted"),
        }
    }
}

/// What a resolver task hands to the aggregator: the address it owned plus
/// its final classification.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub address: String,
    pub liveness: Liveness,
    pub mx_records: Vec<MxRecord>,
    /// Lookups performed for this address, retries included.
    pub attempts: u32,
}

impl Outcome {
    pub fn alive(address: impl Into<String>, mx_records: Vec<MxRecord>) -> Self {
        Self::new(address, Liveness::Alive, mx_records)
    }

    pub fn dead(address: impl Into<String>) -> Self {
        Self::new(address, Liveness::Dead, Vec::new())
    }

    pub fn exhausted(address: impl Into<String>) -> Self {
        Self::new(address, Liveness::ResourceExhausted, Vec::new())
    }

    fn new(address: impl Into<String>, liveness: Liveness, mx_records: Vec<MxRecord>) -> Self {
        Self {
            address: address.into(),
            liveness,
            mx_records,
            attempts: 1,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.liveness == Liveness::Alive
    }
}
