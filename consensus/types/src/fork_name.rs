use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForkName {
    Base,
    Altair,
    Bellatrix,
}

impl ForkName {
    pub fn list_all() -> Vec<ForkName> {
        vec![ForkName::Base, ForkName::Altair, ForkName::Bellatrix]
    }

    /// Returns the fork preceding `self`, or `None` for the genesis fork.
    pub fn previous_fork(self) -> Option<ForkName> {
        match self {
            ForkName::Base => None,
            ForkName::Altair => Some(ForkName::Base),
            ForkName::Bellatrix => Some(ForkName::Altair),
        }
    }

    /// Sync committees exist from Altair onwards.
    pub fn altair_enabled(self) -> bool {
        self >= ForkName::Altair
    }

    /// Execution payloads exist from Bellatrix onwards.
    pub fn bellatrix_enabled(self) -> bool {
        self >= ForkName::Bellatrix
    }
}

impl fmt::Display for ForkName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            ForkName::Base => "phase0".fmt(f),
            ForkName::Altair => "altair".fmt(f),
            ForkName::Bellatrix => "bellatrix".fmt(f),
        }
    }
}
