use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Quiz categories. The serialized id is the persisted form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Topic {
    Cografiya,
    Tarix,
    Incesenet,
    Din,
    Fantastik,
    Film,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown topic: {0}")]
pub struct UnknownTopic(pub String);

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::Cografiya,
        Topic::Tarix,
        Topic::Incesenet,
        Topic::Din,
        Topic::Fantastik,
        Topic::Film,
    ];

    #[must_use]
    pub fn id(self) -> &'static str {
        match self {
            Topic::Cografiya => "COGRAFIYA",
            Topic::Tarix => "TARIX",
            Topic::Incesenet => "INCESENET",
            Topic::Din => "DIN",
            Topic::Fantastik => "FANTASTIK",
            Topic::Film => "FILM",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Topic::Cografiya => "Coğrafiya",
            Topic::Tarix => "Tarix",
            Topic::Incesenet => "İncəsənət",
            Topic::Din => "Din",
            Topic::Fantastik => "Fantastik",
            Topic::Film => "Film",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Topic::Cografiya => "Dünya ölkələri, paytaxtlar və təbiət",
            Topic::Tarix => "Azərbaycan və Dünya tarixi, hadisələr",
            Topic::Incesenet => "Rəsm, Musiqi, Ədəbiyyat və Memarlıq",
            Topic::Din => "İslam tarixi, Peyğəmbərlər və inanclar",
            Topic::Fantastik => "Elmi-fantastika, kosmos və gələcək",
            Topic::Film => "Kino, aktyorlar və məşhur sitatlar",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Topic {
    type Err = UnknownTopic;

    /// Accepts the persisted id in any letter case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Topic::ALL
            .into_iter()
            .find(|topic| topic.id() == wanted)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}
