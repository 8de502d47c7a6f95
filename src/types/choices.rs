use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Declares a closed set of lowercase string choices with parsing and display.
macro_rules! choices {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }

            /// Comma separated list of accepted values, for error messages.
            #[must_use]
            pub fn expected() -> String {
                Self::ALL
                    .iter()
                    .map(|c| c.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let lowered = s.trim().to_ascii_lowercase();
                match lowered.as_str() {
                    $($value => Ok($name::$variant),)+
                    _ => Err(format!(
                        "\"{s}\" is not a valid choice, expected one of: {}",
                        Self::expected()
                    )),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

choices! {
    /// Rank of a traditional leader.
    ChiefType {
        Paramount => "paramount",
        Subchief => "subchief",
        Divisional => "divisional",
    }
}

choices! {
    SiteType {
        Cultural => "cultural",
        Natural => "natural",
    }
}

choices! {
    EventType {
        Traditional => "traditional",
        Festive => "festive",
        Ritual => "ritual",
    }
}

choices! {
    /// Kind of document held by a publisher record.
    DocumentType {
        Article => "article",
        Book => "book",
        Journal => "journal",
        Report => "report",
        Thesis => "thesis",
        Other => "other",
    }
}
