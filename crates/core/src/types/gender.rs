//! Shopper gender used by the catalog's men/women navigation.

use serde::{Deserialize, Serialize};

/// Gender a product is listed under.
///
/// Products store gender as free text (`"male"`, `"female"`, `"unisex"`,
/// ...); only the two values the storefront menus filter on get a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Gender behind a `men`/`women` menu label or search key,
    /// case-insensitively.
    #[must_use]
    pub fn from_menu(label: &str) -> Option<Self> {
        let label = label.trim();
        if label.eq_ignore_ascii_case("men") {
            Some(Self::Male)
        } else if label.eq_ignore_ascii_case("women") {
            Some(Self::Female)
        } else {
            None
        }
    }

    /// Value stored on products.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
