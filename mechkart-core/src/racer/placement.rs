use ordinal::Ordinal;
use serde::{Deserialize, Serialize};

use super::lap_info::Placement;

/// Human-readable placement, e.g. `1st`, `22nd`, `113th`.
pub fn placement_label(placement: Placement) -> String {
    Ordinal(placement).to_string()
}

/// Just the suffix part of [`placement_label`].
pub fn placement_suffix(placement: Placement) -> &'static str {
    Ordinal(placement).suffix()
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trophy {
    Gold,
    Silver,
    Bronze,
    None,
}

impl Trophy {
    /// Trophy earned by finishing a series at the given overall (shared) rank.
    pub fn for_rank(rank: Placement) -> Trophy {
        match rank {
            1 => Trophy::Gold,
            2 => Trophy::Silver,
            3 => Trophy::Bronze,
            _ => Trophy::None,
        }
    }
}
