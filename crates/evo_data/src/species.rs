use serde::{Deserialize, Serialize};

/// Species tag. Per-species differences are data, not code: one decision
/// rule and one tick executor serve both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    Deer,
    Wolf,
}

impl Species {
    pub fn id_prefix(self) -> &'static str {
        match self {
            Species::Deer => "deer",
            Species::Wolf => "wolf",
        }
    }

    pub fn diet(self) -> DietFlags {
        match self {
            Species::Deer => DietFlags {
                can_eat_vegetation: true,
                can_eat_animals: false,
                can_eat_corpses: false,
            },
            Species::Wolf => DietFlags {
                can_eat_vegetation: false,
                can_eat_animals: true,
                can_eat_corpses: true,
            },
        }
    }
}

/// Species-level diet capability. Not evolvable, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DietFlags {
    pub can_eat_vegetation: bool,
    pub can_eat_animals: bool,
    pub can_eat_corpses: bool,
}
