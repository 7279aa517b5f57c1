use std::fmt;

use serde::{Deserialize, Serialize};

/// skill tier derived from the z-score of a lap time. ordered from best to worst.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Tier {
    #[serde(rename = "S+")]
    SPlus,
    S,
    A,
    B,
    C,
    D,
}

impl Tier {
    pub const ALL: [Tier; 6] = [Tier::SPlus, Tier::S, Tier::A, Tier::B, Tier::C, Tier::D];

    /// # assign tier
    /// map a z-score onto a tier. a lower z-score is a faster time.
    /// every boundary belongs to the tier above it, so -1.5 is `S` and not `S+`.
    ///
    /// ## Arguments
    /// * `z_score` - the z-score of the lap time within its track
    ///
    /// ## Returns
    /// * `Tier` - the tier of the lap time
    pub fn from_z_score(z_score: f64) -> Tier {
        if z_score < -1.5 {
            Tier::SPlus
        } else if z_score < -1.0 {
            Tier::S
        } else if z_score < -0.5 {
            Tier::A
        } else if z_score < 0.0 {
            Tier::B
        } else if z_score < 0.5 {
            Tier::C
        } else {
            Tier::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::SPlus => "S+",
            Tier::S => "S",
            Tier::A => "A",
            Tier::B => "B",
            Tier::C => "C",
            Tier::D => "D",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::SPlus => "Alien",
            Tier::S => "Elite",
            Tier::A => "Pro",
            Tier::B => "Above Average",
            Tier::C => "Average",
            Tier::D => "Rookie",
        }
    }

    /// badge colour used by the dashboard
    pub fn color(&self) -> &'static str {
        match self {
            Tier::SPlus => "#a855f7",
            Tier::S => "#fbbf24",
            Tier::A => "#10b981",
            Tier::B => "#3b82f6",
            Tier::C => "#6b7280",
            Tier::D => "#ef4444",
        }
    }

    pub fn from_str_opt(tier: &str) -> Option<Tier> {
        Tier::ALL.into_iter().find(|e| e.as_str() == tier)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_resolve_to_upper_tier() {
        assert_eq!(Tier::from_z_score(-1.5), Tier::S);
        assert_eq!(Tier::from_z_score(-1.5 + f64::EPSILON), Tier::S);
        assert_eq!(Tier::from_z_score(-1.5 - 1e-9), Tier::SPlus);
        assert_eq!(Tier::from_z_score(-1.0), Tier::A);
        assert_eq!(Tier::from_z_score(-0.5), Tier::B);
        assert_eq!(Tier::from_z_score(0.0), Tier::C);
        assert_eq!(Tier::from_z_score(0.5), Tier::D);
    }

    #[test]
    fn maps_z_scores() {
        assert_eq!(Tier::from_z_score(-1.6), Tier::SPlus);
        assert_eq!(Tier::from_z_score(-0.7), Tier::A);
        assert_eq!(Tier::from_z_score(-0.2), Tier::B);
        assert_eq!(Tier::from_z_score(0.3), Tier::C);
        assert_eq!(Tier::from_z_score(0.6), Tier::D);
    }

    #[test]
    fn tiers_are_ordered_best_first() {
        assert!(Tier::SPlus < Tier::S);
        assert!(Tier::S < Tier::A);
        assert!(Tier::C < Tier::D);
        let mut shuffled = vec![Tier::D, Tier::A, Tier::SPlus, Tier::C, Tier::S, Tier::B];
        shuffled.sort();
        assert_eq!(shuffled, Tier::ALL.to_vec());
    }

    #[test]
    fn serializes_as_label() {
        assert_eq!(serde_json::to_string(&Tier::SPlus).unwrap(), "\"S+\"");
        assert_eq!(serde_json::from_str::<Tier>("\"B\"").unwrap(), Tier::B);
        assert_eq!(Tier::from_str_opt("S+"), Some(Tier::SPlus));
        assert_eq!(Tier::from_str_opt("E"), None);
        assert_eq!(Tier::SPlus.to_string(), "S+");
        assert_eq!(Tier::A.color(), "#10b981");
    }
}
