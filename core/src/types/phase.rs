use std::fmt;

/// Phase-encoding direction of a spin-echo fieldmap acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseDirection {
    /// Anterior to posterior (reversed blip)
    Ap,
    /// Posterior to anterior (same blip as the BOLD runs)
    Pa,
}

impl PhaseDirection {
    /// Returns the BIDS `dir-` entity label
    pub fn label(&self) -> &'static str {
        match self {
            PhaseDirection::Ap => "AP",
            PhaseDirection::Pa => "PA",
        }
    }

    /// Value written to `PhaseEncodingDirection`
    pub fn encoding_direction(&self) -> &'static str {
        match self {
            PhaseDirection::Ap => "j-",
            PhaseDirection::Pa => "j",
        }
    }

    /// Value written to `PhaseEncodingPolarityGE`
    pub fn polarity(&self) -> &'static str {
        match self {
            PhaseDirection::Ap => "1-flipped",
            PhaseDirection::Pa => "0-normal",
        }
    }
}

impl fmt::Display for PhaseDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Both directions written for every fieldmap, in write order
pub const FIELDMAP_DIRECTIONS: [PhaseDirection; 2] = [PhaseDirection::Ap, PhaseDirection::Pa];

/// Direction the functional BOLD runs are acquired with
pub const BOLD_DIRECTION: PhaseDirection = PhaseDirection::Pa;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_table() {
        assert_eq!(PhaseDirection::Ap.encoding_direction(), "j-");
        assert_eq!(PhaseDirection::Ap.polarity(), "1-flipped");
        assert_eq!(PhaseDirection::Pa.encoding_direction(), "j");
        assert_eq!(PhaseDirection::Pa.polarity(), "0-normal");
    }

    #[test]
    fn test_directions_differ() {
        let [a, b] = FIELDMAP_DIRECTIONS;
        assert_ne!(a.encoding_direction(), b.encoding_direction());
        assert_ne!(a.polarity(), b.polarity());
        assert_eq!(BOLD_DIRECTION.label(), "PA");
    }
}
