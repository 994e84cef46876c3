use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TrafficClass {
    Normal,
    Compromised,
    Malicious,
}

impl TrafficClass {
    pub const ALL: [Self; 3] = [Self::Normal, Self::Compromised, Self::Malicious];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// What a simulated compromised host is doing.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Behavior {
    CredentialTheft,
    DataExfiltration,
    LateralMovement,
    Persistence,
    #[strum(serialize = "c2_beacon")]
    #[serde(rename = "c2_beacon")]
    C2Beacon,
}

impl Behavior {
    pub const ALL: [Self; 5] = [
        Self::CredentialTheft,
        Self::DataExfiltration,
        Self::LateralMovement,
        Self::Persistence,
        Self::C2Beacon,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
    strum::IntoStaticStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttackKind {
    SqlInjection,
    Xss,
    PathTraversal,
    CommandInjection,
}

impl AttackKind {
    pub const ALL: [Self; 4] = [
        Self::SqlInjection,
        Self::Xss,
        Self::PathTraversal,
        Self::CommandInjection,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Normal,
    Compromised(Behavior),
    Malicious(AttackKind),
}

/// The subset of a run configuration that drives classification.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassPolicy {
    pub compromise_probability: f64,
    pub malicious_probability: f64,
    pub enable_compromise: bool,
    pub enable_malicious: bool,
}

impl Classification {
    /// Map two uniform draws in `[0, 1)` to a classification.
    ///
    /// The unit interval is split into fixed bands: malicious `[0, m)`, compromised
    /// `[m, m + c)`, normal for the rest. A disabled class keeps its band but the band
    /// yields `Normal`.
    pub fn from_draw(r: f64, subtype_draw: f64, policy: &ClassPolicy) -> Self {
        let malicious_upper = policy.malicious_probability;
        let compromise_upper = policy.malicious_probability + policy.compromise_probability;

        if r < malicious_upper {
            if policy.enable_malicious {
                return Self::Malicious(pick(&AttackKind::ALL, subtype_draw));
            }
            return Self::Normal;
        }

        if r < compromise_upper && policy.enable_compromise {
            return Self::Compromised(pick(&Behavior::ALL, subtype_draw));
        }

        Self::Normal
    }

    pub fn class(&self) -> TrafficClass {
        match self {
            Self::Normal => TrafficClass::Normal,
            Self::Compromised(_) => TrafficClass::Compromised,
            Self::Malicious(_) => TrafficClass::Malicious,
        }
    }

    pub fn subtype(&self) -> Option<&'static str> {
        match self {
            Self::Normal => None,
            Self::Compromised(b) => Some(b.into()),
            Self::Malicious(a) => Some(a.into()),
        }
    }
}

fn pick<T: Copy>(items: &[T], draw: f64) -> T {
    let idx = (draw * items.len() as f64) as usize;
    items[idx.min(items.len() - 1)]
}

#[derive(Debug, Clone)]
pub struct TrafficClassifier {
    policy: ClassPolicy,
}

impl TrafficClassifier {
    pub fn new(policy: ClassPolicy) -> Self {
        Self { policy }
    }

    pub fn classify<R: Rng + ?Sized>(&self, rng: &mut R) -> Classification {
        let r: f64 = rng.random();
        let subtype_draw: f64 = rng.random();
        Classification::from_draw(r, subtype_draw, &self.policy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(c: f64, m: f64, enable_c: bool, enable_m: bool) -> ClassPolicy {
        ClassPolicy {
            compromise_probability: c,
            malicious_probability: m,
            enable_compromise: enable_c,
            enable_malicious: enable_m,
        }
    }

    #[test]
    fn bands_are_malicious_then_compromised_then_normal() {
        let p = policy(0.10, 0.05, true, true);
        assert_eq!(
            Classification::from_draw(0.0, 0.0, &p),
            Classification::Malicious(AttackKind::SqlInjection)
        );
        assert_eq!(
            Classification::from_draw(0.049, 0.99, &p),
            Classification::Malicious(AttackKind::CommandInjection)
        );
        assert_eq!(
            Classification::from_draw(0.05, 0.0, &p),
            Classification::Compromised(Behavior::CredentialTheft)
        );
        assert_eq!(
            Classification::from_draw(0.149, 0.999, &p),
            Classification::Compromised(Behavior::C2Beacon)
        );
        assert_eq!(Classification::from_draw(0.15, 0.0, &p), Classification::Normal);
    }

    #[test]
    fn disabled_malicious_band_becomes_normal() {
        let p = policy(0.10, 0.05, true, false);
        assert_eq!(Classification::from_draw(0.01, 0.5, &p), Classification::Normal);
        assert_eq!(
            Classification::from_draw(0.06, 0.5, &p).class(),
            TrafficClass::Compromised
        );
    }

    #[test]
    fn disabled_compromise_band_becomes_normal() {
        let p = policy(0.10, 0.05, false, true);
        assert_eq!(Classification::from_draw(0.10, 0.5, &p), Classification::Normal);
        assert_eq!(
            Classification::from_draw(0.01, 0.5, &p).class(),
            TrafficClass::Malicious
        );
    }

    #[test]
    fn subtype_draw_of_one_stays_in_range() {
        let p = policy(0.5, 0.5, true, true);
        assert_eq!(
            Classification::from_draw(0.9, 1.0, &p),
            Classification::Compromised(Behavior::C2Beacon)
        );
    }

    #[test]
    fn names_are_snake_case() {
        assert_eq!(Behavior::C2Beacon.to_string(), "c2_beacon");
        assert_eq!(AttackKind::SqlInjection.to_string(), "sql_injection");
        assert_eq!(TrafficClass::Compromised.as_ref(), "compromised");
        assert_eq!("path_traversal".parse::<AttackKind>().ok(), Some(AttackKind::PathTraversal));
        assert_eq!(Classification::Normal.subtype(), None);
    }
}
