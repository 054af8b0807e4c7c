use serde::{Deserialize, Serialize};

use super::reference::ReferenceCategory;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Unspecified,
}

impl Gender {
    /// Lenient parse: anything other than male/female is treated as unspecified.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "male" | "m" => Gender::Male,
            "female" | "f" => Gender::Female,
            _ => Gender::Unspecified,
        }
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Gender::parse).unwrap_or_default())
    }
}

/// Health conditions that override the age/gender reference tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecialCondition {
    Hypertension,
    Obesity,
    Diabetes,
    Pregnant,
}

impl SpecialCondition {
    /// Resolution order when a profile lists several conditions.
    pub const PRIORITY: [SpecialCondition; 4] = [
        SpecialCondition::Hypertension,
        SpecialCondition::Obesity,
        SpecialCondition::Diabetes,
        SpecialCondition::Pregnant,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "hypertension" | "high bp" => Some(SpecialCondition::Hypertension),
            "obesity" => Some(SpecialCondition::Obesity),
            "diabetes" => Some(SpecialCondition::Diabetes),
            "pregnant" | "pregnancy" => Some(SpecialCondition::Pregnant),
            _ => None,
        }
    }

    pub fn category(self) -> ReferenceCategory {
        match self {
            SpecialCondition::Hypertension => ReferenceCategory::Hypertension,
            SpecialCondition::Obesity => ReferenceCategory::Obesity,
            SpecialCondition::Diabetes => ReferenceCategory::Diabetes,
            SpecialCondition::Pregnant => ReferenceCategory::Pregnant,
        }
    }
}

/// Demographic and health snapshot used to personalize a rating.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConsumerProfile {
    #[serde(default)]
    pub age: u32,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default, alias = "specialNeeds")]
    pub special_conditions: Vec<String>,
}

impl ConsumerProfile {
    pub fn new(age: u32, gender: Gender) -> Self {
        Self {
            age,
            gender,
            special_conditions: Vec::new(),
        }
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.special_conditions.push(condition.into());
        self
    }

    fn has_condition(&self, condition: SpecialCondition) -> bool {
        self.special_conditions
            .iter()
            .any(|raw| SpecialCondition::parse(raw) == Some(condition))
    }
}

/// Map a profile to the reference table its RDA targets come from.
///
/// Conditions win over gender, in `SpecialCondition::PRIORITY` order. Age is carried
/// on the profile but adults of every age share one table per gender, and the child
/// tables are only reachable through an explicit category override.
pub fn classify(profile: &ConsumerProfile) -> ReferenceCategory {
    if let Some(condition) = SpecialCondition::PRIORITY
        .into_iter()
        .find(|condition| profile.has_condition(*condition))
    {
        return condition.category();
    }

    match profile.gender {
        Gender::Female => ReferenceCategory::AdultFemale,
        Gender::Male | Gender::Unspecified => ReferenceCategory::AdultMale,
    }
}
