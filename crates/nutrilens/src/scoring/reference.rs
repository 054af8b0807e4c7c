use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::nutrients::Nutrient;

/// Population groups with their own daily allowance targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceCategory {
    AdultMale,
    AdultFemale,
    Pregnant,
    #[serde(rename = "child-10-12")]
    Child10To12,
    #[serde(rename = "child-13-15")]
    Child13To15,
    #[serde(rename = "child-16-18")]
    Child16To18,
    Obesity,
    Diabetes,
    Hypertension,
}

impl ReferenceCategory {
    pub const ALL: [ReferenceCategory; 9] = [
        ReferenceCategory::AdultMale,
        ReferenceCategory::AdultFemale,
        ReferenceCategory::Pregnant,
        ReferenceCategory::Child10To12,
        ReferenceCategory::Child13To15,
        ReferenceCategory::Child16To18,
        ReferenceCategory::Obesity,
        ReferenceCategory::Diabetes,
        ReferenceCategory::Hypertension,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ReferenceCategory::AdultMale => "adult-male",
            ReferenceCategory::AdultFemale => "adult-female",
            ReferenceCategory::Pregnant => "pregnant",
            ReferenceCategory::Child10To12 => "child-10-12",
            ReferenceCategory::Child13To15 => "child-13-15",
            ReferenceCategory::Child16To18 => "child-16-18",
            ReferenceCategory::Obesity => "obesity",
            ReferenceCategory::Diabetes => "diabetes",
            ReferenceCategory::Hypertension => "hypertension",
        }
    }

    pub fn from_name(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        ReferenceCategory::ALL
            .into_iter()
            .find(|category| category.name().eq_ignore_ascii_case(trimmed))
    }

    pub fn table(self) -> &'static ReferenceTable {
        match self {
            ReferenceCategory::AdultMale => &ADULT_MALE,
            ReferenceCategory::AdultFemale => &ADULT_FEMALE,
            ReferenceCategory::Pregnant => &PREGNANT,
            ReferenceCategory::Child10To12 => &CHILD_10_12,
            ReferenceCategory::Child13To15 => &CHILD_13_15,
            ReferenceCategory::Child16To18 => &CHILD_16_18,
            ReferenceCategory::Obesity => &OBESITY,
            ReferenceCategory::Diabetes => &DIABETES,
            ReferenceCategory::Hypertension => &HYPERTENSION,
        }
    }
}

impl fmt::Display for ReferenceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ReferenceCategory {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Self::from_name(raw).ok_or_else(|| {
            let known: Vec<&str> = Self::ALL.iter().map(|category| category.name()).collect();
            format!("unknown reference category '{raw}' (expected one of {})", known.join(", "))
        })
    }
}

/// Daily allowance targets for one population, indexed in vocabulary order.
#[derive(Debug, PartialEq)]
pub struct ReferenceTable {
    targets: [f64; 23],
}

impl ReferenceTable {
    pub fn target(&self, nutrient: Nutrient) -> f64 {
        self.targets[nutrient as usize]
    }
}

// Column order follows `Nutrient::ALL`:
// proteins, fiber, calcium, magnesium, iron, zinc, iodine, thiamine, riboflavin,
// niacin, b6, folate, b12, c, a, d, energy, carbohydrates,
// sugar, total fat, saturated fat, sodium, cholesterol.

static ADULT_MALE: ReferenceTable = ReferenceTable {
    targets: [
        54.0, 40.0, 1000.0, 440.0, 19.0, 17.0, 140.0, 1.8, 2.5, 18.0, 2.4, 300.0, 2.2, 80.0,
        1000.0, 600.0, 2000.0, 130.0, 50.0, 67.0, 22.0, 2000.0, 300.0,
    ],
};

static ADULT_FEMALE: ReferenceTable = ReferenceTable {
    targets: [
        46.0, 30.0, 1000.0, 370.0, 29.0, 13.2, 140.0, 1.7, 2.4, 14.0, 1.9, 220.0, 2.2, 65.0,
        840.0, 600.0, 2000.0, 130.0, 50.0, 67.0, 22.0, 2000.0, 300.0,
    ],
};

static PREGNANT: ReferenceTable = ReferenceTable {
    targets: [
        60.0, 35.0, 1000.0, 440.0, 27.0, 14.5, 220.0, 2.0, 2.7, 16.0, 2.3, 570.0, 2.4, 80.0,
        900.0, 600.0, 2000.0, 130.0, 50.0, 67.0, 22.0, 2000.0, 300.0,
    ],
};

static CHILD_10_12: ReferenceTable = ReferenceTable {
    targets: [
        32.0, 33.0, 850.0, 240.0, 16.0, 8.5, 100.0, 1.5, 2.1, 15.0, 2.0, 220.0, 2.2, 55.0,
        770.0, 600.0, 2000.0, 130.0, 50.0, 67.0, 22.0, 2000.0, 300.0,
    ],
};

static CHILD_13_15: ReferenceTable = ReferenceTable {
    targets: [
        45.0, 43.0, 1000.0, 345.0, 22.0, 14.3, 140.0, 1.9, 2.7, 19.0, 2.6, 285.0, 2.2, 70.0,
        930.0, 600.0, 2000.0, 130.0, 50.0, 67.0, 22.0, 2000.0, 300.0,
    ],
};

static CHILD_16_18: ReferenceTable = ReferenceTable {
    targets: [
        55.0, 50.0, 1050.0, 440.0, 26.0, 17.6, 140.0, 2.2, 3.1, 22.0, 3.0, 340.0, 2.2, 85.0,
        1000.0, 600.0, 2000.0, 130.0, 50.0, 67.0, 22.0, 2000.0, 300.0,
    ],
};

static DIABETES: ReferenceTable = ReferenceTable {
    targets: [
        60.0, 50.0, 1000.0, 500.0, 19.0, 17.0, 140.0, 2.0, 2.5, 18.0, 2.5, 400.0, 2.5, 90.0,
        900.0, 800.0, 2000.0, 130.0, 25.0, 70.0, 22.0, 1500.0, 200.0,
    ],
};

static OBESITY: ReferenceTable = ReferenceTable {
    targets: [
        70.0, 40.0, 1000.0, 400.0, 18.0, 15.0, 150.0, 1.5, 1.5, 16.0, 2.0, 400.0, 2.4, 90.0,
        800.0, 800.0, 1800.0, 130.0, 20.0, 60.0, 15.0, 2000.0, 200.0,
    ],
};

static HYPERTENSION: ReferenceTable = ReferenceTable {
    targets: [
        70.0, 35.0, 1200.0, 450.0, 18.0, 15.0, 150.0, 1.5, 1.5, 16.0, 2.5, 400.0, 2.4, 90.0,
        800.0, 800.0, 1800.0, 130.0, 15.0, 60.0, 15.0, 1500.0, 200.0,
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_target_is_strictly_positive() {
        for category in ReferenceCategory::ALL {
            for nutrient in Nutrient::ALL {
                let target = category.table().target(nutrient);
                assert!(target > 0.0, "{category} {nutrient} has target {target}");
            }
        }
    }

    #[test]
    fn tables_index_by_vocabulary_position() {
        let male = ReferenceCategory::AdultMale.table();
        assert_eq!(male.target(Nutrient::Proteins), 54.0);
        assert_eq!(male.target(Nutrient::Sodium), 2000.0);
        assert_eq!(male.target(Nutrient::Cholesterol), 300.0);

        let hypertension = ReferenceCategory::Hypertension.table();
        assert_eq!(hypertension.target(Nutrient::Sugar), 15.0);
        assert_eq!(hypertension.target(Nutrient::Calcium), 1200.0);

        let female = ReferenceCategory::AdultFemale.table();
        assert_eq!(female.target(Nutrient::Zinc), 13.2);
        assert_eq!(female.target(Nutrient::VitaminA), 840.0);
    }

    #[test]
    fn names_round_trip_through_from_name() {
        for category in ReferenceCategory::ALL {
            assert_eq!(ReferenceCategory::from_name(category.name()), Some(category));
        }
        assert_eq!(
            "Child-13-15".parse::<ReferenceCategory>(),
            Ok(ReferenceCategory::Child13To15)
        );
        assert!("toddler".parse::<ReferenceCategory>().is_err());
    }

    #[test]
    fn serde_uses_category_names() {
        let json = serde_json::to_string(&ReferenceCategory::Child16To18).expect("serializes");
        assert_eq!(json, "\"child-16-18\"");
        let json = serde_json::to_string(&ReferenceCategory::AdultFemale).expect("serializes");
        assert_eq!(json, "\"adult-female\"");
    }
}
