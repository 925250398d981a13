//! Feature and label schema shared by training and inference
//!
//! The positional order of [`Feature::ALL`] and the class indices of
//! [`ObesityClass`] are baked into every fitted model. Changing either one
//! invalidates all existing artifacts.

use serde::{Deserialize, Serialize};

/// Number of input features
pub const N_FEATURES: usize = 16;

/// Number of target classes
pub const N_CLASSES: usize = 7;

/// Name of the target column in the training CSV
pub const TARGET_COLUMN: &str = "NObeyesdad";

/// Female / Male
pub const GENDER_CODES: &[(&str, f64)] = &[("Female", 0.0), ("Male", 1.0)];

/// no / yes flags
pub const YES_NO_CODES: &[(&str, f64)] = &[("no", 0.0), ("yes", 1.0)];

/// Consumption frequency scale used by CAEC and CALC
pub const FREQUENCY_CODES: &[(&str, f64)] = &[
    ("no", 0.0),
    ("Sometimes", 1.0),
    ("Frequently", 2.0),
    ("Always", 3.0),
];

/// Usual transportation
pub const TRANSPORT_CODES: &[(&str, f64)] = &[
    ("Automobile", 0.0),
    ("Motorbike", 1.0),
    ("Bike", 2.0),
    ("Public_Transportation", 3.0),
    ("Walking", 4.0),
];

/// One input attribute, in canonical model order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    Gender,
    Age,
    Height,
    Weight,
    FamilyHistoryWithOverweight,
    Favc,
    Fcvc,
    Ncp,
    Caec,
    Smoke,
    Ch2o,
    Scc,
    Faf,
    Tue,
    Calc,
    Mtrans,
}

impl Feature {
    /// All features in the order the model expects them
    pub const ALL: [Feature; N_FEATURES] = [
        Feature::Gender,
        Feature::Age,
        Feature::Height,
        Feature::Weight,
        Feature::FamilyHistoryWithOverweight,
        Feature::Favc,
        Feature::Fcvc,
        Feature::Ncp,
        Feature::Caec,
        Feature::Smoke,
        Feature::Ch2o,
        Feature::Scc,
        Feature::Faf,
        Feature::Tue,
        Feature::Calc,
        Feature::Mtrans,
    ];

    /// Column / JSON key name
    pub fn name(self) -> &'static str {
        match self {
            Feature::Gender => "Gender",
            Feature::Age => "Age",
            Feature::Height => "Height",
            Feature::Weight => "Weight",
            Feature::FamilyHistoryWithOverweight => "family_history_with_overweight",
            Feature::Favc => "FAVC",
            Feature::Fcvc => "FCVC",
            Feature::Ncp => "NCP",
            Feature::Caec => "CAEC",
            Feature::Smoke => "SMOKE",
            Feature::Ch2o => "CH2O",
            Feature::Scc => "SCC",
            Feature::Faf => "FAF",
            Feature::Tue => "TUE",
            Feature::Calc => "CALC",
            Feature::Mtrans => "MTRANS",
        }
    }

    /// Position in the feature vector
    pub fn index(self) -> usize {
        self as usize
    }

    /// Categorical code table, `None` for attributes that are numeric in the source data
    pub fn codes(self) -> Option<&'static [(&'static str, f64)]> {
        match self {
            Feature::Gender => Some(GENDER_CODES),
            Feature::FamilyHistoryWithOverweight
            | Feature::Favc
            | Feature::Smoke
            | Feature::Scc => Some(YES_NO_CODES),
            Feature::Caec | Feature::Calc => Some(FREQUENCY_CODES),
            Feature::Mtrans => Some(TRANSPORT_CODES),
            Feature::Age
            | Feature::Height
            | Feature::Weight
            | Feature::Fcvc
            | Feature::Ncp
            | Feature::Ch2o
            | Feature::Faf
            | Feature::Tue => None,
        }
    }

    pub fn is_categorical(self) -> bool {
        self.codes().is_some()
    }

    /// Look up the numeric code of a categorical label (exact, case-sensitive)
    pub fn encode_label(self, label: &str) -> Option<f64> {
        self.codes()?
            .iter()
            .find(|(name, _)| *name == label)
            .map(|(_, code)| *code)
    }
}

/// Canonical feature names, in model order
pub fn feature_names() -> [&'static str; N_FEATURES] {
    Feature::ALL.map(Feature::name)
}

/// Obesity category. The discriminants are the class indices of the fitted model
/// and do not follow any severity ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObesityClass {
    #[serde(rename = "Normal_Weight")]
    NormalWeight = 0,
    #[serde(rename = "Overweight_Level_I")]
    OverweightLevelI = 1,
    #[serde(rename = "Overweight_Level_II")]
    OverweightLevelII = 2,
    #[serde(rename = "Obesity_Type_I")]
    ObesityTypeI = 3,
    #[serde(rename = "Insufficient_Weight")]
    InsufficientWeight = 4,
    #[serde(rename = "Obesity_Type_II")]
    ObesityTypeII = 5,
    #[serde(rename = "Obesity_Type_III")]
    ObesityTypeIII = 6,
}

impl ObesityClass {
    /// All classes in class-index order
    pub const ALL: [ObesityClass; N_CLASSES] = [
        ObesityClass::NormalWeight,
        ObesityClass::OverweightLevelI,
        ObesityClass::OverweightLevelII,
        ObesityClass::ObesityTypeI,
        ObesityClass::InsufficientWeight,
        ObesityClass::ObesityTypeII,
        ObesityClass::ObesityTypeIII,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            ObesityClass::NormalWeight => "Normal_Weight",
            ObesityClass::OverweightLevelI => "Overweight_Level_I",
            ObesityClass::OverweightLevelII => "Overweight_Level_II",
            ObesityClass::ObesityTypeI => "Obesity_Type_I",
            ObesityClass::InsufficientWeight => "Insufficient_Weight",
            ObesityClass::ObesityTypeII => "Obesity_Type_II",
            ObesityClass::ObesityTypeIII => "Obesity_Type_III",
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.label() == label)
    }
}

impl std::fmt::Display for ObesityClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order() {
        assert_eq!(
            feature_names(),
            [
                "Gender", "Age", "Height", "Weight", "family_history_with_overweight",
                "FAVC", "FCVC", "NCP", "CAEC", "SMOKE", "CH2O", "SCC",
                "FAF", "TUE", "CALC", "MTRANS",
            ]
        );
        for (i, f) in Feature::ALL.iter().enumerate() {
            assert_eq!(f.index(), i);
        }
    }

    #[test]
    fn test_categorical_codes() {
        assert_eq!(Feature::Gender.encode_label("Female"), Some(0.0));
        assert_eq!(Feature::Gender.encode_label("Male"), Some(1.0));
        assert_eq!(Feature::Smoke.encode_label("yes"), Some(1.0));
        assert_eq!(Feature::Caec.encode_label("Always"), Some(3.0));
        assert_eq!(Feature::Calc.encode_label("no"), Some(0.0));
        assert_eq!(Feature::Mtrans.encode_label("Public_Transportation"), Some(3.0));
        assert_eq!(Feature::Mtrans.encode_label("Walking"), Some(4.0));

        // Lookups are exact
        assert_eq!(Feature::Gender.encode_label("male"), None);
        assert_eq!(Feature::Age.encode_label("no"), None);
        assert_eq!(Feature::ALL.iter().filter(|f| f.is_categorical()).count(), 8);
    }

    #[test]
    fn test_label_table() {
        let labels: Vec<&str> = ObesityClass::ALL.iter().map(|c| c.label()).collect();
        assert_eq!(
            labels,
            vec![
                "Normal_Weight", "Overweight_Level_I", "Overweight_Level_II",
                "Obesity_Type_I", "Insufficient_Weight", "Obesity_Type_II",
                "Obesity_Type_III",
            ]
        );
        for (i, class) in ObesityClass::ALL.iter().enumerate() {
            assert_eq!(class.index(), i);
            assert_eq!(ObesityClass::from_index(i), Some(*class));
            assert_eq!(ObesityClass::from_label(class.label()), Some(*class));
        }
        assert_eq!(ObesityClass::from_index(7), None);
        assert_eq!(ObesityClass::from_label("Obese"), None);
    }
}
