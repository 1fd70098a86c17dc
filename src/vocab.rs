//! Controlled vocabularies.
//!
//! Each vocabulary is a closed set of members with a fixed text name. The names
//! are part of the file format: a cell holding a vocabulary term must match a
//! member name exactly, including case.

use std::fmt;
use std::str::FromStr;

use crate::errors::ImportExportError;

/// Bidirectional name <-> member table for one closed vocabulary
pub trait Vocabulary: Sized + Copy + 'static {
    /// Vocabulary name used in error messages
    const NAME: &'static str;
    /// Every member paired with its canonical name
    const TERMS: &'static [(&'static str, Self)];

    fn name(&self) -> &'static str;

    fn from_name(term: &str) -> Option<Self> {
        Self::TERMS
            .iter()
            .find(|(name, _)| *name == term)
            .map(|(_, member)| *member)
    }

    fn members() -> impl Iterator<Item = Self> {
        Self::TERMS.iter().map(|(_, member)| *member)
    }
}

macro_rules! vocabulary {
    (
        $(#[$meta:meta])*
        $vocab:ident {
            $($variant:ident => $term:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $vocab {
            $($variant,)+
        }

        impl Vocabulary for $vocab {
            const NAME: &'static str = stringify!($vocab);
            const TERMS: &'static [(&'static str, Self)] = &[$(($term, $vocab::$variant),)+];

            fn name(&self) -> &'static str {
                match self {
                    $($vocab::$variant => $term,)+
                }
            }
        }

        impl fmt::Display for $vocab {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $vocab {
            type Err = ImportExportError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$vocab as Vocabulary>::from_name(s).ok_or_else(|| {
                    ImportExportError::UnknownVocabularyTerm {
                        vocabulary: <$vocab as Vocabulary>::NAME,
                        term: s.to_string(),
                    }
                })
            }
        }
    };
}

vocabulary! {
    /// What kind of biological material a sample is
    SampleType {
        Mixed => "mixed",
        Sample => "sample",
        Mutant => "mutant",
        Subculture => "subculture",
        Progeny => "progeny",
        Other => "other",
    }
}

vocabulary! {
    /// Terms under which a sample may be used
    SamplePermission {
        Noncommercial => "noncommercial",
        Private => "private",
        Commercial => "commercial",
        CommercialPaid => "commercial_paid",
        Unspecified => "unspecified",
        Other => "other",
    }
}

vocabulary! {
    /// Role a contributor played for a sample
    SampleContributionPredicate {
        CollectedBy => "collected_by",
        CreatedBy => "created_by",
        OwnedBy => "owned_by",
        EntryCreatedBy => "entry_created_by",
        EntryModifiedBy => "entry_modified_by",
    }
}

vocabulary! {
    ContributorType {
        Person => "person",
        Organisation => "organisation",
    }
}

vocabulary! {
    /// Precision of a location description
    LocationType {
        Point => "point",
        Polygon => "polygon",
        Address => "address",
        Town => "town",
        Region => "region",
        State => "state",
        Country => "country",
        Other => "other",
    }
}

vocabulary! {
    LocationHistoryType {
        Pesticide => "pesticide",
        Fertiliser => "fertiliser",
        GeneralChemical => "general_chemical",
        Tilled => "tilled",
        StubbleBurnt => "stubble_burnt",
        GeneralCulture => "general_culture",
        Crop => "crop",
        Pests => "pests",
        LandUse => "land_use",
        DiseaseSymptoms => "disease_symptoms",
        StressSymptoms => "stress_symptoms",
        GeneralPhenotype => "general_phenotype",
        Temperature => "temperature",
        Rainfall => "rainfall",
        GeneralEnvironment => "general_environment",
    }
}

vocabulary! {
    PhenotypeType {
        Virulent => "virulent",
        Avirulent => "avirulent",
        Symptoms => "symptoms",
        InvitroGrowthRate => "invitro_growth_rate",
        InvitroVisualCharacteristics => "invitro_visual_characteristics",
        Ec50 => "ec50",
        AsexualSporulation => "asexual_sporulation",
        SexualSporulation => "sexual_sporulation",
        Other => "other",
    }
}

vocabulary! {
    /// How precisely a date is known
    DateResolution {
        Day => "day",
        Week => "week",
        Month => "month",
        Quarter => "quarter",
        Season => "season",
        Year => "year",
        Decade => "decade",
    }
}

vocabulary! {
    /// How a taxon assignment for a sample was arrived at
    SampleTaxonType {
        Reported => "reported",
        Identified => "identified",
        Inferred => "inferred",
        Other => "other",
    }
}

vocabulary! {
    /// Target organism class of a pesticide
    PesticideType {
        Fungicide => "fungicide",
        Herbicide => "herbicide",
        Insecticide => "insecticide",
        Nematicide => "nematicide",
        Bactericide => "bactericide",
        Acaricide => "acaricide",
        Adjuvant => "adjuvant",
        Other => "other",
    }
}

vocabulary! {
    /// Position of a pesticide entry in the product hierarchy
    PesticideProductType {
        ChemicalClass => "chemical_class",
        ActiveIngredient => "active_ingredient",
        Product => "product",
        Mixture => "mixture",
        Other => "other",
    }
}

vocabulary! {
    PesticideApplication {
        SeedTreatment => "seed_treatment",
        InFurrow => "in_furrow",
        Foliar => "foliar",
        Soil => "soil",
        Fumigation => "fumigation",
        Other => "other",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_bijective<V: Vocabulary + PartialEq + fmt::Debug>() {
        let names: HashSet<&str> = V::TERMS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names.len(), V::TERMS.len(), "{} has duplicate names", V::NAME);
        for member in V::members() {
            assert_eq!(V::from_name(member.name()), Some(member));
        }
    }

    #[test]
    fn test_every_vocabulary_is_bijective() {
        assert_bijective::<SampleType>();
        assert_bijective::<SamplePermission>();
        assert_bijective::<SampleContributionPredicate>();
        assert_bijective::<ContributorType>();
        assert_bijective::<LocationType>();
        assert_bijective::<LocationHistoryType>();
        assert_bijective::<PhenotypeType>();
        assert_bijective::<DateResolution>();
        assert_bijective::<SampleTaxonType>();
        assert_bijective::<PesticideType>();
        assert_bijective::<PesticideProductType>();
        assert_bijective::<PesticideApplication>();
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!("commercial_paid".parse::<SamplePermission>().ok(), Some(SamplePermission::CommercialPaid));
        let err = "Commercial_Paid".parse::<SamplePermission>().unwrap_err();
        assert!(matches!(
            err,
            ImportExportError::UnknownVocabularyTerm { vocabulary: "SamplePermission", ref term }
                if term == "Commercial_Paid"
        ));
    }

    #[test]
    fn test_display_uses_canonical_name() {
        assert_eq!(SampleContributionPredicate::EntryModifiedBy.to_string(), "entry_modified_by");
        assert_eq!(DateResolution::Decade.to_string(), "decade");
    }
}
