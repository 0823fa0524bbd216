use serde::{Deserialize, Serialize};
use std::fmt;

pub const COMPANY_ANNOTATION_TYPE: &str = "com.ibm.langware.en.Company";
pub const PERSON_ANNOTATION_TYPE: &str = "com.ibm.langware.en.Person";

/// Kind of named entity to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Company,
    Person,
}

impl Category {
    /// Map the route's `option` segment to a category.
    ///
    /// Only `companies` and `people` are recognised; anything else has no
    /// category and therefore no endpoint.
    pub fn from_option(option: &str) -> Option<Self> {
        match option {
            "companies" => Some(Category::Company),
            "people" => Some(Category::Person),
            _ => None,
        }
    }

    /// The route `option` that selects this category.
    pub fn option(self) -> &'static str {
        match self {
            Category::Company => "companies",
            Category::Person => "people",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Category::Company => "company",
            Category::Person => "person",
        })
    }
}

/// Annotation-type identifiers the analytics service understands, per category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationTypes {
    pub company: String,
    pub person: String,
}

impl AnnotationTypes {
    pub fn for_category(&self, category: Category) -> &str {
        match category {
            Category::Company => &self.company,
            Category::Person => &self.person,
        }
    }
}

impl Default for AnnotationTypes {
    fn default() -> Self {
        Self {
            company: COMPANY_ANNOTATION_TYPE.to_string(),
            person: PERSON_ANNOTATION_TYPE.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_map_to_categories() {
        assert_eq!(Category::from_option("companies"), Some(Category::Company));
        assert_eq!(Category::from_option("people"), Some(Category::Person));
        assert_eq!(Category::from_option("widgets"), None);
        assert_eq!(Category::from_option("Companies"), None);
    }

    #[test]
    fn option_round_trips() {
        for cat in [Category::Company, Category::Person] {
            assert_eq!(Category::from_option(cat.option()), Some(cat));
        }
    }

    #[test]
    fn default_annotation_types() {
        let types = AnnotationTypes::default();
        assert_eq!(
            types.for_category(Category::Company),
            "com.ibm.langware.en.Company"
        );
        assert_eq!(
            types.for_category(Category::Person),
            "com.ibm.langware.en.Person"
        );
    }
}
