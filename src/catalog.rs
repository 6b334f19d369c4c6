use std::{
    collections::{HashMap, HashSet},
    fmt,
    path::Path,
};

use serde::Deserialize;

use crate::error::{CatalogError, QuizError, Result};

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.toml");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Category {
    name: String,
    #[serde(default)]
    image: Option<String>,
}

/// Choosing `option` adds `weight` to `category`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Weight {
    option: String,
    category: String,
    weight: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    text: String,
    options: Vec<String>,
    #[serde(default)]
    weights: Vec<Weight>,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    categories: Vec<Category>,
    questions: Vec<Question>,
}

#[derive(Debug, Clone)]
pub struct Catalog {
    categories: Vec<Category>,
    questions: Vec<Question>,
    // option text -> first question offering it
    option_index: HashMap<String, usize>,
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.text, self.options.join(" | "))
    }
}

impl Category {
    pub fn new(name: impl Into<String>, image: Option<String>) -> Self {
        Self {
            name: name.into(),
            image,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }
}

impl Weight {
    pub fn new(option: impl Into<String>, category: impl Into<String>, weight: i64) -> Self {
        Self {
            option: option.into(),
            category: category.into(),
            weight,
        }
    }

    pub fn option(&self) -> &str {
        &self.option
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn weight(&self) -> i64 {
        self.weight
    }
}

impl Question {
    pub fn new<S: Into<String>>(
        text: impl Into<String>,
        options: impl IntoIterator<Item = S>,
        weights: Vec<Weight>,
    ) -> Self {
        Self {
            text: text.into(),
            options: options.into_iter().map(Into::into).collect(),
            weights,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn weights(&self) -> &[Weight] {
        &self.weights
    }

    pub fn has_option(&self, text: &str) -> bool {
        self.options.iter().any(|option| option == text)
    }

    pub fn categories(&self) -> Vec<&str> {
        let mut seen = Vec::new();
        for weight in &self.weights {
            if !seen.contains(&weight.category()) {
                seen.push(weight.category());
            }
        }
        seen
    }

    /// Weights that apply when `option` is chosen.
    pub fn weights_for<'a>(&'a self, option: &'a str) -> impl Iterator<Item = &'a Weight> + 'a {
        self.weights.iter().filter(move |weight| weight.option == option)
    }
}

impl Catalog {
    pub fn new(categories: Vec<Category>, questions: Vec<Question>) -> Result<Self, CatalogError> {
        if questions.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut option_index = HashMap::new();
        for (idx, question) in questions.iter().enumerate() {
            let number = idx + 1;
            if question.options.is_empty() {
                return Err(CatalogError::NoOptions { question: number });
            }

            let mut seen = HashSet::new();
            for option in &question.options {
                if !seen.insert(option.as_str()) {
                    return Err(CatalogError::DuplicateOption {
                        question: number,
                        option: option.clone(),
                    });
                }
                option_index.entry(option.clone()).or_insert(idx);
            }

            if let Some(weight) = question.weights.iter().find(|w| !question.has_option(&w.option)) {
                return Err(CatalogError::UnknownOption {
                    question: number,
                    option: weight.option.clone(),
                });
            }
        }

        Ok(Self {
            categories,
            questions,
            option_index,
        })
    }

    pub fn from_toml_str(source: &str) -> Result<Self, CatalogError> {
        let raw: RawCatalog = toml::from_str(source)?;
        Self::new(raw.categories, raw.questions)
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        match path {
            Some(path) => {
                let source = std::fs::read_to_string(path)?;
                Self::from_toml_str(&source)
            }
            None => Self::builtin(),
        }
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn question_at(&self, index: usize) -> Result<&Question> {
        self.questions.get(index).ok_or(QuizError::IndexOutOfRange {
            index,
            len: self.questions.len(),
        })
    }

    pub fn all_option_texts(&self) -> HashSet<&str> {
        self.option_index.keys().map(String::as_str).collect()
    }

    pub fn is_option(&self, text: &str) -> bool {
        self.option_index.contains_key(text)
    }

    pub fn question_index_of(&self, text: &str) -> Result<usize> {
        self.option_index
            .get(text)
            .copied()
            .ok_or_else(|| QuizError::UnknownAnswerText(text.to_owned()))
    }

    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|category| category.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_questions() -> Catalog {
        Catalog::new(
            vec![Category::new("fox", Some("img/fox.jpg".into()))],
            vec![
                Question::new("Q1", ["A", "B"], vec![Weight::new("A", "fox", 1)]),
                Question::new(
                    "Q2",
                    ["C", "D"],
                    vec![Weight::new("C", "fox", 2), Weight::new("D", "owl", 3)],
                ),
            ],
        )
        .unwrap()
    }

    #[test]
    fn builtin_catalog_is_valid() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.question_count() >= 5);
        for question in catalog.questions() {
            for category in question.categories() {
                assert!(
                    catalog.category(category).is_some(),
                    "category '{category}' has no picture entry"
                );
            }
        }
    }

    #[test]
    fn question_at_out_of_range() {
        let catalog = two_questions();
        assert_eq!(catalog.question_at(1).unwrap().text(), "Q2");
        assert_eq!(
            catalog.question_at(2),
            Err(QuizError::IndexOutOfRange { index: 2, len: 2 })
        );
    }

    #[test]
    fn option_texts_span_all_questions() {
        let catalog = two_questions();
        let options = catalog.all_option_texts();
        assert_eq!(options, HashSet::from(["A", "B", "C", "D"]));
        assert_eq!(catalog.question_index_of("D"), Ok(1));
        assert_eq!(
            catalog.question_index_of("E"),
            Err(QuizError::UnknownAnswerText("E".into()))
        );
    }

    #[test]
    fn shared_option_resolves_to_first_question() {
        let catalog = Catalog::new(
            vec![],
            vec![
                Question::new("Q1", ["yes", "no"], vec![]),
                Question::new("Q2", ["maybe", "yes"], vec![]),
            ],
        )
        .unwrap();
        assert_eq!(catalog.question_index_of("yes"), Ok(0));
        assert_eq!(catalog.question_index_of("maybe"), Ok(1));
    }

    #[test]
    fn categories_keep_first_seen_order() {
        let question = Question::new(
            "Q",
            ["x", "y"],
            vec![
                Weight::new("y", "owl", 1),
                Weight::new("x", "fox", 1),
                Weight::new("x", "owl", 2),
            ],
        );
        assert_eq!(question.categories(), vec!["owl", "fox"]);
        assert_eq!(question.weights_for("x").count(), 2);
    }

    #[test]
    fn rejects_invalid_catalogs() {
        assert!(matches!(Catalog::new(vec![], vec![]), Err(CatalogError::Empty)));

        let no_options = Catalog::new(vec![], vec![Question::new("Q", Vec::<String>::new(), vec![])]);
        assert!(matches!(no_options, Err(CatalogError::NoOptions { question: 1 })));

        let duplicate = Catalog::new(vec![], vec![Question::new("Q", ["A", "A"], vec![])]);
        assert!(matches!(duplicate, Err(CatalogError::DuplicateOption { question: 1, .. })));

        let unknown = Catalog::new(
            vec![],
            vec![Question::new("Q", ["A"], vec![Weight::new("B", "fox", 1)])],
        );
        assert!(matches!(unknown, Err(CatalogError::UnknownOption { question: 1, .. })));
    }

    #[test]
    fn parses_toml() {
        let catalog = Catalog::from_toml_str(
            r#"
            [[categories]]
            name = "fox"

            [[questions]]
            text = "Q1"
            options = ["A", "B"]
            weights = [{ option = "A", category = "fox", weight = 4 }]
            "#,
        )
        .unwrap();

        assert_eq!(catalog.category("fox").unwrap().image(), None);
        let weight = &catalog.question_at(0).unwrap().weights()[0];
        assert_eq!((weight.option(), weight.category(), weight.weight()), ("A", "fox", 4));
    }

    #[test]
    fn reports_toml_errors() {
        assert!(matches!(
            Catalog::from_toml_str("questions = 3"),
            Err(CatalogError::Parse(_))
        ));
    }
}
