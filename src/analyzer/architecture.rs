//! Architecture Pattern Detection
//!
//! Classifies functions and types by the words in their file path and name
//! (`controllers/user.py:UserController` reads as controller, user, user,
//! controller) and reports the layered patterns those roles add up to.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::constants::architecture::{
    MIN_SERVICE_ELEMENTS, MVC_CONFIDENCE, REPOSITORY_CONFIDENCE, SERVICE_LAYER_CONFIDENCE,
};
use crate::types::{CodeElement, ElementKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchitectureKind {
    ModelViewController,
    ServiceLayer,
    Repository,
}

impl ArchitectureKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::ModelViewController => "MVC",
            Self::ServiceLayer => "Service Layer",
            Self::Repository => "Repository",
        }
    }

    /// Lower-case phrases that count as a document naming the pattern
    pub fn mentions(&self) -> &'static [&'static str] {
        match self {
            Self::ModelViewController => &["mvc", "model-view-controller", "model view controller"],
            Self::ServiceLayer => &["service layer"],
            Self::Repository => &["repository"],
        }
    }
}

impl std::fmt::Display for ArchitectureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchitecturePattern {
    pub kind: ArchitectureKind,
    pub confidence: f64,
    /// Participating elements as `file:name`
    pub elements: Vec<String>,
    pub files: BTreeSet<String>,
}

impl ArchitecturePattern {
    fn from_elements(kind: ArchitectureKind, confidence: f64, elements: &[&CodeElement]) -> Self {
        Self {
            kind,
            confidence,
            elements: elements
                .iter()
                .map(|e| format!("{}:{}", e.file, e.name))
                .collect(),
            files: elements.iter().map(|e| e.file.clone()).collect(),
        }
    }
}

const CONTROLLER_WORDS: &[&str] = &["controller", "controllers"];
const VIEW_WORDS: &[&str] = &["view", "views", "component", "components"];
const MODEL_WORDS: &[&str] = &["model", "models"];
const SERVICE_WORDS: &[&str] = &["service", "services"];
const REPOSITORY_WORDS: &[&str] = &["repository", "repositories", "repo", "repos"];

/// Patterns present in `elements`, in MVC, service layer, repository order.
///
/// MVC needs at least one controller, model and view; a type that names no
/// other role counts as a model.
pub fn detect_architecture(elements: &[CodeElement]) -> Vec<ArchitecturePattern> {
    let mut controllers = Vec::new();
    let mut views = Vec::new();
    let mut models = Vec::new();
    let mut services = Vec::new();
    let mut repositories = Vec::new();

    for element in elements.iter().filter(|e| e.kind != ElementKind::Import) {
        let words = identifier_words(&format!("{}/{}", element.file, element.name));
        let has = |role: &[&str]| words.iter().any(|w| role.contains(&w.as_str()));

        if has(CONTROLLER_WORDS) {
            controllers.push(element);
        } else if has(VIEW_WORDS) {
            views.push(element);
        } else if has(MODEL_WORDS) || element.kind == ElementKind::Type {
            models.push(element);
        }
        if has(SERVICE_WORDS) {
            services.push(element);
        }
        if has(REPOSITORY_WORDS) {
            repositories.push(element);
        }
    }

    let mut patterns = Vec::new();
    if !controllers.is_empty() && !models.is_empty() && !views.is_empty() {
        let all: Vec<&CodeElement> = controllers
            .into_iter()
            .chain(models)
            .chain(views)
            .collect();
        patterns.push(ArchitecturePattern::from_elements(
            ArchitectureKind::ModelViewController,
            MVC_CONFIDENCE,
            &all,
        ));
    }
    if services.len() >= MIN_SERVICE_ELEMENTS {
        patterns.push(ArchitecturePattern::from_elements(
            ArchitectureKind::ServiceLayer,
            SERVICE_LAYER_CONFIDENCE,
            &services,
        ));
    }
    if !repositories.is_empty() {
        patterns.push(ArchitecturePattern::from_elements(
            ArchitectureKind::Repository,
            REPOSITORY_CONFIDENCE,
            &repositories,
        ));
    }
    patterns
}

/// Lower-case words split on punctuation and camelCase boundaries
fn identifier_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    for part in text.split(|c: char| !c.is_alphanumeric()) {
        let mut current = String::new();
        let mut previous_lower = false;
        for c in part.chars() {
            if c.is_uppercase() && previous_lower && !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = c.is_lowercase() || c.is_ascii_digit();
            current.extend(c.to_lowercase());
        }
        if !current.is_empty() {
            words.push(current);
        }
    }
    words
}
