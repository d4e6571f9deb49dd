//! Field-level validation gate.
//!
//! # Responsibility
//! - Map a candidate record to accept/reject plus a reason.
//! - Provide the default catalog rule set used by the mutation engine.
//!
//! # Invariants
//! - Validation is pure: no I/O, no side effects.
//! - The gate runs before any store write.

use crate::model::audit::EntityType;
use crate::model::author::Author;
use crate::model::book::Book;
use crate::model::category::Category;
use once_cell::sync::Lazy;
use regex::Regex;

const CATEGORY_NAME_MIN_CHARS: usize = 2;
const CATEGORY_NAME_MAX_CHARS: usize = 100;
const BOOK_TITLE_MIN_CHARS: usize = 3;
const BOOK_TITLE_MAX_CHARS: usize = 200;
const PHYSICAL_ID_MIN_CHARS: usize = 5;
const PHYSICAL_ID_MAX_CHARS: usize = 50;
const AUTHOR_NAME_MIN_CHARS: usize = 2;
const AUTHOR_NAME_MAX_CHARS: usize = 100;

static PHYSICAL_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid physical id regex"));
static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[0-9]{10}|[0-9]{13})$").expect("valid isbn regex"));
static AUTHOR_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\s.\-']+$").expect("valid author name regex"));
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^[A-Za-z0-9+_.-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").expect("valid email regex")
});

/// Record submitted to the gate.
#[derive(Debug, Clone, Copy)]
pub enum Candidate<'a> {
    Book(&'a Book),
    Author(&'a Author),
    Category(&'a Category),
}

impl Candidate<'_> {
    pub fn kind(&self) -> EntityType {
        match self {
            Self::Book(_) => EntityType::Book,
            Self::Author(_) => EntityType::Author,
            Self::Category(_) => EntityType::Category,
        }
    }
}

/// Gate verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub valid: bool,
    /// Human-readable reason; `"valid"` for accepted candidates.
    pub reason: String,
}

impl ValidationOutcome {
    pub fn accept() -> Self {
        Self {
            valid: true,
            reason: "valid".to_string(),
        }
    }

    pub fn reject(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: reason.into(),
        }
    }

    /// Chains another check, keeping the first rejection.
    fn and_then(self, next: impl FnOnce() -> ValidationOutcome) -> ValidationOutcome {
        if self.valid {
            next()
        } else {
            self
        }
    }
}

/// Pass/fail gate consulted by the mutation engine before committing.
pub trait ValidationGate {
    fn validate(&self, candidate: &Candidate<'_>) -> ValidationOutcome;
}

/// Default catalog field rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogRules;

impl ValidationGate for CatalogRules {
    fn validate(&self, candidate: &Candidate<'_>) -> ValidationOutcome {
        match candidate {
            Candidate::Category(category) => validate_category_name(&category.name),
            Candidate::Book(book) => validate_book_title(&book.title)
                .and_then(|| validate_physical_id(&book.physical_id))
                .and_then(|| validate_isbn(book.isbn.as_deref())),
            Candidate::Author(author) => validate_author_name(&author.name)
                .and_then(|| validate_email(author.email.as_deref())),
        }
    }
}

pub fn validate_category_name(name: &str) -> ValidationOutcome {
    validate_length(
        "category name",
        name,
        CATEGORY_NAME_MIN_CHARS,
        CATEGORY_NAME_MAX_CHARS,
    )
}

pub fn validate_book_title(title: &str) -> ValidationOutcome {
    validate_length("book title", title, BOOK_TITLE_MIN_CHARS, BOOK_TITLE_MAX_CHARS)
}

pub fn validate_physical_id(physical_id: &str) -> ValidationOutcome {
    validate_length(
        "physical id",
        physical_id,
        PHYSICAL_ID_MIN_CHARS,
        PHYSICAL_ID_MAX_CHARS,
    )
    .and_then(|| {
        if PHYSICAL_ID_RE.is_match(physical_id) {
            ValidationOutcome::accept()
        } else {
            ValidationOutcome::reject(
                "physical id may only contain letters, digits, underscore and hyphen",
            )
        }
    })
}

/// ISBN is optional; when present it must have 10 or 13 digits once hyphens
/// and spaces are removed.
pub fn validate_isbn(isbn: Option<&str>) -> ValidationOutcome {
    let Some(isbn) = isbn.filter(|value| !value.trim().is_empty()) else {
        return ValidationOutcome::accept();
    };
    let digits: String = isbn.chars().filter(|c| *c != '-' && *c != ' ').collect();
    if ISBN_RE.is_match(&digits) {
        ValidationOutcome::accept()
    } else {
        ValidationOutcome::reject("isbn must have 10 or 13 digits")
    }
}

pub fn validate_author_name(name: &str) -> ValidationOutcome {
    validate_length("author name", name, AUTHOR_NAME_MIN_CHARS, AUTHOR_NAME_MAX_CHARS).and_then(
        || {
            if AUTHOR_NAME_RE.is_match(name) {
                ValidationOutcome::accept()
            } else {
                ValidationOutcome::reject(
                    "author name may only contain letters, spaces, dots, hyphens and apostrophes",
                )
            }
        },
    )
}

/// Email is optional.
pub fn validate_email(email: Option<&str>) -> ValidationOutcome {
    match email.filter(|value| !value.trim().is_empty()) {
        None => ValidationOutcome::accept(),
        Some(value) if EMAIL_RE.is_match(value) => ValidationOutcome::accept(),
        Some(_) => ValidationOutcome::reject("email format is invalid"),
    }
}

fn validate_length(field: &str, value: &str, min: usize, max: usize) -> ValidationOutcome {
    if value.trim().is_empty() {
        return ValidationOutcome::reject(format!("{field} must not be blank"));
    }
    let chars = value.chars().count();
    if chars < min {
        return ValidationOutcome::reject(format!("{field} must have at least {min} characters"));
    }
    if chars > max {
        return ValidationOutcome::reject(format!("{field} must have at most {max} characters"));
    }
    ValidationOutcome::accept()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_name_bounds() {
        assert!(validate_category_name("Sc").valid);
        assert!(!validate_category_name("   ").valid);
        assert!(!validate_category_name("S").valid);
        assert!(!validate_category_name(&"x".repeat(101)).valid);
        assert!(validate_category_name(&"x".repeat(100)).valid);
    }

    #[test]
    fn physical_id_rejects_symbols_and_short_values() {
        assert!(validate_physical_id("PID-001").valid);
        assert!(validate_physical_id("shelf_12").valid);
        assert!(!validate_physical_id("P-1").valid);
        let outcome = validate_physical_id("PID 001");
        assert!(!outcome.valid);
        assert!(outcome.reason.contains("letters"));
    }

    #[test]
    fn isbn_ignores_hyphens_and_spaces() {
        assert!(validate_isbn(None).valid);
        assert!(validate_isbn(Some("")).valid);
        assert!(validate_isbn(Some("978-0-441-17271-9")).valid);
        assert!(validate_isbn(Some("0 441 17271 7")).valid);
        assert!(!validate_isbn(Some("978-0-441")).valid);
        assert!(!validate_isbn(Some("97804411727X9")).valid);
    }

    #[test]
    fn author_rules_check_name_charset_and_email() {
        assert!(validate_author_name("Ursula K. Le Guin").valid);
        assert!(validate_author_name("Flannery O'Connor").valid);
        assert!(!validate_author_name("R2D2").valid);
        assert!(validate_email(Some("ursula@example.org")).valid);
        assert!(!validate_email(Some("not-an-email")).valid);
    }

    #[test]
    fn gate_reports_first_failing_rule() {
        let mut book = Book::new("Ok", "P!");
        let outcome = CatalogRules.validate(&Candidate::Book(&book));
        assert!(!outcome.valid);
        assert!(outcome.reason.contains("book title"));

        book.title = "A fine title".to_string();
        let outcome = CatalogRules.validate(&Candidate::Book(&book));
        assert!(outcome.reason.contains("physical id"));

        book.physical_id = "PID-001".to_string();
        assert_eq!(
            CatalogRules.validate(&Candidate::Book(&book)),
            ValidationOutcome::accept()
        );
        assert_eq!(Candidate::Book(&book).kind(), EntityType::Book);
    }
}
