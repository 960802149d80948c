use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // 10-digit mobile number, leading digit 6-9 per the local numbering plan
    static ref PHONE_REGEX: Regex = Regex::new(r"^[6-9]\d{9}$").unwrap();

    // local@domain.tld, 2-4 letter lowercase TLD
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[a-z]{2,4}$").unwrap();
}

/// Kind of contact identifier under verification.
///
/// Each kind carries its own validation pattern, wire slug and message set,
/// selected by exhaustive matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdentifierKind {
    #[default]
    Phone,
    Email,
}

impl IdentifierKind {
    /// Slug used in lookup keys and wire payloads.
    pub fn slug(&self) -> &'static str {
        match self {
            IdentifierKind::Phone => "phone",
            IdentifierKind::Email => "email",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            IdentifierKind::Phone => &PHONE_REGEX,
            IdentifierKind::Email => &EMAIL_REGEX,
        }
    }

    /// Whole-string pattern match, applied verbatim. No trimming, case
    /// folding or country-code prefixing happens before matching.
    pub fn matches(&self, value: &str) -> bool {
        self.pattern().is_match(value)
    }
}

/// The identifier currently being entered. Owned exclusively by the flow.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContactForm {
    pub value: String,
    pub kind: IdentifierKind,
}

impl ContactForm {
    /// VALID iff the value is non-empty and fully matches the kind's pattern.
    pub fn is_valid(&self) -> bool {
        !self.value.is_empty() && self.kind.matches(&self.value)
    }

    /// Lookup key consumed by the user registry: `"<kind>/<value>"`.
    pub fn lookup_key(&self) -> String {
        format!("{}/{}", self.kind.slug(), self.value)
    }

    /// Clear the value and select the given kind.
    pub fn reset(&mut self, kind: IdentifierKind) {
        self.value.clear();
        self.kind = kind;
    }
}
