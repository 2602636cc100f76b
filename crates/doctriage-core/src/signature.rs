//! Category signatures: the keyword evidence that identifies each category.
//!
//! The signature table is process-wide configuration, loaded once at
//! startup and shared read-only. A built-in table ships with the crate; a
//! versioned JSON file can replace it:
//!
//! ```json
//! {
//!   "version": 1,
//!   "categories": [
//!     { "id": "invoice", "keywords": ["invoice", "amount due"], "filename_markers": ["invoice"] }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::CategoryId;

/// Current signature file format version.
pub const SIGNATURE_FORMAT_VERSION: u32 = 1;

const DRIVERS_LICENCE_KEYWORDS: &[&str] = &[
    "license",
    "licence",
    "identification",
    "class",
    "dob",
    "weight",
    "height",
    "driver",
    "operator",
    "permit",
    "expires",
    "restrictions",
    "endorsements",
    "state",
    "sex",
    "eyes",
    "signature",
    "issued",
    "birth",
    "expiration",
    "commercial",
    "non-commercial",
    "id number",
    "dl number",
    "driving",
];

const BANK_STATEMENT_KEYWORDS: &[&str] = &[
    "statement",
    "balance",
    "account",
    "transaction",
    "deposit",
    "withdrawal",
    "bank",
    "checking",
    "savings",
    "beginning balance",
    "ending balance",
];

const INVOICE_KEYWORDS: &[&str] = &[
    "invoice",
    "bill to",
    "amount due",
    "payment",
    "details",
    "total",
    "subtotal",
    "tax",
    "due date",
    "invoice number",
    "order number",
];

const DRIVERS_LICENCE_MARKERS: &[&str] = &[
    "drivers_license",
    "drivers_licence",
    "driver_license",
    "driving_licence",
];
const BANK_STATEMENT_MARKERS: &[&str] = &["bank_statement"];
const INVOICE_MARKERS: &[&str] = &["invoice"];

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("failed to read signature file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse signature file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported signature format version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("category {0} is declared more than once")]
    Duplicate(CategoryId),

    #[error("category {0} has no keywords")]
    NoKeywords(CategoryId),

    #[error("category {0} contains a blank keyword or marker")]
    BlankEntry(CategoryId),

    #[error("signature table is empty")]
    Empty,
}

/// Keyword and filename evidence for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySignature {
    pub id: CategoryId,
    /// Ordered keywords and phrases, lowercase.
    pub keywords: Vec<String>,
    /// Filename substrings checked by the last-resort heuristic, lowercase.
    #[serde(default)]
    pub filename_markers: Vec<String>,
}

impl CategorySignature {
    pub fn new<K, M>(id: CategoryId, keywords: K, filename_markers: M) -> Self
    where
        K: IntoIterator,
        K::Item: Into<String>,
        M: IntoIterator,
        M::Item: Into<String>,
    {
        Self {
            id,
            keywords: keywords.into_iter().map(Into::into).collect(),
            filename_markers: filename_markers.into_iter().map(Into::into).collect(),
        }
    }

    fn normalized(mut self) -> Result<Self, SignatureError> {
        if self.keywords.is_empty() {
            return Err(SignatureError::NoKeywords(self.id));
        }
        for entry in self.keywords.iter_mut().chain(self.filename_markers.iter_mut()) {
            let lowered = entry.trim().to_lowercase();
            if lowered.is_empty() {
                return Err(SignatureError::BlankEntry(self.id));
            }
            *entry = lowered;
        }
        Ok(self)
    }
}

#[derive(Serialize, Deserialize)]
struct SignatureFile {
    version: u32,
    categories: Vec<CategorySignature>,
}

/// The immutable, ordered set of category signatures.
///
/// Signatures are kept in [`CategoryId`] declaration order regardless of
/// the order they were supplied in, which makes that order the tie-break
/// rule for every consumer that iterates the set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureSet {
    signatures: Vec<CategorySignature>,
}

impl Default for SignatureSet {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SignatureSet {
    /// The built-in table.
    pub fn builtin() -> Self {
        let table = [
            (
                CategoryId::DriversLicence,
                DRIVERS_LICENCE_KEYWORDS,
                DRIVERS_LICENCE_MARKERS,
            ),
            (
                CategoryId::BankStatement,
                BANK_STATEMENT_KEYWORDS,
                BANK_STATEMENT_MARKERS,
            ),
            (CategoryId::Invoice, INVOICE_KEYWORDS, INVOICE_MARKERS),
        ];
        let signatures = table
            .into_iter()
            .map(|(id, keywords, markers)| {
                CategorySignature::new(id, keywords.iter().copied(), markers.iter().copied())
            })
            .collect();
        Self { signatures }
    }

    /// Build a set from arbitrary signatures, validating and normalising them.
    pub fn new(signatures: Vec<CategorySignature>) -> Result<Self, SignatureError> {
        if signatures.is_empty() {
            return Err(SignatureError::Empty);
        }

        let mut seen = HashSet::new();
        let mut normalized = Vec::with_capacity(signatures.len());
        for sig in signatures {
            if !seen.insert(sig.id) {
                return Err(SignatureError::Duplicate(sig.id));
            }
            normalized.push(sig.normalized()?);
        }
        normalized.sort_by_key(|sig| sig.id);

        Ok(Self {
            signatures: normalized,
        })
    }

    /// Parse a versioned JSON signature table.
    pub fn from_json(json: &str) -> Result<Self, SignatureError> {
        let file: SignatureFile = serde_json::from_str(json)?;
        if file.version != SIGNATURE_FORMAT_VERSION {
            return Err(SignatureError::Version {
                found: file.version,
                expected: SIGNATURE_FORMAT_VERSION,
            });
        }
        Self::new(file.categories)
    }

    /// Load a versioned JSON signature table from disk.
    pub fn load(path: &Path) -> Result<Self, SignatureError> {
        let json = std::fs::read_to_string(path).map_err(|source| SignatureError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let set = Self::from_json(&json)?;
        info!(
            path = %path.display(),
            categories = set.len(),
            "loaded signature table"
        );
        Ok(set)
    }

    /// Serialise back to the versioned JSON format.
    pub fn to_json_pretty(&self) -> Result<String, SignatureError> {
        let file = SignatureFile {
            version: SIGNATURE_FORMAT_VERSION,
            categories: self.signatures.clone(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Iterate signatures in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &CategorySignature> {
        self.signatures.iter()
    }

    pub fn get(&self, id: CategoryId) -> Option<&CategorySignature> {
        self.signatures.iter().find(|sig| sig.id == id)
    }

    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}
