//! Dictionary descriptor (`dictionaries.xcu`) fetching and parsing
//!
//! Repositories publish an XML descriptor per language directory listing the
//! dictionaries it contains. A hyphenation record looks like:
//!
//! ```xml
//! <node oor:name="HyphDic_en_US" oor:op="fuse">
//!   <prop oor:name="Locations" oor:type="oor:string-list">
//!     <value>%origin%/hyph_en_US.dic</value>
//!   </prop>
//!   <prop oor:name="Locales" oor:type="oor:string-list">
//!     <value>en-US en-GB</value>
//!   </prop>
//! </node>
//! ```

use roxmltree::{Document, Node};

use super::resolver::ResolvedDictionary;
use super::transport::Transport;
use crate::error::{DictionaryError, Result};

/// Descriptor filename appended to the origin URL
pub const DESCRIPTOR_FILE: &str = "dictionaries.xcu";

/// Length of the `%origin%/` placeholder in location strings
const ORIGIN_PLACEHOLDER_LEN: usize = 9;

/// A downloaded descriptor and the URL it is relative to
#[derive(Debug, Clone)]
pub struct Descriptor {
    pub origin_url: String,
    pub content: String,
}

impl Descriptor {
    /// Find the first hyphenation record serving `language`
    pub fn find(
        &self,
        language: &str,
        matcher: &dyn RecordMatcher,
    ) -> Result<Option<ResolvedDictionary>> {
        parse_descriptor(&self.content, &self.origin_url, language, matcher)
    }
}

/// Decides whether a descriptor node describes a hyphenation dictionary
pub trait RecordMatcher: Send + Sync {
    fn is_record(&self, node: &Node<'_, '_>) -> bool;
}

/// Matches `<node>` elements with an attribute value containing `hyphdic`
#[derive(Debug, Clone, Copy, Default)]
pub struct HyphenationRecord;

impl RecordMatcher for HyphenationRecord {
    fn is_record(&self, node: &Node<'_, '_>) -> bool {
        node.tag_name().name() == "node"
            && node
                .attributes()
                .any(|attr| attr.value().to_lowercase().contains("hyphdic"))
    }
}

/// A record tentatively describing a hyphenation dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DictionaryCandidate {
    /// Locales served, in canonical `ll_CC` form
    pub locales: Vec<String>,
    /// First location, still carrying the `%origin%/` placeholder
    pub location: Option<String>,
}

impl DictionaryCandidate {
    fn from_node(node: Node<'_, '_>) -> Self {
        let mut candidate = Self::default();

        for prop in node.children().filter(Node::is_element) {
            let value = prop
                .children()
                .find(Node::is_element)
                .and_then(|child| child.text());

            for attr in prop.attributes() {
                match attr.value().to_lowercase().as_str() {
                    "locations" => {
                        if let Some(location) =
                            value.and_then(|text| text.split_whitespace().next())
                        {
                            candidate.location = Some(location.to_string());
                        }
                    }
                    // Last non-empty occurrence wins
                    "locales" => {
                        let locales: Vec<String> = value
                            .map(|text| {
                                text.replace('-', "_")
                                    .split_whitespace()
                                    .map(str::to_string)
                                    .collect()
                            })
                            .unwrap_or_default();
                        if !locales.is_empty() {
                            candidate.locales = locales;
                        }
                    }
                    _ => {}
                }
            }
        }

        candidate
    }

    /// Whether this record serves `language` and points at a file
    pub fn serves(&self, language: &str) -> bool {
        self.location.is_some() && self.locales.iter().any(|l| l == language)
    }

    /// Download URL relative to `origin_url`
    pub fn url(&self, origin_url: &str) -> Option<String> {
        let location = self.location.as_deref()?;
        let relative: String = location.chars().skip(ORIGIN_PLACEHOLDER_LEN).collect();
        Some(format!("{origin_url}/{relative}"))
    }
}

/// All candidate records in document order
pub fn candidates(
    document: &Document<'_>,
    matcher: &dyn RecordMatcher,
) -> Vec<DictionaryCandidate> {
    document
        .descendants()
        .filter(|node| node.is_element() && matcher.is_record(node))
        .map(DictionaryCandidate::from_node)
        .collect()
}

/// Parse a descriptor and pick the first record serving `language`
///
/// Returns `Ok(None)` when the descriptor is well-formed but has no match.
pub fn parse_descriptor(
    content: &str,
    origin_url: &str,
    language: &str,
    matcher: &dyn RecordMatcher,
) -> Result<Option<ResolvedDictionary>> {
    let document =
        Document::parse(content).map_err(|source| DictionaryError::InvalidDescriptor {
            url: format!("{origin_url}/{DESCRIPTOR_FILE}"),
            source,
        })?;

    let resolved = candidates(&document, matcher)
        .into_iter()
        .find(|candidate| candidate.serves(language))
        .and_then(|candidate| {
            let download_url = candidate.url(origin_url)?;
            Some(ResolvedDictionary {
                download_url,
                locales: candidate.locales,
            })
        });

    Ok(resolved)
}

/// Download the descriptor under `origin_url`
///
/// Any transport failure means "no descriptor" and yields `None`.
pub fn fetch_descriptor(transport: &dyn Transport, origin_url: &str) -> Option<Descriptor> {
    let url = format!("{origin_url}/{DESCRIPTOR_FILE}");
    tracing::debug!("Fetching descriptor {}", url);

    match transport.get(&url) {
        Ok(bytes) => Some(Descriptor {
            origin_url: origin_url.to_string(),
            content: String::from_utf8_lossy(&bytes).into_owned(),
        }),
        Err(e) => {
            tracing::debug!("No descriptor at {}: {}", url, e);
            None
        }
    }
}
