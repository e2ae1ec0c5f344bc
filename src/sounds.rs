//! Sound reference table
//!
//! Maps MusicXML sound identifiers (`brass.trumpet`, `wind.flutes.flute`, ...)
//! to their ordinal position in a `sounds.xml`-style table. The index is
//! built once and only read afterwards, so it can be shared freely.

use std::collections::HashMap;
use std::path::Path;

use roxmltree::{Document, ParsingOptions};

use crate::errors::SoundTableError;

#[derive(Debug, Clone, Default)]
pub struct SoundIndex {
    ordinals: HashMap<String, usize>,
    len: usize,
}

impl SoundIndex {
    /// Build from identifiers in table order. Ordinals count every entry,
    /// and the first occurrence of a repeated identifier keeps its position.
    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut ordinals = HashMap::new();
        let mut len = 0;
        for (position, id) in ids.into_iter().enumerate() {
            ordinals.entry(id.into()).or_insert(position);
            len = position + 1;
        }
        Self { ordinals, len }
    }

    /// Parse a sound table document
    ///
    /// ```xml
    /// <sounds>
    ///   <sound id="brass.alphorn"/>
    ///   <sound id="brass.bugle"/>
    /// </sounds>
    /// ```
    pub fn parse(xml: &str) -> Result<Self, SoundTableError> {
        // The published sounds.xml carries a DOCTYPE
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let doc = Document::parse_with_options(xml, options)?;

        let root = doc.root_element();
        if root.tag_name().name() != "sounds" {
            return Err(SoundTableError::UnexpectedRoot(
                root.tag_name().name().to_string(),
            ));
        }

        let mut ids = Vec::new();
        for node in root.children().filter(|n| n.is_element()) {
            if node.tag_name().name() != "sound" {
                continue;
            }
            match node.attribute("id") {
                Some(id) => ids.push(id.trim().to_string()),
                None => log::warn!("Skipping <sound> without id in sound table"),
            }
        }

        let index = Self::from_ids(ids);
        log::info!("Loaded sound table with {} entries", index.len());
        Ok(index)
    }

    /// Read and parse a sound table file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SoundTableError> {
        let xml = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&xml)
    }

    /// Ordinal of `id`, or `None` when the table does not list it
    pub fn lookup(&self, id: &str) -> Option<usize> {
        self.ordinals.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ordinals.contains_key(id)
    }

    /// Number of table entries, duplicates included
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
