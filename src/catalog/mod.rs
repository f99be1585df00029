//! The fixed deal catalog and its vector index.
//!
//! Deal texts are rendered once when the catalog is built and never change afterwards;
//! both the retrieval vectors and the rerank pairs are computed from them.

pub mod deal;
pub mod error;
pub mod index;


pub use deal::{Deal, NumberSpelling, TextStyle};
pub use error::CatalogError;
pub use index::CatalogIndex;

use std::io::Read;
use std::path::Path;

use csv::StringRecord;
use tracing::info;

/// A deal with its rendered text.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    deal: Deal,
    text: String,
}

impl CatalogEntry {
    pub fn new(deal: Deal) -> Self {
        Self::with_style(deal, TextStyle::default())
    }

    pub fn with_style(deal: Deal, style: TextStyle) -> Self {
        let text = deal.render_text_with(style);
        Self { deal, text }
    }

    pub fn deal(&self) -> &Deal {
        &self.deal
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered, immutable list of deals. Insertion order is the tie-break order for ranking.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn from_deals(deals: Vec<Deal>) -> Result<Self, CatalogError> {
        Self::from_deals_with(deals, TextStyle::default())
    }

    pub fn from_deals_with(deals: Vec<Deal>, style: TextStyle) -> Result<Self, CatalogError> {
        if deals.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(Self {
            entries: deals
                .into_iter()
                .map(|deal| CatalogEntry::with_style(deal, style))
                .collect(),
        })
    }

    /// Parses headered CSV rows; unknown columns are ignored.
    ///
    /// Baths and payment are spelled as integers in the deal text when every row of
    /// that column holds an integer.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, CatalogError> {
        let mut reader = csv::Reader::from_reader(reader);
        let headers = reader.headers()?.clone();
        let records = reader
            .records()
            .collect::<Result<Vec<StringRecord>, _>>()?;

        let style = TextStyle {
            baths: column_spelling(&headers, &records, "baths"),
            payment: column_spelling(&headers, &records, "estimated_monthly_payment"),
        };
        let deals = records
            .iter()
            .map(|record| record.deserialize::<Deal>(Some(&headers)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_deals_with(deals, style)
    }

    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(std::io::BufReader::new(file))?;
        info!(path = %path.display(), deals = catalog.len(), "Catalog loaded");
        Ok(catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }
}

fn column_spelling(headers: &StringRecord, records: &[StringRecord], column: &str) -> NumberSpelling {
    match headers.iter().position(|name| name == column) {
        Some(at) => NumberSpelling::infer(records.iter().filter_map(|record| record.get(at))),
        None => NumberSpelling::default(),
    }
}
