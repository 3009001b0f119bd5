//! Search criteria for [`Example`](super::Example) listings.

use serde::Deserialize;

use coresuit_core::types::filter::FilterField;

/// Optional substring filters. Blank terms are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExampleSearch {
    /// Case-insensitive fragment of the name.
    #[serde(default, alias = "name")]
    pub name: Option<String>,
    /// Case-insensitive fragment of the description.
    #[serde(default, alias = "description")]
    pub description: Option<String>,
}

impl ExampleSearch {
    /// Translate the criteria into `ILIKE '%term%'` filters. Terms are
    /// used as given, surrounding whitespace included.
    pub fn filters(&self) -> Vec<FilterField> {
        [("Name", &self.name), ("Description", &self.description)]
            .into_iter()
            .filter_map(|(field, term)| {
                let term = term.as_deref()?;
                (!term.trim().is_empty()).then(|| FilterField::contains(field, term))
            })
            .collect()
    }
}
