//! Sector code table.

use std::collections::BTreeMap;

use tracing::{debug, info};

use hapi_db::Session;
use hapi_ingest::{ALL, CodeRow, TagPattern};
use hapi_map::CodeTable;
use hapi_model::Sector;

use crate::error::Result;

/// Sectors that appear in source data but not in the reference list.
pub const EXTRA_SECTORS: [(&str, &str); 4] = [
    ("Cash", "Cash programming"),
    ("Hum", "Humanitarian assistance (unspecified)"),
    ("Multi", "Multi-sector (unspecified)"),
    (ALL, "All"),
];

/// Resolves free-text sector names and column tags to sector codes.
#[derive(Debug, Clone, Default)]
pub struct SectorResolver {
    table: CodeTable,
    patterns: Vec<(TagPattern, String)>,
}

impl SectorResolver {
    pub fn new(sector_map: BTreeMap<String, String>) -> Self {
        Self {
            table: CodeTable::new(sector_map),
            patterns: Vec::new(),
        }
    }

    /// Store the reference sectors plus [`EXTRA_SECTORS`].
    ///
    /// The `*` sector is stored but never matched by name or tag.
    pub fn populate<S, I>(&mut self, session: &mut S, rows: I) -> Result<usize>
    where
        S: Session,
        I: IntoIterator<Item = CodeRow>,
    {
        let extras = EXTRA_SECTORS.iter().map(|(code, name)| CodeRow {
            code: (*code).to_string(),
            display_name: (*name).to_string(),
        });
        let mut sectors = Vec::new();
        for row in rows.into_iter().chain(extras) {
            if row.code != ALL {
                self.register(&row);
            }
            sectors.push(Sector {
                code: row.code,
                name: row.display_name,
            });
        }
        let inserted = session.insert_batch(&sectors)?;
        session.commit()?;
        info!(sectors = sectors.len(), inserted, "populated sectors");
        Ok(inserted)
    }

    fn register(&mut self, row: &CodeRow) {
        self.table.insert(&row.display_name, &row.code);
        let attribute = row.code.to_lowercase().replace('-', "_");
        match TagPattern::parse(&format!("#*+{attribute}")) {
            Ok(pattern) => self.patterns.push((pattern, row.code.clone())),
            Err(err) => debug!(code = %row.code, %err, "sector code has no tag pattern"),
        }
    }

    /// Resolve a sector name, remembering phonetic matches for the run.
    pub fn get_code(&mut self, name: &str) -> Option<String> {
        let code = self.table.get_code(name);
        if code.is_none() {
            debug!(sector = name, "unmatched sector");
        }
        code
    }

    /// Sector whose code appears as an attribute of `tag`.
    pub fn code_for_tag(&self, tag: &str) -> Option<&str> {
        self.patterns
            .iter()
            .find(|(pattern, _)| pattern.matches(tag))
            .map(|(_, code)| code.as_str())
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.table.contains_code(code)
    }

    pub fn learned(&self) -> &BTreeMap<String, String> {
        self.table.user_mapping()
    }
}
