//! Organisation type code table.

use std::collections::BTreeMap;

use tracing::{debug, info};

use hapi_db::Session;
use hapi_ingest::CodeRow;
use hapi_map::CodeTable;
use hapi_model::OrgType;

use crate::error::Result;

/// Types used by source data but missing from the reference list.
pub const EXTRA_ORG_TYPES: [(&str, &str); 4] = [
    ("501", "Civil Society"),
    ("502", "Observer"),
    ("503", "Development Programme"),
    ("504", "Local NGO"),
];

#[derive(Debug, Clone, Default)]
pub struct OrgTypeResolver {
    table: CodeTable,
}

impl OrgTypeResolver {
    pub fn new(org_type_map: BTreeMap<String, String>) -> Self {
        Self {
            table: CodeTable::new(org_type_map),
        }
    }

    /// Store the reference types plus [`EXTRA_ORG_TYPES`].
    pub fn populate<S, I>(&mut self, session: &mut S, rows: I) -> Result<usize>
    where
        S: Session,
        I: IntoIterator<Item = CodeRow>,
    {
        let extras = EXTRA_ORG_TYPES.iter().map(|(code, description)| CodeRow {
            code: (*code).to_string(),
            display_name: (*description).to_string(),
        });
        let mut org_types = Vec::new();
        for row in rows.into_iter().chain(extras) {
            self.table.insert(&row.display_name, &row.code);
            org_types.push(OrgType {
                code: row.code,
                description: row.display_name,
            });
        }
        let inserted = session.insert_batch(&org_types)?;
        session.commit()?;
        info!(org_types = org_types.len(), inserted, "populated org types");
        Ok(inserted)
    }

    pub fn get_code(&mut self, name: &str) -> Option<String> {
        let code = self.table.get_code(name);
        if code.is_none() {
            debug!(org_type = name, "unmatched org type");
        }
        code
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.table.contains_code(code)
    }

    pub fn learned(&self) -> &BTreeMap<String, String> {
        self.table.user_mapping()
    }
}
