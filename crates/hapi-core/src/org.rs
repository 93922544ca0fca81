//! Organisation reconciliation.
//!
//! Organisation names arrive in many spellings. An alias table maps known
//! variants (optionally per country) to a canonical name, acronym and type;
//! everything else is taken as written. Two spellings that clean to the same
//! `(acronym, name)` identity are the same organisation.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use hapi_db::{Session, Table};
use hapi_ingest::OrgAliasRow;
use hapi_map::{clean_name, org_identity};
use hapi_model::{Org, RowId};

use crate::error::Result;

/// Longest acronym the warehouse stores.
pub const MAX_ACRONYM_CHARS: usize = 32;

/// Start date given to organisations first seen in a run.
pub fn org_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 11, 21).unwrap_or_default()
}

/// What the alias table knows about a raw organisation string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgInfo {
    pub name: String,
    pub acronym: Option<String>,
    pub type_code: Option<String>,
}

impl OrgInfo {
    fn verbatim(raw: &str) -> Self {
        Self {
            name: raw.to_string(),
            acronym: None,
            type_code: None,
        }
    }
}

/// An organisation after matching, identified by its cleaned identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgMatch {
    pub identity: String,
    pub acronym: String,
    pub name: String,
    pub type_code: Option<String>,
    /// Whether this call introduced the organisation.
    pub created: bool,
}

type AliasKey = (Option<String>, String);

#[derive(Debug, Clone)]
pub struct OrgResolver {
    commit_limit: usize,
    reference_date: NaiveDate,
    /// Keyed by `(country, pattern)` as written.
    aliases: BTreeMap<AliasKey, OrgInfo>,
    /// Same entries keyed by the cleaned pattern.
    cleaned_aliases: BTreeMap<AliasKey, OrgInfo>,
    known: BTreeMap<String, Org>,
    staged: Vec<Org>,
    ids: BTreeMap<String, RowId>,
    /// Raw names seen in sources, grouped by the canonical name they matched.
    seen: BTreeMap<String, BTreeSet<String>>,
}

impl OrgResolver {
    pub fn new(commit_limit: usize) -> Self {
        Self {
            commit_limit: commit_limit.max(1),
            reference_date: org_reference_date(),
            aliases: BTreeMap::new(),
            cleaned_aliases: BTreeMap::new(),
            known: BTreeMap::new(),
            staged: Vec::new(),
            ids: BTreeMap::new(),
            seen: BTreeMap::new(),
        }
    }

    /// Load alias rows. Later rows for the same key win.
    pub fn load_alias_table<I>(&mut self, rows: I) -> usize
    where
        I: IntoIterator<Item = OrgAliasRow>,
    {
        let mut loaded = 0;
        for row in rows {
            let info = OrgInfo {
                name: row.org_name,
                acronym: row.org_acronym,
                type_code: row.org_type_code,
            };
            let country = row.country_code;
            self.cleaned_aliases
                .insert((country.clone(), clean_name(&row.pattern)), info.clone());
            self.aliases.insert((country, row.pattern), info);
            loaded += 1;
        }
        debug!(aliases = loaded, "loaded org alias table");
        loaded
    }

    /// Seed identities already stored by an earlier run.
    pub fn preload<S: Session>(&mut self, session: &S) -> Result<()> {
        for (id, org) in session.load::<Org>()? {
            let identity = org_identity(&org.acronym, &org.name);
            self.ids.insert(identity.clone(), id);
            self.known.insert(identity, org);
        }
        Ok(())
    }

    /// Canonical details for `raw`, trying the country-specific alias before
    /// the global one, and the string as written before its cleaned form.
    pub fn get_org_info(&self, raw: &str, country: Option<&str>) -> OrgInfo {
        let country = country.map(str::to_string);
        let cleaned = clean_name(raw);
        let candidates = [
            (&self.aliases, (country.clone(), raw.to_string())),
            (&self.aliases, (None, raw.to_string())),
            (&self.cleaned_aliases, (country, cleaned.clone())),
            (&self.cleaned_aliases, (None, cleaned)),
        ];
        candidates
            .into_iter()
            .find_map(|(table, key)| table.get(&key).cloned())
            .unwrap_or_else(|| OrgInfo::verbatim(raw))
    }

    /// Remember that `raw` was read as `canonical`.
    pub fn record_alias(&mut self, raw: &str, canonical: &str) {
        self.seen
            .entry(canonical.to_string())
            .or_default()
            .insert(raw.to_string());
    }

    pub fn aliases(&self) -> &BTreeMap<String, BTreeSet<String>> {
        &self.seen
    }

    /// Match an organisation against those already known, staging it for
    /// insertion when new.
    ///
    /// The acronym is cut to [`MAX_ACRONYM_CHARS`]. When a known
    /// organisation is met with a different type, the first type is kept.
    pub fn add_or_match_org(
        &mut self,
        acronym: &str,
        name: &str,
        type_code: Option<&str>,
    ) -> OrgMatch {
        let acronym: String = acronym.chars().take(MAX_ACRONYM_CHARS).collect();
        let identity = org_identity(&acronym, name);

        if let Some(existing) = self.known.get(&identity) {
            if let Some(new_type) = type_code
                && existing.org_type_code.as_deref() != Some(new_type)
            {
                warn!(
                    org = %existing.name,
                    kept = existing.org_type_code.as_deref().unwrap_or("none"),
                    ignored = new_type,
                    "conflicting org type"
                );
            }
            return OrgMatch {
                identity,
                acronym: existing.acronym.clone(),
                name: existing.name.clone(),
                type_code: existing.org_type_code.clone(),
                created: false,
            };
        }

        let org = Org {
            acronym: acronym.clone(),
            name: name.to_string(),
            org_type_code: type_code.map(str::to_string),
            reference_period_start: self.reference_date,
        };
        debug!(org = %org.name, "adding org");
        self.known.insert(identity.clone(), org.clone());
        self.staged.push(org);
        OrgMatch {
            identity,
            acronym,
            name: name.to_string(),
            type_code: type_code.map(str::to_string),
            created: true,
        }
    }

    /// Write staged organisations in batches and refresh their ids.
    pub fn flush<S: Session>(&mut self, session: &mut S) -> Result<usize> {
        let mut inserted = 0;
        for chunk in self.staged.chunks(self.commit_limit) {
            inserted += session.insert_batch(chunk)?;
            session.commit()?;
        }
        self.staged.clear();
        self.ids = session.ids_by_key(Table::Org)?;
        if inserted > 0 {
            info!(inserted, "populated orgs");
        }
        Ok(inserted)
    }

    /// Stored id for `identity`, available after [`Self::flush`].
    pub fn org_ref(&self, identity: &str) -> Option<RowId> {
        self.ids.get(identity).copied()
    }

    pub fn pending(&self) -> usize {
        self.staged.len()
    }
}
