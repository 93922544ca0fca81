//! HAPI warehouse DDL.

pub const SQLITE_SCHEMA_VERSION: i64 = 1;

pub(crate) const PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;
PRAGMA temp_store = MEMORY;
";

pub(crate) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS location (
  id INTEGER PRIMARY KEY,
  code TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL,
  reference_period_start TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS admin1 (
  id INTEGER PRIMARY KEY,
  location_ref INTEGER NOT NULL REFERENCES location(id),
  code TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL,
  is_unspecified INTEGER NOT NULL DEFAULT 0,
  reference_period_start TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS admin2 (
  id INTEGER PRIMARY KEY,
  admin1_ref INTEGER NOT NULL REFERENCES admin1(id),
  code TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL,
  is_unspecified INTEGER NOT NULL DEFAULT 0,
  reference_period_start TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS org_type (
  id INTEGER PRIMARY KEY,
  code TEXT NOT NULL UNIQUE,
  description TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS sector (
  id INTEGER PRIMARY KEY,
  code TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS org (
  id INTEGER PRIMARY KEY,
  identity TEXT NOT NULL UNIQUE,
  acronym TEXT NOT NULL,
  name TEXT NOT NULL,
  org_type_code TEXT REFERENCES org_type(code),
  reference_period_start TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS dataset (
  id INTEGER PRIMARY KEY,
  hdx_id TEXT NOT NULL UNIQUE,
  hdx_stub TEXT NOT NULL,
  title TEXT NOT NULL,
  hdx_provider_stub TEXT NOT NULL,
  hdx_provider_name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS resource (
  id INTEGER PRIMARY KEY,
  dataset_ref INTEGER NOT NULL REFERENCES dataset(id),
  hdx_id TEXT NOT NULL UNIQUE,
  name TEXT NOT NULL,
  format TEXT NOT NULL,
  update_date TEXT NOT NULL,
  is_hxl INTEGER NOT NULL,
  download_url TEXT NOT NULL,
  content_sha256 TEXT
);
CREATE TABLE IF NOT EXISTS population (
  id INTEGER PRIMARY KEY,
  resource_ref INTEGER NOT NULL REFERENCES resource(id),
  admin2_ref INTEGER NOT NULL REFERENCES admin2(id),
  gender TEXT NOT NULL,
  age_range TEXT NOT NULL,
  min_age INTEGER,
  max_age INTEGER,
  population INTEGER NOT NULL,
  reference_period_start TEXT NOT NULL,
  reference_period_end TEXT
);
CREATE TABLE IF NOT EXISTS operational_presence (
  id INTEGER PRIMARY KEY,
  resource_ref INTEGER NOT NULL REFERENCES resource(id),
  admin2_ref INTEGER NOT NULL REFERENCES admin2(id),
  org_ref INTEGER NOT NULL REFERENCES org(id),
  sector_code TEXT NOT NULL REFERENCES sector(code),
  reference_period_start TEXT NOT NULL,
  reference_period_end TEXT
);
CREATE INDEX IF NOT EXISTS idx_admin1_location ON admin1(location_ref);
CREATE INDEX IF NOT EXISTS idx_admin2_admin1 ON admin2(admin1_ref);
CREATE INDEX IF NOT EXISTS idx_population_admin2 ON population(admin2_ref);
CREATE INDEX IF NOT EXISTS idx_operational_presence_admin2 ON operational_presence(admin2_ref);
";
