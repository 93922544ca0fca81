use std::fs;
use std::path::Path;

use tempfile::TempDir;

use hapi_config::{Theme, load_config};
use hapi_core::{Pipelines, ThemeStatus};
use hapi_db::{Session, Table, Warehouse};
use hapi_model::Org;

const COUNTRIES: &str = "\
ISO3,Name,Start
#country+code+v_iso3,#country+name+preferred,#date+start
AFG,Afghanistan,2021-11-17
FRA,France,2021-11-17
";

const ADMINS: &str = "\
Level,Code,Name,Parent,Start,Country
#geo+admin_level,#adm+code,#adm+name,#adm+code+parent,#date+start,#country+code
1,AF01,Kabul,AFG,2022-01-01,AFG
2,AF0101,Kabul District,AF01,2022-01-01,AFG
1,FR01,Ile-de-France,FRA,2022-01-01,FRA
";

const ORG_TYPES: &str = "\
#org+type+code+v_hrinfo,#org+type+preferred
437,International NGO
441,National NGO
";

const SECTORS: &str = "\
#sector+code+acronym,#sector+name+preferred+i_en
HEA,Health
WSH,Water Sanitation Hygiene
EDU,Education
";

const ORG_ALIASES: &str = "\
Pattern,Name,Acronym,Type,Country
#x_pattern,#org+name,#org+acronym,#org+type+code,#country+code
Action contre la Faim,Action Against Hunger,AAH,437,
";

const CONFIG: &str = r#"
commit_limit = 2
tracked_countries = ["AFG"]

[sector_map]
wash = "WSH"

[sources]
countries = "countries.csv"
admins = "admins.csv"
org_aliases = "org_aliases.csv"
sectors = "sectors.csv"
org_types = "org_types.csv"

[themes]
population = "population.json"
operational_presence = "operational_presence.json"
"#;

fn dataset(id: &str, stub: &str, resource: &str) -> String {
    format!(
        r##""dataset": {{
            "hdx_id": "{id}",
            "hdx_stub": "{stub}",
            "title": "{stub}",
            "hdx_provider_stub": "ocha",
            "hdx_provider_name": "OCHA",
            "resources": [{{
                "hdx_id": "{resource}",
                "name": "{stub}.csv",
                "format": "csv",
                "update_date": "2023-06-01",
                "is_hxl": true,
                "download_url": "https://data.example.org/{stub}.csv"
            }}]
        }},
        "time_period": {{"start": "2023-01-01", "end": "2023-12-31"}}"##
    )
}

fn population(tag: &str) -> String {
    format!(
        r##"{{"datasets": [{{
            {},
            "results": {{
                "national": {{
                    "resource_id": "r-pop",
                    "columns": {{
                        "{tag}": {{"AFG": ["41000000"]}},
                        "#population+f+age_65_plus": {{"AFG": [1200]}}
                    }}
                }},
                "admintwo": {{
                    "resource_id": "r-pop",
                    "columns": {{
                        "{tag}": {{"AF0101": ["5000"], "AF9999": ["12"]}}
                    }}
                }}
            }}
        }}]}}"##,
        dataset("d-pop", "afg-pop", "r-pop")
    )
}

fn operational_presence() -> String {
    format!(
        r##"{{"datasets": [{{
            {},
            "results": {{
                "admintwo": {{
                    "resource_id": "r-3w",
                    "columns": {{
                        "#org+name": {{"AF0101": ["Action contre la Faim", "Action Against Hunger", "Action Against Hunger", "Unknown Relief"]}},
                        "#org+acronym": {{"AF0101": ["ACF", "AAH", "AAH", "UR"]}},
                        "#org +type +name": {{"AF0101": ["International NGO", "", "", "National NGO"]}},
                        "#sector": {{"AF0101": ["Health", "Health", "WASH", "Astrology"]}}
                    }}
                }}
            }}
        }}]}}"##,
        dataset("d-3w", "afg-3w", "r-3w")
    )
}

fn write_fixtures(dir: &Path, population_tag: &str) {
    fs::write(dir.join("countries.csv"), COUNTRIES).unwrap();
    fs::write(dir.join("admins.csv"), ADMINS).unwrap();
    fs::write(dir.join("org_types.csv"), ORG_TYPES).unwrap();
    fs::write(dir.join("sectors.csv"), SECTORS).unwrap();
    fs::write(dir.join("org_aliases.csv"), ORG_ALIASES).unwrap();
    fs::write(dir.join("population.json"), population(population_tag)).unwrap();
    fs::write(dir.join("operational_presence.json"), operational_presence()).unwrap();
    fs::write(dir.join("hapi.toml"), CONFIG).unwrap();
}

fn run(dir: &TempDir, session: Warehouse) -> (hapi_core::RunSummary, Pipelines<Warehouse>) {
    let config = load_config(&dir.path().join("hapi.toml")).unwrap();
    let mut pipelines = Pipelines::new(config, session);
    pipelines.run().unwrap();
    let summary = pipelines.output().unwrap();
    (summary, pipelines)
}

#[test]
fn full_run_populates_reference_and_themes() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), "#population+total");
    let (summary, pipelines) = run(&dir, Warehouse::open_in_memory().unwrap());

    assert!(!summary.has_failures());
    assert_eq!(summary.rows(Table::Location), 1);
    assert_eq!(summary.rows(Table::Admin1), 2);
    assert_eq!(summary.rows(Table::Admin2), 3);
    assert_eq!(summary.rows(Table::Sector), 7);
    assert_eq!(summary.rows(Table::OrgType), 6);
    assert_eq!(summary.rows(Table::Dataset), 2);
    assert_eq!(summary.rows(Table::Resource), 2);
    assert_eq!(summary.rows(Table::Population), 3);
    assert_eq!(summary.rows(Table::OperationalPresence), 2);

    assert!(
        summary
            .messages
            .warnings
            .iter()
            .any(|message| message == "afg-pop - admin code AF9999 not found")
    );
    assert!(
        summary
            .messages
            .errors
            .iter()
            .any(|message| message == "afg-3w - Sector Astrology not found")
    );

    let presence = summary
        .themes
        .iter()
        .find(|outcome| outcome.theme == Theme::OperationalPresence)
        .unwrap();
    match &presence.status {
        ThemeStatus::Completed(report) => assert_eq!(report.duplicates, 1),
        other => panic!("unexpected status {other:?}"),
    }

    // Both spellings land on one canonical organisation.
    let aah = pipelines.aliases().get("Action Against Hunger").unwrap();
    assert!(aah.contains("Action contre la Faim"));
    assert!(aah.contains("Action Against Hunger"));
    let orgs = pipelines.session().load::<Org>().unwrap();
    let acronyms: Vec<&str> = orgs.iter().map(|(_, org)| org.acronym.as_str()).collect();
    assert_eq!(acronyms.iter().filter(|a| **a == "AAH").count(), 1);
    assert_eq!(
        orgs.iter()
            .find(|(_, org)| org.acronym == "AAH")
            .and_then(|(_, org)| org.org_type_code.as_deref()),
        Some("437")
    );
}

#[test]
fn failing_theme_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), "#population+adults");
    let (summary, _) = run(&dir, Warehouse::open_in_memory().unwrap());

    assert!(summary.has_failures());
    let failed: Vec<Theme> = summary.failed_themes().map(|outcome| outcome.theme).collect();
    assert_eq!(failed, [Theme::Population]);
    assert_eq!(summary.rows(Table::Population), 0);
    assert_eq!(summary.rows(Table::OperationalPresence), 2);
}

#[test]
fn failed_theme_leaves_no_fact_rows_behind() {
    let dir = tempfile::tempdir().unwrap();
    // `+f+age_65_plus` sorts before the malformed column, so one row is
    // written before the theme fails.
    write_fixtures(dir.path(), "#population+zz");
    fs::write(
        dir.path().join("hapi.toml"),
        CONFIG.replace("commit_limit = 2", "commit_limit = 1"),
    )
    .unwrap();
    let config = load_config(&dir.path().join("hapi.toml")).unwrap();
    let mut pipelines = Pipelines::new(config, Warehouse::open_in_memory().unwrap())
        .with_themes(vec![Theme::Population]);
    pipelines.run().unwrap();
    let summary = pipelines.output().unwrap();

    let failed: Vec<Theme> = summary.failed_themes().map(|outcome| outcome.theme).collect();
    assert_eq!(failed, [Theme::Population]);
    assert_eq!(summary.rows(Table::Population), 0);
    // Provenance is reference data and survives the failure.
    assert_eq!(summary.rows(Table::Dataset), 1);
}

#[test]
fn theme_outcomes_serialise_with_a_status_tag() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), "#population+adults");
    let (summary, _) = run(&dir, Warehouse::open_in_memory().unwrap());

    let outcomes = serde_json::to_value(&summary.themes).unwrap();
    assert_eq!(outcomes[0]["theme"], "population");
    assert_eq!(outcomes[0]["status"], "failed");
    assert!(
        outcomes[0]["error"]
            .as_str()
            .is_some_and(|error| error.contains("#population+adults"))
    );
    assert_eq!(outcomes[1]["theme"], "operational_presence");
    assert_eq!(outcomes[1]["status"], "completed");
    assert_eq!(outcomes[1]["rows"], 2);
    assert_eq!(outcomes[1]["duplicates"], 1);
}

#[test]
fn theme_selection_limits_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), "#population+total");
    let config = load_config(&dir.path().join("hapi.toml")).unwrap();
    let mut pipelines = Pipelines::new(config, Warehouse::open_in_memory().unwrap())
        .with_themes(vec![Theme::Population]);
    pipelines.run().unwrap();
    let summary = pipelines.output().unwrap();

    assert_eq!(summary.themes.len(), 1);
    assert_eq!(summary.rows(Table::OperationalPresence), 0);
    assert_eq!(summary.rows(Table::Org), 0);
}

#[test]
fn rerun_against_same_warehouse_keeps_reference_tables() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), "#population+total");
    let db_path = dir.path().join("hapi.sqlite");

    let (first, _) = run(&dir, Warehouse::open(&db_path).unwrap());
    let (second, _) = run(&dir, Warehouse::open(&db_path).unwrap());

    for table in [
        Table::Location,
        Table::Admin1,
        Table::Admin2,
        Table::OrgType,
        Table::Sector,
        Table::Org,
        Table::Dataset,
        Table::Resource,
    ] {
        assert_eq!(first.rows(table), second.rows(table), "{table}");
    }
}

#[test]
fn missing_reference_file_aborts_the_run() {
    let dir = tempfile::tempdir().unwrap();
    write_fixtures(dir.path(), "#population+total");
    fs::remove_file(dir.path().join("admins.csv")).unwrap();
    let config = load_config(&dir.path().join("hapi.toml")).unwrap();
    let mut pipelines = Pipelines::new(config, Warehouse::open_in_memory().unwrap());

    let err = pipelines.run().unwrap_err();
    assert!(err.to_string().contains("admins.csv"), "{err}");
}
