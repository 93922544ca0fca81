use std::fs;
use std::path::PathBuf;

use hapi_config::{ConfigError, Theme, load_config};

const CONFIG: &str = r#"
commit_limit = 250
tracked_countries = ["AFG", "SSD"]
database = "out/hapi.sqlite"

[orphan_admin2s]
SS0001 = "SSD"

[sector_map]
wash = "WSH"
sante = "HEA"

[org_type_map]
ingo = "437"

[sources]
countries = "reference/countries.csv"
admins = "/srv/hapi/global_pcodes.csv"
org_aliases = "reference/org_mapping.csv"
sectors = "reference/sectors.csv"
org_types = "reference/org_types.csv"

[themes]
operational_presence = "results/operational_presence.json"
"#;

#[test]
fn relative_paths_resolve_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hapi.toml");
    fs::write(&path, CONFIG).unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.commit_limit, 250);
    assert_eq!(config.database, dir.path().join("out/hapi.sqlite"));
    assert_eq!(
        config.sources.countries,
        dir.path().join("reference/countries.csv")
    );
    assert_eq!(
        config.sources.admins,
        PathBuf::from("/srv/hapi/global_pcodes.csv")
    );
    assert_eq!(config.orphan_admin2s["SS0001"], "SSD");
    assert_eq!(config.sector_map.len(), 2);

    let themes = config.themes.configured();
    assert_eq!(themes.len(), 1);
    assert_eq!(themes[0].0, Theme::OperationalPresence);
    assert_eq!(
        themes[0].1,
        dir.path().join("results/operational_presence.json")
    );
}

#[test]
fn missing_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
