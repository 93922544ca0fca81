use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use proptest::prelude::*;

use hapi_core::{AdminHierarchy, AdminLookupError, Locations};
use hapi_db::{Session, Table, Warehouse};
use hapi_ingest::{CountryRow, GeoRow, IngestError};
use hapi_model::{Admin1, Admin2, AdminLevel, Granularity};

type Row = Result<GeoRow, IngestError>;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2022, 1, day).unwrap()
}

fn locations(db: &mut Warehouse, codes: &[&str]) -> Locations {
    let tracked: BTreeSet<&str> = codes.iter().copied().collect();
    let rows = codes.iter().map(|code| {
        Ok(CountryRow {
            country_code_iso3: (*code).to_string(),
            country_name_preferred: format!("Country {code}"),
            date_start: date(1),
        })
    });
    Locations::populate(db, rows, &tracked).unwrap()
}

fn geo(level: &str, code: &str, parent: &str, country: &str) -> Row {
    Ok(GeoRow {
        admin_level: level.to_string(),
        adm_code: code.to_string(),
        adm_name: format!("Unit {code}"),
        adm_code_parent: Some(parent.to_string()),
        date_start: Some(date(2)),
        country_code: country.to_string(),
        line: 0,
    })
}

fn afghanistan() -> Vec<Row> {
    vec![geo("1", "AF01", "AFG", "AFG"), geo("2", "AF0101", "AF01", "AFG")]
}

#[test]
fn single_country_yields_real_and_connector_units() {
    let mut db = Warehouse::open_in_memory().unwrap();
    let locations = locations(&mut db, &["AFG"]);
    let mut admins = AdminHierarchy::new(1000);
    let stats = admins
        .build(&mut db, &locations, afghanistan(), &BTreeMap::new())
        .unwrap();

    assert_eq!(db.count(Table::Location).unwrap(), 1);
    assert_eq!(db.count(Table::Admin1).unwrap(), 2);
    // AF0101 plus one connector under each admin1, AFG-XXX included.
    assert_eq!(db.count(Table::Admin2).unwrap(), 3);
    assert_eq!(stats.connectors, 3);

    let codes: Vec<&str> = admins.codes(AdminLevel::Two).collect();
    assert_eq!(codes, ["AF01-XXX", "AF0101", "AFG-XXX-XXX"]);
    assert!(admins.lookup(AdminLevel::One, "AFG-XXX").is_ok());
    assert!(admins.admin2_ref_for("AF01", Granularity::AdminOne).is_ok());
    assert!(admins.admin2_ref_for("AFG", Granularity::National).is_ok());
    assert_eq!(
        admins.admin2_ref_for("AF02", Granularity::AdminOne),
        Err(AdminLookupError::MissingAdminCode {
            level: AdminLevel::Two,
            code: "AF02-XXX".to_string(),
        })
    );
}

#[test]
fn connector_inherits_location_start() {
    let mut db = Warehouse::open_in_memory().unwrap();
    let locations = locations(&mut db, &["AFG"]);
    let mut admins = AdminHierarchy::new(1000);
    admins
        .build(&mut db, &locations, afghanistan(), &BTreeMap::new())
        .unwrap();

    let connector = admins.node(AdminLevel::One, "AFG-XXX").unwrap();
    assert_eq!(connector.start, date(1));
    assert_eq!(connector.location, "AFG");
    assert_eq!(admins.node(AdminLevel::Two, "AF0101").unwrap().start, date(2));
}

#[test]
fn missing_start_dates_fall_back_to_the_parent() {
    let mut db = Warehouse::open_in_memory().unwrap();
    let locations = locations(&mut db, &["AFG"]);
    let mut admin1 = geo("1", "AF01", "AFG", "AFG");
    if let Ok(row) = &mut admin1 {
        row.date_start = None;
    }
    let mut admin2 = geo("2", "AF0101", "AF01", "AFG");
    if let Ok(row) = &mut admin2 {
        row.date_start = None;
    }
    let mut admins = AdminHierarchy::new(1000);
    admins
        .build(&mut db, &locations, vec![admin1, admin2], &BTreeMap::new())
        .unwrap();

    assert_eq!(admins.node(AdminLevel::One, "AF01").unwrap().start, date(1));
    assert_eq!(admins.node(AdminLevel::Two, "AF0101").unwrap().start, date(1));
}

#[test]
fn unknown_admin_levels_are_skipped() {
    let mut db = Warehouse::open_in_memory().unwrap();
    let locations = locations(&mut db, &["AFG"]);
    let mut rows = afghanistan();
    rows.push(geo("3", "AF010101", "AF0101", "AFG"));
    let mut admins = AdminHierarchy::new(1000);
    let stats = admins
        .build(&mut db, &locations, rows, &BTreeMap::new())
        .unwrap();

    assert_eq!(stats.skipped, 1);
    assert!(admins.admin_level_of("AF010101").is_err());
    assert_eq!(db.count(Table::Admin2).unwrap(), 3);
}

#[test]
fn rebuilding_is_idempotent() {
    let mut db = Warehouse::open_in_memory().unwrap();
    let locations = locations(&mut db, &["AFG"]);
    AdminHierarchy::new(1)
        .build(&mut db, &locations, afghanistan(), &BTreeMap::new())
        .unwrap();
    let mut again = AdminHierarchy::new(1);
    let stats = again
        .build(&mut db, &locations, afghanistan(), &BTreeMap::new())
        .unwrap();

    assert_eq!(stats.connectors, 0);
    assert_eq!(db.count(Table::Admin1).unwrap(), 2);
    assert_eq!(db.count(Table::Admin2).unwrap(), 3);
    assert!(again.lookup(AdminLevel::Two, "AF0101").is_ok());
}

#[test]
fn orphans_are_rerouted_and_missing_parents_skipped() {
    let mut db = Warehouse::open_in_memory().unwrap();
    let locations = locations(&mut db, &["AFG", "SSD"]);
    let mut rows = afghanistan();
    rows.push(geo("2", "SS0001", "SS00", "SSD"));
    rows.push(geo("2", "AF9901", "AF99", "AFG"));
    rows.push(geo("1", "FR01", "FRA", "FRA"));
    let orphans = BTreeMap::from([("SS0001".to_string(), "SSD".to_string())]);

    let mut admins = AdminHierarchy::new(1000);
    let stats = admins.build(&mut db, &locations, rows, &orphans).unwrap();

    assert_eq!(stats.rerouted, 1);
    assert_eq!(stats.skipped, 1);
    let abyei = db
        .load::<Admin2>()
        .unwrap()
        .into_iter()
        .find(|(_, admin)| admin.code == "SS0001")
        .map(|(_, admin)| admin.admin1_ref);
    assert_eq!(abyei, admins.lookup(AdminLevel::One, "SSD-XXX").ok());
    assert!(admins.lookup(AdminLevel::Two, "AF9901").is_err());
    assert!(admins.lookup(AdminLevel::One, "FR01").is_err());
}

#[test]
fn lookups_before_build_report_not_built() {
    let admins = AdminHierarchy::new(10);
    assert_eq!(
        admins.lookup(AdminLevel::One, "AF01"),
        Err(AdminLookupError::NotBuilt {
            level: AdminLevel::One
        })
    );
    assert!(admins.admin_level_of("AF01").is_err());
}

#[test]
fn admin_level_of_finds_each_level() {
    let mut db = Warehouse::open_in_memory().unwrap();
    let locations = locations(&mut db, &["AFG"]);
    let mut admins = AdminHierarchy::new(1000);
    admins
        .build(&mut db, &locations, afghanistan(), &BTreeMap::new())
        .unwrap();

    assert_eq!(admins.admin_level_of("AF01"), Ok(AdminLevel::One));
    assert_eq!(admins.admin_level_of("AF0101"), Ok(AdminLevel::Two));
    assert!(matches!(
        admins.admin_level_of("AF02"),
        Err(AdminLookupError::MissingAdminCode { .. })
    ));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn every_built_unit_has_one_connector_and_resolves(
        admin1_count in 0usize..4,
        admin2_per_admin1 in 0usize..4,
        commit_limit in 1usize..5,
    ) {
        let mut db = Warehouse::open_in_memory().unwrap();
        let locations = locations(&mut db, &["AFG"]);
        let mut rows = Vec::new();
        for a in 1..=admin1_count {
            let admin1 = format!("AF{a:02}");
            rows.push(geo("1", &admin1, "AFG", "AFG"));
            for b in 1..=admin2_per_admin1 {
                rows.push(geo("2", &format!("{admin1}{b:02}"), &admin1, "AFG"));
            }
        }
        let mut admins = AdminHierarchy::new(commit_limit);
        admins.build(&mut db, &locations, rows, &BTreeMap::new()).unwrap();

        let admin1 = db.load::<Admin1>().unwrap();
        let admin2 = db.load::<Admin2>().unwrap();
        prop_assert_eq!(admin1.iter().filter(|(_, a)| a.is_unspecified).count(), 1);
        for (id, _) in &admin1 {
            let connectors = admin2
                .iter()
                .filter(|(_, a)| a.is_unspecified && a.admin1_ref == *id)
                .count();
            prop_assert_eq!(connectors, 1);
        }
        for code in admins.codes(AdminLevel::Two) {
            prop_assert!(admins.lookup(AdminLevel::Two, code).is_ok());
        }
        prop_assert_eq!(
            admin2.len(),
            admin1_count * admin2_per_admin1 + admin1_count + 1
        );
    }
}
