use std::path::PathBuf;

use pitch_explorer::data::clean::{consolidate, discover_sources, read_source, CleanError};
use pitch_explorer::data::loader::{load_file, write_file};
use pitch_explorer::data::model::Hand;
use pitch_explorer::data::roster::TeamRoster;

fn sources_dir() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("sources");
    path
}

fn fixture(name: &str) -> PathBuf {
    sources_dir().join(name)
}

fn fixture_file(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn discovers_only_csv_sources_in_name_order() {
    let sources = discover_sources(&sources_dir()).expect("fixture dir should list");
    let names: Vec<_> = sources
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();
    assert_eq!(names, ["bello.csv", "broken.csv", "cole.csv"]);
}

#[test]
fn source_missing_a_column_is_rejected() {
    let err = read_source(&fixture("broken.csv")).unwrap_err();
    assert!(matches!(
        err,
        CleanError::MissingColumn {
            column: "fielder_2",
            ..
        }
    ));
}

#[test]
fn extra_columns_are_ignored() {
    let rows = read_source(&fixture("cole.csv")).expect("cole should load");
    assert_eq!(rows.len(), 8);
    assert_eq!(rows[0].player_name, "Cole, Gerrit");
    assert_eq!(rows[0].effective_speed, Some(95.3));
    assert_eq!(rows[4].events, None);
    assert_eq!(rows[6].pitch_name, None);
}

#[test]
fn repeated_columns_use_the_first_occurrence() {
    let rows = read_source(&fixture_file("savant_export.csv")).expect("export should load");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0].fielder_2, Some(643376.0));
    assert_eq!(rows[1].stand, None);
    assert_eq!(rows[2].balls, Some(2.0));
    assert_eq!(rows[3].stand, None);
}

#[test]
fn unusable_rows_are_dropped_not_the_whole_source() {
    let result = consolidate(&[fixture_file("savant_export.csv")], &TeamRoster::default())
        .expect("export should load");
    let summary = &result.summary;

    assert_eq!(summary.sources_loaded, 1);
    assert_eq!(summary.rows_combined, 4);
    assert_eq!(summary.rows_missing_hand, 2);
    assert_eq!(summary.rows_kept, 2);
    assert_eq!(summary.team_counts.get("Red Sox"), Some(&2));

    let strikeout = &result.events[1];
    assert_eq!(strikeout.events, "strikeout_swinging");
    assert_eq!(strikeout.b_arm, Hand::L);
    assert_eq!(strikeout.balls, Some(2));
    assert_eq!(strikeout.outs_when_up, Some(2));
}

#[test]
fn consolidates_skipping_broken_sources() {
    let sources = discover_sources(&sources_dir()).expect("fixture dir should list");
    let result = consolidate(&sources, &TeamRoster::default()).expect("two sources load");
    let summary = &result.summary;

    assert_eq!(summary.sources_total, 3);
    assert_eq!(summary.sources_loaded, 2);
    assert_eq!(summary.skipped.len(), 1);
    assert!(summary.skipped[0].path.ends_with("broken.csv"));
    assert_eq!(summary.rows_combined, 11);
    assert_eq!(summary.rows_with_events, 10);
    assert_eq!(summary.rows_kept, 9);
    assert_eq!(summary.rows_missing_hand, 0);
    assert_eq!(summary.unrefined_strikeouts, 1);
    assert_eq!(summary.unrefined_field_outs, 1);
    assert_eq!(summary.team_counts.get("Red Sox"), Some(&3));
    assert_eq!(summary.team_counts.get("Yankees"), Some(&6));

    let events: Vec<_> = result.events.iter().map(|e| e.events.as_str()).collect();
    assert_eq!(
        events,
        [
            "single",
            "walk",
            "double",
            "strikeout_looking",
            "strikeout_swinging",
            "pop_out",
            "field_out",
            "single",
            "strikeout",
        ]
    );
}

#[test]
fn cleaned_rows_use_published_fields() {
    let sources = vec![fixture("cole.csv"), fixture("bello.csv")];
    let result = consolidate(&sources, &TeamRoster::default()).expect("sources load");

    let looking = &result.events[0];
    assert_eq!(looking.player_name, "Cole, Gerrit");
    assert_eq!(looking.team, "Yankees");
    assert_eq!(looking.hit_distance_sc, 0.0);
    assert_eq!(looking.pitch_speed, Some(95.3));
    assert_eq!(looking.spin_rate, Some(2250.0));
    let win_exp = looking.win_exp.expect("win expectancy present");
    assert!((win_exp - 0.58).abs() < 1e-9);

    let swinging = &result.events[1];
    assert_eq!(swinging.b_arm, Hand::L);
    assert_eq!(swinging.p_arm, Hand::R);

    let walk = result
        .events
        .iter()
        .find(|e| e.events == "walk")
        .expect("walk row");
    assert_eq!(walk.team, "Red Sox");
    assert_eq!(walk.description.as_deref(), Some("ball"));
    assert_eq!(walk.bb_type, None);
}

#[test]
fn all_sources_failing_is_fatal() {
    let err = consolidate(
        &[fixture("broken.csv"), fixture("does_not_exist.csv")],
        &TeamRoster::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CleanError::NoSources { attempted: 2 }));
}

#[test]
fn custom_roster_changes_team_split() {
    let roster = TeamRoster::from_json_str(
        r#"{ "default_team": "Visitors", "teams": { "Home": [596142] } }"#,
        "inline",
    )
    .expect("roster parses");
    let result = consolidate(&[fixture("cole.csv"), fixture("bello.csv")], &roster)
        .expect("sources load");

    assert_eq!(result.summary.team_counts.get("Home"), Some(&6));
    assert_eq!(result.summary.team_counts.get("Visitors"), Some(&3));
}

#[test]
fn consolidated_table_survives_csv_write_and_reload() {
    let sources = discover_sources(&sources_dir()).expect("fixture dir should list");
    let result = consolidate(&sources, &TeamRoster::default()).expect("sources load");

    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pitcher_data.csv");
    write_file(&path, &result.events).expect("write consolidated csv");

    let header = std::fs::read_to_string(&path).expect("read back");
    assert!(header.starts_with(
        "player_name,events,description,b_arm,p_arm,balls,strikes,bb_type,inning,\
         outs_when_up,hit_distance_sc,launch_speed,pitch_speed,spin_rate,pitch_name,win_exp,team"
    ));

    let dataset = load_file(&path).expect("reload consolidated csv");
    assert_eq!(dataset.events(), result.events.as_slice());
    let teams: Vec<_> = dataset.teams().iter().map(String::as_str).collect();
    assert_eq!(teams, ["Red Sox", "Yankees"]);
}
