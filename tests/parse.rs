use std::collections::HashSet;

use calamine::{CellErrorType, Data};
use roster_tools::attendees::load_attendees;
use roster_tools::collect::collect_workshops;
use roster_tools::io::{Sheet, Workbook};
use roster_tools::model::{Workshop, WorkshopDuration, WorkshopKey};
use roster_tools::schema::EventSchema;
use roster_tools::{ExcelParser, RosterError};

const ROSTER_HEADERS: [&str; 5] = [
    "2025WinterAdventureClassRegist_Id",
    "First Name",
    "Last Name",
    "Email",
    "Age",
];

const PERIOD_HEADERS: [&str; 8] = [
    "2025WinterAdventureClassRegist_Id",
    "Registration_Id",
    "First Name",
    "Last Name",
    "Choice Number",
    "2025MorningFirstPeriod4Day",
    "2025MorningFirstPeriodFirstHalf",
    "2025MorningFirstPeriodSecondHalf",
];

fn roster(rows: &[[&str; 5]]) -> Sheet {
    let mut all = vec![ROSTER_HEADERS.to_vec()];
    all.extend(rows.iter().map(|row| row.to_vec()));
    Sheet::from_rows("ClassSelection", all)
}

fn period(name: &str, rows: &[[&str; 8]]) -> Sheet {
    let headers: Vec<String> = PERIOD_HEADERS
        .iter()
        .map(|header| header.replace("MorningFirstPeriod", name))
        .collect();
    let mut all = vec![headers];
    all.extend(
        rows.iter()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect()),
    );
    Sheet::from_rows(name, all)
}

fn standard_roster() -> Sheet {
    roster(&[
        ["SEL001", "Alice", "Johnson", "alice@example.com", "34"],
        ["SEL002", "Bob", "Lee", "bob@example.com", "12"],
    ])
}

fn parser() -> ExcelParser {
    ExcelParser::with_embedded_schema().expect("embedded schema")
}

fn find<'a>(workshops: &'a [Workshop], name: &str) -> Vec<&'a Workshop> {
    workshops.iter().filter(|w| w.name == name).collect()
}

#[test]
fn matching_selections_collapse_into_one_workshop() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[
                ["SEL001", "101", "Alice", "Johnson", "1", "Pottery (Jane Doe)", "", ""],
                ["SEL002", "102", "Bob", "Lee", "2", "Pottery (Jane Doe)", "", ""],
            ],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");

    assert_eq!(workshops.len(), 1);
    let pottery = &workshops[0];
    assert_eq!(pottery.name, "Pottery");
    assert_eq!(pottery.leader, "Jane Doe");
    assert_eq!(pottery.duration, WorkshopDuration::new(1, 4));
    assert_eq!(pottery.period.display_name, "Morning First Period");
    assert_eq!(pottery.selections.len(), 2);

    let alice = &pottery.selections[0];
    assert_eq!(alice.class_selection_id, "SEL001");
    assert_eq!(alice.full_name, "Alice Johnson");
    assert_eq!(alice.choice_number, 1);
    assert_eq!(alice.registration_id, 101);

    let bob = &pottery.selections[1];
    assert_eq!(bob.class_selection_id, "SEL002");
    assert_eq!(bob.full_name, "Bob Lee");
    assert_eq!(bob.choice_number, 2);
    assert_eq!(pottery.enrolled().count(), 1);
    assert_eq!(pottery.backups().count(), 1);
}

#[test]
fn duration_and_period_separate_workshops() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[
                ["SEL001", "1", "Alice", "Johnson", "1", "", "Pottery (Jane Doe)", ""],
                ["SEL002", "2", "Bob", "Lee", "1", "", "", "Pottery (Jane Doe)"],
            ],
        ),
        period(
            "AfternoonPeriod",
            &[["SEL001", "1", "Alice", "Johnson", "1", "", "Pottery (Jane Doe)", ""]],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");
    let pottery = find(&workshops, "Pottery");

    assert_eq!(pottery.len(), 3);
    let keys: HashSet<(String, u32, u32)> = pottery
        .iter()
        .map(|w| {
            (
                w.period.sheet_name.clone(),
                w.duration.start_day,
                w.duration.end_day,
            )
        })
        .collect();
    assert!(keys.contains(&("MorningFirstPeriod".to_string(), 1, 2)));
    assert!(keys.contains(&("MorningFirstPeriod".to_string(), 3, 4)));
    assert!(keys.contains(&("AfternoonPeriod".to_string(), 1, 2)));
}

#[test]
fn one_row_may_fill_several_segments() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[[
                "SEL001",
                "1",
                "Alice",
                "Johnson",
                "1",
                "",
                "Archery (Robin Hood)",
                "Weaving (Sam Lee and Kim Park)",
            ]],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");

    assert_eq!(workshops.len(), 2);
    let weaving = find(&workshops, "Weaving")[0];
    assert_eq!(weaving.leaders(), vec!["Sam Lee", "Kim Park"]);
    assert_eq!(weaving.duration, WorkshopDuration::new(3, 4));
}

#[test]
fn repeated_parses_agree_and_keys_are_unique() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[
                ["SEL001", "1", "Alice", "Johnson", "1", "Pottery (Jane Doe)", "", ""],
                ["SEL002", "2", "Bob", "Lee", "1", "Pottery (Jane Doe)", "", ""],
                ["SEL002", "2", "Bob", "Lee", "2", "", "Archery (Robin Hood)", ""],
            ],
        ),
        period(
            "MorningSecondPeriod",
            &[["SEL001", "1", "Alice", "Johnson", "1", "Pottery (Jane Doe)", "", ""]],
        ),
    ]);
    let parser = parser();

    let summarize = |workshops: Vec<Workshop>| {
        let mut summary: Vec<(WorkshopKey, usize)> = workshops
            .iter()
            .map(|w| (w.key(), w.selections.len()))
            .collect();
        summary.sort();
        summary
    };

    let first = parser.parse(&workbook).expect("first parse");
    let keys: HashSet<WorkshopKey> = first.iter().map(Workshop::key).collect();
    assert_eq!(keys.len(), first.len());

    let second = parser.parse(&workbook).expect("second parse");
    assert_eq!(summarize(first), summarize(second));
}

#[test]
fn blank_ids_fall_back_to_names_on_both_sheets() {
    let workbook = Workbook::from_sheets(vec![
        roster(&[["", "Carol Ann", "Smith", "carol@example.com", "40"]]),
        period(
            "MorningFirstPeriod",
            &[["", "7", "Carol Ann", "Smith", "1", "Pottery (Jane Doe)", "", ""]],
        ),
    ]);
    let schema = EventSchema::embedded().expect("embedded schema");

    let attendees = load_attendees(&workbook, &schema).expect("roster loads");
    let carol = attendees.get("CarolAnnSmith").expect("fallback key");
    assert_eq!(carol.email, "carol@example.com");

    let workshops = parser().parse(&workbook).expect("parse succeeds");
    let selection = &workshops[0].selections[0];
    assert_eq!(selection.class_selection_id, "CarolAnnSmith");
    assert_eq!(selection.full_name, "Carol Ann Smith");
}

#[test]
fn later_roster_rows_replace_earlier_ones() {
    let workbook = Workbook::from_sheets(vec![roster(&[
        ["SEL001", "Alice", "Johnson", "", ""],
        ["SEL001", "Alicia", "Jones", "", ""],
        ["", "", "", "", ""],
    ])]);
    let schema = EventSchema::embedded().expect("embedded schema");

    let attendees = load_attendees(&workbook, &schema).expect("roster loads");

    assert_eq!(attendees.len(), 1);
    assert_eq!(attendees["SEL001"].full_name(), "Alicia Jones");
}

#[test]
fn unreadable_roster_row_is_skipped() {
    let header: Vec<Data> = ROSTER_HEADERS
        .iter()
        .map(|h| Data::String(h.to_string()))
        .collect();
    let text = |value: &str| Data::String(value.to_string());
    let sheet = Sheet::from_cells(
        "ClassSelection",
        vec![
            header,
            vec![
                text("SEL001"),
                text("Alice"),
                text("Johnson"),
                Data::Error(CellErrorType::Ref),
                text("34"),
            ],
            vec![text("SEL002"), text("Bob"), text("Lee")],
        ],
    );
    let workbook = Workbook::from_sheets(vec![sheet]);
    let schema = EventSchema::embedded().expect("embedded schema");

    let attendees = load_attendees(&workbook, &schema).expect("roster loads");

    assert_eq!(attendees.len(), 1);
    assert!(attendees.contains_key("SEL002"));
}

#[test]
fn bad_row_does_not_discard_the_sheet() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[
                ["", "", "", "", "1", "Pottery (Jane Doe)", "", ""],
                ["SEL002", "2", "Bob", "Lee", "1", "Archery (Robin Hood)", "", ""],
            ],
        ),
    ]);
    let schema = EventSchema::embedded().expect("embedded schema");
    let attendees = load_attendees(&workbook, &schema).expect("roster loads");
    let config = schema
        .period_sheet("MorningFirstPeriod")
        .expect("period configured");
    let sheet = workbook.sheet("MorningFirstPeriod").expect("sheet exists");

    let workshops = collect_workshops(sheet, config, &attendees);

    assert_eq!(workshops.len(), 1);
    assert_eq!(workshops[0].name, "Archery");
    assert_eq!(workshops[0].selections[0].class_selection_id, "SEL002");
}

#[test]
fn error_cell_only_skips_its_own_row() {
    let header: Vec<Data> = PERIOD_HEADERS
        .iter()
        .map(|h| Data::String(h.to_string()))
        .collect();
    let text = |value: &str| Data::String(value.to_string());
    let sheet = Sheet::from_cells(
        "MorningFirstPeriod",
        vec![
            header,
            vec![
                Data::Error(CellErrorType::NA),
                text("1"),
                text("Alice"),
                text("Johnson"),
                text("1"),
                text("Pottery (Jane Doe)"),
            ],
            vec![
                text("SEL002"),
                Data::Float(2.0),
                text("Bob"),
                text("Lee"),
                Data::Float(1.0),
                text("Pottery (Jane Doe)"),
                Data::Error(CellErrorType::Value),
                text("Archery (Robin Hood)"),
            ],
        ],
    );
    let workbook = Workbook::from_sheets(vec![standard_roster(), sheet]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");

    assert_eq!(workshops.len(), 2);
    for workshop in &workshops {
        assert_eq!(workshop.selections.len(), 1);
        assert_eq!(workshop.selections[0].class_selection_id, "SEL002");
        assert_eq!(workshop.selections[0].registration_id, 2);
    }
}

#[test]
fn malformed_values_use_defaults() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[["SEL001", "n/a", "Alice", "Johnson", "ABC", "Pottery (Jane Doe)", "", ""]],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");
    let selection = &workshops[0].selections[0];

    assert_eq!(selection.choice_number, 1);
    assert_eq!(selection.registration_id, 0);
}

#[test]
fn workshop_cell_without_name_is_skipped() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[[
                "SEL001",
                "1",
                "Alice",
                "Johnson",
                "1",
                "(Jane Doe)",
                "Free Swim",
                "",
            ]],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");

    assert_eq!(workshops.len(), 1);
    assert_eq!(workshops[0].name, "Free Swim");
    assert_eq!(workshops[0].leader, "");
}

#[test]
fn unknown_attendees_get_row_identity() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[
                ["SEL900", "1", "Dana", "Ray", "1", "Pottery (Jane Doe)", "", ""],
                ["SEL901", "2", "", "", "1", "Pottery (Jane Doe)", "", ""],
            ],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");
    let selections = &workshops[0].selections;

    assert_eq!(selections.len(), 2);
    assert_eq!(selections[0].class_selection_id, "SEL900");
    assert_eq!(selections[0].full_name, "Dana Ray");
    assert_eq!(selections[1].class_selection_id, "SEL901");
    assert_eq!(selections[1].first_name, "SEL901");
}

#[test]
fn duplicate_registrations_are_kept() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        period(
            "MorningFirstPeriod",
            &[
                ["SEL001", "1", "Alice", "Johnson", "1", "Pottery (Jane Doe)", "", ""],
                ["SEL001", "1", "Alice", "Johnson", "1", "Pottery (Jane Doe)", "", ""],
            ],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");

    assert_eq!(workshops.len(), 1);
    assert_eq!(workshops[0].selections.len(), 2);
}

#[test]
fn missing_roster_sheet_is_fatal() {
    let workbook = Workbook::from_sheets(vec![period("MorningFirstPeriod", &[])]);

    match parser().parse(&workbook) {
        Err(RosterError::MissingSheet {
            expected,
            available,
        }) => {
            assert_eq!(expected, "ClassSelection");
            assert_eq!(available, vec!["MorningFirstPeriod".to_string()]);
        }
        other => panic!("expected missing sheet error, got {other:?}"),
    }
}

#[test]
fn roster_without_name_columns_is_fatal() {
    let roster = Sheet::from_rows(
        "ClassSelection",
        vec![
            vec!["2025WinterAdventureClassRegist_Id", "Given", "Family"],
            vec!["SEL001", "Alice", "Johnson"],
        ],
    );
    let workbook = Workbook::from_sheets(vec![roster, period("MorningFirstPeriod", &[])]);

    let result = parser().parse(&workbook);

    match result {
        Err(RosterError::MissingColumn { sheet, column }) => {
            assert_eq!(sheet, "ClassSelection");
            assert!(column.contains("First Name"));
        }
        other => panic!("expected missing column error, got {other:?}"),
    }
}

#[test]
fn missing_workshop_column_only_skips_that_column() {
    let headers: Vec<&str> = PERIOD_HEADERS
        .iter()
        .copied()
        .filter(|header| !header.ends_with("FirstHalf"))
        .collect();
    let sheet = Sheet::from_rows(
        "MorningFirstPeriod",
        vec![
            headers,
            vec![
                "SEL001",
                "1",
                "Alice",
                "Johnson",
                "1",
                "Pottery (Jane Doe)",
                "Archery (Robin Hood)",
            ],
            vec!["SEL002", "2", "Bob", "Lee", "1", "", "Archery (Robin Hood)"],
        ],
    );
    let workbook = Workbook::from_sheets(vec![standard_roster(), sheet]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");

    assert_eq!(workshops.len(), 2);
    let pottery = find(&workshops, "Pottery");
    assert_eq!(pottery.len(), 1);
    assert_eq!(pottery[0].duration, WorkshopDuration::new(1, 4));
    assert_eq!(pottery[0].selections.len(), 1);
    let archery = find(&workshops, "Archery");
    assert_eq!(archery.len(), 1);
    assert_eq!(archery[0].duration, WorkshopDuration::new(3, 4));
    assert_eq!(archery[0].selections.len(), 2);
}

#[test]
fn empty_inputs_are_fatal() {
    let parser = parser();

    assert!(matches!(
        parser.parse(&Workbook::default()),
        Err(RosterError::EmptyWorkbook)
    ));
    assert!(matches!(
        parser.parse_bytes(&[]),
        Err(RosterError::EmptyInput)
    ));
}

#[test]
fn missing_and_empty_period_sheets_are_skipped() {
    let workbook = Workbook::from_sheets(vec![
        standard_roster(),
        Sheet::empty("MorningFirstPeriod"),
        period(
            "AfternoonPeriod",
            &[["SEL002", "2", "Bob", "Lee", "1", "Pottery (Jane Doe)", "", ""]],
        ),
    ]);

    let workshops = parser().parse(&workbook).expect("parse succeeds");

    assert_eq!(workshops.len(), 1);
    assert_eq!(workshops[0].period.sheet_name, "AfternoonPeriod");
}

#[test]
fn empty_roster_still_parses_periods() {
    let workbook = Workbook::from_sheets(vec![
        roster(&[]),
        period(
            "MorningFirstPeriod",
            &[["SEL001", "1", "Alice", "Johnson", "1", "Pottery (Jane Doe)", "", ""]],
        ),
    ]);
    let schema = EventSchema::embedded().expect("embedded schema");

    assert!(load_attendees(&workbook, &schema)
        .expect("roster loads")
        .is_empty());
    let workshops = parser().parse(&workbook).expect("parse succeeds");
    assert_eq!(workshops[0].selections[0].full_name, "Alice Johnson");
}
