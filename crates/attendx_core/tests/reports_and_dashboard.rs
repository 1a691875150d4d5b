use attendx_core::{
    export_csv, report_file_name, AttendanceStatus, AttendanceStore, CenterId, DashboardService,
    NewCenter, NewStudent, ReportQuery, ReportService, ReportSummary, SheetService,
    StudentStatus, CSV_HEADERS,
};
use chrono::NaiveDate;

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

struct Fixture {
    store: AttendanceStore,
    north: CenterId,
    south: CenterId,
}

fn fixture() -> Fixture {
    let store = AttendanceStore::open_in_memory().unwrap();
    let north = store.add_center(&NewCenter::new("North", "#6366f1")).unwrap();
    let south = store.add_center(&NewCenter::new("South", "#22c55e")).unwrap();

    let john = store.add_student(&NewStudent::new("John", north)).unwrap();
    let amy = store.add_student(&NewStudent::new("Amy", north)).unwrap();
    store.add_student(&NewStudent::new("Zed", south)).unwrap();
    store
        .add_student(&NewStudent::new("Quinn", north).with_status(StudentStatus::Inactive))
        .unwrap();

    let marks = [
        (john, "2024-01-01", AttendanceStatus::Present),
        (john, "2024-01-02", AttendanceStatus::Late),
        (john, "2024-01-03", AttendanceStatus::Absent),
        (john, "2024-01-04", AttendanceStatus::Present),
        (john, "2023-12-01", AttendanceStatus::Absent),
        (amy, "2024-01-01", AttendanceStatus::Excused),
        (amy, "2024-01-02", AttendanceStatus::Absent),
    ];
    for (student, day, status) in marks {
        store
            .mark_attendance(student, north, date(day), status, None)
            .unwrap();
    }

    Fixture {
        store,
        north,
        south,
    }
}

#[test]
fn reports_cover_every_matching_student_in_name_order() {
    let fx = fixture();
    let query = ReportQuery {
        date_from: Some(date("2024-01-01")),
        date_to: Some(date("2024-01-31")),
        ..ReportQuery::default()
    };

    let reports = ReportService::new(&fx.store).student_reports(&query).unwrap();
    let names: Vec<_> = reports.iter().map(|r| r.student.name.as_str()).collect();
    assert_eq!(names, vec!["Amy", "John", "Quinn", "Zed"]);

    let john = &reports[1];
    assert_eq!(john.center_name, "North");
    assert_eq!(john.stats.present, 2);
    assert_eq!(john.stats.late, 1);
    assert_eq!(john.stats.absent, 1);
    assert_eq!(john.stats.total, 4);
    assert_eq!(john.rate(), 75);

    let zed = &reports[3];
    assert_eq!(zed.center_name, "South");
    assert_eq!(zed.stats.total, 0);
    assert_eq!(zed.rate(), 0);

    let summary = ReportSummary::from_reports(&reports);
    assert_eq!(summary.total_sessions, 6);
    // Amy 0, John 75, Quinn 0, Zed 0.
    assert_eq!(summary.average_rate, 19);
}

#[test]
fn reports_without_range_include_all_history() {
    let fx = fixture();
    let reports = ReportService::new(&fx.store)
        .student_reports(&ReportQuery::default().with_center(fx.north))
        .unwrap();

    assert_eq!(reports.len(), 3);
    let john = reports.iter().find(|r| r.student.name == "John").unwrap();
    assert_eq!(john.stats.total, 5);
    assert_eq!(john.rate(), 60);
}

#[test]
fn reports_label_students_of_missing_centers() {
    let store = AttendanceStore::open_in_memory().unwrap();
    store.add_student(&NewStudent::new("Orphan", 404)).unwrap();

    let reports = ReportService::new(&store)
        .student_reports(&ReportQuery::default())
        .unwrap();
    assert_eq!(reports[0].center_name, "Unknown");
    assert_eq!(reports[0].center_color, "#6b6b7d");
}

#[test]
fn trailing_window_spans_days_before_today() {
    let query = ReportQuery::trailing_days(date("2024-02-01"), 30);
    assert_eq!(query.date_from, Some(date("2024-01-02")));
    assert_eq!(query.date_to, Some(date("2024-02-01")));
    assert!(query.center_id.is_none());
}

#[test]
fn csv_export_renders_header_and_rows() {
    let fx = fixture();
    let reports = ReportService::new(&fx.store)
        .student_reports(&ReportQuery::default().with_center(fx.south))
        .unwrap();

    let csv = export_csv(&reports);
    let lines: Vec<_> = csv.split('\n').collect();
    assert_eq!(lines[0], CSV_HEADERS.join(","));
    assert_eq!(lines[1], "Zed,South,0,0,0,0,0,0%");
    assert_eq!(lines.len(), 2);
    assert!(!csv.ends_with('\n'));

    assert_eq!(
        report_file_name(Some(date("2024-01-01")), None),
        "attendance-report-2024-01-01-to-all.csv"
    );
}

#[test]
fn csv_export_quotes_names_with_commas() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let center = store.add_center(&NewCenter::new("Main", "#6366f1")).unwrap();
    let student = store.add_student(&NewStudent::new("Doe, Jane", center)).unwrap();
    store
        .mark_attendance(student, center, date("2024-01-01"), AttendanceStatus::Present, None)
        .unwrap();

    let reports = ReportService::new(&store)
        .student_reports(&ReportQuery::default())
        .unwrap();
    let csv = export_csv(&reports);
    assert_eq!(csv.lines().nth(1), Some("\"Doe, Jane\",Main,1,0,0,0,1,100%"));
}

#[test]
fn dashboard_summarizes_today() {
    let fx = fixture();
    let summary = DashboardService::new(&fx.store)
        .summary(date("2024-01-01"))
        .unwrap();

    assert_eq!(summary.total_students, 3);
    assert_eq!(summary.total_centers, 2);
    assert_eq!(summary.present_today, 1);
    assert_eq!(summary.absent_today, 0);
    assert_eq!(summary.attendance_rate, 50);

    let north = summary
        .centers
        .iter()
        .find(|overview| overview.center.id == fx.north)
        .unwrap();
    assert_eq!(north.active_students, 2);
}

#[test]
fn sheet_loads_active_students_with_saved_status() {
    let fx = fixture();
    let service = SheetService::new(&fx.store);

    let sheet = service.load(fx.north, date("2024-01-02")).unwrap();
    let names: Vec<_> = sheet
        .entries
        .iter()
        .map(|entry| entry.student.name.as_str())
        .collect();
    assert_eq!(names, vec!["Amy", "John"]);
    assert_eq!(sheet.entries[0].status, Some(AttendanceStatus::Absent));
    assert_eq!(sheet.entries[1].status, Some(AttendanceStatus::Late));
    assert!(!sheet.has_changes());
}

#[test]
fn sheet_edits_persist_only_on_save() {
    let fx = fixture();
    let service = SheetService::new(&fx.store);
    let day = date("2024-01-10");

    let mut sheet = service.load(fx.north, day).unwrap();
    assert_eq!(sheet.summary().unmarked, 2);

    let amy = sheet.entries[0].student.id;
    assert!(sheet.set_status(amy, AttendanceStatus::Late));
    assert!(!sheet.set_status(9_999, AttendanceStatus::Late));
    assert!(sheet.has_changes());
    assert_eq!(sheet.summary().late, 1);
    assert_eq!(sheet.summary().unmarked, 1);
    assert!(fx.store.get_attendance_by_date(fx.north, day).unwrap().is_empty());

    assert_eq!(service.save(&mut sheet).unwrap(), 1);
    assert!(!sheet.has_changes());

    sheet.mark_all(AttendanceStatus::Present);
    assert_eq!(service.save(&mut sheet).unwrap(), 2);

    let records = fx.store.get_attendance_by_date(fx.north, day).unwrap();
    assert_eq!(records.len(), 2);
    assert!(records
        .iter()
        .all(|record| record.status == AttendanceStatus::Present));
}
