use attendx_core::{
    AttendanceListQuery, AttendanceRepository, AttendanceStatus, AttendanceStore, CenterId,
    MarkAttendance, MarkOutcome, NewCenter, NewStudent, SqliteAttendanceRepository, StudentId,
};
use chrono::NaiveDate;

fn date(value: &str) -> NaiveDate {
    value.parse().unwrap()
}

fn store_with_student(name: &str) -> (AttendanceStore, CenterId, StudentId) {
    let store = AttendanceStore::open_in_memory().unwrap();
    let center = store
        .add_center(&NewCenter::new("Test Center", "#6366f1"))
        .unwrap();
    let student = store.add_student(&NewStudent::new(name, center)).unwrap();
    (store, center, student)
}

#[test]
fn remarking_same_day_updates_instead_of_duplicating() {
    let (store, center, john) = store_with_student("John");
    let day = date("2024-01-01");

    store
        .mark_attendance(john, center, day, AttendanceStatus::Present, None)
        .unwrap();
    let first = store.get_attendance_by_date(center, day).unwrap();
    assert_eq!(first.len(), 1);

    store
        .mark_attendance(john, center, day, AttendanceStatus::Absent, Some("sick"))
        .unwrap();
    let records = store.get_attendance_by_date(center, day).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, first[0].id);
    assert_eq!(records[0].status, AttendanceStatus::Absent);
    assert_eq!(records[0].notes.as_deref(), Some("sick"));
    assert_eq!(records[0].created_at, first[0].created_at);
}

#[test]
fn upsert_keeps_original_center_of_the_record() {
    let (store, center, john) = store_with_student("John");
    let other = store.add_center(&NewCenter::new("Other", "#22c55e")).unwrap();
    let day = date("2024-01-01");

    store
        .mark_attendance(john, center, day, AttendanceStatus::Present, None)
        .unwrap();
    store
        .mark_attendance(john, other, day, AttendanceStatus::Late, None)
        .unwrap();

    let records = store.get_attendance_by_student(john).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].center_id, center);
    assert_eq!(records[0].status, AttendanceStatus::Late);
}

#[test]
fn different_days_create_separate_records() {
    let (store, center, john) = store_with_student("John");

    for day in ["2024-01-01", "2024-01-03", "2024-01-02"] {
        store
            .mark_attendance(john, center, date(day), AttendanceStatus::Present, None)
            .unwrap();
    }

    let dates: Vec<_> = store
        .get_attendance_by_student(john)
        .unwrap()
        .into_iter()
        .map(|record| record.date)
        .collect();
    assert_eq!(
        dates,
        vec![date("2024-01-03"), date("2024-01-02"), date("2024-01-01")]
    );
}

#[test]
fn get_attendance_by_date_filters_center_and_exact_day() {
    let (store, center, john) = store_with_student("John");
    let other = store.add_center(&NewCenter::new("Other", "#22c55e")).unwrap();
    let jane = store.add_student(&NewStudent::new("Jane", other)).unwrap();

    store
        .mark_attendance(john, center, date("2024-01-01"), AttendanceStatus::Present, None)
        .unwrap();
    store
        .mark_attendance(john, center, date("2024-01-02"), AttendanceStatus::Present, None)
        .unwrap();
    store
        .mark_attendance(jane, other, date("2024-01-01"), AttendanceStatus::Present, None)
        .unwrap();

    let records = store
        .get_attendance_by_date(center, date("2024-01-01"))
        .unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].student_id, john);

    assert!(store
        .get_attendance_by_date(center, date("2023-12-31"))
        .unwrap()
        .is_empty());
}

#[test]
fn bulk_mark_applies_all_marks_and_upserts() {
    let (store, center, john) = store_with_student("John");
    let jane = store.add_student(&NewStudent::new("Jane", center)).unwrap();
    let day = date("2024-03-04");

    store
        .mark_attendance(john, center, day, AttendanceStatus::Absent, None)
        .unwrap();

    let marks = vec![
        MarkAttendance::new(john, center, day, AttendanceStatus::Present),
        MarkAttendance::new(jane, center, day, AttendanceStatus::Late),
    ];
    assert_eq!(store.bulk_mark_attendance(&marks).unwrap(), 2);

    let records = store.get_attendance_by_date(center, day).unwrap();
    assert_eq!(records.len(), 2);
    let john_record = records.iter().find(|r| r.student_id == john).unwrap();
    let jane_record = records.iter().find(|r| r.student_id == jane).unwrap();
    assert_eq!(john_record.status, AttendanceStatus::Present);
    assert_eq!(jane_record.status, AttendanceStatus::Late);
}

#[test]
fn repository_reports_insert_then_update_outcome() {
    let (store, center, john) = store_with_student("John");
    let repo = SqliteAttendanceRepository::try_new(store.connection()).unwrap();
    let mark = MarkAttendance::new(john, center, date("2024-01-01"), AttendanceStatus::Present);

    let inserted = repo.mark_attendance(&mark).unwrap();
    assert!(matches!(inserted, MarkOutcome::Inserted(_)));

    let updated = repo.mark_attendance(&mark).unwrap();
    assert_eq!(updated, MarkOutcome::Updated(inserted.record_id()));

    let found = repo.find_record(john, date("2024-01-01")).unwrap().unwrap();
    assert_eq!(found.id, inserted.record_id());
}

#[test]
fn date_range_query_is_inclusive() {
    let (store, center, john) = store_with_student("John");
    for day in ["2024-01-01", "2024-01-05", "2024-01-10", "2024-01-11"] {
        store
            .mark_attendance(john, center, date(day), AttendanceStatus::Present, None)
            .unwrap();
    }

    let records = store
        .find_attendance(&AttendanceListQuery {
            date_from: Some(date("2024-01-05")),
            date_to: Some(date("2024-01-10")),
            ..AttendanceListQuery::default()
        })
        .unwrap();
    let dates: Vec<_> = records.into_iter().map(|record| record.date).collect();
    assert_eq!(dates, vec![date("2024-01-10"), date("2024-01-05")]);
}

#[test]
fn marking_for_unknown_student_is_accepted() {
    let store = AttendanceStore::open_in_memory().unwrap();
    store
        .mark_attendance(41, 7, date("2024-01-01"), AttendanceStatus::Excused, None)
        .unwrap();
    assert_eq!(store.get_attendance_by_student(41).unwrap().len(), 1);
}
