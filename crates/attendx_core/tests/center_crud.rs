use attendx_core::{
    AttendanceStatus, AttendanceStore, CenterPatch, NewCenter, NewStudent, CENTER_COLORS,
};
use chrono::NaiveDate;

#[test]
fn add_and_get_center_round_trip() {
    let store = AttendanceStore::open_in_memory().unwrap();

    let id = store
        .add_center(&NewCenter::new("Downtown", CENTER_COLORS[0]).with_address("12 Main St"))
        .unwrap();
    let center = store.get_center_by_id(id).unwrap().unwrap();

    assert_eq!(center.id, id);
    assert_eq!(center.name, "Downtown");
    assert_eq!(center.address.as_deref(), Some("12 Main St"));
    assert_eq!(center.color, "#6366f1");
}

#[test]
fn get_missing_center_returns_none() {
    let store = AttendanceStore::open_in_memory().unwrap();
    assert!(store.get_center_by_id(404).unwrap().is_none());
}

#[test]
fn empty_center_name_is_accepted() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let id = store.add_center(&NewCenter::new("", "#000000")).unwrap();
    assert_eq!(store.get_center_by_id(id).unwrap().unwrap().name, "");
}

#[test]
fn get_all_centers_lists_newest_first() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let first = store.add_center(&NewCenter::new("First", "#6366f1")).unwrap();
    let second = store.add_center(&NewCenter::new("Second", "#8b5cf6")).unwrap();
    let third = store.add_center(&NewCenter::new("Third", "#ec4899")).unwrap();

    let ids: Vec<_> = store
        .get_all_centers()
        .unwrap()
        .into_iter()
        .map(|center| center.id)
        .collect();
    assert_eq!(ids, vec![third, second, first]);
    assert_eq!(store.get_center_count().unwrap(), 3);
}

#[test]
fn update_center_merges_only_given_fields() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let id = store
        .add_center(&NewCenter::new("Old Name", "#6366f1").with_address("Somewhere"))
        .unwrap();
    let before = store.get_center_by_id(id).unwrap().unwrap();

    let patch = CenterPatch {
        name: Some("New Name".to_string()),
        ..CenterPatch::default()
    };
    assert!(store.update_center(id, &patch).unwrap());

    let after = store.get_center_by_id(id).unwrap().unwrap();
    assert_eq!(after.name, "New Name");
    assert_eq!(after.address.as_deref(), Some("Somewhere"));
    assert_eq!(after.color, "#6366f1");
    assert_eq!(after.created_at, before.created_at);
}

#[test]
fn update_center_can_clear_address() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let id = store
        .add_center(&NewCenter::new("Hall", "#6366f1").with_address("Somewhere"))
        .unwrap();

    let patch = CenterPatch {
        address: Some(None),
        ..CenterPatch::default()
    };
    assert!(store.update_center(id, &patch).unwrap());
    assert!(store.get_center_by_id(id).unwrap().unwrap().address.is_none());
}

#[test]
fn update_missing_center_reports_no_match() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let patch = CenterPatch {
        color: Some("#ffffff".to_string()),
        ..CenterPatch::default()
    };
    assert!(!store.update_center(77, &patch).unwrap());
    assert_eq!(store.get_center_count().unwrap(), 0);
}

#[test]
fn delete_center_cascades_to_students_and_attendance() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let doomed = store.add_center(&NewCenter::new("Doomed", "#f43f5e")).unwrap();
    let kept = store.add_center(&NewCenter::new("Kept", "#22c55e")).unwrap();

    let alice = store.add_student(&NewStudent::new("Alice", doomed)).unwrap();
    let bob = store.add_student(&NewStudent::new("Bob", doomed)).unwrap();
    let carol = store.add_student(&NewStudent::new("Carol", kept)).unwrap();

    let day = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    for (student, center) in [(alice, doomed), (bob, doomed), (carol, kept)] {
        store
            .mark_attendance(student, center, day, AttendanceStatus::Present, None)
            .unwrap();
    }

    let deletion = store.delete_center(doomed).unwrap();
    assert!(deletion.center_deleted);
    assert_eq!(deletion.students_deleted, 2);
    assert_eq!(deletion.records_deleted, 2);

    assert!(store.get_center_by_id(doomed).unwrap().is_none());
    assert!(store.get_student_by_id(alice).unwrap().is_none());
    assert!(store.get_student_by_id(bob).unwrap().is_none());
    assert!(store.get_attendance_by_date(doomed, day).unwrap().is_empty());

    assert!(store.get_student_by_id(carol).unwrap().is_some());
    assert_eq!(store.get_attendance_by_date(kept, day).unwrap().len(), 1);
}

#[test]
fn delete_missing_center_is_a_no_op() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let center = store.add_center(&NewCenter::new("Stays", "#6366f1")).unwrap();

    let deletion = store.delete_center(center + 100).unwrap();
    assert!(!deletion.center_deleted);
    assert_eq!(deletion.students_deleted, 0);
    assert_eq!(store.get_center_count().unwrap(), 1);
}

#[test]
fn search_centers_matches_name_or_address() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let riverside = store
        .add_center(&NewCenter::new("Riverside", "#22c55e").with_address("4 Mill Lane"))
        .unwrap();
    let downtown = store
        .add_center(&NewCenter::new("Downtown", "#6366f1").with_address("River Road 9"))
        .unwrap();
    store.add_center(&NewCenter::new("Hilltop", "#f97316")).unwrap();

    let ids = |term: &str| -> Vec<_> {
        store
            .search_centers(term)
            .unwrap()
            .into_iter()
            .map(|center| center.id)
            .collect()
    };

    assert_eq!(ids("river"), vec![downtown, riverside]);
    assert_eq!(ids("MILL"), vec![riverside]);
    assert!(ids("nowhere").is_empty());
    assert_eq!(ids("").len(), 3);
}
