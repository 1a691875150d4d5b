use attendx_core::{
    AppSettings, AttendanceStore, NewCenter, NewStudent, SettingsPatch, Theme, DEFAULT_LANGUAGE,
};

#[test]
fn settings_are_absent_until_first_save() {
    let store = AttendanceStore::open_in_memory().unwrap();
    assert!(store.get_settings().unwrap().is_none());
}

#[test]
fn first_save_fills_defaults() {
    let store = AttendanceStore::open_in_memory().unwrap();

    let saved = store.save_settings(&SettingsPatch::theme(Theme::Dark)).unwrap();
    assert_eq!(saved.theme, Theme::Dark);
    assert_eq!(saved.language, DEFAULT_LANGUAGE);
    assert!(saved.default_center.is_none());

    assert_eq!(store.get_settings().unwrap(), Some(saved));
}

#[test]
fn later_saves_merge_into_existing_row() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let center = store.add_center(&NewCenter::new("Home", "#6366f1")).unwrap();

    store.save_settings(&SettingsPatch::theme(Theme::Light)).unwrap();
    store
        .save_settings(&SettingsPatch {
            default_center: Some(Some(center)),
            ..SettingsPatch::default()
        })
        .unwrap();
    let saved = store.save_settings(&SettingsPatch::language("fr")).unwrap();

    assert_eq!(
        saved,
        AppSettings {
            theme: Theme::Light,
            default_center: Some(center),
            language: "fr".to_string(),
        }
    );

    let cleared = store
        .save_settings(&SettingsPatch {
            default_center: Some(None),
            ..SettingsPatch::default()
        })
        .unwrap();
    assert!(cleared.default_center.is_none());
    assert_eq!(cleared.theme, Theme::Light);
}

#[test]
fn clear_all_data_empties_every_collection() {
    let store = AttendanceStore::open_in_memory().unwrap();
    let center = store.add_center(&NewCenter::new("Home", "#6366f1")).unwrap();
    store.add_student(&NewStudent::new("John", center)).unwrap();
    store.save_settings(&SettingsPatch::theme(Theme::Dark)).unwrap();

    store.clear_all_data().unwrap();

    assert_eq!(store.get_center_count().unwrap(), 0);
    assert!(store.get_all_students().unwrap().is_empty());
    assert!(store.get_settings().unwrap().is_none());
}
