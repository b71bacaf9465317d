use proptest::prelude::*;
use synthbulk_model::{
    BatchMode, BulkDelta, EditableGroups, FieldGroup, MarkedList, MonitorRecord, MonitorUpdate,
    Projected, Tag, TagSource,
};
use synthbulk_reconcile::{
    project, reconcile_list, track, update_all, update_selected, validate, FieldEdit, MergeScope,
};
use synthbulk_test_utils::{
    browser_monitor, http_monitor, with_apps, with_frequency, with_locations, with_outage,
    with_user_tags,
};

fn location() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["loc1", "loc2", "loc3", "loc4"]).prop_map(str::to_string)
}

fn locations() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(location(), 0..4)
}

fn apps() -> impl Strategy<Value = Vec<&'static str>> {
    prop::sample::subsequence(vec!["APPLICATION-1", "APPLICATION-2", "APPLICATION-3"], 0..=3)
}

fn user_tags() -> impl Strategy<Value = Vec<(&'static str, Option<&'static str>)>> {
    prop::sample::subsequence(
        vec![("env", Some("prod")), ("env", Some("dev")), ("team", None), ("tier", Some("gold"))],
        0..=3,
    )
}

fn record_strategy() -> impl Strategy<Value = MonitorRecord> {
    (
        locations(),
        prop::sample::select(vec![5u32, 10, 15]),
        any::<bool>(),
        prop::option::of(1u32..4),
        apps(),
        user_tags(),
    )
        .prop_map(|(locs, freq, flag, runs, apps, tags)| {
            let refs: Vec<&str> = locs.iter().map(String::as_str).collect();
            let record = with_frequency(with_locations(browser_monitor("SYNTHETIC_TEST-1"), &refs), freq);
            let record = with_user_tags(with_apps(record, &apps), &tags);
            if flag {
                with_outage(record, true, runs)
            } else {
                record
            }
        })
}

proptest! {
    #[test]
    fn prop_common_locations_are_universal(records in prop::collection::vec(record_strategy(), 1..6)) {
        let common = project(&records);
        for item in common.locations.iter() {
            prop_assert!(records.iter().all(|r| r.locations.contains(item)));
        }
        let any_extra = records
            .iter()
            .flat_map(|r| r.locations.iter())
            .any(|l| !common.locations.contains(l));
        prop_assert_eq!(common.locations.is_divergent(), any_extra);
    }

    #[test]
    fn prop_scalar_is_shared_or_marker(records in prop::collection::vec(record_strategy(), 1..6)) {
        let common = project(&records);
        match common.frequency_min {
            Projected::Value(v) => prop_assert!(records.iter().all(|r| r.frequency_min == v)),
            Projected::Divergent => {
                let first = records[0].frequency_min;
                prop_assert!(records.iter().any(|r| r.frequency_min != first));
            }
            Projected::Empty => prop_assert!(false, "non-empty selection projected empty frequency"),
        }
    }

    #[test]
    fn prop_empty_delta_is_identity(record in record_strategy()) {
        let common = project(std::slice::from_ref(&record));
        let update = update_all(&record, &common, &BulkDelta::default(), EditableGroups::all());
        prop_assert_eq!(update, MonitorUpdate::from(&record));
    }

    #[test]
    fn prop_merge_is_idempotent(
        existing in locations(),
        initial in locations(),
        edited in locations(),
        marker in any::<bool>(),
    ) {
        let initial = MarkedList::divergent(initial);
        let edited = MarkedList::new(edited, marker);
        let once = reconcile_list(&existing, &initial, Some(&edited));
        let twice = reconcile_list(&once, &initial, Some(&edited));
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_removed_common_items_never_survive(
        existing in locations(),
        initial in locations(),
        edited in locations(),
    ) {
        let initial_list = MarkedList::divergent(initial.clone());
        let edited_list = MarkedList::divergent(edited.clone());
        let merged = reconcile_list(&existing, &initial_list, Some(&edited_list));
        for removed in initial.iter().filter(|i| !edited.contains(i)) {
            prop_assert!(!merged.contains(removed));
        }
        for kept in &edited {
            prop_assert!(merged.contains(kept));
        }
    }

    #[test]
    fn prop_projection_round_trips_through_validator(records in prop::collection::vec(record_strategy(), 1..4)) {
        let common = project(&records);
        for group in [FieldGroup::Frequency, FieldGroup::Locations, FieldGroup::Applications, FieldGroup::Tags] {
            let text = serde_json::to_string(&common.slice(group)).unwrap();
            let delta = validate(&text, group).unwrap();
            prop_assert_eq!(delta, common.slice(group));
        }
    }
}

#[test]
fn removal_law() {
    let existing = vec!["loc1".to_string()];
    let initial = MarkedList::divergent(vec!["loc1".to_string()]);
    let edited = MarkedList::divergent(vec![]);
    assert!(reconcile_list(&existing, &initial, Some(&edited)).is_empty());
}

#[test]
fn divergent_and_common_lists_round_trip() {
    let divergent = vec![
        with_user_tags(
            with_apps(browser_monitor("SYNTHETIC_TEST-1"), &["APPLICATION-1"]),
            &[("env", Some("prod")), ("team", None)],
        ),
        with_user_tags(
            with_apps(browser_monitor("SYNTHETIC_TEST-2"), &["APPLICATION-1", "APPLICATION-2"]),
            &[("env", Some("prod"))],
        ),
    ];
    let common = vec![
        with_user_tags(browser_monitor("SYNTHETIC_TEST-1"), &[("env", Some("prod"))]),
        with_user_tags(browser_monitor("SYNTHETIC_TEST-2"), &[("env", Some("prod"))]),
    ];

    for (records, marked) in [(divergent, true), (common, false)] {
        let view = project(&records);
        assert_eq!(view.tags.is_divergent(), marked);
        assert_eq!(view.manually_assigned_apps.is_divergent(), marked);
        for group in [FieldGroup::Applications, FieldGroup::Tags] {
            let text = serde_json::to_string(&view.slice(group)).unwrap();
            assert_eq!(validate(&text, group).unwrap(), view.slice(group));
        }
    }

    let text = r#"{"tags":[{"key":"env","value":"prod"},"*"]}"#;
    let delta = validate(text, FieldGroup::Tags).unwrap();
    assert_eq!(serde_json::to_string(&delta).unwrap(), text);
}

#[test]
fn outage_round_trips_when_blocks_exist() {
    for records in [
        vec![
            with_outage(browser_monitor("SYNTHETIC_TEST-1"), true, Some(2)),
            with_outage(browser_monitor("SYNTHETIC_TEST-2"), true, Some(2)),
        ],
        vec![
            with_outage(browser_monitor("SYNTHETIC_TEST-1"), true, None),
            with_outage(browser_monitor("SYNTHETIC_TEST-2"), false, Some(4)),
        ],
    ] {
        let common = project(&records);
        let text = serde_json::to_string(&common.slice(FieldGroup::OutageHandling)).unwrap();
        let delta = validate(&text, FieldGroup::OutageHandling).unwrap();
        assert_eq!(delta, common.slice(FieldGroup::OutageHandling));
    }
}

#[test]
fn single_field_isolation() {
    let record = with_outage(
        with_user_tags(browser_monitor("SYNTHETIC_TEST-1"), &[("team", Some("web"))]),
        false,
        Some(1),
    );
    let common = project(std::slice::from_ref(&record));
    let delta = BulkDelta::default()
        .with_frequency(Projected::Value(60))
        .with_locations(MarkedList::exact(vec!["loc9".into()]))
        .with_applications(MarkedList::exact(vec![]))
        .with_outage_handling(synthbulk_model::OutageParam::new(
            Projected::Value(true),
            Projected::Value(5),
        ))
        .with_tags(MarkedList::exact(vec![]));
    let baseline = MonitorUpdate::from(&record);

    for group in FieldGroup::EDITABLE {
        let update = update_selected(&record, &common, &delta, Some(group));
        let changed = |g: FieldGroup| g == group;
        assert_eq!(update.frequency_min != baseline.frequency_min, changed(FieldGroup::Frequency));
        assert_eq!(update.locations != baseline.locations, changed(FieldGroup::Locations));
        assert_eq!(
            update.manually_assigned_apps != baseline.manually_assigned_apps,
            changed(FieldGroup::Applications)
        );
        assert_eq!(
            update.anomaly_detection != baseline.anomaly_detection,
            changed(FieldGroup::OutageHandling)
        );
        assert_eq!(update.tags != baseline.tags, changed(FieldGroup::Tags));
        assert_eq!(update.script, baseline.script);
    }
}

#[test]
fn system_tags_survive_every_mode() {
    let mut record = with_user_tags(http_monitor("HTTP_CHECK-1"), &[("env", Some("prod"))]);
    record.tags.push(Tag::system("owner", Some("rules"), TagSource::RuleBased));
    let common = project(std::slice::from_ref(&record));
    let delta = BulkDelta::default().with_tags(MarkedList::exact(vec![]));

    let scopes = [
        MergeScope::for_mode(BatchMode::SameType),
        MergeScope::for_mode(BatchMode::Mixed),
        MergeScope::Selected(Some(FieldGroup::Tags)),
        MergeScope::Selected(None),
    ];
    for scope in scopes {
        let update = scope.update(&record, &common, &delta);
        let system: Vec<_> = update.tags.iter().filter(|t| !t.is_user_authored()).collect();
        assert_eq!(system.len(), 2, "{scope:?}");
    }
}

#[test]
fn end_to_end_mixed_batch() {
    let records = vec![
        with_apps(with_locations(http_monitor("HTTP_CHECK-1"), &["loc1", "loc2"]), &["app1"]),
        with_apps(with_locations(browser_monitor("SYNTHETIC_TEST-1"), &["loc1"]), &["app2"]),
    ];
    let mode = BatchMode::from_records(&records);
    assert_eq!(mode, BatchMode::Mixed);

    let common = project(&records);
    let edit = validate(r#"{"locations":["loc3","*"]}"#, FieldGroup::Locations).unwrap();
    let delta = track(BulkDelta::default(), FieldEdit::new(FieldGroup::Locations, edit));
    let delta = track(
        delta,
        FieldEdit::new(
            FieldGroup::Frequency,
            BulkDelta::default().with_frequency(Projected::Value(1)),
        ),
    );

    let scope = MergeScope::for_mode(mode);
    let first = scope.update(&records[0], &common, &delta);
    let second = scope.update(&records[1], &common, &delta);

    assert_eq!(first.locations, vec!["loc2".to_string(), "loc3".to_string()]);
    assert_eq!(second.locations, vec!["loc3".to_string()]);
    assert_eq!(first.frequency_min, records[0].frequency_min);
    assert_eq!(first.manually_assigned_apps, vec!["app1".to_string()]);
}
