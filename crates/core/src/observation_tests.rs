// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::collections::BTreeMap;

fn resource() -> Resource {
    Resource {
        id: ResourceId::new("i-1"),
        provider: "aws".into(),
        region: "us-east-1".into(),
        account: "1".into(),
        resource_type: "ec2".into(),
        name: "web".into(),
        status: "running".into(),
        tags: BTreeMap::new(),
        attrs: BTreeMap::new(),
        observed_at: Utc::now(),
    }
}

#[test]
fn no_prior_observation_yields_created() {
    let r = resource();
    let event = ChangeEvent::derive(r.id.clone(), Utc::now(), None, &r).unwrap();
    assert_eq!(event.kind, ChangeKind::Created);
    assert!(event.previous.is_none());
}

#[test]
fn identical_reobservation_yields_no_event() {
    let r = resource();
    let event = ChangeEvent::derive(r.id.clone(), Utc::now(), Some((&r, false)), &r);
    assert!(event.is_none());
}

#[test]
fn reappearing_after_disappearance_yields_created() {
    let r = resource();
    let event = ChangeEvent::derive(r.id.clone(), Utc::now(), Some((&r, true)), &r).unwrap();
    assert_eq!(event.kind, ChangeKind::Created);
}

#[test]
fn tag_only_diff_yields_tags_changed() {
    let prev = resource();
    let mut cur = prev.clone();
    cur.tags.insert("owner".into(), "alice".into());
    let event = ChangeEvent::derive(prev.id.clone(), Utc::now(), Some((&prev, false)), &cur).unwrap();
    assert_eq!(event.kind, ChangeKind::TagsChanged);
}

#[test]
fn non_tag_diff_yields_modified() {
    let prev = resource();
    let mut cur = prev.clone();
    cur.status = "stopped".into();
    let event = ChangeEvent::derive(prev.id.clone(), Utc::now(), Some((&prev, false)), &cur).unwrap();
    assert_eq!(event.kind, ChangeKind::Modified);
}

#[test]
fn disappearance_has_no_current() {
    let r = resource();
    let event = ChangeEvent::disappeared(r.id.clone(), Utc::now(), r.clone());
    assert_eq!(event.kind, ChangeKind::Disappeared);
    assert!(event.current.is_none());
    assert!(event.previous.is_some());
}

proptest::proptest! {
    /// Whatever a resource's status and tags become between two
    /// observations, the derived kind depends only on whether tags
    /// changed and whether anything else changed — never both
    /// `TagsChanged` and `Modified` for the same pair, and never `None`
    /// unless nothing at all changed.
    #[test]
    fn change_kind_matches_what_actually_differs(
        status_changed in proptest::bool::ANY,
        tag_changed in proptest::bool::ANY,
    ) {
        let prev = resource();
        let mut cur = prev.clone();
        if status_changed {
            cur.status = "stopped".into();
        }
        if tag_changed {
            cur.tags.insert("owner".into(), "alice".into());
        }

        let event = ChangeEvent::derive(prev.id.clone(), Utc::now(), Some((&prev, false)), &cur);

        match (status_changed, tag_changed) {
            (false, false) => prop_assert!(event.is_none()),
            (false, true) => prop_assert_eq!(event.unwrap().kind, ChangeKind::TagsChanged),
            (true, _) => prop_assert_eq!(event.unwrap().kind, ChangeKind::Modified),
        }
    }
}
