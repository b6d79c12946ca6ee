use anyhow::Result;
use busmap::{
    validate_student, BusMapError, LocalStorage, RosterStore, Student, StudentDraft, StudentFilter,
    StudentId, DEFAULT_STORAGE_KEY,
};
use std::collections::BTreeSet;
use tempfile::TempDir;

fn draft(first: &str, last: &str, stop: &str, siblings: &[StudentId]) -> StudentDraft {
    StudentDraft {
        first_name: first.to_string(),
        last_name: last.to_string(),
        stop_number: stop.to_string(),
        am_route: true,
        pm_route: false,
        siblings: siblings.iter().copied().collect(),
        active: true,
    }
}

fn open_store(temp_dir: &TempDir) -> RosterStore<LocalStorage> {
    let storage = LocalStorage::new(temp_dir.path().to_str().unwrap().to_string());
    RosterStore::load(storage, DEFAULT_STORAGE_KEY)
}

fn assert_symmetric(students: &[Student]) {
    for student in students {
        assert!(!student.siblings.contains(&student.id), "self link on {}", student.id);
        for sibling_id in &student.siblings {
            let sibling = students
                .iter()
                .find(|s| s.id == *sibling_id)
                .unwrap_or_else(|| panic!("dangling sibling {}", sibling_id));
            assert!(
                sibling.siblings.contains(&student.id),
                "{} lists {} but not the reverse",
                student.id,
                sibling.id
            );
        }
    }
}

/// 新增兄弟姊妹後再移除，雙方的連結都要同步
#[test]
fn test_sibling_link_lifecycle() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = open_store(&temp_dir);

    let a = store.add(draft("Ada", "Lovelace", "12", &[]))?;
    let b = store.add(draft("Byron", "Lovelace", "12", &[a.id]))?;
    assert!(store.get(a.id).unwrap().siblings.contains(&b.id));

    let mut without_a = b.to_draft();
    without_a.siblings.clear();
    store.edit(b.id, without_a)?;

    assert!(!store.get(a.id).unwrap().siblings.contains(&b.id));
    assert!(store.get(b.id).unwrap().siblings.is_empty());
    assert_symmetric(store.students());
    Ok(())
}

#[test]
fn test_roster_round_trips_through_disk() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = open_store(&temp_dir);

    let a = store.add(draft("Ada", "Lovelace", "12", &[]))?;
    let b = store.add(draft("Byron", "Lovelace", "12", &[a.id]))?;
    let mut grace = draft("Grace", "Hopper", "301", &[]);
    grace.pm_route = true;
    grace.active = false;
    let g = store.add(grace)?;
    store.edit(g.id, draft("Grace", "Hopper", "302", &[]))?;
    store.link_siblings(g.id, &[b.id])?;

    let before = store.students().to_vec();
    let reloaded = open_store(&temp_dir);

    assert_eq!(reloaded.students(), before.as_slice());
    assert!(temp_dir.path().join("students.json").exists());
    Ok(())
}

#[test]
fn test_slot_is_json_array_of_camel_case_students() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = open_store(&temp_dir);
    let a = store.add(draft("Ada", "Lovelace", "12", &[]))?;

    let raw = std::fs::read_to_string(temp_dir.path().join("students.json"))?;
    let value: serde_json::Value = serde_json::from_str(&raw)?;

    let entries = value.as_array().expect("slot holds an array");
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["id"], a.id.to_string());
    assert_eq!(entries[0]["firstName"], "Ada");
    assert_eq!(entries[0]["amRoute"], true);
    assert_eq!(entries[0]["siblings"], serde_json::json!([]));
    Ok(())
}

#[test]
fn test_corrupt_file_starts_empty_and_recovers() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(temp_dir.path().join("students.json"), "[{\"id\": 42}")?;

    let mut store = open_store(&temp_dir);
    assert!(store.is_empty());

    store.add(draft("Ada", "Lovelace", "12", &[]))?;
    let reloaded = open_store(&temp_dir);
    assert_eq!(reloaded.len(), 1);
    Ok(())
}

#[test]
fn test_delete_removes_every_reference() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = open_store(&temp_dir);

    let a = store.add(draft("Ada", "Lovelace", "12", &[]))?;
    let b = store.add(draft("Byron", "Lovelace", "12", &[a.id]))?;
    let c = store.add(draft("Carl", "Lovelace", "12", &[a.id, b.id]))?;

    store.delete(a.id)?;

    let reloaded = open_store(&temp_dir);
    assert!(reloaded.get(a.id).is_none());
    assert!(reloaded.students().iter().all(|s| !s.siblings.contains(&a.id)));
    assert_eq!(reloaded.get(b.id).unwrap().siblings, BTreeSet::from([c.id]));
    assert_symmetric(reloaded.students());

    let err = store.delete(a.id).unwrap_err();
    assert!(matches!(err, BusMapError::NotFound { id } if id == a.id));
    Ok(())
}

#[test]
fn test_symmetry_holds_across_mixed_operations() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = open_store(&temp_dir);
    let names = ["Ada", "Byron", "Carl", "Dora", "Emil", "Fay"];

    let mut ids = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let siblings: Vec<StudentId> = ids.iter().copied().filter(|_| i % 2 == 0).collect();
        ids.push(store.add(draft(name, "Nguyen", "40", &siblings))?.id);
        assert_symmetric(store.students());
    }

    store.link_siblings(ids[1], &[ids[3], ids[5]])?;
    assert_symmetric(store.students());

    store.edit(ids[2], draft("Carl", "Nguyen", "41", &[ids[5]]))?;
    assert_symmetric(store.students());

    store.delete(ids[0])?;
    assert_symmetric(store.students());

    store.edit(ids[5], draft("Fay", "Nguyen", "40", &[]))?;
    assert_symmetric(store.students());
    assert!(store.get(ids[5]).unwrap().siblings.is_empty());

    assert_symmetric(open_store(&temp_dir).students());
    Ok(())
}

#[test]
fn test_validate_then_submit_flow() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let mut store = open_store(&temp_dir);
    let a = store.add(draft("Ada", "Lovelace", "12", &[]))?;

    let duplicate = draft("ada", "LOVELACE", "99", &[]);
    let err = validate_student(&duplicate, store.students(), None).unwrap_err();
    let BusMapError::InvalidStudent(errors) = err else {
        panic!("expected InvalidStudent");
    };
    assert_eq!(errors.get("student"), Some("A student with this name already exists"));

    // editing the same student keeps its own name
    let renamed = draft("Ada", "Lovelace", "13", &[]);
    validate_student(&renamed, store.students(), Some(a.id))?;
    store.edit(a.id, renamed)?;
    assert_eq!(store.get(a.id).unwrap().stop_number, "13");

    let active = store.query(&StudentFilter {
        search: Some("love".to_string()),
        active_only: true,
        sibling_of: None,
    });
    assert_eq!(active.len(), 1);
    Ok(())
}
