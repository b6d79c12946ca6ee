use crate::domain::model::{Student, StudentDraft, StudentId};
use crate::domain::ports::Storage;
use crate::utils::error::{BusMapError, Result};
use chrono::Utc;
use std::collections::BTreeSet;
use uuid::Uuid;

pub const DEFAULT_STORAGE_KEY: &str = "students";

/// Read-side predicates for [`RosterStore::query`]. All set predicates must hold.
#[derive(Debug, Clone, Default)]
pub struct StudentFilter {
    /// Case-insensitive substring of "first last", taken as typed. Empty
    /// matches everyone.
    pub search: Option<String>,
    pub active_only: bool,
    /// Students that list this id as a sibling.
    pub sibling_of: Option<StudentId>,
}

impl StudentFilter {
    pub fn matches(&self, student: &Student) -> bool {
        if self.active_only && !student.active {
            return false;
        }

        if let Some(sibling_id) = self.sibling_of {
            if student.id == sibling_id || !student.siblings.contains(&sibling_id) {
                return false;
            }
        }

        match self.search.as_deref() {
            Some(term) if !term.is_empty() => student
                .full_name()
                .to_lowercase()
                .contains(&term.to_lowercase()),
            _ => true,
        }
    }
}

/// The roster aggregate. Owns every student and keeps sibling links symmetric;
/// every successful mutation is written through to the storage slot.
pub struct RosterStore<S: Storage> {
    storage: S,
    key: String,
    students: Vec<Student>,
}

impl<S: Storage> RosterStore<S> {
    /// Loads the roster from `key`. A missing or unreadable slot yields an
    /// empty roster.
    pub fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let students = match storage.read_slot(&key) {
            Ok(Some(data)) => match serde_json::from_slice::<Vec<Student>>(&data) {
                Ok(students) => {
                    tracing::debug!("Loaded {} students from slot '{}'", students.len(), key);
                    repair_links(students)
                }
                Err(e) => {
                    tracing::warn!("⚠️ Slot '{}' is corrupt, starting empty: {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => {
                tracing::debug!("Slot '{}' is empty, starting a new roster", key);
                Vec::new()
            }
            Err(e) => {
                tracing::warn!("⚠️ Could not read slot '{}', starting empty: {}", key, e);
                Vec::new()
            }
        };

        Self {
            storage,
            key,
            students,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn get(&self, id: StudentId) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    pub fn query(&self, filter: &StudentFilter) -> Vec<&Student> {
        self.students.iter().filter(|s| filter.matches(s)).collect()
    }

    /// Ids among `ids` that name no student in the roster, in input order.
    pub fn missing_ids<'a, I>(&self, ids: I) -> Vec<StudentId>
    where
        I: IntoIterator<Item = &'a StudentId>,
    {
        ids.into_iter()
            .copied()
            .filter(|id| self.get(*id).is_none())
            .collect()
    }

    pub fn add(&mut self, draft: StudentDraft) -> Result<Student> {
        let id = Uuid::new_v4();
        let mut student = Student::from_draft(id, draft);
        student.siblings = self.known_siblings(id, &student.siblings);
        student.created_at = Some(Utc::now());

        let snapshot = self.students.clone();
        for sibling_id in &student.siblings {
            self.link_one_way(*sibling_id, id);
        }
        self.students.push(student.clone());
        self.commit(snapshot)?;

        tracing::info!("➕ Added {} ({})", student.full_name(), id);
        Ok(student)
    }

    pub fn edit(&mut self, id: StudentId, draft: StudentDraft) -> Result<Student> {
        let index = self.index_of(id)?;
        let new_siblings = self.known_siblings(id, &draft.siblings);
        let old_siblings = self.students[index].siblings.clone();

        let snapshot = self.students.clone();
        for added in new_siblings.difference(&old_siblings) {
            self.link_one_way(*added, id);
        }
        for removed in old_siblings.difference(&new_siblings) {
            self.unlink_one_way(*removed, id);
        }

        let previous = &self.students[index];
        let mut updated = Student::from_draft(id, draft);
        updated.siblings = new_siblings;
        updated.created_at = previous.created_at;
        updated.updated_at = Some(Utc::now());
        self.students[index] = updated.clone();
        self.commit(snapshot)?;

        tracing::info!("✏️ Updated {} ({})", updated.full_name(), id);
        Ok(updated)
    }

    pub fn delete(&mut self, id: StudentId) -> Result<Student> {
        let index = self.index_of(id)?;

        let snapshot = self.students.clone();
        let removed = self.students.remove(index);
        for student in &mut self.students {
            student.siblings.remove(&id);
        }
        self.commit(snapshot)?;

        tracing::info!("🗑️ Deleted {} ({})", removed.full_name(), id);
        Ok(removed)
    }

    /// Links `id` with each of `other_ids` in both directions. Existing links
    /// are kept; ids that are unknown or equal to `id` are skipped.
    pub fn link_siblings(&mut self, id: StudentId, other_ids: &[StudentId]) -> Result<()> {
        self.index_of(id)?;

        let requested: BTreeSet<StudentId> = other_ids.iter().copied().collect();
        let targets = self.known_siblings(id, &requested);

        let snapshot = self.students.clone();
        for other_id in &targets {
            self.link_one_way(*other_id, id);
            self.link_one_way(id, *other_id);
        }
        self.commit(snapshot)?;

        tracing::info!("🔗 Linked {} with {} sibling(s)", id, targets.len());
        Ok(())
    }

    fn index_of(&self, id: StudentId) -> Result<usize> {
        self.students
            .iter()
            .position(|s| s.id == id)
            .ok_or(BusMapError::NotFound { id })
    }

    /// Drops ids that name no student in the roster, and `owner` itself.
    fn known_siblings(&self, owner: StudentId, ids: &BTreeSet<StudentId>) -> BTreeSet<StudentId> {
        ids.iter()
            .copied()
            .filter(|sibling_id| {
                let keep = *sibling_id != owner && self.get(*sibling_id).is_some();
                if !keep {
                    tracing::debug!("Ignoring sibling id {} for {}", sibling_id, owner);
                }
                keep
            })
            .collect()
    }

    fn link_one_way(&mut self, target: StudentId, sibling: StudentId) {
        if let Some(student) = self.students.iter_mut().find(|s| s.id == target) {
            student.siblings.insert(sibling);
        }
    }

    fn unlink_one_way(&mut self, target: StudentId, sibling: StudentId) {
        if let Some(student) = self.students.iter_mut().find(|s| s.id == target) {
            student.siblings.remove(&sibling);
        }
    }

    /// Writes the whole roster; on failure the roster is restored to `snapshot`.
    fn commit(&mut self, snapshot: Vec<Student>) -> Result<()> {
        let payload = match serde_json::to_vec(&self.students) {
            Ok(payload) => payload,
            Err(e) => {
                self.students = snapshot;
                return Err(e.into());
            }
        };

        if let Err(e) = self.storage.write_slot(&self.key, &payload) {
            tracing::error!("❌ Failed to save roster to slot '{}': {}", self.key, e);
            self.students = snapshot;
            return Err(BusMapError::PersistenceError {
                key: self.key.clone(),
                reason: e.to_string(),
            });
        }

        tracing::debug!("Saved {} students to slot '{}'", self.students.len(), self.key);
        Ok(())
    }
}

/// Restores symmetry on a roster read from storage: dangling and self ids are
/// dropped, one-sided links are completed.
fn repair_links(mut students: Vec<Student>) -> Vec<Student> {
    let known: BTreeSet<StudentId> = students.iter().map(|s| s.id).collect();
    let mut pairs = Vec::new();

    for student in &mut students {
        let id = student.id;
        student.siblings.retain(|sibling_id| *sibling_id != id && known.contains(sibling_id));
        pairs.extend(student.siblings.iter().map(|sibling_id| (*sibling_id, id)));
    }

    for (target, sibling) in pairs {
        if let Some(student) = students.iter_mut().find(|s| s.id == target) {
            if student.siblings.insert(sibling) {
                tracing::debug!("Repaired one-sided sibling link {} -> {}", target, sibling);
            }
        }
    }

    students
}
