use std::collections::HashMap;

use boardsync_common::Orderable;
use boardsync_common::order::{self, move_across_containers, position_of, reorder};

use crate::errors::DragError;

/// Callback fired after a container's list changes.
pub type ChangeListener<T> = Box<dyn FnMut(&str, &[T])>;

/// Where an item currently sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub container_id: String,
    pub index: usize,
}

impl Location {
    pub fn new(container_id: impl Into<String>, index: usize) -> Self {
        Self {
            container_id: container_id.into(),
            index,
        }
    }
}

/// Per-session registry of the ordered lists on screen.
///
/// Each container's owner registers its list and a listener; cross-container
/// moves go through here so both sides change together. Created per board
/// session and dropped with it.
pub struct ContainerRegistry<T> {
    lists: HashMap<String, Vec<T>>,
    listeners: HashMap<String, Vec<ChangeListener<T>>>,
}

impl<T> Default for ContainerRegistry<T> {
    fn default() -> Self {
        Self {
            lists: HashMap::new(),
            listeners: HashMap::new(),
        }
    }
}

impl<T> ContainerRegistry<T>
where
    T: Orderable + Clone,
{
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a container's list. The list is sorted by its
    /// current orders and renumbered.
    pub fn register(&mut self, container_id: impl Into<String>, mut items: Vec<T>) {
        let container_id = container_id.into();
        for item in &mut items {
            item.set_container_id(&container_id);
        }
        order::normalize(&mut items);
        self.lists.insert(container_id.clone(), items);
        self.notify(&container_id);
    }

    /// Tear a container down, returning its last list.
    pub fn unregister(&mut self, container_id: &str) -> Option<Vec<T>> {
        self.listeners.remove(container_id);
        self.lists.remove(container_id)
    }

    pub fn watch(&mut self, container_id: impl Into<String>, listener: ChangeListener<T>) {
        self.listeners
            .entry(container_id.into())
            .or_default()
            .push(listener);
    }

    pub fn contains(&self, container_id: &str) -> bool {
        self.lists.contains_key(container_id)
    }

    pub fn items(&self, container_id: &str) -> Option<&[T]> {
        self.lists.get(container_id).map(Vec::as_slice)
    }

    pub fn len(&self, container_id: &str) -> Option<usize> {
        self.lists.get(container_id).map(Vec::len)
    }

    pub fn container_ids(&self) -> impl Iterator<Item = &str> {
        self.lists.keys().map(String::as_str)
    }

    pub fn get(&self, uid: &str) -> Option<&T> {
        let loc = self.locate(uid)?;
        self.lists.get(&loc.container_id)?.get(loc.index)
    }

    pub fn locate(&self, uid: &str) -> Option<Location> {
        self.lists.iter().find_map(|(container_id, items)| {
            position_of(items, uid).map(|index| Location::new(container_id.clone(), index))
        })
    }

    /// Uids of a container in order.
    pub fn uids(&self, container_id: &str) -> Vec<String> {
        self.lists
            .get(container_id)
            .map(|items| items.iter().map(|i| i.uid().to_string()).collect())
            .unwrap_or_default()
    }

    /// Every registered list satisfies the dense index invariant.
    pub fn is_dense(&self) -> bool {
        self.lists.values().all(|items| order::is_dense(items))
    }

    /// Move within one container (`from`/`to` must both be valid indices).
    pub fn move_within(
        &mut self,
        container_id: &str,
        from: usize,
        to: usize,
    ) -> Result<(), DragError> {
        let items = self.list(container_id)?;
        let updated = reorder(items, from, to)?;
        self.lists.insert(container_id.to_string(), updated);
        self.notify(container_id);
        Ok(())
    }

    /// Move `uid` from its current container into `to_container` at `index`.
    pub fn move_between(
        &mut self,
        uid: &str,
        to_container: &str,
        index: usize,
    ) -> Result<(), DragError> {
        let from = self
            .locate(uid)
            .ok_or_else(|| DragError::UnknownItem { uid: uid.to_string() })?;
        let source = self.list(&from.container_id)?;
        let dest = self.list(to_container)?;
        let (source, dest) = move_across_containers(source, dest, to_container, uid, index)?;
        self.lists.insert(from.container_id.clone(), source);
        self.lists.insert(to_container.to_string(), dest);
        self.notify(&from.container_id);
        self.notify(to_container);
        Ok(())
    }

    /// Put `uid` at `index` of `container_id`, wherever it currently is.
    /// A no-op when it is already there.
    pub fn place(&mut self, uid: &str, container_id: &str, index: usize) -> Result<(), DragError> {
        let current = self
            .locate(uid)
            .ok_or_else(|| DragError::UnknownItem { uid: uid.to_string() })?;
        if current.container_id == container_id {
            if current.index == index {
                return Ok(());
            }
            self.move_within(container_id, current.index, index)
        } else {
            self.move_between(uid, container_id, index)
        }
    }

    /// Insert a new item at the end of its container.
    pub fn insert(&mut self, mut item: T) -> Result<(), DragError> {
        let container_id = item.container_id().to_string();
        let items = self
            .lists
            .get_mut(&container_id)
            .ok_or_else(|| DragError::UnknownContainer { id: container_id.clone() })?;
        if position_of(items, item.uid()).is_none() {
            item.set_order(items.len() as u32);
            items.push(item);
            self.notify(&container_id);
        }
        Ok(())
    }

    /// Remove `uid` from wherever it is, renumbering the container.
    pub fn remove(&mut self, uid: &str) -> Option<T> {
        let loc = self.locate(uid)?;
        let items = self.lists.get_mut(&loc.container_id)?;
        let removed = items.remove(loc.index);
        order::renumber(items);
        self.notify(&loc.container_id);
        Some(removed)
    }

    /// Rebuild `container_id` to follow `canonical` exactly.
    ///
    /// Items named in `canonical` are pulled in from any other registered
    /// container. Uids unknown locally are skipped and reported; local items
    /// missing from `canonical` keep their relative order after the known
    /// ones. Unregistered containers only lose the named items.
    pub fn align(&mut self, container_id: &str, canonical: &[String]) -> AlignReport {
        let mut report = AlignReport::default();

        if !self.lists.contains_key(container_id) {
            for uid in canonical {
                if self.remove(uid).is_some() {
                    report.pulled += 1;
                }
            }
            return report;
        }

        let mut aligned = Vec::with_capacity(canonical.len());
        for uid in canonical {
            let here = self
                .lists
                .get(container_id)
                .and_then(|items| position_of(items, uid));
            let taken = match here {
                Some(index) => self.lists.get_mut(container_id).map(|items| items.remove(index)),
                None => {
                    let pulled = self.remove(uid);
                    if pulled.is_some() {
                        report.pulled += 1;
                    }
                    pulled
                }
            };
            match taken {
                Some(mut item) => {
                    item.set_container_id(container_id);
                    aligned.push(item);
                }
                None => report.missing.push(uid.clone()),
            }
        }

        let leftovers = self.lists.remove(container_id).unwrap_or_default();
        report.stale = leftovers.iter().map(|i| i.uid().to_string()).collect();
        aligned.extend(leftovers);
        order::renumber(&mut aligned);

        self.lists.insert(container_id.to_string(), aligned);
        self.notify(container_id);
        report
    }

    fn list(&self, container_id: &str) -> Result<&[T], DragError> {
        self.lists
            .get(container_id)
            .map(Vec::as_slice)
            .ok_or_else(|| DragError::UnknownContainer {
                id: container_id.to_string(),
            })
    }

    fn notify(&mut self, container_id: &str) {
        let Some(items) = self.lists.get(container_id) else {
            return;
        };
        if let Some(listeners) = self.listeners.get_mut(container_id) {
            for listener in listeners.iter_mut() {
                listener(container_id, items);
            }
        }
    }
}

/// Outcome of [`ContainerRegistry::align`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AlignReport {
    /// Items moved in from another registered container.
    pub pulled: usize,
    /// Canonical uids this client does not hold.
    pub missing: Vec<String>,
    /// Local items the canonical order does not mention.
    pub stale: Vec<String>,
}

impl AlignReport {
    /// The local view diverged in a way only a refetch can repair.
    pub fn needs_refetch(&self) -> bool {
        !self.missing.is_empty() || !self.stale.is_empty()
    }
}
