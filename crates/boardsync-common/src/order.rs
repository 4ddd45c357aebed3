//! Local reorder engine.
//!
//! Pure functions over ordered lists. Every mutation rewrites the `order` of
//! every element to its position, so `order == index` always holds for the
//! returned lists and the dense index invariant is trivially checkable with
//! [`is_dense`].
//!
//! Indices are validated, never clamped: an out-of-range index returns
//! [`ReorderError::IndexOutOfRange`].

use crate::error::ReorderError;
use crate::model::Orderable;

/// Move the element at `from` to `to` and renumber.
///
/// Both indices must be `< items.len()`.
pub fn reorder<T>(items: &[T], from: usize, to: usize) -> Result<Vec<T>, ReorderError>
where
    T: Orderable + Clone,
{
    let len = items.len();
    for index in [from, to] {
        if index >= len {
            return Err(ReorderError::IndexOutOfRange { index, len });
        }
    }

    let mut out = items.to_vec();
    let moved = out.remove(from);
    out.insert(to, moved);
    renumber(&mut out);
    Ok(out)
}

/// Move `item_uid` out of `source` and into `dest` at `dest_index`.
///
/// `dest_index` may equal `dest.len()` (append). The moved item takes
/// `dest_container_id`; both returned lists are renumbered.
pub fn move_across_containers<T>(
    source: &[T],
    dest: &[T],
    dest_container_id: &str,
    item_uid: &str,
    dest_index: usize,
) -> Result<(Vec<T>, Vec<T>), ReorderError>
where
    T: Orderable + Clone,
{
    let from = position_of(source, item_uid).ok_or_else(|| ReorderError::ItemNotFound {
        uid: item_uid.to_string(),
    })?;
    if source[from].container_id() == dest_container_id {
        return Err(ReorderError::SameContainer {
            container_id: dest_container_id.to_string(),
        });
    }
    if dest_index > dest.len() {
        return Err(ReorderError::IndexOutOfRange {
            index: dest_index,
            len: dest.len(),
        });
    }

    let mut new_source = source.to_vec();
    let mut moved = new_source.remove(from);
    moved.set_container_id(dest_container_id);

    let mut new_dest = dest.to_vec();
    new_dest.insert(dest_index, moved);

    renumber(&mut new_source);
    renumber(&mut new_dest);
    Ok((new_source, new_dest))
}

/// Rewrite every element's order to its index.
pub fn renumber<T: Orderable>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(index as u32);
    }
}

/// `true` when the orders are exactly `0..len` in sequence.
pub fn is_dense<T: Orderable>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.order() as usize == index)
}

/// Sort by `order` (stable on ties) and renumber. Used when ingesting lists
/// from an untrusted or stale source.
pub fn normalize<T: Orderable>(items: &mut Vec<T>) {
    items.sort_by_key(|item| item.order());
    renumber(items);
}

pub fn position_of<T: Orderable>(items: &[T], uid: &str) -> Option<usize> {
    items.iter().position(|item| item.uid() == uid)
}
