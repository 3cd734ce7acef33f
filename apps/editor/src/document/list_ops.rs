//! Pure operations on ordered record lists.
//!
//! Inputs are never modified; every operation returns a fresh `Vec` so a caller can
//! keep the previous list around (the store hands out snapshots of it).

use crate::errors::EditorError;

/// Inserts `item` at `position`, or at the end when `position` is `None`.
/// `position == len` is an append.
pub fn insert_at<T: Clone>(list: &[T], item: T, position: Option<usize>) -> Result<Vec<T>, EditorError> {
    let position = position.unwrap_or(list.len());
    if position > list.len() {
        return Err(EditorError::IndexOutOfRange {
            index: position,
            len: list.len(),
        });
    }

    let mut next = Vec::with_capacity(list.len() + 1);
    next.extend_from_slice(&list[..position]);
    next.push(item);
    next.extend_from_slice(&list[position..]);
    Ok(next)
}

pub fn remove_at<T: Clone>(list: &[T], index: usize) -> Result<Vec<T>, EditorError> {
    check_index(list, index)?;
    Ok(list
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, item)| item.clone())
        .collect())
}

pub fn replace_at<T: Clone>(list: &[T], index: usize, item: T) -> Result<Vec<T>, EditorError> {
    check_index(list, index)?;
    let mut next = list.to_vec();
    next[index] = item;
    Ok(next)
}

fn check_index<T>(list: &[T], index: usize) -> Result<(), EditorError> {
    if index >= list.len() {
        return Err(EditorError::IndexOutOfRange {
            index,
            len: list.len(),
        });
    }
    Ok(())
}
