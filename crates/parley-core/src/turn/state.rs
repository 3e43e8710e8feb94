//! Per-turn side-channel state.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use parking_lot::Mutex;

/// Type-keyed storage shared by every hook of one turn.
///
/// Only one value per type can be stored; subsequent calls overwrite. The map
/// lives inside the [`TurnContext`](crate::TurnContext), so every view of the
/// turn observes the same values.
#[derive(Default)]
pub struct TurnState {
    values: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl TurnState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing any previous value of the same type.
    pub fn set<T: Send + Sync + 'static>(&self, value: T) {
        self.values.lock().insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a cloned value.
    pub fn get<T: Clone + 'static>(&self) -> Option<T> {
        self.values
            .lock()
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
            .cloned()
    }

    /// Returns `true` if a value of type `T` is stored.
    pub fn contains<T: 'static>(&self) -> bool {
        self.values.lock().contains_key(&TypeId::of::<T>())
    }

    /// Removes and returns a value.
    pub fn take<T: 'static>(&self) -> Option<T> {
        self.values
            .lock()
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|v| *v)
    }

    /// Mutates a stored value in place, inserting `T::default()` first if absent.
    pub fn update<T, R>(&self, f: impl FnOnce(&mut T) -> R) -> R
    where
        T: Default + Send + Sync + 'static,
    {
        let mut values = self.values.lock();
        if let Some(value) = values
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut::<T>())
        {
            return f(value);
        }

        let mut value = T::default();
        let result = f(&mut value);
        values.insert(TypeId::of::<T>(), Box::new(value));
        result
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.values.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.lock().is_empty()
    }
}

impl std::fmt::Debug for TurnState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TurnState")
            .field("len", &self.len())
            .finish()
    }
}
