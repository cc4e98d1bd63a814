//! Generational arenas for mesh elements.
//!
//! Vertices, half-edges, and faces are stored in slot arenas keyed by
//! typed handles carrying a generation counter. Removing an element bumps
//! its slot's generation, so a handle held across a deletion stops
//! resolving instead of silently aliasing whatever reuses the slot.

use core::fmt;
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};

use sealed::KeyFromParts;

mod sealed {
    /// Raw key construction, reserved for the arenas in this crate.
    pub trait KeyFromParts {
        fn from_parts(index: u32, generation: u32) -> Self;
    }
}

/// A typed arena key: a slot index plus the generation it was issued at.
///
/// This trait is sealed; keys can only be issued by the arenas in this
/// crate, so a live key always originated from an `insert`.
pub trait ArenaKey: Copy + Eq + KeyFromParts {
    /// Slot index inside the arena.
    fn index(self) -> u32;
    /// Generation the key was issued at.
    fn generation(self) -> u32;
}

macro_rules! arena_key {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            index: u32,
            generation: u32,
        }

        impl $name {
            /// Placeholder used while connectivity is under construction.
            /// Never resolves in any arena.
            pub(crate) const DANGLING: Self = Self {
                index: u32::MAX,
                generation: u32::MAX,
            };
        }

        impl $crate::arena::sealed::KeyFromParts for $name {
            fn from_parts(index: u32, generation: u32) -> Self {
                Self { index, generation }
            }
        }

        impl ArenaKey for $name {
            fn index(self) -> u32 {
                self.index
            }

            fn generation(self) -> u32 {
                self.generation
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}v{}", self.index, self.generation)
            }
        }
    };
}

arena_key!(
    /// Handle to a vertex in a [`Mesh`](crate::Mesh).
    VertexId
);
arena_key!(
    /// Handle to a half-edge in a [`Mesh`](crate::Mesh).
    EdgeId
);
arena_key!(
    /// Handle to a face in a [`Mesh`](crate::Mesh).
    FaceId
);

#[derive(Debug, Clone)]
struct Slot<T> {
    generation: u32,
    value: Option<T>,
}

/// A slot arena issuing generational keys of type `K`.
#[derive(Debug, Clone)]
pub struct Arena<T, K: ArenaKey> {
    slots: Vec<Slot<T>>,
    free: Vec<u32>,
    live: usize,
    _key: PhantomData<K>,
}

impl<T, K: ArenaKey> Default for Arena<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, K: ArenaKey> Arena<T, K> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
            _key: PhantomData,
        }
    }

    /// Creates an empty arena with room for `capacity` elements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            live: 0,
            _key: PhantomData,
        }
    }

    /// Number of live elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live
    }

    /// Whether the arena holds no live elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Inserts a value, reusing a freed slot when one is available.
    pub fn insert(&mut self, value: T) -> K {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.value.is_none());
            slot.value = Some(value);
            K::from_parts(index, slot.generation)
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
            self.slots.push(Slot {
                generation: 0,
                value: Some(value),
            });
            K::from_parts(index, 0)
        }
    }

    /// Removes the element behind `key`, returning it if the key was live.
    ///
    /// The slot's generation is bumped, so the removed key (and any copy
    /// of it) stops resolving immediately.
    pub fn remove(&mut self, key: K) -> Option<T> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation != key.generation() || slot.value.is_none() {
            return None;
        }
        slot.generation = slot.generation.wrapping_add(1);
        self.live -= 1;
        self.free.push(key.index());
        slot.value.take()
    }

    /// Removes every live element, bumping each occupied slot's
    /// generation so outstanding keys stop resolving. Freed slots are
    /// reused lowest index first.
    pub fn clear(&mut self) {
        self.free.clear();
        for (index, slot) in self.slots.iter_mut().enumerate().rev() {
            if slot.value.is_some() {
                slot.value = None;
                slot.generation = slot.generation.wrapping_add(1);
            }
            #[allow(clippy::cast_possible_truncation)]
            self.free.push(index as u32);
        }
        self.live = 0;
    }

    /// Whether `key` still resolves to a live element.
    #[must_use]
    pub fn contains(&self, key: K) -> bool {
        self.get(key).is_some()
    }

    /// Shared access to the element behind `key`, if still live.
    #[must_use]
    pub fn get(&self, key: K) -> Option<&T> {
        let slot = self.slots.get(key.index() as usize)?;
        if slot.generation == key.generation() {
            slot.value.as_ref()
        } else {
            None
        }
    }

    /// Mutable access to the element behind `key`, if still live.
    pub fn get_mut(&mut self, key: K) -> Option<&mut T> {
        let slot = self.slots.get_mut(key.index() as usize)?;
        if slot.generation == key.generation() {
            slot.value.as_mut()
        } else {
            None
        }
    }

    /// Iterates live elements in slot order with their keys.
    pub fn iter(&self) -> impl Iterator<Item = (K, &T)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let value = slot.value.as_ref()?;
            #[allow(clippy::cast_possible_truncation)]
            Some((K::from_parts(index as u32, slot.generation), value))
        })
    }

    /// Iterates live elements mutably in slot order with their keys.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (K, &mut T)> {
        self.slots
            .iter_mut()
            .enumerate()
            .filter_map(|(index, slot)| {
                let generation = slot.generation;
                let value = slot.value.as_mut()?;
                #[allow(clippy::cast_possible_truncation)]
                Some((K::from_parts(index as u32, generation), value))
            })
    }

    /// Iterates the keys of live elements in slot order.
    pub fn keys(&self) -> impl Iterator<Item = K> + '_ {
        self.iter().map(|(key, _)| key)
    }
}

impl<T, K: ArenaKey> Index<K> for Arena<T, K> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `key` is stale or was never issued by this arena.
    fn index(&self, key: K) -> &T {
        match self.get(key) {
            Some(value) => value,
            None => panic!("stale arena key: slot {}", key.index()),
        }
    }
}

impl<T, K: ArenaKey> IndexMut<K> for Arena<T, K> {
    fn index_mut(&mut self, key: K) -> &mut T {
        match self.get_mut(key) {
            Some(value) => value,
            None => panic!("stale arena key: slot {}", key.index()),
        }
    }
}
