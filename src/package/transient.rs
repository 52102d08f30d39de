use crate::error::ShapeMismatch;

use ndarray::Array2;
use std::collections::BTreeMap;

/// 2D arrays keyed by (zero-based) stress period.
///
/// A period without its own array uses the array of the latest period before it.
#[derive(Debug, Clone, PartialEq)]
pub struct Transient2d<T> {
    shape: (usize, usize),
    entries: BTreeMap<usize, Array2<T>>,
}

/// How a stress period is stored
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KperEntry<'a, T> {
    /// the period has its own array
    Defined(&'a Array2<T>),
    /// the period re-uses an earlier array
    Reuse,
    /// no array at or before the period
    Undefined,
}

impl<T: Clone> Transient2d<T> {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            shape,
            entries: BTreeMap::new(),
        }
    }

    /// the same value everywhere, for every period
    pub fn constant(shape: (usize, usize), value: T) -> Self {
        let mut transient = Self::new(shape);
        transient.entries.insert(0, Array2::from_elem(shape, value));
        transient
    }

    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn insert(&mut self, kper: usize, array: Array2<T>) -> Result<(), ShapeMismatch> {
        if array.dim() != self.shape {
            return Err(ShapeMismatch::new(
                "transient array".into(),
                vec![self.shape.0, self.shape.1],
                array.shape().to_vec(),
            ));
        }
        self.entries.insert(kper, array);
        Ok(())
    }

    pub fn with(mut self, kper: usize, array: Array2<T>) -> Result<Self, ShapeMismatch> {
        self.insert(kper, array)?;
        Ok(self)
    }

    /// array in effect during `kper`
    pub fn get(&self, kper: usize) -> Option<&Array2<T>> {
        self.entries.range(..=kper).next_back().map(|(_, array)| array)
    }

    pub fn kper_entry(&self, kper: usize) -> KperEntry<'_, T> {
        match self.entries.get(&kper) {
            Some(array) => KperEntry::Defined(array),
            None if self.get(kper).is_some() => KperEntry::Reuse,
            None => KperEntry::Undefined,
        }
    }

    /// periods with their own array
    pub fn periods(&self) -> impl Iterator<Item = usize> + '_ {
        self.entries.keys().copied()
    }
}
