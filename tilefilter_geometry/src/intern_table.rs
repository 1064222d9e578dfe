use anyhow::{Result, anyhow};
use std::{collections::HashMap, fmt::Debug, hash::Hash};

/// An append-only table that assigns each distinct entry a dense `u32` index.
///
/// Used for the key and value tables of a [`TileLayer`](crate::TileLayer).
#[derive(Clone, PartialEq)]
pub struct InternTable<T>
where
	T: Clone + Eq + Hash,
{
	list: Vec<T>,
	map: HashMap<T, u32>,
}

impl<T> InternTable<T>
where
	T: Clone + Debug + Eq + Hash,
{
	#[must_use]
	pub fn new() -> InternTable<T> {
		InternTable {
			list: Vec::new(),
			map: HashMap::new(),
		}
	}

	/// Index of `entry`, adding it first if needed.
	pub fn add(&mut self, entry: T) -> u32 {
		if let Some(index) = self.map.get(&entry) {
			return *index;
		}
		let index = self.list.len() as u32;
		self.map.insert(entry.clone(), index);
		self.list.push(entry);
		index
	}

	pub fn find(&self, entry: &T) -> Option<u32> {
		self.map.get(entry).copied()
	}

	pub fn get(&self, id: u32) -> Result<&T> {
		self
			.list
			.get(id as usize)
			.ok_or_else(|| anyhow!("index {id} not found in table of {} entries", self.list.len()))
	}

	pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
		self.list.iter()
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.list.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.list.is_empty()
	}
}

impl<T: Clone + Debug + Eq + Hash> Default for InternTable<T> {
	fn default() -> InternTable<T> {
		InternTable::new()
	}
}

impl<T> Debug for InternTable<T>
where
	T: Clone + Debug + Eq + Hash,
{
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_list().entries(&self.list).finish()
	}
}
