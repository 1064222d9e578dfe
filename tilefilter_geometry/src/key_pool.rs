use std::{
	collections::HashSet,
	sync::{Arc, Mutex, PoisonError},
};

/// A thread-safe pool of attribute key names.
///
/// Every distinct key is stored once; features hold cheap `Arc<str>` handles into the pool.
/// One pool is shared by all workers.
#[derive(Debug, Default)]
pub struct KeyPool {
	keys: Mutex<HashSet<Arc<str>>>,
}

impl KeyPool {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Handle for `key`, shared with every earlier request for the same name.
	pub fn pool(&self, key: &str) -> Arc<str> {
		let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
		if let Some(existing) = keys.get(key) {
			return Arc::clone(existing);
		}
		let handle: Arc<str> = Arc::from(key);
		keys.insert(Arc::clone(&handle));
		handle
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.keys.lock().unwrap_or_else(PoisonError::into_inner).len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}
}
