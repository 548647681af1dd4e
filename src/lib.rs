//! An ordered map and an ordered set implemented with an AVL tree.
//!
//! Every node owns its children, caches the height of its subtree and is
//! rebalanced by rotations on the way back up from each insert or removal,
//! so single-key operations take O(log n) time.
//!
//! ```
//! use ordered_map::{KeyNotFound, OrderedMap};
//!
//! let mut map = OrderedMap::new();
//! assert!(map.insert(5, "five"));
//! assert!(map.insert(3, "three"));
//! assert!(map.insert(7, "seven"));
//! assert!(!map.insert(7, "sieben"));
//!
//! let mut listing = Vec::new();
//! map.traverse_in_order(|k, v| listing.push((*k, *v)));
//! assert_eq!(listing, [(3, "three"), (5, "five"), (7, "seven")]);
//!
//! assert_eq!(map.get(&4), Err(KeyNotFound));
//! ```

mod error;
pub mod map;
pub mod set;

pub use error::KeyNotFound;
pub use map::OrderedMap;
pub use set::OrderedSet;

#[cfg(test)]
mod proptests;
