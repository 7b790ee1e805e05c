#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

use crate::ItemKey;

#[cfg(feature = "std")]
pub(crate) type KeyMap<V> = HashMap<ItemKey, V>;
#[cfg(not(feature = "std"))]
pub(crate) type KeyMap<V> = BTreeMap<ItemKey, V>;

/// Measured heights by item identity. Survives repartitions.
pub(crate) type KeySizeMap = KeyMap<u32>;
