use wallgrid::{ItemKey, VisibleItem};

#[cfg(feature = "std")]
pub(crate) type KeyIndex<'a> = std::collections::HashMap<&'a ItemKey, &'a VisibleItem>;

#[cfg(not(feature = "std"))]
pub(crate) type KeyIndex<'a> = alloc::collections::BTreeMap<&'a ItemKey, &'a VisibleItem>;
