use crate::{Item, ItemKind, Orientation, WallError};

/// Predicts an item's height before it has been laid out.
///
/// Battles get a fixed height class. Photos get `base_unit` scaled by orientation. Scales are in
/// permille so estimates are integer-exact and identical on every platform.
///
/// The estimate only needs to be close enough that the initial scroll height and overscan sizing
/// are sane; real measurements replace it later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SizeEstimator {
    pub base_unit: u32,
    pub battle_height: u32,
    pub portrait_permille: u32,
    pub landscape_permille: u32,
    /// Used for `Square` and `Unknown`.
    pub square_permille: u32,
    pub min_height: u32,
}

impl Default for SizeEstimator {
    fn default() -> Self {
        Self {
            base_unit: 400,
            battle_height: 640,
            portrait_permille: 1400,
            landscape_permille: 700,
            square_permille: 1000,
            min_height: 1,
        }
    }
}

impl SizeEstimator {
    pub fn with_base_unit(mut self, base_unit: u32) -> Self {
        self.base_unit = base_unit;
        self
    }

    pub fn with_battle_height(mut self, battle_height: u32) -> Self {
        self.battle_height = battle_height;
        self
    }

    pub fn estimate(&self, item: &Item) -> u32 {
        let height = match item.kind {
            ItemKind::Battle => self.battle_height,
            ItemKind::Photo => scale(self.base_unit, self.permille_for(item.orientation)),
        };
        height.max(self.min_height).max(1)
    }

    pub fn permille_for(&self, orientation: Orientation) -> u32 {
        match orientation {
            Orientation::Portrait => self.portrait_permille,
            Orientation::Landscape => self.landscape_permille,
            Orientation::Square | Orientation::Unknown => self.square_permille,
        }
    }

    pub fn validate(&self) -> Result<(), WallError> {
        let fields = [
            ("base_unit", self.base_unit),
            ("battle_height", self.battle_height),
            ("portrait_permille", self.portrait_permille),
            ("landscape_permille", self.landscape_permille),
            ("square_permille", self.square_permille),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(WallError::InvalidEstimator { field });
            }
        }
        Ok(())
    }
}

fn scale(base: u32, permille: u32) -> u32 {
    let scaled = (base as u64 * permille as u64 + 500) / 1000;
    scaled.min(u32::MAX as u64) as u32
}
