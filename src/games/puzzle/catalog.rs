//! Static catalog of puzzle images.

use derive_getters::Getters;
use derive_more::{Display, Error};
use derive_new::new;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

/// Image reference and title for one puzzle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Getters, new)]
pub struct CatalogEntry {
    /// URL (`http`/`https`) or local file path of the image.
    image_ref: String,
    /// Title shown above the board.
    title: String,
}

/// Raised when a catalog is built with no entries.
#[derive(Debug, Clone, Display, Error)]
#[display("Image catalog must contain at least one entry")]
pub struct EmptyCatalog;

const BUILTIN: [(&str, &str); 6] = [
    (
        "https://res.cloudinary.com/dggeuuu1n/image/upload/v1753139844/Image_fx_28_kbgaoo.png",
        "Bible Stories Puzzle 1",
    ),
    (
        "https://res.cloudinary.com/dggeuuu1n/image/upload/v1753139826/Image_fx_21_gk3kgb.png",
        "Bible Stories Puzzle 2",
    ),
    (
        "https://res.cloudinary.com/dggeuuu1n/image/upload/v1753139816/Image_fx_19_m9xlj0.png",
        "Bible Stories Puzzle 3",
    ),
    (
        "https://res.cloudinary.com/dggeuuu1n/image/upload/v1753139781/Image_fx_23_c5o5rm.png",
        "Bible Stories Puzzle 4",
    ),
    (
        "https://res.cloudinary.com/dggeuuu1n/image/upload/v1753139719/Image_fx_27_l7kd3r.png",
        "Bible Stories Puzzle 5",
    ),
    (
        "https://res.cloudinary.com/dggeuuu1n/image/upload/v1753139678/Image_fx_22_mlhzrf.png",
        "Bible Stories Puzzle 6",
    ),
];

/// Fixed list of images a round can draw from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageCatalog {
    entries: Vec<CatalogEntry>,
}

impl ImageCatalog {
    /// Creates a catalog from the given entries.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyCatalog`] if `entries` is empty.
    #[instrument(skip(entries), fields(count = entries.len()))]
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, EmptyCatalog> {
        if entries.is_empty() {
            return Err(EmptyCatalog);
        }
        Ok(Self { entries })
    }

    /// The six built-in puzzle images.
    pub fn builtin_entries() -> Vec<CatalogEntry> {
        BUILTIN
            .iter()
            .map(|(image_ref, title)| CatalogEntry::new(image_ref.to_string(), title.to_string()))
            .collect()
    }

    /// All entries in catalog order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; construction rejects empty catalogs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Picks an entry uniformly at random, with replacement.
    pub fn pick_random<R: Rng + ?Sized>(&self, rng: &mut R) -> &CatalogEntry {
        let index = rng.random_range(0..self.entries.len());
        let entry = &self.entries[index];
        debug!(index, title = %entry.title, "Picked catalog entry");
        entry
    }
}

impl Default for ImageCatalog {
    fn default() -> Self {
        Self {
            entries: Self::builtin_entries(),
        }
    }
}
