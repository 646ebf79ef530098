use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use thiserror::Error;

use super::filter::Filter;
use super::loader::{load_approaches, load_neos};
use super::model::{CloseApproach, NearEarthObject, canonical_designation, title_case};

#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A close approach names an object that was never loaded.
    #[error("close approach #{index} references unknown designation '{designation}'")]
    UnresolvedLink { designation: String, index: usize },
}

// ---------------------------------------------------------------------------
// LinkedApproach – an approach viewed together with its object
// ---------------------------------------------------------------------------

/// A close approach paired with the object it belongs to.
#[derive(Debug, Clone, Copy)]
pub struct LinkedApproach<'a> {
    pub approach: &'a CloseApproach,
    pub neo: &'a NearEarthObject,
}

impl fmt::Display for LinkedApproach<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "On {}, {} approaches Earth at a distance of {:.2} au and a velocity of {:.2} km/s.",
            self.approach.time_str(),
            self.neo.fullname(),
            self.approach.distance,
            self.approach.velocity
        )
    }
}

// ---------------------------------------------------------------------------
// NeoDatabase
// ---------------------------------------------------------------------------

/// All near-Earth objects and close approaches, linked both ways.
///
/// Objects and approaches live in two arenas owned by the database. Each
/// object keeps the positions of its approaches and each approach keeps the
/// position of its object. Nothing is mutated after [`NeoDatabase::new`].
#[derive(Debug, Clone)]
pub struct NeoDatabase {
    neos: Vec<NearEarthObject>,
    approaches: Vec<CloseApproach>,
    /// Canonical designation → position in `neos`.
    by_designation: HashMap<String, usize>,
}

impl NeoDatabase {
    /// Index the objects by designation and link every approach to its
    /// object.
    ///
    /// If two objects share a designation the later one wins the index slot
    /// and a warning is logged. An approach whose designation is unknown
    /// rejects the whole database with [`DatabaseError::UnresolvedLink`].
    pub fn new(
        mut neos: Vec<NearEarthObject>,
        mut approaches: Vec<CloseApproach>,
    ) -> Result<Self, DatabaseError> {
        let mut by_designation = HashMap::with_capacity(neos.len());
        for (i, neo) in neos.iter().enumerate() {
            let key = canonical_designation(neo.designation());
            if let Some(prev) = by_designation.insert(key, i) {
                log::warn!(
                    "duplicate designation '{}' (rows {prev} and {i}), keeping the later row",
                    neo.designation()
                );
            }
        }

        for (index, approach) in approaches.iter_mut().enumerate() {
            let neo_idx = by_designation
                .get(&canonical_designation(approach.designation()))
                .copied()
                .ok_or_else(|| DatabaseError::UnresolvedLink {
                    designation: approach.designation().to_string(),
                    index,
                })?;
            approach.neo = Some(neo_idx);
            neos[neo_idx].approaches.push(index);
        }

        log::info!(
            "linked {} close approaches to {} near-Earth objects",
            approaches.len(),
            neos.len()
        );
        Ok(Self {
            neos,
            approaches,
            by_designation,
        })
    }

    /// Load both sources and build the database.
    pub fn load(neo_path: &Path, cad_path: &Path) -> anyhow::Result<Self> {
        let neos = load_neos(neo_path)?;
        let approaches = load_approaches(cad_path)?;
        Ok(Self::new(neos, approaches)?)
    }

    pub fn neos(&self) -> &[NearEarthObject] {
        &self.neos
    }

    pub fn approaches(&self) -> &[CloseApproach] {
        &self.approaches
    }

    /// Number of near-Earth objects.
    pub fn len(&self) -> usize {
        self.neos.len()
    }

    /// Whether the database holds no objects.
    pub fn is_empty(&self) -> bool {
        self.neos.is_empty()
    }

    /// Case-insensitive exact lookup by primary designation.
    pub fn find_by_designation(&self, designation: &str) -> Option<&NearEarthObject> {
        self.by_designation
            .get(&canonical_designation(designation))
            .map(|&i| &self.neos[i])
    }

    /// Case-insensitive exact lookup by name.
    ///
    /// Names are not indexed: this is a linear scan returning the first match
    /// in load order. Both sides are title-cased before comparing.
    pub fn find_by_name(&self, name: &str) -> Option<&NearEarthObject> {
        let wanted = title_case(name.trim());
        if wanted.is_empty() {
            return None;
        }
        self.neos
            .iter()
            .find(|neo| neo.name.as_deref().is_some_and(|n| title_case(n) == wanted))
    }

    /// The object an approach is linked to. `None` for an unlinked approach
    /// or one whose link points outside this database.
    pub fn neo_of(&self, approach: &CloseApproach) -> Option<&NearEarthObject> {
        approach.neo.and_then(|i| self.neos.get(i))
    }

    /// An object's close approaches, in load order. Positions that fall
    /// outside this database are skipped.
    pub fn approaches_of<'a>(
        &'a self,
        neo: &'a NearEarthObject,
    ) -> impl Iterator<Item = &'a CloseApproach> + 'a {
        neo.approaches.iter().filter_map(move |&i| self.approaches.get(i))
    }

    /// Lazily yield every linked approach that satisfies all `filters`, in
    /// load order. An empty slice yields everything.
    pub fn query<'a>(
        &'a self,
        filters: &'a [Filter],
    ) -> impl Iterator<Item = LinkedApproach<'a>> + 'a {
        self.approaches
            .iter()
            .filter_map(move |approach| {
                self.neo_of(approach).map(|neo| LinkedApproach { approach, neo })
            })
            .filter(move |linked| filters.iter().all(|f| f.matches(linked)))
    }
}
