//! Facet filtering for the browse views.
//!
//! A facet selection is either the "all" sentinel or a non-empty explicit
//! subset; the two states are mutually exclusive by construction. Filtering
//! is a pure function — both the map and the card grid feed from the same
//! result, so it must stay order-preserving and side-effect free.

use crate::directory::{Cuisine, Location, Restaurant};
use serde::{Deserialize, Serialize};

/// One facet's selection state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selection<T> {
    /// No restriction on this facet.
    All,
    /// Explicit subset, in the order values were added. Never empty.
    Only(Vec<T>),
}

impl<T> Default for Selection<T> {
    fn default() -> Self {
        Selection::All
    }
}

impl<T: PartialEq + Clone> Selection<T> {
    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Does this selection admit the given value?
    pub fn allows(&self, value: &T) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(values) => values.contains(value),
        }
    }

    /// Does this selection admit at least one of the given values?
    pub fn allows_any(&self, values: &[T]) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(selected) => values.iter().any(|v| selected.contains(v)),
        }
    }

    /// Collapse back to the sentinel (the "All" button).
    pub fn clear(&mut self) {
        *self = Selection::All;
    }

    /// Apply one click on a concrete facet value.
    ///
    /// From the sentinel, the clicked value becomes the whole selection.
    /// Within an explicit subset, a value toggles in or out; removing the
    /// last value reverts to the sentinel.
    pub fn toggle(&mut self, value: T) {
        match self {
            Selection::All => *self = Selection::Only(vec![value]),
            Selection::Only(values) => {
                if let Some(pos) = values.iter().position(|v| *v == value) {
                    values.remove(pos);
                    if values.is_empty() {
                        *self = Selection::All;
                    }
                } else {
                    values.push(value);
                }
            }
        }
    }
}

/// Filter the restaurant list by both facets.
///
/// A restaurant passes when its cuisine tags intersect the cuisine
/// selection AND its location is in the location selection, with the
/// sentinel admitting everything on its facet. Input order is preserved.
pub fn filter_restaurants<'a>(
    restaurants: &'a [Restaurant],
    cuisines: &Selection<Cuisine>,
    locations: &Selection<Location>,
) -> Vec<&'a Restaurant> {
    restaurants
        .iter()
        .filter(|r| cuisines.allows_any(&r.cuisines) && locations.allows(&r.location))
        .collect()
}
