//! Fusion gloutonne des parties d'un pays
//!
//! Deux anneaux d'un même pays sont remplacés par l'enveloppe convexe
//! (simplifiée) de leur union tant que cette enveloppe ne touche aucun anneau
//! étranger. L'enveloppe peut déborder de l'union réelle : seule la
//! non-intersection avec les autres pays est garantie, pas la conservation de
//! l'aire.

use tracing::trace;

use crate::geometry::GeometryKernel;
use crate::types::Ring;

/// Tolérance de simplification de l'enveloppe (degrés)
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Résultat de la fusion des anneaux d'un pays
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    pub rings: Vec<Ring>,
    pub merges: usize,
}

pub struct PolygonMerger<'k, K> {
    kernel: &'k K,
    tolerance: f64,
}

impl<'k, K: GeometryKernel> PolygonMerger<'k, K> {
    pub fn new(kernel: &'k K) -> Self {
        Self {
            kernel,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Fusionne les anneaux jusqu'à ce qu'aucune paire ne soit fusionnable.
    ///
    /// Chaque fusion raccourcit la liste, la boucle termine donc en au plus
    /// `rings.len() - 1` fusions.
    pub fn merge(&self, mut rings: Vec<Ring>, foreign: &[&Ring]) -> MergeOutcome {
        let mut merges = 0;

        while let Some((i, j, merged)) = self.find_merge(&rings, foreign) {
            trace!(i, j, vertices = merged.len(), "Rings merged");
            rings[i] = merged;
            rings.remove(j);
            merges += 1;
        }

        MergeOutcome { rings, merges }
    }

    /// Première paire `(i, j)`, `i < j`, dont la fusion est admissible
    fn find_merge(&self, rings: &[Ring], foreign: &[&Ring]) -> Option<(usize, usize, Ring)> {
        for i in 0..rings.len() {
            for j in (i + 1)..rings.len() {
                let Some(candidate) = self.candidate(&rings[i], &rings[j]) else {
                    continue;
                };

                let blocked = foreign
                    .iter()
                    .any(|other| self.kernel.rings_intersect(&candidate, other));
                if !blocked {
                    return Some((i, j, candidate));
                }
            }
        }
        None
    }

    /// Enveloppe convexe simplifiée de l'union de deux anneaux.
    ///
    /// Si la simplification dégénère ou ne couvre plus les deux anneaux,
    /// l'enveloppe brute est retournée.
    pub fn candidate(&self, a: &Ring, b: &Ring) -> Option<Ring> {
        let parts = self.kernel.union(a, b);
        let hull = if parts.is_empty() {
            self.kernel.convex_hull(&[a, b])?
        } else {
            let parts: Vec<&Ring> = parts.iter().collect();
            self.kernel.convex_hull(&parts)?
        };

        match self.kernel.simplify(&hull, self.tolerance) {
            Some(simplified)
                if self.kernel.contains(&simplified, a) && self.kernel.contains(&simplified, b) =>
            {
                Some(simplified)
            }
            _ => Some(hull),
        }
    }
}
