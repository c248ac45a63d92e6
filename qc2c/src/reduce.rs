//! Réduction itérative des sommets d'un anneau
//!
//! Un sommet n'est retiré que si l'anneau obtenu contient toujours l'anneau
//! d'origine et n'intersecte aucun anneau étranger. L'anneau ne fait donc que
//! grossir, jamais au-delà de la frontière d'un voisin.

use tracing::trace;

use crate::geometry::GeometryKernel;
use crate::types::{CountryShape, Ring};

/// Jamais en dessous d'un quadrilatère par défaut
pub const DEFAULT_MIN_VERTICES: usize = 4;

/// Résultat de la réduction d'un anneau
#[derive(Debug, Clone)]
pub struct Reduction {
    pub ring: Ring,
    pub removed: usize,
}

/// Réducteur de sommets contraint par des anneaux étrangers
pub struct VertexReducer<'k, K> {
    kernel: &'k K,
    min_vertices: usize,
}

impl<'k, K: GeometryKernel> VertexReducer<'k, K> {
    pub fn new(kernel: &'k K) -> Self {
        Self {
            kernel,
            min_vertices: DEFAULT_MIN_VERTICES,
        }
    }

    /// Nombre minimal de sommets conservés (au moins 3)
    pub fn with_min_vertices(mut self, min_vertices: usize) -> Self {
        self.min_vertices = min_vertices.max(3);
        self
    }

    /// Réduit un anneau.
    ///
    /// Parcourt les sommets depuis l'index 0 ; après chaque retrait accepté,
    /// le parcours reprend à 0 car un retrait peut en débloquer d'autres plus
    /// tôt dans l'anneau. S'arrête quand l'index atteint la longueur de
    /// l'anneau ou quand il ne reste que `min_vertices` sommets.
    pub fn reduce(&self, ring: &Ring, foreign: &[&Ring]) -> Reduction {
        let mut current = ring.clone();
        let mut index = 0;

        while index < current.len() && current.len() > self.min_vertices {
            let accepted = current
                .without_vertex(index)
                .filter(|candidate| self.accepts(candidate, ring, foreign));

            match accepted {
                Some(candidate) => {
                    trace!(index, vertices = candidate.len(), "Vertex removed");
                    current = candidate;
                    index = 0;
                }
                None => index += 1,
            }
        }

        let removed = ring.len() - current.len();
        Reduction {
            ring: current,
            removed,
        }
    }

    /// Réduit tous les anneaux d'un pays avec la même liste d'étrangers
    pub fn reduce_country(&self, country: &CountryShape, foreign: &[&Ring]) -> (CountryShape, usize) {
        let mut removed = 0;
        let rings = country
            .rings
            .iter()
            .map(|ring| {
                let reduction = self.reduce(ring, foreign);
                removed += reduction.removed;
                reduction.ring
            })
            .collect();

        (CountryShape::new(country.code.clone(), rings), removed)
    }

    fn accepts(&self, candidate: &Ring, original: &Ring, foreign: &[&Ring]) -> bool {
        self.kernel.contains(candidate, original)
            && !foreign
                .iter()
                .any(|other| self.kernel.rings_intersect(candidate, other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::GeoKernel;

    fn ring(points: &[[f64; 2]]) -> Ring {
        Ring::from_lat_lng("T", points).unwrap()
    }

    /// Carré 4x4 avec un point colinéaire à gauche et une encoche en haut
    fn notched() -> Ring {
        ring(&[
            [0.0, 0.0],
            [0.0, 2.0],
            [0.0, 4.0],
            [2.0, 3.0],
            [4.0, 4.0],
            [4.0, 0.0],
        ])
    }

    #[test]
    fn test_reduce_without_foreign() {
        let kernel = GeoKernel;
        let reducer = VertexReducer::new(&kernel);
        let original = notched();

        let reduction = reducer.reduce(&original, &[]);
        assert_eq!(reduction.ring.len(), 4);
        assert_eq!(reduction.removed, 2);
        assert!(kernel.contains(&reduction.ring, &original));
        assert!((kernel.area(&reduction.ring) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn test_reduce_blocked_by_foreign() {
        let kernel = GeoKernel;
        let reducer = VertexReducer::new(&kernel);
        let original = notched();
        // Petit carré logé dans l'encoche, sans contact avec l'anneau
        let neighbour = ring(&[[1.8, 3.6], [1.8, 3.9], [2.2, 3.9], [2.2, 3.6]]);
        assert!(!kernel.rings_intersect(&original, &neighbour));

        let reduction = reducer.reduce(&original, &[&neighbour]);
        assert_eq!(reduction.ring.len(), 5);
        assert!(reduction.ring.vertices().contains(&geo::Coord { x: 2.0, y: 3.0 }));
        assert!(kernel.contains(&reduction.ring, &original));
        assert!(!kernel.rings_intersect(&reduction.ring, &neighbour));
    }

    #[test]
    fn test_convex_corner_kept() {
        let kernel = GeoKernel;
        let reducer = VertexReducer::new(&kernel);
        let pentagon = ring(&[[0.0, 0.0], [0.0, 4.0], [2.0, 6.0], [4.0, 4.0], [4.0, 0.0]]);

        let reduction = reducer.reduce(&pentagon, &[]);
        assert_eq!(reduction.removed, 0);
        assert_eq!(reduction.ring, pentagon);
    }

    #[test]
    fn test_min_vertices_respected() {
        let kernel = GeoKernel;
        let square_with_midpoints = ring(&[
            [0.0, 0.0],
            [0.0, 1.0],
            [0.0, 2.0],
            [1.0, 2.0],
            [2.0, 2.0],
            [2.0, 1.0],
            [2.0, 0.0],
            [1.0, 0.0],
        ]);

        let reduction = VertexReducer::new(&kernel).reduce(&square_with_midpoints, &[]);
        assert_eq!(reduction.ring.len(), 4);

        let reduction = VertexReducer::new(&kernel)
            .with_min_vertices(6)
            .reduce(&square_with_midpoints, &[]);
        assert_eq!(reduction.ring.len(), 6);
    }

    #[test]
    fn test_quadrilateral_untouched() {
        let kernel = GeoKernel;
        let quad = ring(&[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0]]);
        let reduction = VertexReducer::new(&kernel).reduce(&quad, &[]);
        assert_eq!(reduction.ring, quad);
    }

    #[test]
    fn test_reduce_country() {
        let kernel = GeoKernel;
        let country = CountryShape::new("AAA", vec![notched(), notched()]);
        let (reduced, removed) = VertexReducer::new(&kernel).reduce_country(&country, &[]);
        assert_eq!(reduced.code, "AAA");
        assert_eq!(removed, 4);
        assert!(reduced.rings.iter().all(|r| r.len() == 4));
    }
}
