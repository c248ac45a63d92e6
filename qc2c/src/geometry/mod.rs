//! Noyau géométrique : prédicats et opérations sur les anneaux
//!
//! Les opérations booléennes passent par le trait [`GeometryKernel`] pour que
//! le réducteur et le fusionneur ne dépendent pas d'une librairie précise.
//! L'implémentation par défaut, [`GeoKernel`], s'appuie sur le crate `geo`.

pub mod ray;

use geo::{
    Area, BooleanOps, BoundingRect, Contains, ConvexHull, Intersects, MultiPoint, Point, Simplify,
    SimplifyVwPreserve,
};

use crate::types::{Coordinate, Ring};

pub use ray::{point_in_ring, RAY_EPSILON};

/// Primitives géométriques utilisées par le pipeline
pub trait GeometryKernel: Send + Sync {
    /// Point dans l'anneau (ray casting)
    fn point_in_ring(&self, point: Coordinate, ring: &Ring) -> bool;

    /// Les deux surfaces fermées partagent au moins un point
    /// (croisement, contact d'arête ou de sommet, inclusion)
    fn rings_intersect(&self, a: &Ring, b: &Ring) -> bool;

    /// Aucun point de `inner` n'est à l'extérieur de `outer`
    fn contains(&self, outer: &Ring, inner: &Ring) -> bool;

    /// Enveloppe convexe de tous les sommets, `None` si dégénérée
    fn convex_hull(&self, rings: &[&Ring]) -> Option<Ring>;

    /// Anneaux extérieurs de l'union des deux surfaces
    fn union(&self, a: &Ring, b: &Ring) -> Vec<Ring>;

    /// Simplification avec tolérance, `None` si le résultat dégénère
    fn simplify(&self, ring: &Ring, tolerance: f64) -> Option<Ring>;

    /// Simplification sans auto-intersection : un anneau simple le reste
    fn simplify_preserving(&self, ring: &Ring, tolerance: f64) -> Option<Ring>;

    /// Aire non signée
    fn area(&self, ring: &Ring) -> f64;
}

/// Implémentation basée sur `geo`
///
/// Tolérances :
/// - `point_in_ring` : biais [`RAY_EPSILON`] sur le dénominateur, pas de
///   tolérance sur la frontière ;
/// - `rings_intersect` / `contains` : prédicats robustes de `geo` (DE-9IM),
///   comparaison exacte des flottants, contact de frontière = intersection ;
/// - `simplify` : Ramer-Douglas-Peucker, tolérance en degrés ;
/// - `simplify_preserving` : Visvalingam-Whyatt topologique, seuil d'aire
///   égal au carré de la tolérance.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoKernel;

impl GeometryKernel for GeoKernel {
    fn point_in_ring(&self, point: Coordinate, ring: &Ring) -> bool {
        point_in_ring(point, ring.vertices())
    }

    fn rings_intersect(&self, a: &Ring, b: &Ring) -> bool {
        // Pré-filtre par rectangles englobants, la plupart des paires sont disjointes
        match (a.polygon().bounding_rect(), b.polygon().bounding_rect()) {
            (Some(ra), Some(rb)) if !ra.intersects(&rb) => false,
            _ => a.polygon().intersects(b.polygon()),
        }
    }

    fn contains(&self, outer: &Ring, inner: &Ring) -> bool {
        outer.polygon().contains(inner.polygon())
    }

    fn convex_hull(&self, rings: &[&Ring]) -> Option<Ring> {
        let points: Vec<Point<f64>> = rings
            .iter()
            .flat_map(|ring| ring.vertices().iter().map(|&c| Point::from(c)))
            .collect();

        if points.len() < 3 {
            return None;
        }

        let hull = MultiPoint::new(points).convex_hull();
        Ring::from_polygon(&hull)
    }

    fn union(&self, a: &Ring, b: &Ring) -> Vec<Ring> {
        a.polygon()
            .union(b.polygon())
            .0
            .iter()
            .filter_map(Ring::from_polygon)
            .collect()
    }

    fn simplify(&self, ring: &Ring, tolerance: f64) -> Option<Ring> {
        Ring::from_polygon(&ring.polygon().simplify(&tolerance))
    }

    fn simplify_preserving(&self, ring: &Ring, tolerance: f64) -> Option<Ring> {
        let epsilon = tolerance * tolerance;
        Ring::from_polygon(&ring.polygon().simplify_vw_preserve(&epsilon))
    }

    fn area(&self, ring: &Ring) -> f64 {
        ring.polygon().unsigned_area()
    }
}
