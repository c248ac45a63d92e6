//! Test point-dans-anneau par lancer de rayon

use geo::Coord;

use crate::types::Coordinate;

/// Biais ajouté au dénominateur pour les arêtes horizontales (yj == yi).
///
/// Une arête horizontale ne peut pas être comptée (le test strict sur Y
/// l'exclut), le biais évite seulement la division par zéro.
pub const RAY_EPSILON: f64 = 1e-15;

/// Ray casting sur un anneau ouvert ou fermé.
///
/// Pour chaque arête `(i, j = i - 1 mod n)`, un croisement est compté si le Y
/// du point est strictement entre les Y de l'arête et si le X du point est à
/// gauche de l'arête à ce Y. Un point exactement sur la frontière reçoit une
/// classification arbitraire mais stable.
pub fn point_in_ring(point: Coordinate, ring: &[Coord<f64>]) -> bool {
    let (x, y) = (point.lat, point.lng);
    let n = ring.len();
    let mut inside = false;

    for i in 0..n {
        let j = if i == 0 { n - 1 } else { i - 1 };
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);

        let crosses =
            ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi + RAY_EPSILON) + xi);
        if crosses {
            inside = !inside;
        }
    }

    inside
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Coord<f64>> {
        [[0.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 0.0]]
            .iter()
            .map(|&[x, y]| Coord { x, y })
            .collect()
    }

    #[test]
    fn test_point_in_square() {
        let ring = square();
        assert!(point_in_ring(Coordinate::new(1.0, 1.0), &ring));
        assert!(!point_in_ring(Coordinate::new(3.0, 3.0), &ring));
    }

    #[test]
    fn test_closed_ring_same_answer() {
        let mut closed = square();
        closed.push(closed[0]);
        for (lat, lng) in [(1.0, 1.0), (3.0, 3.0), (0.5, 1.9), (-1.0, 1.0)] {
            let p = Coordinate::new(lat, lng);
            assert_eq!(point_in_ring(p, &closed), point_in_ring(p, &square()));
        }
    }

    #[test]
    fn test_rotation_invariant() {
        // Anneau concave (forme de L)
        let ring: Vec<Coord<f64>> = [
            [0.0, 0.0],
            [0.0, 4.0],
            [1.0, 4.0],
            [1.0, 1.0],
            [4.0, 1.0],
            [4.0, 0.0],
        ]
        .iter()
        .map(|&[x, y]| Coord { x, y })
        .collect();

        let probes = [(0.5, 3.0), (3.0, 0.5), (3.0, 3.0), (0.5, 0.5), (5.0, 0.5), (2.0, 1.0)];

        for shift in 0..ring.len() {
            let mut rotated = ring.clone();
            rotated.rotate_left(shift);
            for (lat, lng) in probes {
                let p = Coordinate::new(lat, lng);
                assert_eq!(
                    point_in_ring(p, &rotated),
                    point_in_ring(p, &ring),
                    "shift {shift} probe ({lat}, {lng})"
                );
            }
        }
    }

    #[test]
    fn test_horizontal_edge_no_panic() {
        // Point au Y d'une arête horizontale
        let ring = square();
        let p = Coordinate::new(1.0, 2.0);
        assert_eq!(point_in_ring(p, &ring), point_in_ring(p, &ring));
        assert!(!point_in_ring(Coordinate::new(1.0, 0.0 - 1e-9), &ring));
    }

    #[test]
    fn test_empty_ring() {
        assert!(!point_in_ring(Coordinate::new(0.0, 0.0), &[]));
    }
}
