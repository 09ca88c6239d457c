use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum DistError {
    /// Fewer than two entities supplied
    TooFewEntities(usize),
    /// A feature vector's length differs from the first row's
    DimensionMismatch {
        entity: String,
        expected: usize,
        found: usize,
    },
    /// The queried id is not a row of the matrix
    UnknownEntity(String),
}

impl fmt::Display for DistError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistError::TooFewEntities(n) => {
                write!(f, "Need at least 2 entities for a distance matrix, got {}", n)
            }
            DistError::DimensionMismatch {
                entity,
                expected,
                found,
            } => write!(
                f,
                "Entity {}: feature vector has {} values, expected {}",
                entity, found, expected
            ),
            DistError::UnknownEntity(id) => write!(f, "Entity {} not in the matrix", id),
        }
    }
}

impl std::error::Error for DistError {}

/// Symmetric pairwise Euclidean distance matrix over named feature vectors.
///
/// Row/column order is the input order; the diagonal is zero. The matrix is
/// derived data, recomputed from its inputs, never updated in place.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    ids: Vec<String>,
    index: HashMap<String, usize>,
    // row-major, n * n
    dist: Vec<f64>,
}

impl DistanceMatrix {
    pub fn from_features(entities: &[(String, Vec<f64>)]) -> Result<Self, DistError> {
        if entities.len() < 2 {
            return Err(DistError::TooFewEntities(entities.len()));
        }
        let dim = entities[0].1.len();
        for (id, vec) in entities {
            if vec.len() != dim {
                return Err(DistError::DimensionMismatch {
                    entity: id.clone(),
                    expected: dim,
                    found: vec.len(),
                });
            }
        }

        let n = entities.len();
        let mut dist = vec![0.0; n * n];
        for i in 0..n {
            for j in (i + 1)..n {
                let d = euclidean(&entities[i].1, &entities[j].1);
                dist[i * n + j] = d;
                dist[j * n + i] = d;
            }
        }

        let ids: Vec<String> = entities.iter().map(|(id, _)| id.clone()).collect();
        let index = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();

        Ok(DistanceMatrix { ids, index, dist })
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, a: &str, b: &str) -> Result<f64, DistError> {
        let i = self.row(a)?;
        let j = self.row(b)?;
        Ok(self.dist[i * self.len() + j])
    }

    /// The `k` entities closest to `id`, ascending by distance.
    ///
    /// The entity itself (self-distance 0) is skipped. Ties keep the input
    /// row order. Asking for more neighbors than the matrix holds returns all
    /// of them; this mirrors the sort-then-slice behavior downstream callers
    /// rely on.
    pub fn nearest_neighbors(&self, id: &str, k: usize) -> Result<Vec<(String, f64)>, DistError> {
        let i = self.row(id)?;
        let n = self.len();

        let mut ranked: Vec<(usize, f64)> = (0..n)
            .filter(|&j| j != i)
            .map(|j| (j, self.dist[i * n + j]))
            .collect();
        // stable sort keeps row order on ties
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap());
        ranked.truncate(k);

        Ok(ranked
            .into_iter()
            .map(|(j, d)| (self.ids[j].clone(), d))
            .collect())
    }

    fn row(&self, id: &str) -> Result<usize, DistError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| DistError::UnknownEntity(id.to_string()))
    }
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn features() -> Vec<(String, Vec<f64>)> {
        vec![
            ("a".to_string(), vec![0.0, 0.0]),
            ("b".to_string(), vec![3.0, 4.0]),
            ("c".to_string(), vec![0.0, 1.0]),
        ]
    }

    #[test]
    fn test_symmetric_zero_diagonal() {
        let mat = DistanceMatrix::from_features(&features()).unwrap();
        for a in mat.ids().to_vec() {
            assert_eq!(mat.get(&a, &a).unwrap(), 0.0);
            for b in mat.ids().to_vec() {
                assert_eq!(mat.get(&a, &b).unwrap(), mat.get(&b, &a).unwrap());
            }
        }
        assert_relative_eq!(mat.get("a", "b").unwrap(), 5.0);
        assert_relative_eq!(mat.get("a", "c").unwrap(), 1.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let mut rows = features();
        rows.push(("d".to_string(), vec![1.0]));
        let err = DistanceMatrix::from_features(&rows).unwrap_err();
        assert_eq!(
            err,
            DistError::DimensionMismatch {
                entity: "d".to_string(),
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_too_few_entities() {
        let rows = vec![("a".to_string(), vec![1.0])];
        let err = DistanceMatrix::from_features(&rows).unwrap_err();
        assert_eq!(err, DistError::TooFewEntities(1));
    }

    #[test]
    fn test_nearest_excludes_self_and_sorts() {
        let mat = DistanceMatrix::from_features(&features()).unwrap();
        let near = mat.nearest_neighbors("a", 2).unwrap();
        assert_eq!(near.len(), 2);
        assert_eq!(near[0].0, "c");
        assert_eq!(near[1].0, "b");
        assert!(near[0].1 <= near[1].1);
        assert!(near.iter().all(|(id, _)| id != "a"));
    }

    #[test]
    fn test_nearest_k_larger_than_matrix() {
        let mat = DistanceMatrix::from_features(&features()).unwrap();
        let near = mat.nearest_neighbors("a", 10).unwrap();
        assert_eq!(near.len(), 2);
    }

    #[test]
    fn test_nearest_tie_keeps_row_order() {
        let rows = vec![
            ("q".to_string(), vec![0.0]),
            ("far".to_string(), vec![5.0]),
            ("t1".to_string(), vec![1.0]),
            ("t2".to_string(), vec![-1.0]),
        ];
        let mat = DistanceMatrix::from_features(&rows).unwrap();
        let near = mat.nearest_neighbors("q", 3).unwrap();
        assert_eq!(near[0].0, "t1");
        assert_eq!(near[1].0, "t2");
        assert_eq!(near[2].0, "far");
    }

    #[test]
    fn test_unknown_entity() {
        let mat = DistanceMatrix::from_features(&features()).unwrap();
        let err = mat.nearest_neighbors("zz", 1).unwrap_err();
        assert_eq!(err, DistError::UnknownEntity("zz".to_string()));
    }
}
