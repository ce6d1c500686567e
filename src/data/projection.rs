use nalgebra::{Matrix3, Vector3};

use super::model::CompositionTable;
use crate::error::TernaryError;

/// Relative slack below zero that is still treated as zero after the basis
/// change. Without it the basis compounds themselves drift off the vertices
/// by a rounding error and get filtered out.
pub const BASIS_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// ProjectedPoint – a row placed on the simplex
// ---------------------------------------------------------------------------

/// A row expressed as ternary coordinates summing to 1.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedPoint {
    pub label: String,
    /// Index of the source row in the table.
    pub row: usize,
    pub coords: [f64; 3],
}

/// Divide by the total. `None` when the total is not strictly positive.
pub fn normalize(v: [f64; 3]) -> Option<[f64; 3]> {
    let total: f64 = v.iter().sum();
    if total > 0.0 && total.is_finite() {
        Some(v.map(|x| x / total))
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Default basis
// ---------------------------------------------------------------------------

/// Normalise every row onto the standard simplex.
///
/// A row with a zero total fails the whole projection rather than being
/// dropped, so a bad file never silently loses points.
pub fn project_default(table: &CompositionTable) -> Result<Vec<ProjectedPoint>, TernaryError> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(row, r)| {
            let coords = normalize(r.composition()).ok_or_else(|| TernaryError::ZeroComposition {
                row,
                label: r.label.clone(),
            })?;
            Ok(ProjectedPoint {
                label: r.label.clone(),
                row,
                coords,
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Custom basis
// ---------------------------------------------------------------------------

/// Three reference compounds whose compositions span the composition space.
#[derive(Debug, Clone)]
pub struct Basis {
    labels: [String; 3],
    inverse: Matrix3<f64>,
}

impl Basis {
    /// Resolve the three selected labels against the table.
    pub fn resolve(
        table: &CompositionTable,
        selection: &[Option<String>; 3],
    ) -> Result<Self, TernaryError> {
        let mut labels: [String; 3] = Default::default();
        let mut vectors = [[0.0; 3]; 3];

        for (slot, chosen) in selection.iter().enumerate() {
            let label = chosen
                .as_ref()
                .ok_or(TernaryError::IncompleteSelection { slot, label: None })?;
            vectors[slot] =
                table
                    .composition_of(label)
                    .ok_or_else(|| TernaryError::IncompleteSelection {
                        slot,
                        label: Some(label.clone()),
                    })?;
            labels[slot] = label.clone();
        }

        Self::from_compositions(labels, vectors)
    }

    /// Build a basis from explicit composition vectors (one per column of M).
    pub fn from_compositions(
        labels: [String; 3],
        vectors: [[f64; 3]; 3],
    ) -> Result<Self, TernaryError> {
        let matrix = Matrix3::from_columns(&[
            Vector3::from(vectors[0]),
            Vector3::from(vectors[1]),
            Vector3::from(vectors[2]),
        ]);

        let rank = numerical_rank(&matrix);
        let repeated =
            labels[0] == labels[1] || labels[0] == labels[2] || labels[1] == labels[2];
        // Integer compositions that are exactly dependent give an exact zero here.
        if rank < 3 || repeated || matrix.determinant() == 0.0 {
            return Err(TernaryError::DegenerateBasis {
                labels,
                rank: rank.min(2),
            });
        }

        let inverse = matrix
            .try_inverse()
            .ok_or_else(|| TernaryError::DegenerateBasis {
                labels: labels.clone(),
                rank,
            })?;

        Ok(Self { labels, inverse })
    }

    pub fn labels(&self) -> &[String; 3] {
        &self.labels
    }

    /// Raw basis coefficients `u = M⁻¹ · v`, before filtering.
    pub fn coefficients(&self, v: [f64; 3]) -> [f64; 3] {
        let u = self.inverse * Vector3::from(v);
        [u[0], u[1], u[2]]
    }
}

/// Rank with numpy's default cutoff: σ_max · max(m, n) · ε.
fn numerical_rank(m: &Matrix3<f64>) -> usize {
    let singular = m.svd(false, false).singular_values;
    let largest = singular.max();
    if largest <= 0.0 || !largest.is_finite() {
        return 0;
    }
    let cutoff = largest * 3.0 * f64::EPSILON;
    singular.iter().filter(|&&s| s > cutoff).count()
}

/// Result of re-expressing a table in a custom basis.
#[derive(Debug, Clone, Default)]
pub struct BasisProjection {
    /// Rows that lie inside the triangle spanned by the basis, in row order.
    pub points: Vec<ProjectedPoint>,
    /// Indices of rows that need a negative amount of some basis compound.
    pub dropped: Vec<usize>,
}

/// Keep `u` when it lies in the simplex, renormalised to sum to 1.
fn retain_in_simplex(u: [f64; 3]) -> Option<[f64; 3]> {
    let scale: f64 = u.iter().map(|x| x.abs()).sum();
    let slack = BASIS_TOLERANCE * scale;
    let snapped = u.map(|x| if x < 0.0 && x > -slack { 0.0 } else { x });
    if snapped.iter().any(|x| *x < 0.0 || !x.is_finite()) {
        return None;
    }
    normalize(snapped)
}

/// Re-express every row in `basis`, dropping rows outside its triangle.
pub fn project_onto_basis(table: &CompositionTable, basis: &Basis) -> BasisProjection {
    let mut projection = BasisProjection::default();

    for (row, r) in table.rows().iter().enumerate() {
        match retain_in_simplex(basis.coefficients(r.composition())) {
            Some(coords) => projection.points.push(ProjectedPoint {
                label: r.label.clone(),
                row,
                coords,
            }),
            None => projection.dropped.push(row),
        }
    }

    log::debug!(
        "basis {:?}: kept {} of {} rows",
        basis.labels(),
        projection.points.len(),
        table.len()
    );
    projection
}

/// Project onto the default simplex, or onto `basis` when one is given.
pub fn project(
    table: &CompositionTable,
    basis: Option<&Basis>,
) -> Result<Vec<ProjectedPoint>, TernaryError> {
    match basis {
        None => project_default(table),
        Some(basis) => Ok(project_onto_basis(table, basis).points),
    }
}
