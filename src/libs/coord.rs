use itertools::Itertools;
use nalgebra::Point3;
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;

/// A gene start site from the annotation table.
#[derive(Debug, Clone, PartialEq)]
pub struct Gene {
    pub name: String,
    pub chr: String,
    pub start: u64,
}

/// One fixed-length fragment of the 3D genome model.
///
/// Bins on a chromosome are totally ordered by midpoint and consecutive
/// midpoints differ by exactly the model resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct GenomicBin {
    pub chr: String,
    pub midpoint: u64,
    pub coord: Point3<f64>,
}

/// A gene annotated with its interpolated 3D position.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneCoordinate {
    pub name: String,
    pub chr: String,
    pub start: u64,
    pub coord: Point3<f64>,
}

/// What to do with a gene whose after-anchor falls off the chromosome end.
///
/// The bin table has no fragment beyond the last midpoint, so a gene inside
/// the final bin has a before-anchor but no segment to interpolate along.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryPolicy {
    /// Fail the run with `ProjectError::MissingAnchor`.
    Reject,
    /// Assign the before-anchor's coordinate verbatim.
    Clamp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProjectError {
    /// The chromosome sets of the gene table and the bin table differ
    ChromosomeMismatch {
        genes: Vec<String>,
        bins: Vec<String>,
    },
    /// No bin midpoint lies within one resolution of the gene start
    UnanchoredGene { gene: String, chr: String, start: u64 },
    /// The bin at `before.midpoint + resolution` does not exist
    MissingAnchor { gene: String, chr: String, midpoint: u64 },
    /// Before and after anchors share the same 3D point
    DegenerateSegment { gene: String, chr: String },
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectError::ChromosomeMismatch { genes, bins } => write!(
                f,
                "Chromosome inconsistency between genes and genome: genes have [{}], genome has [{}]",
                genes.join(","),
                bins.join(",")
            ),
            ProjectError::UnanchoredGene { gene, chr, start } => write!(
                f,
                "Gene {} ({}:{}) has no anchor bin within one resolution",
                gene, chr, start
            ),
            ProjectError::MissingAnchor { gene, chr, midpoint } => write!(
                f,
                "Gene {}: no after-anchor at {}:{} (chromosome end?)",
                gene, chr, midpoint
            ),
            ProjectError::DegenerateSegment { gene, chr } => write!(
                f,
                "Gene {} on {}: anchor segment has zero length",
                gene, chr
            ),
        }
    }
}

impl std::error::Error for ProjectError {}

/// Per-run projection report, returned alongside the coordinates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub genes: usize,
    pub clamped: usize,
}

/// Interpolate the 3D position of every gene from the bin model.
///
/// For each gene the before-anchor is the first bin (ascending midpoint)
/// whose midpoint lies within `resolution` of the gene start, and the
/// after-anchor is the bin exactly one resolution downstream. The gene is
/// placed on the before->after segment at the fraction of the bin interval
/// its start occupies. Treating genomic distance as linear within a bin is a
/// modeling choice, not a derived fact.
///
/// Chromosomes are processed independently and merged in lexicographic
/// chromosome order, so output never depends on scheduling. Within a
/// chromosome, genes keep their input order.
pub fn project_gene_coordinates(
    genes: &[Gene],
    bins: &[GenomicBin],
    resolution: u64,
    policy: BoundaryPolicy,
) -> Result<(Vec<GeneCoordinate>, ProjectStats), ProjectError> {
    let chrs_genes: BTreeSet<&str> = genes.iter().map(|g| g.chr.as_str()).collect();
    let chrs_bins: BTreeSet<&str> = bins.iter().map(|b| b.chr.as_str()).collect();
    if chrs_genes != chrs_bins {
        return Err(ProjectError::ChromosomeMismatch {
            genes: chrs_genes.iter().map(|s| s.to_string()).collect(),
            bins: chrs_bins.iter().map(|s| s.to_string()).collect(),
        });
    }

    // BTreeSet iteration gives the fixed merge order
    let chrs: Vec<&str> = chrs_genes.into_iter().collect();

    let per_chr: Result<Vec<(Vec<GeneCoordinate>, usize)>, ProjectError> = chrs
        .par_iter()
        .map(|ch| project_chromosome(ch, genes, bins, resolution, policy))
        .collect();

    let mut coords = vec![];
    let mut stats = ProjectStats::default();
    for (mut part, clamped) in per_chr? {
        stats.clamped += clamped;
        coords.append(&mut part);
    }
    stats.genes = coords.len();

    Ok((coords, stats))
}

fn project_chromosome(
    ch: &str,
    genes: &[Gene],
    bins: &[GenomicBin],
    resolution: u64,
    policy: BoundaryPolicy,
) -> Result<(Vec<GeneCoordinate>, usize), ProjectError> {
    // Do not trust input order; build the ascending-midpoint ordering here
    let chr_bins: Vec<&GenomicBin> = bins
        .iter()
        .filter(|b| b.chr == ch)
        .sorted_by_key(|b| b.midpoint)
        .collect();
    let by_midpoint: HashMap<u64, &GenomicBin> =
        chr_bins.iter().map(|b| (b.midpoint, *b)).collect();

    let mut coords = vec![];
    let mut clamped = 0usize;

    for gene in genes.iter().filter(|g| g.chr == ch) {
        // First-match tie-break: at most one bin qualifies in well-formed
        // input, but scanning ascending makes the degenerate case stable
        let before = chr_bins
            .iter()
            .find(|b| gene.start.abs_diff(b.midpoint) < resolution)
            .ok_or_else(|| ProjectError::UnanchoredGene {
                gene: gene.name.clone(),
                chr: ch.to_string(),
                start: gene.start,
            })?;

        let after = match by_midpoint.get(&(before.midpoint + resolution)) {
            Some(b) => *b,
            None => match policy {
                BoundaryPolicy::Reject => {
                    return Err(ProjectError::MissingAnchor {
                        gene: gene.name.clone(),
                        chr: ch.to_string(),
                        midpoint: before.midpoint + resolution,
                    });
                }
                BoundaryPolicy::Clamp => {
                    clamped += 1;
                    coords.push(GeneCoordinate {
                        name: gene.name.clone(),
                        chr: gene.chr.clone(),
                        start: gene.start,
                        coord: before.coord,
                    });
                    continue;
                }
            },
        };

        let segment = after.coord - before.coord;
        let distance = segment.norm();
        if distance == 0.0 {
            return Err(ProjectError::DegenerateSegment {
                gene: gene.name.clone(),
                chr: ch.to_string(),
            });
        }

        // Signed fraction of the bin interval, scaled to the segment length.
        // A gene upstream of the first midpoint extrapolates backwards.
        let offset = gene.start as f64 - before.midpoint as f64;
        let gene_coef = offset / resolution as f64 * distance;

        coords.push(GeneCoordinate {
            name: gene.name.clone(),
            chr: gene.chr.clone(),
            start: gene.start,
            coord: before.coord + segment / distance * gene_coef,
        });
    }

    Ok((coords, clamped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn bin(chr: &str, midpoint: u64, x: f64, y: f64, z: f64) -> GenomicBin {
        GenomicBin {
            chr: chr.to_string(),
            midpoint,
            coord: Point3::new(x, y, z),
        }
    }

    fn gene(name: &str, chr: &str, start: u64) -> Gene {
        Gene {
            name: name.to_string(),
            chr: chr.to_string(),
            start,
        }
    }

    #[test]
    fn test_start_on_midpoint() {
        let bins = vec![bin("I", 1000, 1.0, 2.0, 3.0), bin("I", 2000, 4.0, 6.0, 3.0)];
        let genes = vec![gene("g1", "I", 1000)];
        let (coords, _) =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap();
        assert_eq!(coords.len(), 1);
        assert_relative_eq!(coords[0].coord.x, 1.0);
        assert_relative_eq!(coords[0].coord.y, 2.0);
        assert_relative_eq!(coords[0].coord.z, 3.0);
    }

    #[test]
    fn test_start_at_half_resolution() {
        let bins = vec![bin("I", 1000, 0.0, 0.0, 0.0), bin("I", 2000, 2.0, 4.0, 6.0)];
        let genes = vec![gene("g1", "I", 1500)];
        let (coords, _) =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap();
        assert_relative_eq!(coords[0].coord.x, 1.0);
        assert_relative_eq!(coords[0].coord.y, 2.0);
        assert_relative_eq!(coords[0].coord.z, 3.0);
    }

    #[test]
    fn test_chromosome_mismatch() {
        let bins = vec![bin("I", 1000, 0.0, 0.0, 0.0), bin("I", 2000, 1.0, 0.0, 0.0)];
        let genes = vec![gene("g1", "II", 1200)];
        let err =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap_err();
        assert!(matches!(err, ProjectError::ChromosomeMismatch { .. }));
    }

    #[test]
    fn test_missing_after_anchor_reject() {
        let bins = vec![bin("I", 1000, 0.0, 0.0, 0.0), bin("I", 2000, 1.0, 0.0, 0.0)];
        let genes = vec![gene("g1", "I", 2500)];
        let err =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap_err();
        assert_eq!(
            err,
            ProjectError::MissingAnchor {
                gene: "g1".to_string(),
                chr: "I".to_string(),
                midpoint: 3000,
            }
        );
    }

    #[test]
    fn test_missing_after_anchor_clamp() {
        let bins = vec![bin("I", 1000, 0.0, 0.0, 0.0), bin("I", 2000, 1.0, 5.0, 0.0)];
        let genes = vec![gene("g1", "I", 2500)];
        let (coords, stats) =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Clamp).unwrap();
        assert_eq!(stats.clamped, 1);
        assert_relative_eq!(coords[0].coord.x, 1.0);
        assert_relative_eq!(coords[0].coord.y, 5.0);
    }

    #[test]
    fn test_degenerate_segment() {
        let bins = vec![bin("I", 1000, 1.0, 1.0, 1.0), bin("I", 2000, 1.0, 1.0, 1.0)];
        let genes = vec![gene("g1", "I", 1200)];
        let err =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap_err();
        assert!(matches!(err, ProjectError::DegenerateSegment { .. }));
    }

    #[test]
    fn test_first_match_tie_break() {
        // start 1500 is within 1000 of both midpoints; the 1000 bin wins
        // even when the input lists bins in descending order
        let bins = vec![
            bin("I", 3000, 9.0, 9.0, 9.0),
            bin("I", 2000, 1.0, 0.0, 0.0),
            bin("I", 1000, 0.0, 0.0, 0.0),
        ];
        let genes = vec![gene("g1", "I", 1500)];
        let (coords, _) =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap();
        assert_relative_eq!(coords[0].coord.x, 0.5);
    }

    #[test]
    fn test_unanchored_gene() {
        let bins = vec![bin("I", 1000, 0.0, 0.0, 0.0), bin("I", 2000, 1.0, 0.0, 0.0)];
        let genes = vec![gene("g1", "I", 9000)];
        let err =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap_err();
        assert!(matches!(err, ProjectError::UnanchoredGene { .. }));
    }

    #[test]
    fn test_multi_chromosome_merge_order() {
        let bins = vec![
            bin("II", 1000, 0.0, 0.0, 0.0),
            bin("II", 2000, 1.0, 0.0, 0.0),
            bin("I", 1000, 0.0, 0.0, 0.0),
            bin("I", 2000, 0.0, 1.0, 0.0),
        ];
        let genes = vec![gene("b", "II", 1500), gene("a", "I", 1500)];
        let (coords, _) =
            project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap();
        // chromosome I first regardless of input order
        assert_eq!(coords[0].name, "a");
        assert_eq!(coords[1].name, "b");
    }

    #[test]
    fn test_idempotent() {
        let bins = vec![
            bin("I", 1000, 0.1, 0.2, 0.3),
            bin("I", 2000, 1.4, 2.5, 3.6),
            bin("I", 3000, 2.0, 2.0, 2.0),
        ];
        let genes = vec![gene("g1", "I", 1234), gene("g2", "I", 2345)];
        let a = project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap();
        let b = project_gene_coordinates(&genes, &bins, 1000, BoundaryPolicy::Reject).unwrap();
        assert_eq!(a, b);
    }
}
