//! Header-addressed TSV tables for the four input schemas.
//!
//! Every table starts with a header row; columns are located by name so the
//! files can carry extra columns in any order. Inputs may be gzipped.

use crate::libs::coord::{Gene, GenomicBin};
use crate::libs::signif::CorrelationSummary;
use anyhow::{anyhow, bail, Context, Result};
use indexmap::IndexMap;
use nalgebra::Point3;
use std::io::BufRead;

struct Header {
    cols: Vec<String>,
}

impl Header {
    fn parse(line: Option<std::io::Result<String>>, input: &str) -> Result<Self> {
        let line = line
            .ok_or_else(|| anyhow!("{}: empty file, expected a header row", input))??;
        Ok(Header {
            cols: line.split('\t').map(|s| s.trim().to_string()).collect(),
        })
    }

    fn col(&self, name: &str, input: &str) -> Result<usize> {
        self.cols
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| anyhow!("{}: missing column `{}` in header", input, name))
    }
}

fn field<'a>(fields: &[&'a str], idx: usize, lineno: usize, input: &str) -> Result<&'a str> {
    fields
        .get(idx)
        .copied()
        .ok_or_else(|| anyhow!("{}:{}: too few fields", input, lineno))
}

/// Reads `name  chr  start` rows.
pub fn read_genes(input: &str) -> Result<Vec<Gene>> {
    let mut lines = crate::reader(input).lines();
    let header = Header::parse(lines.next(), input)?;
    let i_name = header.col("name", input)?;
    let i_chr = header.col("chr", input)?;
    let i_start = header.col("start", input)?;

    let mut genes = vec![];
    for (lineno, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let lineno = lineno + 2;
        genes.push(Gene {
            name: field(&fields, i_name, lineno, input)?.to_string(),
            chr: field(&fields, i_chr, lineno, input)?.to_string(),
            start: field(&fields, i_start, lineno, input)?
                .parse()
                .with_context(|| format!("{}:{}: bad start position", input, lineno))?,
        });
    }
    Ok(genes)
}

/// Reads `chr  midpoint  X  Y  Z` rows of the 3D genome model.
pub fn read_bins(input: &str) -> Result<Vec<GenomicBin>> {
    let mut lines = crate::reader(input).lines();
    let header = Header::parse(lines.next(), input)?;
    let i_chr = header.col("chr", input)?;
    let i_mid = header.col("midpoint", input)?;
    let i_x = header.col("X", input)?;
    let i_y = header.col("Y", input)?;
    let i_z = header.col("Z", input)?;

    let mut bins = vec![];
    for (lineno, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split('\t').collect();
        let lineno = lineno + 2;
        let parse_f = |i: usize, what: &str| -> Result<f64> {
            field(&fields, i, lineno, input)?
                .parse()
                .with_context(|| format!("{}:{}: bad {} coordinate", input, lineno, what))
        };
        bins.push(GenomicBin {
            chr: field(&fields, i_chr, lineno, input)?.to_string(),
            midpoint: field(&fields, i_mid, lineno, input)?
                .parse()
                .with_context(|| format!("{}:{}: bad midpoint", input, lineno))?,
            coord: Point3::new(parse_f(i_x, "X")?, parse_f(i_y, "Y")?, parse_f(i_z, "Z")?),
        });
    }
    Ok(bins)
}

/// Reads `name` plus any number of numeric columns, one entity per row.
pub fn read_features(input: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let mut lines = crate::reader(input).lines();
    let header = Header::parse(lines.next(), input)?;
    let i_name = header.col("name", input)?;

    let mut rows = vec![];
    for (lineno, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let lineno = lineno + 2;
        let fields: Vec<&str> = line.split('\t').collect();
        let name = field(&fields, i_name, lineno, input)?.to_string();
        let mut values = Vec::with_capacity(fields.len() - 1);
        for (i, f) in fields.iter().enumerate() {
            if i == i_name {
                continue;
            }
            values.push(
                f.parse()
                    .with_context(|| format!("{}:{}: bad feature value `{}`", input, lineno, f))?,
            );
        }
        if values.is_empty() {
            bail!("{}:{}: entity {} has no feature values", input, lineno, name);
        }
        rows.push((name, values));
    }
    Ok(rows)
}

/// Reads `name  sum  abs_sum  neighbors` rows. The neighbors column is a
/// comma-separated gene list and may be empty. Row order is preserved.
pub fn read_summaries(input: &str) -> Result<IndexMap<String, CorrelationSummary>> {
    let mut lines = crate::reader(input).lines();
    let header = Header::parse(lines.next(), input)?;
    let i_name = header.col("name", input)?;
    let i_sum = header.col("sum", input)?;
    let i_abs = header.col("abs_sum", input)?;
    let i_near = header.col("neighbors", input)?;

    let mut summaries = IndexMap::new();
    for (lineno, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let lineno = lineno + 2;
        let fields: Vec<&str> = line.split('\t').collect();
        let name = field(&fields, i_name, lineno, input)?.to_string();
        let neighbors = field(&fields, i_near, lineno, input)?;
        let neighbors: Vec<String> = if neighbors.is_empty() {
            vec![]
        } else {
            neighbors.split(',').map(|s| s.to_string()).collect()
        };
        summaries.insert(
            name,
            CorrelationSummary {
                sum: field(&fields, i_sum, lineno, input)?
                    .parse()
                    .with_context(|| format!("{}:{}: bad sum", input, lineno))?,
                abs_sum: field(&fields, i_abs, lineno, input)?
                    .parse()
                    .with_context(|| format!("{}:{}: bad abs_sum", input, lineno))?,
                neighbors,
            },
        );
    }
    Ok(summaries)
}
