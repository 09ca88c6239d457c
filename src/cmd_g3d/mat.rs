use clap::*;
use g3d::libs::dist::DistanceMatrix;
use g3d::libs::tsv;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("mat")
        .about("Pairwise Euclidean distance matrix from feature vectors")
        .after_help(
            r###"
This command computes the full symmetric distance matrix between entities described by numeric
feature vectors, e.g. gene expression profiles or gene positions. All rows must carry the same
number of values.

Input schema (TSV with a header row):
* name followed by any number of numeric columns

Output is a square matrix with an id header row and an id first column.

Notes:
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'

Examples:
1. Distance matrix of expression profiles:
   g3d mat expression.tsv

2. Save the output to a file:
   g3d mat expression.tsv -o dist.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Feature table: name plus numeric columns"),
        )
        .arg(
            Arg::new("outfile")
                .long("outfile")
                .short('o')
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        )
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    let mut writer = g3d::writer(args.get_one::<String>("outfile").unwrap());

    let rows = tsv::read_features(args.get_one::<String>("infile").unwrap())?;
    let matrix = DistanceMatrix::from_features(&rows)?;

    writer.write_fmt(format_args!("name\t{}\n", matrix.ids().join("\t")))?;
    for a in matrix.ids() {
        writer.write_fmt(format_args!("{}", a))?;
        for b in matrix.ids() {
            writer.write_fmt(format_args!("\t{:.6}", matrix.get(a, b)?))?;
        }
        writer.write_all(b"\n")?;
    }

    Ok(())
}
