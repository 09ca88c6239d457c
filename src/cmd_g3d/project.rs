use clap::*;
use g3d::libs::coord::{self, BoundaryPolicy};
use g3d::libs::tsv;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("project")
        .about("Interpolates gene start sites onto a 3D genome model")
        .after_help(
            r###"
This command places each gene on the 3D genome contour. The model file holds the midpoints of
fixed-length fragments (one resolution each) with their X/Y/Z coordinates; a gene is positioned on
the segment between the two anchors flanking its start site, proportionally to its offset within
the fragment. Placement assumes genomic distance maps linearly onto 3D distance inside a fragment.

The chromosome sets of the two files must match exactly.

Input schemas (TSV with a header row, columns located by name):
* genes:  name  chr  start
* genome: chr  midpoint  X  Y  Z

Notes:
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'
* A gene whose start lies in the last fragment of a chromosome has no downstream anchor.
  The default is to fail; with --boundary clamp such genes take the last anchor's
  coordinate and a count is reported on stderr.

Examples:
1. Project genes onto a 100 kb resolution model:
   g3d project genes.tsv genome.tsv -r 100000

2. Keep chromosome-end genes instead of failing:
   g3d project genes.tsv genome.tsv -r 100000 --boundary clamp -o genes_3d.tsv

"###,
        )
        .arg(
            Arg::new("genes")
                .required(true)
                .index(1)
                .help("Gene table: name, chr, start"),
        )
        .arg(
            Arg::new("genome")
                .required(true)
                .index(2)
                .help("3D genome model: chr, midpoint, X, Y, Z"),
        )
        .arg(
            Arg::new("resolution")
                .long("resolution")
                .short('r')
                .required(true)
                .num_args(1)
                .value_parser(value_parser!(u64).range(1..))
                .help("Fragment length of the 3D model in bp"),
        )
        .arg(
            Arg::new("boundary")
                .long("boundary")
                .num_args(1)
                .default_value("reject")
                .value_parser(["reject", "clamp"])
                .help("Policy for genes without a downstream anchor"),
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
    let resolution = *args.get_one::<u64>("resolution").unwrap();
    let policy = match args.get_one::<String>("boundary").unwrap().as_str() {
        "clamp" => BoundaryPolicy::Clamp,
        _ => BoundaryPolicy::Reject,
    };

    let genes = tsv::read_genes(args.get_one::<String>("genes").unwrap())?;
    let bins = tsv::read_bins(args.get_one::<String>("genome").unwrap())?;

    let (coords, stats) = coord::project_gene_coordinates(&genes, &bins, resolution, policy)?;

    if stats.clamped > 0 {
        eprintln!(
            "Warning: {} gene(s) clamped to the last anchor of their chromosome",
            stats.clamped
        );
    }

    writer.write_fmt(format_args!("name\tchr\tstart\tX\tY\tZ\n"))?;
    for gc in &coords {
        writer.write_fmt(format_args!(
            "{}\t{}\t{}\t{}\t{}\t{}\n",
            gc.name, gc.chr, gc.start, gc.coord.x, gc.coord.y, gc.coord.z
        ))?;
    }

    Ok(())
}
