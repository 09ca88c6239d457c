use clap::*;
use g3d::libs::dist::DistanceMatrix;
use g3d::libs::tsv;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("near")
        .about("N closest entities per entity")
        .after_help(
            r###"
This command ranks, for every entity, the N other entities with the smallest Euclidean distance in
feature space. An entity never lists itself; ties keep the input row order.

Input schema (TSV with a header row):
* name followed by any number of numeric columns

Output is one `name  neighbor  distance` row per ranked neighbor, entities in input order.

Notes:
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'
* When -n exceeds the number of other entities, all of them are listed

Examples:
1. Ten closest genes by expression profile:
   g3d near expression.tsv -n 10

2. Closest genes by genomic position:
   g3d near positions.tsv -n 5 -o near.tsv

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Feature table: name plus numeric columns"),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .short('n')
                .num_args(1)
                .default_value("10")
                .value_parser(builder::RangedU64ValueParser::<usize>::new().range(1..))
                .help("Number of neighbors to keep"),
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
    let count = *args.get_one::<usize>("count").unwrap();

    let rows = tsv::read_features(args.get_one::<String>("infile").unwrap())?;
    let matrix = DistanceMatrix::from_features(&rows)?;

    writer.write_fmt(format_args!("name\tneighbor\tdistance\n"))?;
    for id in matrix.ids().to_vec() {
        for (neighbor, d) in matrix.nearest_neighbors(&id, count)? {
            writer.write_fmt(format_args!("{}\t{}\t{:.6}\n", id, neighbor, d))?;
        }
    }

    Ok(())
}
