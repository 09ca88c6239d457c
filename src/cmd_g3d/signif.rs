use clap::*;
use g3d::libs::signif;
use g3d::libs::tsv;
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    Command::new("signif")
        .about("Robust outliers among correlation sums")
        .after_help(
            r###"
This command flags genes whose signed correlation sum falls outside a robust threshold band. The
band is the median of all sums plus/minus a coefficient times their median absolute deviation
(MAD); median and MAD are used instead of mean and standard deviation so the thresholds are not
dragged by the very outliers being hunted.

A gene passes above the upper threshold, or at/below the lower threshold if its sum is also
non-positive. Output keeps the input row order, one gene id per line.

Input schema (TSV with a header row):
* name  sum  abs_sum  neighbors (comma-separated gene list, may be empty)

Notes:
* Supports both plain text and gzipped (.gz) files
* Reads from stdin if input file is 'stdin'
* Fewer than two rows, or a MAD of zero, flags nothing

Examples:
1. Default two-MAD band:
   g3d signif sums.tsv

2. A stricter band:
   g3d signif sums.tsv -c 3.5 -o significant.txt

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .index(1)
                .help("Correlation summary table"),
        )
        .arg(
            Arg::new("coefficient")
                .long("coefficient")
                .short('c')
                .num_args(1)
                .default_value("2")
                .value_parser(value_parser!(f64))
                .help("Width of the threshold band in MADs"),
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
    let coefficient = *args.get_one::<f64>("coefficient").unwrap();

    let summaries = tsv::read_summaries(args.get_one::<String>("infile").unwrap())?;

    for name in signif::detect_significant(&summaries, coefficient) {
        writer.write_fmt(format_args!("{}\n", name))?;
    }

    Ok(())
}
