extern crate clap;
use clap::*;

mod cmd_g3d;

fn main() -> anyhow::Result<()> {
    let app = Command::new("g3d")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`g3d` - Genes on 3D genome models")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_g3d::project::make_subcommand())
        .subcommand(cmd_g3d::mat::make_subcommand())
        .subcommand(cmd_g3d::near::make_subcommand())
        .subcommand(cmd_g3d::signif::make_subcommand())
        .after_help(
            r###"Subcommand groups:

* Geometry:
    * project - Interpolate gene start sites onto a 3D genome model

* Distances:
    * mat  - Pairwise distance matrix from feature vectors
    * near - N closest entities per entity

* Statistics:
    * signif - Robust outliers among correlation sums

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("project", sub_matches)) => cmd_g3d::project::execute(sub_matches),
        Some(("mat", sub_matches)) => cmd_g3d::mat::execute(sub_matches),
        Some(("near", sub_matches)) => cmd_g3d::near::execute(sub_matches),
        Some(("signif", sub_matches)) => cmd_g3d::signif::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
