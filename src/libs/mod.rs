pub mod coord;
pub mod dist;
pub mod io;
pub mod signif;
pub mod tsv;
