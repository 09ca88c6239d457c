pub mod mat;
pub mod near;
pub mod project;
pub mod signif;
