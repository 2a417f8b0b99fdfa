//! Command implementations for the gen-readme CLI.

mod check;
mod generate;

pub use check::execute as check_changed_files;
pub use generate::execute as generate_readmes;
