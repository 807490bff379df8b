pub mod doctor;
pub mod list;
pub mod serve;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Start the gallery API server
    Serve(serve::ServeArgs),
    /// List versions in the registry
    List(list::ListArgs),
    /// Cross-check the registry against the files on disk
    Doctor(doctor::DoctorArgs),
}
