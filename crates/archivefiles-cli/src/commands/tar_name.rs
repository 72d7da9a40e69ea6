//! Tar-name command - Show the intermediate tar name for a compressed tar

use anyhow::Result;
use archivefiles_core::compute_tar_name;

pub fn run(name: &str) -> Result<()> {
    println!("{}", compute_tar_name(name));
    Ok(())
}
