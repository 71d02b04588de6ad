//! `scan` command: rebuild the index from sidecar files.

use console::style;

use super::common::Session;
use crate::error::CliError;

pub fn run(mut session: Session) -> Result<(), CliError> {
    let recovered = session.registry.recover()?;
    session.registry.save()?;
    println!("Recovered {} livery(s) from sidecar files.", recovered);

    for livery in session.registry.list() {
        if !session.registry.is_installed(livery) {
            println!(
                "{} {} ({}) has missing install folders",
                style("Warning:").yellow().bold(),
                livery.title(),
                livery.id
            );
        }
    }
    Ok(())
}
