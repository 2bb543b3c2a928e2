use crate::error::Result;
use crate::history;

use super::open_store;

pub fn run() -> Result<()> {
    let conn = open_store()?;
    match history::undo_last(&conn)? {
        Some(summary) => println!("{summary}"),
        None => println!("Nothing to undo."),
    }
    Ok(())
}
