use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{get_data_dir, load_settings, save_settings, shellexpand_path};

use super::read_line;

pub fn run(data_dir: Option<String>) -> Result<()> {
    if let Some(dir) = data_dir {
        let mut settings = load_settings();
        settings.data_dir = shellexpand_path(&dir);
        save_settings(&settings)?;
    } else if std::env::var("SPENDBOOK_DATA_DIR").is_err() {
        let mut settings = load_settings();
        let chosen = read_line(&format!("Data directory [{}]: ", settings.data_dir));
        if !chosen.is_empty() {
            settings.data_dir = shellexpand_path(&chosen);
        }
        save_settings(&settings)?;
    }

    let resolved = get_data_dir();
    std::fs::create_dir_all(&resolved)?;
    let conn = get_connection(&resolved.join("spendbook.db"))?;
    init_db(&conn)?;
    println!("Initialized spendbook at {}", resolved.display());
    Ok(())
}
