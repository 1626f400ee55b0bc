use clap::Subcommand;
use vowtimer_core::Config;

use super::CommandResult;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one setting, addressed as section.field
    Get {
        /// e.g. "timer.duration_min" or "theme.gold"
        key: String,
    },
    /// Change one setting and write the file
    Set {
        key: String,
        value: String,
    },
    /// Print the whole file as TOML
    #[command(alias = "list")]
    Show,
    /// Print where the file lives
    Path,
    /// Overwrite the file with the built-in defaults
    Reset,
}

pub fn run(action: ConfigAction) -> CommandResult {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config
                .get(&key)
                .ok_or_else(|| format!("no setting named '{key}'"))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            tracing::info!(%key, %value, "setting changed");
            println!("{key} = {value}");
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            tracing::info!("settings reset");
            println!("settings restored to defaults");
        }
    }
    Ok(())
}
