use clap::Subcommand;
use pomoline_core::{Config, ConfigError, EventKind};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `timer.work_minutes`
    Get { key: String },
    /// Change one value; the type must match the current one
    Set { key: String, value: String },
    /// Print the whole config as stored (TOML), or as JSON
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print the config file location
    Path,
    /// Run a shell command whenever EVENT is dispatched
    Hook {
        /// session-started, session-interrupted, session-completed,
        /// break-started or break-ended
        event: EventKind,
        command: String,
    },
    /// Remove every command hooked to EVENT
    Unhook { event: EventKind },
    /// Overwrite the config file with the defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let value = Config::load()?
                .get(&key)
                .ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List { json } => {
            let config = Config::load()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config.to_toml()?);
            }
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
        ConfigAction::Hook { event, command } => {
            let mut config = Config::load()?;
            config.add_hook(event, command);
            config.save()?;
            println!("hooked {event}");
        }
        ConfigAction::Unhook { event } => {
            let mut config = Config::load()?;
            let removed = config.remove_hooks(event);
            config.save()?;
            println!("removed {removed} hook(s) for {event}");
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
