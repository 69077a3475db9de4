//! Dictionary CLI commands
//!
//! Provides commands for installing, removing and inspecting hyphenation
//! dictionaries.

use anyhow::{Context, Result};
use clap::Subcommand;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use hyphen_core::{Installer, InstallerConfig, Registry};

#[derive(Subcommand, Debug)]
pub enum DictionaryCommand {
    /// Install dictionaries for one or more locales (e.g. en_US de)
    Install {
        /// Locales to install
        #[clap(required = true)]
        locales: Vec<String>,

        /// Download again even if already installed
        #[clap(long)]
        force: bool,

        /// Skip dictionaries.xcu lookup and guess the download URL
        #[clap(long)]
        no_description: bool,
    },

    /// Uninstall dictionaries (removes every locale sharing the file)
    Uninstall {
        /// Locales to uninstall
        #[clap(required = true)]
        locales: Vec<String>,
    },

    /// List installed dictionaries
    List {
        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print the installed dictionary path for a locale
    Path {
        /// Locale
        locale: String,
    },

    /// Show whether a locale is installed
    Status {
        /// Locale
        locale: String,
    },

    /// Show where a locale's dictionary would be downloaded from
    Resolve {
        /// Locale
        locale: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

impl DictionaryCommand {
    pub fn execute(self, mut config: InstallerConfig) -> Result<()> {
        match self {
            DictionaryCommand::Install {
                locales,
                force,
                no_description,
            } => {
                if no_description {
                    config.use_description = false;
                }
                execute_install(config, &locales, force)
            }
            DictionaryCommand::Uninstall { locales } => execute_uninstall(config, &locales),
            DictionaryCommand::List { json } => execute_list(config, json),
            DictionaryCommand::Path { locale } => execute_path(config, &locale),
            DictionaryCommand::Status { locale } => execute_status(config, &locale),
            DictionaryCommand::Resolve { locale, json } => execute_resolve(config, &locale, json),
        }
    }
}

fn execute_install(config: InstallerConfig, locales: &[String], force: bool) -> Result<()> {
    let installer = Installer::new(config)?;

    for locale in locales {
        let result = if force {
            installer.install(locale)
        } else {
            installer.install_if_necessary(locale)
        };
        let path = result.with_context(|| format!("Failed to install '{locale}'"))?;

        println!("Installed {locale} -> {}", path.display());
    }

    Ok(())
}

fn execute_uninstall(config: InstallerConfig, locales: &[String]) -> Result<()> {
    for locale in locales {
        let removed = hyphen_core::uninstall(locale, Some(config.directory.as_path()))?;
        if removed.is_empty() {
            println!("Locale '{locale}' is not installed.");
        } else {
            println!("Uninstalled {}", removed.join(", "));
        }
    }

    Ok(())
}

/// Table row for installed dictionaries
#[derive(Tabled)]
struct InstalledRow {
    #[tabled(rename = "Locale")]
    locale: String,
    #[tabled(rename = "File")]
    file: String,
    #[tabled(rename = "Source")]
    source: String,
}

fn execute_list(config: InstallerConfig, json_output: bool) -> Result<()> {
    let entries = Registry::new(&config.directory).entries()?;

    if json_output {
        let json_entries: Vec<serde_json::Value> = entries
            .iter()
            .map(|(locale, entry)| {
                serde_json::json!({
                    "locale": locale,
                    "file": entry.file,
                    "url": entry.source_url,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&json_entries)?);
        return Ok(());
    }

    if entries.is_empty() {
        println!("No dictionaries installed in {}.", config.directory.display());
        println!("\nRun 'hyphen install <locale>' to install one.");
        return Ok(());
    }

    let table_rows: Vec<InstalledRow> = entries
        .into_iter()
        .map(|(locale, entry)| InstalledRow {
            locale,
            file: entry.file,
            source: entry.source_url,
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();

    println!("{table}");

    Ok(())
}

fn execute_path(config: InstallerConfig, locale: &str) -> Result<()> {
    let path = Registry::new(&config.directory).filepath(locale)?;
    println!("{}", path.display());
    Ok(())
}

fn execute_status(config: InstallerConfig, locale: &str) -> Result<()> {
    if hyphen_core::is_installed(locale, Some(config.directory.as_path()))? {
        println!("{locale}: installed");
    } else {
        println!("{locale}: not installed");
    }
    Ok(())
}

fn execute_resolve(config: InstallerConfig, locale: &str, json_output: bool) -> Result<()> {
    let installer = Installer::new(config)?;
    let resolved = installer
        .resolve(locale)
        .with_context(|| format!("Failed to resolve '{locale}'"))?;

    if json_output {
        let value = serde_json::json!({
            "locale": locale,
            "url": resolved.download_url,
            "locales": resolved.locales,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("URL:     {}", resolved.download_url);
        println!("Locales: {}", resolved.locales.join(", "));
    }

    Ok(())
}
