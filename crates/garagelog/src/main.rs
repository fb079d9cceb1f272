//! `garagelog` - CLI for the vehicle logbook.
//!
//! This binary is the collaborator layer on top of the store and backup
//! codec: it parses arguments, opens the store, and renders results.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use serde_json::Value;

use garagelog::cli::{
    self, AddCommand, Cli, Command, ConfigCommand, ExportCommand, ImportCommand, ListCommand,
    UpdateCommand,
};
use garagelog::records::LogKind;
use garagelog::{backup, init_logging, Config, Store};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;
    let database_path = config.database_path();
    let mut store = Store::open(&database_path)
        .with_context(|| format!("opening store at {}", database_path.display()))?;

    match cli.command {
        Command::Status(cmd) => handle_status(&config, &store, cmd.json),
        Command::Add(cmd) => handle_add(&mut store, &cmd),
        Command::List(cmd) => handle_list(&store, &cmd),
        Command::Update(cmd) => handle_update(&mut store, &cmd),
        Command::Config(cmd) => handle_config(&mut store, &cmd),
        Command::Export(cmd) => handle_export(&config, &store, cmd),
        Command::Import(cmd) => handle_import(&mut store, &cmd),
    }
}

fn handle_status(config: &Config, store: &Store, json: bool) -> anyhow::Result<()> {
    let snapshot = store.snapshot()?;
    if json {
        let status = serde_json::json!({
            "database_path": store.path(),
            "archive_dir": config.archive_dir(),
            "trips": snapshot.trips.len(),
            "notes": snapshot.notes.len(),
            "maintlog": snapshot.maintlog.len(),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        println!("garagelog status");
        println!("----------------");
        println!("Database:     {}", store.path().display());
        println!("Backups in:   {}", config.archive_dir().display());
        println!("Trips:        {}", snapshot.trips.len());
        println!("Notes:        {}", snapshot.notes.len());
        println!("Maintenance:  {}", snapshot.maintlog.len());
    }
    Ok(())
}

fn handle_add(store: &mut Store, cmd: &AddCommand) -> anyhow::Result<()> {
    let fields = cli::parse_fields(&cmd.fields).map_err(|message| anyhow::anyhow!(message))?;
    let kind = LogKind::from(cmd.record);
    let id = store.append(kind, fields)?;
    println!("Added {kind} entry with id {id}");
    Ok(())
}

fn handle_list(store: &Store, cmd: &ListCommand) -> anyhow::Result<()> {
    let entries = store.entries(cmd.record.into())?;
    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else if entries.is_empty() {
        println!("No entries.");
    } else {
        for entry in &entries {
            let rendered: Vec<String> = entry
                .fields
                .iter()
                .map(|(key, value)| format!("{key}={}", render_value(value)))
                .collect();
            println!("{:>4}  {}", entry.id, rendered.join("  "));
        }
    }
    Ok(())
}

fn handle_update(store: &mut Store, cmd: &UpdateCommand) -> anyhow::Result<()> {
    let patch = cli::parse_fields(&cmd.fields).map_err(|message| anyhow::anyhow!(message))?;
    let kind = LogKind::from(cmd.record);
    if store.update_by_id(kind, cmd.id, &patch)? {
        println!("Updated {kind} entry {}", cmd.id);
        Ok(())
    } else {
        anyhow::bail!("no {kind} entry with id {}", cmd.id)
    }
}

fn handle_config(store: &mut Store, cmd: &ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            let config = store.config()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Odometer (mkm):    {}", config.mkm);
                println!("Inspection date:   {}", config.idate);
                println!("Insurance date:    {}", config.insdate);
                for (key, value) in &config.extra {
                    println!("{key}:    {}", render_value(value));
                }
            }
        }
        ConfigCommand::Set { key, value } => {
            let value: Value = serde_json::from_str(value)
                .unwrap_or_else(|_| Value::String(value.clone()));
            store.set_config_field(key, value)?;
            println!("Set {key}");
        }
    }
    Ok(())
}

fn handle_export(config: &Config, store: &Store, cmd: ExportCommand) -> anyhow::Result<()> {
    let proposed = cmd.output.unwrap_or_else(|| config.default_archive_path());
    let archive = backup::export_all(store, proposed).context("backup export failed")?;
    println!("Backup written to {}", archive.display());
    Ok(())
}

fn handle_import(store: &mut Store, cmd: &ImportCommand) -> anyhow::Result<()> {
    backup::import_from(store, &cmd.archive)
        .with_context(|| format!("restore from {} failed", cmd.archive.display()))?;
    println!("Restore complete.");
    Ok(())
}

/// Render a JSON value for plain-text output (strings without quotes).
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
