// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Mind-map editor CLI entrypoint.
//!
//! By default this opens the interactive terminal editor on the diagram stored
//! in `<store-dir>/<key>.json`. `--import` and `--export` run headless.

use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use nereid_mindmap::config::EditorConfig;
use nereid_mindmap::editor::Editor;
use nereid_mindmap::store::{DiagramStore, FolderStore, StoreError, WriteDurability};
use tracing_subscriber::EnvFilter;

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [<store-dir>] [--key <name>] [--autosave-ms <ms>] [--history <n>] [--durable-writes] [--log <file>]\n  {program} [--store <dir>] [--key <name>] --import <file> [--export <file>]\n  {program} [--store <dir>] [--key <name>] --export <file>\n\nWithout --import/--export the interactive editor opens on <store-dir>/<key>.json.\nIf store-dir/--store is omitted, the current working directory is used.\n--import replaces the stored diagram with a JSON document and saves it.\n--export writes the stored diagram to a file (after --import, if both are given).\n\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported).\n--log writes diagnostics to a file; RUST_LOG selects the level (default info)."
    );
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    store_dir: Option<String>,
    key: Option<String>,
    autosave_ms: Option<u64>,
    history: Option<usize>,
    durable_writes: bool,
    import: Option<PathBuf>,
    export: Option<PathBuf>,
    log: Option<PathBuf>,
}

impl CliOptions {
    fn headless(&self) -> bool {
        self.import.is_some() || self.export.is_some()
    }
}

fn set_once<T>(slot: &mut Option<T>, value: T) -> Result<(), ()> {
    if slot.is_some() {
        return Err(());
    }
    *slot = Some(value);
    Ok(())
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--store" => {
                let dir = args.next().ok_or(())?;
                set_once(&mut options.store_dir, dir)?;
            }
            "--key" => {
                let key = args.next().ok_or(())?;
                set_once(&mut options.key, key)?;
            }
            "--autosave-ms" => {
                let raw = args.next().ok_or(())?;
                let millis: u64 = raw.parse().map_err(|_| ())?;
                set_once(&mut options.autosave_ms, millis)?;
            }
            "--history" => {
                let raw = args.next().ok_or(())?;
                let capacity: usize = raw.parse().map_err(|_| ())?;
                if capacity == 0 {
                    return Err(());
                }
                set_once(&mut options.history, capacity)?;
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--import" => {
                let path = args.next().ok_or(())?;
                set_once(&mut options.import, PathBuf::from(path))?;
            }
            "--export" => {
                let path = args.next().ok_or(())?;
                set_once(&mut options.export, PathBuf::from(path))?;
            }
            "--log" => {
                let path = args.next().ok_or(())?;
                set_once(&mut options.log, PathBuf::from(path))?;
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => set_once(&mut options.store_dir, arg)?,
        }
    }

    Ok(options)
}

fn editor_config(options: &CliOptions) -> EditorConfig {
    let mut config = EditorConfig::default();
    if let Some(key) = &options.key {
        config = config.with_store_key(key.clone());
    }
    if let Some(millis) = options.autosave_ms {
        config = config.with_autosave_delay(Duration::from_millis(millis));
    }
    if let Some(capacity) = options.history {
        config = config.with_history_capacity(capacity);
    }
    config
}

/// Diagnostics only ever go to a file; the terminal belongs to the editor.
fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|err| -> Box<dyn Error> { err })?;
    Ok(())
}

/// Builds the editor on the stored diagram.
///
/// `--import` replaces whatever is stored, so the store is not read at all.
/// The interactive editor survives a malformed entry: it starts empty and
/// returns the error as a notice for the status line. An empty store gives
/// the interactive editor its root node.
fn open_editor(
    options: &CliOptions,
    store: &dyn DiagramStore,
) -> Result<(Editor, Option<String>), StoreError> {
    let mut editor = Editor::new(editor_config(options));
    if options.import.is_some() {
        return Ok((editor, None));
    }
    match editor.load(store) {
        Ok(true) => Ok((editor, None)),
        Ok(false) => {
            if !options.headless() {
                editor.seed_root();
            }
            Ok((editor, None))
        }
        Err(err) if err.is_malformed() && !options.headless() => {
            tracing::warn!(%err, "starting with an empty diagram");
            let notice = format!("stored diagram not loaded: {err}");
            Ok((editor, Some(notice)))
        }
        Err(err) => Err(err),
    }
}

fn run_headless(
    editor: &mut Editor,
    store: &mut FolderStore,
    options: &CliOptions,
    durability: WriteDurability,
) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &options.import {
        editor.import_from(path)?;
        editor.save(store)?;
        eprintln!(
            "imported {} nodes and {} connections from {}",
            editor.graph().node_count(),
            editor.graph().connection_count(),
            path.display()
        );
    }
    if let Some(path) = &options.export {
        editor.export_to(path, durability)?;
        eprintln!("exported to {}", path.display());
    }
    Ok(())
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "nereid-mindmap".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        if let Some(path) = &options.log {
            init_logging(path)?;
        }

        let durability = if options.durable_writes {
            WriteDurability::Durable
        } else {
            WriteDurability::BestEffort
        };
        let dir = options.store_dir.clone().unwrap_or_else(|| ".".to_owned());
        let mut store = FolderStore::new(dir).with_durability(durability);

        let (mut editor, notice) = open_editor(&options, &store)?;

        if options.headless() {
            return run_headless(&mut editor, &mut store, &options, durability);
        }

        nereid_mindmap::tui::run(editor, Box::new(store), notice)
    })();

    if let Err(err) = result {
        tracing::error!(%err, "exiting");
        eprintln!("nereid-mindmap: {err}");
        std::process::exit(1);
    }
}
