//! Command handlers. Output goes to the writer handed in; logs go to stderr.

use crate::args::{Command, Target};
use anyhow::{Context, Result};
use depot::{DirOptions, FileSystem};
use std::io::{self, Read, Write};
use std::path::Path;

/// Runs one command against `fs`, writing its result to `out`.
///
/// `stdin` supplies the content of `write` when no input file is given.
pub(crate) fn run(
    fs: &FileSystem,
    command: Command,
    stdin: &mut impl Read,
    out: &mut impl Write,
) -> Result<()> {
    match command {
        Command::Storages {} => storages(fs, out)?,
        Command::Write { target, input } => {
            let data = read_input(input.as_deref(), stdin)?;
            let path =
                fs.write(&target.storage, &target.filename, data).context(describe(&target))?;
            writeln!(out, "{}", path.display())?;
        },
        Command::Read { target } => {
            let data = fs.read(&target.storage, &target.filename).context(describe(&target))?;
            out.write_all(&data)?;
        },
        Command::Delete { target } => {
            let removed = fs.delete(&target.storage, &target.filename).context(describe(&target))?;
            writeln!(out, "{removed}")?;
        },
        Command::Exists { target } => {
            let found = fs.exists(&target.storage, &target.filename).context(describe(&target))?;
            writeln!(out, "{found}")?;
        },
        Command::Mkdir { target, mode, no_recursive } => {
            let options = DirOptions { mode, recursive: !no_recursive };
            let created = fs
                .make_dir(&target.storage, &target.filename, options)
                .context(describe(&target))?;
            writeln!(out, "{created}")?;
        },
        Command::ImageSize { target } => {
            let size = fs.image_size(&target.storage, &target.filename).context(describe(&target))?;
            writeln!(out, "{}x{}", size.width, size.height)?;
        },
        Command::Exif { target, json } => {
            let tags = fs.exif_data(&target.storage, &target.filename).context(describe(&target))?;
            if json {
                serde_json::to_writer_pretty(&mut *out, &tags)?;
                writeln!(out)?;
            } else {
                for (tag, value) in &tags {
                    writeln!(out, "{tag}: {value}")?;
                }
            }
        },
    }
    out.flush()?;
    Ok(())
}

fn storages(fs: &FileSystem, out: &mut impl Write) -> io::Result<()> {
    for (name, configuration) in fs.all() {
        let adapter = configuration.adapter.as_deref().unwrap_or("-");
        let filters: Vec<&str> = configuration.filters.iter().map(|f| f.name()).collect();
        if filters.is_empty() {
            writeln!(out, "{name}\t{adapter}")?;
        } else {
            writeln!(out, "{name}\t{adapter}\t{}", filters.join(","))?;
        }
    }
    Ok(())
}

fn read_input(input: Option<&Path>, stdin: &mut impl Read) -> Result<Vec<u8>> {
    if let Some(path) = input {
        return std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()));
    }
    let mut data = Vec::new();
    stdin.read_to_end(&mut data).context("Failed to read stdin")?;
    Ok(data)
}

fn describe(target: &Target) -> String {
    format!("{}:{}", target.storage, target.filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use depot::{Configuration, filters};

    fn target(storage: &str, filename: &str) -> Target {
        Target { storage: storage.to_owned(), filename: filename.to_owned() }
    }

    fn exec(fs: &FileSystem, command: Command, stdin: &[u8]) -> Result<String> {
        let mut out = Vec::new();
        run(fs, command, &mut &*stdin, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn memory() -> FileSystem {
        let fs = FileSystem::new();
        fs.define("scratch", Configuration::new("memory")).unwrap();
        fs
    }

    #[test]
    fn write_from_stdin_then_read() {
        let fs = memory();
        let written =
            exec(&fs, Command::Write { target: target("scratch", "a/b.txt"), input: None }, b"hi")
                .unwrap();
        assert!(written.trim_end().ends_with("a/b.txt"));

        let read = exec(&fs, Command::Read { target: target("scratch", "/a/b.txt") }, b"").unwrap();
        assert_eq!(read, "hi");
    }

    #[test]
    fn flags_are_printed() {
        let fs = memory();
        let exists = || Command::Exists { target: target("scratch", "d") };
        assert_eq!(exec(&fs, exists(), b"").unwrap(), "false\n");

        let mkdir =
            Command::Mkdir { target: target("scratch", "d"), mode: 0o755, no_recursive: false };
        assert_eq!(exec(&fs, mkdir, b"").unwrap(), "true\n");
        assert_eq!(exec(&fs, exists(), b"").unwrap(), "true\n");
        let delete = Command::Delete { target: target("scratch", "d") };
        assert_eq!(exec(&fs, delete, b"").unwrap(), "true\n");
    }

    #[test]
    fn storages_lists_adapters_and_filters() {
        let fs = memory();
        fs.define("archive", Configuration::new("memory").filter(filters::read_only())).unwrap();
        let listing = exec(&fs, Command::Storages {}, b"").unwrap();
        assert_eq!(listing, "scratch\tmemory\narchive\tmemory\tread_only\n");
    }

    #[test]
    fn errors_name_the_target() {
        let fs = memory();
        let err = exec(&fs, Command::Read { target: target("scratch", "ghost") }, b"").unwrap_err();
        assert!(format!("{err:#}").starts_with("scratch:ghost"));
    }
}
