use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::env;

use crate::error::{Result, WordUpError};

/// Reads a text file into memory.
pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<String> {
	let path = filename.as_ref();
	let mut contents = String::new();
	File::open(path)
		.and_then(|mut f| f.read_to_string(&mut contents))
		.map_err(|e| WordUpError::io_at(e.to_string(), path))?;
	Ok(contents)
}

/// Reads a newline-delimited word list.
///
/// - Splits on `\n` / `\r\n`
/// - Trims each line and skips blank ones
pub fn read_wordlist<P: AsRef<Path>>(filename: P) -> Result<Vec<String>> {
	Ok(read_file(filename)?
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(str::to_owned)
		.collect())
}

/// Writes words one per line, sorted and deduplicated.
///
/// Returns the number of lines written.
pub fn write_wordlist<W, I, S>(writer: W, words: I) -> std::io::Result<usize>
where
	W: Write,
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let sorted: BTreeSet<String> = words.into_iter().map(|w| w.as_ref().to_owned()).collect();
	let mut writer = BufWriter::new(writer);
	for word in &sorted {
		writeln!(writer, "{word}")?;
	}
	writer.flush()?;
	Ok(sorted.len())
}

/// Writes a word list to `path`, replacing any existing file.
pub fn save_wordlist<P, I, S>(path: P, words: I) -> Result<usize>
where
	P: AsRef<Path>,
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let path = path.as_ref();
	File::create(path)
		.and_then(|file| write_wordlist(file, words))
		.map_err(|e| WordUpError::io_at(e.to_string(), path))
}

/// Resolves the directory the word lists are written to.
///
/// An empty argument or the current directory (`.`, `./`) becomes the
/// absolute working directory, so logged output paths are unambiguous.
/// Anything else is used as given and created by the caller.
pub fn normalize_folder(input: &str) -> PathBuf {
	let input = input.trim();
	if input.is_empty() || input == "." || input == "./" {
		env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
	} else {
		PathBuf::from(input)
	}
}

/// Lists files in `dir` whose extension is one of `extensions`, sorted.
///
/// Matching is case-insensitive. Subdirectories are not visited.
pub fn list_files<P: AsRef<Path>>(dir: P, extensions: &[&str]) -> Result<Vec<PathBuf>> {
	let dir = dir.as_ref();
	let mut files = Vec::new();

	for entry in fs::read_dir(dir).map_err(|e| WordUpError::io_at(e.to_string(), dir))? {
		let path = entry?.path();
		if !path.is_file() {
			continue;
		}
		let matches = path
			.extension()
			.and_then(|ext| ext.to_str())
			.is_some_and(|ext| extensions.iter().any(|wanted| wanted.eq_ignore_ascii_case(ext)));
		if matches {
			files.push(path);
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wordlist_is_sorted_and_unique() {
		let mut out = Vec::new();
		let written = write_wordlist(&mut out, ["tank", "bank", "rank", "bank"]).unwrap();
		assert_eq!(written, 3);
		assert_eq!(String::from_utf8(out).unwrap(), "bank\nrank\ntank\n");
	}

	#[test]
	fn empty_wordlist_writes_nothing() {
		let mut out = Vec::new();
		assert_eq!(write_wordlist(&mut out, Vec::<String>::new()).unwrap(), 0);
		assert!(out.is_empty());
	}

	#[test]
	fn save_then_read() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("list.txt");
		save_wordlist(&path, ["loan", "card"]).unwrap();
		assert_eq!(read_wordlist(&path).unwrap(), vec!["card", "loan"]);
	}

	#[test]
	fn read_wordlist_skips_blank_lines() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("seed.txt");
		fs::write(&path, "bank\r\n\n  rank  \n").unwrap();
		assert_eq!(read_wordlist(&path).unwrap(), vec!["bank", "rank"]);
	}

	#[test]
	fn missing_file_reports_path() {
		let err = read_file("/definitely/not/here.txt").unwrap_err();
		assert!(matches!(err, WordUpError::Io { path: Some(_), .. }));
	}

	#[test]
	fn list_files_filters_extensions() {
		let dir = tempfile::tempdir().unwrap();
		fs::write(dir.path().join("b.HTML"), "").unwrap();
		fs::write(dir.path().join("a.txt"), "").unwrap();
		fs::write(dir.path().join("c.png"), "").unwrap();
		fs::create_dir(dir.path().join("sub.txt")).unwrap();

		let files = list_files(dir.path(), &["txt", "html"]).unwrap();
		let names: Vec<String> = files
			.iter()
			.map(|p| p.file_name().unwrap().to_string_lossy().to_string())
			.collect();
		assert_eq!(names, vec!["a.txt", "b.HTML"]);
	}

	#[test]
	fn normalize_dot() {
		assert_eq!(normalize_folder("data"), PathBuf::from("data"));
		assert!(normalize_folder(".").is_absolute());
		assert_eq!(normalize_folder(""), normalize_folder("./"));
		assert_eq!(normalize_folder(" out "), PathBuf::from("out"));
	}
}
