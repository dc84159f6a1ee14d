//! gramdex CLI: interactive queries over a compact n-gram index.
//!
//! Thin wrapper over the `gramdex` library crate: builds the index from a
//! sorted n-gram count file, then loops reading queries from stdin.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use gramdex::NgramIndex;

/// Compact n-gram language index with Elias-Fano compressed child sets.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Sorted n-gram count file, one `w_1 … w_L <TAB> count` record per line.
    ngram_file: PathBuf,

    /// Gram length L of every record in the file.
    gram_len: usize,
}

/// Whitespace token reader over interactive input. Tokens may share a line
/// or arrive one per line.
struct TokenReader<R> {
    inner: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> TokenReader<R> {
    fn new(inner: R) -> Self {
        TokenReader {
            inner,
            pending: VecDeque::new(),
        }
    }

    /// Next whitespace-separated token, or `None` at end of input.
    fn next_token(&mut self) -> io::Result<Option<String>> {
        while self.pending.is_empty() {
            let mut line = String::new();
            if self.inner.read_line(&mut line)? == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_owned));
        }
        Ok(self.pending.pop_front())
    }

    /// Next token that parses as a number; nags on anything else.
    fn next_number(&mut self) -> io::Result<Option<usize>> {
        loop {
            let Some(token) = self.next_token()? else {
                return Ok(None);
            };
            match token.parse() {
                Ok(n) => return Ok(Some(n)),
                Err(_) => eprintln!("expected a number, got '{token}'"),
            }
        }
    }
}

fn main() -> io::Result<()> {
    let args = Args::parse();

    let stdin = io::stdin();
    let mut input = TokenReader::new(stdin.lock());
    let stdout = io::stdout();
    let mut out = stdout.lock();

    write!(out, "Enter a K value: ")?;
    out.flush()?;
    let Some(k) = input.next_number()? else {
        return Ok(());
    };

    eprintln!("Building index from {}...", args.ngram_file.display());
    let index = match NgramIndex::from_path(&args.ngram_file, args.gram_len, k) {
        Ok(index) => index,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };
    eprintln!(
        "Indexed {} words into {} trie nodes (~{} heap bytes)",
        index.vocab().len(),
        index.trie().len(),
        index.trie().heap_bytes(),
    );

    loop {
        writeln!(out, "Choose a query:\n0. Most Likely Next\n1. Frequency Count")?;
        out.flush()?;
        let Some(kind) = input.next_number()? else {
            break;
        };

        let mut to_return = 0;
        if kind == 0 {
            write!(out, "Enter how many results to return (0 quits): ")?;
            out.flush()?;
            match input.next_number()? {
                None | Some(0) => break,
                Some(n) => to_return = n,
            }
        } else if kind != 1 {
            writeln!(out, "Unknown query kind {kind}, expected 0 or 1")?;
            continue;
        }

        writeln!(out, "Enter a phrase, one word per entry; finish with 'e':")?;
        out.flush()?;
        let mut phrase = Vec::new();
        loop {
            match input.next_token()? {
                None => return Ok(()),
                Some(token) if token == "e" => break,
                Some(token) => phrase.push(token),
            }
        }
        let words: Vec<&str> = phrase.iter().map(String::as_str).collect();

        if kind == 0 {
            let started = Instant::now();
            let result = index.most_likely_next(&words, to_return);
            let elapsed = started.elapsed();
            writeln!(
                out,
                "Query took: {} nanoseconds\nor {} microseconds",
                elapsed.as_nanos(),
                elapsed.as_micros(),
            )?;
            for (i, word) in result.iter().enumerate() {
                writeln!(out, "{i}. {word}")?;
            }
            writeln!(out)?;
        } else {
            let started = Instant::now();
            let count = index.frequency_count(&words);
            let elapsed = started.elapsed();
            writeln!(
                out,
                "Query took: {} nanoseconds\nor {} microseconds",
                elapsed.as_nanos(),
                elapsed.as_micros(),
            )?;
            writeln!(out, "Occurs {count} times\n")?;
        }
        out.flush()?;
    }

    Ok(())
}
