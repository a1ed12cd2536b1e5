use std::env;
use std::fs;

use flate2::Compression;
use mnemonic_trie::{wordlist, CompactTrie};

const DEFAULT_OUTPUT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/data/english.trie.bin");

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|arg| arg == "-h" || arg == "--help") {
        eprintln!("Usage: {} [<wordlist.txt>] [<output.bin>]", args[0]);
        eprintln!(
            "Defaults to the bundled English list and {}",
            DEFAULT_OUTPUT
        );
        std::process::exit(0);
    }

    let text = match args.get(1) {
        Some(path) => match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("ERROR: failed to read wordlist {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => wordlist::ENGLISH.to_string(),
    };
    let output = args.get(2).map(String::as_str).unwrap_or(DEFAULT_OUTPUT);

    let words = wordlist::parse(&text);
    let trie = match CompactTrie::build(&words) {
        Ok(trie) => trie,
        Err(e) => {
            eprintln!("ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let compressed = match trie.to_compressed(Compression::best()) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("ERROR: compression failed: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = fs::write(output, &compressed) {
        eprintln!("ERROR: failed to write {}: {}", output, e);
        std::process::exit(1);
    }

    println!("Words: {}", trie.num_words());
    println!("Nodes: {}", trie.num_nodes());
    println!("Uncompressed: {} bytes", trie.serialized_size());
    println!("Compressed: {} bytes", compressed.len());
    println!("Written to {}", output);
}
