use std::env;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use catalog::SongIndex;
use common::{relative_path, HashStore};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// Usage: list_files <song.json> [files_root] > filelist
// then:  tar cvaf songs.tar.zst -C <files_root> --files-from=filelist
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let mut args = env::args().skip(1);
    let catalog_path = args
        .next()
        .or_else(|| env::var("CIRCLES_CATALOG").ok())
        .ok_or("CIRCLES_CATALOG not set and no catalog argument")?;
    let store = args.next().map(|root| HashStore::new(PathBuf::from(root)));

    let index = SongIndex::load(&PathBuf::from(&catalog_path))?;

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let mut listed = 0usize;
    let mut missing = 0usize;
    for (song_index, song) in index.list() {
        for hash in song.hashes() {
            let relpath = match relative_path(hash) {
                Ok(relpath) => relpath,
                Err(err) => {
                    warn!("Skipping song {} ({}): {}", song_index, song.title, err);
                    continue;
                }
            };
            if let Some(store) = &store {
                if !store.root().join(&relpath).is_file() {
                    warn!("Missing file for song {} ({}): {}", song_index, song.title, hash);
                    missing += 1;
                }
            }
            writeln!(out, "{}", relpath.display())?;
            listed += 1;
        }
    }
    out.flush()?;

    if store.is_some() {
        info!("Listed {} files, {} missing", listed, missing);
    } else {
        info!("Listed {} files", listed);
    }
    Ok(())
}
