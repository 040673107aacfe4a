use clap::{Parser, Subcommand};
use folio_core::{CoreConfig, LibraryService};
use std::fs::File;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "folio")]
#[command(about = "Folio document store CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all stored files
    List,
    /// Upload a local file
    Upload {
        /// Path of the file to upload
        path: PathBuf,
        /// Name to store the file under (defaults to the file's own name)
        #[arg(long)]
        name: Option<String>,
    },
    /// Download a stored file
    Download {
        /// Stored file name
        name: String,
        /// Where to write the file (defaults to the stored name in the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Show the last read position of a file
    Progress {
        /// Stored file name
        name: String,
    },
    /// Set the last read position of a file
    SetProgress {
        /// Stored file name
        name: String,
        /// Position the reader reached
        position: u64,
    },
    /// Show size, media type and progress of a stored file
    Info {
        /// Stored file name
        name: String,
    },
    /// Delete a file and its progress
    Delete {
        /// Stored file name
        name: String,
    },
    /// Delete every file and every progress record
    DeleteAll,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'folio --help' for commands");
        return Ok(());
    };

    let cfg = CoreConfig::from_env_values(
        std::env::var("FOLIO_UPLOAD_DIR").ok(),
        std::env::var("FOLIO_PROGRESS_DIR").ok(),
    )?;
    let library = LibraryService::new(&cfg)?;

    match command {
        Commands::List => {
            let files = library.list_files()?;
            if files.is_empty() {
                println!("No files found.");
            } else {
                for file in files {
                    println!("{}", file);
                }
            }
        }
        Commands::Upload { path, name } => {
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .ok_or_else(|| format!("cannot derive a file name from {}", path.display()))?,
            };
            let file = File::open(&path)?;
            match library.upload(&name, file) {
                Ok(stored) => println!("Uploaded {} as {}", path.display(), stored),
                Err(e) => eprintln!("Error uploading file: {}", e),
            }
        }
        Commands::Download { name, out } => match library.download_document(&name) {
            Ok((info, bytes)) => {
                let out = out.unwrap_or_else(|| default_download_path(&info.name));
                std::fs::write(&out, &bytes)?;
                println!("Wrote {} bytes to {}", bytes.len(), out.display());
            }
            Err(e) => eprintln!("Error downloading file: {}", e),
        },
        Commands::Progress { name } => match library.get_progress(&name) {
            Ok(position) => println!("{}", position),
            Err(e) => eprintln!("Error reading progress: {}", e),
        },
        Commands::SetProgress { name, position } => {
            match library.set_progress(&name, position) {
                Ok(()) => println!("Progress for {} set to {}", name, position),
                Err(e) => eprintln!("Error setting progress: {}", e),
            }
        }
        Commands::Info { name } => match library.file_info(&name) {
            Ok(info) => println!(
                "Name: {}, Size: {} bytes, Type: {}, Last read position: {}",
                info.name,
                info.size_bytes,
                info.media_type.as_deref().unwrap_or("unknown"),
                info.last_read_position
            ),
            Err(e) => eprintln!("Error reading file info: {}", e),
        },
        Commands::Delete { name } => match library.delete_file(&name) {
            Ok(deleted) => println!("Deleted {} and its progress", deleted),
            Err(e) => eprintln!("Error deleting file: {}", e),
        },
        Commands::DeleteAll => match library.delete_all_files() {
            Ok(()) => println!("Deleted all files and progress records"),
            Err(e) => {
                eprintln!("Error deleting files: {}", e);
                if let Some(failed) = e.failed_names() {
                    for name in failed {
                        eprintln!("  not deleted: {}", name);
                    }
                }
            }
        },
    }

    Ok(())
}

/// Output path used when `download` is given no `--out`: the stored name, in the current directory.
///
/// `stored_name` is already cleaned to a single segment, so the result never leaves the
/// working directory.
fn default_download_path(stored_name: &str) -> PathBuf {
    Path::new(".").join(stored_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::FileName;

    #[test]
    fn test_default_download_path_stays_in_working_directory() {
        for raw in ["/book.pdf", "./book.pdf", "\\book.pdf", "sub/./"] {
            let stored = FileName::clean(raw).unwrap();
            let out = default_download_path(stored.as_str());
            assert_eq!(out.parent(), Some(Path::new(".")), "{} escaped", raw);
        }
        assert_eq!(default_download_path("book.pdf"), Path::new("./book.pdf"));
    }

    #[test]
    fn test_cli_parses_download_without_out() {
        let cli = Cli::try_parse_from(["folio", "download", "/book.pdf"]).unwrap();
        match cli.command {
            Some(Commands::Download { name, out }) => {
                assert_eq!(name, "/book.pdf");
                assert!(out.is_none());
            }
            _ => panic!("expected download command"),
        }
    }
}
