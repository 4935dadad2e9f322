use clap::Parser;
use photofolio::{output, site};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "photofolio")]
#[command(about = "Static site generator for photo galleries")]
#[command(long_about = "\
Static site generator for photo galleries

Every photo is described by a markdown file next to it. Directories become
galleries, the whole tree becomes the root gallery, and each gallery gets an
Atom feed.

Site structure:

  site/
  ├── _config.toml            # title, author, baseurl, output, thumbsize, previewsize
  ├── _gallery.html           # Optional gallery index template
  ├── _single.html            # Optional single-image page template
  └── rome/
      ├── _gallery.toml       # Optional title and cover image
      ├── colosseum.md        # YAML header (title, date, ...) + markdown body
      └── colosseum.jpg       # Paired photo

Files and directories starting with `_` or `.` are never published.")]
#[command(version)]
struct Cli {
    /// Site root directory
    #[arg(default_value = ".")]
    site: PathBuf,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    println!("==> Building {}", cli.site.display());

    let (tx, rx) = std::sync::mpsc::channel();
    let printer_root = cli.site.clone();
    let printer = std::thread::spawn(move || {
        for event in rx {
            output::print_process_event(&event, &printer_root);
        }
    });

    let result = site::build(&cli.site, Some(tx));
    // The sender is dropped by now on every path, so the printer drains and exits.
    printer
        .join()
        .map_err(|_| "progress printer thread panicked")?;
    let summary = result?;

    output::print_summary(&summary, &cli.site);
    Ok(())
}
