use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "gzscan")]
#[command(version)]
#[command(
    about = "Print header metadata and byte ranges for each member of a gzip file",
    long_about = None
)]
#[command(after_help = "Examples:\n  \
  gzscan access.log.gz        show every member of access.log.gz\n  \
  cat a.gz b.gz > ab.gz && gzscan ab.gz   locate both members in ab.gz")]
pub struct Cli {
    /// Gzip file path
    #[arg(value_name = "FILE")]
    pub file: String,
}
