//! Implementation of the `deptidy downloads` command.

use chrono::Utc;
use deptidy_pkg::tools::downloads::{generate, insert_statements};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Options for the downloads command.
#[derive(Debug)]
pub struct DownloadsOptions {
    /// Versions to generate rows for.
    pub versions: Vec<String>,
    /// Days of history, ending today.
    pub days: u32,
    /// Fixed seed; random when absent.
    pub seed: Option<u64>,
    /// Table the statements insert into.
    pub table: String,
}

fn render(options: &DownloadsOptions) -> String {
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let today = Utc::now().date_naive();
    let rows = generate(&options.versions, options.days, today, &mut rng);
    insert_statements(&options.table, &rows)
}

/// Print the generated statements to stdout.
pub fn run(options: &DownloadsOptions) {
    print!("{}", render(options));
}
