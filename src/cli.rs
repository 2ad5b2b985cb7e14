use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape every essay into data/essays.json
    Scrape {
        /// Only scrape the first N essays
        #[clap(short, long)]
        limit: Option<usize>,

        /// Don't generate embeddings, even with an API key set
        #[clap(long, default_value = "false")]
        no_embeddings: bool,
    },
    /// Embed archived essays and upsert them into the remote table
    Upload {
        /// Pause between uploads, in milliseconds
        #[clap(long)]
        delay_ms: Option<u64>,
    },
    /// Find essays similar to a question
    Search {
        /// Free-text question
        question: String,

        /// Maximum number of essays returned
        #[clap(short, long)]
        count: Option<usize>,

        /// Minimum similarity [0.0, 1.0]
        #[clap(short, long)]
        threshold: Option<f32>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scrape() {
        let args = Args::parse_from(["essays", "scrape", "--limit", "3", "--no-embeddings"]);
        match args.command {
            Command::Scrape {
                limit,
                no_embeddings,
            } => {
                assert_eq!(limit, Some(3));
                assert!(no_embeddings);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_search() {
        let args = Args::parse_from(["essays", "search", "how to start a startup", "-c", "3"]);
        match args.command {
            Command::Search {
                question,
                count,
                threshold,
            } => {
                assert_eq!(question, "how to start a startup");
                assert_eq!(count, Some(3));
                assert_eq!(threshold, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
