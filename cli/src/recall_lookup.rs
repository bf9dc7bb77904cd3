use std::time::Duration;

use clap::Parser;
use fsis_recall::{DEFAULT_STATE_ID, LookupError, RECALL_ENDPOINT, RecallQuery};

mod logging;

#[derive(Parser)]
#[command(name = "recall-lookup")]
#[command(about = "Fetch FSIS food recalls and print the status code and raw body", long_about = None)]
struct Args {
    /// Value of the `field_states_id` filter
    #[arg(long, value_name = "ID", default_value = DEFAULT_STATE_ID)]
    state: String,

    /// Value of the `field_closed_year_id` filter
    #[arg(long, value_name = "ID")]
    closed_year: Option<String>,

    /// Recall API endpoint
    #[arg(long, value_name = "URL", default_value = RECALL_ENDPOINT)]
    endpoint: String,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,
}

// Transport failures are not handled: they end the process with a non-zero status.
fn main() -> Result<(), LookupError> {
    logging::init();
    let args = Args::parse();

    let mut builder = RecallQuery::builder()
        .endpoint(args.endpoint)
        .state_id(args.state);
    if let Some(year) = args.closed_year {
        builder = builder.closed_year_id(year);
    }
    if let Some(secs) = args.timeout {
        builder = builder.timeout(Duration::from_secs(secs));
    }

    let response = builder.build().send()?;
    println!("{}", response);
    Ok(())
}
