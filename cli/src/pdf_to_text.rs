use std::path::PathBuf;

use clap::Parser;
use fsis_recall::PdfTextExtractor;

mod logging;

#[derive(Parser)]
#[command(name = "pdf-to-text")]
#[command(about = "Extract the text of every page of a PDF into a UTF-8 text file", long_about = None)]
struct Args {
    /// PDF file to extract text from
    #[arg(value_name = "INPUT", default_value = "Recall-API-documentation.pdf")]
    input: PathBuf,

    /// Text file to write
    #[arg(value_name = "OUTPUT", default_value = "Recall-API-documentation.txt")]
    output: PathBuf,

    /// Password for encrypted PDFs
    #[arg(short, long)]
    password: Option<String>,
}

fn main() {
    logging::init();
    let args = Args::parse();

    let extractor = if let Some(password) = args.password {
        PdfTextExtractor::builder().password(password).build()
    } else {
        PdfTextExtractor::default()
    };

    // Failures are reported, not propagated: the process still exits normally.
    match extractor.convert(&args.input, &args.output) {
        Ok(summary) => {
            tracing::debug!("{} pages converted", summary.page_count);
            println!(
                "PDF converted successfully to {}",
                summary.destination.display()
            );
        }
        Err(e) => println!("Error converting PDF: {}", e),
    }
}
