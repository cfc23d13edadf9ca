//! Error handling utilities

use tracing::error;

/// Report a fatal error and exit with the matching status code
///
/// - `verbose = 0`: user-friendly message only
/// - `verbose >= 1`: the full error chain as well
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    use crate::error::{describe_error_code, KeyflowError};

    error!("Fatal error: {}", error);

    let exit_code = if let Some(err) = error.downcast_ref::<KeyflowError>() {
        eprintln!("{}", err.user_message());
        if verbose >= 1 {
            eprintln!(
                "\nError E{:04}: {}",
                err.code(),
                describe_error_code(err.code())
            );
            eprintln!("\nContext Chain:\n{:#}", error);
        }
        err.exit_code()
    } else {
        eprintln!("Error: {error}");
        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {}: {}", i, cause);
            }
        }
        1
    };

    std::process::exit(exit_code)
}
