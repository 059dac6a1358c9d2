use anyhow::Result;
use clap::Args;
use console::Term;
use xerofill_core::credentials::{self, Credentials};

#[derive(Args)]
pub struct EncodeArgs {
    /// Email (prompted for when omitted)
    #[arg(long)]
    email: Option<String>,

    /// Password (prompted for without echo when omitted)
    #[arg(long)]
    password: Option<String>,
}

/// Print a blob suitable for the XERO_CREDENTIALS configuration key.
pub fn execute(args: EncodeArgs) -> Result<()> {
    let term = Term::stdout();

    let email = match args.email {
        Some(email) => email,
        None => {
            term.write_str("Email: ")?;
            term.read_line()?
        }
    };

    let password = match args.password {
        Some(password) => password,
        None => {
            term.write_str("Password: ")?;
            term.read_secure_line()?
        }
    };

    let blob = credentials::encode(&Credentials { email, password });

    // Blob on stdout so it can be piped; the hint goes to stderr
    println!("{blob}");
    eprintln!("Set XERO_CREDENTIALS to this value in your .env file.");

    Ok(())
}
