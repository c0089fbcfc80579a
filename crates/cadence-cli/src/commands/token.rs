//! Bearer token commands.
//!
//! Issues tokens signed with the configured secret, matching what the
//! auth collaborator would mint. Useful for local testing and admin
//! access to the REST gateway.

use clap::Subcommand;

use cadence_core::{Config, TokenVerifier};

#[derive(Subcommand)]
pub enum TokenAction {
    /// Issue a signed bearer token for an owner id
    Issue {
        /// Owner id the token authenticates
        owner: String,
    },
    /// Verify a token and print the owner id it was issued for
    Verify {
        /// Token to check
        token: String,
    },
}

pub fn run(action: TokenAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let verifier = TokenVerifier::new(&config.auth.secret);

    match action {
        TokenAction::Issue { owner } => {
            if owner.trim().is_empty() {
                return Err("owner must not be empty".into());
            }
            println!("{}", verifier.issue(&owner));
        }
        TokenAction::Verify { token } => match verifier.verify(&token) {
            Ok(owner) => println!("{owner}"),
            Err(_) => {
                eprintln!("invalid token");
                std::process::exit(1);
            }
        },
    }
    Ok(())
}
