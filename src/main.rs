use clap::Parser;
use keyrotor::cli::{Cli, Commands};
use keyrotor::jwt::SessionIdentity;

fn main() {
    let cli = Cli::parse();

    keyrotor::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Status => keyrotor::cli::commands::status::execute(&cli),
        Commands::Events { last } => keyrotor::cli::commands::events::execute(&cli, last),
        Commands::Encrypt { ref plaintext } => {
            keyrotor::cli::commands::encrypt::execute(&cli, plaintext)
        }
        Commands::Decrypt { ref payload } => {
            keyrotor::cli::commands::decrypt::execute(&cli, payload)
        }
        Commands::ReEncrypt {
            ref file,
            ref output,
        } => keyrotor::cli::commands::reencrypt::execute(&cli, file, output.as_deref()),
        Commands::Sign {
            ref subject,
            ref email,
            ref role,
            ref ttl,
        } => {
            let identity = SessionIdentity::new(subject.as_str(), email.as_str(), role.as_str());
            keyrotor::cli::commands::sign::execute(&cli, &identity, ttl.as_deref())
        }
        Commands::Verify { ref token } => keyrotor::cli::commands::verify::execute(&cli, token),
    };

    if let Err(e) = result {
        keyrotor::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
