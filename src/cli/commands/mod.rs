//! One module per subcommand, each exposing `execute`.

pub mod decrypt;
pub mod encrypt;
pub mod events;
pub mod reencrypt;
pub mod sign;
pub mod status;
pub mod verify;
