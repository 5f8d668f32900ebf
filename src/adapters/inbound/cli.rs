//! Command Line Adapter
//!
//! Parses command line arguments and drives the navigation guard and
//! auth service, writing one result line per command.

use crate::application::{AuthService, NavigationGuard};
use crate::domain::value_objects::NavigationOutcome;
use std::io::Write;
use std::sync::Arc;

const USAGE: &str = "usage: dashgate <navigate TO [FROM] | login USER PASSWORD | logout | whoami | routes>";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the guard for a transition; `from` defaults to `/`
    Navigate { to: String, from: String },
    Login { username: String, password: String },
    Logout,
    Whoami,
    /// List known views
    Routes,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CliError {
    #[error("{}", USAGE)]
    Usage,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
}

impl Command {
    /// Parse arguments, excluding the program name.
    pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Self, CliError> {
        let args: Vec<&str> = args.iter().map(|a| a.as_ref()).collect();
        match args.as_slice() {
            ["navigate", to] => Ok(Command::Navigate {
                to: to.to_string(),
                from: "/".to_string(),
            }),
            ["navigate", to, from] => Ok(Command::Navigate {
                to: to.to_string(),
                from: from.to_string(),
            }),
            ["login", username, password] => Ok(Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            }),
            ["logout"] => Ok(Command::Logout),
            ["whoami"] => Ok(Command::Whoami),
            ["routes"] => Ok(Command::Routes),
            [] => Err(CliError::Usage),
            [cmd, ..] if matches!(*cmd, "navigate" | "login" | "logout" | "whoami" | "routes") => {
                Err(CliError::Usage)
            }
            [cmd, ..] => Err(CliError::UnknownCommand(cmd.to_string())),
        }
    }
}

/// Command line inbound adapter.
pub struct Cli {
    guard: Arc<NavigationGuard>,
    auth: Arc<AuthService>,
}

impl Cli {
    pub fn new(guard: Arc<NavigationGuard>, auth: Arc<AuthService>) -> Self {
        Self { guard, auth }
    }

    /// Execute one command.
    pub async fn run<W: Write>(&self, command: Command, out: &mut W) -> anyhow::Result<()> {
        match command {
            Command::Navigate { to, from } => {
                let outcome = self.guard.navigate(&to, &from).await;
                let resolved = self.guard.routes().resolve(&to);
                match &outcome {
                    NavigationOutcome::Allow => writeln!(out, "allow {}", resolved.path)?,
                    other => writeln!(out, "{}", other)?,
                }
            }
            Command::Login { username, password } => {
                let grant = self.auth.login(&username, &password).await?;
                writeln!(out, "logged in as {}", grant.username)?;
            }
            Command::Logout => {
                self.auth.logout().await;
                writeln!(out, "logged out")?;
            }
            Command::Whoami => match self.auth.current_user().await {
                Some(user) => writeln!(out, "{}", user)?,
                None => writeln!(out, "not logged in")?,
            },
            Command::Routes => {
                for route in self.guard.routes().routes() {
                    match route.requires {
                        Some(capability) => writeln!(
                            out,
                            "{}\t{}\trequires {}",
                            route.path,
                            route.name.unwrap_or("-"),
                            capability
                        )?,
                        None => {
                            writeln!(out, "{}\t{}", route.path, route.name.unwrap_or("-"))?
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
