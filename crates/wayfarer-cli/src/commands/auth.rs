use clap::Subcommand;

use super::common::{current_session, open_db, CliResult, SESSION_KEY};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Create a new account
    Register {
        username: String,
        password: String,
    },
    /// Log in and remember the session
    Login {
        username: String,
        password: String,
    },
    /// Forget the current session
    Logout,
    /// Print the logged-in account
    Whoami,
}

pub fn run(action: AuthAction) -> CliResult {
    let db = open_db()?;
    match action {
        AuthAction::Register { username, password } => {
            if wayfarer_core::auth::register(&db, &username, &password)? {
                println!("account '{username}' created");
                Ok(())
            } else {
                Err(format!("username '{username}' is already taken").into())
            }
        }
        AuthAction::Login { username, password } => {
            match wayfarer_core::auth::login(&db, &username, &password)? {
                Some(session) => {
                    db.kv_set(SESSION_KEY, &session.username)?;
                    println!("logged in as '{}'", session.username);
                    Ok(())
                }
                None => Err("Credenciales incorrectas".into()),
            }
        }
        AuthAction::Logout => {
            db.kv_delete(SESSION_KEY)?;
            println!("logged out");
            Ok(())
        }
        AuthAction::Whoami => {
            let session = current_session(&db)?;
            println!("{}", session.username);
            Ok(())
        }
    }
}
