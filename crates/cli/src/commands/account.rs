//! Account commands: register, login, logout and whoami.

use crate::commands::Context;
use crate::error::CliError;

/// Create an account. Does not sign in.
///
/// # Errors
///
/// Returns `CliError::Api` with the server's message on rejection.
pub async fn register(ctx: &Context, username: &str, password: &str) -> Result<(), CliError> {
    let message = ctx.client()?.register(username, password).await?;
    println!("{message}");
    println!("You can now log in with `yarnshop login -u {username}`.");
    Ok(())
}

/// Sign in and persist the token and username.
///
/// # Errors
///
/// Returns `CliError::Api` for wrong credentials and `CliError::Storage` if
/// the credentials cannot be saved.
pub async fn login(ctx: &Context, username: &str, password: &str) -> Result<(), CliError> {
    let token = ctx.client()?.login(username, password).await?;
    ctx.oracle().sign_in(&token, username)?;
    println!("Logged in as {username}");
    Ok(())
}

/// Forget all stored credentials. The cart is kept.
///
/// # Errors
///
/// Returns `CliError::Storage` if the credentials cannot be removed.
pub fn logout(ctx: &Context) -> Result<(), CliError> {
    ctx.oracle().clear()?;
    println!("Logged out");
    Ok(())
}

/// Print the current sign-in state.
pub fn whoami(ctx: &Context) {
    let status = ctx.oracle().status();
    match (status.is_authenticated, status.username) {
        (true, Some(username)) => println!("Logged in as {username}"),
        (true, None) => println!("Logged in"),
        (false, _) => println!("Not logged in"),
    }
}
