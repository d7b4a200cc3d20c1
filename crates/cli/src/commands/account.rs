//! Account and session commands.

use secrecy::SecretString;

use tienda_storefront::error::Result;

use super::Context;
use crate::args::AccountAction;
use crate::output;

pub fn register(ctx: &mut Context, name: &str, email: &str, password: String) -> Result<()> {
    let identity = ctx
        .session
        .register(name, email, &SecretString::from(password))?;
    output::message("Account created.");
    output::identity(&identity);
    Ok(())
}

pub fn login(ctx: &mut Context, email: &str, password: String) -> Result<()> {
    let identity = ctx.session.login(email, &SecretString::from(password))?;
    output::message("Signed in.");
    output::identity(&identity);
    Ok(())
}

pub fn logout(ctx: &mut Context) -> Result<()> {
    ctx.session.logout()?;
    output::message("Signed out.");
    Ok(())
}

pub fn whoami(ctx: &Context) -> Result<()> {
    output::identity(&ctx.identity()?);
    Ok(())
}

pub fn manage(ctx: &mut Context, action: AccountAction) -> Result<()> {
    match action {
        AccountAction::Rename { name } => {
            let identity = ctx.session.update_name(&name)?;
            output::identity(&identity);
        }
        AccountAction::Passwd { old, new } => {
            let identity = ctx.identity()?;
            ctx.session.change_password(
                identity.email.as_str(),
                &SecretString::from(old),
                &SecretString::from(new),
            )?;
            output::message("Password changed.");
        }
        AccountAction::Recover { email, password } => {
            ctx.session
                .reset_password(&email, &SecretString::from(password))?;
            output::message("Password reset. You can sign in with the new password.");
        }
    }
    Ok(())
}
